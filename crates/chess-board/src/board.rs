//! Full game board: piece placement plus turn, castling rights, en passant
//! square, move counters, and the move stack.

use crate::baseboard::BaseBoard;
use crate::Bitboard;
use chess_core::{
    Color, FenError, FenParser, File, Move, Outcome, Piece, PieceType, Rank, Square, Termination,
    UciError,
};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors from interpreting moves against a position.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    /// The move text failed to parse.
    #[error(transparent)]
    Uci(#[from] UciError),

    /// The move parsed but is not legal in this position.
    #[error("illegal move '{0}' in position {1}")]
    Illegal(String, String),
}

/// Snapshot of the restorable parts of a [`Board`], kept on the undo stack.
#[derive(Clone, Copy)]
struct BoardState {
    base: BaseBoard,
    turn: Color,
    castling_rights: Bitboard,
    ep_square: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl BoardState {
    fn capture(board: &Board) -> Self {
        BoardState {
            base: board.base,
            turn: board.turn,
            castling_rights: board.castling_rights,
            ep_square: board.ep_square,
            halfmove_clock: board.halfmove_clock,
            fullmove_number: board.fullmove_number,
        }
    }

    fn restore(&self, board: &mut Board) {
        board.base = self.base;
        board.turn = self.turn;
        board.castling_rights = self.castling_rights;
        board.ep_square = self.ep_square;
        board.halfmove_clock = self.halfmove_clock;
        board.fullmove_number = self.fullmove_number;
    }
}

/// Position identity for repetition detection.
///
/// Two positions repeat when piece placement, side to move, castling
/// rights, and the usable en passant square all match. An en passant
/// square no legal move can use does not distinguish positions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct TranspositionKey {
    pieces: [Bitboard; 6],
    colors: [Bitboard; 2],
    turn: Color,
    castling_rights: Bitboard,
    ep_square: Option<Square>,
}

/// A chess position with full game state.
///
/// `Board` combines a [`BaseBoard`] with the side to move, castling
/// rights, the en passant square, the halfmove clock, and the fullmove
/// number. Moves played with [`push`](Self::push) are recorded and can be
/// undone with [`pop`](Self::pop).
///
/// Castling moves are represented king-to-rook-square internally. In
/// standard mode the familiar king-two-squares encoding is accepted and
/// produced at the UCI boundary; with Chess960 enabled the king-to-rook
/// form is used throughout.
#[derive(Clone)]
pub struct Board {
    pub(crate) base: BaseBoard,
    pub(crate) turn: Color,
    pub(crate) castling_rights: Bitboard,
    pub(crate) ep_square: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    chess960: bool,
    move_stack: Vec<Move>,
    state_stack: Vec<BoardState>,
}

impl Board {
    /// Creates a board with the standard starting position.
    pub fn new() -> Self {
        Board {
            base: BaseBoard::new(),
            turn: Color::White,
            castling_rights: Bitboard::CORNERS,
            ep_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            chess960: false,
            move_stack: Vec::new(),
            state_stack: Vec::new(),
        }
    }

    /// Creates an empty board with no pieces and no castling rights.
    pub fn empty() -> Self {
        Board {
            base: BaseBoard::empty(),
            turn: Color::White,
            castling_rights: Bitboard::EMPTY,
            ep_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            chess960: false,
            move_stack: Vec::new(),
            state_stack: Vec::new(),
        }
    }

    /// Creates a board from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        board.set_fen(fen)?;
        Ok(board)
    }

    /// Creates a Chess960 board from a FEN string.
    ///
    /// Castling rights may be given as file letters (Shredder-FEN) or as
    /// `KQkq` flags resolved against the rook placement.
    pub fn from_fen_chess960(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        board.chess960 = true;
        board.set_fen(fen)?;
        Ok(board)
    }

    /// Replaces the position from a FEN string and clears the move stack.
    ///
    /// On error the board is left unchanged.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let parsed = FenParser::parse(fen)?;
        let base = BaseBoard::from_board_fen(&parsed.piece_placement)?;
        let castling_rights = parse_castling_fen(&base, &parsed.castling)?;

        let ep_square = if parsed.en_passant == "-" {
            None
        } else {
            // The parser has already validated the square text.
            Square::from_algebraic(&parsed.en_passant)
        };

        self.base = base;
        self.turn = match parsed.active_color {
            'w' => Color::White,
            _ => Color::Black,
        };
        self.castling_rights = castling_rights;
        self.ep_square = ep_square;
        self.halfmove_clock = parsed.halfmove_clock;
        self.fullmove_number = parsed.fullmove_number.max(1);
        self.clear_stack();
        Ok(())
    }

    /// Restores the standard starting position. Clears the move stack.
    pub fn reset(&mut self) {
        let chess960 = self.chess960;
        *self = Board::new();
        self.chess960 = chess960;
    }

    /// Removes all pieces and state. Clears the move stack.
    pub fn clear_board(&mut self) {
        let chess960 = self.chess960;
        *self = Board::empty();
        self.chess960 = chess960;
    }

    /// The side to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The raw castling rights bitboard of rook squares.
    ///
    /// May contain stale bits on hand-built positions; see
    /// [`clean_castling_rights`](Self::clean_castling_rights).
    #[inline]
    pub fn castling_rights(&self) -> Bitboard {
        self.castling_rights
    }

    /// The en passant target square, if the last move was a double pawn
    /// push.
    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Halfmoves since the last capture or pawn move.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// The fullmove number, starting at 1 and incremented after Black
    /// moves.
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Returns true if this board uses Chess960 castling rules.
    #[inline]
    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    /// The moves played so far.
    #[inline]
    pub fn move_stack(&self) -> &[Move] {
        &self.move_stack
    }

    /// The underlying piece placement.
    #[inline]
    pub fn base(&self) -> &BaseBoard {
        &self.base
    }

    /// Returns the piece on a square, if any.
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.base.piece_at(square)
    }

    /// Returns the piece type on a square, if any.
    #[inline]
    pub fn piece_type_at(&self, square: Square) -> Option<PieceType> {
        self.base.piece_type_at(square)
    }

    /// Finds the king of the given color, ignoring promoted pieces.
    #[inline]
    pub fn king(&self, color: Color) -> Option<Square> {
        self.base.king(color)
    }

    /// Places a piece on a square. Clears the move stack.
    pub fn set_piece_at(&mut self, square: Square, piece: Option<Piece>, promoted: bool) {
        self.base.set_piece_at(square, piece, promoted);
        self.clear_stack();
    }

    /// Removes and returns the piece on a square. Clears the move stack.
    pub fn remove_piece_at(&mut self, square: Square) -> Option<Piece> {
        let piece = self.base.remove_piece_at(square);
        self.clear_stack();
        piece
    }

    /// Forgets the recorded move history without changing the position.
    pub fn clear_stack(&mut self) {
        self.move_stack.clear();
        self.state_stack.clear();
    }

    /// Copies the position without the move history.
    pub fn clone_without_stack(&self) -> Board {
        Board {
            base: self.base,
            turn: self.turn,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            chess960: self.chess960,
            move_stack: Vec::new(),
            state_stack: Vec::new(),
        }
    }

    /// Returns the position before the first recorded move.
    pub fn root(&self) -> Board {
        match self.state_stack.first() {
            Some(state) => {
                let mut board = Board::empty();
                board.chess960 = self.chess960;
                state.restore(&mut board);
                board
            }
            None => self.clone_without_stack(),
        }
    }

    /// Plies played since the start of the game.
    pub fn ply(&self) -> u32 {
        2 * (self.fullmove_number - 1) + u32::from(self.turn == Color::Black)
    }

    /// Plays a move on the board.
    ///
    /// The move must be pseudo-legal. Castling is accepted in either
    /// encoding, en passant captures and promotions are recognized from
    /// context, and the null move passes the turn. The previous state is
    /// remembered and can be restored with [`pop`](Self::pop).
    ///
    /// # Panics
    /// Panics if the source square of a non-null, non-drop move is empty.
    pub fn push(&mut self, m: Move) {
        let m = self.normalize_castling(m);

        let state = BoardState::capture(self);
        // Rights stored during a game stay clean; the snapshot keeps the
        // raw value.
        self.castling_rights = self.clean_castling_rights();
        self.move_stack.push(self.encode_move(m));
        self.state_stack.push(state);

        let ep_square = self.ep_square.take();

        self.halfmove_clock += 1;
        if self.turn == Color::Black {
            self.fullmove_number += 1;
        }

        if m.is_null() {
            self.turn = self.turn.opposite();
            return;
        }

        if let Some(piece_type) = m.drop {
            self.base.put_piece(m.to, piece_type, self.turn, false);
            self.turn = self.turn.opposite();
            return;
        }

        if self.is_zeroing(m) {
            self.halfmove_clock = 0;
        }

        let from_mask = Bitboard::from_square(m.from);
        let to_mask = Bitboard::from_square(m.to);

        let mut promoted = (self.base.promoted() & from_mask).is_not_empty();
        let piece_type = self
            .base
            .take_piece(m.from)
            .expect("push expects a pseudo-legal move");
        let captured_piece_type = self.base.piece_type_at(m.to);

        // Touching a rook square or moving the king forfeits the
        // corresponding rights.
        self.castling_rights &= !to_mask & !from_mask;
        if piece_type == PieceType::King && !promoted {
            match self.turn {
                Color::White => self.castling_rights &= !Bitboard::RANK_1,
                Color::Black => self.castling_rights &= !Bitboard::RANK_8,
            }
        } else if captured_piece_type == Some(PieceType::King)
            && (self.base.promoted() & to_mask).is_empty()
        {
            // Capturing an unpromoted king on its back rank clears the
            // opponent's rights. Only reachable on hand-built positions.
            if self.turn == Color::White && m.to.rank() == Rank::R8 {
                self.castling_rights &= !Bitboard::RANK_8;
            } else if self.turn == Color::Black && m.to.rank() == Rank::R1 {
                self.castling_rights &= !Bitboard::RANK_1;
            }
        }

        if piece_type == PieceType::Pawn {
            let diff = i16::from(m.to.index()) - i16::from(m.from.index());

            if diff == 16 && m.from.rank() == Rank::R2 {
                self.ep_square = m.from.offset(8);
            } else if diff == -16 && m.from.rank() == Rank::R7 {
                self.ep_square = m.from.offset(-8);
            } else if Some(m.to) == ep_square
                && (diff.abs() == 7 || diff.abs() == 9)
                && captured_piece_type.is_none()
            {
                // The pawn captured en passant stands behind the target
                // square.
                let down = if self.turn == Color::White { -8 } else { 8 };
                if let Some(capture_square) = m.to.offset(down) {
                    self.base.take_piece(capture_square);
                }
            }
        }

        let piece_type = match m.promotion {
            Some(promotion) => {
                promoted = true;
                promotion
            }
            None => piece_type,
        };

        // A king landing on one of our own pieces is castling onto its
        // rook.
        let castling = piece_type == PieceType::King
            && (self.base.occupied_by(self.turn) & to_mask).is_not_empty();
        if castling {
            let a_side = m.to.file() < m.from.file();

            self.base.take_piece(m.from);
            self.base.take_piece(m.to);

            let back_rank = self.turn.back_rank();
            let (king_file, rook_file) = if a_side {
                (File::C, File::D)
            } else {
                (File::G, File::F)
            };
            self.base.put_piece(
                Square::new(king_file, back_rank),
                PieceType::King,
                self.turn,
                false,
            );
            self.base.put_piece(
                Square::new(rook_file, back_rank),
                PieceType::Rook,
                self.turn,
                false,
            );
        } else {
            self.base.put_piece(m.to, piece_type, self.turn, promoted);
        }

        self.turn = self.turn.opposite();
    }

    /// Restores the previous position and returns the move that was
    /// undone.
    ///
    /// # Panics
    /// Panics if the move stack is empty.
    pub fn pop(&mut self) -> Move {
        let m = self.move_stack.pop().expect("pop from empty move stack");
        let state = self.state_stack.pop().expect("pop from empty move stack");
        state.restore(self);
        m
    }

    /// Returns the last move played, if any.
    pub fn peek(&self) -> Option<Move> {
        self.move_stack.last().copied()
    }

    /// Converts king-to-rook castling to the standard two-square encoding
    /// where applicable.
    pub(crate) fn encode_move(&self, m: Move) -> Move {
        if !self.chess960 && m.promotion.is_none() && m.drop.is_none() {
            if m.from == Square::E1 && self.base.kings().contains(Square::E1) {
                if m.to == Square::H1 {
                    return Move::new(Square::E1, Square::G1);
                }
                if m.to == Square::A1 {
                    return Move::new(Square::E1, Square::C1);
                }
            } else if m.from == Square::E8 && self.base.kings().contains(Square::E8) {
                if m.to == Square::H8 {
                    return Move::new(Square::E8, Square::G8);
                }
                if m.to == Square::A8 {
                    return Move::new(Square::E8, Square::C8);
                }
            }
        }
        m
    }

    /// Converts standard castling notation to the king-to-rook form used
    /// internally.
    pub(crate) fn normalize_castling(&self, m: Move) -> Move {
        if m.from == Square::E1 && self.base.kings().contains(Square::E1) {
            if m.to == Square::G1 && !self.base.rooks().contains(Square::G1) {
                return Move::new(Square::E1, Square::H1);
            }
            if m.to == Square::C1 && !self.base.rooks().contains(Square::C1) {
                return Move::new(Square::E1, Square::A1);
            }
        } else if m.from == Square::E8 && self.base.kings().contains(Square::E8) {
            if m.to == Square::G8 && !self.base.rooks().contains(Square::G8) {
                return Move::new(Square::E8, Square::H8);
            }
            if m.to == Square::C8 && !self.base.rooks().contains(Square::C8) {
                return Move::new(Square::E8, Square::A8);
            }
        }
        m
    }

    /// Castling rights with stale bits filtered out.
    ///
    /// Bits survive only while the rook stands on its square and the
    /// unmoved king is on its back rank (standard chess: rooks in the
    /// corners, king on its starting square). During a game the stored
    /// rights are already clean and are returned as-is.
    pub fn clean_castling_rights(&self) -> Bitboard {
        if !self.state_stack.is_empty() {
            // Rights are only ever removed while moves are pushed, so the
            // stored value is already filtered.
            return self.castling_rights;
        }

        let castling = self.castling_rights & self.base.rooks();
        let mut white_castling =
            castling & Bitboard::RANK_1 & self.base.occupied_by(Color::White);
        let mut black_castling =
            castling & Bitboard::RANK_8 & self.base.occupied_by(Color::Black);

        if !self.chess960 {
            white_castling &=
                Bitboard::from_square(Square::A1) | Bitboard::from_square(Square::H1);
            black_castling &=
                Bitboard::from_square(Square::A8) | Bitboard::from_square(Square::H8);

            let unpromoted_kings = self.base.kings() & !self.base.promoted();
            if !(self.base.occupied_by(Color::White) & unpromoted_kings).contains(Square::E1) {
                white_castling = Bitboard::EMPTY;
            }
            if !(self.base.occupied_by(Color::Black) & unpromoted_kings).contains(Square::E8) {
                black_castling = Bitboard::EMPTY;
            }

            white_castling | black_castling
        } else {
            let white_king_mask = self.base.occupied_by(Color::White)
                & self.base.kings()
                & Bitboard::RANK_1
                & !self.base.promoted();
            let black_king_mask = self.base.occupied_by(Color::Black)
                & self.base.kings()
                & Bitboard::RANK_8
                & !self.base.promoted();

            clean_960_side(white_castling, white_king_mask)
                | clean_960_side(black_castling, black_king_mask)
        }
    }

    /// Sets castling rights from FEN notation like `KQkq`, `Hq`, or `-`.
    /// Clears the move stack.
    pub fn set_castling_fen(&mut self, castling_fen: &str) -> Result<(), FenError> {
        self.castling_rights = parse_castling_fen(&self.base, castling_fen)?;
        self.clear_stack();
        Ok(())
    }

    /// Castling rights in X-FEN notation.
    ///
    /// Uses the classic `KQkq` flags where unambiguous and falls back to
    /// the rook's file letter when another rook on the same side of the
    /// king would make the flag ambiguous.
    pub fn castling_xfen(&self) -> String {
        let mut builder = String::new();
        let clean = self.clean_castling_rights();

        for color in Color::ALL {
            let Some(king) = self.base.king(color) else {
                continue;
            };
            let backrank = Bitboard::rank(color.back_rank());

            let mut remaining = clean & backrank;
            while let Some(rook_square) = remaining.msb() {
                remaining &= !Bitboard::from_square(rook_square);

                let rook_file = rook_square.file();
                let a_side = rook_file < king.file();

                let other_rooks = self.base.occupied_by(color)
                    & self.base.rooks()
                    & backrank
                    & !Bitboard::from_square(rook_square);
                let ambiguous = other_rooks
                    .into_iter()
                    .any(|other| (other.file() < rook_file) == a_side);

                let ch = if ambiguous {
                    rook_file.to_char()
                } else if a_side {
                    'q'
                } else {
                    'k'
                };
                builder.push(match color {
                    Color::White => ch.to_ascii_uppercase(),
                    Color::Black => ch,
                });
            }
        }

        if builder.is_empty() {
            "-".to_string()
        } else {
            builder
        }
    }

    /// Castling rights in Shredder-FEN notation, always as file letters.
    pub fn castling_shredder_fen(&self) -> String {
        let rights = self.clean_castling_rights();
        if rights.is_empty() {
            return "-".to_string();
        }

        let mut builder = String::new();
        let mut white = rights & Bitboard::RANK_1;
        while let Some(square) = white.msb() {
            white &= !Bitboard::from_square(square);
            builder.push(square.file().to_char().to_ascii_uppercase());
        }
        let mut black = rights & Bitboard::RANK_8;
        while let Some(square) = black.msb() {
            black &= !Bitboard::from_square(square);
            builder.push(square.file().to_char());
        }
        builder
    }

    /// Returns the FEN of the current position.
    ///
    /// The en passant field is written whenever a double pawn push just
    /// occurred, whether or not a capture is possible.
    pub fn fen(&self) -> String {
        let ep = match self.ep_square {
            Some(square) => square.to_algebraic(),
            None => "-".to_string(),
        };
        format!(
            "{} {} {} {} {} {}",
            self.base.board_fen(false),
            self.turn.fen_char(),
            self.castling_xfen(),
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Pieces of the opponent giving check to the side to move.
    pub fn checkers_mask(&self) -> Bitboard {
        match self.base.king(self.turn) {
            Some(king) => self.base.attackers_mask(self.turn.opposite(), king),
            None => Bitboard::EMPTY,
        }
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.checkers_mask().is_not_empty()
    }

    /// Returns true if the side that just moved left its king attacked.
    pub fn was_into_check(&self) -> bool {
        match self.base.king(self.turn.opposite()) {
            Some(king) => self.base.is_attacked_by(self.turn, king),
            None => false,
        }
    }

    /// Returns true if the given pseudo-legal move delivers check.
    pub fn gives_check(&self, m: Move) -> bool {
        let mut board = self.clone_without_stack();
        board.push(m);
        board.is_check()
    }

    /// Returns true if the move captures, including en passant.
    pub fn is_capture(&self, m: Move) -> bool {
        let touched = Bitboard::from_square(m.from) ^ Bitboard::from_square(m.to);
        (touched & self.base.occupied_by(self.turn.opposite())).is_not_empty()
            || self.is_en_passant(m)
    }

    /// Returns true if the move is a pawn move or a capture.
    pub fn is_zeroing(&self, m: Move) -> bool {
        let touched = Bitboard::from_square(m.from) ^ Bitboard::from_square(m.to);
        (touched & self.base.pawns()).is_not_empty()
            || (touched & self.base.occupied_by(self.turn.opposite())).is_not_empty()
            || m.drop == Some(PieceType::Pawn)
    }

    /// Returns true if the move captures en passant.
    pub fn is_en_passant(&self, m: Move) -> bool {
        let diff = i16::from(m.to.index()) - i16::from(m.from.index());
        self.ep_square == Some(m.to)
            && self.base.pawns().contains(m.from)
            && (diff.abs() == 7 || diff.abs() == 9)
            && !self.base.occupied().contains(m.to)
    }

    /// Returns true if the move is castling, in either encoding.
    pub fn is_castling(&self, m: Move) -> bool {
        if self.base.kings().contains(m.from) {
            let file_diff =
                i16::from(m.from.file().index()) - i16::from(m.to.file().index());
            return file_diff.abs() > 1
                || (self.base.rooks()
                    & self.base.occupied_by(self.turn)
                    & Bitboard::from_square(m.to))
                .is_not_empty();
        }
        false
    }

    /// Returns true if the move castles toward the h-file.
    pub fn is_kingside_castling(&self, m: Move) -> bool {
        self.is_castling(m) && m.to.file() > m.from.file()
    }

    /// Returns true if the move castles toward the a-file.
    pub fn is_queenside_castling(&self, m: Move) -> bool {
        self.is_castling(m) && m.to.file() < m.from.file()
    }

    /// Returns true if the move loses castling rights for either side.
    pub fn reduces_castling_rights(&self, m: Move) -> bool {
        let cr = self.clean_castling_rights();
        let touched = Bitboard::from_square(m.from) ^ Bitboard::from_square(m.to);
        let unpromoted_kings = self.base.kings() & !self.base.promoted();

        (touched & cr).is_not_empty()
            || ((cr & Bitboard::RANK_1).is_not_empty()
                && (touched & unpromoted_kings & self.base.occupied_by(Color::White))
                    .is_not_empty())
            || ((cr & Bitboard::RANK_8).is_not_empty()
                && (touched & unpromoted_kings & self.base.occupied_by(Color::Black))
                    .is_not_empty())
    }

    /// Returns true if the move cannot be taken back by any sequence of
    /// reversible moves: it zeroes the halfmove clock, loses castling
    /// rights, or forgoes a legal en passant capture.
    pub fn is_irreversible(&self, m: Move) -> bool {
        self.is_zeroing(m) || self.reduces_castling_rights(m) || self.has_legal_en_passant()
    }

    /// Returns true if `color` still has any castling right.
    pub fn has_castling_rights(&self, color: Color) -> bool {
        (self.clean_castling_rights() & Bitboard::rank(color.back_rank())).is_not_empty()
    }

    /// Returns true if `color` may still castle with a rook on the h-file
    /// side of its king.
    pub fn has_kingside_castling_rights(&self, color: Color) -> bool {
        self.has_castling_rights_side(color, true)
    }

    /// Returns true if `color` may still castle with a rook on the a-file
    /// side of its king.
    pub fn has_queenside_castling_rights(&self, color: Color) -> bool {
        self.has_castling_rights_side(color, false)
    }

    fn has_castling_rights_side(&self, color: Color, kingside: bool) -> bool {
        let backrank = Bitboard::rank(color.back_rank());
        let king_mask = self.base.kings()
            & self.base.occupied_by(color)
            & backrank
            & !self.base.promoted();
        if king_mask.is_empty() {
            return false;
        }

        let mut rights = self.clean_castling_rights() & backrank;
        while rights.is_not_empty() {
            let rook = Bitboard(rights.0 & rights.0.wrapping_neg());
            if kingside && rook.0 > king_mask.0 {
                return true;
            }
            if !kingside && rook.0 < king_mask.0 {
                return true;
            }
            rights = Bitboard(rights.0 & (rights.0 - 1));
        }
        false
    }

    /// Returns the game result if the game is over, `None` otherwise.
    ///
    /// With `claim_draw` set, draws claimable under the fifty-move and
    /// threefold repetition rules are also reported; checking those is
    /// considerably more expensive.
    pub fn outcome(&self, claim_draw: bool) -> Option<Outcome> {
        if self.is_checkmate() {
            return Some(Outcome::new(
                Termination::Checkmate,
                Some(self.turn.opposite()),
            ));
        }
        if self.is_insufficient_material() {
            return Some(Outcome::new(Termination::InsufficientMaterial, None));
        }
        if self.legal_moves().is_empty() {
            return Some(Outcome::new(Termination::Stalemate, None));
        }
        if self.is_seventyfive_moves() {
            return Some(Outcome::new(Termination::SeventyfiveMoves, None));
        }
        if self.is_fivefold_repetition() {
            return Some(Outcome::new(Termination::FivefoldRepetition, None));
        }
        if claim_draw {
            if self.can_claim_fifty_moves() {
                return Some(Outcome::new(Termination::FiftyMoves, None));
            }
            if self.can_claim_threefold_repetition() {
                return Some(Outcome::new(Termination::ThreefoldRepetition, None));
            }
        }
        None
    }

    /// Returns true if the game is over by rule.
    pub fn is_game_over(&self, claim_draw: bool) -> bool {
        self.outcome(claim_draw).is_some()
    }

    /// Returns the PGN result string, `"*"` while the game is running.
    pub fn result(&self, claim_draw: bool) -> &'static str {
        match self.outcome(claim_draw) {
            Some(outcome) => outcome.result(),
            None => "*",
        }
    }

    /// Returns true if the side to move is checkmated.
    pub fn is_checkmate(&self) -> bool {
        if !self.is_check() {
            return false;
        }
        self.legal_moves().is_empty()
    }

    /// Returns true if the side to move is stalemated.
    pub fn is_stalemate(&self) -> bool {
        if self.is_check() {
            return false;
        }
        self.legal_moves().is_empty()
    }

    /// Returns true if neither side has material to mate.
    pub fn is_insufficient_material(&self) -> bool {
        Color::ALL
            .iter()
            .all(|&color| self.has_insufficient_material(color))
    }

    /// Returns true if `color` cannot mate, not even with the opponent's
    /// cooperation.
    pub fn has_insufficient_material(&self, color: Color) -> bool {
        let ours = self.base.occupied_by(color);
        if (ours & (self.base.pawns() | self.base.rooks() | self.base.queens())).is_not_empty() {
            return false;
        }

        // A lone knight mates only with help from opposing pieces that can
        // box in the king.
        if (ours & self.base.knights()).is_not_empty() {
            return ours.count() <= 2
                && (self.base.occupied_by(color.opposite())
                    & !self.base.kings()
                    & !self.base.queens())
                .is_empty();
        }

        // Bishops all on one square color cannot mate either.
        if (ours & self.base.bishops()).is_not_empty() {
            let same_color = (self.base.bishops() & Bitboard::DARK_SQUARES).is_empty()
                || (self.base.bishops() & Bitboard::LIGHT_SQUARES).is_empty();
            return same_color && self.base.pawns().is_empty() && self.base.knights().is_empty();
        }

        true
    }

    fn is_halfmoves(&self, n: u32) -> bool {
        self.halfmove_clock >= n && !self.legal_moves().is_empty()
    }

    /// Returns true if the fifty-move rule allows a draw claim.
    pub fn is_fifty_moves(&self) -> bool {
        self.is_halfmoves(100)
    }

    /// Returns true if the seventy-five-move rule forces a draw.
    pub fn is_seventyfive_moves(&self) -> bool {
        self.is_halfmoves(150)
    }

    /// Returns true if a draw can be claimed now or after the right next
    /// move.
    pub fn can_claim_draw(&self) -> bool {
        self.can_claim_fifty_moves() || self.can_claim_threefold_repetition()
    }

    /// Returns true if the fifty-move rule applies now or would after a
    /// legal non-zeroing move.
    pub fn can_claim_fifty_moves(&self) -> bool {
        if self.is_fifty_moves() {
            return true;
        }

        if self.halfmove_clock >= 99 {
            for m in self.legal_moves() {
                if !self.is_zeroing(m) {
                    let mut probe = self.clone_without_stack();
                    probe.push(m);
                    if probe.is_fifty_moves() {
                        return true;
                    }
                }
            }
        }

        false
    }

    /// Returns true if threefold repetition can be claimed, counting
    /// repetitions in the recorded history and one move ahead.
    pub fn can_claim_threefold_repetition(&self) -> bool {
        let key = self.transposition_key();
        let mut transpositions: HashMap<TranspositionKey, u32> = HashMap::new();
        transpositions.insert(key, 1);

        // Count occurrences in the reversible tail of the game.
        let mut history = self.clone();
        while !history.move_stack.is_empty() {
            let m = history.pop();
            if history.is_irreversible(m) {
                break;
            }
            *transpositions
                .entry(history.transposition_key())
                .or_insert(0) += 1;
        }

        if transpositions.get(&key).copied().unwrap_or(0) >= 3 {
            return true;
        }

        // The claim also stands if the next move creates the third
        // occurrence.
        for m in self.legal_moves() {
            let mut probe = self.clone_without_stack();
            probe.push(m);
            if transpositions
                .get(&probe.transposition_key())
                .copied()
                .unwrap_or(0)
                >= 2
            {
                return true;
            }
        }

        false
    }

    /// Returns true if the current position occurred at least `count`
    /// times in the game, this occurrence included.
    pub fn is_repetition(&self, count: u32) -> bool {
        // Cheap occupancy prescan before replaying the stack.
        let mut maybe_repetitions = 1;
        for state in self.state_stack.iter().rev() {
            if state.base.occupied() == self.base.occupied() {
                maybe_repetitions += 1;
                if maybe_repetitions >= count {
                    break;
                }
            }
        }
        if maybe_repetitions < count {
            return false;
        }

        let key = self.transposition_key();
        let mut history = self.clone();
        let mut count = count;

        loop {
            if count <= 1 {
                return true;
            }

            if history.move_stack.len() < (count - 1) as usize {
                break;
            }

            let m = history.pop();
            if history.is_irreversible(m) {
                break;
            }

            if history.transposition_key() == key {
                count -= 1;
            }
        }

        false
    }

    /// Returns true if the position repeated five times (forced draw).
    pub fn is_fivefold_repetition(&self) -> bool {
        self.is_repetition(5)
    }

    fn transposition_key(&self) -> TranspositionKey {
        TranspositionKey {
            pieces: self.base.pieces,
            colors: self.base.colors,
            turn: self.turn,
            castling_rights: self.clean_castling_rights(),
            ep_square: self.ep_square.filter(|_| self.has_legal_en_passant()),
        }
    }

    /// Parses a UCI move and validates it against this position.
    ///
    /// Castling may be written king-to-rook ("e1h1") or in standard
    /// notation ("e1g1"); the returned move uses this board's encoding.
    /// The null move `0000` is accepted without a legality check.
    pub fn parse_uci(&self, uci: &str) -> Result<Move, MoveError> {
        let m = Move::from_uci(uci)?;

        if m.is_null() {
            return Ok(m);
        }

        let m = self.encode_move(self.normalize_castling(m));
        if !self.is_legal(m) {
            return Err(MoveError::Illegal(uci.to_string(), self.fen()));
        }
        Ok(m)
    }

    /// Parses a UCI move, validates it, and plays it.
    pub fn push_uci(&mut self, uci: &str) -> Result<Move, MoveError> {
        let m = self.parse_uci(uci)?;
        self.push(m);
        Ok(m)
    }

    /// Returns the position mirrored vertically with colors swapped.
    ///
    /// Turn, castling rights, and the en passant square are mirrored
    /// along. The mirrored board has no move history.
    pub fn mirrored(&self) -> Board {
        let mut board = self.clone_without_stack();
        board.base = self.base.mirrored();
        board.turn = self.turn.opposite();
        board.castling_rights = self.castling_rights.flip_vertical();
        board.ep_square = self.ep_square.map(Square::mirror);
        board
    }
}

/// Resolves a FEN castling field against the given placement.
fn parse_castling_fen(base: &BaseBoard, castling_fen: &str) -> Result<Bitboard, FenError> {
    if castling_fen.is_empty() || castling_fen == "-" {
        return Ok(Bitboard::EMPTY);
    }

    let mut rights = Bitboard::EMPTY;
    for flag in castling_fen.chars() {
        let color = if flag.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let backrank = Bitboard::rank(color.back_rank());
        let rooks = base.occupied_by(color) & base.rooks() & backrank;
        let king = base.king(color);

        match flag.to_ascii_lowercase() {
            'q' => match (king, rooks.lsb()) {
                // The outermost rook below the king castles queenside.
                (Some(king), Some(rook)) if rook < king.index() => {
                    rights |= Bitboard(rooks.0 & rooks.0.wrapping_neg());
                }
                (Some(_), None) => {}
                _ => rights |= Bitboard::FILE_A & backrank,
            },
            'k' => match (king, rooks.msb()) {
                (Some(king), Some(rook)) if king < rook => {
                    rights |= Bitboard::from_square(rook);
                }
                _ => rights |= Bitboard::FILE_H & backrank,
            },
            other => match File::from_char(other) {
                Some(file) => rights |= Bitboard::file(file) & backrank,
                None => {
                    return Err(FenError::InvalidCastlingRights(format!(
                        "invalid character '{flag}'"
                    )));
                }
            },
        }
    }
    Ok(rights)
}

/// Keeps at most one castling rook on each side of a Chess960 king.
fn clean_960_side(castling: Bitboard, king_mask: Bitboard) -> Bitboard {
    let Some(king) = king_mask.msb() else {
        return Bitboard::EMPTY;
    };

    let a_side = Bitboard(castling.0 & castling.0.wrapping_neg());
    let h_side = castling
        .msb()
        .map_or(Bitboard::EMPTY, Bitboard::from_square);

    let a_side = match a_side.msb() {
        Some(rook) if rook > king => Bitboard::EMPTY,
        _ => a_side,
    };
    let h_side = match h_side.msb() {
        Some(rook) if rook < king => Bitboard::EMPTY,
        _ => h_side,
    };

    a_side | h_side
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl PartialEq for Board {
    /// Boards compare equal when they represent the same position: same
    /// placement, turn, usable castling rights and en passant square, and
    /// the same move counters. Move history is not compared.
    fn eq(&self, other: &Self) -> bool {
        self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.transposition_key() == other.transposition_key()
    }
}

impl Eq for Board {}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(\"{}\")", self.fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    fn uci(s: &str) -> Move {
        Move::from_uci(s).unwrap()
    }

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn new_board_is_startpos() {
        let board = Board::new();
        assert_eq!(board.fen(), FenParser::STARTPOS);
        assert_eq!(board.turn(), Color::White);
        assert_eq!(board.castling_rights(), Bitboard::CORNERS);
        assert_eq!(board.ep_square(), None);
        assert_eq!(board.ply(), 0);
        assert_eq!(board.peek(), None);
        assert!(!board.is_check());
    }

    #[test]
    fn fen_round_trips() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "8/8/8/4k3/8/8/4K3/8 w - - 37 92",
            "4k3/8/8/8/8/8/8/4K2R w K - 0 1",
        ];
        for fen in fens {
            assert_eq!(board(fen).fen(), fen);
        }
    }

    #[test]
    fn set_fen_error_leaves_board_unchanged() {
        let mut board = Board::new();
        assert!(board.set_fen("not a fen").is_err());
        assert!(board.set_fen("9/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert_eq!(board.fen(), FenParser::STARTPOS);
    }

    #[test]
    fn push_updates_counters_and_ep() {
        let mut board = Board::new();
        board.push(uci("e2e4"));
        assert_eq!(board.turn(), Color::Black);
        assert_eq!(board.ep_square(), Some(sq("e3")));
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);
        assert_eq!(board.ply(), 1);

        board.push(uci("g8f6"));
        assert_eq!(board.turn(), Color::White);
        assert_eq!(board.ep_square(), None);
        assert_eq!(board.halfmove_clock(), 1);
        assert_eq!(board.fullmove_number(), 2);

        board.push(uci("b1c3"));
        assert_eq!(board.halfmove_clock(), 2);
    }

    #[test]
    fn push_pop_round_trip() {
        let mut board = Board::new();
        let original = board.fen();

        for m in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6"] {
            board.push_uci(m).unwrap();
        }
        assert_eq!(board.move_stack().len(), 6);
        assert_eq!(board.peek(), Some(uci("a7a6")));
        assert_eq!(board.root().fen(), original);

        for _ in 0..6 {
            board.pop();
        }
        assert_eq!(board.fen(), original);
        assert!(board.move_stack().is_empty());
    }

    #[test]
    #[should_panic(expected = "pop from empty move stack")]
    fn pop_on_empty_stack_panics() {
        Board::new().pop();
    }

    #[test]
    fn null_move_passes_turn() {
        let mut board = board("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
        board.push(Move::NULL);
        assert_eq!(board.turn(), Color::White);
        assert_eq!(board.ep_square(), None);
        assert_eq!(board.halfmove_clock(), 1);
        assert_eq!(board.fullmove_number(), 2);

        let undone = board.pop();
        assert!(undone.is_null());
        assert_eq!(board.ep_square(), Some(sq("e3")));
    }

    #[test]
    fn capture_zeroes_halfmove_clock() {
        let mut board = board("4k3/8/8/2p5/4N3/8/8/4K3 w - - 12 30");
        board.push(uci("e4c5"));
        assert_eq!(board.halfmove_clock(), 0);
        board.pop();
        assert_eq!(board.halfmove_clock(), 12);
    }

    #[test]
    fn en_passant_push_removes_captured_pawn() {
        let mut board = board("4k3/8/8/8/5p2/8/4P3/4K3 w - - 0 1");
        board.push(uci("e2e4"));
        board.push(uci("f4e3"));
        assert_eq!(board.piece_at(sq("e4")), None);
        assert_eq!(
            board.piece_at(sq("e3")),
            Some(Piece::new(PieceType::Pawn, Color::Black))
        );

        board.pop();
        assert_eq!(
            board.piece_at(sq("e4")),
            Some(Piece::new(PieceType::Pawn, Color::White))
        );
        assert_eq!(
            board.piece_at(sq("f4")),
            Some(Piece::new(PieceType::Pawn, Color::Black))
        );
    }

    #[test]
    fn castling_push_moves_both_pieces() {
        let mut board = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        board.push(uci("e1g1"));
        assert_eq!(
            board.piece_at(Square::G1),
            Some(Piece::new(PieceType::King, Color::White))
        );
        assert_eq!(
            board.piece_at(Square::F1),
            Some(Piece::new(PieceType::Rook, Color::White))
        );
        assert!(!board.has_castling_rights(Color::White));
        assert!(board.has_castling_rights(Color::Black));

        board.push(uci("e8c8"));
        assert_eq!(
            board.piece_at(Square::C8),
            Some(Piece::new(PieceType::King, Color::Black))
        );
        assert_eq!(
            board.piece_at(Square::D8),
            Some(Piece::new(PieceType::Rook, Color::Black))
        );
        assert!(!board.has_castling_rights(Color::Black));

        board.pop();
        board.pop();
        assert_eq!(board.fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    }

    #[test]
    fn castling_classification() {
        let board = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(board.is_castling(uci("e1g1")));
        assert!(board.is_kingside_castling(uci("e1g1")));
        assert!(board.is_castling(uci("e1h1")));
        assert!(board.is_queenside_castling(uci("e1c1")));
        assert!(!board.is_castling(uci("e1d1")));
        assert!(!board.is_castling(uci("a1a5")));
    }

    #[test]
    fn promotion_push_and_undo() {
        let mut board = board("4k3/1P6/8/8/8/8/8/4K3 w - - 4 40");
        board.push(uci("b7b8q"));
        assert_eq!(
            board.piece_at(sq("b8")),
            Some(Piece::new(PieceType::Queen, Color::White))
        );
        assert!(board.base().promoted().contains(sq("b8")));
        assert_eq!(board.halfmove_clock(), 0);

        board.pop();
        assert_eq!(
            board.piece_at(sq("b7")),
            Some(Piece::new(PieceType::Pawn, Color::White))
        );
        assert_eq!(board.halfmove_clock(), 4);
    }

    #[test]
    fn moving_king_or_rook_loses_rights() {
        let mut board = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        board.push(uci("a1a2"));
        assert!(!board.has_queenside_castling_rights(Color::White));
        assert!(board.has_kingside_castling_rights(Color::White));
        board.pop();

        board.push(uci("e1e2"));
        assert!(!board.has_castling_rights(Color::White));
        assert!(board.has_castling_rights(Color::Black));
        board.pop();

        // Capturing a rook removes the right tied to its square.
        board.push(uci("a1a8"));
        assert!(!board.has_queenside_castling_rights(Color::Black));
        assert!(board.has_kingside_castling_rights(Color::Black));
    }

    #[test]
    fn clean_castling_rights_filters_stale_bits() {
        // Rights are claimed in the FEN but the king is displaced.
        let displaced = board("r3k2r/8/8/8/8/8/4K3/R6R w KQkq - 0 1");
        assert!(!displaced.has_castling_rights(Color::White));
        assert!(displaced.has_castling_rights(Color::Black));
        assert_eq!(displaced.castling_xfen(), "kq");

        // A rook off its corner drops its bit in standard chess.
        let lifted = board("r3k2r/8/8/8/8/1R6/8/4K2R w KQkq - 0 1");
        assert_eq!(
            lifted.clean_castling_rights() & Bitboard::RANK_1,
            Bitboard::from_square(Square::H1)
        );
    }

    #[test]
    fn xfen_emits_file_letter_for_ambiguous_rook() {
        // Two white rooks on the queenside; the inner one holds the right.
        let board = Board::from_fen_chess960("4k3/8/8/8/8/8/8/RR2K3 w B - 0 1").unwrap();
        let clean = board.clean_castling_rights();
        assert_eq!(clean, Bitboard::from_square(Square::B1));
        assert_eq!(board.castling_xfen(), "B");
    }

    #[test]
    fn chess960_rights_keep_one_rook_per_side() {
        let board = Board::from_fen_chess960("rkr5/8/8/8/8/8/8/RKR5 w CAca - 0 1").unwrap();
        let clean = board.clean_castling_rights();
        assert!(clean.contains(Square::A1));
        assert!(clean.contains(Square::C1));
        assert!(clean.contains(Square::A8));
        assert!(clean.contains(Square::C8));
        assert!(board.has_kingside_castling_rights(Color::White));
        assert!(board.has_queenside_castling_rights(Color::White));
        assert_eq!(board.castling_shredder_fen(), "CAca");
        assert_eq!(board.castling_xfen(), "KQkq");
    }

    #[test]
    fn checkmate_and_outcome() {
        // Fool's mate.
        let mut board = Board::new();
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            board.push_uci(m).unwrap();
        }
        assert!(board.is_check());
        assert!(board.is_checkmate());
        assert!(board.is_game_over(false));
        assert_eq!(
            board.outcome(false),
            Some(Outcome::new(Termination::Checkmate, Some(Color::Black)))
        );
        assert_eq!(board.result(false), "0-1");
    }

    #[test]
    fn stalemate_outcome() {
        let board = board("k7/8/1Q6/8/8/8/8/7K b - - 0 1");
        assert!(board.is_stalemate());
        assert!(!board.is_checkmate());
        assert_eq!(
            board.outcome(false),
            Some(Outcome::new(Termination::Stalemate, None))
        );
        assert_eq!(board.result(false), "1/2-1/2");
    }

    #[test]
    fn insufficient_material_cases() {
        let insufficient = [
            "k7/8/8/8/8/8/8/7K w - - 0 1",       // K vs K
            "k7/8/8/8/8/8/8/5B1K w - - 0 1",     // KB vs K
            "k7/8/8/8/8/8/8/5N1K w - - 0 1",     // KN vs K
            "k5b1/8/8/8/8/8/8/5B1K w - - 0 1",   // bishops on one color
        ];
        for fen in insufficient {
            assert!(board(fen).is_insufficient_material(), "{fen}");
        }

        let sufficient = [
            "k7/8/8/8/8/8/8/4NN1K w - - 0 1",    // two knights
            "k4b2/8/8/8/8/8/8/5B1K w - - 0 1",   // opposite-colored bishops
            "k6n/8/8/8/8/8/8/5B1K w - - 0 1",    // bishop vs knight
            "k7/8/8/8/8/8/8/6RK w - - 0 1",      // rook
            "k7/7p/8/8/8/8/8/7K w - - 0 1",      // pawn
        ];
        for fen in sufficient {
            assert!(!board(fen).is_insufficient_material(), "{fen}");
        }
    }

    #[test]
    fn fifty_and_seventyfive_move_rules() {
        let board_100 = board("4k3/7r/8/8/8/8/R7/4K3 w - - 100 80");
        assert!(board_100.is_fifty_moves());
        assert!(board_100.can_claim_fifty_moves());
        assert!(!board_100.is_seventyfive_moves());
        assert_eq!(board_100.outcome(false), None);
        assert_eq!(
            board_100.outcome(true),
            Some(Outcome::new(Termination::FiftyMoves, None))
        );

        let board_150 = board("4k3/7r/8/8/8/8/R7/4K3 w - - 150 90");
        assert!(board_150.is_seventyfive_moves());
        assert_eq!(
            board_150.outcome(false),
            Some(Outcome::new(Termination::SeventyfiveMoves, None))
        );

        // One ply short: claimable because a quiet move reaches the limit.
        let board_99 = board("4k3/7r/8/8/8/8/R7/4K3 w - - 99 80");
        assert!(!board_99.is_fifty_moves());
        assert!(board_99.can_claim_fifty_moves());
    }

    #[test]
    fn threefold_and_fivefold_repetition() {
        let mut board = Board::new();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];

        board.push_uci(shuffle[0]).unwrap();
        board.push_uci(shuffle[1]).unwrap();
        board.push_uci(shuffle[2]).unwrap();
        assert!(!board.can_claim_threefold_repetition());

        board.push_uci(shuffle[3]).unwrap(); // 2nd occurrence of startpos
        for m in shuffle {
            board.push_uci(m).unwrap(); // 3rd occurrence
        }
        assert!(board.is_repetition(3));
        assert!(board.can_claim_threefold_repetition());
        assert!(!board.is_fivefold_repetition());
        assert_eq!(board.outcome(false), None);
        assert_eq!(
            board.outcome(true),
            Some(Outcome::new(Termination::ThreefoldRepetition, None))
        );

        for _ in 0..2 {
            for m in shuffle {
                board.push_uci(m).unwrap();
            }
        }
        // 5th occurrence: now a forced draw.
        assert!(board.is_fivefold_repetition());
        assert_eq!(
            board.outcome(false),
            Some(Outcome::new(Termination::FivefoldRepetition, None))
        );
    }

    #[test]
    fn threefold_claim_sees_one_move_ahead() {
        let mut board = Board::new();
        for m in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1"] {
            board.push_uci(m).unwrap();
        }
        // Black can reach the third occurrence with f6g8.
        assert!(board.can_claim_threefold_repetition());
        assert!(!board.is_repetition(3));
    }

    #[test]
    fn repetition_counting_stops_at_irreversible_moves() {
        let mut board = Board::new();
        for m in ["e2e4", "e7e5", "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
            board.push_uci(m).unwrap();
        }
        // The position after 1. e4 e5 occurred three times, but the pawn
        // moves fence off anything before them.
        assert!(board.is_repetition(3));
        assert!(!board.is_repetition(4));
    }

    #[test]
    fn transposition_ignores_unusable_ep_square() {
        let mut pushed = Board::new();
        pushed.push(uci("e2e4"));
        // No black pawn can capture on e3, so the ep square does not
        // distinguish the positions.
        let parsed = board("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
        assert_eq!(pushed, parsed);
        assert_ne!(pushed.fen(), parsed.fen());
    }

    #[test]
    fn gives_check_without_mutating() {
        let board = board("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        assert!(board.gives_check(uci("a1a8")));
        assert!(!board.gives_check(uci("a1a2")));
        assert_eq!(board.turn(), Color::White);
        assert!(board.move_stack().is_empty());
    }

    #[test]
    fn was_into_check_after_push() {
        let mut board = board("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1");
        assert!(board.is_check());
        board.push(uci("e1d1")); // legal evasion
        assert!(!board.was_into_check());
        board.pop();
        board.push(uci("e1e2")); // captures the rook, still fine
        assert!(!board.was_into_check());
    }

    #[test]
    fn capture_classification() {
        let board = board("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        assert!(board.is_capture(uci("e4d5")));
        assert!(!board.is_capture(uci("e4e5")));
        assert!(board.is_zeroing(uci("e4e5")));
        assert!(!board.is_zeroing(uci("e1e2")));
    }

    #[test]
    fn parse_uci_validates_moves() {
        let mut board = Board::new();
        assert_eq!(board.parse_uci("e2e4"), Ok(uci("e2e4")));
        assert_eq!(board.parse_uci("0000"), Ok(Move::NULL));
        assert!(matches!(
            board.parse_uci("e2e5"),
            Err(MoveError::Illegal(_, _))
        ));
        assert!(matches!(board.parse_uci("e9e4"), Err(MoveError::Uci(_))));

        board.push_uci("e2e4").unwrap();
        let err = board.push_uci("e7e4").unwrap_err();
        assert!(err.to_string().contains("illegal move 'e7e4'"));
    }

    #[test]
    fn parse_uci_normalizes_castling() {
        let board = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        // King-to-rook input is folded onto the standard encoding.
        assert_eq!(board.parse_uci("e1h1"), Ok(uci("e1g1")));
        assert_eq!(board.parse_uci("e1g1"), Ok(uci("e1g1")));
    }

    #[test]
    fn chess960_castling_round_trip() {
        let mut board =
            Board::from_fen_chess960("1k6/8/8/8/8/8/8/2R1K2R w HC - 0 1").unwrap();
        assert!(board.is_chess960());
        assert_eq!(board.castling_shredder_fen(), "HC");

        let m = board.parse_uci("e1h1").unwrap();
        assert_eq!(m, uci("e1h1"));
        board.push(m);
        assert_eq!(
            board.piece_at(Square::G1),
            Some(Piece::new(PieceType::King, Color::White))
        );
        assert_eq!(
            board.piece_at(Square::F1),
            Some(Piece::new(PieceType::Rook, Color::White))
        );
        assert!(!board.has_castling_rights(Color::White));
    }

    #[test]
    fn mirrored_swaps_everything() {
        let board = board("r3k3/8/8/8/8/8/8/4K2R w Kq - 3 7");
        let mirrored = board.mirrored();
        assert_eq!(mirrored.fen(), "4k2r/8/8/8/8/8/8/R3K3 b Qk - 3 7");
        assert_eq!(mirrored.mirrored().fen(), board.fen());
    }

    #[test]
    fn set_piece_at_clears_history() {
        let mut board = Board::new();
        board.push(uci("e2e4"));
        board.set_piece_at(sq("h5"), Some(Piece::new(PieceType::Queen, Color::White)), false);
        assert!(board.move_stack().is_empty());
    }

    #[test]
    fn reset_and_clear_board() {
        let mut board = Board::new();
        board.push(uci("e2e4"));
        board.reset();
        assert_eq!(board.fen(), FenParser::STARTPOS);

        board.clear_board();
        assert_eq!(board.fen(), "8/8/8/8/8/8/8/8 w - - 0 1");
    }

    #[test]
    fn debug_shows_fen() {
        assert_eq!(
            format!("{:?}", Board::new()),
            format!("Board(\"{}\")", FenParser::STARTPOS)
        );
    }
}
