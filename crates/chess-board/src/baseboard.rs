//! Piece placement without game state.
//!
//! [`BaseBoard`] tracks where pieces stand and answers attack, pin, and
//! serialization queries. It knows nothing about whose turn it is, castling
//! rights, or move legality; that logic lives in [`crate::Board`], which
//! embeds a `BaseBoard`.

use crate::attacks::{
    bishop_attacks, between, king_attacks, knight_attacks, pawn_attacks, ray, rook_attacks,
};
use crate::Bitboard;
use chess_core::{Color, FenError, File, Piece, PieceType, Rank, Square};
use std::fmt;

/// Piece placement on a chess board.
///
/// Each piece type and each color has its own bitboard; `occupied` is the
/// union of both color boards. The `promoted` bitboard marks pieces that
/// came from pawn promotion, which matters for castling-right bookkeeping
/// and for the optional `~` markers in board FENs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseBoard {
    pub(crate) pieces: [Bitboard; 6],
    pub(crate) colors: [Bitboard; 2],
    pub(crate) occupied: Bitboard,
    pub(crate) promoted: Bitboard,
}

impl BaseBoard {
    /// Creates a board with the standard starting placement.
    pub fn new() -> Self {
        BaseBoard {
            pieces: [
                Bitboard::RANK_2 | Bitboard::RANK_7,                 // pawns
                Bitboard(0x4200_0000_0000_0042),                     // knights
                Bitboard(0x2400_0000_0000_0024),                     // bishops
                Bitboard::CORNERS,                                   // rooks
                Bitboard(0x0800_0000_0000_0008),                     // queens
                Bitboard(0x1000_0000_0000_0010),                     // kings
            ],
            colors: [
                Bitboard::RANK_1 | Bitboard::RANK_2,
                Bitboard::RANK_7 | Bitboard::RANK_8,
            ],
            occupied: Bitboard::RANK_1 | Bitboard::RANK_2 | Bitboard::RANK_7 | Bitboard::RANK_8,
            promoted: Bitboard::EMPTY,
        }
    }

    /// Creates an empty board.
    pub fn empty() -> Self {
        BaseBoard {
            pieces: [Bitboard::EMPTY; 6],
            colors: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            promoted: Bitboard::EMPTY,
        }
    }

    /// Creates a board from the piece placement part of a FEN.
    pub fn from_board_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = BaseBoard::empty();
        board.set_board_fen(fen)?;
        Ok(board)
    }

    /// Removes all pieces.
    pub fn clear(&mut self) {
        *self = BaseBoard::empty();
    }

    #[inline]
    pub fn pawns(&self) -> Bitboard {
        self.pieces[PieceType::Pawn.index()]
    }

    #[inline]
    pub fn knights(&self) -> Bitboard {
        self.pieces[PieceType::Knight.index()]
    }

    #[inline]
    pub fn bishops(&self) -> Bitboard {
        self.pieces[PieceType::Bishop.index()]
    }

    #[inline]
    pub fn rooks(&self) -> Bitboard {
        self.pieces[PieceType::Rook.index()]
    }

    #[inline]
    pub fn queens(&self) -> Bitboard {
        self.pieces[PieceType::Queen.index()]
    }

    #[inline]
    pub fn kings(&self) -> Bitboard {
        self.pieces[PieceType::King.index()]
    }

    /// All occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    /// Squares occupied by the given color.
    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    /// Pieces that came from pawn promotion.
    #[inline]
    pub fn promoted(&self) -> Bitboard {
        self.promoted
    }

    /// Squares holding pieces of the given type and color.
    #[inline]
    pub fn pieces_mask(&self, piece_type: PieceType, color: Color) -> Bitboard {
        self.pieces[piece_type.index()] & self.colors[color.index()]
    }

    /// Returns the piece type on a square, if any.
    pub fn piece_type_at(&self, square: Square) -> Option<PieceType> {
        let mask = Bitboard::from_square(square);

        if (self.occupied & mask).is_empty() {
            None
        } else if (self.pawns() & mask).is_not_empty() {
            Some(PieceType::Pawn)
        } else if (self.knights() & mask).is_not_empty() {
            Some(PieceType::Knight)
        } else if (self.bishops() & mask).is_not_empty() {
            Some(PieceType::Bishop)
        } else if (self.rooks() & mask).is_not_empty() {
            Some(PieceType::Rook)
        } else if (self.queens() & mask).is_not_empty() {
            Some(PieceType::Queen)
        } else {
            Some(PieceType::King)
        }
    }

    /// Returns the piece on a square, if any.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let piece_type = self.piece_type_at(square)?;
        let color = if self.colors[Color::White.index()].contains(square) {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(piece_type, color))
    }

    /// Returns the color of the piece on a square, if any.
    pub fn color_at(&self, square: Square) -> Option<Color> {
        let mask = Bitboard::from_square(square);
        if (self.colors[Color::White.index()] & mask).is_not_empty() {
            Some(Color::White)
        } else if (self.colors[Color::Black.index()] & mask).is_not_empty() {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Finds the king of the given color.
    ///
    /// Pieces marked as promoted are ignored. Returns `None` if that side
    /// has no king.
    pub fn king(&self, color: Color) -> Option<Square> {
        (self.colors[color.index()] & self.kings() & !self.promoted).msb()
    }

    /// Returns the squares attacked by the piece on the given square.
    ///
    /// Returns the empty bitboard if the square is empty. Pinned pieces
    /// still count as attacking.
    pub fn attacks_mask(&self, square: Square) -> Bitboard {
        let mask = Bitboard::from_square(square);

        if (mask & self.pawns()).is_not_empty() {
            let color = if (mask & self.colors[Color::White.index()]).is_not_empty() {
                Color::White
            } else {
                Color::Black
            };
            pawn_attacks(square, color)
        } else if (mask & self.knights()).is_not_empty() {
            knight_attacks(square)
        } else if (mask & self.kings()).is_not_empty() {
            king_attacks(square)
        } else {
            let mut attacks = Bitboard::EMPTY;
            if (mask & (self.bishops() | self.queens())).is_not_empty() {
                attacks |= bishop_attacks(square, self.occupied);
            }
            if (mask & (self.rooks() | self.queens())).is_not_empty() {
                attacks |= rook_attacks(square, self.occupied);
            }
            attacks
        }
    }

    /// Returns the pieces of `color` that attack `square`.
    ///
    /// Pinned pieces still count as attackers.
    pub fn attackers_mask(&self, color: Color, square: Square) -> Bitboard {
        self.attackers_with(color, square, self.occupied)
    }

    /// Like [`attackers_mask`](Self::attackers_mask), but with an explicit
    /// occupancy, used when evaluating squares a move would vacate or fill.
    pub(crate) fn attackers_with(
        &self,
        color: Color,
        square: Square,
        occupied: Bitboard,
    ) -> Bitboard {
        let rank_and_file = self.rooks() | self.queens();
        let diagonal = self.bishops() | self.queens();

        let attackers = (king_attacks(square) & self.kings())
            | (knight_attacks(square) & self.knights())
            | (rook_attacks(square, occupied) & rank_and_file)
            | (bishop_attacks(square, occupied) & diagonal)
            | (pawn_attacks(square, color.opposite()) & self.pawns());

        attackers & self.colors[color.index()]
    }

    /// Returns true if `square` is attacked by any piece of `color`.
    pub fn is_attacked_by(&self, color: Color, square: Square) -> bool {
        self.attackers_mask(color, square).is_not_empty()
    }

    /// Returns the pin ray constraining the piece of `color` on `square`.
    ///
    /// If the piece is absolutely pinned to its king by an enemy slider,
    /// the result is the full line through king and pinner; the piece may
    /// only move along it. Otherwise the result is the full bitboard,
    /// which constrains nothing. A side without a king is never pinned.
    pub fn pin_mask(&self, color: Color, square: Square) -> Bitboard {
        let Some(king) = self.king(color) else {
            return Bitboard::FULL;
        };

        let square_mask = Bitboard::from_square(square);
        let sliders = [
            (rook_attacks(king, Bitboard::EMPTY), self.rooks() | self.queens()),
            (
                bishop_attacks(king, Bitboard::EMPTY),
                self.bishops() | self.queens(),
            ),
        ];

        for (king_lines, family) in sliders {
            if (king_lines & square_mask).is_not_empty() {
                let snipers = king_lines & family & self.colors[color.opposite().index()];
                for sniper in snipers {
                    // Pinned if this piece is the only one between king and
                    // sniper.
                    if between(sniper, king) & (self.occupied | square_mask) == square_mask {
                        return ray(king, sniper);
                    }
                }
                break;
            }
        }

        Bitboard::FULL
    }

    /// Returns true if the piece of `color` on `square` is absolutely
    /// pinned.
    pub fn is_pinned(&self, color: Color, square: Square) -> bool {
        self.pin_mask(color, square) != Bitboard::FULL
    }

    /// Places a piece on a square, replacing whatever stood there.
    ///
    /// Passing `None` removes the piece. The `promoted` flag marks the
    /// piece as having come from pawn promotion.
    pub fn set_piece_at(&mut self, square: Square, piece: Option<Piece>, promoted: bool) {
        match piece {
            Some(piece) => self.put_piece(square, piece.piece_type, piece.color, promoted),
            None => {
                self.take_piece(square);
            }
        }
    }

    /// Removes and returns the piece on a square.
    pub fn remove_piece_at(&mut self, square: Square) -> Option<Piece> {
        let color = self.color_at(square)?;
        let piece_type = self.take_piece(square)?;
        Some(Piece::new(piece_type, color))
    }

    pub(crate) fn put_piece(
        &mut self,
        square: Square,
        piece_type: PieceType,
        color: Color,
        promoted: bool,
    ) {
        self.take_piece(square);

        let mask = Bitboard::from_square(square);
        self.pieces[piece_type.index()] ^= mask;
        self.occupied ^= mask;
        self.colors[color.index()] ^= mask;
        if promoted {
            self.promoted ^= mask;
        }
    }

    pub(crate) fn take_piece(&mut self, square: Square) -> Option<PieceType> {
        let piece_type = self.piece_type_at(square)?;
        let mask = Bitboard::from_square(square);

        self.pieces[piece_type.index()] ^= mask;
        self.occupied ^= mask;
        self.colors[Color::White.index()] &= !mask;
        self.colors[Color::Black.index()] &= !mask;
        self.promoted &= !mask;

        Some(piece_type)
    }

    /// Iterates over all pieces on the board, from a1 towards h8.
    pub fn piece_map(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied
            .into_iter()
            .filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Writes the piece placement part of a FEN.
    ///
    /// With `promoted` set, promoted pieces are marked with a trailing `~`.
    pub fn board_fen(&self, promoted: bool) -> String {
        let mut builder = String::new();

        for rank in (0..8).rev() {
            let mut empty = 0u8;
            for file in 0..8 {
                let square = Square::new(File::ALL[file], Rank::ALL[rank]);
                match self.piece_at(square) {
                    None => empty += 1,
                    Some(piece) => {
                        if empty > 0 {
                            builder.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        builder.push(piece.fen_char());
                        if promoted && self.promoted.contains(square) {
                            builder.push('~');
                        }
                    }
                }
            }
            if empty > 0 {
                builder.push((b'0' + empty) as char);
            }
            if rank > 0 {
                builder.push('/');
            }
        }

        builder
    }

    /// Replaces the placement from the piece placement part of a FEN.
    ///
    /// Accepts `~` markers after pieces for promoted flags. On error the
    /// board is left unchanged.
    pub fn set_board_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let fen = fen.trim();
        if fen.contains(char::is_whitespace) {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected position part of fen, got: '{fen}'"
            )));
        }

        let rows: Vec<&str> = fen.split('/').collect();
        if rows.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 rows in position part of fen, got {}",
                rows.len()
            )));
        }

        // Validate before touching the board.
        for row in &rows {
            let mut field_sum = 0u32;
            let mut previous_was_digit = false;
            let mut previous_was_piece = false;

            for c in row.chars() {
                if let Some(digit) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    if previous_was_digit {
                        return Err(FenError::InvalidPiecePlacement(
                            "two subsequent digits in position part of fen".into(),
                        ));
                    }
                    field_sum += digit;
                    previous_was_digit = true;
                    previous_was_piece = false;
                } else if c == '~' {
                    if !previous_was_piece {
                        return Err(FenError::InvalidPiecePlacement(
                            "'~' not after piece in position part of fen".into(),
                        ));
                    }
                    previous_was_digit = false;
                    previous_was_piece = false;
                } else if Piece::from_fen_char(c).is_some() {
                    field_sum += 1;
                    previous_was_digit = false;
                    previous_was_piece = true;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{c}' in position part of fen"
                    )));
                }
            }

            if field_sum != 8 {
                return Err(FenError::InvalidPiecePlacement(
                    "expected 8 columns per row in position part of fen".into(),
                ));
            }
        }

        self.clear();
        for (row_index, row) in rows.iter().enumerate() {
            let rank = Rank::ALL[7 - row_index];
            let mut file_index = 0u8;
            let mut last_square = None;

            for c in row.chars() {
                if let Some(digit) = c.to_digit(10) {
                    file_index += digit as u8;
                } else if c == '~' {
                    if let Some(square) = last_square {
                        self.promoted |= Bitboard::from_square(square);
                    }
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    let square = Square::new(File::ALL[file_index as usize], rank);
                    self.put_piece(square, piece.piece_type, piece.color, false);
                    last_square = Some(square);
                    file_index += 1;
                }
            }
        }

        Ok(())
    }

    /// Applies a bitboard transformation to every board component.
    ///
    /// The function must be a permutation of the 64 squares for the result
    /// to make sense (e.g. the flip operations on [`Bitboard`]).
    pub fn apply_transform<F: Fn(Bitboard) -> Bitboard>(&mut self, f: F) {
        for bb in &mut self.pieces {
            *bb = f(*bb);
        }
        for bb in &mut self.colors {
            *bb = f(*bb);
        }
        self.occupied = f(self.occupied);
        self.promoted = f(self.promoted);
    }

    /// Returns the board flipped vertically with colors swapped.
    pub fn mirrored(&self) -> Self {
        let mut board = *self;
        board.apply_transform(Bitboard::flip_vertical);
        board.colors.swap(0, 1);
        board
    }
}

impl Default for BaseBoard {
    fn default() -> Self {
        BaseBoard::new()
    }
}

impl fmt::Display for BaseBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let square = Square::new(File::ALL[file], Rank::ALL[rank]);
                match self.piece_at(square) {
                    Some(piece) => write!(f, " {}", piece.fen_char())?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
