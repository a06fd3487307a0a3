//! Move generation and legality checking.
//!
//! Pseudo-legal generation walks the position in stages: piece moves,
//! castling, pawn captures, pawn advances, and en passant. Legal generation
//! layers a safety filter on top: when the king is in check only evasions
//! are considered, otherwise pseudo-legal moves are checked against pins
//! and discovered attacks without making the move on the board.

use crate::attacks::{between, bishop_attacks, king_attacks, pawn_attacks, ray, rook_attacks};
use crate::board::Board;
use crate::Bitboard;
use chess_core::{Color, File, Move, PieceType, Rank, Square};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so a fixed-size array
/// avoids heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Upper bound on the number of moves in any position.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// Iterates over the moves.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// Returns true if the list contains the given move.
    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = MoveListIter;

    fn into_iter(self) -> MoveListIter {
        MoveListIter {
            list: self,
            index: 0,
        }
    }
}

/// Owning iterator over a [`MoveList`].
pub struct MoveListIter {
    list: MoveList,
    index: usize,
}

impl Iterator for MoveListIter {
    type Item = Move;

    #[inline]
    fn next(&mut self) -> Option<Move> {
        if self.index < self.list.len {
            let m = self.list.moves[self.index];
            self.index += 1;
            Some(m)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.len - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MoveListIter {}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl Board {
    /// Generates all pseudo-legal moves.
    ///
    /// Pseudo-legal moves obey piece movement and castling path rules but
    /// may leave the mover's king in check. Null moves and drops are never
    /// generated.
    pub fn pseudo_legal_moves(&self) -> MoveList {
        self.pseudo_legal_moves_masked(Bitboard::FULL, Bitboard::FULL)
    }

    /// Generates pseudo-legal moves from squares in `from_mask` to squares
    /// in `to_mask`. For castling, `to_mask` selects the rook's square.
    pub fn pseudo_legal_moves_masked(&self, from_mask: Bitboard, to_mask: Bitboard) -> MoveList {
        let mut moves = MoveList::new();
        self.generate_pseudo_legal_into(&mut moves, from_mask, to_mask);
        moves
    }

    /// Generates all legal moves.
    pub fn legal_moves(&self) -> MoveList {
        self.legal_moves_masked(Bitboard::FULL, Bitboard::FULL)
    }

    /// Generates legal moves restricted by from/to masks.
    pub fn legal_moves_masked(&self, from_mask: Bitboard, to_mask: Bitboard) -> MoveList {
        let mut moves = MoveList::new();
        let king_mask = self.base.kings() & self.base.occupied_by(self.turn);

        let Some(king) = king_mask.msb() else {
            // Without a king every pseudo-legal move is legal.
            self.generate_pseudo_legal_into(&mut moves, from_mask, to_mask);
            return moves;
        };

        let blockers = self.slider_blockers(king);
        let checkers = self.base.attackers_mask(self.turn.opposite(), king);

        let mut candidates = MoveList::new();
        if checkers.is_not_empty() {
            self.generate_evasions_into(&mut candidates, king, checkers, from_mask, to_mask);
        } else {
            self.generate_pseudo_legal_into(&mut candidates, from_mask, to_mask);
        }

        for m in &candidates {
            if self.is_safe(king, blockers, *m) {
                moves.push(*m);
            }
        }
        moves
    }

    pub(crate) fn generate_pseudo_legal_into(
        &self,
        moves: &mut MoveList,
        from_mask: Bitboard,
        to_mask: Bitboard,
    ) {
        let us = self.base.occupied_by(self.turn);
        let them = self.base.occupied_by(self.turn.opposite());

        // Piece moves: everything except pawns.
        let non_pawns = us & !self.base.pawns() & from_mask;
        for from in non_pawns {
            let targets = self.base.attacks_mask(from) & !us & to_mask;
            for to in targets {
                moves.push(Move::new(from, to));
            }
        }

        // Castling.
        if (from_mask & self.base.kings()).is_not_empty() {
            self.generate_castling_into(moves, from_mask, to_mask);
        }

        // Pawn moves.
        let pawns = self.base.pawns() & us & from_mask;
        if pawns.is_empty() {
            return;
        }

        // Captures.
        for from in pawns {
            let targets = pawn_attacks(from, self.turn) & them & to_mask;
            for to in targets {
                if to.rank() == Rank::R1 || to.rank() == Rank::R8 {
                    for promotion in PieceType::PROMOTIONS {
                        moves.push(Move::with_promotion(from, to, promotion));
                    }
                } else {
                    moves.push(Move::new(from, to));
                }
            }
        }

        // Single and double advances.
        let (mut single_moves, mut double_moves, push) = match self.turn {
            Color::White => {
                let single = pawns.north() & !self.base.occupied();
                let double =
                    single.north() & !self.base.occupied() & (Bitboard::RANK_3 | Bitboard::RANK_4);
                (single, double, 8i8)
            }
            Color::Black => {
                let single = pawns.south() & !self.base.occupied();
                let double =
                    single.south() & !self.base.occupied() & (Bitboard::RANK_6 | Bitboard::RANK_5);
                (single, double, -8i8)
            }
        };
        single_moves &= to_mask;
        double_moves &= to_mask;

        for to in single_moves {
            // A single-push target always has a board square behind it.
            let from = unsafe { Square::from_index_unchecked((to.index() as i8 - push) as u8) };
            if to.rank() == Rank::R1 || to.rank() == Rank::R8 {
                for promotion in PieceType::PROMOTIONS {
                    moves.push(Move::with_promotion(from, to, promotion));
                }
            } else {
                moves.push(Move::new(from, to));
            }
        }

        for to in double_moves {
            let from = unsafe { Square::from_index_unchecked((to.index() as i8 - 2 * push) as u8) };
            moves.push(Move::new(from, to));
        }

        // En passant.
        self.generate_ep_into(moves, from_mask, to_mask);
    }

    fn generate_castling_into(&self, moves: &mut MoveList, from_mask: Bitboard, to_mask: Bitboard) {
        let backrank = Bitboard::rank(self.turn.back_rank());
        let king_mask = self.base.occupied_by(self.turn)
            & self.base.kings()
            & !self.base.promoted()
            & backrank
            & from_mask;
        // Only the least significant king participates.
        let king_mask = Bitboard(king_mask.0 & king_mask.0.wrapping_neg());
        let Some(king) = king_mask.msb() else {
            return;
        };

        for candidate in self.clean_castling_rights() & backrank & to_mask {
            let rook_mask = Bitboard::from_square(candidate);
            let a_side = candidate < king;

            let king_to = Square::new(if a_side { File::C } else { File::G }, self.turn.back_rank());
            let rook_to = Square::new(if a_side { File::D } else { File::F }, self.turn.back_rank());
            let king_to_mask = Bitboard::from_square(king_to);
            let rook_to_mask = Bitboard::from_square(rook_to);

            let king_path = between(king, king_to);
            let rook_path = between(candidate, rook_to);

            let cleared = self.base.occupied() ^ king_mask ^ rook_mask;
            if (cleared & (king_path | rook_path | king_to_mask | rook_to_mask)).is_not_empty() {
                continue;
            }
            if self.attacked_for_king(king_path | king_mask, self.base.occupied() ^ king_mask) {
                continue;
            }
            if self.attacked_for_king(
                king_to_mask,
                self.base.occupied() ^ king_mask ^ rook_mask ^ rook_to_mask,
            ) {
                continue;
            }

            moves.push(self.encode_move(Move::new(king, candidate)));
        }
    }

    pub(crate) fn generate_ep_into(
        &self,
        moves: &mut MoveList,
        from_mask: Bitboard,
        to_mask: Bitboard,
    ) {
        let Some(ep_square) = self.ep_square else {
            return;
        };
        let ep_mask = Bitboard::from_square(ep_square);
        if (ep_mask & to_mask).is_empty() || (ep_mask & self.base.occupied()).is_not_empty() {
            return;
        }

        let fifth_rank = match self.turn {
            Color::White => Bitboard::RANK_5,
            Color::Black => Bitboard::RANK_4,
        };
        let capturers = self.base.pawns()
            & self.base.occupied_by(self.turn)
            & from_mask
            & pawn_attacks(ep_square, self.turn.opposite())
            & fifth_rank;

        for capturer in capturers {
            moves.push(Move::new(capturer, ep_square));
        }
    }

    fn generate_evasions_into(
        &self,
        moves: &mut MoveList,
        king: Square,
        checkers: Bitboard,
        from_mask: Bitboard,
        to_mask: Bitboard,
    ) {
        let sliders = checkers & (self.base.bishops() | self.base.rooks() | self.base.queens());

        // Squares the king cannot step to because a checking slider keeps
        // attacking along its ray once the king moves.
        let mut attacked = Bitboard::EMPTY;
        for checker in sliders {
            attacked |= ray(king, checker) & !Bitboard::from_square(checker);
        }

        if from_mask.contains(king) {
            let steps = king_attacks(king)
                & !self.base.occupied_by(self.turn)
                & !attacked
                & to_mask;
            for to in steps {
                moves.push(Move::new(king, to));
            }
        }

        // With a single checker, the check can also be blocked or the
        // checker captured.
        if let Some(checker) = checkers.msb() {
            if Bitboard::from_square(checker) == checkers {
                let target = between(king, checker) | checkers;
                self.generate_pseudo_legal_into(
                    moves,
                    !self.base.kings() & from_mask,
                    target & to_mask,
                );

                // Capture a checking pawn en passant, unless that square is
                // already covered by the target mask.
                if let Some(ep_square) = self.ep_square {
                    if !target.contains(ep_square) {
                        let down = if self.turn == Color::White { -8 } else { 8 };
                        if ep_square.offset(down) == Some(checker) {
                            self.generate_ep_into(moves, from_mask, to_mask);
                        }
                    }
                }
            }
        }
    }

    /// Finds our pieces that shield the king from an enemy slider.
    pub(crate) fn slider_blockers(&self, king: Square) -> Bitboard {
        let rooks_and_queens = self.base.rooks() | self.base.queens();
        let bishops_and_queens = self.base.bishops() | self.base.queens();

        let snipers = (rook_attacks(king, Bitboard::EMPTY) & rooks_and_queens)
            | (bishop_attacks(king, Bitboard::EMPTY) & bishops_and_queens);

        let mut blockers = Bitboard::EMPTY;
        for sniper in snipers & self.base.occupied_by(self.turn.opposite()) {
            let b = between(king, sniper) & self.base.occupied();
            // A blocker shields the king alone.
            if b.count() == 1 {
                blockers |= b;
            }
        }

        blockers & self.base.occupied_by(self.turn)
    }

    /// Checks whether a candidate move keeps the king out of check, given
    /// the precomputed blockers, without making the move.
    fn is_safe(&self, king: Square, blockers: Bitboard, m: Move) -> bool {
        if m.from == king {
            if self.is_castling(m) {
                true
            } else {
                !self.base.is_attacked_by(self.turn.opposite(), m.to)
            }
        } else if self.is_en_passant(m) {
            self.base.pin_mask(self.turn, m.from).contains(m.to)
                && !self.ep_skewered(king, m.from)
        } else {
            !blockers.contains(m.from) || ray(m.from, m.to).contains(king)
        }
    }

    /// Checks whether capturing en passant would expose the king on the
    /// rank vacated by both pawns.
    fn ep_skewered(&self, king: Square, capturer: Square) -> bool {
        let Some(ep_square) = self.ep_square else {
            return false;
        };
        let down = if self.turn == Color::White { -8 } else { 8 };
        let Some(last_double) = ep_square.offset(down) else {
            return false;
        };

        // Occupancy as it would be after the capture.
        let occupancy = (self.base.occupied()
            & !Bitboard::from_square(last_double)
            & !Bitboard::from_square(capturer))
            | Bitboard::from_square(ep_square);

        let them = self.base.occupied_by(self.turn.opposite());

        let horizontal_attackers = them & (self.base.rooks() | self.base.queens());
        if (rook_attacks(king, occupancy) & horizontal_attackers).is_not_empty() {
            return true;
        }

        // Diagonal skewers cannot occur in reachable positions, but the
        // board accepts unreachable setups.
        let diagonal_attackers = them & (self.base.bishops() | self.base.queens());
        if (bishop_attacks(king, occupancy) & diagonal_attackers).is_not_empty() {
            return true;
        }

        false
    }

    /// Checks whether any square of `path` is attacked by the opponent
    /// under the given occupancy.
    fn attacked_for_king(&self, path: Bitboard, occupied: Bitboard) -> bool {
        let them = self.turn.opposite();
        path.into_iter()
            .any(|sq| self.base.attackers_with(them, sq, occupied).is_not_empty())
    }

    /// Checks whether a move follows basic movement rules in this position,
    /// ignoring whether it would leave the king in check.
    pub fn is_pseudo_legal(&self, m: Move) -> bool {
        // Null moves and drops are never pseudo-legal.
        if m.is_null() || m.drop.is_some() {
            return false;
        }

        let Some(piece) = self.base.piece_type_at(m.from) else {
            return false;
        };

        let from_mask = Bitboard::from_square(m.from);
        let to_mask = Bitboard::from_square(m.to);

        // The source square must hold a piece of the side to move.
        if (self.base.occupied_by(self.turn) & from_mask).is_empty() {
            return false;
        }

        // Only pawns can promote, and only on the back rank.
        if m.promotion.is_some() {
            if piece != PieceType::Pawn {
                return false;
            }
            match self.turn {
                Color::White if m.to.rank() != Rank::R8 => return false,
                Color::Black if m.to.rank() != Rank::R1 => return false,
                _ => {}
            }
        }

        // King moves may be castling, encoded either way.
        if piece == PieceType::King {
            let candidate = self.encode_move(Move::new(m.from, m.to));
            let mut castling = MoveList::new();
            self.generate_castling_into(&mut castling, Bitboard::FULL, Bitboard::FULL);
            if castling.contains(candidate) {
                return true;
            }
        }

        // The destination cannot hold one of our own pieces.
        if (self.base.occupied_by(self.turn) & to_mask).is_not_empty() {
            return false;
        }

        // Pawn moves carry extra structure; match them against the
        // generated list.
        if piece == PieceType::Pawn {
            return self.pseudo_legal_moves_masked(from_mask, to_mask).contains(m);
        }

        // All other pieces move along their attack sets.
        (self.base.attacks_mask(m.from) & to_mask).is_not_empty()
    }

    /// Checks whether a pseudo-legal move would leave or put our king in
    /// check.
    pub fn is_into_check(&self, m: Move) -> bool {
        let Some(king) = self.base.king(self.turn) else {
            return false;
        };

        // If already in check, the move must be one of the generated
        // evasions.
        let checkers = self.base.attackers_mask(self.turn.opposite(), king);
        if checkers.is_not_empty() {
            let mut evasions = MoveList::new();
            self.generate_evasions_into(
                &mut evasions,
                king,
                checkers,
                Bitboard::from_square(m.from),
                Bitboard::from_square(m.to),
            );
            if !evasions.contains(m) {
                return true;
            }
        }

        !self.is_safe(king, self.slider_blockers(king), m)
    }

    /// Checks full legality of a move in this position.
    pub fn is_legal(&self, m: Move) -> bool {
        self.is_pseudo_legal(m) && !self.is_into_check(m)
    }

    /// Returns true if a pseudo-legal en passant capture exists, pinned or
    /// not.
    pub fn has_pseudo_legal_en_passant(&self) -> bool {
        if self.ep_square.is_none() {
            return false;
        }
        let mut moves = MoveList::new();
        self.generate_ep_into(&mut moves, Bitboard::FULL, Bitboard::FULL);
        !moves.is_empty()
    }

    /// Returns true if a fully legal en passant capture exists.
    pub fn has_legal_en_passant(&self) -> bool {
        if self.ep_square.is_none() {
            return false;
        }
        let mut moves = MoveList::new();
        self.generate_ep_into(&mut moves, Bitboard::FULL, Bitboard::FULL);
        moves.iter().any(|m| !self.is_into_check(*m))
    }
}
