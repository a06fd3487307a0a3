//! Chess position engine with bitboard representation.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit board representation with efficient operations
//! - [`BaseBoard`] - Piece placement with attack, pin, and FEN logic
//! - [`Board`] - Full game state with move generation, legality checking,
//!   a push/pop move stack, and game-end detection
//! - [`MoveList`] - Fixed-capacity move container filled by generation
//! - Perft node counting for move generator validation
//!
//! # Architecture
//!
//! The engine uses bitboards for piece representation - each piece type and
//! each color has a 64-bit integer where each bit represents a square. Sliding
//! piece attacks are resolved through magic bitboard lookups backed by a
//! process-wide table set that is built on first use.
//!
//! # Example
//!
//! ```
//! use chess_board::Board;
//! use chess_core::Move;
//!
//! let mut board = Board::new();
//! board.push(Move::from_uci("e2e4").unwrap());
//! board.push(Move::from_uci("e7e5").unwrap());
//! assert_eq!(board.legal_moves().len(), 29);
//! board.pop();
//! assert_eq!(board.fen(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
//! ```

mod attacks;
mod baseboard;
mod bitboard;
mod board;
mod movegen;
pub mod perft;

pub use attacks::{
    between, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, ray,
    rook_attacks,
};
pub use baseboard::BaseBoard;
pub use bitboard::{Bitboard, BitboardIter, CarryRippler};
pub use board::{Board, MoveError};
pub use movegen::{MoveList, MoveListIter};
