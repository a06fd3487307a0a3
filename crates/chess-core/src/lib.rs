//! Core types for chess.
//!
//! This crate provides the fundamental types used across the board crates:
//! - [`Piece`], [`PieceType`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] for move representation, with UCI notation round-trip
//! - [`Outcome`] and [`Termination`] for finished games
//! - FEN field parsing and validation

mod color;
mod fen;
mod mov;
mod outcome;
mod piece;
mod square;

pub use color::Color;
pub use fen::{FenError, FenParser};
pub use mov::{Move, UciError};
pub use outcome::{Outcome, Termination};
pub use piece::{Piece, PieceType};
pub use square::{File, Rank, Square};
