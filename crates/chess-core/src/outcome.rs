//! Game termination outcomes.

use crate::Color;
use std::fmt;

/// The rule under which a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The side to move has no legal moves and is in check.
    Checkmate,
    /// The side to move has no legal moves and is not in check.
    Stalemate,
    /// Neither side has enough material to deliver mate.
    InsufficientMaterial,
    /// 150 plies without a capture or pawn move (forced draw).
    SeventyfiveMoves,
    /// The same position occurred five times (forced draw).
    FivefoldRepetition,
    /// 100 plies without a capture or pawn move (claimed draw).
    FiftyMoves,
    /// The same position occurred three times (claimed draw).
    ThreefoldRepetition,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Termination::Checkmate => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::InsufficientMaterial => "insufficient material",
            Termination::SeventyfiveMoves => "seventy-five-move rule",
            Termination::FivefoldRepetition => "fivefold repetition",
            Termination::FiftyMoves => "fifty-move rule",
            Termination::ThreefoldRepetition => "threefold repetition",
        };
        write!(f, "{}", name)
    }
}

/// How a finished game ended and who won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    pub termination: Termination,
    /// The winning color, or `None` for a draw.
    pub winner: Option<Color>,
}

impl Outcome {
    /// Creates an outcome.
    #[inline]
    pub const fn new(termination: Termination, winner: Option<Color>) -> Self {
        Outcome {
            termination,
            winner,
        }
    }

    /// Returns the PGN-style result string: "1-0", "0-1" or "1/2-1/2".
    #[inline]
    pub const fn result(self) -> &'static str {
        match self.winner {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }
}
