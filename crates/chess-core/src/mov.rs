//! Move representation.

use crate::{PieceType, Square};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing UCI move notation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UciError {
    #[error("invalid UCI move '{0}': expected 4 or 5 characters")]
    WrongLength(String),

    #[error("invalid UCI move '{0}': unrecognized square")]
    InvalidSquare(String),

    #[error("invalid UCI move '{0}': unrecognized piece letter")]
    InvalidPiece(String),

    #[error("invalid UCI move '{0}': use 0000 for a null move")]
    EqualSquares(String),
}

/// A chess move from one square to another, with an optional promotion.
///
/// Castling is encoded purely by the king's origin and destination squares
/// (king-to-rook-square in Chess960 encoding). En passant captures and
/// double pawn pushes carry no marker; the board applying the move
/// reconstructs them from context.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    /// Source square. Equal to `to` for null moves and drops.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Promotion piece type, if any.
    pub promotion: Option<PieceType>,
    /// Dropped piece type, if any. Drops are parseable but never generated.
    pub drop: Option<PieceType>,
}

impl Move {
    /// The null move: passes the turn without touching a piece.
    ///
    /// It is never pseudo-legal but may be pushed onto a board.
    pub const NULL: Move = Move {
        from: Square::A1,
        to: Square::A1,
        promotion: None,
        drop: None,
    };

    /// Creates a move between two squares.
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
            drop: None,
        }
    }

    /// Creates a promotion move.
    #[inline]
    pub const fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        Move {
            from,
            to,
            promotion: Some(promotion),
            drop: None,
        }
    }

    /// Creates a drop of `piece` onto `to`.
    #[inline]
    pub const fn put(piece: PieceType, to: Square) -> Self {
        Move {
            from: to,
            to,
            promotion: None,
            drop: Some(piece),
        }
    }

    /// Returns true for the null move.
    #[inline]
    pub fn is_null(self) -> bool {
        self == Move::NULL
    }

    /// Returns the UCI notation for this move (e.g. "e2e4", "e7e8q",
    /// "0000" for the null move, "P@e4" for a drop).
    pub fn to_uci(self) -> String {
        if let Some(piece) = self.drop {
            format!("{}@{}", piece.symbol().to_ascii_uppercase(), self.to)
        } else if let Some(promotion) = self.promotion {
            format!("{}{}{}", self.from, self.to, promotion.symbol())
        } else if self.is_null() {
            "0000".to_string()
        } else {
            format!("{}{}", self.from, self.to)
        }
    }

    /// Parses a move from UCI notation.
    ///
    /// Accepts `<from><to>` with an optional promotion letter, the `0000`
    /// null move, and `<Piece>@<square>` drops. Promotion letters may be
    /// in either case.
    pub fn from_uci(s: &str) -> Result<Self, UciError> {
        if s == "0000" {
            return Ok(Move::NULL);
        }
        let bytes = s.as_bytes();
        match bytes.len() {
            4 if bytes[1] == b'@' => {
                let piece = PieceType::from_symbol(bytes[0] as char)
                    .ok_or_else(|| UciError::InvalidPiece(s.to_string()))?;
                let to = square_from_bytes(bytes[2], bytes[3])
                    .ok_or_else(|| UciError::InvalidSquare(s.to_string()))?;
                Ok(Move::put(piece, to))
            }
            4 | 5 => {
                let from = square_from_bytes(bytes[0], bytes[1])
                    .ok_or_else(|| UciError::InvalidSquare(s.to_string()))?;
                let to = square_from_bytes(bytes[2], bytes[3])
                    .ok_or_else(|| UciError::InvalidSquare(s.to_string()))?;
                let promotion = match bytes.get(4) {
                    None => None,
                    Some(c) => Some(match c.to_ascii_lowercase() {
                        b'n' => PieceType::Knight,
                        b'b' => PieceType::Bishop,
                        b'r' => PieceType::Rook,
                        b'q' => PieceType::Queen,
                        _ => return Err(UciError::InvalidPiece(s.to_string())),
                    }),
                };
                if from == to {
                    return Err(UciError::EqualSquares(s.to_string()));
                }
                Ok(Move {
                    from,
                    to,
                    promotion,
                    drop: None,
                })
            }
            _ => Err(UciError::WrongLength(s.to_string())),
        }
    }
}

#[inline]
fn square_from_bytes(file: u8, rank: u8) -> Option<Square> {
    use crate::{File, Rank};
    Some(Square::new(
        File::from_char(file as char)?,
        Rank::from_char(rank as char)?,
    ))
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
