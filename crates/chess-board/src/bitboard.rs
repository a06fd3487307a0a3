//! Bitboard representation and bit manipulation primitives.

use chess_core::{File, Rank, Square};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// A 64-bit board where each bit represents a square.
///
/// Uses little-endian rank-file mapping: bit 0 is a1, bit 7 is h1,
/// bit 56 is a8, bit 63 is h8.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    /// Empty bitboard (no bits set).
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Full bitboard (all bits set).
    pub const FULL: Bitboard = Bitboard(0xFFFF_FFFF_FFFF_FFFF);

    pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
    pub const FILE_B: Bitboard = Bitboard(0x0202_0202_0202_0202);
    pub const FILE_C: Bitboard = Bitboard(0x0404_0404_0404_0404);
    pub const FILE_D: Bitboard = Bitboard(0x0808_0808_0808_0808);
    pub const FILE_E: Bitboard = Bitboard(0x1010_1010_1010_1010);
    pub const FILE_F: Bitboard = Bitboard(0x2020_2020_2020_2020);
    pub const FILE_G: Bitboard = Bitboard(0x4040_4040_4040_4040);
    pub const FILE_H: Bitboard = Bitboard(0x8080_8080_8080_8080);

    pub const RANK_1: Bitboard = Bitboard(0x0000_0000_0000_00FF);
    pub const RANK_2: Bitboard = Bitboard(0x0000_0000_0000_FF00);
    pub const RANK_3: Bitboard = Bitboard(0x0000_0000_00FF_0000);
    pub const RANK_4: Bitboard = Bitboard(0x0000_0000_FF00_0000);
    pub const RANK_5: Bitboard = Bitboard(0x0000_00FF_0000_0000);
    pub const RANK_6: Bitboard = Bitboard(0x0000_FF00_0000_0000);
    pub const RANK_7: Bitboard = Bitboard(0x00FF_0000_0000_0000);
    pub const RANK_8: Bitboard = Bitboard(0xFF00_0000_0000_0000);

    /// Squares a bishop on a light square can reach.
    pub const LIGHT_SQUARES: Bitboard = Bitboard(0x55AA_55AA_55AA_55AA);

    /// Squares a bishop on a dark square can reach.
    pub const DARK_SQUARES: Bitboard = Bitboard(0xAA55_AA55_AA55_AA55);

    /// The four corner squares (standard castling rook homes).
    pub const CORNERS: Bitboard = Bitboard(0x8100_0000_0000_0081);

    /// Creates a bitboard from a raw 64-bit value.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Bitboard(value)
    }

    /// Creates a bitboard with a single square set.
    #[inline]
    pub const fn from_square(square: Square) -> Self {
        Bitboard(square.bitboard())
    }

    /// Creates a bitboard covering an entire rank.
    #[inline]
    pub const fn rank(rank: Rank) -> Self {
        Bitboard(0xFF << (rank.index() as u64 * 8))
    }

    /// Creates a bitboard covering an entire file.
    #[inline]
    pub const fn file(file: File) -> Self {
        Bitboard(0x0101_0101_0101_0101 << file.index() as u64)
    }

    /// Returns true if no bits are set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if at least one bit is set.
    #[inline]
    pub const fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    /// Returns the number of set bits.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns true if the given square's bit is set.
    #[inline]
    pub const fn contains(self, square: Square) -> bool {
        self.0 & square.bitboard() != 0
    }

    /// Sets the bit for the given square.
    #[inline]
    pub fn set(&mut self, square: Square) {
        self.0 |= square.bitboard();
    }

    /// Clears the bit for the given square.
    #[inline]
    pub fn clear(&mut self, square: Square) {
        self.0 &= !square.bitboard();
    }

    /// Toggles the bit for the given square.
    #[inline]
    pub fn toggle(&mut self, square: Square) {
        self.0 ^= square.bitboard();
    }

    /// Returns the index of the least significant set bit, if any.
    #[inline]
    pub const fn lsb(self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as u8)
        }
    }

    /// Returns the square of the most significant set bit, if any.
    #[inline]
    pub const fn msb(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            // 63 - leading_zeros is always a valid square index.
            Some(unsafe { Square::from_index_unchecked(63 - self.0.leading_zeros() as u8) })
        }
    }

    /// Removes and returns the square of the least significant set bit.
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            let index = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1;
            // trailing_zeros of a non-zero u64 is always < 64.
            Some(unsafe { Square::from_index_unchecked(index) })
        }
    }

    /// Shifts all bits one rank up (towards rank 8).
    #[inline]
    pub const fn north(self) -> Self {
        Bitboard(self.0 << 8)
    }

    /// Shifts all bits one rank down (towards rank 1).
    #[inline]
    pub const fn south(self) -> Self {
        Bitboard(self.0 >> 8)
    }

    /// Shifts all bits one file right (towards the h-file).
    #[inline]
    pub const fn east(self) -> Self {
        Bitboard((self.0 << 1) & !Self::FILE_A.0)
    }

    /// Shifts all bits one file left (towards the a-file).
    #[inline]
    pub const fn west(self) -> Self {
        Bitboard((self.0 >> 1) & !Self::FILE_H.0)
    }

    #[inline]
    pub const fn north_east(self) -> Self {
        Bitboard((self.0 << 9) & !Self::FILE_A.0)
    }

    #[inline]
    pub const fn north_west(self) -> Self {
        Bitboard((self.0 << 7) & !Self::FILE_H.0)
    }

    #[inline]
    pub const fn south_east(self) -> Self {
        Bitboard((self.0 >> 7) & !Self::FILE_A.0)
    }

    #[inline]
    pub const fn south_west(self) -> Self {
        Bitboard((self.0 >> 9) & !Self::FILE_H.0)
    }

    /// Mirrors the board vertically (rank 1 swaps with rank 8).
    #[inline]
    pub const fn flip_vertical(self) -> Self {
        Bitboard(self.0.swap_bytes())
    }

    /// Mirrors the board horizontally (a-file swaps with h-file).
    pub const fn flip_horizontal(self) -> Self {
        let mut x = self.0;
        x = ((x >> 1) & 0x5555_5555_5555_5555) | ((x & 0x5555_5555_5555_5555) << 1);
        x = ((x >> 2) & 0x3333_3333_3333_3333) | ((x & 0x3333_3333_3333_3333) << 2);
        x = ((x >> 4) & 0x0F0F_0F0F_0F0F_0F0F) | ((x & 0x0F0F_0F0F_0F0F_0F0F) << 4);
        Bitboard(x)
    }

    /// Mirrors the board along the a1-h8 diagonal.
    pub const fn flip_diagonal(self) -> Self {
        let mut x = self.0;
        let mut t = (x ^ (x << 28)) & 0x0F0F_0F0F_0000_0000;
        x ^= t ^ (t >> 28);
        t = (x ^ (x << 14)) & 0x3333_0000_3333_0000;
        x ^= t ^ (t >> 14);
        t = (x ^ (x << 7)) & 0x5500_5500_5500_5500;
        x ^= t ^ (t >> 7);
        Bitboard(x)
    }

    /// Mirrors the board along the h1-a8 anti-diagonal.
    pub const fn flip_anti_diagonal(self) -> Self {
        let mut x = self.0;
        let mut t = x ^ (x << 36);
        x ^= (t ^ (x >> 36)) & 0xF0F0_F0F0_0F0F_0F0F;
        t = (x ^ (x << 18)) & 0xCCCC_0000_CCCC_0000;
        x ^= t ^ (t >> 18);
        t = (x ^ (x << 9)) & 0xAA00_AA00_AA00_AA00;
        x ^= t ^ (t >> 9);
        Bitboard(x)
    }

    /// Iterates over all subsets of this bitboard, including the empty set
    /// and the bitboard itself (carry-rippler enumeration).
    #[inline]
    pub const fn subsets(self) -> CarryRippler {
        CarryRippler {
            subset: 0,
            mask: self.0,
            done: false,
        }
    }
}

impl BitAnd for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Bitboard(self.0 & rhs.0)
    }
}

impl BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Bitboard(self.0 | rhs.0)
    }
}

impl BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitXor for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Bitboard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Not for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn not(self) -> Self {
        Bitboard(!self.0)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard(0x{:016X})", self.0)?;
        for rank in (0..8).rev() {
            write!(f, "  ")?;
            for file in 0..8 {
                let bit = 1u64 << (rank * 8 + file);
                write!(f, "{} ", if self.0 & bit != 0 { '1' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over the squares of a bitboard, from a1 towards h8.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.0.pop_lsb()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.count() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    #[inline]
    fn into_iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

/// Iterator over all subsets of a blocker mask.
///
/// Enumerates subsets in carry-rippler order, starting with the empty set.
pub struct CarryRippler {
    subset: u64,
    mask: u64,
    done: bool,
}

impl Iterator for CarryRippler {
    type Item = Bitboard;

    #[inline]
    fn next(&mut self) -> Option<Bitboard> {
        if self.done {
            return None;
        }
        let current = self.subset;
        self.subset = self.subset.wrapping_sub(self.mask) & self.mask;
        self.done = self.subset == 0;
        Some(Bitboard(current))
    }
}
