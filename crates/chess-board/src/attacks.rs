//! Attack tables for all piece types.
//!
//! Step attacks (knight, king, pawn) are computed at compile time. Sliding
//! piece attacks use magic bitboards: a perfect hashing technique that maps
//! blocker configurations to precomputed attack bitboards in O(1) time.
//! Ray and between tables, derived from empty-board slider attacks, support
//! pin detection and check-blocking logic. All heap-backed tables live in a
//! single process-wide set that is built on first use.

use crate::Bitboard;
use chess_core::{Color, Square};
use std::sync::OnceLock;

/// Precomputed knight attack tables.
const KNIGHT_ATTACKS: [Bitboard; 64] = compute_knight_attacks();

/// Precomputed king attack tables.
const KING_ATTACKS: [Bitboard; 64] = compute_king_attacks();

/// Precomputed pawn attack tables [color][square].
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = compute_pawn_attacks();

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the squares a pawn of the given color attacks from the given
/// square.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Returns bishop attacks for a square given occupied squares.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let tables = tables();
    let magic = &tables.bishop_magics[sq.index() as usize];
    let index = magic_index(magic, occupied);
    tables.bishop_attacks[magic.offset + index]
}

/// Returns rook attacks for a square given occupied squares.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let tables = tables();
    let magic = &tables.rook_magics[sq.index() as usize];
    let index = magic_index(magic, occupied);
    tables.rook_attacks[magic.offset + index]
}

/// Returns queen attacks (bishop + rook).
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Returns the full rank, file, or diagonal through both squares, including
/// the squares themselves, or the empty bitboard if they are not aligned.
#[inline]
pub fn ray(a: Square, b: Square) -> Bitboard {
    tables().rays[a.index() as usize][b.index() as usize]
}

/// Returns the squares strictly between two aligned squares, or the empty
/// bitboard if they are not aligned.
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    tables().between[a.index() as usize][b.index() as usize]
}

/// Magic entry for a single square.
struct Magic {
    /// Mask of relevant blocker squares (excludes edges).
    mask: Bitboard,
    /// The magic number for this square.
    magic: u64,
    /// Right shift amount (64 - number of bits in mask).
    shift: u8,
    /// Offset into the attack table.
    offset: usize,
}

/// Stores all lazily built attack tables.
struct AttackTables {
    /// Bishop attack table (~40KB with fancy magics).
    bishop_attacks: Vec<Bitboard>,
    /// Rook attack table (~800KB with fancy magics).
    rook_attacks: Vec<Bitboard>,
    /// Magic entries for bishops.
    bishop_magics: [Magic; 64],
    /// Magic entries for rooks.
    rook_magics: [Magic; 64],
    /// Full line through two squares, empty if unaligned.
    rays: Box<[[Bitboard; 64]; 64]>,
    /// Squares strictly between two aligned squares.
    between: Box<[[Bitboard; 64]; 64]>,
}

static ATTACK_TABLES: OnceLock<AttackTables> = OnceLock::new();

/// Gets the global attack tables, initializing them if necessary.
fn tables() -> &'static AttackTables {
    ATTACK_TABLES.get_or_init(AttackTables::new)
}

// Pre-computed magic numbers for bishops (from Chess Programming Wiki).
// These are "fancy" magics that minimize table size.
const BISHOP_MAGICS: [u64; 64] = [
    0x89a1121896040240,
    0x2004844802002010,
    0x2068080051921000,
    0x62880a0220200808,
    0x0004042004000000,
    0x0100822020200011,
    0xc00444222012000a,
    0x0028808801216001,
    0x0400492088408100,
    0x0201c401040c0084,
    0x00840800910a0010,
    0x0000082080240060,
    0x2000840504006000,
    0x30010c4108405004,
    0x1008005410080802,
    0x8144042209100900,
    0x0208081020014400,
    0x004800201208ca00,
    0x0f18140408012008,
    0x1004002802102001,
    0x0841000820080811,
    0x0040200200a42008,
    0x0000800054042000,
    0x88010400410c9000,
    0x0520040470104290,
    0x1004040051500081,
    0x2002081833080021,
    0x000400c00c010142,
    0x941408200c002000,
    0x0658810000806011,
    0x0188071040440a00,
    0x4800404002011c00,
    0x0104442040404200,
    0x0511080200222104,
    0x0004022401120400,
    0x80c0040400080120,
    0x8040010040820802,
    0x0480810700020090,
    0x0102008e00040242,
    0x0809005202050100,
    0x8002024220104080,
    0x0431008804142000,
    0x0019001802081400,
    0x0200014208040080,
    0x3308082008200100,
    0x041010500040c020,
    0x4012020c04210308,
    0x208220a202004080,
    0x0111040120082000,
    0x6803040141280a00,
    0x2101004202410000,
    0x8200000041108022,
    0x0000021082088000,
    0x0002410204010040,
    0x0040100400809000,
    0x0822088220820214,
    0x0040808090012004,
    0x00910224040218c9,
    0x0402814422015008,
    0x0090014004842410,
    0x0001000042304105,
    0x0010008830412a00,
    0x2520081090008908,
    0x40102000a0a60140,
];

// Pre-computed magic numbers for rooks.
const ROOK_MAGICS: [u64; 64] = [
    0x0a8002c000108020,
    0x06c00049b0002001,
    0x0100200010090040,
    0x2480041000800801,
    0x0280028004000800,
    0x0900410008040022,
    0x0280020001001080,
    0x2880002041000080,
    0xa000800080400034,
    0x0004808020004000,
    0x2290802004801000,
    0x0411000d00100020,
    0x0402800800040080,
    0x000b000401004208,
    0x2409000100040200,
    0x0001002100004082,
    0x0022878001e24000,
    0x1090810021004010,
    0x0801030040200012,
    0x0500808008001000,
    0x0a08018014000880,
    0x8000808004000200,
    0x0201008080010200,
    0x0801020000441091,
    0x0000800080204005,
    0x1040200040100048,
    0x0000120200402082,
    0x0d14880480100080,
    0x0012040280080080,
    0x0100040080020080,
    0x9020010080800200,
    0x0813241200148449,
    0x0491604001800080,
    0x0100401000402001,
    0x4820010021001040,
    0x0400402202000812,
    0x0209009005000802,
    0x0810800601800400,
    0x4301083214000150,
    0x204026458e001401,
    0x0040204000808000,
    0x8001008040010020,
    0x8410820820420010,
    0x1003001000090020,
    0x0804040008008080,
    0x0012000810020004,
    0x1000100200040208,
    0x430000a044020001,
    0x0280009023410300,
    0x00e0100040002240,
    0x0000200100401700,
    0x2244100408008080,
    0x0008000400801980,
    0x0002000810040200,
    0x8010100228810400,
    0x2000009044210200,
    0x4080008040102101,
    0x0040002080411d01,
    0x2005524060000901,
    0x0502001008400422,
    0x489a000810200402,
    0x0001004400080a13,
    0x4000011008020084,
    0x0026002114058042,
];

// Bit counts for bishop relevant occupancy (excluding edges).
const BISHOP_BITS: [u8; 64] = [
    6, 5, 5, 5, 5, 5, 5, 6,
    5, 5, 5, 5, 5, 5, 5, 5,
    5, 5, 7, 7, 7, 7, 5, 5,
    5, 5, 7, 9, 9, 7, 5, 5,
    5, 5, 7, 9, 9, 7, 5, 5,
    5, 5, 7, 7, 7, 7, 5, 5,
    5, 5, 5, 5, 5, 5, 5, 5,
    6, 5, 5, 5, 5, 5, 5, 6,
];

// Bit counts for rook relevant occupancy.
const ROOK_BITS: [u8; 64] = [
    12, 11, 11, 11, 11, 11, 11, 12,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    12, 11, 11, 11, 11, 11, 11, 12,
];

impl AttackTables {
    /// Builds all attack tables.
    fn new() -> Self {
        let mut bishop_attacks = Vec::new();
        let mut rook_attacks = Vec::new();
        let mut bishop_magics: [Magic; 64] = std::array::from_fn(|_| Magic {
            mask: Bitboard::EMPTY,
            magic: 0,
            shift: 0,
            offset: 0,
        });
        let mut rook_magics: [Magic; 64] = std::array::from_fn(|_| Magic {
            mask: Bitboard::EMPTY,
            magic: 0,
            shift: 0,
            offset: 0,
        });

        // Bishop tables.
        for sq in 0..64 {
            let mask = bishop_mask(sq);
            let bits = BISHOP_BITS[sq as usize];
            let offset = bishop_attacks.len();

            bishop_magics[sq as usize] = Magic {
                mask,
                magic: BISHOP_MAGICS[sq as usize],
                shift: 64 - bits,
                offset,
            };

            bishop_attacks.resize(offset + (1 << bits), Bitboard::EMPTY);
            for blockers in mask.subsets() {
                let index = magic_index(&bishop_magics[sq as usize], blockers);
                bishop_attacks[offset + index] = bishop_attacks_slow(sq, blockers);
            }
        }

        // Rook tables.
        for sq in 0..64 {
            let mask = rook_mask(sq);
            let bits = ROOK_BITS[sq as usize];
            let offset = rook_attacks.len();

            rook_magics[sq as usize] = Magic {
                mask,
                magic: ROOK_MAGICS[sq as usize],
                shift: 64 - bits,
                offset,
            };

            rook_attacks.resize(offset + (1 << bits), Bitboard::EMPTY);
            for blockers in mask.subsets() {
                let index = magic_index(&rook_magics[sq as usize], blockers);
                rook_attacks[offset + index] = rook_attacks_slow(sq, blockers);
            }
        }

        // Ray and between tables from empty-board slider attacks.
        let mut rays = Box::new([[Bitboard::EMPTY; 64]; 64]);
        let mut between = Box::new([[Bitboard::EMPTY; 64]; 64]);
        for a in 0..64u8 {
            let bb_a = Bitboard(1u64 << a);
            let diagonals = bishop_attacks_slow(a, Bitboard::EMPTY);
            for b in 0..64u8 {
                let bb_b = Bitboard(1u64 << b);
                let line = if a == b {
                    Bitboard::EMPTY
                } else if (diagonals & bb_b).is_not_empty() {
                    (diagonals & bishop_attacks_slow(b, Bitboard::EMPTY)) | bb_a | bb_b
                } else if a / 8 == b / 8 {
                    Bitboard(0xFF << (u64::from(a) / 8 * 8))
                } else if a % 8 == b % 8 {
                    Bitboard(0x0101_0101_0101_0101 << (u64::from(a) % 8))
                } else {
                    Bitboard::EMPTY
                };
                rays[a as usize][b as usize] = line;

                let span = line.0 & ((Bitboard::FULL.0 << a) ^ (Bitboard::FULL.0 << b));
                // Drop the lower endpoint, keeping strictly interior squares.
                between[a as usize][b as usize] = Bitboard(span & span.wrapping_sub(1));
            }
        }

        AttackTables {
            bishop_attacks,
            rook_attacks,
            bishop_magics,
            rook_magics,
            rays,
            between,
        }
    }
}

/// Computes the magic table index for a given blocker configuration.
#[inline]
fn magic_index(magic: &Magic, blockers: Bitboard) -> usize {
    let relevant = blockers & magic.mask;
    ((relevant.0.wrapping_mul(magic.magic)) >> magic.shift) as usize
}

/// Generates the bishop blocker mask for a square (excludes edges).
fn bishop_mask(sq: u8) -> Bitboard {
    let mut mask = 0u64;
    let rank = (sq / 8) as i8;
    let file = (sq % 8) as i8;

    for (dr, df) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        let mut r = rank + dr;
        let mut f = file + df;
        while r > 0 && r < 7 && f > 0 && f < 7 {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }

    Bitboard(mask)
}

/// Generates the rook blocker mask for a square (excludes edges).
fn rook_mask(sq: u8) -> Bitboard {
    let mut mask = 0u64;
    let rank = sq / 8;
    let file = sq % 8;

    for f in 1..7 {
        if f != file {
            mask |= 1u64 << (rank * 8 + f);
        }
    }
    for r in 1..7 {
        if r != rank {
            mask |= 1u64 << (r * 8 + file);
        }
    }

    Bitboard(mask)
}

/// Slow bishop attack generation (used to build tables).
fn bishop_attacks_slow(sq: u8, blockers: Bitboard) -> Bitboard {
    walk_attacks(sq, blockers, [(1, 1), (1, -1), (-1, 1), (-1, -1)])
}

/// Slow rook attack generation (used to build tables).
fn rook_attacks_slow(sq: u8, blockers: Bitboard) -> Bitboard {
    walk_attacks(sq, blockers, [(1, 0), (-1, 0), (0, 1), (0, -1)])
}

fn walk_attacks(sq: u8, blockers: Bitboard, directions: [(i8, i8); 4]) -> Bitboard {
    let mut attacks = 0u64;
    let rank = (sq / 8) as i8;
    let file = (sq % 8) as i8;

    for (dr, df) in directions {
        let mut r = rank + dr;
        let mut f = file + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if blockers.0 & bit != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }

    Bitboard(attacks)
}

/// Computes knight attacks for all squares at compile time.
const fn compute_knight_attacks() -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;

    while sq < 64 {
        let rank = sq / 8;
        let file = sq % 8;
        let mut bb = 0u64;

        // Knight move offsets: (rank_delta, file_delta)
        if rank < 6 && file < 7 {
            bb |= 1u64 << (sq + 17);
        } // +2, +1
        if rank < 6 && file > 0 {
            bb |= 1u64 << (sq + 15);
        } // +2, -1
        if rank > 1 && file < 7 {
            bb |= 1u64 << (sq - 15);
        } // -2, +1
        if rank > 1 && file > 0 {
            bb |= 1u64 << (sq - 17);
        } // -2, -1
        if rank < 7 && file < 6 {
            bb |= 1u64 << (sq + 10);
        } // +1, +2
        if rank < 7 && file > 1 {
            bb |= 1u64 << (sq + 6);
        } // +1, -2
        if rank > 0 && file < 6 {
            bb |= 1u64 << (sq - 6);
        } // -1, +2
        if rank > 0 && file > 1 {
            bb |= 1u64 << (sq - 10);
        } // -1, -2

        attacks[sq as usize] = Bitboard(bb);
        sq += 1;
    }

    attacks
}

/// Computes king attacks for all squares at compile time.
const fn compute_king_attacks() -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;

    while sq < 64 {
        let rank = sq / 8;
        let file = sq % 8;
        let mut bb = 0u64;

        if rank < 7 {
            bb |= 1u64 << (sq + 8);
        } // North
        if rank > 0 {
            bb |= 1u64 << (sq - 8);
        } // South
        if file < 7 {
            bb |= 1u64 << (sq + 1);
        } // East
        if file > 0 {
            bb |= 1u64 << (sq - 1);
        } // West
        if rank < 7 && file < 7 {
            bb |= 1u64 << (sq + 9);
        } // NE
        if rank < 7 && file > 0 {
            bb |= 1u64 << (sq + 7);
        } // NW
        if rank > 0 && file < 7 {
            bb |= 1u64 << (sq - 7);
        } // SE
        if rank > 0 && file > 0 {
            bb |= 1u64 << (sq - 9);
        } // SW

        attacks[sq as usize] = Bitboard(bb);
        sq += 1;
    }

    attacks
}

/// Computes pawn attacks for all squares at compile time.
const fn compute_pawn_attacks() -> [[Bitboard; 64]; 2] {
    let mut attacks = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0u8;

    while sq < 64 {
        let rank = sq / 8;
        let file = sq % 8;

        // White pawns attack diagonally forward (north).
        let mut white_bb = 0u64;
        if rank < 7 && file < 7 {
            white_bb |= 1u64 << (sq + 9);
        } // NE
        if rank < 7 && file > 0 {
            white_bb |= 1u64 << (sq + 7);
        } // NW
        attacks[0][sq as usize] = Bitboard(white_bb);

        // Black pawns attack diagonally forward (south).
        let mut black_bb = 0u64;
        if rank > 0 && file < 7 {
            black_bb |= 1u64 << (sq - 7);
        } // SE
        if rank > 0 && file > 0 {
            black_bb |= 1u64 << (sq - 9);
        } // SW
        attacks[1][sq as usize] = Bitboard(black_bb);

        sq += 1;
    }

    attacks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn knight_attack_counts() {
        assert_eq!(knight_attacks(sq("d4")).count(), 8);
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(knight_attacks(sq("a4")).count(), 4);
    }

    #[test]
    fn king_attack_counts() {
        assert_eq!(king_attacks(sq("d4")).count(), 8);
        assert_eq!(king_attacks(Square::A1).count(), 3);
        assert_eq!(king_attacks(sq("a4")).count(), 5);
    }

    #[test]
    fn pawn_attacks_by_color() {
        let white = pawn_attacks(sq("d4"), Color::White);
        assert_eq!(white.count(), 2);
        assert!(white.contains(sq("c5")));
        assert!(white.contains(sq("e5")));

        let black = pawn_attacks(sq("d4"), Color::Black);
        assert_eq!(black.count(), 2);
        assert!(black.contains(sq("c3")));
        assert!(black.contains(sq("e3")));

        // Edge pawns attack a single square.
        assert_eq!(pawn_attacks(sq("a2"), Color::White), Bitboard::from_square(sq("b3")));
        // Pawns on the last rank attack nothing.
        assert_eq!(pawn_attacks(Square::H8, Color::White), Bitboard::EMPTY);
    }

    #[test]
    fn bishop_attacks_empty_board() {
        assert_eq!(bishop_attacks(sq("d4"), Bitboard::EMPTY).count(), 13);
        assert_eq!(bishop_attacks(Square::A1, Bitboard::EMPTY).count(), 7);
    }

    #[test]
    fn rook_attacks_empty_board() {
        assert_eq!(rook_attacks(sq("d4"), Bitboard::EMPTY).count(), 14);
        assert_eq!(rook_attacks(Square::A1, Bitboard::EMPTY).count(), 14);
    }

    #[test]
    fn queen_attacks_empty_board() {
        assert_eq!(queen_attacks(sq("d4"), Bitboard::EMPTY).count(), 27);
    }

    #[test]
    fn bishop_attacks_with_blockers() {
        let blockers = Bitboard::from_square(sq("e5")) | Bitboard::from_square(sq("c3"));
        let attacks = bishop_attacks(sq("d4"), blockers);
        // Blockers themselves are attacked, squares beyond them are not.
        assert!(attacks.contains(sq("e5")));
        assert!(attacks.contains(sq("c3")));
        assert!(!attacks.contains(sq("f6")));
        assert!(!attacks.contains(sq("b2")));
    }

    #[test]
    fn rook_attacks_with_blockers() {
        let blockers = Bitboard::from_square(sq("d6"));
        let attacks = rook_attacks(sq("d4"), blockers);
        assert!(attacks.contains(sq("d6")));
        assert!(!attacks.contains(sq("d7")));
        assert!(attacks.contains(sq("d1")));
    }

    #[test]
    fn ray_through_aligned_squares() {
        // Diagonal ray covers the whole a1-h8 diagonal.
        let diagonal = ray(sq("c3"), sq("f6"));
        assert!(diagonal.contains(Square::A1));
        assert!(diagonal.contains(Square::H8));
        assert!(diagonal.contains(sq("c3")));
        assert!(diagonal.contains(sq("f6")));
        assert_eq!(diagonal.count(), 8);

        // Rank and file rays cover the whole line.
        assert_eq!(ray(sq("b4"), sq("g4")), Bitboard::RANK_4);
        assert_eq!(ray(sq("c2"), sq("c7")), Bitboard::FILE_C);
    }

    #[test]
    fn ray_of_unaligned_squares_is_empty() {
        assert_eq!(ray(Square::A1, sq("b3")), Bitboard::EMPTY);
        assert_eq!(ray(sq("e4"), sq("e4")), Bitboard::EMPTY);
    }

    #[test]
    fn between_excludes_endpoints() {
        let squares = between(Square::A1, Square::H8);
        assert_eq!(squares.count(), 6);
        assert!(squares.contains(sq("b2")));
        assert!(squares.contains(sq("g7")));
        assert!(!squares.contains(Square::A1));
        assert!(!squares.contains(Square::H8));

        assert_eq!(between(Square::E1, sq("e3")), Bitboard::from_square(sq("e2")));
        assert_eq!(between(sq("e3"), Square::E1), Bitboard::from_square(sq("e2")));
    }

    #[test]
    fn between_adjacent_or_unaligned_is_empty() {
        assert_eq!(between(Square::E1, Square::F1), Bitboard::EMPTY);
        assert_eq!(between(Square::E1, sq("f3")), Bitboard::EMPTY);
        assert_eq!(between(sq("d4"), sq("d4")), Bitboard::EMPTY);
    }

    #[test]
    fn rays_match_slider_attacks() {
        // Every square a queen attacks on an empty board lies on a ray.
        let from = sq("d4");
        for to in queen_attacks(from, Bitboard::EMPTY) {
            assert!(ray(from, to).contains(from));
            assert!(ray(from, to).contains(to));
        }
    }
}
