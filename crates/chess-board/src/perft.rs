//! Move-path enumeration for validating the move generator.
//!
//! Perft counts every leaf position reachable in exactly `depth` plies of
//! legal play. The counts for well-known positions are fixed, which makes
//! them a sharp regression test: a single wrong bit in move generation
//! shows up as a count mismatch within a few plies.

use crate::Board;
use chess_core::Move;

/// Counts all move paths of exactly `depth` plies.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    if depth == 1 {
        return board.legal_moves().len() as u64;
    }

    let mut nodes = 0;
    for m in board.legal_moves() {
        board.push(m);
        nodes += perft(board, depth - 1);
        board.pop();
    }
    nodes
}

/// Perft split by root move, for pinpointing generator disagreements.
pub fn perft_divide(board: &mut Board, depth: u32) -> Vec<(Move, u64)> {
    let mut results = Vec::new();
    if depth == 0 {
        return results;
    }

    for m in board.legal_moves() {
        board.push(m);
        let nodes = perft(board, depth - 1);
        board.pop();
        results.push((m, nodes));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perft_fen(fen: &str, depth: u32) -> u64 {
        let mut board = Board::from_fen(fen).unwrap();
        perft(&mut board, depth)
    }

    #[test]
    fn starting_position() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, 0), 1);
        assert_eq!(perft(&mut board, 1), 20);
        assert_eq!(perft(&mut board, 2), 400);
        assert_eq!(perft(&mut board, 3), 8_902);
        assert_eq!(perft(&mut board, 4), 197_281);
    }

    #[test]
    #[ignore]
    fn starting_position_deep() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, 5), 4_865_609);
    }

    #[test]
    fn castling_and_pin_heavy_middlegame() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        assert_eq!(perft_fen(fen, 1), 48);
        assert_eq!(perft_fen(fen, 2), 2_039);
        assert_eq!(perft_fen(fen, 3), 97_862);
    }

    #[test]
    fn en_passant_discovery_endgame() {
        let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
        assert_eq!(perft_fen(fen, 1), 14);
        assert_eq!(perft_fen(fen, 2), 191);
        assert_eq!(perft_fen(fen, 3), 2_812);
        assert_eq!(perft_fen(fen, 4), 43_238);
    }

    #[test]
    fn promotion_heavy_position() {
        let fen = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
        assert_eq!(perft_fen(fen, 1), 6);
        assert_eq!(perft_fen(fen, 2), 264);
        assert_eq!(perft_fen(fen, 3), 9_467);
    }

    #[test]
    fn underpromotion_and_check_tangle() {
        let fen = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
        assert_eq!(perft_fen(fen, 1), 44);
        assert_eq!(perft_fen(fen, 2), 1_486);
        assert_eq!(perft_fen(fen, 3), 62_379);
    }

    #[test]
    fn quiet_symmetric_middlegame() {
        let fen = "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";
        assert_eq!(perft_fen(fen, 1), 46);
        assert_eq!(perft_fen(fen, 2), 2_079);
        assert_eq!(perft_fen(fen, 3), 89_890);
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut board = Board::new();
        let divided = perft_divide(&mut board, 2);
        assert_eq!(divided.len(), 20);
        assert_eq!(divided.iter().map(|(_, n)| n).sum::<u64>(), 400);
        assert!(divided.iter().all(|&(_, n)| n == 20));
        assert!(perft_divide(&mut board, 0).is_empty());
    }
}
