//! Perft (performance test) for move generation correctness verification.

use tracing::debug;

use crate::movegen::generate_legal;
use crate::position::Position;

/// Count the leaf nodes `depth` plies below `pos`.
///
/// Depth 1 bulk-counts the legal list without making the moves. The
/// position is restored before returning.
pub fn perft(pos: &mut Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_legal(pos);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &mv in moves.iter() {
        let undo = pos.make_move(mv);
        nodes += perft(pos, depth - 1);
        pos.unmake_move(mv, undo);
    }
    nodes
}

/// Per-move breakdown of [`perft`], sorted by move text.
pub fn divide(pos: &mut Position, depth: usize) -> Vec<(String, u64)> {
    let moves = generate_legal(pos);
    let mut results: Vec<(String, u64)> = moves
        .iter()
        .map(|&mv| {
            let undo = pos.make_move(mv);
            let count = perft(pos, depth.saturating_sub(1));
            pos.unmake_move(mv, undo);
            (mv.to_uci(), count)
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));
    debug!(
        depth,
        moves = results.len(),
        nodes = results.iter().map(|(_, n)| n).sum::<u64>(),
        "divide complete"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    fn run(fen: &str, depth: usize) -> u64 {
        let mut pos: Position = fen.parse().unwrap();
        let before = pos.to_fen();
        let nodes = perft(&mut pos, depth);
        assert_eq!(pos.to_fen(), before, "perft must leave the position untouched");
        nodes
    }

    /// Walks the full tree checking the incremental key and legality closure
    /// at every node.
    fn checked_walk(pos: &mut Position, depth: usize) -> u64 {
        assert_eq!(pos.key(), pos.compute_key(), "{}", pos.to_fen());
        if depth == 0 {
            return 1;
        }
        let mut nodes = 0;
        for &mv in generate_legal(pos).iter() {
            let undo = pos.make_move(mv);
            assert!(
                !pos.is_square_attacked(pos.king_square(!pos.side_to_move()), pos.side_to_move()),
                "{mv} leaves the king in check"
            );
            nodes += checked_walk(pos, depth - 1);
            pos.unmake_move(mv, undo);
        }
        nodes
    }

    #[test]
    fn perft_depth_0() {
        assert_eq!(perft(&mut Position::startpos(), 0), 1);
    }

    #[test]
    fn perft_startpos() {
        assert_eq!(run(crate::fen::STARTING_FEN, 1), 20);
        assert_eq!(run(crate::fen::STARTING_FEN, 2), 400);
        assert_eq!(run(crate::fen::STARTING_FEN, 3), 8_902);
        assert_eq!(run(crate::fen::STARTING_FEN, 4), 197_281);
    }

    #[test]
    #[ignore] // slow
    fn perft_startpos_depth_5() {
        assert_eq!(run(crate::fen::STARTING_FEN, 5), 4_865_609);
    }

    #[test]
    fn perft_kiwipete() {
        assert_eq!(run(KIWIPETE, 1), 48);
        assert_eq!(run(KIWIPETE, 2), 2_039);
        assert_eq!(run(KIWIPETE, 3), 97_862);
    }

    #[test]
    #[ignore] // slow
    fn perft_kiwipete_depth_4() {
        assert_eq!(run(KIWIPETE, 4), 4_085_603);
    }

    #[test]
    fn perft_position_3() {
        assert_eq!(run(POSITION_3, 1), 14);
        assert_eq!(run(POSITION_3, 2), 191);
        assert_eq!(run(POSITION_3, 3), 2_812);
        assert_eq!(run(POSITION_3, 4), 43_238);
        assert_eq!(run(POSITION_3, 5), 674_624);
    }

    #[test]
    fn perft_position_4() {
        assert_eq!(run(POSITION_4, 1), 6);
        assert_eq!(run(POSITION_4, 2), 264);
        assert_eq!(run(POSITION_4, 3), 9_467);
        assert_eq!(run(POSITION_4, 4), 422_333);
    }

    #[test]
    fn perft_position_5() {
        assert_eq!(run(POSITION_5, 1), 44);
        assert_eq!(run(POSITION_5, 2), 1_486);
        assert_eq!(run(POSITION_5, 3), 62_379);
    }

    #[test]
    #[ignore] // slow
    fn perft_position_5_depth_4() {
        assert_eq!(run(POSITION_5, 4), 2_103_487);
    }

    #[test]
    fn keys_and_legality_hold_through_trees() {
        for (fen, depth, expected) in [(KIWIPETE, 2, 2_039), (POSITION_3, 3, 2_812), (POSITION_4, 2, 264)] {
            let mut pos: Position = fen.parse().unwrap();
            assert_eq!(checked_walk(&mut pos, depth), expected, "{fen}");
        }
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut pos: Position = KIWIPETE.parse().unwrap();
        let results = divide(&mut pos, 2);
        assert_eq!(results.len(), 48);
        assert_eq!(results.iter().map(|(_, n)| n).sum::<u64>(), 2_039);
        assert!(results.windows(2).all(|w| w[0].0 <= w[1].0));
    }
}
