/*
 * crab_core, a chess move generation core
 * Copyright (C) 2024 Jasper Shovelton
 *
 * crab_core is free software: you can redistribute it and/or modify it under
 * the terms of the GNU General Public License as published by the Free
 * Software Foundation, either version 3 of the License, or (at your option)
 * any later version.
 *
 * crab_core is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
 * FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
 * more details.
 *
 * You should have received a copy of the GNU General Public License along
 * with crab_core. If not, see <https://www.gnu.org/licenses/>.
 */

//! Perft: a leaf-node counter used to validate move generator correctness
//! against known node counts at fixed depths.

use crate::movegen::{Consume, MoveGen};
use crate::moves::MOVE_END;
use crate::position::Position;

/// Counts the number of leaf positions reachable from `pos` in exactly
/// `depth` plies.
///
/// Recurses by walking the move generator with [`Consume::KeepApplied`]
/// (avoiding a redundant unmake-then-remake) and unmaking manually once the
/// recursive call returns, so the position is restored before the next
/// sibling move is tried.
#[inline]
#[must_use]
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut total = 0;
    let mut gen = MoveGen::new(pos);
    loop {
        let mv = gen.next(Consume::KeepApplied);
        if mv == MOVE_END {
            break;
        }
        total += perft(gen.position_mut(), depth - 1);
        gen.position_mut().unmake(mv);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A named position plus its known-correct perft node counts at
    /// depths `1..=depths.len()`.
    struct TestPosition {
        name: &'static str,
        fen: &'static str,
        depths: &'static [u64],
    }

    const POSITIONS: &[TestPosition] = &[
        TestPosition {
            name: "initial position",
            fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            depths: &[20, 400, 8_902, 197_281],
        },
        TestPosition {
            name: "kiwipete",
            fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            depths: &[48, 2_039, 97_862],
        },
        TestPosition {
            name: "position 3",
            fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            depths: &[14, 191, 2_812],
        },
        TestPosition {
            name: "position 4",
            fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            depths: &[6, 264, 9_467],
        },
        TestPosition {
            name: "position 5",
            fen: "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            depths: &[44, 1_486, 62_379],
        },
    ];

    #[test]
    fn perft_matches_known_node_counts() {
        for position in POSITIONS {
            let mut pos: Position = position.fen.parse().unwrap();
            for (i, &expected) in position.depths.iter().enumerate() {
                let depth = (i + 1) as u32;
                assert_eq!(
                    perft(&mut pos, depth),
                    expected,
                    "{}: perft({depth}) mismatch",
                    position.name,
                );
            }
        }
    }
}
