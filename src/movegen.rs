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

//! The resumable, allocation-free legal move generator.

use crate::attacks::LOOKUPS;
use crate::bitboard::Bitboard;
use crate::defs::{Color, File, PieceKind, Rank, Square};
use crate::moves::{Move, MOVE_END};
use crate::position::Position;

/// Internal phase of the generator.
#[derive(Clone, Copy, Eq, PartialEq)]
enum Mode {
    /// Enumerating piece moves by (piece kind, square, destination).
    Normal,
    /// About to attempt a kingside castle.
    CastleKing,
    /// About to attempt a queenside castle.
    CastleQueen,
    /// Exhausted; the next `next()` call reports the terminal state.
    End,
}

/// Whether a move returned by [`MoveGen::next`] is left applied to the
/// position or rolled back before returning.
#[derive(Clone, Copy, Eq, PartialEq)]
#[non_exhaustive]
pub enum Consume {
    /// Leave the move applied (`make_next_move` in the spec's naming).
    KeepApplied,
    /// Roll the move back before returning it (`next_move`).
    UndoAfter,
}

/// The generator's terminal verdict, valid only once `next` has signalled
/// exhaustion.
#[derive(Clone, Copy, Eq, PartialEq)]
#[non_exhaustive]
pub enum Done {
    /// The generator has not yet run to completion.
    Unfinished,
    /// At least one legal move was found; the position is ongoing.
    Normal,
    /// No legal moves, and the side to move is in check.
    Checkmate,
    /// No legal moves, and the side to move is not in check.
    Stalemate,
}

/// Which side a castle attempt targets.
#[derive(Clone, Copy, Eq, PartialEq)]
enum CastleSide {
    /// Short castle, king moves toward the h-file rook.
    King,
    /// Long castle, king moves toward the a-file rook.
    Queen,
}

/// A single-threaded, resumable producer of legal moves for one position.
///
/// Holds a mutable borrow of the [`Position`] it generates for; per the
/// crate's concurrency model, no other code may mutate that position (or
/// run a second generator against it) while this one is live.
///
/// Moves are produced in a fixed order: by piece kind `0..=5`, then square
/// `0..=63`, then destination in least-significant-bit-first order, with
/// pawn promotions enumerated knight, bishop, rook, queen; castles are
/// attempted kingside then queenside, after every piece move.
pub struct MoveGen<'pos> {
    /// The position being generated for. Temporarily mutated and restored
    /// (or left mutated, per [`Consume`]) on every legal move found.
    pos: &'pos mut Position,
    /// The side being generated for, fixed for the generator's lifetime.
    color: Color,
    mode: Mode,
    cur_piece_kind: PieceKind,
    cur_square: Square,
    /// Remaining pseudo-legal destinations for `(cur_piece_kind,
    /// cur_square)`, already masked against friendly occupancy.
    cur_moves: Bitboard,
    /// The next promotion kind to try for a pawn reaching the last rank.
    cur_promotion: PieceKind,
    /// Whether `(cur_piece_kind, cur_square)` has been visited yet; lets
    /// the very first scan step examine square 0 before advancing past it.
    started: bool,
    hit_move: bool,
    done: Done,
}

impl<'pos> MoveGen<'pos> {
    /// Creates a generator for the position's current side to move.
    #[inline]
    #[must_use]
    pub fn new(pos: &'pos mut Position) -> Self {
        let color = pos.side_to_move();
        Self {
            pos,
            color,
            mode: Mode::Normal,
            cur_piece_kind: PieceKind::KING,
            cur_square: Square(0),
            cur_moves: Bitboard::EMPTY,
            cur_promotion: PieceKind::KNIGHT,
            started: false,
            hit_move: false,
            done: Done::Unfinished,
        }
    }

    /// The generator's terminal verdict.
    ///
    /// Only meaningful once `next` has returned [`MOVE_END`] at least once;
    /// querying any earlier is a programmer error.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the generator has not yet been exhausted.
    #[inline]
    #[must_use]
    pub fn done(&self) -> Done {
        debug_assert!(
            self.done != Done::Unfinished,
            "queried generator terminal state before exhaustion"
        );
        self.done
    }

    /// Whether the position is checkmate, per the most recently completed
    /// enumeration.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the generator has not yet been exhausted.
    #[inline]
    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.done() == Done::Checkmate
    }

    /// Whether the position is stalemate, per the most recently completed
    /// enumeration.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the generator has not yet been exhausted.
    #[inline]
    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        self.done() == Done::Stalemate
    }

    /// Borrows the generator's position.
    ///
    /// Exposed for callers (such as perft) that need to recurse into the
    /// position between `next` calls while a move is left applied.
    #[inline]
    #[must_use]
    pub fn position_mut(&mut self) -> &mut Position {
        self.pos
    }

    /// Produces the next legal move, or [`MOVE_END`] once exhausted.
    ///
    /// `consume` controls whether the returned move is left applied to the
    /// position or rolled back before this call returns.
    pub fn next(&mut self, consume: Consume) -> Move {
        loop {
            match self.mode {
                Mode::End => {
                    self.done = if self.hit_move {
                        Done::Normal
                    } else if self.pos.in_check(self.color) {
                        Done::Checkmate
                    } else {
                        Done::Stalemate
                    };
                    return MOVE_END;
                }
                Mode::CastleKing => {
                    self.mode = Mode::CastleQueen;
                    if let Some(mv) = self.try_castle(CastleSide::King) {
                        return self.emit_castle(mv, consume);
                    }
                }
                Mode::CastleQueen => {
                    self.mode = Mode::End;
                    if let Some(mv) = self.try_castle(CastleSide::Queen) {
                        return self.emit_castle(mv, consume);
                    }
                }
                Mode::Normal => {
                    if self.cur_moves.is_empty() {
                        self.advance();
                    } else {
                        let candidate = self.next_candidate();
                        if let Some(mv) = self.emit_candidate(candidate, consume) {
                            return mv;
                        }
                    }
                }
            }
        }
    }

    /// Scans forward from `(cur_piece_kind, cur_square)` for the next
    /// square occupied by a friendly piece, populating `cur_moves` once
    /// found, or transitions to [`Mode::CastleKing`] once every piece kind
    /// has been scanned.
    fn advance(&mut self) {
        loop {
            if self.started {
                self.step_cursor();
            }
            self.started = true;

            if self.cur_piece_kind.0 > PieceKind::QUEEN.0 {
                self.mode = Mode::CastleKing;
                return;
            }

            let owned = self.pos.color_occ(self.color) & self.pos.piece_occ(self.cur_piece_kind);
            if owned.test(self.cur_square) {
                let all_occ = self.pos.all_occ();
                let own_occ = self.pos.color_occ(self.color);
                let ep_bit = self
                    .pos
                    .ep_square()
                    .map_or(Bitboard::EMPTY, Bitboard::from);
                let pawn_targets = self.pos.color_occ(self.color.flip()) | ep_bit;

                self.cur_moves = LOOKUPS.pseudo_legal_targets(
                    self.cur_piece_kind,
                    self.color,
                    self.cur_square,
                    all_occ,
                    pawn_targets,
                ) & !own_occ;
                self.cur_promotion = PieceKind::KNIGHT;
                return;
            }
        }
    }

    /// Moves `(cur_piece_kind, cur_square)` to the next pair in scan order.
    fn step_cursor(&mut self) {
        if self.cur_square.0 == 63 {
            self.cur_square = Square(0);
            self.cur_piece_kind = PieceKind(self.cur_piece_kind.0 + 1);
        } else {
            self.cur_square = Square(self.cur_square.0 + 1);
        }
    }

    /// Pops (or, for a non-final promotion kind, peeks) the next
    /// destination from `cur_moves` and builds the corresponding
    /// pseudo-legal [`Move`].
    fn next_candidate(&mut self) -> Move {
        let dst = self.cur_moves.lsb();
        let promotion_eligible =
            self.cur_piece_kind == PieceKind::PAWN && is_last_rank(self.color, dst);

        if promotion_eligible {
            let promotion_kind = self.cur_promotion;
            if promotion_kind == PieceKind::QUEEN {
                self.cur_moves.clear(dst);
                self.cur_promotion = PieceKind::KNIGHT;
            } else {
                self.cur_promotion = next_promotion_kind(promotion_kind);
            }
            self.build_candidate(dst, true, promotion_kind)
        } else {
            self.cur_moves.clear(dst);
            self.build_candidate(dst, false, PieceKind::KING)
        }
    }

    /// Builds a pseudo-legal move from `cur_square` to `dst`, reconstructing
    /// capture and en-passant fields by inspecting the position.
    fn build_candidate(&self, dst: Square, is_promotion: bool, promotion_kind: PieceKind) -> Move {
        let src = self.cur_square;
        let is_en_passant =
            self.cur_piece_kind == PieceKind::PAWN && Some(dst) == self.pos.ep_square();

        let (is_capture, captured_kind, capture_square) = if is_en_passant {
            (true, PieceKind::PAWN, self.pos.ep_capture_square(dst))
        } else if let Some(captured) = self.pos.kind_on(dst) {
            (true, captured, dst)
        } else {
            (false, PieceKind::KING, dst)
        };

        Move::new(
            self.pos.flags_low16(),
            src,
            dst,
            is_promotion,
            promotion_kind,
            is_capture,
            captured_kind,
            capture_square,
            false,
        )
    }

    /// Applies `mv`, rejects it if it leaves the mover's own king in check,
    /// and otherwise returns it (rolled back first if `consume` asks for
    /// that).
    fn emit_candidate(&mut self, mv: Move, consume: Consume) -> Option<Move> {
        self.pos.make(mv);
        if self.pos.in_check(self.color) {
            self.pos.unmake(mv);
            return None;
        }
        self.hit_move = true;
        if consume == Consume::UndoAfter {
            self.pos.unmake(mv);
        }
        Some(mv)
    }

    /// Applies `mv` only if `consume` asks for it; a castle is already
    /// fully legality-checked by [`Self::try_castle`] before this is
    /// called, so there is nothing to roll back.
    fn emit_castle(&mut self, mv: Move, consume: Consume) -> Move {
        self.hit_move = true;
        if consume == Consume::KeepApplied {
            self.pos.make(mv);
        }
        mv
    }

    /// Attempts to castle `side` for the generator's color, returning the
    /// move if the castling right is held, the path is clear, and the king
    /// does not pass through or land on an attacked square.
    fn try_castle(&mut self, side: CastleSide) -> Option<Move> {
        let home_rank = if self.color == Color::WHITE {
            Rank::RANK_1
        } else {
            Rank::RANK_8
        };
        let king_home = Square::from_file_rank(File::FILE_E, home_rank);

        let (rook_file, step_file, dst_file, right_held) = match side {
            CastleSide::King => (
                File::FILE_H,
                File::FILE_F,
                File::FILE_G,
                self.pos.can_castle_kingside(self.color),
            ),
            CastleSide::Queen => (
                File::FILE_A,
                File::FILE_D,
                File::FILE_C,
                self.pos.can_castle_queenside(self.color),
            ),
        };
        if !right_held {
            return None;
        }

        let rook_home = Square::from_file_rank(rook_file, home_rank);
        let all_occ = self.pos.all_occ();
        if !(squares_strictly_between(king_home, rook_home) & all_occ).is_empty() {
            return None;
        }

        let step = Square::from_file_rank(step_file, home_rank);
        let dst = Square::from_file_rank(dst_file, home_rank);
        let opponent = self.color.flip();
        if [king_home, step, dst]
            .into_iter()
            .any(|sq| !self.pos.attackers_of(sq, opponent).is_empty())
        {
            return None;
        }

        Some(Move::new(
            self.pos.flags_low16(),
            king_home,
            dst,
            false,
            PieceKind::KING,
            false,
            PieceKind::KING,
            dst,
            true,
        ))
    }
}

/// The next promotion kind in the knight, bishop, rook, queen cycle.
const fn next_promotion_kind(kind: PieceKind) -> PieceKind {
    match kind.0 {
        2 => PieceKind::BISHOP,
        4 => PieceKind::ROOK,
        3 => PieceKind::QUEEN,
        _ => PieceKind::KNIGHT,
    }
}

/// Whether `square` is on the last rank a pawn of `color` promotes on.
const fn is_last_rank(color: Color, square: Square) -> bool {
    if color.0 == Color::WHITE.0 {
        square.rank().0 == Rank::RANK_8.0
    } else {
        square.rank().0 == Rank::RANK_1.0
    }
}

/// The bitboard of squares strictly between `a` and `b`, which must share a
/// rank.
fn squares_strictly_between(a: Square, b: Square) -> Bitboard {
    let rank = a.rank();
    let (lo, hi) = if a.file().0 < b.file().0 {
        (a.file().0 + 1, b.file().0)
    } else {
        (b.file().0 + 1, a.file().0)
    };
    let mut bb = Bitboard::EMPTY;
    for file in lo..hi {
        bb.set(Square::from_file_rank(File(file), rank));
    }
    bb
}

/// Runs a full enumeration against `pos` and reports whether it is
/// checkmate, using a throwaway generator.
#[inline]
#[must_use]
pub fn position_is_checkmate(pos: &mut Position) -> bool {
    let mut gen = MoveGen::new(pos);
    while gen.next(Consume::UndoAfter) != MOVE_END {}
    gen.is_checkmate()
}

/// Runs a full enumeration against `pos` and reports whether it is
/// stalemate, using a throwaway generator.
#[inline]
#[must_use]
pub fn position_is_stalemate(pos: &mut Position) -> bool {
    let mut gen = MoveGen::new(pos);
    while gen.next(Consume::UndoAfter) != MOVE_END {}
    gen.is_stalemate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legal_moves(pos: &mut Position) -> Vec<Move> {
        let mut gen = MoveGen::new(pos);
        let mut moves = Vec::new();
        loop {
            let mv = gen.next(Consume::UndoAfter);
            if mv == MOVE_END {
                break;
            }
            moves.push(mv);
        }
        moves
    }

    #[test]
    fn startpos_has_twenty_legal_moves() {
        let mut pos = Position::default();
        assert_eq!(legal_moves(&mut pos).len(), 20);
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut pos: Position =
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"
                .parse()
                .unwrap();
        assert!(position_is_checkmate(&mut pos));
    }

    #[test]
    fn a_position_with_no_legal_moves_and_no_check_is_stalemate() {
        let mut pos: Position = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert!(position_is_stalemate(&mut pos));
    }

    #[test]
    fn scholars_mate_sequence_ends_in_checkmate() {
        let mut pos = Position::default();
        for mv_str in ["e2e4", "e7e5", "d1h5", "b8c6", "f1c4", "g8f6", "h5f7"] {
            let mv = Move::from_str_and_position(mv_str, &pos).unwrap();
            pos.make(mv);
        }
        assert_eq!(pos.side_to_move(), crate::defs::Color::BLACK);
        assert!(pos.in_check(crate::defs::Color::BLACK));
        assert!(legal_moves(&mut pos).is_empty());
        assert!(position_is_checkmate(&mut pos));
    }

    #[test]
    fn queenside_castle_is_legal_when_only_kingside_path_is_attacked() {
        let mut pos: Position = "r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1".parse().unwrap();
        let moves = legal_moves(&mut pos);
        assert!(moves.iter().any(|mv| mv.is_castle() && mv.dst() == Square::C1));
        assert!(!moves.iter().any(|mv| mv.is_castle() && mv.dst() == Square::G1));
    }

    #[test]
    fn undo_after_leaves_the_position_unchanged() {
        let mut pos = Position::default();
        let before = pos;
        let _ = legal_moves(&mut pos);
        assert_eq!(pos, before);
    }

    #[test]
    fn promotions_are_enumerated_in_knight_bishop_rook_queen_order() {
        let mut pos: Position = "8/P6k/8/8/8/8/7K/8 w - - 0 1".parse().unwrap();
        let promotions: Vec<PieceKind> = legal_moves(&mut pos)
            .into_iter()
            .filter(|mv| mv.is_promotion() && mv.src() == Square::A7)
            .map(Move::promotion_kind)
            .collect();
        assert_eq!(
            promotions,
            vec![
                PieceKind::KNIGHT,
                PieceKind::BISHOP,
                PieceKind::ROOK,
                PieceKind::QUEEN
            ]
        );
    }

    #[test]
    fn castling_through_an_attacked_square_is_rejected() {
        // black rook on f8 attacks f1, the square the king must pass
        // through to castle kingside
        let mut pos: Position = "5r2/8/8/8/8/8/8/4K2R w K - 0 1".parse().unwrap();
        let has_kingside_castle = legal_moves(&mut pos).into_iter().any(Move::is_castle);
        assert!(!has_kingside_castle);
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::{Consume, Done, MoveGen, Position, MOVE_END};

    /// Deterministically walks a random-ish legal game from `pos`, picking
    /// at each ply the move whose index is `seed` modulo the number of
    /// legal moves (reseeding by folding in the ply count), and returns
    /// every `(move, flags_low16_before)` pair played, in order.
    fn play_random_game(pos: &mut Position, seed: u64, max_plies: usize) -> Vec<super::Move> {
        let mut played = Vec::new();
        let mut state = seed;
        for ply in 0..max_plies {
            let moves = {
                let mut gen = MoveGen::new(pos);
                let mut moves = Vec::new();
                loop {
                    let mv = gen.next(Consume::UndoAfter);
                    if mv == MOVE_END {
                        break;
                    }
                    moves.push(mv);
                }
                if gen.done() != Done::Normal {
                    break;
                }
                moves
            };
            if moves.is_empty() {
                break;
            }
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(ply as u64);
            let mv = moves[(state as usize) % moves.len()];
            pos.make(mv);
            played.push(mv);
        }
        played
    }

    proptest! {
        /// For any random-ish sequence of legal moves, unmaking them all in
        /// reverse order restores the starting FEN exactly.
        #[test]
        fn make_unmake_round_trips_over_random_games(seed in any::<u64>()) {
            let mut pos = Position::default();
            let start_fen = pos.to_string();

            let played = play_random_game(&mut pos, seed, 40);

            for &mv in played.iter().rev() {
                pos.unmake(mv);
            }

            prop_assert_eq!(pos.to_string(), start_fen);
        }
    }
}
