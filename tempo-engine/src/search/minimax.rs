//! Minimax with Alpha-Beta pruning, played by `MiniMaxAi`.
//!
//! Every root move is searched on its own copy of the game, so root moves are
//! spread over scoped worker threads with no shared mutable state. Below the
//! root, a single game is mutated in place with perform/undo.

use std::cmp;
use std::num::NonZeroUsize;
use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::coretypes::{Color, Cp, CpKind, PlyKind};
use crate::game::Game;
use crate::moves::Move;
use crate::search::{Difficulty, SearchResult, MATE_SCORE};

/// Computer player choosing moves with depth limited alpha-beta search.
///
/// Each instance owns its random generator, so two players in the same
/// process do not mirror each other's mistakes.
#[derive(Debug, Clone)]
pub struct MiniMaxAi {
    difficulty: Difficulty,
    depth: Option<PlyKind>,
    threads: usize,
    rng: StdRng,
}

impl MiniMaxAi {
    /// Create a player seeded from system entropy.
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, StdRng::from_entropy())
    }

    /// Create a player with a fixed seed. Two players with equal seeds and
    /// settings choose equal moves.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, StdRng::seed_from_u64(seed))
    }

    fn with_rng(difficulty: Difficulty, rng: StdRng) -> Self {
        let threads = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);

        Self {
            difficulty,
            depth: None,
            threads,
            rng,
        }
    }

    /// Search exactly `depth` plies instead of the difficulty's depth.
    pub fn depth(mut self, depth: PlyKind) -> Self {
        self.depth = Some(depth.max(1));
        self
    }

    /// Number of worker threads used to search root moves. At least 1.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// A new player with the same settings, seeded from this player's generator.
    pub fn fork(&mut self) -> Self {
        Self {
            difficulty: self.difficulty,
            depth: self.depth,
            threads: self.threads,
            rng: StdRng::seed_from_u64(self.rng.gen()),
        }
    }

    /// Depth this player searches `game` to.
    pub fn search_depth(&self, game: &Game) -> PlyKind {
        self.depth
            .unwrap_or_else(|| self.difficulty.depth_for(game.board().piece_count()))
    }

    /// Best move for the player to move in `game`, or None if there is no legal move.
    pub fn get_move(&mut self, game: &Game) -> Option<Move> {
        self.choose_move(game).best_move
    }

    /// Search `game` and return the best move for the player to move.
    ///
    /// Root moves are scored independently. A root move that checkmates scores
    /// `Cp::MAX`. The first root move with a strictly greater score than every
    /// earlier one wins, so equal scores keep generation order.
    pub fn choose_move(&mut self, game: &Game) -> SearchResult {
        let start = Instant::now();
        let mut root = game.clone();
        let player = root.next_player_color();
        let depth = self.search_depth(&root);
        let candidates = root.get_possible_moves();

        if candidates.is_empty() {
            let score = match root.is_in_check(player) {
                true => Cp::MIN,
                false => Cp::DRAW,
            };
            debug!(%player, "no legal move to search");
            return SearchResult {
                best_move: None,
                score,
                player,
                difficulty: self.difficulty,
                depth,
                nodes: 1,
                elapsed: start.elapsed(),
            };
        }

        // Seeds are drawn in generation order so results do not depend on thread scheduling.
        let seeds: Vec<u64> = candidates.iter().map(|_| self.rng.gen()).collect();
        let mistakes = self.difficulty.mistake_probability();
        let scores = self.score_candidates(&root, &candidates, &seeds, depth, mistakes);

        let mut best_idx = 0;
        let mut nodes = 0;
        for (idx, (score, branch_nodes)) in scores.iter().enumerate() {
            trace!(candidate = %candidates[idx], score = %score, "root move scored");
            nodes += branch_nodes;
            if *score > scores[best_idx].0 {
                best_idx = idx;
            }
        }

        let result = SearchResult {
            best_move: Some(candidates[best_idx].clone()),
            score: scores[best_idx].0,
            player,
            difficulty: self.difficulty,
            depth,
            nodes,
            elapsed: start.elapsed(),
        };
        debug!(
            best_move = %candidates[best_idx],
            score = %result.score,
            depth,
            nodes,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "search finished"
        );
        result
    }

    /// Score every candidate, returning (score, nodes) in candidate order.
    fn score_candidates(
        &self,
        root: &Game,
        candidates: &[Move],
        seeds: &[u64],
        depth: PlyKind,
        mistakes: f64,
    ) -> Vec<(Cp, u64)> {
        let threads = self.threads.min(candidates.len());
        if threads <= 1 {
            return candidates
                .iter()
                .zip(seeds)
                .map(|(candidate, seed)| {
                    score_root_move(root.clone(), candidate.clone(), depth, mistakes, *seed)
                })
                .collect();
        }

        // Workers steal one candidate index at a time until none are left.
        let next = AtomicUsize::new(0);
        let mut scored: Vec<(usize, (Cp, u64))> = thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(|| {
                        let mut local = Vec::new();
                        loop {
                            let idx = next.fetch_add(1, Ordering::Relaxed);
                            if idx >= candidates.len() {
                                break local;
                            }
                            let candidate = candidates[idx].clone();
                            let outcome =
                                score_root_move(root.clone(), candidate, depth, mistakes, seeds[idx]);
                            local.push((idx, outcome));
                        }
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(local) => local,
                    Err(payload) => panic::resume_unwind(payload),
                })
                .collect()
        });

        scored.sort_unstable_by_key(|(idx, _)| *idx);
        scored.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

/// Score a single root move on a game copy owned by the caller.
fn score_root_move(
    mut game: Game,
    candidate: Move,
    depth: PlyKind,
    mistakes: f64,
    seed: u64,
) -> (Cp, u64) {
    let player = game.next_player_color();
    game.perform(candidate);

    if game.checkmate(player.opponent()) {
        game.undo_move();
        return (Cp::MAX, 1);
    }

    let mut searcher = Searcher {
        maximizer: player,
        mistakes,
        rng: StdRng::seed_from_u64(seed),
        nodes: 1,
    };
    let score = searcher.minimax_score(depth - 1, &mut game, false, Cp::MIN, Cp::MAX);
    game.undo_move();

    (score, searcher.nodes)
}

/// Recursive search state for one root move.
///
/// Each reply is skipped with probability `mistakes`, except the first reply
/// at every node, which is always searched so no node is left without a score.
struct Searcher {
    /// Player the scores are relative to.
    maximizer: Color,
    /// Chance of skipping a reply other than the first.
    mistakes: f64,
    rng: StdRng,
    nodes: u64,
}

impl Searcher {
    /// Fail-hard alpha-beta minimax, with scores relative to `maximizer`.
    ///
    /// * At depth 0 the static evaluation is returned.
    /// * With no legal replies the position is a draw. Checkmates never reach
    ///   here, they are scored by the move that delivers them.
    /// * A move that checkmates scores `MATE_SCORE * depth`, preferring fast mates.
    fn minimax_score(
        &mut self,
        depth: PlyKind,
        game: &mut Game,
        maximizing: bool,
        mut alpha: Cp,
        mut beta: Cp,
    ) -> Cp {
        self.nodes += 1;
        if depth == 0 {
            return game.evaluate_score(self.maximizer);
        }

        let moves = game.get_possible_moves();
        if moves.is_empty() {
            return Cp::DRAW;
        }
        let mover = game.next_player_color();

        for (idx, move_) in moves.into_iter().enumerate() {
            // Never skip the first reply, a node must consider something.
            if idx > 0 && self.makes_mistake() {
                continue;
            }

            game.perform(move_);
            if game.checkmate(mover.opponent()) {
                game.undo_move();
                let mate = MATE_SCORE * depth as CpKind;
                return match maximizing {
                    true => mate,
                    false => -mate,
                };
            }
            let score = self.minimax_score(depth - 1, game, !maximizing, alpha, beta);
            game.undo_move();

            if maximizing {
                if score >= beta {
                    return beta;
                }
                alpha = cmp::max(alpha, score);
            } else {
                if score <= alpha {
                    return alpha;
                }
                beta = cmp::min(beta, score);
            }
        }

        match maximizing {
            true => alpha,
            false => beta,
        }
    }

    fn makes_mistake(&mut self) -> bool {
        self.mistakes > 0.0 && self.rng.gen_bool(self.mistakes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::coretypes::{Color::*, PieceKind::*, Position};
    use crate::pieces::Piece;

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn no_move_when_checkmated() {
        let mut game = Game::new();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            game.perform_move(pos(from), pos(to));
        }
        let result = MiniMaxAi::with_seed(Difficulty::Easy, 1).choose_move(&game);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, Cp::MIN);
    }

    #[test]
    fn no_move_when_stalemated() {
        let board = Board::from_pieces([
            Piece::new(King, Black, pos("h8")),
            Piece::new(Queen, White, pos("g6")),
            Piece::new(King, White, pos("a1")),
        ]);
        let game = Game::from_board(board, Black);
        let mut ai = MiniMaxAi::with_seed(Difficulty::Hard, 1);
        assert_eq!(ai.get_move(&game), None);
    }

    #[test]
    fn choose_move_leaves_game_untouched() {
        let game = Game::new();
        let mut ai = MiniMaxAi::with_seed(Difficulty::Easy, 7).depth(2);
        let result = ai.choose_move(&game);

        assert!(result.best_move.is_some());
        assert_eq!(result.player, White);
        assert_eq!(result.depth, 2);
        assert!(result.nodes > 20);
        assert_eq!(game, Game::new());
    }

    #[test]
    fn takes_free_queen() {
        let board = Board::from_pieces([
            Piece::new(King, White, pos("a1")),
            Piece::new(Rook, White, pos("d1")),
            Piece::new(Queen, Black, pos("d6")),
            Piece::new(King, Black, pos("h8")),
        ]);
        let game = Game::from_board(board, White);
        let mut ai = MiniMaxAi::with_seed(Difficulty::Hard, 3).depth(2);
        let best = ai.get_move(&game).unwrap();
        assert_eq!(best.to(), pos("d6"));
    }

    #[test]
    fn ties_keep_generation_order() {
        // Start position at depth 1 has several equally scored moves
        // (knight moves mirror each other). The first of the best must win.
        let mut game = Game::new();
        let candidates = game.get_possible_moves();
        let scores: Vec<Cp> = candidates
            .iter()
            .map(|candidate| score_root_move(game.clone(), candidate.clone(), 1, 0.0, 0).0)
            .collect();
        let best = scores.iter().copied().max().unwrap();
        let first_best = scores.iter().position(|score| *score == best).unwrap();
        assert!(scores.iter().filter(|score| **score == best).count() > 1);

        let mut ai = MiniMaxAi::with_seed(Difficulty::Hard, 11).depth(1).threads(4);
        let result = ai.choose_move(&game);
        assert_eq!(result.best_move, Some(candidates[first_best].clone()));
        assert_eq!(result.score, best);
    }

    #[test]
    fn seeded_players_agree_across_thread_counts() {
        let game = Game::new();
        let single = MiniMaxAi::with_seed(Difficulty::Easy, 42)
            .depth(2)
            .threads(1)
            .choose_move(&game);
        let multi = MiniMaxAi::with_seed(Difficulty::Easy, 42)
            .depth(2)
            .threads(4)
            .choose_move(&game);

        assert_eq!(single.best_move, multi.best_move);
        assert_eq!(single.score, multi.score);
        assert_eq!(single.nodes, multi.nodes);
    }

    #[test]
    fn stalemate_below_root_scores_draw() {
        let board = Board::from_pieces([
            Piece::new(King, Black, pos("h8")),
            Piece::new(Queen, White, pos("g5")),
            Piece::new(King, White, pos("a1")),
        ]);
        let mut game = Game::from_board(board, White);
        let stalemating = game
            .get_possible_moves()
            .into_iter()
            .find(|move_| move_.from() == pos("g5") && move_.to() == pos("g6"))
            .unwrap();

        // Material alone would call this a won position for White.
        assert!(game.evaluate_score(White) > Cp(800));
        let (score, nodes) = score_root_move(game.clone(), stalemating.clone(), 3, 0.0, 0);
        assert_eq!(score, Cp::DRAW);
        assert_eq!(nodes, 2);

        game.perform(stalemating);
        let mut searcher = Searcher {
            maximizer: White,
            mistakes: 0.0,
            rng: StdRng::seed_from_u64(0),
            nodes: 0,
        };
        assert_eq!(searcher.minimax_score(2, &mut game, false, Cp::MIN, Cp::MAX), Cp::DRAW);
    }

    #[test]
    fn certain_mistakes_follow_first_replies() {
        let game = Game::new();
        let first = game.clone().get_possible_moves()[0].clone();

        // Every node past the root move keeps only its first reply.
        // The root move plus one node per remaining ply.
        let (_, nodes) = score_root_move(game.clone(), first.clone(), 4, 1.0, 9);
        assert_eq!(nodes, 5);

        let (_, full_nodes) = score_root_move(game, first, 4, 0.0, 9);
        assert!(full_nodes > 5);
    }

    #[test]
    fn mistakes_change_the_search() {
        let game = Game::new();
        let first = game.clone().get_possible_moves()[0].clone();
        let easy = Difficulty::Easy.mistake_probability();

        let careful = score_root_move(game.clone(), first.clone(), 3, 0.0, 21);
        let sloppy = score_root_move(game.clone(), first.clone(), 3, easy, 21);
        let again = score_root_move(game, first, 3, easy, 21);

        assert_ne!(careful.1, sloppy.1);
        assert_eq!(sloppy, again);
    }

    #[test]
    fn forked_players_keep_settings() {
        let mut parent = MiniMaxAi::with_seed(Difficulty::Medium, 5).depth(2).threads(3);
        let child = parent.fork();
        assert_eq!(child.difficulty(), Difficulty::Medium);
        assert_eq!(child.search_depth(&Game::new()), 2);
        assert_eq!(child.threads, 3);
    }
}
