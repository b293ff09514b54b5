use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::evaluation::{Evaluation, Score};
use crate::move_generator::legal_moves;
use crate::movelist::MoveList;
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::r#move::{Move, MoveFlags};
use crate::status::{insufficient_material, FIFTY_MOVE_LIMIT, REPETITION_LIMIT};
use crate::zob_hash::Hash;

/// Groups together every knob of a search.
/// Avoids passing around 4 arguments in functions
#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub depth: u32,
    pub threads: usize,
    pub history: Vec<Hash>,
    pub stop: Option<Arc<AtomicBool>>,
}
impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            depth: 3,
            threads: 1,
            history: vec![],
            stop: None,
        }
    }
}
impl SearchOptions {
    pub fn set_depth(&mut self, value: u32) -> &mut Self {
        self.depth = value;
        self
    }
    pub fn set_threads(&mut self, value: usize) -> &mut Self {
        self.threads = value;
        self
    }
    /// Hashes of the positions played before the root, used to see repetitions
    pub fn set_history(&mut self, value: Vec<Hash>) -> &mut Self {
        self.history = value;
        self
    }
    pub fn set_stop_signal(&mut self, value: Option<Arc<AtomicBool>>) -> &mut Self {
        self.stop = value;
        self
    }

    fn should_stop(&self) -> bool {
        self.stop.as_ref().map_or(false, |s| s.load(Ordering::SeqCst))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: Score,
    pub depth: u32,
    pub nodes_searched: u64,
    pub time: Duration,
}
impl SearchResult {
    /// Number of moves until mate when the score is a mate score, negative
    /// when we are the one getting mated
    pub fn mate_in(&self) -> Option<i32> {
        let distance = Evaluation::MATE_SCORE - self.score.abs();
        if !(0..=MAX_PLY as Score).contains(&distance) {
            return None;
        }
        let moves = (distance + 1) / 2;
        Some(if self.score < 0 { -moves } else { moves })
    }
}
impl Display for SearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (kind, value) = match self.mate_in() {
            Some(moves) => ("mate", moves),
            None => ("cp", self.score),
        };
        write!(
            f,
            "depth {} nodes {} time {} score {} {} bestmove {}",
            self.depth,
            self.nodes_searched,
            self.time.as_millis(),
            kind,
            value,
            self.best_move
        )
    }
}

// Mate scores sit within this many plies of MATE_SCORE
const MAX_PLY: u32 = 256;

/// Picks a move for `side` in `position` with a fixed-depth search.
/// Returns `None` when `side` is not to move or has no legal move.
/// ```
/// use tessera::piece::Color;
/// use tessera::position::Position;
/// use tessera::search::choose_move;
/// let start = Position::startpos();
/// assert!(choose_move(&start, 1, Color::White).is_some());
/// assert!(choose_move(&start, 1, Color::Black).is_none());
/// ```
pub fn choose_move(position: &Position, depth: u32, side: Color) -> Option<Move> {
    if position.side_to_move() != side {
        return None;
    }
    let mut options = SearchOptions::default();
    options.set_depth(depth);
    search(position, &options).map(|result| result.best_move)
}

/// Runs a full search of the root position. The root moves are split among
/// `options.threads` workers, each root move getting its own full window so
/// the outcome does not depend on the thread count.
pub fn search(position: &Position, options: &SearchOptions) -> Option<SearchResult> {
    let start = Instant::now();
    let root_moves = legal_moves(position);
    if root_moves.is_empty() {
        return None;
    }
    let depth = options.depth.max(1);
    let threads = options.threads.clamp(1, root_moves.len());

    let (scores, nodes_searched) = if threads == 1 {
        search_sequential(position, &root_moves, depth, options)
    } else {
        search_parallel(position, &root_moves, depth, threads, options)
    };

    // First best in generator order, unsearched moves (cancelled search) are skipped
    let mut best: Option<(Move, Score)> = None;
    for (mv, score) in root_moves.iter().zip(scores) {
        if let Some(score) = score {
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((*mv, score));
            }
        }
    }
    let (best_move, score) = match best {
        Some(b) => b,
        None => (*root_moves.get(0)?, Evaluation::DRAW_SCORE),
    };

    let result = SearchResult {
        best_move,
        score,
        depth,
        nodes_searched,
        time: start.elapsed(),
    };
    debug!("{}", result);
    Some(result)
}

/// Plain alpha-beta at the root, alpha rising as better moves are found.
/// A move that fails low gets no exact score, it can never be the strict best
fn search_sequential(
    position: &Position,
    root_moves: &MoveList,
    depth: u32,
    options: &SearchOptions,
) -> (Vec<Option<Score>>, u64) {
    let mut searcher = Searcher::new(position, options);
    let mut alpha = -Evaluation::INFINITY;
    let mut scores = vec![None; root_moves.len()];
    for (i, mv) in root_moves.iter().enumerate() {
        if options.should_stop() {
            break;
        }
        let score = -searcher.negamax(&position.apply(*mv), depth - 1, 1, -Evaluation::INFINITY, -alpha);
        // An interrupted subtree only yields a bound
        if options.should_stop() {
            break;
        }
        if score > alpha {
            alpha = score;
            scores[i] = Some(score);
        } else {
            scores[i] = Some(-Evaluation::INFINITY);
        }
    }
    (scores, searcher.nodes_searched)
}

fn search_parallel(
    position: &Position,
    root_moves: &MoveList,
    depth: u32,
    threads: usize,
    options: &SearchOptions,
) -> (Vec<Option<Score>>, u64) {
    let mut scores = vec![None; root_moves.len()];
    let mut nodes_searched = 0;
    let chunk_size = (root_moves.len() + threads - 1) / threads;

    thread::scope(|scope| {
        let handles: Vec<_> = root_moves
            .as_slice()
            .chunks(chunk_size)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                scope.spawn(move || {
                    let mut searcher = Searcher::new(position, options);
                    let mut chunk_scores = vec![];
                    for (i, mv) in chunk.iter().enumerate() {
                        if options.should_stop() {
                            break;
                        }
                        let score = -searcher.negamax(
                            &position.apply(*mv),
                            depth - 1,
                            1,
                            -Evaluation::INFINITY,
                            Evaluation::INFINITY,
                        );
                        if options.should_stop() {
                            break;
                        }
                        chunk_scores.push((chunk_index * chunk_size + i, score));
                    }
                    (chunk_scores, searcher.nodes_searched)
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok((chunk_scores, nodes)) => {
                    for (i, score) in chunk_scores {
                        scores[i] = Some(score);
                    }
                    nodes_searched += nodes;
                }
                Err(_) => debug!("a search worker panicked, its root moves are skipped"),
            }
        }
    });

    (scores, nodes_searched)
}

/// Per-thread search state
struct Searcher<'a> {
    options: &'a SearchOptions,
    // Hashes from the start of the game down to the parent of the current node
    path: Vec<Hash>,
    nodes_searched: u64,
}
impl<'a> Searcher<'a> {
    fn new(root: &Position, options: &'a SearchOptions) -> Searcher<'a> {
        let mut path = options.history.clone();
        path.push(root.repetition_hash());
        Searcher {
            options,
            path,
            nodes_searched: 0,
        }
    }

    /// Fail-hard negamax. Scores are from the point of view of the side to move
    fn negamax(&mut self, position: &Position, depth: u32, ply: u32, mut alpha: Score, beta: Score) -> Score {
        self.nodes_searched += 1;

        let moves = legal_moves(position);
        if moves.is_empty() {
            return if position.in_check(position.side_to_move()) {
                -(Evaluation::MATE_SCORE - ply as Score)
            } else {
                Evaluation::DRAW_SCORE
            };
        }
        if self.is_drawn(position) {
            return Evaluation::DRAW_SCORE;
        }
        if depth == 0 {
            return Evaluation::evaluate(position, moves.len());
        }

        self.path.push(position.repetition_hash());
        for mv in moves.best_first_iter(&score_move(position)) {
            if self.options.should_stop() {
                break;
            }
            let score = -self.negamax(&position.apply(*mv), depth - 1, ply + 1, -beta, -alpha);
            if score >= beta {
                self.path.pop();
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        self.path.pop();
        alpha
    }

    fn is_drawn(&self, position: &Position) -> bool {
        position.halfmove_clock() >= FIFTY_MOVE_LIMIT
            || self.repetitions(position.repetition_hash()) + 1 >= REPETITION_LIMIT
            || insufficient_material(position)
    }

    fn repetitions(&self, hash: Hash) -> usize {
        self.path.iter().filter(|h| **h == hash).count()
    }
}

/// Captures first, most valuable victim by least valuable attacker, then promotions
fn score_move(position: &Position) -> impl Fn(&Move) -> Score + '_ {
    move |mv| {
        let victim = match mv.flags() {
            MoveFlags::EnPassant => Some(PieceType::Pawn),
            _ => position.piece_type_on(mv.target()),
        };
        let promotion = mv.promotion_target().map_or(0, Evaluation::value);
        Evaluation::mvv_lva(victim, position.piece_type_on(mv.origin())) + promotion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r#move::Move;

    const BACK_RANK_MATE: &str = "6k1/5ppp/8/8/8/5r2/8/R2B2K1 w - - 0 1";

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn mate_in_one_is_always_played() {
        let position = position(BACK_RANK_MATE);
        for depth in 1..=3 {
            assert_eq!(
                choose_move(&position, depth, Color::White),
                Some(Move::new_quiet(0, 56)),
                "depth {}",
                depth
            );
        }
    }

    #[test]
    fn mate_scores_count_the_plies() {
        let mut options = SearchOptions::default();
        options.set_depth(2);
        let result = search(&position(BACK_RANK_MATE), &options).unwrap();
        assert_eq!(result.score, Evaluation::MATE_SCORE - 1);
        assert_eq!(result.mate_in(), Some(1));
        assert!(result.to_string().contains("score mate 1 bestmove a1a8"));
    }

    #[test]
    fn hanging_queen_gets_taken() {
        let position = position("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
        assert_eq!(choose_move(&position, 1, Color::White), Some(Move::new_capture(11, 35)));
    }

    #[test]
    fn no_move_without_the_turn_or_legal_moves() {
        let mated = position("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert_eq!(choose_move(&mated, 2, Color::Black), None);
        assert_eq!(choose_move(&mated, 2, Color::White), None);
    }

    #[test]
    fn thread_count_does_not_change_the_outcome() {
        let position = position("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let mut options = SearchOptions::default();
        options.set_depth(2);
        let sequential = search(&position, &options).unwrap();
        options.set_threads(4);
        let parallel = search(&position, &options).unwrap();
        assert_eq!(sequential.best_move, parallel.best_move);
        assert_eq!(sequential.score, parallel.score);
    }

    #[test]
    fn search_is_deterministic() {
        let start = Position::startpos();
        let first = choose_move(&start, 2, Color::White);
        for _ in 0..3 {
            assert_eq!(choose_move(&start, 2, Color::White), first);
        }
    }

    #[test]
    fn a_stopped_search_still_answers() {
        let start = Position::startpos();
        let mut options = SearchOptions::default();
        options
            .set_depth(6)
            .set_stop_signal(Some(Arc::new(AtomicBool::new(true))));
        let result = search(&start, &options).unwrap();
        assert!(legal_moves(&start).contains(&result.best_move));
        assert!(result.nodes_searched < 10);
    }

    #[test]
    fn a_search_stopped_midway_keeps_only_finished_root_moves() {
        let start = Position::startpos();
        for threads in [1, 4] {
            let stop = Arc::new(AtomicBool::new(false));
            let mut options = SearchOptions::default();
            options
                .set_depth(8)
                .set_threads(threads)
                .set_stop_signal(Some(stop.clone()));

            let result = thread::scope(|scope| {
                scope.spawn(|| {
                    thread::sleep(Duration::from_millis(30));
                    stop.store(true, Ordering::SeqCst);
                });
                search(&start, &options)
            })
            .unwrap();

            assert!(legal_moves(&start).contains(&result.best_move));
            assert!(result.time < Duration::from_secs(5));
            assert_eq!(result.mate_in(), None);
            // Even material, a finished subtree cannot be worth a minor piece
            assert!(result.score.abs() < Evaluation::value(PieceType::Knight), "{}", result);
        }
    }

    #[test]
    fn repetitions_score_as_draws() {
        // A rook up, but the position may already have occurred
        let up = position("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let root = Position::startpos();
        let mut options = SearchOptions::default();

        options.set_history(vec![up.repetition_hash(), up.repetition_hash()]);
        assert!(Searcher::new(&root, &options).is_drawn(&up));

        options.set_history(vec![up.repetition_hash()]);
        let searcher = Searcher::new(&root, &options);
        assert_eq!(searcher.repetitions(up.repetition_hash()), 1);
        assert!(!searcher.is_drawn(&up));

        options.set_history(vec![]);
        assert!(!Searcher::new(&root, &options).is_drawn(&up));
    }
}
