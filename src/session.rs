//! A game between a player typing moves and an automated move source.
//!
//! The session owns the current position and the record of the game. Every
//! command either succeeds or leaves both untouched.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{ChessError, ChessResult};
use crate::move_generator::legal_moves;
use crate::movelist::MoveList;
use crate::notation::{decode_move, encode_san, san_history};
use crate::position::Position;
use crate::r#move::Move;
use crate::record::GameRecord;
use crate::search::{search, SearchOptions};
use crate::status::{status, GameResult, GameStatus};

/// Something able to pick a move for the side to move
pub trait MoveSource: Send {
    fn name(&self) -> &str;

    /// Picks a legal move of `position`, reached after the moves of `record`
    fn choose_move(&mut self, position: &Position, record: &GameRecord, depth: u32) -> Option<Move>;
}

/// The built-in alpha-beta search
pub struct LocalSearch {
    threads: usize,
    stop: Option<Arc<AtomicBool>>,
}
impl LocalSearch {
    pub fn new(threads: usize) -> LocalSearch {
        LocalSearch { threads, stop: None }
    }

    /// Lets another thread cut the search short
    pub fn with_stop_signal(mut self, stop: Arc<AtomicBool>) -> LocalSearch {
        self.stop = Some(stop);
        self
    }
}
impl Default for LocalSearch {
    fn default() -> Self {
        LocalSearch::new(1)
    }
}
impl MoveSource for LocalSearch {
    fn name(&self) -> &str {
        "alpha-beta search"
    }

    fn choose_move(&mut self, position: &Position, record: &GameRecord, depth: u32) -> Option<Move> {
        let mut options = SearchOptions::default();
        options
            .set_depth(depth)
            .set_threads(self.threads)
            .set_history(record.history_hashes())
            .set_stop_signal(self.stop.clone());
        search(position, &options).map(|result| result.best_move)
    }
}

/// Plays a uniformly random legal move, ignoring the depth
pub struct RandomMover {
    rng: StdRng,
}
impl RandomMover {
    pub fn new() -> RandomMover {
        RandomMover {
            rng: StdRng::from_entropy(),
        }
    }
    pub fn seeded(seed: u64) -> RandomMover {
        RandomMover {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}
impl Default for RandomMover {
    fn default() -> Self {
        RandomMover::new()
    }
}
impl MoveSource for RandomMover {
    fn name(&self) -> &str {
        "random mover"
    }

    fn choose_move(&mut self, position: &Position, _record: &GameRecord, _depth: u32) -> Option<Move> {
        legal_moves(position).as_slice().choose(&mut self.rng).copied()
    }
}

pub struct GameSession {
    position: Position,
    record: GameRecord,
    status: GameStatus,
    source: Box<dyn MoveSource>,
}

impl GameSession {
    /// A new game from the standard starting position
    pub fn new(source: Box<dyn MoveSource>) -> GameSession {
        Self::starting_from(Position::startpos(), source)
    }

    pub fn from_fen(fen: &str, source: Box<dyn MoveSource>) -> ChessResult<GameSession> {
        Ok(Self::starting_from(Position::from_fen(fen)?, source))
    }

    fn starting_from(initial: Position, source: Box<dyn MoveSource>) -> GameSession {
        let record = GameRecord::new();
        let status = status(&initial, &record);
        info!("new game against {}: {}", source.name(), initial.to_fen());
        GameSession {
            position: initial,
            record,
            status,
            source,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }
    pub fn record(&self) -> &GameRecord {
        &self.record
    }
    pub fn status(&self) -> GameStatus {
        self.status
    }
    pub fn legal_moves(&self) -> MoveList {
        legal_moves(&self.position)
    }
    pub fn last_move(&self) -> Option<Move> {
        self.record.last().map(|entry| entry.mv)
    }
    pub fn san_history(&self) -> Vec<String> {
        san_history(&self.record)
    }
    pub fn move_source_name(&self) -> &str {
        self.source.name()
    }

    /// The outcome once the game is over
    pub fn result(&self) -> Option<GameResult> {
        GameResult::from_status(self.status, self.position.side_to_move())
    }

    /// Plays a move typed in coordinate or algebraic notation
    pub fn apply_player_move(&mut self, text: &str) -> ChessResult<Move> {
        self.ensure_not_over()?;
        let decoded = decode_move(text, &self.position)?;
        let mv = self
            .legal_moves()
            .iter()
            .find(|mv| mv.same_squares(decoded.origin(), decoded.target(), decoded.promotion_target()))
            .copied()
            .ok_or_else(|| ChessError::IllegalMove(text.trim().to_string()))?;
        self.play(mv);
        Ok(mv)
    }

    /// Lets the move source play for the side to move
    pub fn request_automated_move(&mut self, depth: u32) -> ChessResult<Move> {
        self.ensure_not_over()?;
        let chosen = self.source.choose_move(&self.position, &self.record, depth);
        match chosen {
            Some(mv) if self.legal_moves().contains(&mv) => {
                self.play(mv);
                Ok(mv)
            }
            Some(mv) => {
                warn!("{} proposed the illegal move {}", self.source.name(), mv);
                Err(ChessError::IllegalMove(mv.to_string()))
            }
            None => {
                warn!("{} did not propose any move", self.source.name());
                Err(ChessError::IllegalMove(String::from("(none)")))
            }
        }
    }

    /// Takes back the last move, whoever played it
    pub fn undo(&mut self) -> ChessResult<()> {
        let entry = self.record.pop().ok_or(ChessError::NothingToUndo)?;
        self.position = entry.before;
        self.status = status(&self.position, &self.record);
        debug!("took back {}", entry.mv);
        Ok(())
    }

    /// Takes back the last two moves, so that the same player is to move again
    pub fn undo_turn(&mut self) -> ChessResult<()> {
        if self.record.len() < 2 {
            return Err(ChessError::NothingToUndo);
        }
        self.undo()?;
        self.undo()
    }

    /// Starts over from the standard starting position, whatever the
    /// session started from
    pub fn restart(&mut self) -> Position {
        self.position = Position::startpos();
        self.record.clear();
        self.status = status(&self.position, &self.record);
        info!("game restarted");
        self.position
    }

    fn ensure_not_over(&self) -> ChessResult<()> {
        if self.status.is_terminal() {
            return Err(ChessError::GameAlreadyOver(self.status));
        }
        Ok(())
    }

    fn play(&mut self, mv: Move) {
        let before = self.position;
        let after = before.apply(mv);
        debug!("{} plays {}", before.side_to_move().name(), encode_san(mv, &before));
        self.record.push(before, mv, after);
        self.position = after;
        self.status = status(&self.position, &self.record);
        if self.status.is_terminal() {
            info!("game over: {}", self.status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color;

    fn session() -> GameSession {
        GameSession::new(Box::new(LocalSearch::default()))
    }

    #[test]
    fn moves_in_both_notations() {
        let mut game = session();
        assert_eq!(game.apply_player_move("e2e4"), Ok(Move::new_double_push(12, 28)));
        assert_eq!(game.apply_player_move("e5"), Ok(Move::new_double_push(52, 36)));
        assert_eq!(game.apply_player_move("Nf3"), Ok(Move::new_quiet(6, 21)));
        assert_eq!(game.legal_moves().len(), 29);
        assert_eq!(game.san_history(), vec!["e4", "e5", "Nf3"]);
        assert_eq!(game.last_move(), Some(Move::new_quiet(6, 21)));
    }

    #[test]
    fn failures_leave_the_game_untouched() {
        let mut game = session();
        game.apply_player_move("e4").unwrap();
        let position = *game.position();
        let record = game.record().clone();

        assert!(matches!(game.apply_player_move("e2e5"), Err(ChessError::IllegalMove(_))));
        assert!(matches!(game.apply_player_move("hello"), Err(ChessError::InvalidNotation(_))));
        assert!(matches!(game.apply_player_move("Qh4"), Err(ChessError::AmbiguousOrIllegalSan(_))));
        assert!(matches!(game.apply_player_move("e7e5x"), Err(ChessError::InvalidNotation(_))));
        assert_eq!(*game.position(), position);
        assert_eq!(*game.record(), record);
    }

    #[test]
    fn undo_restores_the_previous_position() {
        let mut game = session();
        assert_eq!(game.undo(), Err(ChessError::NothingToUndo));
        game.apply_player_move("e4").unwrap();
        let before = *game.position();
        game.apply_player_move("c5").unwrap();
        game.undo().unwrap();
        assert_eq!(*game.position(), before);
        assert_eq!(game.record().len(), 1);

        assert_eq!(game.undo_turn(), Err(ChessError::NothingToUndo));
        game.apply_player_move("c5").unwrap();
        game.undo_turn().unwrap();
        assert_eq!(*game.position(), Position::startpos());
        assert!(game.record().is_empty());
    }

    #[test]
    fn finished_games_refuse_moves_but_allow_undo() {
        let mut game = session();
        for text in ["f3", "e5", "g4", "Qh4#"] {
            game.apply_player_move(text).unwrap();
        }
        assert_eq!(game.status(), GameStatus::Checkmate);
        assert_eq!(game.result(), Some(GameResult::BlackWins));
        assert_eq!(
            game.apply_player_move("a3"),
            Err(ChessError::GameAlreadyOver(GameStatus::Checkmate))
        );
        assert_eq!(
            game.request_automated_move(1),
            Err(ChessError::GameAlreadyOver(GameStatus::Checkmate))
        );

        game.undo().unwrap();
        assert_eq!(game.status(), GameStatus::Ongoing);
        assert_eq!(game.position().side_to_move(), Color::Black);
    }

    #[test]
    fn automated_moves_come_from_the_source() {
        let mut game = GameSession::from_fen(
            "6k1/5ppp/8/8/8/5r2/8/R2B2K1 w - - 0 1",
            Box::new(LocalSearch::default()),
        )
        .unwrap();
        assert_eq!(game.request_automated_move(2), Ok(Move::new_quiet(0, 56)));
        assert_eq!(game.status(), GameStatus::Checkmate);
        assert_eq!(game.san_history(), vec!["Ra8#"]);
    }

    #[test]
    fn random_mover_plays_legal_moves() {
        let mut game = GameSession::new(Box::new(RandomMover::seeded(7)));
        for _ in 0..20 {
            if game.status().is_terminal() {
                break;
            }
            let legal = game.legal_moves();
            let mv = game.request_automated_move(0).unwrap();
            assert!(legal.contains(&mv));
        }
    }

    #[test]
    fn restart_goes_back_to_the_standard_layout() {
        let mut game = GameSession::from_fen(
            "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
            Box::new(RandomMover::seeded(1)),
        )
        .unwrap();
        game.apply_player_move("e4").unwrap();
        assert_eq!(game.restart(), Position::startpos());
        assert_eq!(*game.position(), Position::startpos());
        assert!(game.record().is_empty());
        assert_eq!(game.status(), GameStatus::Ongoing);
    }

    #[test]
    fn a_raised_stop_signal_still_yields_a_legal_move() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut game = GameSession::new(Box::new(LocalSearch::new(2).with_stop_signal(stop)));
        let mv = game.request_automated_move(5).unwrap();
        assert_eq!(game.last_move(), Some(mv));
        assert_eq!(game.record().len(), 1);
    }

    #[test]
    fn invalid_fen_is_reported() {
        assert!(matches!(
            GameSession::from_fen("not a fen", Box::new(RandomMover::seeded(1))),
            Err(ChessError::InvalidFen(_))
        ));
    }
}
