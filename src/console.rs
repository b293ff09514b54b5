use crate::config::EngineConfig;
use crate::error::ChessError;
use crate::notation::{encode_san, format_move_history};
use crate::piece::Color;
use crate::r#move::Move;
use crate::session::{GameSession, LocalSearch, MoveSource, RandomMover};
use crate::status::GameStatus;

use log::info;
use regex::Regex;
use rustyline::config::Configurer;
use rustyline::Editor;
use std::sync::OnceLock;

/// A text game against the computer
pub struct Console {
    session: GameSession,
    player_color: Color,
    depth: u32,
}

impl Console {
    pub fn new(config: &EngineConfig) -> Result<Console, ChessError> {
        let source: Box<dyn MoveSource> = match (config.random_moves, config.seed) {
            (true, Some(seed)) => Box::new(RandomMover::seeded(seed)),
            (true, None) => Box::new(RandomMover::new()),
            (false, _) => Box::new(LocalSearch::new(config.threads)),
        };
        let session = match &config.fen {
            Some(fen) => GameSession::from_fen(fen, source)?,
            None => GameSession::new(source),
        };
        Ok(Console {
            session,
            player_color: config.player_color,
            depth: config.depth,
        })
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn run(&mut self) {
        let mut editor = Editor::<()>::new();
        editor.set_auto_add_history(true);

        println!("Welcome to tessera!");
        println!("You are playing as {}", self.player_color.name());
        println!("Opponent: {}, depth {}", self.session.move_source_name(), self.depth);
        self.display();
        self.computer_turn();

        while let Ok(line) = editor.readline("> ") {
            match self.handle_command(&line) {
                Ok(ConsoleOkCode::ShouldQuit) => break,
                Ok(ConsoleOkCode::OkCommand) => (),
                Err(ConsoleErrCode::NoCommand) => (),
                Err(ConsoleErrCode::BadArgument(arg)) => eprintln!("Invalid argument: {}", arg),
                Err(ConsoleErrCode::Chess(ChessError::NothingToUndo)) => {
                    eprintln!("Cannot undo at the beginning of the game.")
                }
                Err(ConsoleErrCode::Chess(e @ ChessError::InvalidNotation(_))) => {
                    eprintln!("{}. Use 'e2e4' format or standard algebraic notation.", e)
                }
                Err(ConsoleErrCode::Chess(e)) => eprintln!("{}", e),
            }
        }
        println!("Thanks for playing!");
    }

    fn handle_command(&mut self, line: &str) -> Result<ConsoleOkCode, ConsoleErrCode> {
        let mut args = args_regex().find_iter(line).map(|m| m.as_str());
        let cmd = match args.next() {
            Some(c) => c,
            None => return Err(ConsoleErrCode::NoCommand),
        };
        match cmd.to_ascii_lowercase().as_str() {
            "help" => Self::help(),
            "quit" | "exit" => return Ok(ConsoleOkCode::ShouldQuit),
            "undo" => {
                self.session.undo_turn()?;
                self.display();
            }
            "moves" => {
                println!("Legal moves:");
                let position = *self.session.position();
                for mv in &self.session.legal_moves() {
                    println!("  {} ({})", mv, encode_san(*mv, &position));
                }
            }
            "restart" => {
                self.session.restart();
                self.display();
                self.computer_turn();
            }
            "show" => self.display(),
            "fen" => println!("{}", self.session.position().to_fen()),
            "history" => println!("{}", format_move_history(self.session.record())),
            "go" => {
                let depth = match args.next() {
                    Some(d) => d
                        .parse::<u32>()
                        .map_err(|_| ConsoleErrCode::BadArgument(d.to_string()))?,
                    None => self.depth,
                };
                let mv = self.session.request_automated_move(depth)?;
                self.announce(mv);
                self.after_move();
                self.computer_turn();
            }
            _ => {
                self.session.apply_player_move(cmd)?;
                self.after_move();
                self.computer_turn();
            }
        }
        Ok(ConsoleOkCode::OkCommand)
    }

    /// Plays for the computer as long as it is its turn
    fn computer_turn(&mut self) {
        while !self.session.status().is_terminal() && self.session.position().side_to_move() != self.player_color {
            println!("Computer is thinking...");
            match self.session.request_automated_move(self.depth) {
                Ok(mv) => {
                    self.announce(mv);
                    self.after_move();
                }
                Err(e) => {
                    eprintln!("{}", e);
                    break;
                }
            }
        }
    }

    fn announce(&self, mv: Move) {
        if let Some(san) = self.session.san_history().last() {
            println!("Computer plays: {} ({})", mv, san);
        }
    }

    fn after_move(&self) {
        self.display();
        if let Some(message) = game_over_message(self.session.status(), self.session.position().side_to_move()) {
            info!("{}", message);
            println!("{}", message);
        }
    }

    fn display(&self) {
        println!("\n{}\n", self.session.position());
        match self.session.status() {
            GameStatus::Ongoing => (),
            status => println!("{}", status),
        }
        println!("{} to move", self.session.position().side_to_move().name());
        if !self.session.record().is_empty() {
            println!("\nMove history:\n{}", format_move_history(self.session.record()));
        }
    }

    fn help() {
        println!("Commands:");
        println!("  help      - Show this help message");
        println!("  quit      - Exit the game");
        println!("  undo      - Take back the last move");
        println!("  moves     - Show legal moves");
        println!("  restart   - Start a new game");
        println!("  show      - Show the board");
        println!("  fen       - Print the position as FEN");
        println!("  history   - Print the moves played so far");
        println!("  go [N]    - Let the computer move, searching N plies");
        println!("Anything else is read as a move, e.g. 'e2e4', 'e7e8q' or 'Nf3'");
    }
}

/// What to tell the players when the game ended, `None` while it goes on
pub fn game_over_message(status: GameStatus, side_to_move: Color) -> Option<String> {
    match status {
        GameStatus::Checkmate => Some(format!("Checkmate! {} wins!", side_to_move.opposite().name())),
        GameStatus::Stalemate => Some(String::from("Game ended in stalemate!")),
        GameStatus::DrawInsufficientMaterial => Some(String::from("Game ended due to insufficient material!")),
        GameStatus::DrawFiftyMove => Some(String::from("Game ended due to fifty-move rule!")),
        GameStatus::DrawRepetition => Some(String::from("Game ended due to threefold repetition!")),
        GameStatus::Ongoing | GameStatus::Check => None,
    }
}

fn args_regex() -> &'static Regex {
    static ARGS: OnceLock<Regex> = OnceLock::new();
    ARGS.get_or_init(|| Regex::new(r#"(".*?"|[^"\s]+)"#).expect("argument pattern is valid"))
}

#[derive(Debug, PartialEq, Eq)]
enum ConsoleOkCode {
    OkCommand,
    ShouldQuit,
}

#[derive(Debug, PartialEq, Eq)]
enum ConsoleErrCode {
    NoCommand,
    BadArgument(String),
    Chess(ChessError),
}
impl From<ChessError> for ConsoleErrCode {
    fn from(e: ChessError) -> Self {
        ConsoleErrCode::Chess(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console(args: &[&str]) -> Console {
        let config = EngineConfig::from_args(args.iter().map(|s| s.to_string())).unwrap();
        Console::new(&config).unwrap()
    }

    #[test]
    fn the_computer_answers_player_moves() {
        let mut console = console(&["--random", "--seed", "3"]);
        assert_eq!(console.handle_command("e2e4"), Ok(ConsoleOkCode::OkCommand));
        assert_eq!(console.session().record().len(), 2);
        assert_eq!(console.session().position().side_to_move(), Color::White);

        assert_eq!(console.handle_command("undo"), Ok(ConsoleOkCode::OkCommand));
        assert!(console.session().record().is_empty());
        assert_eq!(
            console.handle_command("UNDO"),
            Err(ConsoleErrCode::Chess(ChessError::NothingToUndo))
        );
    }

    #[test]
    fn commands() {
        let mut console = console(&["--random", "--seed", "3", "--color", "black"]);
        assert_eq!(console.handle_command(""), Err(ConsoleErrCode::NoCommand));
        assert_eq!(console.handle_command("quit"), Ok(ConsoleOkCode::ShouldQuit));
        assert_eq!(console.handle_command("go x"), Err(ConsoleErrCode::BadArgument(String::from("x"))));
        // Playing black, the computer opens
        assert_eq!(console.handle_command("go 1"), Ok(ConsoleOkCode::OkCommand));
        assert_eq!(console.session().record().len(), 1);
        for cmd in ["help", "moves", "show", "fen", "history"] {
            assert_eq!(console.handle_command(cmd), Ok(ConsoleOkCode::OkCommand));
        }
        assert!(matches!(
            console.handle_command("Ke2"),
            Err(ConsoleErrCode::Chess(ChessError::AmbiguousOrIllegalSan(_)))
        ));
    }

    #[test]
    fn go_hands_the_turn_back_to_the_player() {
        let mut console = console(&["--random", "--seed", "7"]);
        assert_eq!(console.handle_command("go 1"), Ok(ConsoleOkCode::OkCommand));
        assert_eq!(console.session().record().len(), 2);
        assert_eq!(console.session().position().side_to_move(), Color::White);
    }

    #[test]
    fn restart_lets_the_computer_open_again() {
        let mut console = console(&["--random", "--seed", "5", "--color", "black"]);
        assert_eq!(console.handle_command("restart"), Ok(ConsoleOkCode::OkCommand));
        assert_eq!(console.session().record().len(), 1);
    }

    #[test]
    fn game_over_messages() {
        assert_eq!(
            game_over_message(GameStatus::Checkmate, Color::White),
            Some(String::from("Checkmate! Black wins!"))
        );
        assert_eq!(game_over_message(GameStatus::Check, Color::White), None);
    }
}
