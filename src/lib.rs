use std::time::Instant;

use crate::error::ChessResult;
use crate::move_generator::perft as count_nodes;
use crate::position::Position;

pub mod bitboard;
pub mod castling;
pub mod config;
pub mod console;
pub mod error;
pub mod evaluation;
pub mod move_generator;
pub mod movelist;
pub mod notation;
pub mod piece;
pub mod position;
pub mod record;
pub mod search;
pub mod session;
pub mod square;
pub mod status;
pub mod r#move;
mod zob_hash;

pub use error::ChessError;
pub use position::STARTING_FEN;
pub use r#move::Move;
pub use session::{GameSession, LocalSearch, MoveSource, RandomMover};
pub use status::GameStatus;

/// Prints the node counts of every depth up to `depth`
pub fn perft(depth: u32, fen: Option<String>) -> ChessResult<()> {
    println!("perft");
    let position = match fen {
        None => Position::startpos(),
        Some(f) => Position::from_fen(&f)?,
    };
    println!("{}\n", position);
    println!("depth nodes\n--------");
    for d in 0..depth + 1 {
        let start = Instant::now();
        let nodes = count_nodes(&position, d);
        let elapsed = start.elapsed();
        println!(
            "{}     {} ({}s, {} nps)",
            d,
            nodes,
            elapsed.as_secs_f32(),
            nodes as f32 / elapsed.as_secs_f32()
        );
    }
    Ok(())
}
