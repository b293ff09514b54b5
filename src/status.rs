use crate::bitboard::Bitboard;
use crate::move_generator::legal_moves;
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::record::GameRecord;
use std::fmt::{Display, Formatter};

pub const FIFTY_MOVE_LIMIT: u32 = 100;
pub const REPETITION_LIMIT: usize = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
    DrawFiftyMove,
    DrawRepetition,
    DrawInsufficientMaterial,
}

impl GameStatus {
    /// No move may be played once the game reached such a status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Ongoing | GameStatus::Check)
    }

    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GameStatus::Stalemate
                | GameStatus::DrawFiftyMove
                | GameStatus::DrawRepetition
                | GameStatus::DrawInsufficientMaterial
        )
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            GameStatus::Ongoing => "Game in progress",
            GameStatus::Check => "Check!",
            GameStatus::Checkmate => "Checkmate!",
            GameStatus::Stalemate => "Stalemate!",
            GameStatus::DrawFiftyMove => "Draw by the fifty-move rule",
            GameStatus::DrawRepetition => "Draw by threefold repetition",
            GameStatus::DrawInsufficientMaterial => "Draw by insufficient material",
        };
        write!(f, "{}", message)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    /// The result of a finished game, `None` while it goes on.
    /// `side_to_move` is the side that would have to move in the final position
    pub fn from_status(status: GameStatus, side_to_move: Color) -> Option<GameResult> {
        match status {
            GameStatus::Checkmate => Some(match side_to_move {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            }),
            s if s.is_draw() => Some(GameResult::Draw),
            _ => None,
        }
    }
}

impl Display for GameResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::WhiteWins => write!(f, "1-0"),
            GameResult::BlackWins => write!(f, "0-1"),
            GameResult::Draw => write!(f, "1/2-1/2"),
        }
    }
}

/// Classifies `position`, reached after the moves of `record`.
/// Mates come first, then the draws in the order fifty-move rule, repetition,
/// insufficient material
pub fn status(position: &Position, record: &GameRecord) -> GameStatus {
    classify(position, 1 + record.occurrences(position))
}

/// Same as [`status`] for a position without any known history
pub fn position_status(position: &Position) -> GameStatus {
    classify(position, 1)
}

fn classify(position: &Position, occurrences: usize) -> GameStatus {
    let in_check = position.in_check(position.side_to_move());
    if legal_moves(position).is_empty() {
        return if in_check { GameStatus::Checkmate } else { GameStatus::Stalemate };
    }
    if position.halfmove_clock() >= FIFTY_MOVE_LIMIT {
        GameStatus::DrawFiftyMove
    } else if occurrences >= REPETITION_LIMIT {
        GameStatus::DrawRepetition
    } else if insufficient_material(position) {
        GameStatus::DrawInsufficientMaterial
    } else if in_check {
        GameStatus::Check
    } else {
        GameStatus::Ongoing
    }
}

pub fn is_checkmate(position: &Position) -> bool {
    position.in_check(position.side_to_move()) && legal_moves(position).is_empty()
}

/// Neither side can ever deliver mate: bare kings, a single minor piece,
/// two knights against a bare king, or bishops all on one square color
pub fn insufficient_material(position: &Position) -> bool {
    let heavy_or_pawns = position.get_piecetype_bitboard(PieceType::Pawn)
        | position.get_piecetype_bitboard(PieceType::Rook)
        | position.get_piecetype_bitboard(PieceType::Queen);
    if !heavy_or_pawns.is_empty() {
        return false;
    }

    let knights = position.get_piecetype_bitboard(PieceType::Knight);
    let bishops = position.get_piecetype_bitboard(PieceType::Bishop);
    let minors = (knights | bishops).pop_count();
    if minors <= 1 {
        return true;
    }
    if bishops.is_empty() && knights.pop_count() == 2 {
        return [Color::White, Color::Black]
            .iter()
            .any(|c| position.get_piece_bitboard(PieceType::Knight, *c).pop_count() == 2);
    }
    knights.is_empty()
        && ((bishops & Bitboard::LIGHT_SQUARES).is_empty() || (bishops & Bitboard::DARK_SQUARES).is_empty())
}
