//! Reading and writing moves, both in coordinate notation ("e2e4", "e7e8q")
//! and in standard algebraic notation ("Nf3", "exd5", "O-O", "e8=Q+").

use crate::error::{ChessError, ChessResult};
use crate::move_generator::legal_moves;
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::r#move::{Move, MoveFlags};
use crate::record::GameRecord;
use crate::square::{self, file_of, parse_square, rank_of, Square};
use crate::status::is_checkmate;
use regex::Regex;
use std::sync::OnceLock;

pub fn encode_coordinate(mv: Move) -> String {
    mv.to_string()
}

/// Reads a move in coordinate notation. The flags are inferred from the
/// position, legality is left to the caller.
/// ```
/// use tessera::notation::decode_coordinate;
/// use tessera::position::Position;
/// let position = Position::startpos();
/// let mv = decode_coordinate("e2e4", &position).unwrap();
/// assert_eq!(mv.to_string(), "e2e4");
/// assert!(decode_coordinate("e2e9", &position).is_err());
/// ```
pub fn decode_coordinate(text: &str, position: &Position) -> ChessResult<Move> {
    let invalid = || ChessError::InvalidNotation(text.to_string());
    let chars: Vec<char> = text.chars().collect();
    if chars.len() != 4 && chars.len() != 5 {
        return Err(invalid());
    }
    let origin = text.get(0..2).and_then(parse_square).ok_or_else(invalid)?;
    let target = text.get(2..4).and_then(parse_square).ok_or_else(invalid)?;
    let promotion = match chars.get(4) {
        None => None,
        Some(c) => match PieceType::from_letter(*c) {
            Some(p) if PieceType::PROMOTIONS.contains(&p) => Some(p),
            _ => return Err(invalid()),
        },
    };
    Ok(infer_move(position, origin, target, promotion))
}

fn infer_move(position: &Position, origin: Square, target: Square, promotion: Option<PieceType>) -> Move {
    let occupied_target = position.piece_on(target).is_some();
    if let Some(p) = promotion {
        return if occupied_target {
            Move::new_promotion_capture(origin, target, p)
        } else {
            Move::new_promotion(origin, target, p)
        };
    }

    match position.piece_type_on(origin) {
        Some(PieceType::Pawn) => {
            if origin.abs_diff(target) == 16 {
                return Move::new_double_push(origin, target);
            }
            if file_of(origin) != file_of(target) && !occupied_target && position.en_passant_target() == Some(target) {
                return Move::new_en_passant(origin, target);
            }
        }
        Some(PieceType::King) => {
            let side = position.side_to_move();
            match (origin, target) {
                (square::E1, square::G1) | (square::E8, square::G8) => return Move::new_kingside_castle(side),
                (square::E1, square::C1) | (square::E8, square::C8) => return Move::new_queenside_castle(side),
                _ => (),
            }
        }
        _ => (),
    }

    if occupied_target {
        Move::new_capture(origin, target)
    } else {
        Move::new_quiet(origin, target)
    }
}

fn san_regex() -> &'static Regex {
    static SAN: OnceLock<Regex> = OnceLock::new();
    SAN.get_or_init(|| {
        Regex::new(r"^([NBRQK])?([a-h])?([1-8])?(x)?([a-h][1-8])(?:=?([NBRQ]))?[+#]?[!?]*$")
            .expect("SAN pattern is valid")
    })
}

fn castle_regex() -> &'static Regex {
    static CASTLE: OnceLock<Regex> = OnceLock::new();
    CASTLE.get_or_init(|| Regex::new(r"^([O0]-[O0])(-[O0])?[+#]?[!?]*$").expect("castling pattern is valid"))
}

/// Reads a move in standard algebraic notation, resolving it against the
/// legal moves of `position`.
/// ```
/// use tessera::notation::decode_san;
/// use tessera::position::Position;
/// let mv = decode_san("Nf3", &Position::startpos()).unwrap();
/// assert_eq!(mv.to_string(), "g1f3");
/// ```
pub fn decode_san(text: &str, position: &Position) -> ChessResult<Move> {
    let text = text.trim();
    let moves = legal_moves(position);

    if let Some(caps) = castle_regex().captures(text) {
        let queen_side = caps.get(2).is_some();
        let wanted = if queen_side {
            Move::new_queenside_castle(position.side_to_move())
        } else {
            Move::new_kingside_castle(position.side_to_move())
        };
        return match moves.contains(&wanted) {
            true => Ok(wanted),
            false => Err(ChessError::AmbiguousOrIllegalSan(text.to_string())),
        };
    }

    let caps = san_regex()
        .captures(text)
        .ok_or_else(|| ChessError::InvalidNotation(text.to_string()))?;
    let piece_type = caps
        .get(1)
        .and_then(|m| m.as_str().chars().next())
        .and_then(PieceType::from_letter)
        .unwrap_or(PieceType::Pawn);
    let from_file = caps.get(2).and_then(|m| m.as_str().chars().next()).and_then(square::parse_file);
    let from_rank = caps.get(3).and_then(|m| m.as_str().chars().next()).and_then(square::parse_rank);
    let target = caps
        .get(5)
        .and_then(|m| parse_square(m.as_str()))
        .ok_or_else(|| ChessError::InvalidNotation(text.to_string()))?;
    let promotion = caps.get(6).and_then(|m| m.as_str().chars().next()).and_then(PieceType::from_letter);
    let capture = caps.get(4).is_some();
    // A pawn without a source file only pushes
    let from_file = match (piece_type, from_file) {
        (PieceType::Pawn, None) => Some(file_of(target)),
        (_, f) => f,
    };

    let mut candidates = moves.iter().filter(|mv| {
        mv.target() == target
            && !mv.is_castle()
            && mv.is_capture() == capture
            && position.piece_type_on(mv.origin()) == Some(piece_type)
            && from_file.map_or(true, |f| file_of(mv.origin()) == f)
            && from_rank.map_or(true, |r| rank_of(mv.origin()) == r)
            && mv.promotion_target() == promotion
    });

    match (candidates.next(), candidates.next()) {
        (Some(mv), None) => Ok(*mv),
        _ => Err(ChessError::AmbiguousOrIllegalSan(text.to_string())),
    }
}

/// Writes `mv`, a legal move of `position`, in standard algebraic notation
pub fn encode_san(mv: Move, position: &Position) -> String {
    let mut san = String::new();
    match mv.flags() {
        MoveFlags::KingSideCastle => san.push_str("O-O"),
        MoveFlags::QueenSideCastle => san.push_str("O-O-O"),
        _ => {
            let piece_type = match position.piece_type_on(mv.origin()) {
                Some(p) => p,
                None => return encode_coordinate(mv),
            };
            match piece_type.san_letter() {
                None => {
                    if mv.is_capture() {
                        san.push(square::file_char(mv.origin()));
                    }
                }
                Some(letter) => {
                    san.push(letter);
                    san.push_str(&disambiguation(mv, piece_type, position));
                }
            }
            if mv.is_capture() {
                san.push('x');
            }
            san.push(square::file_char(mv.target()));
            san.push(square::rank_char(mv.target()));
            if let Some(p) = mv.promotion_target() {
                san.push('=');
                san.push(p.letter().to_ascii_uppercase());
            }
        }
    }

    let next = position.apply(mv);
    if is_checkmate(&next) {
        san.push('#');
    } else if next.in_check(next.side_to_move()) {
        san.push('+');
    }
    san
}

/// File, rank or both, whatever tells `mv` apart from the other pieces of
/// the same type reaching the same square
fn disambiguation(mv: Move, piece_type: PieceType, position: &Position) -> String {
    let rivals: Vec<Square> = legal_moves(position)
        .iter()
        .filter(|other| {
            other.target() == mv.target()
                && other.origin() != mv.origin()
                && position.piece_type_on(other.origin()) == Some(piece_type)
        })
        .map(|other| other.origin())
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| file_of(*sq) != file_of(mv.origin())) {
        square::file_char(mv.origin()).to_string()
    } else if rivals.iter().all(|sq| rank_of(*sq) != rank_of(mv.origin())) {
        square::rank_char(mv.origin()).to_string()
    } else {
        format!("{}{}", square::file_char(mv.origin()), square::rank_char(mv.origin()))
    }
}

/// Reads a move typed by a player: coordinate notation when the text starts
/// with two squares, algebraic notation otherwise
pub fn decode_move(text: &str, position: &Position) -> ChessResult<Move> {
    let text = text.trim();
    let starts_with_squares = matches!(
        (text.get(0..2).and_then(parse_square), text.get(2..4).and_then(parse_square)),
        (Some(_), Some(_))
    );
    if starts_with_squares {
        decode_coordinate(text, position)
    } else {
        decode_san(text, position)
    }
}

/// SAN of every recorded move, oldest first
pub fn san_history(record: &GameRecord) -> Vec<String> {
    record
        .entries()
        .iter()
        .map(|entry| encode_san(entry.mv, &entry.before))
        .collect()
}

/// Renders the moves of a game as "1. e4 e5 2. Nf3"
pub fn format_move_history(record: &GameRecord) -> String {
    let mut parts = vec![];
    for (i, entry) in record.entries().iter().enumerate() {
        let san = encode_san(entry.mv, &entry.before);
        match entry.before.side_to_move() {
            Color::White => parts.push(format!("{}. {}", entry.before.fullmove_number(), san)),
            Color::Black if i == 0 => parts.push(format!("{}... {}", entry.before.fullmove_number(), san)),
            Color::Black => parts.push(san),
        }
    }
    parts.join(" ")
}
