use crate::piece::PieceType::{Bishop, Knight, Queen, Rook};
use crate::piece::{Color, PieceType};
use crate::square::{square_name, Square, C1, C8, E1, E8, G1, G8};
use std::fmt::{Display, Formatter};

/// Moves are stored as a 2bytes word, with the following alignment:
/// - 6*2 bits for origin and destination square
/// - 4 bits used for various flags
///
/// A move only makes sense relative to the position it was generated
/// (or decoded) in, since the flags describe that position.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    fn new(origin: Square, target: Square, flags: u16) -> Move {
        Move(((origin as u16) << 10) | ((target as u16) << 4) | flags)
    }
    pub fn new_quiet(origin: Square, target: Square) -> Move {
        Self::new(origin, target, 0b0)
    }
    pub fn new_double_push(origin: Square, target: Square) -> Move {
        Self::new(origin, target, 0b1)
    }
    pub fn new_capture(origin: Square, target: Square) -> Move {
        Self::new(origin, target, 0b100)
    }
    pub fn new_en_passant(origin: Square, target: Square) -> Move {
        Self::new(origin, target, 0b101)
    }
    pub fn new_kingside_castle(color: Color) -> Move {
        match color {
            Color::White => Self::new(E1, G1, 0b10),
            Color::Black => Self::new(E8, G8, 0b10),
        }
    }
    pub fn new_queenside_castle(color: Color) -> Move {
        match color {
            Color::White => Self::new(E1, C1, 0b11),
            Color::Black => Self::new(E8, C8, 0b11),
        }
    }
    pub fn new_promotion(origin: Square, target: Square, promote_to: PieceType) -> Move {
        Self::new(origin, target, 0b1000 | Self::promotion_bits(promote_to))
    }
    pub fn new_promotion_capture(origin: Square, target: Square, promote_to: PieceType) -> Move {
        Self::new(origin, target, 0b1100 | Self::promotion_bits(promote_to))
    }

    fn promotion_bits(promote_to: PieceType) -> u16 {
        match promote_to {
            Knight => 0b00,
            Bishop => 0b01,
            Rook => 0b10,
            _ => 0b11,
        }
    }

    pub fn origin(&self) -> Square {
        (self.0 >> 10) as Square
    }
    pub fn target(&self) -> Square {
        ((self.0 >> 4) & 0b111111) as Square
    }
    pub fn flags(&self) -> MoveFlags {
        match self.0 & 0b1111 {
            0b0001 => MoveFlags::DoublePush,
            0b0010 => MoveFlags::KingSideCastle,
            0b0011 => MoveFlags::QueenSideCastle,
            0b0100 => MoveFlags::Capture,
            0b0101 => MoveFlags::EnPassant,
            0b1000 => MoveFlags::Promotion(Knight),
            0b1001 => MoveFlags::Promotion(Bishop),
            0b1010 => MoveFlags::Promotion(Rook),
            0b1011 => MoveFlags::Promotion(Queen),
            0b1100 => MoveFlags::PromotionCapture(Knight),
            0b1101 => MoveFlags::PromotionCapture(Bishop),
            0b1110 => MoveFlags::PromotionCapture(Rook),
            0b1111 => MoveFlags::PromotionCapture(Queen),
            _ => MoveFlags::Quiet,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.0 & 0b100 != 0
    }

    pub fn is_castle(&self) -> bool {
        matches!(self.flags(), MoveFlags::KingSideCastle | MoveFlags::QueenSideCastle)
    }

    pub fn promotion_target(&self) -> Option<PieceType> {
        match self.flags() {
            MoveFlags::Promotion(p) | MoveFlags::PromotionCapture(p) => Some(p),
            _ => None,
        }
    }

    /// Checks origin, target and promotion, ignoring flags
    pub fn same_squares(&self, origin: Square, target: Square, promotion: Option<PieceType>) -> bool {
        self.origin() == origin && self.target() == target && self.promotion_target() == promotion
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let o = square_name(self.origin()).unwrap_or_else(|| String::from("**"));
        let t = square_name(self.target()).unwrap_or_else(|| String::from("**"));
        match self.promotion_target() {
            Some(p) => write!(f, "{}{}{}", o, t, p),
            None => write!(f, "{}{}", o, t),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveFlags {
    Quiet,
    DoublePush,
    KingSideCastle,
    QueenSideCastle,
    Capture,
    EnPassant,
    Promotion(PieceType),
    PromotionCapture(PieceType),
}
