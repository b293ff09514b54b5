use crate::piece::Color;
use crate::piece::Color::{Black, White};
use crate::square::{Square, A1, A8, E1, E8, H1, H8};
use std::fmt::{Display, Formatter};

/// The four castling rights packed as `KQkq` from the high bit down
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Parses the castling field of a FEN string
    /// ```
    /// use tessera::castling::CastlingRights;
    /// use tessera::piece::Color;
    /// let rights = CastlingRights::from_fen("Kq").unwrap();
    /// assert_eq!(rights.get(Color::White), (true, false));
    /// assert_eq!(rights.get(Color::Black), (false, true));
    /// assert_eq!(CastlingRights::from_fen("-"), Some(CastlingRights::NONE));
    /// assert_eq!(CastlingRights::from_fen("Kx"), None);
    /// ```
    pub fn from_fen(s: &str) -> Option<CastlingRights> {
        if s == "-" {
            return Some(Self::NONE);
        }
        let mut res = CastlingRights(0);
        for c in s.chars() {
            res.0 |= match c {
                'K' => 0b1000,
                'Q' => 0b0100,
                'k' => 0b0010,
                'q' => 0b0001,
                _ => return None,
            }
        }
        Some(res)
    }

    /// Returns the (kingside, queenside) castling rights of a given color
    pub fn get(&self, side: Color) -> (bool, bool) {
        match side {
            White => (self.0 & 0b1000 != 0, self.0 & 0b0100 != 0),
            Black => (self.0 & 0b10 != 0, self.0 & 0b01 != 0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Drops every right tied to the given square, used for both the origin
    /// and the target of a move so rook captures are covered too
    pub fn revoke_for_square(&mut self, sq: Square) {
        self.0 &= match sq {
            E1 => 0b0011,
            H1 => 0b0111,
            A1 => 0b1011,
            E8 => 0b1100,
            H8 => 0b1101,
            A8 => 0b1110,
            _ => 0b1111,
        }
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        let (wking, wqueen) = self.get(White);
        let (bking, bqueen) = self.get(Black);
        write!(
            f,
            "{}{}{}{}",
            if wking { "K" } else { "" },
            if wqueen { "Q" } else { "" },
            if bking { "k" } else { "" },
            if bqueen { "q" } else { "" }
        )
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::ALL
    }
}
