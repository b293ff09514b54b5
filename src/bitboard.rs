use crate::piece::Color;
use crate::piece::PieceType;
use crate::square::Square;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

// Build script to calculate lookup tables at compile time
include!(concat!(env!("OUT_DIR"), "/lookup.rs"));

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    #[inline]
    pub fn from_square(square: Square) -> Bitboard {
        Bitboard(1u64 << square)
    }
    #[inline]
    pub fn from_squares(squares: &[Square]) -> Bitboard {
        let mut bits: u64 = 0;
        for sq in squares {
            bits |= 1u64 << sq
        }
        Bitboard(bits)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
    #[inline(always)]
    pub fn is_set(&self, sq: Square) -> bool {
        self.0 & (1u64 << sq) != 0
    }
    #[inline(always)]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1u64 << sq
    }
    #[inline(always)]
    pub fn unset(&mut self, sq: Square) {
        self.0 &= !(1u64 << sq)
    }

    #[inline(always)]
    pub fn ls1b(&self) -> Option<Square> {
        if self.is_empty() {
            None
        } else {
            Some(self.0.trailing_zeros() as Square)
        }
    }

    #[inline(always)]
    pub fn ms1b(&self) -> Option<Square> {
        if self.is_empty() {
            None
        } else {
            Some(63 - self.0.leading_zeros() as Square)
        }
    }

    #[inline(always)]
    pub fn pop_ls1b(&mut self) -> Option<Square> {
        let ls1b = self.ls1b()?;
        self.0 &= self.0 - 1;
        Some(ls1b)
    }

    #[inline(always)]
    pub fn pop_count(&self) -> u32 {
        self.0.count_ones()
    }

    /*
    SHIFTS
     */
    #[inline]
    pub fn north_shift(bb: &Bitboard) -> Bitboard {
        Bitboard(bb.0 << 8)
    }
    #[inline]
    pub fn south_shift(bb: &Bitboard) -> Bitboard {
        Bitboard(bb.0 >> 8)
    }
    #[inline]
    pub fn north_west_shift(bb: &Bitboard) -> Bitboard {
        Bitboard(bb.0 << 7) & !Self::FILES[7]
    }
    #[inline]
    pub fn north_east_shift(bb: &Bitboard) -> Bitboard {
        Bitboard(bb.0 << 9) & !Self::FILES[0]
    }
    #[inline]
    pub fn south_west_shift(bb: &Bitboard) -> Bitboard {
        Bitboard(bb.0 >> 9) & !Self::FILES[7]
    }
    #[inline]
    pub fn south_east_shift(bb: &Bitboard) -> Bitboard {
        Bitboard(bb.0 >> 7) & !Self::FILES[0]
    }

    /*
    GENERALY USEFUL BITBOARDS
    */
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const UNIVERSE: Bitboard = Bitboard(!0);
    pub const LIGHT_SQUARES: Bitboard = Bitboard(0x55aa55aa55aa55aa);
    pub const DARK_SQUARES: Bitboard = Bitboard(0xaa55aa55aa55aa55);
    pub const FILES: [Bitboard; 8] = [
        Bitboard(0x0101010101010101),
        Bitboard(0x0202020202020202),
        Bitboard(0x0404040404040404),
        Bitboard(0x0808080808080808),
        Bitboard(0x1010101010101010),
        Bitboard(0x2020202020202020),
        Bitboard(0x4040404040404040),
        Bitboard(0x8080808080808080),
    ];
    pub const RANKS: [Bitboard; 8] = [
        Bitboard(0x00000000000000ff),
        Bitboard(0x000000000000ff00),
        Bitboard(0x0000000000ff0000),
        Bitboard(0x00000000ff000000),
        Bitboard(0x000000ff00000000),
        Bitboard(0x0000ff0000000000),
        Bitboard(0x00ff000000000000),
        Bitboard(0xff00000000000000),
    ];

    #[inline]
    pub fn pawn_pushes(pawns_bb: Bitboard, empty: Bitboard, color: Color) -> Bitboard {
        let shift = match color {
            Color::White => Self::north_shift(&pawns_bb),
            Color::Black => Self::south_shift(&pawns_bb),
        };
        shift & empty
    }

    #[inline]
    pub fn pawn_double_pushes(pawns_bb: Bitboard, empty: Bitboard, color: Color) -> Bitboard {
        let single_push = Self::pawn_pushes(pawns_bb, empty, color);
        let shift = match color {
            Color::White => Self::north_shift(&(single_push & Self::RANKS[2])),
            Color::Black => Self::south_shift(&(single_push & Self::RANKS[5])),
        };
        shift & empty
    }

    #[inline]
    pub fn pawn_east_attacks(pawns_bb: Bitboard, color: Color) -> Bitboard {
        match color {
            Color::White => Self::north_east_shift(&pawns_bb),
            Color::Black => Self::south_west_shift(&pawns_bb),
        }
    }
    #[inline]
    pub fn pawn_west_attacks(pawns_bb: Bitboard, color: Color) -> Bitboard {
        match color {
            Color::White => Self::north_west_shift(&pawns_bb),
            Color::Black => Self::south_east_shift(&pawns_bb),
        }
    }
    #[inline]
    pub fn pawn_attacks(pawns_bb: Bitboard, color: Color) -> Bitboard {
        Self::pawn_west_attacks(pawns_bb, color) | Self::pawn_east_attacks(pawns_bb, color)
    }

    pub fn slider_attacks(piece_type: PieceType, origin: Square, occupancy: Bitboard) -> Bitboard {
        match piece_type {
            PieceType::Bishop => Self::bishop_attacks(origin, occupancy),
            PieceType::Rook => Self::rook_attacks(origin, occupancy),
            PieceType::Queen => {
                Self::bishop_attacks(origin, occupancy) | Self::rook_attacks(origin, occupancy)
            }
            _ => Self::EMPTY,
        }
    }

    #[inline]
    pub fn bishop_attacks(origin: Square, occupancy: Bitboard) -> Bitboard {
        (4..8).fold(Self::EMPTY, |attacks, dir| {
            attacks | Self::ray_attacks(dir, origin, occupancy)
        })
    }

    #[inline]
    pub fn rook_attacks(origin: Square, occupancy: Bitboard) -> Bitboard {
        (0..4).fold(Self::EMPTY, |attacks, dir| {
            attacks | Self::ray_attacks(dir, origin, occupancy)
        })
    }

    /// Classical ray attacks: the ray is cut right after its first blocker.
    /// Even directions grow towards h8, so their first blocker is the LS1B,
    /// odd directions grow towards a1 and use the MS1B
    #[inline]
    fn ray_attacks(dir: usize, origin: Square, occupancy: Bitboard) -> Bitboard {
        let ray = Self::RAYS[dir][origin];
        let blockers = ray & occupancy;
        let first_blocker = if dir % 2 == 0 {
            blockers.ls1b()
        } else {
            blockers.ms1b()
        };
        match first_blocker {
            Some(sq) => ray & !Self::RAYS[dir][sq],
            None => ray,
        }
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                write!(f, "{}", if self.is_set(rank * 8 + file) { "x " } else { ". " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// A simple Iterator that resets the LS1B each time
impl Iterator for Bitboard {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop_ls1b()
    }
}

/*
BITWISE OPERATIONS IMPLEMENTATIONS
 */
impl BitAnd for Bitboard {
    type Output = Bitboard;
    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}
impl BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0
    }
}
impl BitOr for Bitboard {
    type Output = Bitboard;
    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}
impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}
impl BitXor for Bitboard {
    type Output = Bitboard;
    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}
impl BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, rhs: Bitboard) {
        self.0 ^= rhs.0
    }
}
impl Not for Bitboard {
    type Output = Bitboard;
    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_in_the_corner_has_two_targets() {
        assert_eq!(Bitboard::KNIGHT_ATTACKS[0], Bitboard::from_squares(&[10, 17]));
        assert_eq!(Bitboard::KNIGHT_ATTACKS[28].pop_count(), 8);
    }

    #[test]
    fn king_attacks_do_not_wrap_around_files() {
        assert_eq!(Bitboard::KING_ATTACKS[7], Bitboard::from_squares(&[6, 14, 15]));
    }

    #[test]
    fn sliders_stop_on_the_first_blocker() {
        // Rook on a1, blockers on a4 and d1
        let occupancy = Bitboard::from_squares(&[0, 24, 3]);
        let attacks = Bitboard::rook_attacks(0, occupancy);
        assert_eq!(attacks, Bitboard::from_squares(&[8, 16, 24, 1, 2, 3]));

        // Bishop on d4 with a blocker on f6 and b2
        let occupancy = Bitboard::from_squares(&[27, 45, 9]);
        let attacks = Bitboard::bishop_attacks(27, occupancy);
        assert!(attacks.is_set(45) && !attacks.is_set(54));
        assert!(attacks.is_set(9) && !attacks.is_set(0));
        assert!(attacks.is_set(48) && attacks.is_set(6));
    }

    #[test]
    fn square_color_masks_partition_the_board() {
        assert_eq!(Bitboard::LIGHT_SQUARES | Bitboard::DARK_SQUARES, Bitboard::UNIVERSE);
        assert!(!Bitboard::LIGHT_SQUARES.is_set(0));
        assert!(Bitboard::LIGHT_SQUARES.is_set(7));
    }

    #[test]
    fn iterating_pops_squares_in_order() {
        let squares: Vec<Square> = Bitboard::from_squares(&[63, 0, 12]).collect();
        assert_eq!(squares, vec![0, 12, 63]);
    }
}
