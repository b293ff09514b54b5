use crate::move_generator::legal_moves;
use crate::piece::{Color, PieceType};
use crate::position::Position;

pub type Score = i32;

pub struct Evaluation {}
impl Evaluation {
    /// Centipawn values indexed by piece type. Kings carry no material,
    /// losing one is scored by the mate terminal instead
    pub const PIECE_TYPE_VALUE: [Score; 6] = [100, 300, 300, 500, 900, 0];
    pub const MOBILITY_WEIGHT: Score = 10;
    pub const MATE_SCORE: Score = 1_000_000;
    pub const DRAW_SCORE: Score = 0;
    pub const INFINITY: Score = Self::MATE_SCORE + 1;

    /// Static evaluation from the point of view of the side to move.
    /// `own_moves` is the number of legal moves of the side to move, the
    /// caller usually already knows it
    pub fn evaluate(position: &Position, own_moves: usize) -> Score {
        let us = position.side_to_move();
        let material = Self::material(position, us) - Self::material(position, us.opposite());
        let mobility = own_moves as Score - Self::opponent_mobility(position, own_moves);
        material + Self::MOBILITY_WEIGHT * mobility
    }

    /// Sum of the material a side owns
    pub fn material(position: &Position, color: Color) -> Score {
        position
            .material_iter(color)
            .map(|(piece_type, bb)| Self::value(piece_type) * bb.pop_count() as Score)
            .sum()
    }

    pub fn value(piece_type: PieceType) -> Score {
        Self::PIECE_TYPE_VALUE[piece_type as usize]
    }

    /// Legal move count of the opponent if it were to move now.
    /// When we are in check the null move would leave our king en prise, the
    /// mobility term is neutral then
    fn opponent_mobility(position: &Position, own_moves: usize) -> Score {
        if position.in_check(position.side_to_move()) {
            return own_moves as Score;
        }
        legal_moves(&position.with_side_flipped()).len() as Score
    }

    /// Most valuable victim, least valuable attacker. Only used to order moves
    pub fn mvv_lva(victim: Option<PieceType>, attacker: Option<PieceType>) -> Score {
        match (victim, attacker) {
            (Some(v), Some(a)) => 10 * Self::value(v) - Self::value(a) + Self::PIECE_TYPE_VALUE[4],
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generator::legal_moves;

    fn eval(fen: &str) -> Score {
        let position = Position::from_fen(fen).unwrap();
        Evaluation::evaluate(&position, legal_moves(&position).len())
    }

    #[test]
    fn start_position_is_balanced() {
        assert_eq!(eval(crate::STARTING_FEN), 0);
    }

    #[test]
    fn extra_material_is_seen_from_the_side_to_move() {
        // White is a queen up
        let white_view = eval("4k3/8/8/8/8/8/8/3QK3 w - - 0 1");
        let black_view = eval("4k3/8/8/8/8/8/8/3QK3 b - - 0 1");
        assert!(white_view > 800);
        assert!(black_view < -800);
    }

    #[test]
    fn mobility_breaks_material_ties() {
        // Same material, the centralised knight has more moves
        let centralised = eval("4k3/8/8/8/3N4/8/8/4K2n w - - 0 1");
        assert!(centralised > 0);
    }
}
