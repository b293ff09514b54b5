use crate::{
    bitboard::Bitboard,
    movelist::MoveList,
    piece::{Color, PieceType},
    position::Position,
    r#move::Move,
    square::{self, Square},
};

struct MoveGenInfo {
    pub move_list: MoveList,
    pub side: Color,
    pub occupancy: Bitboard,
    pub push_targets: Bitboard,
    pub capture_targets: Bitboard,
}

/// Generates every legal move for the side to move.
/// The order only depends on the position, so it is reproducible
pub fn legal_moves(position: &Position) -> MoveList {
    let us = position.side_to_move();
    let mut moves = pseudo_legal_moves(position);
    moves.retain(|mv| !position.apply(*mv).in_check(us));
    moves
}

pub fn is_legal(position: &Position, mv: Move) -> bool {
    legal_moves(position).contains(&mv)
}

/// Moves following the piece movement rules, some of which may leave the
/// mover's own king attacked. Castling is already fully checked here
pub fn pseudo_legal_moves(position: &Position) -> MoveList {
    let side = position.side_to_move();
    let occupancy = position.get_occupancy_bitboard();
    let mut info = MoveGenInfo {
        move_list: MoveList::default(),
        side,
        occupancy,
        push_targets: !occupancy,
        capture_targets: position.get_color_bitboard(side.opposite()),
    };

    pawn_moves(position, &mut info);
    en_passant(position, &mut info);
    knight_moves(position, &mut info);
    slider_moves(position, &mut info);
    king_moves(position, &mut info);
    castling(position, &mut info);

    info.move_list
}

/// Square `n` steps behind `target` from the point of view of `side`
fn behind(target: Square, side: Color, n: Square) -> Square {
    match side {
        Color::White => target - n,
        Color::Black => target + n,
    }
}

fn pawn_moves(position: &Position, info: &mut MoveGenInfo) {
    let pre_promo_rank = if info.side == Color::Black { Bitboard::RANKS[1] } else { Bitboard::RANKS[6] };
    let all_pawns = position.get_piece_bitboard(PieceType::Pawn, info.side);
    let pawns_bb = all_pawns & !pre_promo_rank;
    let promoting_bb = all_pawns & pre_promo_rank;
    let empty = !info.occupancy;

    for target in Bitboard::pawn_pushes(pawns_bb, empty, info.side) {
        info.move_list.push(Move::new_quiet(behind(target, info.side, 8), target))
    }
    for target in Bitboard::pawn_double_pushes(pawns_bb, empty, info.side) {
        info.move_list.push(Move::new_double_push(behind(target, info.side, 16), target))
    }
    for target in Bitboard::pawn_west_attacks(pawns_bb, info.side) & info.capture_targets {
        info.move_list.push(Move::new_capture(behind(target, info.side, 7), target))
    }
    for target in Bitboard::pawn_east_attacks(pawns_bb, info.side) & info.capture_targets {
        info.move_list.push(Move::new_capture(behind(target, info.side, 9), target))
    }

    if promoting_bb.is_empty() {
        return;
    }
    for target in Bitboard::pawn_pushes(promoting_bb, empty, info.side) {
        for promote_to in PieceType::PROMOTIONS {
            info.move_list.push(Move::new_promotion(behind(target, info.side, 8), target, promote_to));
        }
    }
    for target in Bitboard::pawn_west_attacks(promoting_bb, info.side) & info.capture_targets {
        for promote_to in PieceType::PROMOTIONS {
            info.move_list.push(Move::new_promotion_capture(behind(target, info.side, 7), target, promote_to));
        }
    }
    for target in Bitboard::pawn_east_attacks(promoting_bb, info.side) & info.capture_targets {
        for promote_to in PieceType::PROMOTIONS {
            info.move_list.push(Move::new_promotion_capture(behind(target, info.side, 9), target, promote_to));
        }
    }
}

fn en_passant(position: &Position, info: &mut MoveGenInfo) {
    if let Some(target) = position.en_passant_target() {
        // Pawns of ours standing where an enemy pawn on the target would attack
        let origins = Bitboard::pawn_attacks(Bitboard::from_square(target), info.side.opposite())
            & position.get_piece_bitboard(PieceType::Pawn, info.side);
        for origin in origins {
            info.move_list.push(Move::new_en_passant(origin, target))
        }
    }
}

fn push_targets_of(origin: Square, moves: Bitboard, info: &mut MoveGenInfo) {
    for target in moves & info.push_targets {
        info.move_list.push(Move::new_quiet(origin, target))
    }
    for target in moves & info.capture_targets {
        info.move_list.push(Move::new_capture(origin, target))
    }
}

fn knight_moves(position: &Position, info: &mut MoveGenInfo) {
    for origin in position.get_piece_bitboard(PieceType::Knight, info.side) {
        push_targets_of(origin, Bitboard::KNIGHT_ATTACKS[origin], info);
    }
}

fn slider_moves(position: &Position, info: &mut MoveGenInfo) {
    for piece_type in [PieceType::Bishop, PieceType::Rook, PieceType::Queen] {
        for origin in position.get_piece_bitboard(piece_type, info.side) {
            let moves = Bitboard::slider_attacks(piece_type, origin, info.occupancy);
            push_targets_of(origin, moves, info);
        }
    }
}

fn king_moves(position: &Position, info: &mut MoveGenInfo) {
    if let Some(origin) = position.king_square(info.side) {
        push_targets_of(origin, Bitboard::KING_ATTACKS[origin], info);
    }
}

/// Castling needs the right, the rook on its corner, empty squares between
/// king and rook, and a king that is neither in check nor crossing or
/// landing on an attacked square
fn castling(position: &Position, info: &mut MoveGenInfo) {
    let (king_side_right, queen_side_right) = position.castling_rights().get(info.side);
    if !king_side_right && !queen_side_right {
        return;
    }
    let (king_sq, rank_offset) = match info.side {
        Color::White => (square::E1, 0),
        Color::Black => (square::E8, 56),
    };
    let them = info.side.opposite();
    if position.piece_type_on(king_sq) != Some(PieceType::King)
        || position.color_on(king_sq) != Some(info.side)
        || position.is_square_attacked(king_sq, them)
    {
        return;
    }

    let (side, occupancy) = (info.side, info.occupancy);
    let rook_ready =
        |sq: Square| position.piece_type_on(sq) == Some(PieceType::Rook) && position.color_on(sq) == Some(side);
    let empty = |squares: &[Square]| squares.iter().all(|sq| !occupancy.is_set(sq + rank_offset));
    let safe = |squares: &[Square]| squares.iter().all(|sq| !position.is_square_attacked(sq + rank_offset, them));

    if king_side_right
        && rook_ready(square::H1 + rank_offset)
        && empty(&[square::F1, square::G1])
        && safe(&[square::F1, square::G1])
    {
        info.move_list.push(Move::new_kingside_castle(side))
    }
    if queen_side_right
        && rook_ready(square::A1 + rank_offset)
        && empty(&[square::B1, square::C1, square::D1])
        && safe(&[square::C1, square::D1])
    {
        info.move_list.push(Move::new_queenside_castle(side))
    }
}

/// Counts the leaf nodes of the legal move tree
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }
    moves.iter().map(|mv| perft(&position.apply(*mv), depth - 1)).sum()
}

/// Perft split by root move, handy to find which subtree disagrees with a reference
pub fn divide(position: &Position, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return vec![];
    }
    legal_moves(position)
        .iter()
        .map(|mv| (*mv, perft(&position.apply(*mv), depth - 1)))
        .collect()
}
