use crate::bitboard::Bitboard;
use crate::castling::CastlingRights;
use crate::error::{ChessError, ChessResult};
use crate::piece::Color::{Black, White};
use crate::piece::{Color, Piece, PieceType};
use crate::r#move::{Move, MoveFlags};
use crate::square::{self, parse_square, rank_of, square_name, Square};
use crate::zob_hash::{Hash, ZobristHasher};
use std::fmt::{Display, Formatter};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Bitboards are indexed by color and piece_type, with a redundant
// color bitboard at index 6.
const ALL_PIECES: usize = 6;

/// A full chess position. Positions are plain values: `apply` returns the
/// successor and never touches `self`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Position {
    bitboards: [[Bitboard; 7]; 2],
    pieces: [Option<Piece>; 64],
    side_to_move: Color,
    castling_rights: CastlingRights,
    ep_target: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: Hash,
}

impl Position {
    fn empty() -> Position {
        Position {
            bitboards: [[Bitboard::EMPTY; 7]; 2],
            pieces: [None; 64],
            side_to_move: White,
            castling_rights: CastlingRights::NONE,
            ep_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        }
    }

    /// The standard initial layout
    pub fn startpos() -> Position {
        match Self::from_fen(STARTING_FEN) {
            Ok(position) => position,
            Err(e) => unreachable!("starting FEN rejected: {}", e),
        }
    }

    /// Produces the position reached by playing `mv`.
    /// The move is expected to be legal, anything else breaks the position
    pub fn apply(&self, mv: Move) -> Position {
        let mut next = *self;
        next.make(mv);
        next
    }

    fn make(&mut self, mv: Move) {
        let origin = mv.origin();
        let target = mv.target();
        let us = self.side_to_move;

        let moved_piece = match self.remove_piece(origin) {
            Some(p) => p,
            None => {
                debug_assert!(false, "no piece to move on {}", origin);
                return;
            }
        };
        let captured = self.remove_piece(target);
        self.add_piece(moved_piece, target);

        self.hash ^= ZobristHasher::castling_rights_hash(self.castling_rights);
        self.castling_rights.revoke_for_square(origin);
        self.castling_rights.revoke_for_square(target);
        self.hash ^= ZobristHasher::castling_rights_hash(self.castling_rights);

        self.hash ^= ZobristHasher::en_passant_hash(self.ep_target);
        self.ep_target = None;

        match mv.flags() {
            MoveFlags::DoublePush => {
                self.ep_target = Some((target + origin) / 2);
                self.hash ^= ZobristHasher::en_passant_hash(self.ep_target);
            }
            MoveFlags::EnPassant => {
                self.remove_piece(if us == White { target - 8 } else { target + 8 });
            }
            MoveFlags::Promotion(p) | MoveFlags::PromotionCapture(p) => {
                self.remove_piece(target);
                self.add_piece(Piece::new(p, us), target);
            }
            MoveFlags::KingSideCastle => {
                let (from, to) = if us == White { (square::H1, square::F1) } else { (square::H8, square::F8) };
                if let Some(rook) = self.remove_piece(from) {
                    self.add_piece(rook, to)
                }
            }
            MoveFlags::QueenSideCastle => {
                let (from, to) = if us == White { (square::A1, square::D1) } else { (square::A8, square::D8) };
                if let Some(rook) = self.remove_piece(from) {
                    self.add_piece(rook, to)
                }
            }
            MoveFlags::Quiet | MoveFlags::Capture => (),
        }

        if moved_piece.piece_type == PieceType::Pawn || captured.is_some() || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Black {
            self.fullmove_number += 1;
        }

        self.hash ^= ZobristHasher::side_to_move_hash(Black);
        self.side_to_move = us.opposite();
    }

    /// The position where the side to move passes. Only meaningful when the
    /// side to move is not in check, it is used to measure the opponent's mobility
    pub fn with_side_flipped(&self) -> Position {
        let mut next = *self;
        next.hash ^= ZobristHasher::en_passant_hash(next.ep_target);
        next.ep_target = None;
        next.hash ^= ZobristHasher::side_to_move_hash(Black);
        next.side_to_move = next.side_to_move.opposite();
        next
    }

    /// Places a new piece on a given square
    fn add_piece(&mut self, piece: Piece, sq: Square) {
        self.pieces[sq] = Some(piece);
        self.bitboards[piece.color.index()][piece.piece_type as usize].set(sq);
        self.bitboards[piece.color.index()][ALL_PIECES].set(sq);
        self.hash ^= ZobristHasher::hash_for_piece_sq(piece, sq);
    }

    /// Clears the given square, returning the piece that has been removed if any
    fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let removed = self.pieces[sq].take();
        if let Some(p) = removed {
            self.bitboards[p.color.index()][p.piece_type as usize].unset(sq);
            self.bitboards[p.color.index()][ALL_PIECES].unset(sq);
            self.hash ^= ZobristHasher::hash_for_piece_sq(p, sq);
        }
        removed
    }

    /*
    INTERESTING GETTERS
     */
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.ep_target
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.pieces[sq]
    }

    pub fn piece_type_on(&self, sq: Square) -> Option<PieceType> {
        self.pieces[sq].map(|p| p.piece_type)
    }

    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.pieces[sq].map(|p| p.color)
    }

    pub fn get_piece_bitboard(&self, piece_type: PieceType, color: Color) -> Bitboard {
        self.bitboards[color.index()][piece_type as usize]
    }

    pub fn get_piecetype_bitboard(&self, piece_type: PieceType) -> Bitboard {
        self.bitboards[0][piece_type as usize] | self.bitboards[1][piece_type as usize]
    }

    pub fn get_color_bitboard(&self, color: Color) -> Bitboard {
        self.bitboards[color.index()][ALL_PIECES]
    }

    pub fn get_occupancy_bitboard(&self) -> Bitboard {
        self.bitboards[0][ALL_PIECES] | self.bitboards[1][ALL_PIECES]
    }

    pub fn get_diagonal_sliders_bitboard(&self, color: Color) -> Bitboard {
        self.get_piece_bitboard(PieceType::Bishop, color) | self.get_piece_bitboard(PieceType::Queen, color)
    }

    pub fn get_cardinal_sliders_bitboard(&self, color: Color) -> Bitboard {
        self.get_piece_bitboard(PieceType::Rook, color) | self.get_piece_bitboard(PieceType::Queen, color)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.get_piece_bitboard(PieceType::King, color).ls1b()
    }

    pub fn in_check(&self, side: Color) -> bool {
        match self.king_square(side) {
            Some(sq) => self.is_square_attacked(sq, side.opposite()),
            None => false,
        }
    }

    pub fn is_square_attacked(&self, target: Square, attacking_color: Color) -> bool {
        !self.attackers_of_square(target, attacking_color).is_empty()
    }

    /// Returns a bitboard with the pieces of `attacking_color` attacking a square
    pub fn attackers_of_square(&self, target: Square, attacking_color: Color) -> Bitboard {
        let occupancy = self.get_occupancy_bitboard();
        let mut attackers = Bitboard::pawn_attacks(Bitboard::from_square(target), attacking_color.opposite())
            & self.get_piece_bitboard(PieceType::Pawn, attacking_color);
        attackers |= Bitboard::KNIGHT_ATTACKS[target] & self.get_piece_bitboard(PieceType::Knight, attacking_color);
        attackers |= Bitboard::KING_ATTACKS[target] & self.get_piece_bitboard(PieceType::King, attacking_color);
        attackers |= Bitboard::bishop_attacks(target, occupancy) & self.get_diagonal_sliders_bitboard(attacking_color);
        attackers |= Bitboard::rook_attacks(target, occupancy) & self.get_cardinal_sliders_bitboard(attacking_color);
        attackers
    }

    /// A simple iterator over material, each item being a piece type, and its associated bitboard
    pub fn material_iter(&self, color: Color) -> impl Iterator<Item = (PieceType, Bitboard)> + '_ {
        PieceType::ALL
            .iter()
            .map(move |pt| (*pt, self.bitboards[color.index()][*pt as usize]))
    }

    /*
    REPETITION IDENTITY
     */
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// The en passant target, only when some pawn can legally take on it
    pub fn capturable_en_passant(&self) -> Option<Square> {
        let target = self.ep_target?;
        let us = self.side_to_move;
        let mut capturers = Bitboard::pawn_attacks(Bitboard::from_square(target), us.opposite())
            & self.get_piece_bitboard(PieceType::Pawn, us);
        capturers
            .any(|origin| !self.apply(Move::new_en_passant(origin, target)).in_check(us))
            .then_some(target)
    }

    /// Hash of the repetition identity: like `hash`, but an en passant
    /// target nobody can capture on is left out
    pub fn repetition_hash(&self) -> Hash {
        self.hash
            ^ ZobristHasher::en_passant_hash(self.ep_target)
            ^ ZobristHasher::en_passant_hash(self.capturable_en_passant())
    }

    /// Two positions are the same for repetition purposes when board, side to
    /// move, castling rights and capturable en passant target agree.
    /// Clocks are ignored
    pub fn same_position(&self, other: &Position) -> bool {
        self.pieces == other.pieces
            && self.side_to_move == other.side_to_move
            && self.castling_rights == other.castling_rights
            && self.capturable_en_passant() == other.capturable_en_passant()
    }

    fn cold_hash(&self) -> Hash {
        let mut hash = 0u64;
        for (sq, maybe_piece) in self.pieces.iter().enumerate() {
            if let Some(piece) = maybe_piece {
                hash ^= ZobristHasher::hash_for_piece_sq(*piece, sq)
            }
        }
        hash ^= ZobristHasher::side_to_move_hash(self.side_to_move);
        hash ^= ZobristHasher::castling_rights_hash(self.castling_rights);
        hash ^= ZobristHasher::en_passant_hash(self.ep_target);
        hash
    }

    /*
    FEN STRING OPERATIONS
     */

    /// Reads a position from its FEN representation. The half-move clock and
    /// full-move number may be omitted.
    /// ```
    /// use tessera::position::Position;
    /// let position = Position::from_fen("8/8/4k3/8/8/3K4/8/8 b - - 12 40").unwrap();
    /// assert_eq!(position.halfmove_clock(), 12);
    /// assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> ChessResult<Position> {
        let invalid = |reason: &str| ChessError::InvalidFen(format!("{} ({})", fen, reason));
        let mut sections = fen.split_whitespace();
        let piece_placement = sections.next().ok_or_else(|| invalid("empty"))?;
        let side = sections.next().ok_or_else(|| invalid("missing side to move"))?;
        let castling = sections.next().unwrap_or("-");
        let ep_target = sections.next().unwrap_or("-");
        let halfmove = sections.next().unwrap_or("0");
        let fullmove = sections.next().unwrap_or("1");

        let mut position = Position::empty();
        position.side_to_move = match side {
            "w" => White,
            "b" => Black,
            _ => return Err(invalid("bad side to move")),
        };
        position.castling_rights = CastlingRights::from_fen(castling).ok_or_else(|| invalid("bad castling rights"))?;
        position.ep_target = match ep_target {
            "-" => None,
            s => Some(parse_square(s).filter(|_| s.len() == 2).ok_or_else(|| invalid("bad en passant square"))?),
        };
        position.halfmove_clock = halfmove.parse::<u32>().map_err(|_| invalid("bad half-move clock"))?;
        position.fullmove_number = fullmove.parse::<u32>().map_err(|_| invalid("bad full-move number"))?;

        let ranks: Vec<&str> = piece_placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid("expected 8 ranks"));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                let piece = Piece::from_char(c).ok_or_else(|| invalid("unknown piece"))?;
                let sq = square::make_square(file, rank).ok_or_else(|| invalid("rank overflow"))?;
                position.add_piece(piece, sq);
                file += 1;
            }
            if file != 8 {
                return Err(invalid("rank does not have 8 files"));
            }
        }

        position.validate().map_err(|reason| invalid(reason))?;
        position.hash = position.cold_hash();
        Ok(position)
    }

    /// Exactly one king per side, no pawns on the back ranks, the side that
    /// just moved is not left in check, and the en passant square is behind a pawn
    fn validate(&self) -> Result<(), &'static str> {
        for color in [White, Black] {
            if self.get_piece_bitboard(PieceType::King, color).pop_count() != 1 {
                return Err("each side needs exactly one king");
            }
        }
        if !(self.get_piecetype_bitboard(PieceType::Pawn) & (Bitboard::RANKS[0] | Bitboard::RANKS[7])).is_empty() {
            return Err("pawn on a back rank");
        }
        if self.in_check(self.side_to_move.opposite()) {
            return Err("side not to move is in check");
        }
        if let Some(ep) = self.ep_target {
            let (ep_rank, pawn_sq) = match self.side_to_move {
                White => (5, ep.wrapping_sub(8)),
                Black => (2, ep + 8),
            };
            let pawn = Piece::new(PieceType::Pawn, self.side_to_move.opposite());
            if rank_of(ep) != ep_rank || self.pieces.get(pawn_sq).copied().flatten() != Some(pawn) {
                return Err("en passant square without a pawn behind it");
            }
        }
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty_counter = 0;
            for file in 0..8 {
                match self.pieces[rank * 8 + file] {
                    Some(p) => {
                        if empty_counter != 0 {
                            fen.push_str(&empty_counter.to_string())
                        }
                        empty_counter = 0;
                        fen.push(p.to_char())
                    }
                    None => empty_counter += 1,
                }
            }
            if empty_counter != 0 {
                fen.push_str(&empty_counter.to_string())
            }
            if rank != 0 {
                fen.push('/')
            }
        }

        let ep = self.ep_target.and_then(square_name).unwrap_or_else(|| String::from("-"));
        format!(
            "{} {} {} {} {} {}",
            fen, self.side_to_move, self.castling_rights, ep, self.halfmove_clock, self.fullmove_number
        )
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

/// The ASCII board of the console demos, white at the bottom, with the
/// position details next to the ranks
impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let details = [
            format!("side to move: {}", self.side_to_move.name()),
            format!("castling rights: {}", self.castling_rights),
            format!(
                "en passant: {}",
                self.ep_target.and_then(square_name).unwrap_or_else(|| String::from("-"))
            ),
            format!("half-move clock: {}", self.halfmove_clock),
            format!("full-move number: {}", self.fullmove_number),
        ];

        writeln!(f, "  a b c d e f g h")?;
        writeln!(f, " +-----------------+")?;
        for rank in (0..8).rev() {
            write!(f, "{}|", rank + 1)?;
            for file in 0..8 {
                let sq = rank * 8 + file;
                match self.pieces[sq] {
                    Some(p) => write!(f, " {}", p)?,
                    None if square::is_light(sq) => write!(f, " .")?,
                    None => write!(f, "  ")?,
                }
            }
            write!(f, " |{}", rank + 1)?;
            match details.get(7 - rank) {
                Some(line) => writeln!(f, "   {}", line)?,
                None => writeln!(f)?,
            }
        }
        writeln!(f, " +-----------------+")?;
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "fen: {}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fen_round_trip() {
        for fen in [
            STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn invalid_positions_are_rejected() {
        for fen in [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1BNR w kq - 0 1",
            "P3k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2r b - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - e6 0 1",
            "4k3/8/8/8/8/8/8/4K3 w Kz - 0 1",
        ] {
            assert!(
                matches!(Position::from_fen(fen), Err(ChessError::InvalidFen(_))),
                "accepted {}",
                fen
            );
        }
    }

    #[test]
    fn double_push_sets_en_passant_target_and_single_push_clears_it() {
        let start = Position::startpos();
        let after_e4 = start.apply(Move::new_double_push(12, 28));
        assert_eq!(after_e4.en_passant_target(), Some(20));
        assert_eq!(after_e4.side_to_move(), Black);
        let after_a6 = after_e4.apply(Move::new_quiet(48, 40));
        assert_eq!(after_a6.en_passant_target(), None);
        assert_eq!(after_a6.fullmove_number(), 2);
    }

    #[test]
    fn apply_leaves_the_original_untouched() {
        let start = Position::startpos();
        let copy = start;
        let _ = start.apply(Move::new_double_push(12, 28));
        assert_eq!(start, copy);
    }

    #[test]
    fn en_passant_removes_the_captured_pawn() {
        let position = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let next = position.apply(Move::new_en_passant(36, 43));
        assert_eq!(next.piece_on(35), None);
        assert_eq!(next.piece_type_on(43), Some(PieceType::Pawn));
        assert_eq!(next.halfmove_clock(), 0);
    }

    #[test]
    fn castling_moves_the_rook_and_revokes_rights() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 3 10").unwrap();
        let next = position.apply(Move::new_kingside_castle(White));
        assert_eq!(next.piece_type_on(square::G1), Some(PieceType::King));
        assert_eq!(next.piece_type_on(square::F1), Some(PieceType::Rook));
        assert_eq!(next.piece_on(square::H1), None);
        assert_eq!(next.castling_rights().to_string(), "kq");
        assert_eq!(next.halfmove_clock(), 4);

        let next = next.apply(Move::new_queenside_castle(Black));
        assert_eq!(next.piece_type_on(square::C8), Some(PieceType::King));
        assert_eq!(next.piece_type_on(square::D8), Some(PieceType::Rook));
        assert_eq!(next.castling_rights(), CastlingRights::NONE);
        assert_eq!(next.fullmove_number(), 11);
    }

    #[test]
    fn capturing_a_rook_revokes_the_opponents_right() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let next = position.apply(Move::new_capture(square::A1, square::A8));
        assert_eq!(next.castling_rights().to_string(), "Kk");
    }

    #[test]
    fn promotion_substitutes_the_piece() {
        let position = Position::from_fen("8/4P3/8/8/8/k7/8/4K3 w - - 5 60").unwrap();
        let next = position.apply(Move::new_promotion(52, 60, PieceType::Knight));
        assert_eq!(next.piece_on(60), Some(Piece::new(PieceType::Knight, White)));
        assert_eq!(next.piece_on(52), None);
    }

    #[test]
    fn incremental_hash_matches_a_fresh_one() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 3 10").unwrap();
        let next = position.apply(Move::new_kingside_castle(White));
        let reparsed = Position::from_fen(&next.to_fen()).unwrap();
        assert_eq!(next.hash(), reparsed.hash());
        assert!(next.same_position(&reparsed));
    }

    #[test]
    fn en_passant_counts_for_repetition_only_when_capturable() {
        let after_e4 = Position::startpos().apply(Move::new_double_push(12, 28));
        assert_eq!(after_e4.en_passant_target(), Some(20));
        assert_eq!(after_e4.capturable_en_passant(), None);
        let without_target = Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        assert!(after_e4.same_position(&without_target));
        assert_eq!(after_e4.repetition_hash(), without_target.repetition_hash());
        assert_ne!(after_e4.hash(), without_target.hash());

        let capturable = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        assert_eq!(capturable.capturable_en_passant(), Some(43));
        let no_target = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 2").unwrap();
        assert!(!capturable.same_position(&no_target));
        assert_ne!(capturable.repetition_hash(), no_target.repetition_hash());

        // Taking would expose the king along the fifth rank
        let pinned = Position::from_fen("8/8/8/K2pP2r/8/8/8/4k3 w - d6 0 2").unwrap();
        assert_eq!(pinned.capturable_en_passant(), None);
    }

    #[test]
    fn attacks_include_the_enemy_king() {
        let position = Position::from_fen("8/8/8/3k4/8/3K4/8/8 w - - 0 1").unwrap();
        assert!(position.is_square_attacked(28, Black));
        assert!(position.is_square_attacked(28, White));
        assert!(!position.in_check(White));
    }

    #[test]
    fn display_shows_the_board_and_fen() {
        let shown = Position::startpos().to_string();
        assert!(shown.contains("8| r n b q k b n r |8"));
        assert!(shown.contains("side to move: White"));
        assert!(shown.ends_with(STARTING_FEN));
    }
}
