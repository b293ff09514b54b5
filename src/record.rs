use crate::position::Position;
use crate::r#move::Move;
use crate::zob_hash::Hash;

/// One played move with the positions on both sides of it
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub before: Position,
    pub mv: Move,
    pub after: Position,
}

/// The moves of a game, in the order they were played
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRecord {
    entries: Vec<RecordEntry>,
}

impl GameRecord {
    pub fn new() -> GameRecord {
        GameRecord::default()
    }

    pub fn push(&mut self, before: Position, mv: Move, after: Position) {
        self.entries.push(RecordEntry { before, mv, after })
    }

    pub fn pop(&mut self) -> Option<RecordEntry> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&RecordEntry> {
        self.entries.last()
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.entries.iter().map(|entry| entry.mv)
    }

    /// Number of earlier positions that are the same as `position` for
    /// repetition purposes, the current occurrence excluded
    pub fn occurrences(&self, position: &Position) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.before.same_position(position))
            .count()
    }

    /// Zobrist keys of every position seen before the current one, oldest first
    pub fn history_hashes(&self) -> Vec<Hash> {
        self.entries.iter().map(|entry| entry.before.repetition_hash()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurrences_ignore_the_clocks() {
        let knight_dance = [
            Move::new_quiet(6, 21),
            Move::new_quiet(62, 45),
            Move::new_quiet(21, 6),
            Move::new_quiet(45, 62),
        ];
        let mut record = GameRecord::new();
        let mut position = Position::startpos();
        for mv in knight_dance {
            let next = position.apply(mv);
            record.push(position, mv, next);
            position = next;
        }
        assert_eq!(position.halfmove_clock(), 4);
        assert_eq!(record.occurrences(&position), 1);
        assert_eq!(record.history_hashes().len(), 4);
        assert_eq!(record.moves().next(), Some(Move::new_quiet(6, 21)));

        let popped = record.pop().unwrap();
        assert_eq!(popped.after, position);
        assert_eq!(record.len(), 3);
    }
}
