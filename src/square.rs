pub type Square = usize;

pub const A1: Square = 0;
pub const B1: Square = 1;
pub const C1: Square = 2;
pub const D1: Square = 3;
pub const E1: Square = 4;
pub const F1: Square = 5;
pub const G1: Square = 6;
pub const H1: Square = 7;
pub const A8: Square = 56;
pub const C8: Square = 58;
pub const D8: Square = 59;
pub const E8: Square = 60;
pub const F8: Square = 61;
pub const G8: Square = 62;
pub const H8: Square = 63;

pub fn rank_of(sq: Square) -> usize {
    sq / 8
}
pub fn file_of(sq: Square) -> usize {
    sq % 8
}

/// Builds a square from its file (0 = a) and rank (0 = first rank)
/// ```
/// use tessera::square::make_square;
/// assert_eq!(make_square(4, 3), Some(28));
/// assert_eq!(make_square(8, 0), None);
/// ```
pub fn make_square(file: usize, rank: usize) -> Option<Square> {
    if file < 8 && rank < 8 {
        Some(rank * 8 + file)
    } else {
        None
    }
}

/// Parses a square from the first two characters of a string slice
/// ```
/// use tessera::square::parse_square;
/// assert_eq!(parse_square("e4"), Some(28));
/// assert_eq!(parse_square("d2d4"), Some(11));
/// assert_eq!(parse_square("k9"), None);
/// assert_eq!(parse_square("e"), None);
/// ```
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = parse_file(chars.next()?)?;
    let rank = parse_rank(chars.next()?)?;
    make_square(file, rank)
}

pub fn parse_file(c: char) -> Option<usize> {
    match c {
        'a'..='h' => Some(c as usize - 'a' as usize),
        _ => None,
    }
}

pub fn parse_rank(c: char) -> Option<usize> {
    match c {
        '1'..='8' => Some(c as usize - '1' as usize),
        _ => None,
    }
}

pub fn file_char(sq: Square) -> char {
    (b'a' + file_of(sq) as u8) as char
}

pub fn rank_char(sq: Square) -> char {
    (b'1' + rank_of(sq) as u8) as char
}

/// Returns the string representation of a square
/// ```
/// use tessera::square::square_name;
/// assert_eq!(square_name(28), Some(String::from("e4")));
/// assert_eq!(square_name(63), Some(String::from("h8")));
/// assert_eq!(square_name(64), None);
/// ```
pub fn square_name(sq: Square) -> Option<String> {
    if !is_valid(sq) {
        return None;
    }
    Some([file_char(sq), rank_char(sq)].iter().collect())
}

/// Checks whether a given square is in bounds (0..64) or not
pub fn is_valid(sq: Square) -> bool {
    sq < 64
}

/// True for the squares a light-squared bishop can stand on
pub fn is_light(sq: Square) -> bool {
    (file_of(sq) + rank_of(sq)) % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_square_round_trips_through_its_name() {
        for sq in 0..64 {
            let name = square_name(sq).unwrap();
            assert_eq!(parse_square(&name), Some(sq));
        }
    }

    #[test]
    fn square_colors() {
        assert!(!is_light(A1));
        assert!(is_light(H1));
        assert!(!is_light(H8));
        assert!(is_light(D1));
    }
}
