//! SGF point coordinates.
//!
//! A point is written as two lowercase letters, column first: `"aa"` is the
//! top-left corner and `"pd"` is (15, 3). Anything else (the empty FF[4]
//! pass, for one) decodes to nothing. The FF[3] pass `"tt"` decodes but
//! lands off a 19x19 board. Callers skip both.

use crate::constants::MAX_BOARD_SIZE;

/// A board point as `(x, y)`, column then row, both zero-based.
pub type Point = (usize, usize);

/// Decode a two-letter SGF coordinate.
///
/// Returns `None` for any input that is not exactly two letters in `a..=z`.
pub fn parse_coord(s: &str) -> Option<Point> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let axis = |b: u8| b.is_ascii_lowercase().then(|| (b - b'a') as usize);
    Some((axis(bytes[0])?, axis(bytes[1])?))
}

/// Encode a point as a two-letter SGF coordinate.
///
/// Returns `None` when either axis is not addressable by a single letter.
pub fn str_coord((x, y): Point) -> Option<String> {
    if x >= MAX_BOARD_SIZE || y >= MAX_BOARD_SIZE {
        return None;
    }
    let letter = |v: usize| (b'a' + v as u8) as char;
    Some([letter(x), letter(y)].iter().collect())
}

/// Whether `point` lies on a `size`x`size` board.
#[inline]
pub fn on_board((x, y): Point, size: usize) -> bool {
    x < size && y < size
}

/// Expand an SGF point list, unfolding compressed rectangles (`"aa:cc"`).
///
/// Entries that are not valid rectangles are passed through unchanged so
/// the decode step can drop them.
pub fn expand_point_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        let value = value.as_ref();
        let rect = value
            .split_once(':')
            .and_then(|(a, b)| Some((parse_coord(a)?, parse_coord(b)?)));
        match rect {
            Some(((x1, y1), (x2, y2))) => {
                for y in y1.min(y2)..=y1.max(y2) {
                    for x in x1.min(x2)..=x1.max(x2) {
                        out.extend(str_coord((x, y)));
                    }
                }
            }
            None => out.push(value.to_string()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coord_corners() {
        assert_eq!(parse_coord("aa"), Some((0, 0)));
        assert_eq!(parse_coord("ss"), Some((18, 18)));
        assert_eq!(parse_coord("pd"), Some((15, 3)));
        assert_eq!(parse_coord("zz"), Some((25, 25)));
    }

    #[test]
    fn test_parse_coord_rejects_malformed() {
        assert_eq!(parse_coord(""), None);
        assert_eq!(parse_coord("a"), None);
        assert_eq!(parse_coord("abc"), None);
        assert_eq!(parse_coord("A1"), None);
        assert_eq!(parse_coord("PD"), None);
        assert_eq!(parse_coord("a1"), None);
        assert_eq!(parse_coord("é"), None);
    }

    #[test]
    fn test_str_coord_out_of_range() {
        assert_eq!(str_coord((3, 15)), Some("dp".to_string()));
        assert_eq!(str_coord((26, 0)), None);
        assert_eq!(str_coord((0, 26)), None);
    }

    #[test]
    fn test_pass_is_off_board() {
        // "tt" is the FF[3] pass; it decodes but falls outside 19x19.
        let tt = parse_coord("tt").unwrap();
        assert!(!on_board(tt, 19));
        assert!(on_board(tt, 21));
    }

    #[test]
    fn test_expand_point_list_rectangle() {
        let expanded = expand_point_list(&["aa:bb", "dd"]);
        assert_eq!(expanded, vec!["aa", "ba", "ab", "bb", "dd"]);
    }

    #[test]
    fn test_expand_point_list_reversed_corners() {
        let expanded = expand_point_list(&["cb:ba"]);
        assert_eq!(expanded, vec!["ba", "ca", "bb", "cb"]);
    }

    #[test]
    fn test_expand_point_list_keeps_malformed() {
        let expanded = expand_point_list(&["a:b", "", "xyz"]);
        assert_eq!(expanded, vec!["a:b", "", "xyz"]);
    }
}
