//! Fixed lookup tables for the generators.
//!
//! The keyboard table is hand-authored and deliberately asymmetric; it must
//! stay as is so results remain comparable with earlier scans.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref QWERTY: HashMap<char, &'static str> = [
        ('1', "2q"), ('2', "3wq1"), ('3', "4ew2"), ('4', "5re3"), ('5', "6tr4"),
        ('6', "7yt5"), ('7', "8uy6"), ('8', "9iu7"), ('9', "0oi8"), ('0', "po9"),
        ('q', "12wa"), ('w', "3esaq2"), ('e', "4rdsw3"), ('r', "5tfde4"), ('t', "6ygfr5"),
        ('y', "7uhgt6"), ('u', "8ijhy7"), ('i', "9okju8"), ('o', "0plki9"), ('p', "lo0"),
        ('a', "qwsz"), ('s', "edxzaw"), ('d', "rfcxse"), ('f', "tgvcdr"), ('g', "yhbvft"),
        ('h', "ujnbgy"), ('j', "ikmnhu"), ('k', "olmji"), ('l', "kop"),
        ('z', "asx"), ('x', "zsdc"), ('c', "xdfv"), ('v', "cfgb"), ('b', "vghn"),
        ('n', "bhjm"), ('m', "njk"),
    ]
    .into_iter()
    .collect();

    static ref GLYPHS: HashMap<char, &'static [&'static str]> = {
        let table: [(char, &'static [&'static str]); 10] = [
            ('d', &["b", "cl"]),
            ('m', &["n", "rn"]),
            ('l', &["1", "i"]),
            ('o', &["0"]),
            ('w', &["vv"]),
            ('n', &["m"]),
            ('b', &["d"]),
            ('i', &["1", "l"]),
            ('g', &["q"]),
            ('q', &["g"]),
        ];
        table.into_iter().collect()
    };
}

/// Keys physically adjacent to `c`, if `c` is on the map
pub fn adjacent_keys(c: char) -> Option<&'static str> {
    QWERTY.get(&c).copied()
}

/// Look-alike replacements for `c`; empty when it has none
pub fn glyphs(c: char) -> &'static [&'static str] {
    GLYPHS.get(&c).copied().unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_table_covers_letters_and_digits() {
        for c in ('a'..='z').chain('0'..='9') {
            assert!(adjacent_keys(c).is_some(), "missing key {c}");
        }
        assert!(adjacent_keys('-').is_none());
        assert!(adjacent_keys('.').is_none());
    }

    #[test]
    fn keyboard_table_is_kept_verbatim() {
        assert_eq!(adjacent_keys('w'), Some("3esaq2"));
        assert_eq!(adjacent_keys('k'), Some("olmji"));
        assert_eq!(adjacent_keys('p'), Some("lo0"));
    }

    #[test]
    fn glyph_lookup() {
        assert_eq!(glyphs('d'), &["b", "cl"]);
        assert_eq!(glyphs('o'), &["0"]);
        assert!(glyphs('x').is_empty());
    }
}
