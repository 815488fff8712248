//! Numeric annotation glyphs.
//!
//! The glyph table is fixed, process-wide and exactly reversible: every
//! symbolic glyph maps to one code and back. Codes outside the table are
//! still valid NAGs; they just have no symbolic form and are written as
//! `$n`.

/// Symbolic glyphs and their codes; two-character glyphs come first so
/// that suffix matching is longest-first.
const GLYPHS: [(&str, u8); 6] = [
    ("!!", 1),
    ("??", 4),
    ("!?", 5),
    ("?!", 6),
    ("!", 3),
    ("?", 2),
];

/// The NAG code for a symbolic glyph, if the glyph is known
pub fn from_glyph(glyph: &str) -> Option<u8> {
    GLYPHS
        .iter()
        .find(|(g, _)| *g == glyph)
        .map(|&(_, code)| code)
}

/// The symbolic glyph for a NAG code, if one exists
pub fn glyph(nag: u8) -> Option<&'static str> {
    GLYPHS.iter().find(|&&(_, code)| code == nag).map(|&(g, _)| g)
}

/// Splits a trailing glyph off a move token (`"Nf3!?"` → `("Nf3", Some(5))`)
pub(crate) fn split_trailing_glyph(s: &str) -> (&str, Option<u8>) {
    for (glyph, code) in GLYPHS {
        if let Some(rest) = s.strip_suffix(glyph) {
            return (rest, Some(code));
        }
    }
    (s, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_reversible() {
        for (glyph_str, code) in GLYPHS {
            assert_eq!(from_glyph(glyph_str), Some(code));
            assert_eq!(glyph(code), Some(glyph_str));
        }
        assert_eq!(from_glyph("!!!"), None);
        assert_eq!(glyph(22), None);
    }

    #[test]
    fn test_split() {
        assert_eq!(split_trailing_glyph("Nf3!?"), ("Nf3", Some(5)));
        assert_eq!(split_trailing_glyph("e4!"), ("e4", Some(3)));
        assert_eq!(split_trailing_glyph("e4!!"), ("e4", Some(1)));
        assert_eq!(split_trailing_glyph("Qxf7??"), ("Qxf7", Some(4)));
        assert_eq!(split_trailing_glyph("O-O"), ("O-O", None));
    }
}
