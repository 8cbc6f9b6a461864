//! Standard-14 font metrics, WinAnsi encoding and line wrapping
//!
//! Reports only use the built-in Type1 fonts, so text widths come from the
//! Adobe AFM tables instead of embedded font programs.

/// Points per millimetre
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Built-in fonts referenced by report pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    ZapfDingbats,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Helvetica, Font::HelveticaBold, Font::ZapfDingbats];

    /// Name used in page `/Resources /Font`
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
            Font::ZapfDingbats => "F3",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Symbol fonts keep their built-in encoding
    pub fn uses_win_ansi(&self) -> bool {
        !matches!(self, Font::ZapfDingbats)
    }

    /// Advance width of one encoded byte in 1/1000 em
    pub fn glyph_width(&self, byte: u8) -> u16 {
        let table = match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
            // Only the filled circle is drawn with this font
            Font::ZapfDingbats => return 791,
        };
        match byte {
            0x20..=0x7E => table[(byte - 0x20) as usize],
            0xDF => 611,
            _ => match fold_latin1(byte) {
                Some(base) => table[(base - 0x20) as usize],
                None => 556,
            },
        }
    }
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Accented Latin-1 letters share the width of their base letter
fn fold_latin1(byte: u8) -> Option<u8> {
    let base = match byte {
        0xC0..=0xC5 => b'A',
        0xC7 => b'C',
        0xC8..=0xCB => b'E',
        0xCC..=0xCF => b'I',
        0xD1 => b'N',
        0xD2..=0xD6 | 0xD8 => b'O',
        0xD9..=0xDC => b'U',
        0xDD => b'Y',
        0xE0..=0xE5 => b'a',
        0xE7 => b'c',
        0xE8..=0xEB => b'e',
        0xEC..=0xEF => b'i',
        0xF1 => b'n',
        0xF2..=0xF6 | 0xF8 => b'o',
        0xF9..=0xFC => b'u',
        0xFD | 0xFF => b'y',
        _ => return None,
    };
    Some(base)
}

/// Characters WinAnsi places in 0x80..=0x9F
const WIN_ANSI_EXTRAS: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Encode text for a WinAnsi font; unmappable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\t' => b' ',
            _ => WIN_ANSI_EXTRAS
                .iter()
                .find(|(ch, _)| *ch == c)
                .map(|(_, byte)| *byte)
                .unwrap_or(b'?'),
        })
        .collect()
}

pub fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => WIN_ANSI_EXTRAS
                .iter()
                .find(|(_, byte)| *byte == b)
                .map(|(ch, _)| *ch)
                .unwrap_or('?'),
            _ => b as char,
        })
        .collect()
}

/// Width of `text` in millimetres at `size` points
pub fn string_width(font: Font, size: f64, text: &str) -> f64 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|b| font.glyph_width(b) as u32)
        .sum();
    units as f64 * size / 1000.0 / PT_PER_MM
}

/// Break `text` into lines no wider than `max_width` millimetres
///
/// Embedded newlines are hard breaks and blank lines are kept. Words longer
/// than a full line are split between characters.
pub fn wrap_text(font: Font, size: f64, max_width: f64, text: &str) -> Vec<String> {
    let fits = |s: &str| string_width(font, size, s) <= max_width;
    let mut lines = Vec::new();

    for hard_line in text.split('\n') {
        let hard_line = hard_line.trim_end_matches('\r');
        let mut current = String::new();

        for word in hard_line.split(' ').filter(|w| !w.is_empty()) {
            if current.is_empty() {
                if fits(word) {
                    current.push_str(word);
                    continue;
                }
            } else {
                let candidate = format!("{} {}", current, word);
                if fits(&candidate) {
                    current = candidate;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
                if fits(word) {
                    current.push_str(word);
                    continue;
                }
            }

            for ch in word.chars() {
                current.push(ch);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }

        lines.push(current);
    }

    lines
}

/// Shorten `text` with a trailing `...` until it fits `max_width`
pub fn truncate_to_width(font: Font, size: f64, max_width: f64, text: &str) -> String {
    if string_width(font, size, text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}...", chars.iter().collect::<String>().trim_end());
        if string_width(font, size, &candidate) <= max_width {
            return candidate;
        }
    }
    String::new()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: wrapped lines never exceed the width unless a single
        /// character is already too wide
        #[test]
        fn wrapped_lines_fit(text in "[a-zA-Z0-9 .,\n]{0,400}", width in 20.0f64..190.0) {
            for line in wrap_text(Font::Helvetica, 11.0, width, &text) {
                prop_assert!(string_width(Font::Helvetica, 11.0, &line) <= width);
            }
        }

        /// Property: wrapping yields at least one line per hard line
        #[test]
        fn hard_breaks_preserved(parts in prop::collection::vec("[a-z ]{0,30}", 1..8)) {
            let text = parts.join("\n");
            let lines = wrap_text(Font::Helvetica, 11.0, 190.0, &text);
            prop_assert!(lines.len() >= parts.len());
        }

        /// Property: encoding never changes the character count
        #[test]
        fn encoding_is_one_byte_per_char(text in "\\PC{0,64}") {
            prop_assert_eq!(encode_win_ansi(&text).len(), text.chars().count());
        }
    }
}
