//! Helvetica metrics and WinAnsi encoding for the standard PDF fonts

/// Advance widths of Helvetica in 1/1000 em, indexed by WinAnsi code minus 32
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 224] = [
    // 0x20
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
    // 0x80
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    // 0xA0
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Characters of the 0x80-0x9F WinAnsi block
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('€', 0x80), ('‚', 0x82), ('ƒ', 0x83), ('„', 0x84), ('…', 0x85), ('†', 0x86),
    ('‡', 0x87), ('ˆ', 0x88), ('‰', 0x89), ('Š', 0x8A), ('‹', 0x8B), ('Œ', 0x8C),
    ('Ž', 0x8E), ('‘', 0x91), ('’', 0x92), ('“', 0x93), ('”', 0x94), ('•', 0x95),
    ('–', 0x96), ('—', 0x97), ('˜', 0x98), ('™', 0x99), ('š', 0x9A), ('›', 0x9B),
    ('œ', 0x9C), ('ž', 0x9E), ('Ÿ', 0x9F),
];

/// WinAnsi code for `ch`; tabs become spaces and unmapped characters `?`
pub fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        '\t' => b' ',
        ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, b)| *b)
            .unwrap_or(b'?'),
    }
}

/// Encode a string for a WinAnsi simple font
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn glyph_width(code: u8) -> u16 {
    match code {
        0..=31 => 0,
        _ => HELVETICA_WIDTHS[usize::from(code) - 32],
    }
}

/// Rendered width of `text` in points at `size` in Helvetica
pub fn helvetica_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|ch| u32::from(glyph_width(win_ansi_byte(ch))))
        .sum();
    units as f32 * size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths() {
        assert_eq!(helvetica_width("", 12.0), 0.0);
        // H=722 e=556 l=222 l=222 o=556
        assert!((helvetica_width("Hello", 10.0) - 22.78).abs() < 1e-3);
        assert!((helvetica_width("W", 1000.0) - 944.0).abs() < 1e-3);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Índice"), vec![0xCD, b'n', b'd', b'i', b'c', b'e']);
        assert_eq!(encode_win_ansi("“ok”"), vec![0x93, b'o', b'k', 0x94]);
        assert_eq!(encode_win_ansi("中\t"), vec![b'?', b' ']);
    }

    #[test]
    fn test_unmapped_measured_as_question_mark() {
        assert_eq!(helvetica_width("日本", 12.0), helvetica_width("??", 12.0));
    }
}
