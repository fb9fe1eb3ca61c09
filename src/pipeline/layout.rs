//! Page geometry, font metrics and line wrapping for the generated PDF.
//!
//! The document uses the standard Helvetica font with WinAnsi encoding, so no
//! font file is embedded. Widths below are the Adobe AFM advance widths in
//! 1/1000 em; they drive word wrapping exactly as a PDF viewer will draw the
//! glyphs.

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;

const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // 'a'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

/// Encode one character as a WinAnsi byte together with its Helvetica width.
///
/// Returns `None` for characters the standard font cannot draw.
pub fn winansi(ch: char) -> Option<(u8, u16)> {
    let code = ch as u32;
    match code {
        0x20..=0x7E => Some((code as u8, HELVETICA_ASCII[(code - 0x20) as usize])),
        0xA0..=0xFF => Some((code as u8, HELVETICA_LATIN1[(code - 0xA0) as usize])),
        _ => {
            let mapped = match ch {
                '€' => (0x80, 556),
                '‚' => (0x82, 222),
                'ƒ' => (0x83, 556),
                '„' => (0x84, 333),
                '…' => (0x85, 1000),
                '†' => (0x86, 556),
                '‡' => (0x87, 556),
                'ˆ' => (0x88, 333),
                '‰' => (0x89, 1000),
                'Š' => (0x8A, 667),
                '‹' => (0x8B, 333),
                'Œ' => (0x8C, 1000),
                'Ž' => (0x8E, 611),
                '‘' => (0x91, 222),
                '’' => (0x92, 222),
                '“' => (0x93, 333),
                '”' => (0x94, 333),
                '•' => (0x95, 350),
                '–' => (0x96, 556),
                '—' => (0x97, 1000),
                '˜' => (0x98, 333),
                '™' => (0x99, 1000),
                'š' => (0x9A, 500),
                '›' => (0x9B, 333),
                'œ' => (0x9C, 944),
                'ž' => (0x9E, 500),
                'Ÿ' => (0x9F, 667),
                _ => return None,
            };
            Some(mapped)
        }
    }
}

/// Advance width of `ch` in points at `font_size`.
fn char_width(ch: char, font_size: f32) -> f32 {
    let units = winansi(ch).map(|(_, w)| w).unwrap_or(556);
    units as f32 * font_size / 1000.0
}

/// Width of a string in points at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(|c| char_width(c, font_size)).sum()
}

/// Geometry of a generated page. All lengths in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    /// Distance from the bottom edge that triggers a page break.
    pub break_margin: f32,
    /// Horizontal padding inside the text cell.
    pub cell_padding: f32,
    pub line_height: f32,
    pub font_size: f32,
}

impl Default for PageLayout {
    /// A4 portrait, Helvetica 12 pt, 10 mm margins, 10 mm lines, 15 mm break margin.
    fn default() -> Self {
        Self {
            page_width: 210.0 * MM,
            page_height: 297.0 * MM,
            margin_left: 10.0 * MM,
            margin_right: 10.0 * MM,
            margin_top: 10.0 * MM,
            break_margin: 15.0 * MM,
            cell_padding: 1.0 * MM,
            line_height: 10.0 * MM,
            font_size: 12.0,
        }
    }
}

impl PageLayout {
    /// Usable line width inside margins and cell padding.
    pub fn text_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right - 2.0 * self.cell_padding
    }

    /// How many lines fit before the break margin (at least one).
    pub fn lines_per_page(&self) -> usize {
        let usable = self.page_height - self.break_margin - self.margin_top;
        // Small epsilon so an exact fit is not lost to float rounding.
        (((usable + 0.01) / self.line_height).floor() as usize).max(1)
    }

    /// X of every line's left edge.
    pub fn text_x(&self) -> f32 {
        self.margin_left + self.cell_padding
    }

    /// Baseline Y (PDF coordinates, origin bottom-left) of the `row`-th line
    /// on a page; the text sits vertically centred in its line cell.
    pub fn baseline_y(&self, row: usize) -> f32 {
        let cell_top = self.margin_top + row as f32 * self.line_height;
        self.page_height - (cell_top + self.line_height / 2.0 + 0.3 * self.font_size)
    }

    /// Wrap `text` to the line width and split the lines into pages.
    ///
    /// Empty input still yields one (blank) page.
    pub fn paginate(&self, text: &str) -> Vec<Vec<String>> {
        let lines = wrap_text(text, self.text_width(), self.font_size);
        let per_page = self.lines_per_page();
        let mut pages: Vec<Vec<String>> = lines
            .chunks(per_page)
            .map(|chunk| chunk.to_vec())
            .collect();
        if pages.is_empty() {
            pages.push(Vec::new());
        }
        pages
    }
}

/// Wrap text into lines no wider than `max_width` points.
///
/// Explicit newlines always break; each paragraph is wrapped on its own.
pub fn wrap_text(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .flat_map(|paragraph| wrap_paragraph(paragraph, max_width, font_size))
        .collect()
}

/// Greedy wrap of a single paragraph: break at the last space that fits, or
/// mid-word when a single word is wider than the line.
fn wrap_paragraph(paragraph: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<char> = Vec::new();
    let mut width = 0.0_f32;

    for ch in paragraph.chars() {
        let w = char_width(ch, font_size);
        if width + w > max_width && !current.is_empty() {
            if ch == ' ' {
                lines.push(finish_line(&current));
                current.clear();
                width = 0.0;
                continue;
            }
            match current.iter().rposition(|&c| c == ' ') {
                Some(sp) if sp > 0 => {
                    let rest = current.split_off(sp + 1);
                    current.pop();
                    lines.push(finish_line(&current));
                    current = rest;
                }
                _ => {
                    lines.push(finish_line(&current));
                    current.clear();
                }
            }
            width = current.iter().map(|&c| char_width(c, font_size)).sum();
        }
        current.push(ch);
        width += w;
    }

    lines.push(finish_line(&current));
    lines
}

fn finish_line(chars: &[char]) -> String {
    chars.iter().collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_layout_fits_27_lines() {
        let layout = PageLayout::default();
        assert_eq!(layout.lines_per_page(), 27);
        assert!((layout.text_width() - 532.9).abs() < 0.5);
    }

    #[test]
    fn baselines_descend_within_page() {
        let layout = PageLayout::default();
        let first = layout.baseline_y(0);
        let last = layout.baseline_y(layout.lines_per_page() - 1);
        assert!(first < layout.page_height - layout.margin_top);
        assert!(last > layout.break_margin);
        assert!(first > last);
    }

    #[test]
    fn helvetica_widths() {
        assert_eq!(winansi('A'), Some((b'A', 667)));
        assert_eq!(winansi(' '), Some((b' ', 278)));
        assert_eq!(winansi('é'), Some((0xE9, 556)));
        assert_eq!(winansi('’'), Some((0x92, 222)));
        assert_eq!(winansi('—'), Some((0x97, 1000)));
        assert_eq!(winansi('≤'), None);
        assert_eq!(winansi('\u{1F600}'), None);
        // "Hello" = 722 + 556 + 222 + 222 + 556 units
        assert!((text_width("Hello", 10.0) - 22.78).abs() < 0.001);
    }

    #[test]
    fn short_text_is_one_line() {
        assert_eq!(wrap_text("Question 1: 2 + 2 = ?", 500.0, 12.0), vec!["Question 1: 2 + 2 = ?"]);
    }

    #[test]
    fn wraps_at_spaces_within_width() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(10);
        let lines = wrap_text(text.trim_end(), 200.0, 12.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 12.0) <= 200.0, "too wide: {line:?}");
            assert!(!line.starts_with(' ') || line.trim().is_empty());
        }
        // No words lost or split.
        let rejoined = lines.join(" ");
        assert_eq!(
            rejoined.split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn long_word_is_split_by_character() {
        let word = "x".repeat(300);
        let lines = wrap_text(&word, 100.0, 12.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, 12.0) <= 100.0);
        }
    }

    #[test]
    fn newlines_force_breaks_and_blank_lines_survive() {
        let lines = wrap_text("Test 1\n\nQuestion 1: a\nQuestion 2: b", 500.0, 12.0);
        assert_eq!(lines, vec!["Test 1", "", "Question 1: a", "Question 2: b"]);
    }

    #[test]
    fn paginate_breaks_after_lines_per_page() {
        let layout = PageLayout::default();
        let text = (1..=60)
            .map(|i| format!("Line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let pages = layout.paginate(&text);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), 27);
        assert_eq!(pages[1].len(), 27);
        assert_eq!(pages[2].len(), 6);
        assert_eq!(pages[1][0], "Line 28");
    }

    #[test]
    fn paginate_empty_text_gives_one_blank_page() {
        let pages = PageLayout::default().paginate("");
        assert_eq!(pages, vec![Vec::<String>::new()]);
    }
}
