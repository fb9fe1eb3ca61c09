//! Text preparation: deterministic cleanup of generated text before layout.
//!
//! Models emit Windows line endings, tabs, zero-width characters and Unicode
//! look-alikes of plain punctuation. None of these affect meaning, but several
//! of them have no glyph in the WinAnsi-encoded standard font and would make
//! rendering fail. Each rule is a pure `&str → String` pass.
//!
//! The generated text itself is never altered elsewhere; these rules run only
//! on the copy handed to the renderer.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all preparation rules in order:
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Expand tabs to four spaces
/// 3. Replace Unicode space and hyphen variants with ASCII
/// 4. Strip invisible and control characters
/// 5. Trim trailing whitespace per line
/// 6. Collapse 3+ consecutive blank lines down to 2
/// 7. Trim leading and trailing blank lines
pub fn prepare_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = expand_tabs(&s);
    let s = replace_lookalikes(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim_matches('\n').to_string()
}

// ── Rule 1 ───────────────────────────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2 ───────────────────────────────────────────────────────────────────

fn expand_tabs(input: &str) -> String {
    input.replace('\t', "    ")
}

// ── Rule 3 ───────────────────────────────────────────────────────────────────

fn replace_lookalikes(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            // Spaces: en/em/thin/figure/narrow no-break etc.
            '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => ' ',
            // Hyphens and minus
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2212}' => '-',
            // Prime marks often used as quotes
            '\u{2032}' => '\'',
            '\u{2033}' => '"',
            other => other,
        })
        .collect()
}

// ── Rule 4 ───────────────────────────────────────────────────────────────────

/// Zero-width characters, BOM, soft hyphen and C0/C1 controls other than LF.
fn remove_invisible_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| {
            !matches!(
                c,
                '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'
            ) && (c == '\n' || !c.is_control())
        })
        .collect()
}

// ── Rule 5 ───────────────────────────────────────────────────────────────────

static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").expect("valid regex"));

fn trim_trailing_whitespace(input: &str) -> String {
    TRAILING_WS.replace_all(input, "").into_owned()
}

// ── Rule 6 ───────────────────────────────────────────────────────────────────

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").expect("valid regex"));

fn collapse_blank_lines(input: &str) -> String {
    BLANK_RUN.replace_all(input, "\n\n\n").into_owned()
}
