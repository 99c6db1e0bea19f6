// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Cleans raw cell text before tokenisation.
//
// Spreadsheet exports routinely carry non-breaking spaces,
// zero-width spaces, stray control characters and runs of
// blanks from the editing tool. Left alone, the tokenizer
// treats them as distinct tokens and wastes vocabulary slots.
//
// Cleaning steps, in order:
//   1. Map Unicode whitespace variants and control chars to ' '
//   2. Collapse runs of spaces into one
//   3. Trim leading/trailing whitespace

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean one cell of text for downstream tokenisation.
    pub fn clean(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last_space = true; // also swallows leading spaces

        for c in text.chars() {
            let c = match c {
                '\t' | '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            };

            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        // A trailing run of spaces leaves exactly one — drop it
        if out.ends_with(' ') {
            out.pop();
        }
        out
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello   world"), "hello world");
    }

    #[test]
    fn trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  hello world  "), "hello world");
    }

    #[test]
    fn replaces_control_chars() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello\x01world"), "hello world");
    }

    #[test]
    fn normalises_unicode_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello\u{00A0}\u{200B}world"), "hello world");
    }

    #[test]
    fn newlines_become_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("line1\r\nline2"), "line1 line2");
    }

    #[test]
    fn empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
    }
}
