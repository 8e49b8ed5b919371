// BurstScan - core/tokenizer.rs
//
// Quote- and bracket-aware field splitter for access-log lines.
// Core layer: pure logic, borrows from the input line, never allocates
// token text.

/// Split one raw log line into positional fields.
///
/// Each field is classified by its first character:
/// - `"` opens a quoted field that runs to the next `"`;
/// - `[` opens a bracketed field that runs to the next `]`;
/// - anything else is a bare field that runs to the next space.
///
/// The quote or bracket characters are stripped from the returned token.
/// After a quoted or bracketed field the single separating space is consumed
/// together with the closing character, so the next field starts cleanly.
///
/// When the closing character is missing, the whole remaining text
/// (opening character included) becomes the last token and scanning stops.
/// An empty line yields no tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = line;

    while let Some(first) = rest.chars().next() {
        let (body_start, closing) = match first {
            '"' => (1, '"'),
            '[' => (1, ']'),
            _ => (0, ' '),
        };

        // Quoted and bracketed bodies start after the opener, which must not
        // be mistaken for its own closing character.
        let Some(offset) = rest[body_start..].find(closing) else {
            tokens.push(rest);
            break;
        };
        let end = body_start + offset;
        tokens.push(&rest[body_start..end]);

        // All delimiters are ASCII, so `end + 1` is a char boundary.
        let mut next = end + 1;
        if body_start == 1 && rest[next..].starts_with(' ') {
            next += 1;
        }
        rest = &rest[next..];
    }

    tokens
}
