//! The scalar formatter: decodes an [`Atom`]'s raw bytes into the logical
//! scalar value, per style (spec §4.4).
//!
//! Contract between the scanner and this module: a quoted atom's raw span
//! includes its opening and closing quote character (stripped here before
//! decoding), and a literal/folded atom's raw span holds the content lines
//! joined by `'\n'` *including* each line's leading block-indentation
//! columns — this module strips exactly `atom.block_indent` columns from
//! each line before folding/chomping. This lets `measure`/`format` share one
//! length-first-write-second pass per style, as spec §4.4 requires.

use crate::atom::{Atom, AtomStyle, Chomp};

/// Decode the atom into its logical scalar text.
pub fn format(atom: &Atom) -> String {
    let mut out = String::with_capacity(measure(atom));
    let raw = atom.raw();
    match atom.style {
        AtomStyle::Literal => format_block(&raw, atom.chomp, false, atom.block_indent.unwrap_or(0) as usize, &mut out),
        AtomStyle::Folded => format_block(&raw, atom.chomp, true, atom.block_indent.unwrap_or(0) as usize, &mut out),
        AtomStyle::Plain => format_plain(&raw, &mut out),
        AtomStyle::SingleQuoted => format_single_quoted(&raw, &mut out),
        AtomStyle::DoubleQuoted => format_double_quoted(&raw, &mut out),
        AtomStyle::Uri => format_uri(&raw, &mut out),
        AtomStyle::Comment => format_comment(&raw, &mut out),
    }
    out
}

/// An upper bound on the decoded length; callers size output buffers with
/// this before calling [`format`], per spec §4.4's length-first/write-second
/// pattern. Decoded text is never longer than the raw span.
pub fn measure(atom: &Atom) -> usize {
    atom.storage_hint()
}

fn format_block(raw: &str, chomp: Chomp, folded: bool, indent: usize, out: &mut String) {
    if raw.is_empty() {
        return;
    }
    let dedented = dedent_lines(raw, indent);
    let trailing_breaks = dedented.chars().rev().take_while(|&c| c == '\n').count();
    let trimmed_raw = &dedented[..dedented.len() - trailing_breaks];
    let lines: Vec<&str> = trimmed_raw.split('\n').collect();
    let had_content = lines.iter().any(|l| !l.is_empty());

    if folded {
        // Blank lines in `lines` are empty elements produced by a run of
        // consecutive breaks; they never carry a fold decision themselves,
        // only the count of breaks the *next* content line folds against.
        let mut prev_was_more_indented = false;
        let mut pending_breaks = 0usize;
        let mut first_content = true;
        for line in lines.iter() {
            if line.is_empty() {
                pending_breaks += 1;
                continue;
            }
            let more_indented = line.starts_with(' ') || line.starts_with('\t');
            if !first_content {
                if more_indented || prev_was_more_indented {
                    // A break touching an indented line is never folded.
                    for _ in 0..pending_breaks {
                        out.push('\n');
                    }
                } else if pending_breaks == 1 {
                    out.push(' ');
                } else {
                    for _ in 0..pending_breaks.saturating_sub(1) {
                        out.push('\n');
                    }
                }
            }
            out.push_str(line);
            prev_was_more_indented = more_indented;
            pending_breaks = 1;
            first_content = false;
        }
    } else {
        out.push_str(&lines.join("\n"));
    }

    apply_chomp(out, chomp, had_content, trailing_breaks);
}

/// Strip up to `cols` leading block-indentation columns from each line of a
/// literal/folded atom's raw text (scanner.rs `fetch_block_scalar` captures
/// them as part of the raw span). A blank line may carry fewer than `cols`
/// columns of whitespace; strip whatever's there and stop at the first
/// non-blank character either way.
fn dedent_lines(raw: &str, cols: usize) -> String {
    if cols == 0 {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    for (i, line) in raw.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(strip_leading_blanks(line, cols));
    }
    out
}

fn strip_leading_blanks(line: &str, cols: usize) -> &str {
    let mut skip = 0;
    let mut seen = 0;
    for b in line.bytes() {
        if seen >= cols {
            break;
        }
        if b == b' ' || b == b'\t' {
            skip += 1;
            seen += 1;
        } else {
            break;
        }
    }
    &line[skip..]
}

fn apply_chomp(out: &mut String, chomp: Chomp, had_content: bool, trailing_breaks: usize) {
    match chomp {
        Chomp::Strip => {}
        Chomp::Clip => {
            if had_content {
                out.push('\n');
            }
        }
        Chomp::Keep => {
            for _ in 0..trailing_breaks {
                out.push('\n');
            }
        }
    }
}

fn collapse_breaks(text: &str, out: &mut String) {
    // As in `format_block`'s folded branch: blank lines only accumulate
    // pending break count, the fold decision is made once per content line.
    let mut pending = 0usize;
    let mut first = true;
    for line in text.split('\n') {
        if line.is_empty() {
            pending += 1;
            continue;
        }
        if !first {
            if pending == 1 {
                out.push(' ');
            } else {
                for _ in 0..pending.saturating_sub(1) {
                    out.push('\n');
                }
            }
        }
        out.push_str(line);
        first = false;
        pending = 1;
    }
}

fn format_plain(raw: &str, out: &mut String) {
    let trimmed = raw.trim();
    collapse_breaks(trimmed, out);
}

/// Strip the opening and closing quote characters a quoted atom's span
/// includes (spec §4.2: "the atom spans the opening and closing quote").
fn strip_quotes(raw: &str) -> &str {
    let inner_start = raw.chars().next().map(char::len_utf8).unwrap_or(0);
    let inner_end = raw.len() - raw.chars().next_back().map(char::len_utf8).unwrap_or(0);
    if inner_start <= inner_end {
        &raw[inner_start..inner_end]
    } else {
        ""
    }
}

fn format_single_quoted(raw: &str, out: &mut String) {
    let raw = strip_quotes(raw);
    let mut buf = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.peek() == Some(&'\'') {
            chars.next();
            buf.push('\'');
        } else {
            buf.push(c);
        }
    }
    collapse_breaks(&buf, out);
}

fn format_double_quoted(raw: &str, out: &mut String) {
    let raw = strip_quotes(raw);
    // Join line continuations (`\` immediately before a line break) first,
    // then fold remaining breaks, decoding escapes along the way.
    let mut chars = raw.chars().peekable();
    let mut folded_input = String::with_capacity(raw.len());
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'\n') {
            chars.next();
            // Line continuation: swallow the break and any leading
            // whitespace on the next line.
            while matches!(chars.peek(), Some(' ') | Some('\t')) {
                chars.next();
            }
            continue;
        }
        folded_input.push(c);
    }

    let mut pending_breaks = 0usize;
    let mut decoded = String::with_capacity(folded_input.len());
    let mut it = folded_input.chars().peekable();
    loop {
        match it.peek() {
            None => break,
            Some('\n') => {
                it.next();
                pending_breaks += 1;
                continue;
            }
            _ => {}
        }
        if pending_breaks > 0 {
            if pending_breaks == 1 {
                decoded.push(' ');
            } else {
                for _ in 0..pending_breaks - 1 {
                    decoded.push('\n');
                }
            }
            pending_breaks = 0;
        }
        let c = it.next().unwrap();
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match it.next() {
            Some('0') => decoded.push('\0'),
            Some('a') => decoded.push('\u{7}'),
            Some('b') => decoded.push('\u{8}'),
            Some('t') | Some('\u{9}') => decoded.push('\t'),
            Some('n') => decoded.push('\n'),
            Some('v') => decoded.push('\u{B}'),
            Some('f') => decoded.push('\u{C}'),
            Some('r') => decoded.push('\r'),
            Some('e') => decoded.push('\u{1B}'),
            Some(' ') => decoded.push(' '),
            Some('"') => decoded.push('"'),
            Some('\'') => decoded.push('\''),
            Some('\\') => decoded.push('\\'),
            Some('/') => decoded.push('/'),
            Some('N') => decoded.push('\u{85}'),
            Some('_') => decoded.push('\u{A0}'),
            Some('L') => decoded.push('\u{2028}'),
            Some('P') => decoded.push('\u{2029}'),
            Some('x') => push_hex_escape(&mut it, 2, &mut decoded),
            Some('u') => push_hex_escape(&mut it, 4, &mut decoded),
            Some('U') => push_hex_escape(&mut it, 8, &mut decoded),
            Some(other) => decoded.push(other),
            None => {}
        }
    }
    out.push_str(&decoded);
}

fn push_hex_escape(it: &mut std::iter::Peekable<std::str::Chars>, digits: usize, out: &mut String) {
    let mut value: u32 = 0;
    for _ in 0..digits {
        if let Some(d) = it.next().and_then(|c| c.to_digit(16)) {
            value = value * 16 + d;
        } else {
            break;
        }
    }
    if let Some(c) = char::from_u32(value) {
        out.push(c);
    }
}

fn format_uri(raw: &str, out: &mut String) {
    let bytes = raw.as_bytes();
    let mut decoded_bytes = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                decoded_bytes.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        decoded_bytes.push(bytes[i]);
        i += 1;
    }
    out.push_str(&String::from_utf8_lossy(&decoded_bytes));
}

fn format_comment(raw: &str, out: &mut String) {
    out.push_str(raw.trim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Mark;
    use crate::input::Input;

    fn atom(raw: &str, style: AtomStyle, chomp: Chomp) -> Atom {
        let input = Input::from_str("t", raw);
        let end = Mark {
            index: raw.len() as u64,
            line: 0,
            column: 0,
        };
        Atom::new(input, Mark::default(), end, style).with_chomp(chomp)
    }

    #[test]
    fn literal_clip_adds_single_newline() {
        let a = atom("one\ntwo", AtomStyle::Literal, Chomp::Clip);
        assert_eq!(format(&a), "one\ntwo\n");
    }

    #[test]
    fn literal_strip_drops_trailing_newlines() {
        let a = atom("one\ntwo", AtomStyle::Literal, Chomp::Strip);
        assert_eq!(format(&a), "one\ntwo");
    }

    #[test]
    fn folded_collapses_single_break_to_space() {
        let a = atom("one\ntwo", AtomStyle::Folded, Chomp::Clip);
        assert_eq!(format(&a), "one two\n");
    }

    #[test]
    fn double_quoted_decodes_unicode_escape() {
        let a = atom("\"line1\\nline2é\"", AtomStyle::DoubleQuoted, Chomp::Clip);
        assert_eq!(format(&a), "line1\nline2\u{e9}");
    }

    #[test]
    fn single_quoted_unescapes_doubled_quote() {
        let a = atom("'it''s'", AtomStyle::SingleQuoted, Chomp::Clip);
        assert_eq!(format(&a), "it's");
    }

    #[test]
    fn plain_trims_and_folds() {
        let a = atom("  hello\nworld  ", AtomStyle::Plain, Chomp::Clip);
        assert_eq!(format(&a), "hello world");
    }

    #[test]
    fn uri_decodes_percent_escapes() {
        let a = atom("a%20b", AtomStyle::Uri, Chomp::Clip);
        assert_eq!(format(&a), "a b");
    }
}
