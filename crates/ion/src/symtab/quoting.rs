//! Text-emission quoting rules: when a symbol's text must be written as a
//! quoted symbol (`'like this'`) rather than bare.
//!
//! Upstream reference: `ion_symbol_table.c`'s identifier-vs-operator
//! classification, generalized per spec.md §4.8.

const KEYWORDS: [&str; 6] = ["null", "true", "false", "nan", "+inf", "-inf"];

fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_ascii_alphabetic()
}

fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

fn is_plain_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => {}
        _ => return false,
    }
    chars.all(is_identifier_continue)
}

/// Does this symbol's text need `'single quotes'` when written as Ion text?
///
/// Empty text, any keyword collision, a reserved symbol-identifier token
/// (`$10`, ...), and any character outside `[A-Za-z0-9_$]` all require
/// quoting (spec.md §4.8).
pub fn symbol_needs_quotes(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    if KEYWORDS.contains(&text) {
        return true;
    }
    if super::lookup::parse_symbol_identifier(text).is_some() {
        return true;
    }
    !is_plain_identifier(text)
}

/// Renders `text` as it would appear in Ion text syntax: bare if
/// [`symbol_needs_quotes`] says so is unnecessary, otherwise single-quoted
/// with `'` and `\` escaped.
pub fn format_symbol_text(text: &str) -> String {
    if !symbol_needs_quotes(text) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_are_unquoted() {
        assert!(!symbol_needs_quotes("name"));
        assert!(!symbol_needs_quotes("$ion_symbol_table"));
        assert!(!symbol_needs_quotes("_private"));
        assert!(!symbol_needs_quotes("abc123"));
    }

    #[test]
    fn operator_symbols_need_quotes() {
        assert!(symbol_needs_quotes("+"));
        assert!(symbol_needs_quotes("::"));
    }

    #[test]
    fn keywords_and_empty_need_quotes() {
        assert!(symbol_needs_quotes(""));
        assert!(symbol_needs_quotes("null"));
        assert!(symbol_needs_quotes("true"));
    }

    #[test]
    fn symbol_identifier_syntax_needs_quotes_but_lookalikes_dont() {
        assert!(symbol_needs_quotes("$10"));
        assert!(symbol_needs_quotes("$0"));
        assert!(!symbol_needs_quotes("$foo"));
    }

    #[test]
    fn mixed_or_whitespace_text_needs_quotes() {
        assert!(symbol_needs_quotes("hello world"));
        assert!(symbol_needs_quotes("1abc"));
        assert!(symbol_needs_quotes("a+b"));
    }
}
