use std::fmt;

/// A parsed piece of a display template.
///
/// Templates interleave literal text with `{...}` tokens:
/// - `{dot.path}` — a data lookup token.
/// - `{#}` — the 1-based row index (repeater row labels only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, emitted verbatim.
    Literal(String),
    /// A data lookup by dot-path.
    Token(String),
    /// The row-index marker `{#}`.
    RowIndex,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(s) => write!(f, "{s}"),
            Segment::Token(path) => write!(f, "{{{path}}}"),
            Segment::RowIndex => write!(f, "{{#}}"),
        }
    }
}

/// Scan a template string into segments.
///
/// Unterminated braces and empty tokens are kept as literal text rather
/// than reported as errors; a template can never fail to parse.
pub fn parse_template(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch != '{' {
            literal.push(ch);
            continue;
        }

        // Find the matching close brace.
        let rest = &template[start + 1..];
        match rest.find(['{', '}']) {
            Some(pos) if rest.as_bytes()[pos] == b'}' => {
                let inner = rest[..pos].trim();
                if inner.is_empty() {
                    literal.push_str(&template[start..start + pos + 2]);
                } else {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    if inner == "#" {
                        segments.push(Segment::RowIndex);
                    } else {
                        segments.push(Segment::Token(inner.to_string()));
                    }
                }
                // Skip past the consumed token body and close brace.
                while let Some((i, _)) = chars.peek() {
                    if *i <= start + pos + 1 {
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literal_only() {
        assert_eq!(
            parse_template("hello"),
            vec![Segment::Literal("hello".into())]
        );
    }

    #[test]
    fn parse_single_token() {
        assert_eq!(
            parse_template("{name.first}"),
            vec![Segment::Token("name.first".into())]
        );
    }

    #[test]
    fn parse_mixed() {
        assert_eq!(
            parse_template("{name.first} {name.last} — staff"),
            vec![
                Segment::Token("name.first".into()),
                Segment::Literal(" ".into()),
                Segment::Token("name.last".into()),
                Segment::Literal(" — staff".into()),
            ]
        );
    }

    #[test]
    fn parse_row_index_marker() {
        assert_eq!(
            parse_template("Row {#}: {label}"),
            vec![
                Segment::Literal("Row ".into()),
                Segment::RowIndex,
                Segment::Literal(": ".into()),
                Segment::Token("label".into()),
            ]
        );
    }

    #[test]
    fn unterminated_brace_stays_literal() {
        assert_eq!(
            parse_template("oops {name"),
            vec![Segment::Literal("oops {name".into())]
        );
    }

    #[test]
    fn empty_token_stays_literal() {
        assert_eq!(parse_template("{}"), vec![Segment::Literal("{}".into())]);
    }

    #[test]
    fn token_whitespace_is_trimmed() {
        assert_eq!(
            parse_template("{ name.first }"),
            vec![Segment::Token("name.first".into())]
        );
    }
}
