//! Shell-style splitting of an invocation line into tokens.

use thiserror::Error;

/// Errors raised while splitting a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// A quote was opened and never closed.
    #[error("unterminated {quote} quote starting at byte {offset}")]
    UnterminatedQuote { quote: char, offset: usize },
    /// The line ends with a lone backslash.
    #[error("line ends with an unfinished escape")]
    DanglingEscape,
}

/// Splits `line` on whitespace, honouring quotes and escapes.
///
/// - `'...'` is taken literally;
/// - `"..."` allows `\"` and `\\` escapes, any other backslash is kept;
/// - outside quotes a backslash escapes the next character;
/// - adjacent quoted and bare parts join into one token, and `''` yields an
///   empty token.
pub fn tokenize(line: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some((_, '\'')) => break,
                        Some((_, c)) => current.push(c),
                        None => return Err(TokenizeError::UnterminatedQuote { quote: '\'', offset }),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => match chars.peek() {
                            Some(&(_, next @ ('"' | '\\'))) => {
                                current.push(next);
                                chars.next();
                            }
                            _ => current.push('\\'),
                        },
                        Some((_, c)) => current.push(c),
                        None => return Err(TokenizeError::UnterminatedQuote { quote: '"', offset }),
                    }
                }
            }
            '\\' => match chars.next() {
                Some((_, c)) => {
                    in_token = true;
                    current.push(c);
                }
                None => return Err(TokenizeError::DanglingEscape),
            },
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Vec<String> {
        tokenize(line).unwrap()
    }

    #[test]
    fn test_whitespace_separation() {
        assert_eq!(split("  SET  foo\tbar "), vec!["SET", "foo", "bar"]);
        assert!(split("   ").is_empty());
    }

    #[test]
    fn test_single_quotes_are_literal() {
        assert_eq!(split(r#"SET k 'a "b" \n'"#), vec!["SET", "k", r#"a "b" \n"#]);
    }

    #[test]
    fn test_double_quote_escapes() {
        assert_eq!(
            split(r#"SET k "say \"hi\" \\ \d""#),
            vec!["SET", "k", r#"say "hi" \ \d"#]
        );
    }

    #[test]
    fn test_backslash_outside_quotes() {
        assert_eq!(split(r"SET my\ key \'v"), vec!["SET", "my key", "'v"]);
    }

    #[test]
    fn test_adjacent_parts_join_and_empty_quotes() {
        assert_eq!(split(r#"a'b c'"d" '' x"#), vec!["ab cd", "", "x"]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(
            tokenize("SET k \"open"),
            Err(TokenizeError::UnterminatedQuote { quote: '"', offset: 6 })
        );
        assert_eq!(
            tokenize("'x"),
            Err(TokenizeError::UnterminatedQuote { quote: '\'', offset: 0 })
        );
    }

    #[test]
    fn test_dangling_escape() {
        assert_eq!(tokenize("GET k\\"), Err(TokenizeError::DanglingEscape));
    }
}
