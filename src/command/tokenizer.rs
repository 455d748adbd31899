//! Shell-like command splitting.
//!
//! Unquoted whitespace separates tokens. Single quotes keep everything literal,
//! double quotes honor `\"`, `\\`, `\$` and `` \` `` escapes, and an unquoted
//! backslash escapes the next character (whitespace included). A backslash-newline
//! pair is a line continuation everywhere outside single quotes and is removed.
//! Quotes are stripped.

use crate::error::TokenizeError;

pub fn tokenize(command: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = command.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, '\n')) => {}
                Some((_, escaped)) => {
                    current.push(escaped);
                    in_token = true;
                }
                None => return Err(TokenizeError::TrailingEscape),
            },
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some((_, '\'')) => break,
                        Some((_, ch)) => current.push(ch),
                        None => {
                            return Err(TokenizeError::UnterminatedQuote {
                                quote: '\'',
                                position,
                            })
                        }
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => match chars.peek() {
                            Some(&(_, escaped)) if matches!(escaped, '"' | '\\' | '$' | '`') => {
                                current.push(escaped);
                                chars.next();
                            }
                            Some(&(_, '\n')) => {
                                chars.next();
                            }
                            Some(_) => current.push('\\'),
                            None => {
                                return Err(TokenizeError::UnterminatedQuote {
                                    quote: '"',
                                    position,
                                })
                            }
                        },
                        Some((_, ch)) => current.push(ch),
                        None => {
                            return Err(TokenizeError::UnterminatedQuote {
                                quote: '"',
                                position,
                            })
                        }
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            other => {
                current.push(other);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
