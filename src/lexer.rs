// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for Rockstar source lines.
// Splits a single line of lyrics into word, comma and string tokens.
//
// Supports:
// - Words separated by whitespace
// - Commas, emitted as standalone "," tokens
// - String literals in double quotes, kept together with their quotes
// - Parenthesized comments, dropped entirely
//
// Unterminated strings and comments are tolerated: the partial token is dropped.

use log::trace;

/// Scanner state while walking the characters of a line
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Normal,
    InString,
    InComment,
}

/// Tokenizes one line of Rockstar source into a vector of non-empty tokens.
///
/// String tokens keep their surrounding quotes so later stages can tell them
/// apart from words. Nothing carries position information; the caller owns the
/// line number.
///
/// # Arguments
/// * `source` - A single source line, without its newline
///
/// # Returns
/// The tokens in source order
pub fn tokenize(source: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut state = State::Normal;
    let mut current = String::new();

    for c in source.chars() {
        match state {
            State::Normal => {
                if c.is_whitespace() {
                    flush(&mut tokens, &mut current);
                } else if c == ',' {
                    flush(&mut tokens, &mut current);
                    tokens.push(",".to_string());
                } else if c == '(' {
                    flush(&mut tokens, &mut current);
                    state = State::InComment;
                } else if c == '"' {
                    flush(&mut tokens, &mut current);
                    current.push(c);
                    state = State::InString;
                } else {
                    current.push(c);
                }
            }
            State::InString => {
                current.push(c);
                if c == '"' {
                    tokens.push(std::mem::take(&mut current));
                    state = State::Normal;
                }
            }
            State::InComment => {
                if c == ')' {
                    state = State::Normal;
                }
            }
        }
    }

    // Anything left over in a string or comment is an unterminated chunk
    if state == State::Normal {
        flush(&mut tokens, &mut current);
    }

    trace!("tokenized {:?} into {:?}", source, tokens);
    tokens
}

/// Push the pending token (trimmed) if it is not empty, then reset it
fn flush(tokens: &mut Vec<String>, current: &mut String) {
    let token = current.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
    current.clear();
}
