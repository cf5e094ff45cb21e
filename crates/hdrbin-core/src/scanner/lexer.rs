//! Small lexer for the declaration subset of C that the scanner recognizes.
//!
//! Lexing happens in two steps:
//!
//! 1. [`strip_comments`] blanks out `//` and `/* */` comments, keeping line
//!    breaks so that line numbers survive. String and character literals are
//!    passed through untouched so a `"//"` inside them is not a comment.
//! 2. [`Lexer`] splits the stripped text into [`Token`]s and can switch to raw
//!    capture for the bracketed dimension and the braced initializer body.
//!
//! ## Token classes
//!
//! - `Word`: a run of `[A-Za-z0-9_]` (keywords, identifiers, numbers)
//! - `Punct`: any other single non-whitespace character

use crate::error::{Error, Result};

/// A lexical token borrowed from the stripped source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Identifier, keyword or number
    Word(&'a str),
    /// Single punctuation character
    Punct(char),
}

impl<'a> Token<'a> {
    /// Returns the word if this token is one
    pub fn as_word(&self) -> Option<&'a str> {
        match *self {
            Token::Word(word) => Some(word),
            Token::Punct(_) => None,
        }
    }
}

/// Returns true if `word` is a C identifier (does not start with a digit).
pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str,
    Char,
}

/// Replaces every comment in `text` with spaces, keeping newlines.
///
/// Fails with [`Error::UnterminatedComment`] if a block comment runs to the
/// end of the text.
pub fn strip_comments(origin: &str, text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut line = 1;
    let mut comment_line = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }

        match state {
            State::Code => match (c, chars.peek().copied()) {
                ('/', Some('/')) => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                ('/', Some('*')) => {
                    chars.next();
                    out.push_str("  ");
                    comment_line = line;
                    state = State::BlockComment;
                }
                ('"', _) => {
                    out.push(c);
                    state = State::Str;
                }
                ('\'', _) => {
                    out.push(c);
                    state = State::Char;
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::Str | State::Char => {
                out.push(c);
                let quote = if state == State::Str { '"' } else { '\'' };
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        if escaped == '\n' {
                            line += 1;
                        }
                        out.push(escaped);
                    }
                } else if c == quote || c == '\n' {
                    // Unterminated literals end at the newline
                    state = State::Code;
                }
            }
        }
    }

    if state == State::BlockComment {
        return Err(Error::UnterminatedComment {
            origin: origin.to_string(),
            line: comment_line,
        });
    }

    Ok(out)
}

/// Tokenizer over comment-free text
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    text: &'a str,
    position: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned at the start of `text`
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            position: 0,
            line: 1,
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.position..]
    }

    fn advance(&mut self, len: usize) {
        let skipped = &self.text[self.position..self.position + len];
        self.line += skipped.bytes().filter(|&b| b == b'\n').count();
        self.position += len;
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let len = rest.len() - rest.trim_start().len();
        self.advance(len);
    }

    /// Skips whitespace and returns the line the next token starts on.
    pub fn next_token_line(&mut self) -> usize {
        self.skip_whitespace();
        self.line
    }

    /// Returns the next token, or `None` at the end of the text.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        self.skip_whitespace();
        let rest = self.rest();
        let c = rest.chars().next()?;

        if is_word_char(c) {
            let len = rest.find(|c| !is_word_char(c)).unwrap_or(rest.len());
            self.advance(len);
            Some(Token::Word(&rest[..len]))
        } else {
            self.advance(c.len_utf8());
            Some(Token::Punct(c))
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&self) -> Option<Token<'a>> {
        self.clone().next_token()
    }

    /// Captures raw text up to `delimiter` and consumes the delimiter.
    ///
    /// Returns `None`, consuming nothing, if the delimiter never appears.
    pub fn take_until(&mut self, delimiter: char) -> Option<&'a str> {
        let rest = self.rest();
        let end = rest.find(delimiter)?;
        self.advance(end + delimiter.len_utf8());
        Some(&rest[..end])
    }

    /// Captures an initializer body up to the first `}` followed by `;`.
    ///
    /// Whitespace between the brace and the terminator is allowed. Both are
    /// consumed. Returns `None`, consuming nothing, if no terminator exists.
    pub fn take_body(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let mut search = 0;

        while let Some(offset) = rest[search..].find('}') {
            let brace = search + offset;
            let after = &rest[brace + 1..];
            let gap = after.len() - after.trim_start().len();
            if after[gap..].starts_with(';') {
                self.advance(brace + 1 + gap + 1);
                return Some(&rest[..brace]);
            }
            search = brace + 1;
        }

        None
    }
}
