//! Header scanning for byte-array declarations.
//!
//! The scanner recognizes exactly one declaration shape:
//!
//! ```text
//! static const uint8_t <name> [ <size expression> ] = { <body> } ;
//! ```
//!
//! with arbitrary whitespace and comments between tokens. The keyword
//! sequence is configurable through [`ScannerConfig`].
//!
//! ## Algorithm Overview
//!
//! 1. Blank out comments (see [`lexer::strip_comments`])
//! 2. Walk the token stream looking for the keyword sequence
//! 3. Once `<name> [` follows the keywords, the dimension is captured raw
//!    and a missing `]` is an error
//! 4. Only `= {` after the dimension commits the declaration; its body runs
//!    to the first `};`, and a missing `};` is an error. Anything else
//!    (`name[N];`, `name[2][2] = ...`, `name[4] = "abc"`) is skipped
//!
//! ## Extensibility
//!
//! The [`ScanStrategy`] trait allows custom scanning algorithms:
//!
//! ```no_run
//! use hdrbin_core::scanner::{ArrayDeclaration, ScanStrategy, SourceText};
//! use hdrbin_core::Result;
//!
//! struct CustomScanner;
//!
//! impl ScanStrategy for CustomScanner {
//!     fn scan(&self, source: &SourceText) -> Result<Vec<ArrayDeclaration>> {
//!         // Custom scanning logic
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod lexer;

use crate::array::MaterializedArray;
use crate::error::{Error, Result};
use crate::{literal, size};
use lexer::{Lexer, Token};
use std::path::Path;
use tracing::{debug, trace};

/// Keyword sequence of an immutable byte-array declaration
pub const DEFAULT_KEYWORDS: &[&str] = &["static", "const", "uint8_t"];

/// Raw text of one header together with where it came from
#[derive(Debug, Clone)]
pub struct SourceText {
    origin: String,
    text: String,
}

impl SourceText {
    /// Creates a source text with an arbitrary origin label
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }

    /// Reads a header file, labelling it with its path
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Ok(Self::new(path.display().to_string(), text))
    }

    /// Origin label used in diagnostics
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The raw text
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One array declaration found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDeclaration {
    /// Array identifier
    pub name: String,
    /// Dimension expression between the brackets, verbatim
    pub size_expression: String,
    /// Initializer text between the braces, verbatim
    pub body: String,
    /// 1-based line of the first keyword
    pub line: usize,
}

impl ArrayDeclaration {
    /// Evaluates the dimension expression
    pub fn capacity(&self) -> Result<usize> {
        size::evaluate(&self.name, &self.size_expression)
    }

    /// Decodes the initializer values
    pub fn literals(&self) -> Vec<u8> {
        literal::decode(&self.body)
    }

    /// Evaluates, decodes and zero-fills this declaration
    pub fn materialize(&self) -> Result<MaterializedArray> {
        let capacity = self.capacity()?;
        let literals = self.literals();
        trace!(
            "{}: capacity {}, {} literals",
            self.name,
            capacity,
            literals.len()
        );
        MaterializedArray::new(self.name.as_str(), capacity, literals)
    }
}

/// Configuration for the scanner
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Keywords that must precede the array name, in order
    pub keywords: Vec<String>,
    /// Only yield declarations whose name starts with this prefix
    pub name_prefix: Option<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            name_prefix: None,
        }
    }
}

impl ScannerConfig {
    /// Creates a new scanner config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the keyword sequence
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the name prefix filter
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }
}

/// Trait for implementing custom scanning strategies
pub trait ScanStrategy: Send + Sync {
    /// Scan the source for array declarations, in source order
    fn scan(&self, source: &SourceText) -> Result<Vec<ArrayDeclaration>>;
}

/// Primary scanner for byte-array declarations
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    /// Creates a new scanner with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Consumes the remaining keywords of the sequence from `lexer`.
    ///
    /// The first keyword has already been consumed by the caller.
    fn match_keywords(&self, lexer: &mut Lexer<'_>) -> bool {
        self.config.keywords[1..]
            .iter()
            .all(|keyword| lexer.next_token() == Some(Token::Word(keyword.as_str())))
    }

    /// Parses a declaration after its keyword sequence.
    ///
    /// Returns `Ok(None)` if the keywords introduce something other than an
    /// array with an initializer.
    fn parse_declaration(
        &self,
        origin: &str,
        line: usize,
        lexer: &mut Lexer<'_>,
    ) -> Result<Option<ArrayDeclaration>> {
        let Some(name) = lexer.next_token().and_then(|t| t.as_word()) else {
            return Ok(None);
        };
        if !lexer::is_identifier(name) || lexer.next_token() != Some(Token::Punct('[')) {
            trace!("{}:{}: '{}' is not an array declaration", origin, line, name);
            return Ok(None);
        }

        let size_expression = lexer
            .take_until(']')
            .ok_or_else(|| Error::unterminated(origin, name, line, "']' closing the dimension"))?;

        if lexer.next_token() != Some(Token::Punct('='))
            || lexer.next_token() != Some(Token::Punct('{'))
        {
            trace!("{}:{}: '{}' has no brace initializer", origin, line, name);
            return Ok(None);
        }

        let body = lexer
            .take_body()
            .ok_or_else(|| Error::unterminated(origin, name, line, "'};' closing the initializer"))?;

        Ok(Some(ArrayDeclaration {
            name: name.to_string(),
            size_expression: size_expression.to_string(),
            body: body.to_string(),
            line,
        }))
    }

    fn is_selected(&self, name: &str) -> bool {
        self.config
            .name_prefix
            .as_deref()
            .map_or(true, |prefix| name.starts_with(prefix))
    }
}

impl ScanStrategy for Scanner {
    fn scan(&self, source: &SourceText) -> Result<Vec<ArrayDeclaration>> {
        let origin = source.origin();
        let mut results = Vec::new();

        let Some(first_keyword) = self.config.keywords.first() else {
            return Ok(results);
        };

        debug!("Starting scan of {} ({} bytes)", origin, source.text().len());

        let stripped = lexer::strip_comments(origin, source.text())?;
        let mut lexer = Lexer::new(&stripped);

        loop {
            let line = lexer.next_token_line();
            let Some(token) = lexer.next_token() else {
                break;
            };
            if token != Token::Word(first_keyword.as_str()) {
                continue;
            }

            // Work on a copy so a near miss resumes right after the first keyword
            let mut attempt = lexer.clone();
            if !self.match_keywords(&mut attempt) {
                continue;
            }

            if let Some(declaration) = self.parse_declaration(origin, line, &mut attempt)? {
                lexer = attempt;
                if self.is_selected(&declaration.name) {
                    debug!(
                        "Found declaration {}[{}] at {}:{}",
                        declaration.name,
                        declaration.size_expression.trim(),
                        origin,
                        line
                    );
                    results.push(declaration);
                } else {
                    trace!("Skipping {}: name prefix filter", declaration.name);
                }
            }
        }

        debug!("Scan of {} complete: found {} declarations", origin, results.len());
        Ok(results)
    }
}
