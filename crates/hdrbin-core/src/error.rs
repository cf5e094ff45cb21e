//! Error types for the hdrbin-core library.
//!
//! Every failure in the extraction pipeline is fatal for the run. The variants
//! carry enough context (source, array name, expected vs. actual) to produce a
//! diagnostic without further lookups.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hdrbin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all hdrbin operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreate {
        /// Path to the directory that failed to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No matching array declaration in a source text
    #[error("no array declarations found in '{origin}'")]
    ScanEmpty {
        /// Origin label of the source text (usually its path)
        origin: String,
    },

    /// A size expression term is not an unsigned decimal or hex literal
    #[error("array '{name}': malformed size expression '{expression}': term '{term}' is not an unsigned decimal or hex literal")]
    MalformedSizeExpression {
        /// Array whose dimension failed to evaluate
        name: String,
        /// The offending term, trimmed
        term: String,
        /// The complete size expression
        expression: String,
    },

    /// A size expression sums to more than the address space allows
    #[error("array '{name}': size expression '{expression}' overflows")]
    CapacityOverflow {
        /// Array whose dimension failed to evaluate
        name: String,
        /// The complete size expression
        expression: String,
    },

    /// The initializer supplies more values than the declared capacity
    #[error("array '{name}': expected at most {capacity} values, got {actual}")]
    SizeExceeded {
        /// Array name
        name: String,
        /// Declared capacity
        capacity: usize,
        /// Number of decoded literals
        actual: usize,
    },

    /// Memory for the zero-filled array could not be reserved
    #[error("array '{name}': cannot allocate {capacity} bytes: {source}")]
    AllocationFailed {
        /// Array name
        name: String,
        /// Declared capacity
        capacity: usize,
        /// Underlying allocation error
        #[source]
        source: std::collections::TryReserveError,
    },

    /// A declaration started but its closing delimiter was never found
    #[error("{origin}:{line}: array '{name}': expected {expected}")]
    UnterminatedDeclaration {
        /// Origin label of the source text
        origin: String,
        /// Array name
        name: String,
        /// 1-based line of the declaration
        line: usize,
        /// What the scanner was looking for
        expected: &'static str,
    },

    /// A block comment is never closed
    #[error("{origin}:{line}: unterminated block comment")]
    UnterminatedComment {
        /// Origin label of the source text
        origin: String,
        /// 1-based line where the comment opens
        line: usize,
    },

    /// Two sources declare the same array with different contents
    #[error("array '{name}' declared with different contents in '{first}' and '{second}'")]
    NameCollision {
        /// Array name
        name: String,
        /// Origin of the declaration kept so far
        first: String,
        /// Origin of the conflicting declaration
        second: String,
    },

    /// Array name cannot be used as an artifact file name
    #[error("invalid artifact name '{name}': must be a C identifier")]
    InvalidArtifactName {
        /// The rejected name
        name: String,
    },

    /// Artifact extension would leave the output directory or the file name
    #[error("invalid artifact extension '{extension}': only ASCII letters, digits and '_' are allowed")]
    InvalidArtifactExtension {
        /// The rejected extension
        extension: String,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates a new empty scan error
    pub fn scan_empty(origin: impl Into<String>) -> Self {
        Self::ScanEmpty {
            origin: origin.into(),
        }
    }

    /// Creates a new malformed size expression error
    pub fn malformed_size(
        name: impl Into<String>,
        term: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self::MalformedSizeExpression {
            name: name.into(),
            term: term.into(),
            expression: expression.into(),
        }
    }

    /// Creates a new size exceeded error
    pub fn size_exceeded(name: impl Into<String>, capacity: usize, actual: usize) -> Self {
        Self::SizeExceeded {
            name: name.into(),
            capacity,
            actual,
        }
    }

    /// Creates a new unterminated declaration error
    pub fn unterminated(
        origin: impl Into<String>,
        name: impl Into<String>,
        line: usize,
        expected: &'static str,
    ) -> Self {
        Self::UnterminatedDeclaration {
            origin: origin.into(),
            name: name.into(),
            line,
            expected,
        }
    }

    /// Creates a new invalid artifact name error
    pub fn invalid_artifact_name(name: impl Into<String>) -> Self {
        Self::InvalidArtifactName { name: name.into() }
    }

    /// Returns true if directory mode may log this error and move on.
    ///
    /// Only a header without any matching declaration qualifies; everything
    /// else points at a broken declaration and aborts the run.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::ScanEmpty { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::size_exceeded("name", 2, 3);
        let msg = err.to_string();
        assert!(msg.contains("'name'"));
        assert!(msg.contains("at most 2"));
        assert!(msg.contains("got 3"));
    }

    #[test]
    fn test_malformed_size_display() {
        let err = Error::malformed_size("table", "N", "4096 + N");
        let msg = err.to_string();
        assert!(msg.contains("'table'"));
        assert!(msg.contains("term 'N'"));
        assert!(msg.contains("4096 + N"));
    }

    #[test]
    fn test_unterminated_display() {
        let err = Error::unterminated("sid.h", "wave", 12, "'};'");
        assert_eq!(err.to_string(), "sid.h:12: array 'wave': expected '};'");
    }

    #[test]
    fn test_is_skippable() {
        assert!(Error::scan_empty("a.h").is_skippable());
        assert!(!Error::size_exceeded("x", 1, 2).is_skippable());
        assert!(!Error::invalid_artifact_name("../x").is_skippable());
    }

    #[test]
    fn test_allocation_failed_display() {
        let source = Vec::<u8>::new().try_reserve_exact(usize::MAX).unwrap_err();
        let err = Error::AllocationFailed {
            name: "big".to_string(),
            capacity: usize::MAX,
            source,
        };
        assert!(err.to_string().starts_with("array 'big': cannot allocate"));
        assert!(!err.is_skippable());
    }
}
