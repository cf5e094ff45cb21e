//! # hdrbin-core
//!
//! A library for extracting byte-array constants from C headers into raw binary blobs.
//!
//! This crate provides the core functionality for:
//! - Scanning header text for `static const uint8_t name[N] = { ... };` declarations
//! - Evaluating additive dimension expressions such as `4096+4096`
//! - Decoding mixed hex/decimal initializers, truncated to 8 bits
//! - Zero-filling each array to its declared capacity, exactly like C does
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`scanner`]: Comment stripping, lexing and declaration scanning
//! - [`size`]: Dimension expression evaluation
//! - [`literal`]: Initializer body decoding
//! - [`array`]: Zero-fill materialization
//! - [`extract`]: The pipeline tying the above together across sources
//! - [`emit`]: Writing artifacts to disk
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use hdrbin_core::{Emitter, Extractor, SourceText};
//!
//! let sources = [
//!     SourceText::read("sidw6581.h")?,
//!     SourceText::read("sidw8580.h")?,
//! ];
//!
//! let result = Extractor::new().extract_all(&sources)?;
//! let report = Emitter::new("waveforms").emit(&result)?;
//! println!("Wrote {} artifacts", report.count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`ScanStrategy`]: Customize how declarations are located

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod array;
pub mod emit;
pub mod error;
pub mod extract;
pub mod literal;
pub mod scanner;
pub mod size;

// Re-export primary types for convenience
pub use array::MaterializedArray;
pub use emit::{ArtifactCheck, ArtifactStatus, EmitReport, Emitter};
pub use error::{Error, Result};
pub use extract::{
    CollisionPolicy, ExtractedArray, ExtractionResult, ExtractionStats, Extractor, ExtractorConfig,
};
pub use scanner::{ArrayDeclaration, ScanStrategy, Scanner, ScannerConfig, SourceText};
