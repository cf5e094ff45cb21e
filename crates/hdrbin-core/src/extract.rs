//! The extraction pipeline: source texts in, materialized arrays out.
//!
//! ## Architecture
//!
//! [`Extractor`] drives one [`ScanStrategy`] over each [`SourceText`], turns
//! every declaration into a [`MaterializedArray`] and merges the results into
//! an [`ExtractionResult`] keyed by array name. Nothing is written to disk
//! here; see [`crate::emit`] for that.
//!
//! Two declarations of the same name are resolved by [`CollisionPolicy`].
//! Byte-identical redeclarations are never a conflict.

use crate::array::MaterializedArray;
use crate::error::{Error, Result};
use crate::scanner::{ScanStrategy, Scanner, ScannerConfig, SourceText};
use std::collections::btree_map::{self, BTreeMap};
use tracing::{debug, info, warn};

/// What to do when two sources declare the same array with different bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Fail the run with [`Error::NameCollision`]
    #[default]
    Reject,
    /// Keep the declaration processed first
    FirstWins,
    /// Replace it with the declaration processed last
    LastWins,
}

/// Configuration for the extractor
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfig {
    /// Scanner settings
    pub scanner: ScannerConfig,
    /// Name collision handling
    pub collision_policy: CollisionPolicy,
}

impl ExtractorConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scanner configuration
    pub fn scanner(mut self, scanner: ScannerConfig) -> Self {
        self.scanner = scanner;
        self
    }

    /// Sets the collision policy
    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}

/// A materialized array together with the source that declared it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArray {
    /// The array
    pub array: MaterializedArray,
    /// Origin label of the declaring source
    pub origin: String,
}

/// Counters collected while merging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Declarations materialized
    pub declarations: usize,
    /// Byte-identical redeclarations dropped
    pub duplicates_skipped: usize,
    /// Conflicting redeclarations that replaced an earlier one
    pub collisions_overridden: usize,
    /// Conflicting redeclarations that were dropped
    pub collisions_ignored: usize,
}

/// All arrays of one run, keyed by name
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    arrays: BTreeMap<String, ExtractedArray>,
    sources: Vec<String>,
    stats: ExtractionStats,
}

impl ExtractionResult {
    /// Creates an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one array into the result according to `policy`.
    pub fn insert(
        &mut self,
        array: MaterializedArray,
        origin: impl Into<String>,
        policy: CollisionPolicy,
    ) -> Result<()> {
        let origin = origin.into();
        self.stats.declarations += 1;

        let mut entry = match self.arrays.entry(array.name().to_string()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(ExtractedArray { array, origin });
                return Ok(());
            }
            btree_map::Entry::Occupied(entry) => entry,
        };

        let existing = entry.get();
        if existing.array.as_bytes() == array.as_bytes() {
            debug!(
                "Skipping duplicate: {} (declared in {} and {})",
                array.name(),
                existing.origin,
                origin
            );
            self.stats.duplicates_skipped += 1;
            return Ok(());
        }

        match policy {
            CollisionPolicy::Reject => Err(Error::NameCollision {
                name: array.name().to_string(),
                first: existing.origin.clone(),
                second: origin,
            }),
            CollisionPolicy::FirstWins => {
                warn!(
                    "Conflicting {} in {} ignored, keeping {}",
                    array.name(),
                    origin,
                    existing.origin
                );
                self.stats.collisions_ignored += 1;
                Ok(())
            }
            CollisionPolicy::LastWins => {
                warn!(
                    "Conflicting {} in {} replaces {}",
                    array.name(),
                    origin,
                    existing.origin
                );
                self.stats.collisions_overridden += 1;
                entry.insert(ExtractedArray { array, origin });
                Ok(())
            }
        }
    }

    /// Looks up an array by name
    pub fn get(&self, name: &str) -> Option<&ExtractedArray> {
        self.arrays.get(name)
    }

    /// Arrays in name order
    pub fn iter(&self) -> impl Iterator<Item = &ExtractedArray> {
        self.arrays.values()
    }

    /// Number of distinct arrays
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Returns true if no array was extracted
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Origins of the sources that contributed declarations, in processing order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Merge statistics
    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }
}

/// Runs scanning, evaluation, decoding and materialization over sources
#[derive(Debug, Clone)]
pub struct Extractor<S = Scanner> {
    strategy: S,
    collision_policy: CollisionPolicy,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Creates an extractor with default configuration
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Creates an extractor with custom configuration
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            strategy: Scanner::with_config(config.scanner),
            collision_policy: config.collision_policy,
        }
    }
}

impl<S: ScanStrategy> Extractor<S> {
    /// Creates an extractor around a custom scan strategy
    pub fn with_strategy(strategy: S, collision_policy: CollisionPolicy) -> Self {
        Self {
            strategy,
            collision_policy,
        }
    }

    /// Materializes every declaration of one source, in source order.
    ///
    /// A source without declarations is an [`Error::ScanEmpty`].
    pub fn extract_source(&self, source: &SourceText) -> Result<Vec<MaterializedArray>> {
        let declarations = self.strategy.scan(source)?;
        if declarations.is_empty() {
            return Err(Error::scan_empty(source.origin()));
        }

        declarations
            .iter()
            .map(|declaration| declaration.materialize())
            .collect()
    }

    /// Materializes one source and merges it into `result`.
    ///
    /// Returns the number of declarations the source contributed.
    pub fn add_source(&self, result: &mut ExtractionResult, source: &SourceText) -> Result<usize> {
        let arrays = self.extract_source(source)?;
        let count = arrays.len();

        for array in arrays {
            debug!(
                "Materialized {} ({} bytes, {} zero-filled) from {}",
                array.name(),
                array.capacity(),
                array.zero_filled(),
                source.origin()
            );
            result.insert(array, source.origin(), self.collision_policy)?;
        }
        result.sources.push(source.origin().to_string());

        Ok(count)
    }

    /// Processes all sources in order; the first failure aborts.
    pub fn extract_all<'a, I>(&self, sources: I) -> Result<ExtractionResult>
    where
        I: IntoIterator<Item = &'a SourceText>,
    {
        let mut result = ExtractionResult::new();
        for source in sources {
            self.add_source(&mut result, source)?;
        }
        info!(
            "Extracted {} arrays from {} sources",
            result.len(),
            result.sources.len()
        );
        Ok(result)
    }
}
