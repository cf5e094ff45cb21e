//! Writing materialized arrays to disk.
//!
//! Each array becomes `<output_dir>/<name>.<extension>` holding exactly its
//! bytes, no header or length prefix. Existing files are overwritten, so
//! re-running on unchanged input reproduces the same artifacts.

use crate::error::{Error, Result};
use crate::extract::ExtractionResult;
use crate::scanner::lexer::is_identifier;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default artifact file extension
pub const DEFAULT_EXTENSION: &str = "bin";

/// Outcome of a successful [`Emitter::emit`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Artifact paths in the order they were written
    pub written: Vec<PathBuf>,
}

impl EmitReport {
    /// Number of artifacts written
    pub fn count(&self) -> usize {
        self.written.len()
    }
}

/// State of an existing artifact compared with a fresh extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// File exists with identical bytes
    Match,
    /// File exists but its bytes differ
    Differs,
    /// File does not exist
    Missing,
}

/// One line of an [`Emitter::check`] report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCheck {
    /// Array name
    pub name: String,
    /// Artifact path
    pub path: PathBuf,
    /// Comparison outcome
    pub status: ArtifactStatus,
}

/// Writes extraction results as raw binary files
#[derive(Debug, Clone)]
pub struct Emitter {
    output_dir: PathBuf,
    extension: String,
}

impl Emitter {
    /// Creates an emitter writing `.bin` files into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Sets the artifact extension (without the dot).
    ///
    /// The value is validated by [`artifact_name`](Self::artifact_name).
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// The output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name of the artifact for array `name`.
    ///
    /// The name must be a C identifier and the extension may only hold ASCII
    /// letters, digits and `_`, so every artifact stays inside the output
    /// directory.
    pub fn artifact_name(&self, name: &str) -> Result<String> {
        if !is_identifier(name) {
            return Err(Error::invalid_artifact_name(name));
        }
        if !is_valid_extension(&self.extension) {
            return Err(Error::InvalidArtifactExtension {
                extension: self.extension.clone(),
            });
        }
        if self.extension.is_empty() {
            Ok(name.to_string())
        } else {
            Ok(format!("{}.{}", name, self.extension))
        }
    }

    /// Resolves every artifact path without touching the filesystem.
    pub fn plan(&self, result: &ExtractionResult) -> Result<Vec<PathBuf>> {
        result
            .iter()
            .map(|entry| {
                self.artifact_name(entry.array.name())
                    .map(|file| self.output_dir.join(file))
            })
            .collect()
    }

    /// Writes every array of `result`, creating the output directory first.
    ///
    /// All names are validated before the first write.
    pub fn emit(&self, result: &ExtractionResult) -> Result<EmitReport> {
        let paths = self.plan(result)?;

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| Error::directory_create(&self.output_dir, e))?;

        let mut report = EmitReport::default();
        for (entry, path) in result.iter().zip(paths) {
            fs::write(&path, entry.array.as_bytes()).map_err(|e| Error::file_write(&path, e))?;
            debug!("Wrote {} ({} bytes)", path.display(), entry.array.capacity());
            report.written.push(path);
        }

        info!(
            "Wrote {} artifacts to {}",
            report.count(),
            self.output_dir.display()
        );
        Ok(report)
    }

    /// Compares `result` against the artifacts already on disk.
    pub fn check(&self, result: &ExtractionResult) -> Result<Vec<ArtifactCheck>> {
        let paths = self.plan(result)?;

        result
            .iter()
            .zip(paths)
            .map(|(entry, path)| {
                let status = match fs::read(&path) {
                    Ok(existing) if existing == entry.array.as_bytes() => ArtifactStatus::Match,
                    Ok(_) => ArtifactStatus::Differs,
                    Err(e) if e.kind() == ErrorKind::NotFound => ArtifactStatus::Missing,
                    Err(e) => return Err(Error::file_read(&path, e)),
                };
                Ok(ArtifactCheck {
                    name: entry.array.name().to_string(),
                    path,
                    status,
                })
            })
            .collect()
    }
}

fn is_valid_extension(extension: &str) -> bool {
    extension
        .chars()
        .all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::MaterializedArray;
    use crate::extract::{CollisionPolicy, Extractor};
    use crate::scanner::SourceText;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> ExtractionResult {
        let src = SourceText::new(
            "sid.h",
            "static const uint8_t b[4+4] = {1,2};\nstatic const uint8_t a[4] = {0x01,2,0xFF,4};",
        );
        Extractor::new().extract_all([&src]).unwrap()
    }

    #[test]
    fn test_emit_writes_raw_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("waveforms");
        let report = Emitter::new(&out).emit(&sample()).unwrap();

        assert_eq!(report.count(), 2);
        assert_eq!(report.written, vec![out.join("a.bin"), out.join("b.bin")]);
        assert_eq!(fs::read(out.join("a.bin")).unwrap(), vec![0x01, 0x02, 0xFF, 0x04]);
        assert_eq!(fs::read(out.join("b.bin")).unwrap(), vec![1, 2, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_emit_overwrites_and_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let emitter = Emitter::new(temp_dir.path());
        fs::write(temp_dir.path().join("a.bin"), b"stale contents").unwrap();

        emitter.emit(&sample()).unwrap();
        let first = fs::read(temp_dir.path().join("a.bin")).unwrap();
        emitter.emit(&sample()).unwrap();
        let second = fs::read(temp_dir.path().join("a.bin")).unwrap();

        assert_eq!(first, vec![0x01, 0x02, 0xFF, 0x04]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_extension() {
        let emitter = Emitter::new("out").extension("raw");
        assert_eq!(emitter.artifact_name("wave").unwrap(), "wave.raw");
        let bare = Emitter::new("out").extension("");
        assert_eq!(bare.artifact_name("wave").unwrap(), "wave");
        let digits = Emitter::new("out").extension("b_1");
        assert_eq!(digits.artifact_name("wave").unwrap(), "wave.b_1");
    }

    #[test]
    fn test_invalid_extension_rejected_before_writing() {
        for extension in ["../x", "bin/../../etc", ".bin", "b n"] {
            let emitter = Emitter::new("out").extension(extension);
            match emitter.artifact_name("wave") {
                Err(Error::InvalidArtifactExtension { extension: rejected }) => {
                    assert_eq!(rejected, extension)
                }
                other => panic!("expected InvalidArtifactExtension, got {:?}", other),
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let err = Emitter::new(&out)
            .extension("../escape")
            .emit(&sample())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArtifactExtension { .. }));
        assert!(!out.exists());
        assert!(!temp_dir.path().join("escape").exists());
    }

    #[test]
    fn test_invalid_name_rejected_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let mut result = ExtractionResult::new();
        result
            .insert(
                MaterializedArray::new("ok", 1, vec![1]).unwrap(),
                "x.h",
                CollisionPolicy::Reject,
            )
            .unwrap();
        result
            .insert(
                MaterializedArray::new("../escape", 1, vec![1]).unwrap(),
                "x.h",
                CollisionPolicy::Reject,
            )
            .unwrap();

        let err = Emitter::new(&out).emit(&result).unwrap_err();
        assert!(matches!(err, Error::InvalidArtifactName { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_check_statuses() {
        let temp_dir = TempDir::new().unwrap();
        let emitter = Emitter::new(temp_dir.path());
        let result = sample();

        let statuses: Vec<_> = emitter
            .check(&result)
            .unwrap()
            .into_iter()
            .map(|c| c.status)
            .collect();
        assert_eq!(statuses, vec![ArtifactStatus::Missing, ArtifactStatus::Missing]);

        emitter.emit(&result).unwrap();
        fs::write(temp_dir.path().join("b.bin"), [1u8, 2]).unwrap();

        let checks = emitter.check(&result).unwrap();
        assert_eq!(checks[0].name, "a");
        assert_eq!(checks[0].status, ArtifactStatus::Match);
        assert_eq!(checks[1].status, ArtifactStatus::Differs);
    }
}
