//! Provenance manifest written next to the extracted binaries.
//!
//! The preamble is fixed text (built in, or supplied by the user for
//! project-specific license statements). The listing after it is generated
//! from the extraction result so it never disagrees with the artifacts.

use anyhow::Result;
use hdrbin_core::{Emitter, ExtractionResult};
use std::fmt::Write as _;

/// File name used when `--manifest-name` is not given
pub(crate) const DEFAULT_MANIFEST_NAME: &str = "LICENSE.txt";

const DEFAULT_PREAMBLE: &str = "\
Binary table license and provenance

The files in this directory were extracted from byte-array initializers in
the C headers listed below and are covered by the licenses of those headers.
Each file holds exactly the declared number of bytes. Where an initializer
supplies fewer values than the array dimension, the remaining bytes are zero,
as C specifies for aggregate initialization.
";

/// First 16 hex characters of the BLAKE3 digest of `data`
pub(crate) fn digest(data: &[u8]) -> String {
    blake3::hash(data).to_hex()[..16].to_string()
}

/// Renders the manifest for `result` as it will be written by `emitter`.
pub(crate) fn render(
    preamble: Option<&str>,
    result: &ExtractionResult,
    emitter: &Emitter,
) -> Result<String> {
    let mut out = String::new();

    out.push_str(preamble.unwrap_or(DEFAULT_PREAMBLE).trim_end());
    out.push_str("\n\nSource headers:\n");
    for source in result.sources() {
        writeln!(out, "- {}", source)?;
    }

    out.push_str("\nBinary files in this directory:\n");
    for entry in result.iter() {
        let array = &entry.array;
        writeln!(
            out,
            "- {} ({} bytes, blake3 {})",
            emitter.artifact_name(array.name())?,
            array.capacity(),
            digest(array.as_bytes())
        )?;
        writeln!(out, "  Source: {}[] in {}.", array.name(), entry.origin)?;
        if array.zero_filled() > 0 {
            writeln!(
                out,
                "  Note: The initializer provides {} values; the remaining {} bytes\n  are zero-filled to the declared size of {}.",
                array.literal_count(),
                array.zero_filled(),
                array.capacity()
            )?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdrbin_core::{Extractor, SourceText};
    use pretty_assertions::assert_eq;

    fn sample() -> ExtractionResult {
        let src = SourceText::new(
            "sound/sidw6581.h",
            "static const uint8_t waveform30_6581[4] = {1,2,3,4};\n\
             static const uint8_t waveform50_6581[4+4] = {1,2,3,4};",
        );
        Extractor::new().extract_all([&src]).unwrap()
    }

    #[test]
    fn test_digest() {
        assert_eq!(digest(b"abc"), digest(b"abc"));
        assert_ne!(digest(b"abc"), digest(b"abd"));
        assert_eq!(digest(b"").len(), 16);
    }

    #[test]
    fn test_render_lists_every_artifact() {
        let result = sample();
        let text = render(None, &result, &Emitter::new("waveforms")).unwrap();

        assert!(text.starts_with("Binary table license and provenance"));
        assert!(text.contains("Source headers:\n- sound/sidw6581.h\n"));
        assert!(text.contains("- waveform30_6581.bin (4 bytes, blake3 "));
        assert!(text.contains("- waveform50_6581.bin (8 bytes, blake3 "));
        assert!(text.contains("  Source: waveform50_6581[] in sound/sidw6581.h."));
        assert_eq!(text.matches("Note:").count(), 1);
        assert!(text.contains("provides 4 values; the remaining 4 bytes"));
    }

    #[test]
    fn test_custom_preamble_and_extension() {
        let result = sample();
        let emitter = Emitter::new("out").extension("raw");
        let text = render(Some("GPL-2.0+ tables\n\n"), &result, &emitter).unwrap();

        assert!(text.starts_with("GPL-2.0+ tables\n\nSource headers:"));
        assert!(text.contains("- waveform30_6581.raw (4 bytes"));
    }
}
