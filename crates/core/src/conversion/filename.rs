//! Output file naming.

use super::formats::TargetFormat;

/// Name for a converted file: the original name with exactly one extension
/// replaced by the target's.
///
/// `report.DOCX` becomes `report.pdf`; `archive.tar.gz` becomes
/// `archive.tar.png`. A leading dot does not start an extension.
pub fn derive_file_name(original: &str, target: TargetFormat) -> String {
    format!("{}.{}", base_name(original), target.extension())
}

/// The original name without its last extension.
pub fn base_name(original: &str) -> &str {
    match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    }
}
