//! Download file naming for exports.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const MAX_FILENAME_STEM_CHARS: usize = 50;
const FALLBACK_FILENAME_STEM: &str = "abcld";

static UNSAFE_FILENAME_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid filename regex"));

/// Export artifact type, which fixes the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Png,
    Pdf,
    Json,
}

impl ExportKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
            Self::Json => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
            Self::Json => "application/json",
        }
    }
}

/// Replaces every non-alphanumeric ASCII char with `_`, capped at 50 chars.
///
/// Lengths count UTF-16 code units, so a char outside the BMP (most emoji)
/// becomes `__`. An empty title falls back to `abcld`.
pub fn sanitize_filename(title: &str) -> String {
    let source = if title.is_empty() {
        FALLBACK_FILENAME_STEM
    } else {
        title
    };
    // After replacement every char is ASCII, so chars equal code units.
    UNSAFE_FILENAME_CHAR_RE
        .replace_all(source, |caps: &Captures| {
            let units: usize = caps[0].chars().map(char::len_utf16).sum();
            "_".repeat(units)
        })
        .chars()
        .take(MAX_FILENAME_STEM_CHARS)
        .collect()
}

/// `{sanitized-title}_{YYYY-MM-DD}.{ext}`.
pub fn export_filename(title: &str, date: NaiveDate, kind: ExportKind) -> String {
    format!(
        "{}_{}.{}",
        sanitize_filename(title),
        date.format("%Y-%m-%d"),
        kind.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::sanitize_filename;

    #[test]
    fn sanitize_replaces_each_unsafe_char() {
        assert_eq!(sanitize_filename("Año 1: Intro"), "A_o_1__Intro");
    }

    #[test]
    fn astral_chars_take_two_underscores() {
        assert_eq!(sanitize_filename("Plan 🚀"), "Plan___");
    }

    #[test]
    fn empty_title_uses_fallback_stem() {
        assert_eq!(sanitize_filename(""), "abcld");
    }
}
