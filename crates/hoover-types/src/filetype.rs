use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse routing category. Fixed, total vocabulary -- see `coarse_file_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoarseType {
    Html,
    Archive,
    Doc,
    Xls,
    Ppt,
    Email,
    Image,
    Video,
    Audio,
    Pdf,
    Text,
    Other,
}

impl fmt::Display for CoarseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CoarseType::Html => "html",
            CoarseType::Archive => "archive",
            CoarseType::Doc => "doc",
            CoarseType::Xls => "xls",
            CoarseType::Ppt => "ppt",
            CoarseType::Email => "email",
            CoarseType::Image => "image",
            CoarseType::Video => "video",
            CoarseType::Audio => "audio",
            CoarseType::Pdf => "pdf",
            CoarseType::Text => "text",
            CoarseType::Other => "other",
        };
        f.write_str(s)
    }
}

const HTML: &[&str] = &["text/html", "application/xhtml+xml"];
const ARCHIVE: &[&str] = &[
    "application/zip",
    "application/x-tar",
    "application/gzip",
    "application/x-gzip",
    "application/x-bzip2",
    "application/x-7z-compressed",
    "application/x-rar-compressed",
    "application/vnd.rar",
    "application/x-xz",
];
const DOC: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.oasis.opendocument.text",
    "application/rtf",
];
const XLS: &[&str] = &[
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.oasis.opendocument.spreadsheet",
    "text/csv",
];
const PPT: &[&str] = &[
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.oasis.opendocument.presentation",
];
const EMAIL: &[&str] = &["message/rfc822", "application/vnd.ms-outlook"];

/// Pure, total mapping from a MIME type string to a coarse routing category.
///
/// Ported byte-for-byte from the original ingester's `coarse_file_type`:
/// exact-membership checks first (html/archive/doc/xls/ppt/email, plus an
/// `application/x-zip` prefix special-case folded into archive), then
/// prefix checks (image/video/audio/text), then `application/pdf` exactly,
/// defaulting to `other`.
pub fn coarse_file_type(mime_type: &str) -> CoarseType {
    let mime = mime_type.trim();
    if HTML.contains(&mime) {
        return CoarseType::Html;
    }
    if ARCHIVE.contains(&mime) || mime.starts_with("application/x-zip") {
        return CoarseType::Archive;
    }
    if DOC.contains(&mime) {
        return CoarseType::Doc;
    }
    if XLS.contains(&mime) {
        return CoarseType::Xls;
    }
    if PPT.contains(&mime) {
        return CoarseType::Ppt;
    }
    if EMAIL.contains(&mime) {
        return CoarseType::Email;
    }
    if mime.starts_with("image/") {
        return CoarseType::Image;
    }
    if mime.starts_with("video/") {
        return CoarseType::Video;
    }
    if mime.starts_with("audio/") {
        return CoarseType::Audio;
    }
    if mime == "application/pdf" {
        return CoarseType::Pdf;
    }
    if mime.starts_with("text/") {
        return CoarseType::Text;
    }
    CoarseType::Other
}

/// Map one of magika's own category names to our coarse vocabulary. Magika
/// speaks its own group names rather than MIME strings for some outputs;
/// those are remapped directly instead of being pushed back through
/// `coarse_file_type`.
pub fn coarse_type_from_magika_group(group: &str) -> CoarseType {
    match group {
        "document" => CoarseType::Doc,
        "unknown" => CoarseType::Other,
        other => coarse_file_type(other),
    }
}

/// Source of a `file_types` row, or of a text-extraction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractedBy {
    File,
    Tika,
    Magika,
    RawText,
    Extractous,
    EasyOcr,
    EmailParser,
    Qpdf,
}

impl fmt::Display for ExtractedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractedBy::File => "file",
            ExtractedBy::Tika => "tika",
            ExtractedBy::Magika => "magika",
            ExtractedBy::RawText => "raw_text",
            ExtractedBy::Extractous => "extractous",
            ExtractedBy::EasyOcr => "easyocr",
            ExtractedBy::EmailParser => "email_parser",
            ExtractedBy::Qpdf => "qpdf",
        };
        f.write_str(s)
    }
}

/// One detector's independent contribution for a blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeRow {
    pub collection_dataset: String,
    pub hash: String,
    pub extracted_by: ExtractedBy,
    pub mime_types: Vec<String>,
    pub mime_encodings: Vec<String>,
    pub file_types: Vec<CoarseType>,
    pub extensions: Vec<String>,
}

/// A single detector's in-memory result, before being persisted as a
/// `FileTypeRow`. Mirrors the `{mime_types[], mime_encodings[],
/// coarse_types[], extensions[]}` shape every detector activity returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub mime_types: Vec<String>,
    pub mime_encodings: Vec<String>,
    pub coarse_types: Vec<CoarseType>,
    pub extensions: Vec<String>,
}

impl DetectionResult {
    /// Union several detectors' results into one, deduplicating each field.
    /// Any number of detectors may have failed and contribute nothing.
    pub fn union(results: impl IntoIterator<Item = DetectionResult>) -> DetectionResult {
        let mut mime_types = std::collections::BTreeSet::new();
        let mut mime_encodings = std::collections::BTreeSet::new();
        let mut coarse_types = std::collections::BTreeSet::new();
        let mut extensions = std::collections::BTreeSet::new();
        for r in results {
            mime_types.extend(r.mime_types);
            mime_encodings.extend(r.mime_encodings);
            coarse_types.extend(r.coarse_types);
            extensions.extend(r.extensions);
        }
        DetectionResult {
            mime_types: mime_types.into_iter().collect(),
            mime_encodings: mime_encodings.into_iter().collect(),
            coarse_types: coarse_types.into_iter().collect(),
            extensions: extensions.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches() {
        assert_eq!(coarse_file_type("text/html"), CoarseType::Html);
        assert_eq!(coarse_file_type("application/xhtml+xml"), CoarseType::Html);
        assert_eq!(coarse_file_type("application/zip"), CoarseType::Archive);
        assert_eq!(
            coarse_file_type("application/x-zip-compressed"),
            CoarseType::Archive
        );
        assert_eq!(coarse_file_type("message/rfc822"), CoarseType::Email);
        assert_eq!(
            coarse_file_type("application/vnd.ms-outlook"),
            CoarseType::Email
        );
        assert_eq!(coarse_file_type("text/csv"), CoarseType::Xls);
    }

    #[test]
    fn prefix_matches() {
        assert_eq!(coarse_file_type("image/png"), CoarseType::Image);
        assert_eq!(coarse_file_type("video/mp4"), CoarseType::Video);
        assert_eq!(coarse_file_type("audio/mpeg"), CoarseType::Audio);
        assert_eq!(coarse_file_type("application/pdf"), CoarseType::Pdf);
        assert_eq!(coarse_file_type("text/plain"), CoarseType::Text);
    }

    #[test]
    fn default_is_other() {
        assert_eq!(
            coarse_file_type("application/octet-stream"),
            CoarseType::Other
        );
    }

    #[test]
    fn magika_group_remap() {
        assert_eq!(coarse_type_from_magika_group("document"), CoarseType::Doc);
        assert_eq!(coarse_type_from_magika_group("unknown"), CoarseType::Other);
    }

    #[test]
    fn union_deduplicates_and_is_resilient_to_missing_detectors() {
        let a = DetectionResult {
            mime_types: vec!["image/png".into()],
            coarse_types: vec![CoarseType::Image],
            ..Default::default()
        };
        let b = DetectionResult {
            mime_types: vec!["text/plain".into()],
            coarse_types: vec![CoarseType::Text, CoarseType::Image],
            ..Default::default()
        };
        let combined = DetectionResult::union(vec![a, b, DetectionResult::default()]);
        assert_eq!(combined.mime_types.len(), 2);
        assert!(combined.coarse_types.contains(&CoarseType::Image));
        assert!(combined.coarse_types.contains(&CoarseType::Text));
        assert_eq!(combined.coarse_types.len(), 2);
    }
}
