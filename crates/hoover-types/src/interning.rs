use std::fmt;

/// Per-field namespace for the string-term interner. Each field gets its own
/// `(value -> id)` / `(id -> value)` table pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringTermField {
    Ner,
    FileType,
    MimeType,
    Extension,
    ParentPaths,
}

impl fmt::Display for StringTermField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StringTermField::Ner => "ner",
            StringTermField::FileType => "filetype",
            StringTermField::MimeType => "mime_type",
            StringTermField::Extension => "extension",
            StringTermField::ParentPaths => "parent_paths",
        };
        f.write_str(s)
    }
}

/// Stable, non-cryptographic 63-bit term ID.
///
/// Ported from the original indexer's `hash_string_to_uint63`:
/// `(crc32(utf8) | (adler32(utf8) << 31)) mod 2^63`. Collisions are accepted
/// as-is; the interner re-checks existing mappings before insert rather than
/// relying on this being collision-free (see DESIGN.md open questions).
pub fn hash_string_to_uint63(value: &str) -> u64 {
    let bytes = value.as_bytes();
    let crc = crc32fast::hash(bytes) as u64;
    let adler = adler32::adler32(bytes).unwrap_or(1) as u64;
    let combined = crc | (adler << 31);
    combined % (1u64 << 63)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_and_in_range() {
        let a = hash_string_to_uint63("hello world");
        let b = hash_string_to_uint63("hello world");
        assert_eq!(a, b);
        assert!(a < (1u64 << 63));
    }

    #[test]
    fn different_inputs_differ() {
        assert_ne!(
            hash_string_to_uint63("alice"),
            hash_string_to_uint63("bob")
        );
    }

    #[test]
    fn field_names_match_original_schema() {
        assert_eq!(StringTermField::Ner.to_string(), "ner");
        assert_eq!(StringTermField::ParentPaths.to_string(), "parent_paths");
    }
}
