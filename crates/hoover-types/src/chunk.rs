/// Text pages are chunked to at most this many bytes (32 MiB), matching the
/// original plaintext/email/archive-child extractors.
pub const MAX_TEXT_PAGE_BYTES: usize = 32 * 1024 * 1024;

/// Chunk raw bytes into UTF-8 text pages of at most `max_bytes`, never
/// splitting inside a multi-byte code point. Invalid byte sequences are
/// replaced with the Unicode replacement character, matching Python's
/// `bytes.decode('utf-8', errors='replace')`.
pub fn chunk_utf8(bytes: &[u8], max_bytes: usize) -> Vec<String> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let text = String::from_utf8_lossy(bytes).into_owned();
    if text.is_empty() {
        return Vec::new();
    }

    let mut pages = Vec::new();
    let mut start = 0;
    let total = text.len();
    while start < total {
        let mut end = (start + max_bytes).min(total);
        // Never split a page in the middle of a multi-byte character.
        while end < total && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end <= start {
            // max_bytes smaller than a single code point; take one char.
            end = start + text[start..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
        }
        pages.push(text[start..end].to_string());
        start = end;
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_pages() {
        assert!(chunk_utf8(b"", MAX_TEXT_PAGE_BYTES).is_empty());
    }

    #[test]
    fn roundtrip_concatenation() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let pages = chunk_utf8(data, 10);
        let joined: String = pages.concat();
        assert_eq!(joined.as_bytes(), data);
    }

    #[test]
    fn never_exceeds_max_bytes() {
        let data = "a".repeat(100).into_bytes();
        for page in chunk_utf8(&data, 7) {
            assert!(page.len() <= 7);
        }
    }

    #[test]
    fn does_not_split_multibyte_chars() {
        let data = "日本語のテキスト".as_bytes();
        for max in 1..=5 {
            for page in chunk_utf8(data, max) {
                assert!(page.is_char_boundary(page.len()));
                assert!(std::str::from_utf8(page.as_bytes()).is_ok());
            }
        }
    }

    #[test]
    fn invalid_sequences_are_replaced() {
        let data = [0x68, 0x69, 0xff, 0xfe];
        let pages = chunk_utf8(&data, MAX_TEXT_PAGE_BYTES);
        let joined = pages.concat();
        assert!(joined.contains('\u{FFFD}'));
    }
}
