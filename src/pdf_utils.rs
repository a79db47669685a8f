//! Shared PDF parsing utilities used across multiple modules.

/// Decode a PDF text string.
///
/// Strings starting with the UTF-16BE byte order mark are decoded as UTF-16;
/// everything else is taken as UTF-8 when valid and as Latin-1 (close enough
/// to PDFDocEncoding for file names) otherwise.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Extract a string value from a PDF dictionary for a given key.
///
/// Returns `Some(String)` if the key exists and contains a valid non-empty string,
/// `None` otherwise.
pub fn extract_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|v| v.as_str().ok())
        .map(decode_text_string)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf16_with_bom() {
        let bytes = [0xFE, 0xFF, 0x00, b'a', 0x00, b'.', 0x00, b'p', 0x00, b'd', 0x00, b'f'];
        assert_eq!(decode_text_string(&bytes), "a.pdf");
    }

    #[test]
    fn falls_back_to_latin1() {
        assert_eq!(decode_text_string(&[b'r', 0xE9, b'.', b't', b'x', b't']), "ré.txt");
        assert_eq!(decode_text_string(b"notes.txt"), "notes.txt");
    }
}
