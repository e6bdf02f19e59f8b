//! Request path decoding
//!
//! Turns the raw request path into filesystem segments below the document
//! root, and encodes file names back into hrefs for directory listings.

#[derive(Debug, PartialEq, Eq)]
pub enum PathError {
    /// Not valid UTF-8 after decoding, or contains NUL
    Malformed,
    /// A `..` segment would leave the document root
    OutsideRoot,
}

/// Decode `%XX` escapes; malformed escapes are kept literally
pub fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Split a raw request path into decoded segments relative to the root.
///
/// Empty and `.` segments are dropped.
pub fn request_segments(raw_path: &str) -> Result<Vec<String>, PathError> {
    let decoded = String::from_utf8(percent_decode(raw_path)).map_err(|_| PathError::Malformed)?;
    if decoded.contains('\0') {
        return Err(PathError::Malformed);
    }

    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(PathError::OutsideRoot),
            s => segments.push(s.to_string()),
        }
    }
    Ok(segments)
}

/// Percent-encode a file name for use in an href; `/` stays literal
pub fn encode_href(name: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(name.len());
    for &b in name.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'/') {
            out.push(char::from(b));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(b >> 4)]));
            out.push(char::from(HEX[usize::from(b & 0x0f)]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("/a%20b.txt"), b"/a b.txt");
        assert_eq!(percent_decode("%e4%bd%a0"), "你".as_bytes());
        // Malformed escapes pass through untouched
        assert_eq!(percent_decode("100%"), b"100%");
        assert_eq!(percent_decode("%zz%4"), b"%zz%4");
    }

    #[test]
    fn test_segments() {
        assert_eq!(request_segments("/").unwrap(), Vec::<String>::new());
        assert_eq!(
            request_segments("/assets//./gtr.stl").unwrap(),
            vec!["assets", "gtr.stl"]
        );
        assert_eq!(request_segments("/my%20dir/").unwrap(), vec!["my dir"]);
    }

    #[test]
    fn test_traversal_rejected() {
        assert_eq!(request_segments("/../etc/passwd"), Err(PathError::OutsideRoot));
        assert_eq!(request_segments("/a/%2e%2e/b"), Err(PathError::OutsideRoot));
        assert_eq!(request_segments("/a/%2E%2E"), Err(PathError::OutsideRoot));
    }

    #[test]
    fn test_malformed_rejected() {
        assert_eq!(request_segments("/a%00b"), Err(PathError::Malformed));
        assert_eq!(request_segments("/%ff"), Err(PathError::Malformed));
    }

    #[test]
    fn test_encode_href() {
        assert_eq!(encode_href("a.txt"), "a.txt");
        assert_eq!(encode_href("my dir/"), "my%20dir/");
        assert_eq!(encode_href("a&b#c?.txt"), "a%26b%23c%3F.txt");
        assert_eq!(encode_href("é"), "%C3%A9");
    }
}
