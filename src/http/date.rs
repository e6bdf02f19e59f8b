//! HTTP date handling for `Last-Modified` / `If-Modified-Since`

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Format as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whether a file modified at `modified` is unchanged since the client's
/// `If-Modified-Since` value. HTTP dates carry whole seconds only.
pub fn not_modified_since(modified: SystemTime, if_modified_since: &str) -> bool {
    let Some(since) = parse_http_date(if_modified_since) else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_format() {
        let t = UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(format_http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_parse_round_trip() {
        let parsed = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(parsed.timestamp(), 784_111_777);
        assert!(parse_http_date("yesterday").is_none());
    }

    #[test]
    fn test_not_modified_since() {
        // Sub-second precision of the file time is ignored
        let modified = UNIX_EPOCH + Duration::from_millis(784_111_777_400);
        assert!(not_modified_since(modified, "Sun, 06 Nov 1994 08:49:37 GMT"));
        assert!(not_modified_since(modified, "Mon, 07 Nov 1994 08:49:37 GMT"));
        assert!(!not_modified_since(modified, "Sun, 06 Nov 1994 08:49:36 GMT"));
        assert!(!not_modified_since(modified, "garbage"));
    }
}
