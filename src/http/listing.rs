//! Directory listing markup

use super::path::encode_href;

#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub name: String,
    /// Directory, or a symlink pointing at one
    pub is_dir: bool,
    pub is_symlink: bool,
}

/// Render the HTML index for a directory.
///
/// `display_path` is the decoded request path. Entries are sorted
/// case-insensitively; directories get a trailing `/` and symlinks an `@`
/// in place of it. A directory link always ends in `/`.
pub fn render_listing(display_path: &str, entries: &mut [ListingEntry]) -> String {
    entries.sort_by_cached_key(|e| e.name.to_lowercase());

    let title = format!("Directory listing for {}", escape_html(display_path));
    let mut html = format!(
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );

    for entry in entries.iter() {
        let mut link = entry.name.clone();
        let mut display = entry.name.clone();
        if entry.is_dir {
            link.push('/');
            display.push('/');
        }
        // A symlink shows only `@`, even when it points at a directory
        if entry.is_symlink {
            display = format!("{}@", entry.name);
        }
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_html(&encode_href(&link)),
            escape_html(&display)
        ));
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool, is_symlink: bool) -> ListingEntry {
        ListingEntry {
            name: name.to_string(),
            is_dir,
            is_symlink,
        }
    }

    #[test]
    fn test_sorted_case_insensitive() {
        let mut entries = vec![
            entry("b.txt", false, false),
            entry("Assets", true, false),
            entry("a.txt", false, false),
        ];
        let html = render_listing("/", &mut entries);
        let a = html.find(">a.txt<").unwrap();
        let assets = html.find(">Assets/<").unwrap();
        let b = html.find(">b.txt<").unwrap();
        assert!(a < assets && assets < b);
        assert!(html.contains("<title>Directory listing for /</title>"));
    }

    #[test]
    fn test_markers_and_links() {
        let mut entries = vec![
            entry("docs", true, false),
            entry("latest", false, true),
            entry("my file.txt", false, false),
        ];
        let html = render_listing("/sub/", &mut entries);
        assert!(html.contains("<li><a href=\"docs/\">docs/</a></li>"));
        assert!(html.contains("<li><a href=\"latest\">latest@</a></li>"));
        assert!(html.contains("<li><a href=\"my%20file.txt\">my file.txt</a></li>"));
    }

    #[test]
    fn test_symlink_to_directory() {
        let mut entries = vec![entry("current", true, true)];
        let html = render_listing("/", &mut entries);
        assert!(html.contains("<li><a href=\"current/\">current@</a></li>"));
        assert!(!html.contains("current/@"));
    }

    #[test]
    fn test_names_escaped() {
        let mut entries = vec![entry("<script>.js", false, false)];
        let html = render_listing("/a&b/", &mut entries);
        assert!(html.contains("Directory listing for /a&amp;b/"));
        assert!(html.contains(">&lt;script&gt;.js<"));
        assert!(!html.contains("<script>"));
    }
}
