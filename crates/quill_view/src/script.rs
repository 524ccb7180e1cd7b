//! Script inclusion before the closing head marker.

use tracing::debug;

/// Marker the script lines are inserted in front of.
pub const HEAD_CLOSE: &str = "</head>";

/// The inclusion line for one script URL.
pub fn script_line(url: &str) -> String {
    format!("<script src=\"{}\"></script>\r\n", url)
}

/// Insert one `<script>` line per URL before [`HEAD_CLOSE`].
///
/// Lines already present in the document are not inserted again, so an
/// already merged document passes through unchanged.
pub fn inject_scripts(text: &str, scripts: &[String]) -> String {
    if scripts.is_empty() || !text.contains(HEAD_CLOSE) {
        return text.to_string();
    }

    let js: String = scripts
        .iter()
        .map(|url| script_line(url))
        .filter(|line| !text.contains(line.as_str()))
        .collect();

    if js.is_empty() {
        return text.to_string();
    }
    debug!("Injecting {} byte(s) of script tags", js.len());
    text.replace(HEAD_CLOSE, &format!("{}{}", js, HEAD_CLOSE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_head_close() {
        let scripts = vec!["/js/a.js".to_string(), "/js/b.js".to_string()];
        let out = inject_scripts("<head><title>t</title></head><body/>", &scripts);
        assert_eq!(
            out,
            "<head><title>t</title><script src=\"/js/a.js\"></script>\r\n<script src=\"/js/b.js\"></script>\r\n</head><body/>"
        );
        assert_eq!(inject_scripts(&out, &scripts), out);
    }

    #[test]
    fn test_noop_without_marker_or_scripts() {
        let scripts = vec!["/js/a.js".to_string()];
        assert_eq!(inject_scripts("<body/>", &scripts), "<body/>");
        assert_eq!(inject_scripts("<head></head>", &[]), "<head></head>");
    }
}
