//! Reference scanner: locate asset references in document text and rewrite
//! them in place.
//!
//! Only the URL span of each match is replaced; all surrounding text is
//! reproduced byte-for-byte. Documents that cannot be tokenized (unterminated
//! tag, quote, comment or `url()` call) fail with a [`ScanError`] and are left
//! unchanged by the caller - a scan failure never aborts a batch.

use std::ops::Range;

use thiserror::Error;

use super::rules::{DocumentKind, RuleSet};

/// Tokenization failure for a single document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("unterminated tag at byte {0}")]
    UnterminatedTag(usize),

    #[error("unterminated attribute value at byte {0}")]
    UnterminatedAttribute(usize),

    #[error("unterminated comment at byte {0}")]
    UnterminatedComment(usize),

    #[error("unterminated string at byte {0}")]
    UnterminatedString(usize),

    #[error("unterminated url() at byte {0}")]
    UnterminatedUrl(usize),
}

/// Scan a document and rewrite every reference matched by the rule set.
///
/// `rewriter` is the pure URL canonicalization function; passing the identity
/// function reproduces the document byte-for-byte.
pub fn scan<F>(
    kind: DocumentKind,
    text: &str,
    rules: &RuleSet,
    rewriter: F,
) -> Result<String, ScanError>
where
    F: Fn(&str) -> String,
{
    let spans = match kind {
        DocumentKind::Markup => scan_markup(text, rules)?,
        DocumentKind::Stylesheet => scan_stylesheet(text)?,
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.start]);
        out.push_str(&rewriter(&text[span.clone()]));
        last = span.end;
    }
    out.push_str(&text[last..]);
    Ok(out)
}

// ============================================================================
// Markup
// ============================================================================

/// Collect URL spans for every rule-matched tag attribute, in document order.
fn scan_markup(text: &str, rules: &RuleSet) -> Result<Vec<Range<usize>>, ScanError> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let tag_open = i;

        // Comments: skip to -->
        if text[i..].starts_with("<!--") {
            match text[i + 4..].find("-->") {
                Some(idx) => {
                    i = i + 4 + idx + 3;
                    continue;
                }
                None => return Err(ScanError::UnterminatedComment(tag_open)),
            }
        }

        // Doctype, closing tags, processing instructions: skip to >
        if matches!(bytes.get(i + 1), Some(b'!' | b'/' | b'?')) {
            match text[i..].find('>') {
                Some(idx) => {
                    i += idx + 1;
                    continue;
                }
                None => return Err(ScanError::UnterminatedTag(tag_open)),
            }
        }

        // Not a tag start: bare '<' in text (e.g. "a < b")
        let Some(first) = bytes.get(i + 1) else {
            i += 1;
            continue;
        };
        if !first.is_ascii_alphabetic() {
            i += 1;
            continue;
        }

        // Tag name
        let name_start = i + 1;
        let mut j = name_start;
        while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'-') {
            j += 1;
        }
        let tag = &text[name_start..j];
        i = j;

        // Fast path: no rule targets this tag, still must tokenize to the
        // closing '>' so attribute quotes can't confuse the outer loop.
        let wanted = rules.has_tag(tag);

        // Attributes
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(ScanError::UnterminatedTag(tag_open));
            }
            match bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' => {
                    i += 1;
                    continue;
                }
                _ => {}
            }

            // Attribute name
            let attr_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            if i == attr_start {
                // Stray byte (e.g. a lone quote) - step over it
                i += 1;
                continue;
            }
            let attr = &text[attr_start..i];

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(ScanError::UnterminatedTag(tag_open));
            }
            if bytes[i] != b'=' {
                // Boolean attribute
                continue;
            }
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(ScanError::UnterminatedTag(tag_open));
            }

            // Attribute value: quoted or unquoted
            let (val_start, val_end) = if bytes[i] == b'"' || bytes[i] == b'\'' {
                let quote = bytes[i] as char;
                let vs = i + 1;
                match text[vs..].find(quote) {
                    Some(idx) => {
                        let ve = vs + idx;
                        i = ve + 1;
                        (vs, ve)
                    }
                    None => return Err(ScanError::UnterminatedAttribute(attr_start)),
                }
            } else {
                let vs = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                (vs, i)
            };

            if wanted && rules.matches(tag, attr) {
                spans.push(val_start..val_end);
            }
        }

        // Raw-text elements: their body is not markup, skip to the close tag
        if tag.eq_ignore_ascii_case("script") || tag.eq_ignore_ascii_case("style") {
            let close = format!("</{}", tag.to_ascii_lowercase());
            match find_ignore_ascii_case(&text[i..], &close) {
                Some(idx) => i += idx,
                None => i = bytes.len(),
            }
        }
    }

    Ok(spans)
}

/// Case-insensitive (ASCII) substring search.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

// ============================================================================
// Stylesheet
// ============================================================================

/// Collect URL spans for every `url(...)` call outside comments and strings.
fn scan_stylesheet(text: &str) -> Result<Vec<Range<usize>>, ScanError> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => match text[i + 2..].find("*/") {
                Some(idx) => i = i + 2 + idx + 2,
                None => return Err(ScanError::UnterminatedComment(i)),
            },
            b'"' | b'\'' => {
                let quote = bytes[i];
                let start = i;
                i += 1;
                loop {
                    if i >= bytes.len() {
                        return Err(ScanError::UnterminatedString(start));
                    }
                    match bytes[i] {
                        b'\\' => i += 2,
                        b if b == quote => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
            }
            b'u' | b'U' if is_url_call(bytes, i) => {
                let call_start = i;
                i += 4; // past "url("
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(ScanError::UnterminatedUrl(call_start));
                }

                if bytes[i] == b'"' || bytes[i] == b'\'' {
                    let quote = bytes[i];
                    let vs = i + 1;
                    let mut j = vs;
                    loop {
                        if j >= bytes.len() {
                            return Err(ScanError::UnterminatedString(vs - 1));
                        }
                        match bytes[j] {
                            b'\\' => j += 2,
                            b if b == quote => break,
                            _ => j += 1,
                        }
                    }
                    spans.push(vs..j);
                    i = j + 1;
                    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    if i >= bytes.len() || bytes[i] != b')' {
                        return Err(ScanError::UnterminatedUrl(call_start));
                    }
                    i += 1;
                } else {
                    let vs = i;
                    while i < bytes.len() && bytes[i] != b')' {
                        i += 1;
                    }
                    if i >= bytes.len() {
                        return Err(ScanError::UnterminatedUrl(call_start));
                    }
                    let mut ve = i;
                    while ve > vs && bytes[ve - 1].is_ascii_whitespace() {
                        ve -= 1;
                    }
                    spans.push(vs..ve);
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    Ok(spans)
}

/// Whether `url(` starts at `i` on an identifier boundary (so `hurl(`,
/// `-url(` and similar identifiers are not misread as calls).
fn is_url_call(bytes: &[u8], i: usize) -> bool {
    if i + 4 > bytes.len() || !bytes[i..i + 3].eq_ignore_ascii_case(b"url") || bytes[i + 3] != b'('
    {
        return false;
    }
    if i > 0 {
        let prev = bytes[i - 1];
        if prev.is_ascii_alphanumeric() || prev == b'_' || prev == b'-' {
            return false;
        }
    }
    true
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(url: &str) -> String {
        url.to_string()
    }

    fn upper(url: &str) -> String {
        url.to_ascii_uppercase()
    }

    // ------------------------------------------------------------------------
    // Markup
    // ------------------------------------------------------------------------

    #[test]
    fn test_markup_identity_roundtrip() {
        let doc = r#"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="../styles/main.scss">
  <script src='scripts/app.js' defer></script>
</head>
<body>
  <img src="../asset/photo.PNG" alt="a < b">
  <video src="clip.mp4" poster="cover.jpg" controls></video>
</body>
</html>"#;
        let out = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), identity).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn test_markup_rewrites_only_url_span() {
        let doc = r#"<img src="photo.png" alt="photo.png">"#;
        let out = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), upper).unwrap();
        // alt is not in the rule set: only the src value changes
        assert_eq!(out, r#"<img src="PHOTO.PNG" alt="photo.png">"#);
    }

    #[test]
    fn test_markup_multiple_rules_same_tag() {
        let doc = r#"<video src="a.mp4" poster="b.jpg"></video>"#;
        let out = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(out, r#"<video src="A.MP4" poster="B.JPG"></video>"#);
    }

    #[test]
    fn test_markup_single_quotes_preserved() {
        let doc = "<script src='app.js'></script>";
        let out = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(out, "<script src='APP.JS'></script>");
    }

    #[test]
    fn test_markup_unquoted_value() {
        let doc = "<img src=photo.png alt=x>";
        let out = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(out, "<img src=PHOTO.PNG alt=x>");
    }

    #[test]
    fn test_markup_unmatched_tag_untouched() {
        let doc = r#"<a href="page.html">x</a><div data-src="y.png"></div>"#;
        let out = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn test_markup_comment_untouched() {
        let doc = r#"<!-- <img src="old.png"> --><img src="new.png">"#;
        let out = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(out, r#"<!-- <img src="old.png"> --><img src="NEW.PNG">"#);
    }

    #[test]
    fn test_markup_script_body_skipped() {
        let doc = "<script src=\"app.js\">if (a<img) { src=\"x.png\" }</script>";
        let out = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(
            out,
            "<script src=\"APP.JS\">if (a<img) { src=\"x.png\" }</script>"
        );
    }

    #[test]
    fn test_markup_case_insensitive_tags() {
        let doc = r#"<IMG SRC="photo.png">"#;
        let out = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(out, r#"<IMG SRC="PHOTO.PNG">"#);
    }

    #[test]
    fn test_markup_unterminated_tag_errors() {
        let doc = r#"<img src="photo.png"#;
        let err = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), identity).unwrap_err();
        assert!(matches!(err, ScanError::UnterminatedAttribute(_)));

        let doc = "<img src=x";
        let err = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), identity).unwrap_err();
        assert!(matches!(err, ScanError::UnterminatedTag(_)));
    }

    #[test]
    fn test_markup_unterminated_comment_errors() {
        let doc = "<!-- never closed";
        let err = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), identity).unwrap_err();
        assert!(matches!(err, ScanError::UnterminatedComment(_)));
    }

    #[test]
    fn test_markup_bare_less_than_is_text() {
        let doc = "<p>1 < 2 and 3 > 2</p>";
        let out = scan(DocumentKind::Markup, doc, &RuleSet::defaults(), identity).unwrap();
        assert_eq!(out, doc);
    }

    // ------------------------------------------------------------------------
    // Stylesheet
    // ------------------------------------------------------------------------

    #[test]
    fn test_css_identity_roundtrip() {
        let doc = r#"/* banner url(skip.png) */
@font-face {
  font-family: "Star";
  src: url('icons/star.svg?v=3') format("svg"),
       url(fonts/star.woff2) format("woff2");
}
.hero { background: url( "img/hero.jpg" ); }
"#;
        let out = scan(DocumentKind::Stylesheet, doc, &RuleSet::defaults(), identity).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn test_css_rewrites_quoted_and_unquoted() {
        let doc = ".a { background: url('x.png'); border-image: url(y.png); }";
        let out = scan(DocumentKind::Stylesheet, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(
            out,
            ".a { background: url('X.PNG'); border-image: url(Y.PNG); }"
        );
    }

    #[test]
    fn test_css_comment_untouched() {
        let doc = "/* url(skip.png) */ .a { background: url(real.png); }";
        let out = scan(DocumentKind::Stylesheet, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(out, "/* url(skip.png) */ .a { background: url(REAL.PNG); }");
    }

    #[test]
    fn test_css_string_untouched() {
        let doc = r#".a::before { content: "url(fake.png)"; background: url(real.png); }"#;
        let out = scan(DocumentKind::Stylesheet, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(
            out,
            r#".a::before { content: "url(fake.png)"; background: url(REAL.PNG); }"#
        );
    }

    #[test]
    fn test_css_identifier_not_confused_with_url() {
        let doc = ".a { cursor: hurl(x); -moz-url(y); }";
        let out = scan(DocumentKind::Stylesheet, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn test_css_unquoted_whitespace_trimmed_span() {
        let doc = ".a { background: url(  img/x.png  ); }";
        let out = scan(DocumentKind::Stylesheet, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(out, ".a { background: url(  IMG/X.PNG  ); }");
    }

    #[test]
    fn test_css_unterminated_errors() {
        let err = scan(
            DocumentKind::Stylesheet,
            "/* open comment",
            &RuleSet::defaults(),
            identity,
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::UnterminatedComment(_)));

        let err = scan(
            DocumentKind::Stylesheet,
            ".a { background: url('x.png; }",
            &RuleSet::defaults(),
            identity,
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::UnterminatedString(_)));

        let err = scan(
            DocumentKind::Stylesheet,
            ".a { background: url(x.png; }",
            &RuleSet::defaults(),
            identity,
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::UnterminatedUrl(_)));
    }

    #[test]
    fn test_css_escaped_quote_in_string() {
        let doc = r#".a::before { content: "a \" b"; background: url(x.png); }"#;
        let out = scan(DocumentKind::Stylesheet, doc, &RuleSet::defaults(), upper).unwrap();
        assert_eq!(
            out,
            r#".a::before { content: "a \" b"; background: url(X.PNG); }"#
        );
    }
}
