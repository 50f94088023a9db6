//! URL auto-linking inside plain text runs.

use once_cell::sync::Lazy;
use regex::Regex;

/// HTTP/HTTPS URL candidates: scheme, one character that cannot start a bare
/// terminator, then a greedy run of non-whitespace.
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://[^\s$.?#].[^\s]*").expect("valid URL pattern"));

/// Trailing characters never absorbed into a link target: whitespace and
/// sentence terminators, including full-width CJK comma and period.
fn is_trailing(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | ',' | ';' | '、' | '。')
}

/// Splits a regex match into the URL proper and its trailing punctuation.
fn split_trailing(candidate: &str) -> (&str, &str) {
    let url = candidate.trim_end_matches(is_trailing);
    (url, &candidate[url.len()..])
}

/// Wraps every URL-looking substring of `text` in a hyperlink that opens in a
/// new browsing context without handing the opened page a window reference.
///
/// Trailing punctuation stripped from a match is re-emitted after the closing
/// tag, so sentence punctuation never ends up inside the link target. When
/// `escape` is set, non-markup output (text runs, link text, the href value)
/// is HTML-escaped; when unset the text passes through verbatim, matching the
/// historical unescaped output.
pub fn autolink_urls(text: &str, escape: bool) -> String {
    let emit = |segment: &str, out: &mut String| {
        if escape {
            out.push_str(&html_escape::encode_text(segment));
        } else {
            out.push_str(segment);
        }
    };

    if !text.contains("://") {
        let mut out = String::new();
        emit(text, &mut out);
        return out;
    }

    let mut out = String::with_capacity(text.len() + 64);
    let mut cursor = 0;
    for candidate in URL_RE.find_iter(text) {
        emit(&text[cursor..candidate.start()], &mut out);
        cursor = candidate.end();

        let (url, trailing) = split_trailing(candidate.as_str());
        if url.is_empty() {
            emit(candidate.as_str(), &mut out);
            continue;
        }

        out.push_str("<a href=\"");
        if escape {
            out.push_str(&html_escape::encode_double_quoted_attribute(url));
        } else {
            out.push_str(url);
        }
        out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
        emit(url, &mut out);
        out.push_str("</a>");
        emit(trailing, &mut out);
    }
    emit(&text[cursor..], &mut out);
    out
}
