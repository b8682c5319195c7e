//! XML text helpers

use std::borrow::Cow;

use crate::error::{XlsxError, XlsxResult};

/// What to do with characters XML 1.0 cannot represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidCharacters {
    /// Drop them and log a warning
    #[default]
    Strip,
    /// Fail the write
    Reject,
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Apply the invalid-character policy to `text`
///
/// `context` names where the text came from, for the warning or error.
pub(crate) fn sanitize<'a>(
    text: &'a str,
    policy: InvalidCharacters,
    context: impl FnOnce() -> String,
) -> XlsxResult<Cow<'a, str>> {
    let Some(bad) = text.chars().find(|&c| !is_xml_char(c)) else {
        return Ok(Cow::Borrowed(text));
    };

    match policy {
        InvalidCharacters::Reject => Err(XlsxError::InvalidCharacter {
            code: bad as u32,
            context: context(),
        }),
        InvalidCharacters::Strip => {
            let cleaned: String = text.chars().filter(|&c| is_xml_char(c)).collect();
            log::warn!(
                "dropped {} invalid XML character(s) from {}",
                text.chars().count() - cleaned.chars().count(),
                context()
            );
            Ok(Cow::Owned(cleaned))
        }
    }
}

/// Escape text content
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>']) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    )
}

/// Escape an attribute value (double-quoted)
pub(crate) fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
}

/// Opening `<t>` tag, preserving significant whitespace
pub(crate) fn text_open_tag(s: &str) -> &'static str {
    let needs_preserve = s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace);
    if needs_preserve {
        "<t xml:space=\"preserve\">"
    } else {
        "<t>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert!(matches!(escape_text("plain"), Cow::Borrowed(_)));
        assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn test_sanitize_strip() {
        let out = sanitize("a\u{1}b\u{B}c", InvalidCharacters::Strip, || "cell A1".into()).unwrap();
        assert_eq!(out, "abc");
        let out = sanitize("tab\tok", InvalidCharacters::Strip, || "cell A1".into()).unwrap();
        assert!(matches!(out, Cow::Borrowed("tab\tok")));
    }

    #[test]
    fn test_sanitize_reject() {
        let err = sanitize("x\u{0}", InvalidCharacters::Reject, || "cell B2".into()).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::InvalidCharacter { code: 0, ref context } if context == "cell B2"
        ));
    }

    #[test]
    fn test_preserve_whitespace() {
        assert_eq!(text_open_tag(" lead"), "<t xml:space=\"preserve\">");
        assert_eq!(text_open_tag("inner space"), "<t>");
    }
}
