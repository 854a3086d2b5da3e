//! Locates the embedding `<script>` element in a host page.
use std::sync::OnceLock;

use html_escape::decode_html_entities;
use regex::Regex;

use crate::{Error, Result};

/// Attribute marking the script element as the tracker's configuration source. Its value is the
/// server URL.
pub const MARKER_ATTRIBUTE: &str = "data-ackee";

/// A `<script>` element and its attributes, as found in the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptElement {
    /// Attribute names are stored lowercased. Values are decoded.
    attributes: Vec<(String, String)>,
}

fn script_tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        // The tag name must be followed by a separator, so `<scripts>` or `<script-x>` don't match.
        Regex::new(r"(?i)<script[\s/>]").expect("script tag regex is valid")
    })
}

const TAG_NAME_LEN: usize = "<script".len();

impl ScriptElement {
    /// Find the first `<script>` element carrying the [`MARKER_ATTRIBUTE`].
    ///
    /// ```
    /// # use ackee_tracker::ScriptElement;
    /// let html = r#"<script async data-ackee="https://ackee.example" src="tracker.js"></script>"#;
    /// let element = ScriptElement::find(html).unwrap();
    /// assert_eq!(element.attribute("data-ackee"), Some("https://ackee.example"));
    /// ```
    pub fn find(html: &str) -> Result<ScriptElement> {
        script_tag_regex()
            .find_iter(html)
            .filter_map(|tag| ScriptElement::parse_attributes(&html[tag.start() + TAG_NAME_LEN..]))
            .find(|element| element.has_attribute(MARKER_ATTRIBUTE))
            .ok_or(Error::ScriptElementNotFound)
    }

    /// Tokenize the attributes following a tag name, up to the closing `>`, the way browsers do.
    ///
    /// Returns `None` if the tag is never closed.
    fn parse_attributes(source: &str) -> Option<ScriptElement> {
        let bytes = source.as_bytes();
        let skip_whitespace = |mut i: usize| {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            i
        };

        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut i = 0;
        loop {
            while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
                i += 1;
            }
            match bytes.get(i) {
                None => return None,
                Some(b'>') => return Some(ScriptElement { attributes }),
                Some(_) => {}
            }

            // The first character always belongs to the name, even if it is `=`.
            let name_start = i;
            i += 1;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'/' | b'>' | b'=')
            {
                i += 1;
            }
            let name = source[name_start..i].to_ascii_lowercase();

            let mut value = String::new();
            let after_name = skip_whitespace(i);
            if bytes.get(after_name) == Some(&b'=') {
                i = skip_whitespace(after_name + 1);
                match bytes.get(i) {
                    Some(&quote) if quote == b'"' || quote == b'\'' => {
                        let start = i + 1;
                        let end = start + source[start..].find(quote as char)?;
                        value = decode_html_entities(&source[start..end]).into_owned();
                        i = end + 1;
                    }
                    _ => {
                        // Unquoted values keep quotes and `=`, ending only at whitespace or `>`.
                        let start = i;
                        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                        {
                            i += 1;
                        }
                        value = decode_html_entities(&source[start..i]).into_owned();
                    }
                }
            }

            // Browsers keep the first occurrence of a duplicated attribute.
            if !attributes.iter().any(|(existing, _)| *existing == name) {
                attributes.push((name, value));
            }
        }
    }

    /// Get the value of an attribute. Names are compared case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the element carries the attribute, with or without a value.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::ScriptElement;
    use crate::Error;

    #[test]
    fn finds_marked_script_among_others() {
        let html = r#"
            <html><head>
              <script src="/app.js"></script>
              <script async src="https://ackee.example/tracker.js"
                      data-ackee="https://ackee.example/"
                      data-userId="u1"
                      data-domainId="d1"></script>
            </head></html>
        "#;

        let element = ScriptElement::find(html).unwrap();

        assert_eq!(element.attribute("data-ackee"), Some("https://ackee.example/"));
        assert_eq!(element.attribute("data-userid"), Some("u1"));
        assert_eq!(element.attribute("data-domainId"), Some("d1"));
        assert_eq!(element.attribute("src"), Some("https://ackee.example/tracker.js"));
    }

    #[test]
    fn returns_first_marked_script() {
        let html = r#"<script data-ackee="https://first.example"></script>
                      <script data-ackee="https://second.example"></script>"#;

        let element = ScriptElement::find(html).unwrap();

        assert_eq!(element.attribute("data-ackee"), Some("https://first.example"));
    }

    #[test]
    fn accepts_single_quoted_and_unquoted_values() {
        let html = "<SCRIPT DATA-ACKEE='https://ackee.example' data-userId=u1 defer></SCRIPT>";

        let element = ScriptElement::find(html).unwrap();

        assert_eq!(element.attribute("data-ackee"), Some("https://ackee.example"));
        assert_eq!(element.attribute("data-userId"), Some("u1"));
        assert_eq!(element.attribute("defer"), Some(""));
    }

    #[test]
    fn quoted_values_may_contain_angle_brackets() {
        let html = r#"<script data-title="a > b" data-ackee="https://ackee.example"></script>"#;

        let element = ScriptElement::find(html).unwrap();

        assert_eq!(element.attribute("data-title"), Some("a > b"));
        assert_eq!(element.attribute("data-ackee"), Some("https://ackee.example"));
    }

    #[test]
    fn decodes_character_references() {
        let html = r#"<script data-ackee="https://ackee.example/?a=1&amp;b=2" data-userId="&amp;lt;"></script>"#;

        let element = ScriptElement::find(html).unwrap();

        assert_eq!(element.attribute("data-ackee"), Some("https://ackee.example/?a=1&b=2"));
        assert_eq!(element.attribute("data-userId"), Some("&lt;"));
    }

    #[test]
    fn unquoted_values_run_to_whitespace() {
        let html = "<script data-ackee=https://a.example/?site=1 data-title=it's>";

        let element = ScriptElement::find(html).unwrap();

        assert_eq!(element.attribute("data-ackee"), Some("https://a.example/?site=1"));
        assert_eq!(element.attribute("data-title"), Some("it's"));
    }

    #[test]
    fn decodes_numeric_character_references() {
        let html = r#"<script data-ackee="https:&#x2F;&#x2F;a.example&#47;" data-userId=u&#49;></script>"#;

        let element = ScriptElement::find(html).unwrap();

        assert_eq!(element.attribute("data-ackee"), Some("https://a.example/"));
        assert_eq!(element.attribute("data-userId"), Some("u1"));
    }

    #[test]
    fn skips_unclosed_tags() {
        let html = r#"<script data-ackee="https://a.example"#;

        assert!(matches!(
            ScriptElement::find(html),
            Err(Error::ScriptElementNotFound)
        ));
    }

    #[test]
    fn keeps_first_duplicated_attribute() {
        let html = r#"<script data-ackee="https://a.example" data-ackee="https://b.example"></script>"#;

        let element = ScriptElement::find(html).unwrap();

        assert_eq!(element.attribute("data-ackee"), Some("https://a.example"));
    }

    #[test]
    fn fails_without_marked_script() {
        let html = r#"<script src="/app.js"></script><div data-ackee="x"></div>"#;

        assert!(matches!(
            ScriptElement::find(html),
            Err(Error::ScriptElementNotFound)
        ));
    }

    #[test]
    fn does_not_match_similar_tag_names() {
        let html = r#"<scripts data-ackee="https://ackee.example"></scripts>"#;

        assert!(matches!(
            ScriptElement::find(html),
            Err(Error::ScriptElementNotFound)
        ));
    }
}
