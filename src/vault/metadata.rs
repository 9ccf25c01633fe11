use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Raw frontmatter structure for parsing.
#[derive(Deserialize, Debug, Clone, Default)]
struct RawFrontmatter {
    #[serde(default)]
    redirect: Option<serde_yaml::Value>,
}

/// Parsed metadata from Markdown frontmatter.
#[derive(Debug, Clone, PartialEq)]
pub struct MDMetadata {
    redirect: Option<serde_yaml::Value>,
    /// Byte span of the whole block, fences included
    span: Range<usize>,
}

impl MDMetadata {
    pub fn new(text: &str) -> Option<MDMetadata> {
        // find text between --- at the beginning of the file

        static RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\A---\r?\n(?<metadata>(?s:.*?))\r?\n---[ \t]*(\r?\n|\z)").unwrap()
        });

        let captures = RE.captures(text)?;
        let block = captures.get(0)?;
        let metadata_match = captures.name("metadata")?;

        let raw: RawFrontmatter = match metadata_match.as_str().trim() {
            "" => RawFrontmatter::default(),
            yaml => serde_yaml::from_str(yaml).ok()?,
        };

        Some(MDMetadata {
            redirect: raw.redirect,
            span: block.range(),
        })
    }

    /// The raw value of the `redirect` key, if present.
    pub fn redirect(&self) -> Option<&serde_yaml::Value> {
        self.redirect.as_ref()
    }

    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::vault::metadata::MDMetadata;
    use serde_yaml::Value;

    #[test]
    fn test_redirect_bool() {
        let metadata = MDMetadata::new("---\nredirect: true\n---\n[[target]]").unwrap();
        assert_eq!(metadata.redirect(), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_redirect_string_stays_a_string() {
        let metadata = MDMetadata::new("---\nredirect: \"true\"\n---\n").unwrap();
        assert_eq!(metadata.redirect(), Some(&Value::String("true".into())));
    }

    #[test]
    fn test_crlf_frontmatter() {
        let metadata = MDMetadata::new("---\r\nredirect: true\r\n---\r\nbody").unwrap();
        assert_eq!(metadata.redirect(), Some(&Value::Bool(true)));
        assert_eq!(metadata.span(), 0..26);
    }

    #[test]
    fn test_other_keys_only() {
        let metadata = MDMetadata::new("---\naliases: [\"alias1\", \"alias2\"]\n---").unwrap();
        assert_eq!(metadata.redirect(), None);
    }

    #[test]
    fn test_no_frontmatter() {
        assert!(MDMetadata::new("# Title\n---\nredirect: true\n---").is_none());
    }

    #[test]
    fn test_invalid_yaml_is_ignored() {
        assert!(MDMetadata::new("---\nredirect: [unclosed\n---\n").is_none());
    }
}
