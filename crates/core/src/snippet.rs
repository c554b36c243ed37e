use serde::{Deserialize, Serialize};

/// A fragment of source code with its provenance
///
/// Optional fields are always serialized, as `null` when absent, and must be
/// present when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snippet {
    /// Display label (not required to be unique)
    pub name: String,

    /// The code itself, possibly spanning several lines
    pub content: String,

    /// Language tag (e.g., "python", "rust")
    #[serde(deserialize_with = "Option::deserialize")]
    pub lang: Option<String>,

    /// Line of the originating file where `content` starts (1-indexed)
    #[serde(deserialize_with = "Option::deserialize")]
    pub line_start: Option<usize>,

    /// Originating file path
    #[serde(deserialize_with = "Option::deserialize")]
    pub path: Option<String>,

    /// Originating URL
    #[serde(deserialize_with = "Option::deserialize")]
    pub url: Option<String>,
}

impl Snippet {
    /// Create a snippet without provenance
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            lang: None,
            line_start: None,
            path: None,
            url: None,
        }
    }

    /// Builder: set language tag
    #[must_use]
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Builder: set first line within the originating file
    #[must_use]
    pub fn line_start(mut self, line_start: usize) -> Self {
        self.line_start = Some(line_start);
        self
    }

    /// Builder: set originating path
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Builder: set originating URL
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Number of lines in `content` (line breaks + 1)
    #[must_use]
    pub fn n_lines(&self) -> usize {
        self.content.matches('\n').count() + 1
    }

    /// Whether `slot` names a real line of `content`
    #[must_use]
    pub fn contains_slot(&self, slot: usize) -> bool {
        (1..=self.n_lines()).contains(&slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Snippet {
        Snippet::new("foo.py", "def foo():\n    print(\"foo\")")
            .lang("python")
            .line_start(5)
            .path("~/data/foo.py")
            .url("https://foo.bar/snippet/foo.py")
    }

    #[test]
    fn test_n_lines() {
        assert_eq!(Snippet::new("a", "").n_lines(), 1);
        assert_eq!(Snippet::new("a", "one").n_lines(), 1);
        assert_eq!(Snippet::new("a", "one\ntwo").n_lines(), 2);
        assert_eq!(Snippet::new("a", "one\ntwo\n").n_lines(), 3);
    }

    #[test]
    fn test_contains_slot() {
        let snippet = sample();
        assert!(!snippet.contains_slot(0));
        assert!(snippet.contains_slot(1));
        assert!(snippet.contains_slot(2));
        assert!(!snippet.contains_slot(3));
    }

    #[test]
    fn test_to_value() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "foo.py",
                "content": "def foo():\n    print(\"foo\")",
                "lang": "python",
                "line_start": 5,
                "path": "~/data/foo.py",
                "url": "https://foo.bar/snippet/foo.py",
            })
        );
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let snippet = Snippet::new("bare", "x = 1");
        let value = serde_json::to_value(&snippet).unwrap();
        assert!(value["lang"].is_null());
        assert!(value["url"].is_null());

        let restored: Snippet = serde_json::from_value(value).unwrap();
        assert_eq!(restored, snippet);
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let value = json!({
            "name": "bare",
            "content": "x = 1",
            "lang": null,
            "line_start": null,
            "path": null,
        });
        assert!(serde_json::from_value::<Snippet>(value).is_err());
    }
}
