use serde::{Deserialize, Serialize};

/// Options controlling how a dot call graph becomes snippet nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DotParserOptions {
    /// Language tag stamped on every imported snippet
    pub lang: Option<String>,

    /// Keep label lines after the first (call counts, timings) as the node comment
    pub keep_label_details: bool,

    /// Upper bound on nodes created while unfolding shared callees
    pub max_nodes: usize,
}

impl Default for DotParserOptions {
    fn default() -> Self {
        Self {
            lang: None,
            keep_label_details: true,
            max_nodes: 100_000,
        }
    }
}

impl DotParserOptions {
    /// Builder: set language tag
    #[must_use]
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Validate options
    pub fn validate(&self) -> Result<(), String> {
        if self.max_nodes == 0 {
            return Err("max_nodes must be > 0".to_string());
        }
        if self.lang.as_deref().is_some_and(|lang| lang.trim().is_empty()) {
            return Err("lang must not be empty when set".to_string());
        }
        Ok(())
    }
}
