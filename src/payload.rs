use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// -- /process ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub text: String,
}

/// Reply from `/process`. Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// term → definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<BTreeMap<String, String>>,
}

impl ProcessResponse {
    /// Text to put back into the input field: the summary when there is one,
    /// otherwise the plain output. Empty strings count as absent.
    pub fn display_text(&self) -> &str {
        present(&self.summary)
            .or_else(|| present(&self.output))
            .unwrap_or("")
    }

    /// One `"term: definition"` line per entry, or `None` when the reply
    /// carries no definitions at all.
    pub fn definition_items(&self) -> Option<Vec<String>> {
        self.definitions.as_ref().map(|defs| {
            defs.iter()
                .map(|(term, definition)| format!("{term}: {definition}"))
                .collect()
        })
    }
}

// -- /research --------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub topic: String,
}

/// Reply from `/research`. The service sends `""` for sections it could not
/// find, so empty strings are treated like missing ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepdive: Option<String>,
}

impl ResearchResponse {
    /// Present sections as `(label, text)`, in display order.
    pub fn sections(&self) -> Vec<(&'static str, &str)> {
        [
            ("Definition", &self.definition),
            ("Overview", &self.overview),
            ("History", &self.history),
            ("Derivation", &self.derivation),
            ("Simplified Deep Dive", &self.deepdive),
        ]
        .into_iter()
        .filter_map(|(label, text)| present(text).map(|t| (label, t)))
        .collect()
    }

    /// `"Label:\ntext"` per present section, separated by a blank line.
    pub fn render(&self) -> String {
        self.sections()
            .into_iter()
            .map(|(label, text)| format!("{label}:\n{text}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
