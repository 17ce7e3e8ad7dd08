use serde::{Deserialize, Serialize};

/// How a multi-tag filter combines its tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// A day qualifies if it carries any of the tags (OR).
    #[default]
    Any,
    /// A day qualifies only if it carries every one of the tags (AND).
    All,
}

/// An ephemeral query input: a list of tag names plus a match mode.
///
/// Names are normalized when the filter is resolved, so the list may carry
/// whatever casing the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub tags: Vec<String>,
    pub match_mode: MatchMode,
}

impl TagFilter {
    /// A filter matching days that carry any of the given tags.
    pub fn any(tags: Vec<String>) -> Self {
        Self {
            tags,
            match_mode: MatchMode::Any,
        }
    }

    /// A filter matching days that carry all of the given tags.
    pub fn all(tags: Vec<String>) -> Self {
        Self {
            tags,
            match_mode: MatchMode::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MatchMode::Any).unwrap(), "\"any\"");
        assert_eq!(serde_json::to_string(&MatchMode::All).unwrap(), "\"all\"");
    }

    #[test]
    fn constructors_set_the_mode() {
        let filter = TagFilter::all(vec!["vacation".to_string()]);
        assert_eq!(filter.match_mode, MatchMode::All);
        assert_eq!(TagFilter::any(Vec::new()).match_mode, MatchMode::Any);
    }
}
