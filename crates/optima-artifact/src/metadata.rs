use std::collections::BTreeMap;

use crate::delta::Suggestion;
use crate::kind::ArtifactKind;

/// Per-kind side data that lives next to the artifact rather than inside it.
///
/// Suggestions are kept in arrival order, duplicates included, and survive
/// `clear` events.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArtifactMetadata {
    #[serde(default)]
    suggestions: BTreeMap<ArtifactKind, Vec<Suggestion>>,
}

impl ArtifactMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_suggestion(&mut self, kind: ArtifactKind, suggestion: Suggestion) {
        self.suggestions.entry(kind).or_default().push(suggestion);
    }

    pub fn suggestions(&self, kind: ArtifactKind) -> &[Suggestion] {
        self.suggestions
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn suggestion_count(&self) -> usize {
        self.suggestions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestion_count() == 0
    }
}
