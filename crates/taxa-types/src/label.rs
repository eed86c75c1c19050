use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Language used when no better match exists in a [`LabelSet`].
pub const DEFAULT_LANG: &str = "en";

/// A language-tagged label: display text plus an optional description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Language tag (e.g. `en`, `de`).
    pub lang: String,
    /// Display text for that language.
    pub text: String,
    /// Optional longer description.
    pub description: Option<String>,
}

impl Label {
    /// Create a label without a description.
    pub fn new(lang: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            text: text.into(),
            description: None,
        }
    }

    /// Create a label with a description.
    pub fn with_description(
        lang: impl Into<String>,
        text: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            lang: lang.into(),
            text: text.into(),
            description: Some(description.into()),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.text, self.lang)
    }
}

/// The labels of one category, at most one per language.
///
/// Kept ordered by language tag so serialization and iteration are
/// deterministic. Replacement is wholesale per language: setting a label for
/// a language that already has one returns the displaced label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet {
    by_lang: BTreeMap<String, Label>,
}

impl LabelSet {
    /// Create an empty label set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a label set from an iterator of labels.
    ///
    /// Later labels win when two share a language.
    pub fn from_labels(labels: impl IntoIterator<Item = Label>) -> Self {
        let mut set = Self::new();
        for label in labels {
            set.set(label);
        }
        set
    }

    /// Number of languages present.
    pub fn len(&self) -> usize {
        self.by_lang.len()
    }

    /// Returns `true` if no label is present.
    pub fn is_empty(&self) -> bool {
        self.by_lang.is_empty()
    }

    /// Insert or replace the label for its language.
    ///
    /// Returns the previously stored label for that language, if any.
    pub fn set(&mut self, label: Label) -> Option<Label> {
        self.by_lang.insert(label.lang.clone(), label)
    }

    /// The label for an exact language tag.
    pub fn get(&self, lang: &str) -> Option<&Label> {
        self.by_lang.get(lang)
    }

    /// Remove the label for a language, returning it if present.
    pub fn remove(&mut self, lang: &str) -> Option<Label> {
        self.by_lang.remove(lang)
    }

    /// Best label for a requested language: exact match, then
    /// [`DEFAULT_LANG`], then any label in language order.
    pub fn preferred(&self, lang: &str) -> Option<&Label> {
        self.by_lang
            .get(lang)
            .or_else(|| self.by_lang.get(DEFAULT_LANG))
            .or_else(|| self.by_lang.values().next())
    }

    /// Iterate over labels in language order.
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.by_lang.values()
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self::from_labels(iter)
    }
}
