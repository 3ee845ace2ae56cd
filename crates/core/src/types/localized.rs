//! Localized text values.
//!
//! Product names, category names, and CMS settings come from the API as a map
//! of locale code to text, e.g. `{"en": "Bananas", "ar": "موز"}`. Plain strings
//! are accepted too and stored under [`DEFAULT_LOCALE`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Locale used when the requested one has no translation.
pub const DEFAULT_LOCALE: &str = "en";

/// A piece of text with one value per locale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Text with a single value under [`DEFAULT_LOCALE`].
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self(BTreeMap::from([(DEFAULT_LOCALE.to_owned(), text.into())]))
    }

    /// Add or replace the value for a locale.
    #[must_use]
    pub fn with(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(locale.into(), text.into());
        self
    }

    /// Resolve the text for a locale.
    ///
    /// Falls back to [`DEFAULT_LOCALE`], then to the first available value,
    /// then to an empty string.
    #[must_use]
    pub fn get(&self, locale: &str) -> &str {
        self.0
            .get(locale)
            .or_else(|| self.0.get(DEFAULT_LOCALE))
            .or_else(|| self.0.values().next())
            .map_or("", String::as_str)
    }

    /// Whether no locale has a non-empty value.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }

    /// Iterate over `(locale, text)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Plain(String),
            Map(BTreeMap<String, String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Plain(s) => Self::plain(s),
            Raw::Map(map) => Self(map),
        })
    }
}
