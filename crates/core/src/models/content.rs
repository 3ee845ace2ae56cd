//! CMS-style page settings.

use serde::{Deserialize, Serialize};

use crate::types::LocalizedText;

/// A named, localized content value edited in the back office and rendered on
/// public pages (hero banner text, about-us copy, contact details, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsSetting {
    pub key: String,
    #[serde(default)]
    pub value: LocalizedText,
    #[serde(default)]
    pub image: Option<String>,
}
