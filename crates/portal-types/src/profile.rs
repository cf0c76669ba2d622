//! Consumer profile completeness

use serde::{Deserialize, Serialize};

/// A submitted profile value.
///
/// Forms send numbers or strings depending on the widget, so any JSON
/// scalar is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl ProfileValue {
    /// Whether the value carries nothing (blank text)
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) | Self::Flag(_) => false,
        }
    }
}

impl From<&str> for ProfileValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ProfileValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<u64> for ProfileValue {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

/// Profile fields a consumer must fill in before browsing products.
///
/// Values are kept as the client submitted them; only presence matters here.
/// `null` and blank text count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<ProfileValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<ProfileValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<ProfileValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<ProfileValue>,
}

impl ProfileFields {
    /// Names of the required fields, in display order
    pub const REQUIRED: [&'static str; 4] = ["age", "weight", "height", "gender"];

    /// Names of required fields that are absent or blank
    pub fn missing(&self) -> Vec<&'static str> {
        let fields = [&self.age, &self.weight, &self.height, &self.gender];
        Self::REQUIRED
            .iter()
            .zip(fields)
            .filter(|(_, value)| value.as_ref().map_or(true, ProfileValue::is_blank))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Completeness of these fields
    pub fn completeness(&self) -> ProfileCompleteness {
        if self.missing().is_empty() {
            ProfileCompleteness::Complete
        } else {
            ProfileCompleteness::Incomplete
        }
    }
}

/// Whether a consumer's profile has every required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileCompleteness {
    Complete,
    Incomplete,
    /// Profile data has not been loaded yet
    Unknown,
}

impl ProfileCompleteness {
    /// Every state, for exhaustive checks
    pub const ALL: [ProfileCompleteness; 3] = [Self::Complete, Self::Incomplete, Self::Unknown];

    /// Derive completeness from possibly-unloaded profile data
    pub fn of(profile: Option<&ProfileFields>) -> Self {
        profile.map_or(Self::Unknown, ProfileFields::completeness)
    }
}
