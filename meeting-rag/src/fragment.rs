//! Data types for meeting fragments, filters, and retrieval results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Classification of a [`Fragment`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A single spoken turn from the meeting minutes.
    Minute,
    /// A task agreed on during the meeting.
    ActionItem,
    /// A derived takeaway from meeting analysis.
    KeyInsight,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Minute, Category::ActionItem, Category::KeyInsight];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Minute => "minute",
            Category::ActionItem => "action_item",
            Category::KeyInsight => "key_insight",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL.into_iter().find(|c| c.as_str() == s).ok_or_else(|| {
            RagError::InvalidQuery(format!(
                "unknown category '{s}' (expected one of: minute, action_item, key_insight)"
            ))
        })
    }
}

/// Attributes only action items carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionItemDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// Category-specific payload of a [`Fragment`]. The tag doubles as the category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FragmentKind {
    Minute,
    ActionItem(ActionItemDetails),
    KeyInsight,
}

impl FragmentKind {
    pub fn category(&self) -> Category {
        match self {
            FragmentKind::Minute => Category::Minute,
            FragmentKind::ActionItem(_) => Category::ActionItem,
            FragmentKind::KeyInsight => Category::KeyInsight,
        }
    }
}

/// An atomic retrievable unit of meeting content.
///
/// Fragments are created once at ingestion and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fragment {
    /// Unique identifier.
    pub id: String,
    /// Identifier of the meeting record this fragment belongs to.
    #[serde(rename = "meeting_id")]
    pub record_id: String,
    /// Primary text. Never empty for a stored fragment.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub kind: FragmentKind,
}

impl Fragment {
    fn with_kind(
        id: impl Into<String>,
        record_id: impl Into<String>,
        text: impl Into<String>,
        kind: FragmentKind,
    ) -> Self {
        Self {
            id: id.into(),
            record_id: record_id.into(),
            text: text.into(),
            speaker: None,
            role: None,
            kind,
        }
    }

    pub fn minute(
        id: impl Into<String>,
        record_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::with_kind(id, record_id, text, FragmentKind::Minute)
    }

    pub fn action_item(
        id: impl Into<String>,
        record_id: impl Into<String>,
        task: impl Into<String>,
        details: ActionItemDetails,
    ) -> Self {
        Self::with_kind(id, record_id, task, FragmentKind::ActionItem(details))
    }

    pub fn key_insight(
        id: impl Into<String>,
        record_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::with_kind(id, record_id, text, FragmentKind::KeyInsight)
    }

    /// Attach a speaker and optional role.
    pub fn with_speaker(mut self, speaker: impl Into<String>, role: Option<String>) -> Self {
        self.speaker = Some(speaker.into());
        self.role = role;
        self
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Action-item attributes, if this is an action item.
    pub fn action_item_details(&self) -> Option<&ActionItemDetails> {
        match &self.kind {
            FragmentKind::ActionItem(details) => Some(details),
            _ => None,
        }
    }

    /// Check the invariants a fragment must satisfy before it is embedded or stored.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidFragment`] if the id or primary text is blank.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(RagError::InvalidFragment("fragment id must not be empty".into()));
        }
        if self.text.trim().is_empty() {
            return Err(RagError::InvalidFragment(format!(
                "fragment '{}' has empty primary text",
                self.id
            )));
        }
        Ok(())
    }
}

/// Conjunctive equality filter over category and parent record.
///
/// An empty filter matches every fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FragmentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl FragmentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.record_id.is_none()
    }

    pub fn matches(&self, fragment: &Fragment) -> bool {
        self.category.is_none_or(|c| fragment.category() == c)
            && self.record_id.as_deref().is_none_or(|r| fragment.record_id == r)
    }
}

/// A retrieved [`Fragment`] paired with its similarity score (higher is more similar).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    pub fragment: Fragment,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("decision".parse::<Category>().is_err());
    }

    #[test]
    fn action_item_serializes_with_type_tag() {
        let fragment = Fragment::action_item(
            "MTG_001_action_1",
            "MTG_001",
            "Prepare investor deck",
            ActionItemDetails {
                assigned_to: Some("Priya".into()),
                due_date: Some("2024-02-01".into()),
                priority: Some("high".into()),
            },
        );
        let json = serde_json::to_value(&fragment).unwrap();
        assert_eq!(json["type"], "action_item");
        assert_eq!(json["meeting_id"], "MTG_001");
        assert_eq!(json["priority"], "high");

        let back: Fragment = serde_json::from_value(json).unwrap();
        assert_eq!(back, fragment);
        assert_eq!(back.category(), Category::ActionItem);
    }

    #[test]
    fn validate_rejects_blank_text() {
        let fragment = Fragment::key_insight("k1", "MTG_001", "   ");
        assert!(matches!(fragment.validate(), Err(RagError::InvalidFragment(_))));
        assert!(Fragment::key_insight("k1", "MTG_001", "Churn is rising").validate().is_ok());
    }

    #[test]
    fn filter_is_conjunctive() {
        let minute = Fragment::minute("m1", "MTG_001", "We need more runway")
            .with_speaker("Arjun Vasanth", Some("CEO".into()));
        let insight = Fragment::key_insight("k1", "MTG_002", "Runway is a concern");

        assert!(FragmentFilter::new().matches(&minute));
        assert!(FragmentFilter::new().category(Category::Minute).matches(&minute));
        assert!(!FragmentFilter::new().category(Category::Minute).matches(&insight));
        assert!(
            !FragmentFilter::new()
                .category(Category::Minute)
                .record_id("MTG_002")
                .matches(&minute)
        );
        assert!(FragmentFilter::new().record_id("MTG_002").matches(&insight));
    }
}
