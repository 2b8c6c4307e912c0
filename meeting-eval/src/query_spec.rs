//! Labeled evaluation queries.

use std::path::Path;

use meeting_rag::Category;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// A labeled query: the question, a reporting category, and optional
/// expectations about what a good result set looks like.
///
/// An expectation that is absent, or declared as an empty list, counts as
/// unconstrained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuerySpec {
    pub query: String,
    /// Reporting bucket, e.g. `"action_items"`.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_types: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_speakers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_keywords: Option<Vec<String>>,
}

impl QuerySpec {
    pub fn new(query: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
            expected_types: None,
            expected_speakers: None,
            expected_keywords: None,
        }
    }

    pub fn with_expected_types(mut self, types: impl IntoIterator<Item = Category>) -> Self {
        self.expected_types = Some(types.into_iter().collect());
        self
    }

    pub fn with_expected_speakers<S: Into<String>>(
        mut self,
        speakers: impl IntoIterator<Item = S>,
    ) -> Self {
        self.expected_speakers = Some(speakers.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_expected_keywords<S: Into<String>>(
        mut self,
        keywords: impl IntoIterator<Item = S>,
    ) -> Self {
        self.expected_keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Declared, non-empty expected categories.
    pub fn types(&self) -> Option<&[Category]> {
        self.expected_types.as_deref().filter(|t| !t.is_empty())
    }

    /// Declared, non-empty expected speakers.
    pub fn speakers(&self) -> Option<&[String]> {
        self.expected_speakers.as_deref().filter(|s| !s.is_empty())
    }

    /// Declared, non-empty expected keywords.
    pub fn keywords(&self) -> Option<&[String]> {
        self.expected_keywords.as_deref().filter(|k| !k.is_empty())
    }

    /// # Errors
    ///
    /// Returns [`EvalError::InvalidQuerySpec`] if the query or category is blank.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(EvalError::InvalidQuerySpec("query must not be empty".into()));
        }
        if self.category.trim().is_empty() {
            return Err(EvalError::InvalidQuerySpec(format!(
                "query '{}' has no category",
                self.query
            )));
        }
        Ok(())
    }

    /// Read a JSON array of query specs from `path`.
    pub async fn load_file(path: &Path) -> Result<Vec<QuerySpec>> {
        let bytes = tokio::fs::read(path).await?;
        let specs: Vec<QuerySpec> = serde_json::from_slice(&bytes)?;
        for spec in &specs {
            spec.validate()?;
        }
        Ok(specs)
    }

    /// The built-in labeled query set.
    pub fn default_set() -> Vec<QuerySpec> {
        use Category::{ActionItem, KeyInsight, Minute};

        vec![
            QuerySpec::new("What are the key product development priorities?", "product_strategy")
                .with_expected_types([Minute, KeyInsight])
                .with_expected_speakers(["Arjun Vasanth", "Vikram Malhotra"])
                .with_expected_keywords(["product", "development", "priority", "roadmap", "strategy"]),
            QuerySpec::new("Show me high priority action items", "action_items")
                .with_expected_types([ActionItem])
                .with_expected_keywords(["high", "priority", "urgent", "deadline", "task"]),
            QuerySpec::new("What did Arjun discuss about funding and investment?", "funding")
                .with_expected_types([Minute])
                .with_expected_speakers(["Arjun Vasanth"])
                .with_expected_keywords(["funding", "investment", "capital", "money", "investor"]),
            QuerySpec::new("Which meetings discussed regulatory compliance?", "compliance")
                .with_expected_types([Minute, KeyInsight])
                .with_expected_keywords(["regulatory", "compliance", "regulation", "legal", "policy"]),
            QuerySpec::new("What are the main concerns about market expansion?", "market_strategy")
                .with_expected_types([Minute, KeyInsight])
                .with_expected_keywords(["market", "expansion", "growth", "scale", "risk"]),
            QuerySpec::new("Show me insights about competitive analysis", "competition")
                .with_expected_types([KeyInsight, Minute])
                .with_expected_keywords(["competitive", "competition", "competitor", "analysis", "market"]),
            QuerySpec::new("What action items are assigned to technical team?", "technical_tasks")
                .with_expected_types([ActionItem])
                .with_expected_keywords(["technical", "tech", "development", "engineering", "implement"]),
            QuerySpec::new("Which meetings had discussions about AI integration?", "ai_technology")
                .with_expected_types([Minute, KeyInsight])
                .with_expected_keywords(["AI", "artificial intelligence", "integration", "technology", "automation"]),
            QuerySpec::new("What are the key risks identified in recent meetings?", "risk_management")
                .with_expected_types([KeyInsight, Minute])
                .with_expected_keywords(["risk", "concern", "challenge", "issue", "problem"]),
            QuerySpec::new("Show me decisions made about product roadmap", "product_planning")
                .with_expected_types([Minute, KeyInsight])
                .with_expected_keywords(["decision", "roadmap", "timeline", "milestone", "plan"]),
        ]
    }
}
