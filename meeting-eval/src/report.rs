//! Per-query score records and the aggregated, graded evaluation report.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::generation::GenerationScore;
use crate::ranking::RankingScore;
use crate::relevance::RelevanceScore;

/// Everything measured for one labeled query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub query: String,
    pub category: String,
    /// Seconds spent in retrieval-only search.
    pub retrieval_time: f64,
    /// Seconds spent in the full retrieve-and-generate call.
    pub generation_time: f64,
    pub num_retrieved: usize,
    pub top_score: f64,
    pub confidence: f64,
    pub relevance: RelevanceScore,
    pub ranking: RankingScore,
    pub generation: GenerationScore,
    pub answer: String,
}

/// A query whose processing failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub query: String,
    pub category: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverallMetrics {
    pub average_relevance: f64,
    /// Mean of per-query score monotonicity.
    pub average_ranking_quality: f64,
    pub average_generation_quality: f64,
    pub average_retrieval_time: f64,
    pub average_generation_time: f64,
    /// Queries attempted, including failures.
    pub total_queries: usize,
    pub categories_tested: usize,
    /// Fraction of attempted queries that produced a score record.
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategorySummary {
    pub queries: usize,
    pub average_relevance: f64,
    pub average_ranking_quality: f64,
    pub average_generation_quality: f64,
    pub average_retrieval_time: f64,
    pub average_generation_time: f64,
}

/// Raw per-query values in evaluation order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetailedScores {
    pub relevance_scores: Vec<f64>,
    pub ranking_scores: Vec<f64>,
    pub generation_scores: Vec<f64>,
    pub retrieval_times: Vec<f64>,
    pub generation_times: Vec<f64>,
}

/// Letter grade for a `[0, 1]` score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.9 => Grade::APlus,
            s if s >= 0.8 => Grade::A,
            s if s >= 0.7 => Grade::BPlus,
            s if s >= 0.6 => Grade::B,
            s if s >= 0.5 => Grade::C,
            _ => Grade::D,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub overall_metrics: OverallMetrics,
    pub results_by_category: BTreeMap<String, Vec<ScoreRecord>>,
    pub category_summaries: BTreeMap<String, CategorySummary>,
    pub detailed_scores: DetailedScores,
    #[serde(default)]
    pub failures: Vec<QueryFailure>,
}

impl EvaluationReport {
    /// Aggregate records (in evaluation order) and failures into a report.
    pub fn from_records(records: Vec<ScoreRecord>, failures: Vec<QueryFailure>) -> Self {
        let detailed_scores = DetailedScores {
            relevance_scores: records.iter().map(|r| r.relevance.overall_relevance).collect(),
            ranking_scores: records.iter().map(|r| r.ranking.score_monotonicity).collect(),
            generation_scores: records.iter().map(|r| r.generation.overall_quality).collect(),
            retrieval_times: records.iter().map(|r| r.retrieval_time).collect(),
            generation_times: records.iter().map(|r| r.generation_time).collect(),
        };

        let mut results_by_category: BTreeMap<String, Vec<ScoreRecord>> = BTreeMap::new();
        for record in records {
            results_by_category.entry(record.category.clone()).or_default().push(record);
        }

        let category_summaries = results_by_category
            .iter()
            .map(|(category, records)| (category.clone(), summarize(records)))
            .collect();

        let successes = detailed_scores.relevance_scores.len();
        let total_queries = successes + failures.len();
        let overall_metrics = OverallMetrics {
            average_relevance: mean(&detailed_scores.relevance_scores),
            average_ranking_quality: mean(&detailed_scores.ranking_scores),
            average_generation_quality: mean(&detailed_scores.generation_scores),
            average_retrieval_time: mean(&detailed_scores.retrieval_times),
            average_generation_time: mean(&detailed_scores.generation_times),
            total_queries,
            categories_tested: results_by_category.len(),
            success_rate: if total_queries == 0 {
                0.0
            } else {
                successes as f64 / total_queries as f64
            },
        };

        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            overall_metrics,
            results_by_category,
            category_summaries,
            detailed_scores,
            failures,
        }
    }

    pub fn relevance_grade(&self) -> Grade {
        Grade::from_score(self.overall_metrics.average_relevance)
    }

    pub fn ranking_grade(&self) -> Grade {
        Grade::from_score(self.overall_metrics.average_ranking_quality)
    }

    pub fn generation_grade(&self) -> Grade {
        Grade::from_score(self.overall_metrics.average_generation_quality)
    }

    /// Human-readable graded report.
    pub fn render_markdown(&self) -> String {
        let m = &self.overall_metrics;
        let mut out = String::new();

        // `write!` into a String cannot fail.
        let _ = writeln!(out, "# Meeting RAG System - Accuracy Evaluation Report");
        let _ = writeln!(out);
        let _ = writeln!(out, "Run `{}` at {}", self.run_id, self.generated_at.to_rfc3339());
        let _ = writeln!(out);

        let _ = writeln!(out, "## Overall Performance Metrics");
        let _ = writeln!(out, "- **Average Relevance Score**: {:.3} / 1.000", m.average_relevance);
        let _ = writeln!(out, "- **Average Ranking Quality**: {:.3} / 1.000", m.average_ranking_quality);
        let _ = writeln!(
            out,
            "- **Average Generation Quality**: {:.3} / 1.000",
            m.average_generation_quality
        );
        let _ = writeln!(out, "- **Average Retrieval Time**: {:.3} seconds", m.average_retrieval_time);
        let _ = writeln!(out, "- **Average Generation Time**: {:.3} seconds", m.average_generation_time);
        let _ = writeln!(out, "- **Total Test Queries**: {}", m.total_queries);
        let _ = writeln!(out, "- **Categories Tested**: {}", m.categories_tested);
        let _ = writeln!(out, "- **Success Rate**: {}", percent(m.success_rate));
        let _ = writeln!(out);

        let _ = writeln!(out, "## Performance Grades");
        let _ = writeln!(
            out,
            "- **Retrieval Relevance**: {} ({})",
            self.relevance_grade(),
            percent(m.average_relevance)
        );
        let _ = writeln!(
            out,
            "- **Result Ranking**: {} ({})",
            self.ranking_grade(),
            percent(m.average_ranking_quality)
        );
        let _ = writeln!(
            out,
            "- **LLM Generation**: {} ({})",
            self.generation_grade(),
            percent(m.average_generation_quality)
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "## Performance by Category");
        for (category, summary) in &self.category_summaries {
            let _ = writeln!(out, "### {}", title_case(category));
            let _ = writeln!(out, "- Queries: {}", summary.queries);
            let _ = writeln!(out, "- Retrieval Relevance: {:.3}", summary.average_relevance);
            let _ = writeln!(out, "- Generation Quality: {:.3}", summary.average_generation_quality);
            let _ = writeln!(out, "- Retrieval Time: {:.3}s", summary.average_retrieval_time);
            let _ = writeln!(out, "- Generation Time: {:.3}s", summary.average_generation_time);
            let _ = writeln!(out);
        }

        if !self.failures.is_empty() {
            let _ = writeln!(out, "## Failed Queries");
            for failure in &self.failures {
                let _ = writeln!(out, "- `{}` ({}): {}", failure.query, failure.category, failure.error);
            }
            let _ = writeln!(out);
        }

        out
    }

    /// Persist the structured report as pretty-printed JSON.
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, json).await?;
        info!(path = %path.display(), run_id = %self.run_id, "evaluation report written");
        Ok(())
    }
}

fn summarize(records: &[ScoreRecord]) -> CategorySummary {
    let avg = |f: fn(&ScoreRecord) -> f64| mean(&records.iter().map(f).collect::<Vec<_>>());
    CategorySummary {
        queries: records.len(),
        average_relevance: avg(|r| r.relevance.overall_relevance),
        average_ranking_quality: avg(|r| r.ranking.score_monotonicity),
        average_generation_quality: avg(|r| r.generation.overall_quality),
        average_retrieval_time: avg(|r| r.retrieval_time),
        average_generation_time: avg(|r| r.generation_time),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// `product_strategy` -> `Product Strategy`.
fn title_case(category: &str) -> String {
    category
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_thresholds() {
        assert_eq!(Grade::from_score(1.0), Grade::APlus);
        assert_eq!(Grade::from_score(0.9), Grade::APlus);
        assert_eq!(Grade::from_score(0.89), Grade::A);
        assert_eq!(Grade::from_score(0.8), Grade::A);
        assert_eq!(Grade::from_score(0.7), Grade::BPlus);
        assert_eq!(Grade::from_score(0.6), Grade::B);
        assert_eq!(Grade::from_score(0.5), Grade::C);
        assert_eq!(Grade::from_score(0.49), Grade::D);
        assert_eq!(Grade::from_score(0.0), Grade::D);
        assert_eq!(Grade::APlus.to_string(), "A+");
        assert_eq!(serde_json::to_string(&Grade::BPlus).unwrap(), "\"B+\"");
    }

    #[test]
    fn title_cases_category_names() {
        assert_eq!(title_case("product_strategy"), "Product Strategy");
        assert_eq!(title_case("ai_technology"), "Ai Technology");
        assert_eq!(title_case("funding"), "Funding");
    }

    #[test]
    fn empty_report_has_zero_metrics() {
        let report = EvaluationReport::from_records(Vec::new(), Vec::new());
        assert_eq!(report.overall_metrics, OverallMetrics::default());
        assert!(report.render_markdown().contains("**Total Test Queries**: 0"));
    }
}
