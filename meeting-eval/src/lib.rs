//! Quality evaluation for the meeting-record RAG pipeline.
//!
//! A run takes a set of labeled [`QuerySpec`]s, sends each one through
//! retrieval and through the full retrieve-and-generate pipeline, and scores
//! the outcome on three axes:
//!
//! - relevance of the retrieved fragments ([`score_relevance`])
//! - ordering and spread of the ranking ([`score_ranking`])
//! - quality of the generated answer ([`score_generation`])
//!
//! The scorers are pure functions parameterized by [`ScoringWeights`]. The
//! [`EvaluationHarness`] aggregates per-query [`ScoreRecord`]s into a graded
//! [`EvaluationReport`].
//!
//! # Example
//!
//! ```rust,ignore
//! use meeting_eval::{EvaluationHarness, QuerySpec};
//!
//! let harness = EvaluationHarness::new(orchestrator);
//! let report = harness.run(&QuerySpec::default_set()).await;
//! println!("{}", report.render_markdown());
//! report.write_json("accuracy_evaluation_results.json".as_ref()).await?;
//! ```

pub mod error;
pub mod generation;
pub mod harness;
pub mod query_spec;
pub mod ranking;
pub mod relevance;
pub mod report;
pub mod weights;

pub use error::{EvalError, Result};
pub use generation::{GenerationScore, score_generation};
pub use harness::{EvaluationHarness, HarnessConfig};
pub use query_spec::QuerySpec;
pub use ranking::{RankingScore, score_ranking};
pub use relevance::{RelevanceScore, score_relevance};
pub use report::{
    CategorySummary, DetailedScores, EvaluationReport, Grade, OverallMetrics, QueryFailure,
    ScoreRecord,
};
pub use weights::{GenerationWeights, LengthPolicy, RelevanceWeights, ScoringWeights};
