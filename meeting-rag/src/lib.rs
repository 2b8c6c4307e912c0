//! Retrieval and answer synthesis over meeting-record fragments.
//!
//! Fragments (spoken minutes, action items, key insights) are stored with
//! their embeddings in a [`FragmentStore`]. A [`Retriever`] ranks them
//! against a query under optional category / meeting filters, an
//! [`AnswerSynthesizer`] turns the top results into a generated answer with
//! a retrieval-derived confidence, and a [`RagOrchestrator`] sequences the
//! two.
//!
//! Embedding and generation are external capabilities behind the
//! [`EmbeddingProvider`] and [`TextGenerator`] traits. HTTP implementations
//! live behind the `openai` and `mistral` features.
//!
//! # Features
//!
//! - `openai` – [`openai::OpenAICompatibleEmbeddingProvider`]
//! - `mistral` – [`mistral::MistralGenerator`]
//! - `full` – both

pub mod config;
pub mod embedding;
pub mod error;
pub mod fragment;
pub mod generation;
pub mod inmemory;
pub mod loader;
pub mod orchestrator;
pub mod retriever;
pub mod store;
pub mod synthesizer;

#[cfg(feature = "mistral")]
pub mod mistral;
#[cfg(feature = "openai")]
pub mod openai;

pub use config::{RagConfig, RagConfigBuilder};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use fragment::{
    ActionItemDetails, Category, Fragment, FragmentFilter, FragmentKind, RetrievalResult,
};
pub use generation::{GenerationRequest, TextGenerator};
pub use inmemory::InMemoryFragmentStore;
pub use loader::{DEFAULT_BATCH_SIZE, EmbeddingRecord, LoadSummary, load_directory};
pub use orchestrator::{RagAnswer, RagOrchestrator, RagOrchestratorBuilder};
pub use retriever::Retriever;
pub use store::{FragmentPoint, FragmentStore, StoreStats};
pub use synthesizer::{AnswerSynthesizer, GeneratedAnswer, NO_INFORMATION_ANSWER};
