//! Bulk loading of precomputed embeddings from interchange files.
//!
//! Each `*.json` file in an embeddings directory holds a list of records:
//!
//! ```json
//! [{ "chunk_id": "MTG_001_action_1",
//!    "embedding": [0.01, -0.20, ...],
//!    "metadata": { "meeting_id": "MTG_001", "type": "action_item",
//!                  "task": "Prepare investor deck", "priority": "high" } }]
//! ```
//!
//! `fragment_id`, `vector`, and `payload` are accepted as field names too.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{RagError, Result};
use crate::fragment::{ActionItemDetails, Category, Fragment, FragmentKind};
use crate::store::{FragmentPoint, FragmentStore};

/// Upsert batch size used by [`load_directory`].
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Flat attribute bag as written by the embedding step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecordPayload {
    pub meeting_id: String,
    #[serde(rename = "type")]
    pub category: Option<Category>,
    #[serde(default)]
    pub text: Option<String>,
    /// Action items carry their text here instead of in `text`.
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// One record of an interchange file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRecord {
    #[serde(alias = "chunk_id")]
    pub fragment_id: String,
    #[serde(alias = "embedding")]
    pub vector: Vec<f32>,
    #[serde(alias = "metadata")]
    pub payload: RecordPayload,
}

impl EmbeddingRecord {
    /// Convert the flat payload into a typed [`Fragment`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidFragment`] if the record has no category or
    /// no non-empty primary text.
    pub fn into_fragment(self) -> Result<Fragment> {
        let RecordPayload {
            meeting_id,
            category,
            text,
            task,
            speaker,
            role,
            assigned_to,
            due_date,
            priority,
        } = self.payload;

        let category = category.ok_or_else(|| {
            RagError::InvalidFragment(format!("record '{}' has no type", self.fragment_id))
        })?;
        let text = text.filter(|t| !t.trim().is_empty()).or(task).unwrap_or_default();

        let kind = match category {
            Category::Minute => FragmentKind::Minute,
            Category::KeyInsight => FragmentKind::KeyInsight,
            Category::ActionItem => {
                FragmentKind::ActionItem(ActionItemDetails { assigned_to, due_date, priority })
            }
        };

        let fragment = Fragment { id: self.fragment_id, record_id: meeting_id, text, speaker, role, kind };
        fragment.validate()?;
        Ok(fragment)
    }

    fn into_point(mut self, source_file: Option<String>) -> Result<FragmentPoint> {
        let id = self.fragment_id.clone();
        let vector = std::mem::take(&mut self.vector);
        let fragment = self.into_fragment()?;
        Ok(FragmentPoint { id, vector, fragment, source_file })
    }
}

/// Outcome of a directory load.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadSummary {
    pub files: usize,
    pub points: usize,
}

/// Read one interchange file into store points.
///
/// # Errors
///
/// Returns [`RagError::LoaderError`] if the file cannot be read or decoded,
/// or [`RagError::InvalidFragment`] for a record that violates fragment invariants.
pub async fn read_embedding_file(path: &Path) -> Result<Vec<FragmentPoint>> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to read embeddings file");
        RagError::LoaderError(format!("failed to read '{}': {e}", path.display()))
    })?;
    let records: Vec<EmbeddingRecord> = serde_json::from_slice(&bytes).map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to decode embeddings file");
        RagError::LoaderError(format!("failed to decode '{}': {e}", path.display()))
    })?;

    let source = path.file_name().map(|n| n.to_string_lossy().into_owned());
    records.into_iter().map(|r| r.into_point(source.clone())).collect()
}

/// Load every `*.json` file in `dir` into `store`, in file-name order.
///
/// Every file is read and every vector checked against the store's dimension
/// before the first upsert, so a bad file leaves the store untouched. Only a
/// failing store backend can still leave earlier batches in place.
///
/// # Errors
///
/// Returns the first read, decode, validation, or upsert error encountered.
pub async fn load_directory(
    dir: &Path,
    store: &dyn FragmentStore,
    batch_size: usize,
) -> Result<LoadSummary> {
    let batch_size = batch_size.max(1);
    let mut files = json_files(dir).await?;
    files.sort();

    let mut points = Vec::new();
    for path in &files {
        let file_points = read_embedding_file(path).await?;
        for point in &file_points {
            check_vector(path, point, store.dimensions())?;
        }
        points.extend(file_points);
    }

    for batch in points.chunks(batch_size) {
        store.upsert(batch).await?;
    }

    let summary = LoadSummary { files: files.len(), points: points.len() };
    info!(dir = %dir.display(), files = summary.files, points = summary.points, "loaded embeddings");
    Ok(summary)
}

fn check_vector(path: &Path, point: &FragmentPoint, dimensions: usize) -> Result<()> {
    let problem = if point.vector.len() != dimensions {
        format!("has {} dimensions, expected {dimensions}", point.vector.len())
    } else if point.vector.iter().any(|v| !v.is_finite()) {
        "has non-finite vector components".to_string()
    } else {
        return Ok(());
    };
    error!(path = %path.display(), point = %point.id, "invalid embedding vector");
    Err(RagError::LoaderError(format!("'{}': point '{}' {problem}", path.display(), point.id)))
}

async fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        error!(dir = %dir.display(), error = %e, "failed to list embeddings directory");
        RagError::LoaderError(format!("failed to list '{}': {e}", dir.display()))
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}
