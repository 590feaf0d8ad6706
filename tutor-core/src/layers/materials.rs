//! Reference material injection.

use crate::config::AssemblerConfig;
use crate::error::StoreError;
use crate::model::{ContextRecord, MaterialRecord};
use crate::store::LearningStore;
use crate::text::{char_len, truncate_with_marker};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const TRUNCATION_MARKER: &str = "...";

/// A bounded preview of one uploaded material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialPreview {
    pub filename: String,
    /// At most `preview_chars` characters, plus a marker if cut.
    pub preview: String,
    /// Character length of the full content.
    pub original_len: usize,
    /// Whether the preview dropped part of the content.
    pub truncated: bool,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl MaterialPreview {
    fn from_record(record: MaterialRecord, preview_chars: usize) -> Self {
        let original_len = char_len(&record.content);
        Self {
            preview: truncate_with_marker(&record.content, preview_chars, TRUNCATION_MARKER),
            original_len,
            truncated: original_len > preview_chars,
            filename: record.filename,
            uploaded_at: record.uploaded_at,
        }
    }
}

/// Output of the materials layer. Parent and context materials stay apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialBundle {
    /// Materials shared by every context under the parent.
    pub parent: Vec<MaterialPreview>,
    /// Materials attached to this context only.
    pub context: Vec<MaterialPreview>,
}

impl MaterialBundle {
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty() && self.context.is_empty()
    }
}

/// Injects previews of a context's uploaded materials.
pub struct MaterialInjector<'a> {
    config: &'a AssemblerConfig,
}

impl<'a> MaterialInjector<'a> {
    pub fn new(config: &'a AssemblerConfig) -> Self {
        Self { config }
    }

    /// Collect previews for the context and, if it has one, its parent.
    pub async fn inject<S>(&self, store: &S, context: &ContextRecord) -> MaterialBundle
    where
        S: LearningStore + ?Sized,
    {
        let parent = match context.parent_id {
            Some(parent_id) => self.previews(store.parent_materials(parent_id).await, "parent"),
            None => Vec::new(),
        };
        let own = self.previews(store.context_materials(context.id).await, "context");

        debug!(
            context = %context.id,
            parent_materials = parent.len(),
            context_materials = own.len(),
            "materials layer ready"
        );

        MaterialBundle {
            parent,
            context: own,
        }
    }

    fn previews(
        &self,
        records: Result<Vec<MaterialRecord>, StoreError>,
        owner: &'static str,
    ) -> Vec<MaterialPreview> {
        match records {
            Ok(records) => records
                .into_iter()
                .map(|r| MaterialPreview::from_record(r, self.config.preview_chars))
                .collect(),
            Err(e) => {
                warn!(owner, error = %e, "failed to read materials");
                Vec::new()
            }
        }
    }
}
