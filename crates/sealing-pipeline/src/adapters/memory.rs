//! In-memory document source, artifact store, and the text-overlay renderer.

use crate::domain::entities::{SealedArtifact, SealingError};
use crate::ports::{ArtifactStore, DocumentRenderer, DocumentSource};
use envelope_engine::Field;
use shared_types::EnvelopeId;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Mutex-guarded in-memory document store.
#[derive(Default)]
pub struct InMemoryDocumentSource {
    documents: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryDocumentSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores document bytes under a key.
    pub fn insert(&self, storage_key: impl Into<String>, bytes: Vec<u8>) {
        lock_unpoisoned(&self.documents).insert(storage_key.into(), bytes);
    }
}

impl DocumentSource for InMemoryDocumentSource {
    fn fetch(&self, storage_key: &str) -> Result<Vec<u8>, SealingError> {
        lock_unpoisoned(&self.documents)
            .get(storage_key)
            .cloned()
            .ok_or_else(|| SealingError::Fatal(format!("unknown document key: {storage_key}")))
    }
}

/// Renderer that appends a plain-text listing of inserted values.
///
/// Stands in for a real PDF composition engine, which is a port concern; the
/// listing is deterministic in field declaration order.
#[derive(Default)]
pub struct TextOverlayRenderer;

impl TextOverlayRenderer {
    /// Creates the renderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for TextOverlayRenderer {
    fn render_fields(&self, original: &[u8], fields: &[Field]) -> Result<Vec<u8>, SealingError> {
        let mut composed = original.to_vec();
        composed.extend_from_slice(b"\n--- Inserted Fields ---\n");
        for field in fields {
            let Some(inserted) = &field.inserted else {
                continue;
            };
            let rendered = serde_json::to_string(&inserted.value)
                .map_err(|e| SealingError::Fatal(format!("unrenderable field value: {e}")))?;
            composed.extend_from_slice(
                format!(
                    "[page {} {} @{:.1},{:.1}] {}\n",
                    field.page,
                    field.kind.as_str(),
                    field.rect.0,
                    field.rect.1,
                    rendered
                )
                .as_bytes(),
            );
        }
        Ok(composed)
    }
}

/// Mutex-guarded in-memory artifact store.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    artifacts: Mutex<HashMap<EnvelopeId, SealedArtifact>>,
}

impl InMemoryArtifactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn put(&self, artifact: SealedArtifact) -> Result<String, SealingError> {
        let key = format!("sealed/{}", artifact.envelope_id);
        debug!(envelope = %artifact.envelope_id, key = %key, "Artifact persisted");
        lock_unpoisoned(&self.artifacts).insert(artifact.envelope_id, artifact);
        Ok(key)
    }

    fn get(&self, envelope_id: EnvelopeId) -> Option<SealedArtifact> {
        lock_unpoisoned(&self.artifacts).get(&envelope_id).cloned()
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
