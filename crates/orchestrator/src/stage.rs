//! Per-stage handlers, dispatched by name from the durable queue, per spec
//! §4.8's DAG `raw → extract → normalize → dedupe → (comparables+score) → notify`.

use crate::notify::NotificationCollaborator;
use async_trait::async_trait;
use carscout_dedup::Deduplicator;
use carscout_extractor::{merge, Extractor};
use carscout_model::{NormalizedListingId, RawListingId, SourceId};
use carscout_normalizer::Normalizer;
use carscout_scorer::Scorer;
use carscout_shared::StageError;
use carscout_storage::Storage;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A single pipeline stage's handler, invoked with the raw `Uuid` the
/// queued unit carries (a `RawListingId` for `extract`/`normalize`, a
/// `NormalizedListingId` for every later stage).
#[async_trait]
pub trait StageHandler: Send + Sync {
    /// Runs the stage's operation for one queued unit.
    async fn handle(&self, listing_id: Uuid) -> Result<(), StageError>;
}

/// Per-source extractor lookup, keyed by [`SourceId`]. Read-mostly; built
/// once at worker startup, per spec §5's shared-resource policy for the
/// canonical-vocabulary cache.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<SourceId, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Builds an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the extractor for a given source.
    pub fn register(&mut self, source_id: SourceId, extractor: Arc<dyn Extractor>) {
        self.extractors.insert(source_id, extractor);
    }

    fn get(&self, source_id: SourceId) -> Option<&Arc<dyn Extractor>> {
        self.extractors.get(&source_id)
    }
}

/// The `extract` stage: turns `raw_html` into a `FieldMap` via the
/// source's registered [`Extractor`]. When the scraping front-end also
/// supplied a `parsed_map`, the HTML is still extracted and the two maps
/// are merged with [`merge::pick_richer`] — the richer map wins, HTML
/// breaking ties, per spec §4.3. Fans out to `normalize` once a viable
/// field map exists.
pub struct ExtractStage {
    storage: Storage,
    registry: ExtractorRegistry,
}

impl ExtractStage {
    /// Builds an `ExtractStage` over a storage handle and extractor
    /// registry.
    pub fn new(storage: Storage, registry: ExtractorRegistry) -> Self {
        Self { storage, registry }
    }
}

#[async_trait]
impl StageHandler for ExtractStage {
    async fn handle(&self, listing_id: Uuid) -> Result<(), StageError> {
        let raw_id = RawListingId::from_uuid(listing_id);
        let mut raw = self.storage.get_raw_listing(raw_id).await.map_err(StageError::from)?;

        if let Some(html) = raw.raw_html.clone() {
            let Some(extractor) = self.registry.get(raw.source_id) else {
                return Err(StageError::Extract(format!(
                    "no extractor registered for source {}",
                    raw.source_id
                )));
            };
            match extractor.extract(&html, &raw.url).await {
                Ok(html_map) => {
                    raw.parsed_map = merge::pick_richer(Some(html_map), raw.parsed_map.take());
                }
                Err(e) => {
                    raw.parse_errors = Some(e.to_string());
                }
            }
            raw = self.storage.update_raw_listing(raw).await.map_err(StageError::from)?;
        }

        if raw.parsed_map.as_ref().is_some_and(|fm| fm.is_viable()) {
            self.storage
                .enqueue_stage("normalize".to_string(), raw.id.as_uuid())
                .await
                .map_err(StageError::from)?;
        }
        Ok(())
    }
}

/// The `normalize` stage: wraps [`Normalizer::normalize`].
pub struct NormalizeStage {
    storage: Storage,
    normalizer: Normalizer,
}

impl NormalizeStage {
    /// Builds a `NormalizeStage` over an already-constructed [`Normalizer`].
    pub fn new(storage: Storage, normalizer: Normalizer) -> Self {
        Self { storage, normalizer }
    }
}

#[async_trait]
impl StageHandler for NormalizeStage {
    async fn handle(&self, listing_id: Uuid) -> Result<(), StageError> {
        let raw_id = RawListingId::from_uuid(listing_id);
        let raw = self.storage.get_raw_listing(raw_id).await.map_err(StageError::from)?;
        self.normalizer.normalize(&raw).await?;
        Ok(())
    }
}

/// The `dedupe` stage: wraps [`Deduplicator::dedupe`].
pub struct DedupeStage {
    deduplicator: Deduplicator,
}

impl DedupeStage {
    /// Builds a `DedupeStage` over an already-constructed [`Deduplicator`].
    pub fn new(deduplicator: Deduplicator) -> Self {
        Self { deduplicator }
    }
}

#[async_trait]
impl StageHandler for DedupeStage {
    async fn handle(&self, listing_id: Uuid) -> Result<(), StageError> {
        self.deduplicator
            .dedupe(NormalizedListingId::from_uuid(listing_id))
            .await
    }
}

/// The combined `comparables+score` stage: wraps [`Scorer::score`], which
/// internally invokes the Comparables Engine. Kept as one stage per spec
/// §4.8's DAG, which never schedules comparables and scoring separately.
pub struct ComparablesScoreStage {
    scorer: Scorer,
}

impl ComparablesScoreStage {
    /// Builds a `ComparablesScoreStage` over an already-constructed
    /// [`Scorer`].
    pub fn new(scorer: Scorer) -> Self {
        Self { scorer }
    }
}

#[async_trait]
impl StageHandler for ComparablesScoreStage {
    async fn handle(&self, listing_id: Uuid) -> Result<(), StageError> {
        self.scorer.score(NormalizedListingId::from_uuid(listing_id)).await?;
        Ok(())
    }
}

/// The `notify` stage: fetches the just-approved `Score` and `Comparables`
/// and hands them to the [`NotificationCollaborator`].
pub struct NotifyStage {
    storage: Storage,
    notifier: Arc<dyn NotificationCollaborator>,
}

impl NotifyStage {
    /// Builds a `NotifyStage` over a storage handle and notification
    /// collaborator.
    pub fn new(storage: Storage, notifier: Arc<dyn NotificationCollaborator>) -> Self {
        Self { storage, notifier }
    }
}

#[async_trait]
impl StageHandler for NotifyStage {
    async fn handle(&self, listing_id: Uuid) -> Result<(), StageError> {
        let id = NormalizedListingId::from_uuid(listing_id);
        let Some(score) = self.storage.get_score(id).await.map_err(StageError::from)? else {
            return Ok(());
        };
        if score.final_state != carscout_model::FinalState::Approved {
            return Ok(());
        }
        let comparables = self.storage.get_comparables(id).await.map_err(StageError::from)?;
        self.notifier.post_approved(listing_id, &score, comparables.as_ref()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carscout_extractor::PassthroughExtractor;

    #[test]
    fn registry_looks_up_by_registered_source() {
        let mut registry = ExtractorRegistry::new();
        let source = SourceId::from_uuid(Uuid::new_v4());
        registry.register(source, Arc::new(PassthroughExtractor));
        assert!(registry.get(source).is_some());
        assert!(registry.get(SourceId::from_uuid(Uuid::new_v4())).is_none());
    }
}
