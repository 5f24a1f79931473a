//! Session-wide list of custom field descriptors and the schema built from it.

use async_trait::async_trait;
use models::field_descriptor::FieldDescriptor;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use utils::sequence::{RequestSequencer, SequenceToken};
use uuid::Uuid;

use super::{console_api::ConsoleApiError, field_schema::FieldSchema};

/// Anything that can supply the persisted descriptor list
#[async_trait]
pub trait FieldSource: Send + Sync {
    async fn fetch_fields(&self) -> Result<Vec<FieldDescriptor>, ConsoleApiError>;
}

/// Descriptor list together with the schema built from exactly that list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySnapshot {
    pub descriptors: Vec<FieldDescriptor>,
    pub schema: FieldSchema,
}

impl RegistrySnapshot {
    fn from_descriptors(descriptors: Vec<FieldDescriptor>) -> Self {
        let schema = FieldSchema::build(&descriptors);
        Self { descriptors, schema }
    }
}

#[derive(Debug, Default)]
pub struct FieldRegistry {
    state: RwLock<RegistrySnapshot>,
    sequencer: RequestSequencer,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descriptors(descriptors: Vec<FieldDescriptor>) -> Self {
        Self {
            state: RwLock::new(RegistrySnapshot::from_descriptors(descriptors)),
            sequencer: RequestSequencer::new(),
        }
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.state.read().await.clone()
    }

    pub async fn descriptors(&self) -> Vec<FieldDescriptor> {
        self.state.read().await.descriptors.clone()
    }

    pub async fn schema(&self) -> FieldSchema {
        self.state.read().await.schema.clone()
    }

    /// Accept one newly configured descriptor and rebuild the schema.
    ///
    /// Counts as the newest state: refreshes started before the append are
    /// discarded when they complete.
    pub async fn append(&self, descriptor: FieldDescriptor) -> RegistrySnapshot {
        let mut state = self.state.write().await;
        let token = self.sequencer.issue();

        if state.descriptors.iter().any(|d| d.name() == descriptor.name()) {
            warn!(
                field = descriptor.name(),
                "Custom field name already defined; the new definition replaces it"
            );
        }

        let mut descriptors = std::mem::take(&mut state.descriptors);
        descriptors.push(descriptor);
        *state = RegistrySnapshot::from_descriptors(descriptors);

        debug!(
            sequence = token.value(),
            field_count = state.descriptors.len(),
            "Appended custom field"
        );
        state.clone()
    }

    /// Drop the descriptor with the given backend id; returns whether one was removed
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut state = self.state.write().await;
        self.sequencer.issue();

        let before = state.descriptors.len();
        let descriptors: Vec<FieldDescriptor> = std::mem::take(&mut state.descriptors)
            .into_iter()
            .filter(|d| d.id() != Some(id))
            .collect();
        let removed = descriptors.len() != before;
        *state = RegistrySnapshot::from_descriptors(descriptors);
        removed
    }

    /// Reserve a sequence token for a fetch about to start
    pub fn begin_refresh(&self) -> SequenceToken {
        self.sequencer.issue()
    }

    /// Apply a fetched list if no newer fetch or local change was issued
    /// since `token`. Returns whether the list was applied.
    pub async fn complete_refresh(
        &self,
        token: SequenceToken,
        descriptors: Vec<FieldDescriptor>,
    ) -> bool {
        let mut state = self.state.write().await;
        if !self.sequencer.is_latest(token) {
            debug!(
                sequence = token.value(),
                latest = ?self.sequencer.latest().map(|t| t.value()),
                "Discarding superseded custom field response"
            );
            return false;
        }

        *state = RegistrySnapshot::from_descriptors(descriptors);
        debug!(
            sequence = token.value(),
            field_count = state.descriptors.len(),
            "Loaded custom fields"
        );
        true
    }

    /// Fetch the descriptor list from `source` under a sequence token
    pub async fn refresh<S>(&self, source: &S) -> Result<bool, ConsoleApiError>
    where
        S: FieldSource + ?Sized,
    {
        let token = self.begin_refresh();
        let descriptors = source.fetch_fields().await?;
        Ok(self.complete_refresh(token, descriptors).await)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use models::field_descriptor::{FieldKind, FieldSpec, FieldValue};
    use tokio::sync::oneshot;

    use super::*;

    struct StaticSource(Vec<FieldDescriptor>);

    #[async_trait]
    impl FieldSource for StaticSource {
        async fn fetch_fields(&self) -> Result<Vec<FieldDescriptor>, ConsoleApiError> {
            Ok(self.0.clone())
        }
    }

    /// Source whose response is released by the test
    struct GatedSource {
        gate: tokio::sync::Mutex<Option<oneshot::Receiver<Vec<FieldDescriptor>>>>,
    }

    #[async_trait]
    impl FieldSource for GatedSource {
        async fn fetch_fields(&self) -> Result<Vec<FieldDescriptor>, ConsoleApiError> {
            let rx = self.gate.lock().await.take().expect("fetched twice");
            Ok(rx.await.expect("gate dropped"))
        }
    }

    #[tokio::test]
    async fn test_append_rebuilds_schema() {
        let registry = FieldRegistry::new();
        assert!(registry.schema().await.defaults.is_empty());

        registry
            .append(FieldDescriptor::checkbox("consent", "Consent").required())
            .await;
        let snapshot = registry
            .append(FieldDescriptor::text("nickname", "Nickname"))
            .await;

        assert_eq!(snapshot.descriptors.len(), 2);
        assert_eq!(snapshot.schema.defaults.get("consent"), Some(&FieldValue::Flag(false)));
        assert_eq!(snapshot, registry.snapshot().await);
    }

    #[tokio::test]
    async fn test_refresh_replaces_list() {
        let registry =
            FieldRegistry::with_descriptors(vec![FieldDescriptor::text("old", "Old")]);
        let source = StaticSource(vec![FieldDescriptor::text("new", "New")]);

        assert!(registry.refresh(&source).await.unwrap());
        let names: Vec<String> = registry
            .descriptors()
            .await
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["new"]);
    }

    #[tokio::test]
    async fn test_late_response_does_not_overwrite_newer_one() {
        let registry = Arc::new(FieldRegistry::new());
        let (tx, rx) = oneshot::channel();
        let slow = Arc::new(GatedSource {
            gate: tokio::sync::Mutex::new(Some(rx)),
        });

        let slow_refresh = {
            let registry = registry.clone();
            let slow = slow.clone();
            tokio::spawn(async move { registry.refresh(slow.as_ref()).await })
        };
        // let the slow fetch take its token first
        tokio::time::sleep(Duration::from_millis(20)).await;

        let fast = StaticSource(vec![FieldDescriptor::text("fresh", "Fresh")]);
        assert!(registry.refresh(&fast).await.unwrap());

        tx.send(vec![FieldDescriptor::text("stale", "Stale")]).unwrap();
        assert!(!slow_refresh.await.unwrap().unwrap());

        let names: Vec<String> = registry
            .descriptors()
            .await
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_append_supersedes_in_flight_refresh() {
        let registry = FieldRegistry::new();
        let token = registry.begin_refresh();
        registry.append(FieldDescriptor::text("added", "Added")).await;

        assert!(!registry.complete_refresh(token, vec![]).await);
        assert_eq!(registry.descriptors().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_append_last_write_wins() {
        let registry = FieldRegistry::new();
        registry.append(FieldDescriptor::text("note", "Note").required()).await;
        let snapshot = registry.append(FieldDescriptor::checkbox("note", "Note")).await;

        assert_eq!(snapshot.descriptors.len(), 2);
        assert_eq!(snapshot.schema.contract.len(), 1);
        assert_eq!(snapshot.schema.defaults.get("note"), Some(&FieldValue::Flag(false)));
    }

    #[tokio::test]
    async fn test_remove_by_id() {
        let id = Uuid::new_v4();
        let removed = FieldDescriptor::of_kind(
            FieldKind::Checkbox,
            FieldSpec {
                id: Some(id),
                ..FieldSpec::new("gone", "Gone")
            },
        );
        let registry = FieldRegistry::with_descriptors(vec![
            FieldDescriptor::text("kept", "Kept").required(),
            removed,
        ]);

        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        let schema = registry.schema().await;
        assert!(schema.contract.rule("gone").is_none());
        assert!(schema.contract.rule("kept").is_some());
    }
}
