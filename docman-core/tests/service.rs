use async_trait::async_trait;
use chrono::{TimeDelta, TimeZone, Utc};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use docman_core::{
    clock::ManualClock,
    context::CallContext,
    document::{CreateDocumentRequest, DataMap, Document, DocumentDto, TagSet, UpdateRequest},
    error::{DocumentStoreError, DocumentStoreResult, ErrorKind},
    repository::DocumentRepository,
    service::DocumentService,
};

/// Map-backed repository that records the last value handed to `add` and `update`.
#[derive(Debug, Default)]
struct RecordingRepository {
    documents: Mutex<HashMap<String, Document>>,
    last_written: Mutex<Option<Document>>,
}

impl RecordingRepository {
    fn with(documents: impl IntoIterator<Item = Document>) -> Self {
        let repo = Self::default();
        repo.docs()
            .extend(documents.into_iter().map(|d| (d.id.clone(), d)));
        repo
    }

    fn docs(&self) -> MutexGuard<'_, HashMap<String, Document>> {
        self.documents.lock().unwrap()
    }

    fn last_written(&self) -> Option<Document> {
        self.last_written.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentRepository for RecordingRepository {
    async fn get(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<Document> {
        ctx.check()?;
        self.docs()
            .get(id)
            .cloned()
            .ok_or_else(|| DocumentStoreError::NotFound(id.to_string()))
    }

    async fn add(&self, ctx: &CallContext, document: Document) -> DocumentStoreResult<()> {
        ctx.check()?;
        *self.last_written.lock().unwrap() = Some(document.clone());
        let mut docs = self.docs();
        if docs.contains_key(&document.id) {
            return Err(DocumentStoreError::Conflict(document.id));
        }
        docs.insert(document.id.clone(), document);
        Ok(())
    }

    async fn update(&self, ctx: &CallContext, id: &str, document: Document) -> DocumentStoreResult<()> {
        ctx.check()?;
        *self.last_written.lock().unwrap() = Some(document.clone());
        match self.docs().get_mut(id) {
            Some(slot) => {
                *slot = document;
                Ok(())
            }
            None => Err(DocumentStoreError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<()> {
        ctx.check()?;
        self.docs()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DocumentStoreError::NotFound(id.to_string()))
    }

    async fn contains(&self, _ctx: &CallContext, id: &str) -> DocumentStoreResult<bool> {
        Ok(self.docs().contains_key(id))
    }

    async fn len(&self, _ctx: &CallContext) -> DocumentStoreResult<usize> {
        Ok(self.docs().len())
    }
}

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn stored(id: &str, data: &[(&str, &str)], tags: &[&str]) -> Document {
    let data: DataMap = data
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let tags: TagSet = tags.iter().map(|t| t.to_string()).collect();
    let mut doc = Document::new(id, data, tags, start() - TimeDelta::hours(1));
    doc.last_updated = Some(start() - TimeDelta::minutes(30));
    doc
}

fn service(repo: RecordingRepository) -> (DocumentService<RecordingRepository, ManualClock>, ManualClock) {
    let clock = ManualClock::new(start());
    let service = DocumentService::builder(repo)
        .clock(clock.clone())
        .build();
    (service, clock)
}

#[tokio::test]
async fn get_maps_document_to_dto() {
    let (service, _) = service(RecordingRepository::with([stored("doc1", &[("old", "data")], &["tag"])]));

    let dto = service.get(&CallContext::new(), "doc1").await.unwrap();

    assert_eq!(dto.id, "doc1");
    assert!(dto.tags.contains("tag"));
    assert_eq!(dto.data["old"], "data");
    assert_eq!(dto.created, Some(start() - TimeDelta::hours(1)));
}

#[tokio::test]
async fn get_passes_not_found_through() {
    let (service, _) = service(RecordingRepository::default());

    let err = service.get(&CallContext::new(), "ghost").await.unwrap_err();

    assert_eq!(err, DocumentStoreError::NotFound("ghost".into()));
}

#[tokio::test]
async fn add_stamps_both_timestamps() {
    let (service, _) = service(RecordingRepository::default());
    let mut dto = DocumentDto::new("newdoc").with_tags(["t"]);
    dto.created = Some(start() - TimeDelta::days(365));

    service.add(&CallContext::new(), dto).await.unwrap();

    let saved = service.repository().last_written().unwrap();
    assert_eq!(saved.created, start());
    assert_eq!(saved.last_updated, Some(start()));
    assert!(saved.tags.contains("t"));
}

#[tokio::test]
async fn add_passes_conflict_through() {
    let (service, _) = service(RecordingRepository::with([stored("dup", &[], &[])]));

    let err = service
        .add(&CallContext::new(), DocumentDto::new("dup"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn create_request_goes_through_add() {
    let (service, _) = service(RecordingRepository::default());
    let request = CreateDocumentRequest {
        id: "fresh".into(),
        data: [("k".to_string(), "v".to_string())].into_iter().collect(),
        tags: TagSet::new(),
    };

    service.create(&CallContext::new(), request).await.unwrap();

    let saved = service.repository().last_written().unwrap();
    assert_eq!(saved.data["k"], "v");
    assert_eq!(saved.last_updated, Some(saved.created));
}

#[tokio::test]
async fn replace_writes_dto_content() {
    let (service, clock) = service(RecordingRepository::with([stored("u1", &[("old", "x")], &["old"])]));
    clock.advance(TimeDelta::seconds(10));

    let dto = DocumentDto::new("u1").with_data([("k", "v")]).with_tags(["x"]);
    service.replace(&CallContext::new(), "u1", dto).await.unwrap();

    let saved = service.repository().last_written().unwrap();
    assert_eq!(saved.data.len(), 1);
    assert_eq!(saved.data["k"], "v");
    assert_eq!(saved.tags, TagSet::from(["x".to_string()]));
    assert_eq!(saved.last_updated, Some(start() + TimeDelta::seconds(10)));
}

#[tokio::test]
async fn replace_missing_is_not_found() {
    let (service, _) = service(RecordingRepository::default());

    let err = service
        .replace(&CallContext::new(), "ghost", DocumentDto::new("ghost"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn merge_replaces_supplied_fields_wholesale() {
    let (service, _) = service(RecordingRepository::with([stored("d1", &[("old", "data"), ("other", "1")], &["old"])]));

    let request = UpdateRequest::new("d1")
        .with_tags(["new"])
        .with_data([("old", "val")]);
    service.merge(&CallContext::new(), request).await.unwrap();

    let saved = service.repository().last_written().unwrap();
    assert_eq!(saved.data.len(), 1, "newData is not merged key by key");
    assert_eq!(saved.data["old"], "val");
    assert_eq!(saved.tags, TagSet::from(["new".to_string()]));
    assert_eq!(saved.last_updated, Some(start()));
}

#[tokio::test]
async fn merge_tags_only_keeps_data() {
    let (service, clock) = service(RecordingRepository::with([stored("d1", &[("k", "v")], &["a", "b"])]));
    let before = service.get(&CallContext::new(), "d1").await.unwrap();
    clock.advance(TimeDelta::seconds(1));

    service
        .merge(&CallContext::new(), UpdateRequest::new("d1").with_tags(["x"]))
        .await
        .unwrap();

    let after = service.get(&CallContext::new(), "d1").await.unwrap();
    assert_eq!(after.data, before.data);
    assert_eq!(after.tags, TagSet::from(["x".to_string()]));
    assert!(after.last_updated > before.last_updated);
}

#[tokio::test]
async fn empty_merge_only_advances_last_updated() {
    let (service, clock) = service(RecordingRepository::with([stored("d1", &[("k", "v")], &["t"])]));
    let before = service.get(&CallContext::new(), "d1").await.unwrap();
    clock.advance(TimeDelta::seconds(5));

    service
        .merge(&CallContext::new(), UpdateRequest::new("d1"))
        .await
        .unwrap();

    let after = service.get(&CallContext::new(), "d1").await.unwrap();
    assert_eq!(after.data, before.data);
    assert_eq!(after.tags, before.tags);
    assert_eq!(after.created, before.created);
    assert_eq!(after.last_updated, Some(start() + TimeDelta::seconds(5)));
}

#[tokio::test]
async fn merge_never_moves_last_updated_backwards() {
    let (service, clock) = service(RecordingRepository::with([stored("d1", &[], &[])]));
    clock.set(start() - TimeDelta::days(1));

    service
        .merge(&CallContext::new(), UpdateRequest::new("d1"))
        .await
        .unwrap();

    let saved = service.repository().last_written().unwrap();
    assert_eq!(saved.last_updated, Some(start() - TimeDelta::minutes(30)));
}

#[tokio::test]
async fn merge_missing_is_not_found_and_writes_nothing() {
    let (service, _) = service(RecordingRepository::default());

    let err = service
        .merge(&CallContext::new(), UpdateRequest::new("ghost").with_tags(["x"]))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(service.repository().last_written().is_none());
}

#[tokio::test]
async fn delete_passes_through() {
    let (service, _) = service(RecordingRepository::with([stored("doc4", &[], &[])]));
    let ctx = CallContext::new();

    service.delete(&ctx, "doc4").await.unwrap();

    assert!(service.delete(&ctx, "doc4").await.unwrap_err().is_not_found());
    assert!(service.get(&ctx, "doc4").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn cancelled_context_times_out_before_any_work() {
    let (service, _) = service(RecordingRepository::default());
    let ctx = CallContext::new();
    ctx.cancel_handle().cancel();

    let err = service.add(&ctx, DocumentDto::new("late")).await.unwrap_err();

    assert!(err.is_timeout());
    assert!(service.repository().last_written().is_none());
    assert_eq!(service.repository().len(&CallContext::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn default_timeout_applies_to_open_contexts() {
    let service = DocumentService::builder(RecordingRepository::default())
        .default_timeout(Duration::ZERO)
        .build();

    let err = service.get(&CallContext::new(), "any").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
}
