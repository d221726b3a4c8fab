//! Document entity, its external representation and the request bodies that
//! create or partially update it.
//!
//! [`Document`] is what the repository stores. [`DocumentDto`] is what crosses
//! the service boundary and gets encoded on the wire. Both carry the data bag
//! as a single map; formats without native map support project it into
//! [`KeyValueEntry`] lists inside the codec (see [`crate::codec`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Key-value data bag carried by every document.
pub type DataMap = BTreeMap<String, String>;

/// Tag set carried by every document.
pub type TagSet = BTreeSet<String>;

/// A stored document.
///
/// The repository owns every `Document` it holds and only ever hands out clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub data: DataMap,
    pub tags: TagSet,
    /// Set once when the document is added; never changed afterwards.
    pub created: DateTime<Utc>,
    /// Set on every successful mutation. `None` until the first stamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl Document {
    /// Creates an unstamped document: `created` is `at`, `last_updated` is absent.
    pub fn new(id: impl Into<String>, data: DataMap, tags: TagSet, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            data,
            tags,
            created: at,
            last_updated: None,
        }
    }

    /// Builds a document from its external representation.
    ///
    /// `fallback_created` is used when the DTO carries no creation time.
    pub fn from_dto(dto: DocumentDto, fallback_created: DateTime<Utc>) -> Self {
        Self {
            id: dto.id,
            data: dto.data,
            tags: dto.tags,
            created: dto.created.unwrap_or(fallback_created),
            last_updated: dto.last_updated,
        }
    }

    /// Advances `last_updated` to `now`, never moving it backwards and never
    /// letting it precede `created`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.last_updated.unwrap_or(self.created);
        self.last_updated = Some(now.max(floor));
    }
}

/// The external-facing representation of a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDto {
    pub id: String,
    #[serde(default)]
    pub data: DataMap,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DocumentDto {
    /// Creates an unstamped DTO.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: DataMap::new(),
            tags: TagSet::new(),
            created: None,
            last_updated: None,
        }
    }

    pub fn with_data<K, V>(mut self, data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.data = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn with_tags<T: Into<String>>(mut self, tags: impl IntoIterator<Item = T>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl From<Document> for DocumentDto {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            data: document.data,
            tags: document.tags,
            created: Some(document.created),
            last_updated: document.last_updated,
        }
    }
}

/// Body of a create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub id: String,
    #[serde(default)]
    pub data: DataMap,
    #[serde(default)]
    pub tags: TagSet,
}

impl From<CreateDocumentRequest> for DocumentDto {
    fn from(request: CreateDocumentRequest) -> Self {
        Self {
            id: request.id,
            data: request.data,
            tags: request.tags,
            created: None,
            last_updated: None,
        }
    }
}

/// A partial update.
///
/// A field that is `None` is left unchanged. A field that is `Some` replaces the
/// document's field wholesale, so `Some` of an empty collection clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_data: Option<DataMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_tags: Option<TagSet>,
}

impl UpdateRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            new_data: None,
            new_tags: None,
        }
    }

    pub fn with_data<K, V>(mut self, data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.new_data = Some(
            data.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn with_tags<T: Into<String>>(mut self, tags: impl IntoIterator<Item = T>) -> Self {
        self.new_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Applies the supplied fields to `document`. Timestamps are not touched.
    pub fn apply_to(self, document: &mut Document) {
        if let Some(data) = self.new_data {
            document.data = data;
        }

        if let Some(tags) = self.new_tags {
            document.tags = tags;
        }
    }
}

/// One element of the ordered-entries view of a [`DataMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyValueEntry {
    pub key: String,
    pub value: String,
}

impl KeyValueEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
