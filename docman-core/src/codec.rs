//! Wire encodings for documents and requests.
//!
//! JSON, BSON and MessagePack encode the data map natively. XML has no map
//! type, so for XML the map is projected into an ordered list of
//! [`KeyValueEntry`] elements on the way out and merged back into a map on the
//! way in. The entity types themselves only ever hold the map; the list view
//! lives in private wire structs in this module.
//!
//! ```ignore
//! use docman::{prelude::*, codec::{WireFormat, WireMessage}};
//!
//! let dto = DocumentDto::new("doc1").with_data([("k1", "v1")]);
//! let bytes = dto.encode(WireFormat::Xml)?;
//! assert_eq!(DocumentDto::decode(&bytes, WireFormat::Xml)?, dto);
//! ```

use chrono::{DateTime, Utc};
use quick_xml::{
    Reader, Writer,
    events::{BytesText, Event},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{borrow::Cow, fmt};

use crate::{
    document::{CreateDocumentRequest, DataMap, DocumentDto, KeyValueEntry, TagSet, UpdateRequest},
    error::{DocumentStoreError, DocumentStoreResult},
};

/// A supported wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    Json,
    Xml,
    Bson,
    MessagePack,
}

impl WireFormat {
    pub const ALL: [WireFormat; 4] = [
        WireFormat::Json,
        WireFormat::Xml,
        WireFormat::Bson,
        WireFormat::MessagePack,
    ];

    /// Resolves a media type such as `application/xml; charset=utf-8`.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/json" | "text/json" => Some(WireFormat::Json),
            "application/xml" | "text/xml" => Some(WireFormat::Xml),
            "application/bson" => Some(WireFormat::Bson),
            "application/x-msgpack" | "application/msgpack" | "application/vnd.msgpack" => {
                Some(WireFormat::MessagePack)
            }
            _ => None,
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            WireFormat::Json => "application/json",
            WireFormat::Xml => "application/xml",
            WireFormat::Bson => "application/bson",
            WireFormat::MessagePack => "application/x-msgpack",
        }
    }

    /// Whether this format encodes string-keyed maps directly.
    pub fn has_native_maps(self) -> bool {
        !matches!(self, WireFormat::Xml)
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type())
    }
}

/// Projects a map into its ordered-entries view, ordered by key.
pub fn to_entries(data: &DataMap) -> Vec<KeyValueEntry> {
    data.iter()
        .map(|(key, value)| KeyValueEntry::new(key.as_str(), value.as_str()))
        .collect()
}

/// Rebuilds a map from its ordered-entries view. The last entry wins when a
/// key appears more than once.
pub fn from_entries(entries: impl IntoIterator<Item = KeyValueEntry>) -> DataMap {
    entries
        .into_iter()
        .map(|entry| (entry.key, entry.value))
        .collect()
}

/// A type that can be written to and read from every [`WireFormat`].
///
/// Native-map formats serialize `Self` directly. XML goes through
/// [`Self::Xml`], the type's list-based projection.
pub trait WireMessage: Serialize + DeserializeOwned {
    /// The XML projection of this type.
    type Xml: Serialize + DeserializeOwned + for<'a> From<&'a Self> + Into<Self>;

    /// Name of the XML root element.
    const XML_ROOT: &'static str;

    fn encode(&self, format: WireFormat) -> DocumentStoreResult<Vec<u8>> {
        match format {
            WireFormat::Json => Ok(serde_json::to_vec(self)?),
            WireFormat::Bson => Ok(bson::serialize_to_vec(self)?),
            WireFormat::MessagePack => Ok(rmp_serde::to_vec_named(self)?),
            WireFormat::Xml => {
                let wire = <Self::Xml as From<&Self>>::from(self);
                Ok(quick_xml::se::to_string_with_root(Self::XML_ROOT, &wire)?.into_bytes())
            }
        }
    }

    fn decode(bytes: &[u8], format: WireFormat) -> DocumentStoreResult<Self> {
        match format {
            WireFormat::Json => Ok(serde_json::from_slice(bytes)?),
            WireFormat::Bson => Ok(bson::deserialize_from_slice(bytes)?),
            WireFormat::MessagePack => Ok(rmp_serde::from_slice(bytes)?),
            WireFormat::Xml => {
                let xml = pin_edge_whitespace(std::str::from_utf8(bytes)?)?;
                let wire: Self::Xml = quick_xml::de::from_str(&xml)?;
                Ok(wire.into())
            }
        }
    }
}

/// Decodes a payload whose format is named by a media type.
pub fn decode_as<M: WireMessage>(bytes: &[u8], media_type: &str) -> DocumentStoreResult<M> {
    let format = WireFormat::from_media_type(media_type).ok_or_else(|| {
        DocumentStoreError::Unexpected(format!("unsupported media type {media_type}"))
    })?;

    M::decode(bytes, format)
}

/// Rewrites leading and trailing whitespace of leaf element text as character
/// references.
///
/// The XML deserializer trims raw text before unescaping it, so a value such
/// as `"  padded "` would otherwise lose its padding. Whitespace between
/// elements is left as it is.
fn pin_edge_whitespace(xml: &str) -> DocumentStoreResult<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut leaf_text: Option<BytesText> = None;
    let mut after_start = false;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Eof => break,
            Event::Text(text) if after_start => {
                leaf_text = Some(text);
                after_start = false;
                continue;
            }
            Event::End(_) => {
                if let Some(text) = leaf_text.take() {
                    let pinned = escape_edges(std::str::from_utf8(&text)?);
                    write_xml(&mut writer, Event::Text(BytesText::from_escaped(pinned)))?;
                }
            }
            _ => {
                if let Some(text) = leaf_text.take() {
                    write_xml(&mut writer, Event::Text(text))?;
                }
            }
        }
        after_start = matches!(event, Event::Start(_));
        write_xml(&mut writer, event)?;
    }
    if let Some(text) = leaf_text.take() {
        write_xml(&mut writer, Event::Text(text))?;
    }

    String::from_utf8(writer.into_inner())
        .map_err(|err| DocumentStoreError::Unexpected(format!("XML decoding: {err}")))
}

fn write_xml(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> DocumentStoreResult<()> {
    writer
        .write_event(event)
        .map_err(|err| DocumentStoreError::Unexpected(format!("XML decoding: {err}")))
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn escape_edges(raw: &str) -> Cow<'_, str> {
    let body = raw.trim_matches(is_xml_whitespace);
    if body.len() == raw.len() {
        return Cow::Borrowed(raw);
    }

    let start = raw.len() - raw.trim_start_matches(is_xml_whitespace).len();
    let (head, rest) = raw.split_at(start);
    let tail = &rest[body.len()..];
    let pin = |edge: &str| edge.chars().map(|c| format!("&#{};", c as u32)).collect::<String>();

    Cow::Owned(format!("{}{body}{}", pin(head), pin(tail)))
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlEntries {
    #[serde(rename = "Entry", default)]
    entries: Vec<KeyValueEntry>,
}

impl From<&DataMap> for XmlEntries {
    fn from(data: &DataMap) -> Self {
        Self {
            entries: to_entries(data),
        }
    }
}

impl From<XmlEntries> for DataMap {
    fn from(xml: XmlEntries) -> Self {
        from_entries(xml.entries)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlTags {
    #[serde(rename = "Tag", default)]
    tags: Vec<String>,
}

impl From<&TagSet> for XmlTags {
    fn from(tags: &TagSet) -> Self {
        Self {
            tags: tags.iter().cloned().collect(),
        }
    }
}

impl From<XmlTags> for TagSet {
    fn from(xml: XmlTags) -> Self {
        xml.tags.into_iter().collect()
    }
}

#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct XmlDocument {
    id: String,
    #[serde(default)]
    data: XmlEntries,
    #[serde(default)]
    tags: XmlTags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<DateTime<Utc>>,
}

impl From<&DocumentDto> for XmlDocument {
    fn from(dto: &DocumentDto) -> Self {
        Self {
            id: dto.id.clone(),
            data: XmlEntries::from(&dto.data),
            tags: XmlTags::from(&dto.tags),
            created: dto.created,
            last_updated: dto.last_updated,
        }
    }
}

impl From<XmlDocument> for DocumentDto {
    fn from(xml: XmlDocument) -> Self {
        Self {
            id: xml.id,
            data: xml.data.into(),
            tags: xml.tags.into(),
            created: xml.created,
            last_updated: xml.last_updated,
        }
    }
}

impl WireMessage for DocumentDto {
    type Xml = XmlDocument;
    const XML_ROOT: &'static str = "Document";
}

#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct XmlCreateRequest {
    id: String,
    #[serde(default)]
    data: XmlEntries,
    #[serde(default)]
    tags: XmlTags,
}

impl From<&CreateDocumentRequest> for XmlCreateRequest {
    fn from(request: &CreateDocumentRequest) -> Self {
        Self {
            id: request.id.clone(),
            data: XmlEntries::from(&request.data),
            tags: XmlTags::from(&request.tags),
        }
    }
}

impl From<XmlCreateRequest> for CreateDocumentRequest {
    fn from(xml: XmlCreateRequest) -> Self {
        Self {
            id: xml.id,
            data: xml.data.into(),
            tags: xml.tags.into(),
        }
    }
}

impl WireMessage for CreateDocumentRequest {
    type Xml = XmlCreateRequest;
    const XML_ROOT: &'static str = "CreateNewDocumentRequest";
}

#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct XmlUpdateRequest {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_data: Option<XmlEntries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_tags: Option<XmlTags>,
}

impl From<&UpdateRequest> for XmlUpdateRequest {
    fn from(request: &UpdateRequest) -> Self {
        Self {
            id: request.id.clone(),
            new_data: request.new_data.as_ref().map(XmlEntries::from),
            new_tags: request.new_tags.as_ref().map(XmlTags::from),
        }
    }
}

impl From<XmlUpdateRequest> for UpdateRequest {
    fn from(xml: XmlUpdateRequest) -> Self {
        Self {
            id: xml.id,
            new_data: xml.new_data.map(Into::into),
            new_tags: xml.new_tags.map(Into::into),
        }
    }
}

impl WireMessage for UpdateRequest {
    type Xml = XmlUpdateRequest;
    const XML_ROOT: &'static str = "UpdateDocumentRequest";
}
