use crate::collection::{COLLECTION_NAME_KEY, Collection, DEFAULT_COLLECTION_TYPE};
use crate::error::{Error, Result};
use crate::resource::Resource;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Anything the rendering pipeline can project: a single [`Resource`] or a
/// [`Collection`].
///
/// Both variants share the canonical JSON shape. A payload is read back as
/// a collection when it carries `_pagination` or `_collection`, or has type
/// `"collection"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Resource(Resource),
    Collection(Collection),
}

impl Document {
    /// Parse a document from canonical JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::invalid_argument("document must be a JSON object"))?;
        let is_collection = obj.contains_key("_pagination")
            || obj.contains_key(COLLECTION_NAME_KEY)
            || obj.get("type").and_then(Value::as_str) == Some(DEFAULT_COLLECTION_TYPE);
        if is_collection {
            Ok(Document::Collection(Collection::from_json(value)?))
        } else {
            Ok(Document::Resource(Resource::from_json(value)?))
        }
    }

    /// The resource itself, or the resource a collection wraps.
    pub fn resource(&self) -> &Resource {
        match self {
            Document::Resource(r) => r,
            Document::Collection(c) => c.resource(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Document::Resource(r) => r.to_json(),
            Document::Collection(c) => c.to_json(),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value())?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}

impl From<Resource> for Document {
    fn from(resource: Resource) -> Self {
        Document::Resource(resource)
    }
}

impl From<Collection> for Document {
    fn from(collection: Collection) -> Self {
        Document::Collection(collection)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
