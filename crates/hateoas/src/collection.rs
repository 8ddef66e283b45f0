use crate::error::{Error, Result};
use crate::link::LinkOptions;
use crate::resource::{Resource, embedded_values};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

pub const DEFAULT_COLLECTION_TYPE: &str = "collection";
pub const DEFAULT_COLLECTION_NAME: &str = "items";
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Top-level key carrying a non-default collection name.
pub(crate) const COLLECTION_NAME_KEY: &str = "_collection";

const PAGINATION_RELS: [&str; 5] = ["self", "first", "last", "prev", "next"];

/// Page window over a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

impl Pagination {
    pub fn new(page: u64, page_size: u64, total: u64) -> Result<Self> {
        validate_page(page)?;
        validate_page_size(page_size)?;
        Ok(Self {
            page,
            page_size,
            total,
        })
    }

    /// `ceil(total / page_size)`, or 0 for an empty collection.
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 || self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }
}

fn validate_page(page: u64) -> Result<()> {
    if page == 0 {
        return Err(Error::invalid_argument("page must be at least 1"));
    }
    Ok(())
}

fn validate_page_size(page_size: u64) -> Result<()> {
    if page_size == 0 {
        return Err(Error::invalid_argument("page size must be at least 1"));
    }
    Ok(())
}

/// An ordered list of resources with optional pagination.
///
/// The wrapped [`Resource`] holds the collection's own links, properties,
/// and state. Items are embedded under `collection_name` when serialized.
///
/// ```
/// use hateoas::v1::{Collection, Resource};
///
/// let mut orders = Collection::named("orders");
/// orders.add_items((1..=5).map(|i| Resource::new("order", i)));
/// orders.set_pagination(1, 5, 15).unwrap();
/// orders.add_pagination_links("/orders").unwrap();
///
/// assert_eq!(orders.total_pages(), 3);
/// assert!(orders.resource().has_link("next"));
/// assert!(!orders.resource().has_link("prev"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    resource: Resource,
    items: Vec<Resource>,
    pagination: Option<Pagination>,
    collection_name: String,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    pub fn new() -> Self {
        Self::named(DEFAULT_COLLECTION_NAME)
    }

    /// Create a collection whose items embed under `collection_name`.
    pub fn named(collection_name: impl Into<String>) -> Self {
        Self {
            resource: Resource::new(DEFAULT_COLLECTION_TYPE, ""),
            items: Vec::new(),
            pagination: None,
            collection_name: collection_name.into(),
        }
    }

    /// Replace the wrapped resource.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = resource;
        self
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn set_collection_name(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_argument("collection name must be a non-empty string"));
        }
        self.collection_name = name;
        Ok(self)
    }

    // ── Items ──────────────────────────────────────────────────────────

    pub fn add_item(&mut self, item: Resource) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn add_items(&mut self, items: impl IntoIterator<Item = Resource>) -> &mut Self {
        self.items.extend(items);
        self
    }

    pub fn items(&self) -> &[Resource] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<Resource> {
        &mut self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    // ── Pagination ─────────────────────────────────────────────────────

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn set_pagination(&mut self, page: u64, page_size: u64, total: u64) -> Result<&mut Self> {
        self.pagination = Some(Pagination::new(page, page_size, total)?);
        Ok(self)
    }

    pub fn set_page(&mut self, page: u64) -> Result<&mut Self> {
        validate_page(page)?;
        self.pagination.get_or_insert_with(Pagination::default).page = page;
        Ok(self)
    }

    pub fn set_page_size(&mut self, page_size: u64) -> Result<&mut Self> {
        validate_page_size(page_size)?;
        self.pagination
            .get_or_insert_with(Pagination::default)
            .page_size = page_size;
        Ok(self)
    }

    pub fn set_total(&mut self, total: u64) -> &mut Self {
        self.pagination.get_or_insert_with(Pagination::default).total = total;
        self
    }

    pub fn total_pages(&self) -> u64 {
        self.pagination.map_or(0, |p| p.total_pages())
    }

    /// Recompute `self`, `first`, `last`, `prev`, and `next` for `base_url`.
    ///
    /// Existing links under those relations are dropped first. Without
    /// pagination nothing changes.
    pub fn add_pagination_links(&mut self, base_url: &str) -> Result<&mut Self> {
        let Some(p) = self.pagination else {
            tracing::debug!(base_url, "no pagination set, skipping pagination links");
            return Ok(self);
        };

        let links = self.resource.links_mut();
        for rel in PAGINATION_RELS {
            links.remove_link(rel);
        }

        let total_pages = p.total_pages();
        let href = |page: u64| page_href(base_url, page, p.page_size);

        links.add_link_with("self", href(p.page), "GET", LinkOptions::default())?;
        links.add_link_with("first", href(1), "GET", LinkOptions::default())?;
        if total_pages > 0 {
            links.add_link_with("last", href(total_pages), "GET", LinkOptions::default())?;
        }
        if p.page > 1 {
            links.add_link_with("prev", href(p.page - 1), "GET", LinkOptions::default())?;
        }
        if p.page < total_pages {
            links.add_link_with("next", href(p.page + 1), "GET", LinkOptions::default())?;
        }

        tracing::debug!(
            base_url,
            page = p.page,
            total_pages,
            "derived pagination links"
        );
        Ok(self)
    }

    // ── Serialization ──────────────────────────────────────────────────

    /// Resource JSON plus `_pagination` and items under
    /// `_embedded[collection_name]` (always present, possibly empty).
    ///
    /// Children the wrapped resource embeds under the same relation come
    /// first, followed by the items. A custom collection name is written to
    /// `_collection` so it survives a round trip.
    pub fn to_json(&self) -> Value {
        let mut out = self.resource.to_json_map();

        let embedded = out
            .entry("_embedded")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = embedded {
            let list = map
                .entry(self.collection_name.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = list {
                list.extend(self.items.iter().map(Resource::to_json));
            }
        }

        if self.collection_name != DEFAULT_COLLECTION_NAME {
            out.insert(
                COLLECTION_NAME_KEY.into(),
                Value::String(self.collection_name.clone()),
            );
        }
        if let Some(p) = &self.pagination {
            out.insert(
                "_pagination".into(),
                serde_json::json!({
                    "page": p.page,
                    "pageSize": p.page_size,
                    "total": p.total,
                }),
            );
        }
        Value::Object(out)
    }

    /// Parse the form produced by [`Collection::to_json`].
    ///
    /// Items are read from the relation named by `_collection`. Without it,
    /// `_embedded.items` is used, or the only embedded relation when there
    /// is exactly one. Every child under that relation becomes an item.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::invalid_argument("collection must be a JSON object"))?;

        let mut stripped = obj.clone();
        let pagination = stripped.shift_remove("_pagination");
        let declared_name = match stripped.shift_remove(COLLECTION_NAME_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) if !name.is_empty() => Some(name),
            Some(_) => {
                return Err(Error::invalid_argument(
                    "'_collection' must be a non-empty string",
                ));
            }
        };

        let mut item_values = Vec::new();
        let mut collection_name = declared_name
            .clone()
            .unwrap_or_else(|| DEFAULT_COLLECTION_NAME.to_string());
        if let Some(Value::Object(embedded)) = stripped.get_mut("_embedded") {
            let name = match declared_name {
                Some(name) => name,
                None if embedded.contains_key(DEFAULT_COLLECTION_NAME) || embedded.len() != 1 => {
                    DEFAULT_COLLECTION_NAME.to_string()
                }
                None => embedded.keys().next().cloned().unwrap_or_default(),
            };
            if let Some(items) = embedded.shift_remove(&name) {
                item_values = embedded_values(&name, &items)?
                    .into_iter()
                    .cloned()
                    .collect();
            }
            collection_name = name;
        }

        let mut collection = Collection::named(collection_name)
            .with_resource(Resource::from_json(&Value::Object(stripped))?);
        for item in &item_values {
            collection.add_item(Resource::from_json(item)?);
        }

        match pagination {
            None | Some(Value::Null) => {}
            Some(value) => {
                let p: Pagination = serde_json::from_value(value)?;
                collection.set_pagination(p.page, p.page_size, p.total)?;
            }
        }
        Ok(collection)
    }
}

fn page_href(base_url: &str, page: u64, page_size: u64) -> String {
    let sep = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}page={}&pageSize={}", base_url, sep, page, page_size)
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
