//! Link relations and the per-resource link registry.

use crate::error::{Error, Result};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

pub(crate) const DEFAULT_LINK_METHOD: &str = "GET";

fn default_link_method() -> String {
    DEFAULT_LINK_METHOD.to_string()
}

/// A typed hyperlink.
///
/// The relation name is not part of the serialized object; it is the key
/// the link lives under in `_links`.
///
/// # JSON shape
///
/// ```json
/// { "href": "/orders/1", "method": "GET", "title": "Order 1" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Link {
    #[serde(skip)]
    pub rel: String,
    pub href: String,
    #[serde(default = "default_link_method")]
    pub method: String,
    #[serde(default)]
    pub templated: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub hreflang: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    /// Extension attributes, serialized alongside the standard fields.
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// Optional link attributes accepted by [`LinkManager::add_link_with`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkOptions {
    pub templated: bool,
    pub title: Option<String>,
    pub media_type: Option<String>,
    pub hreflang: Option<String>,
    pub name: Option<String>,
    pub profile: Option<String>,
    pub attrs: Map<String, Value>,
}

impl LinkOptions {
    pub fn templated(mut self) -> Self {
        self.templated = true;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_hreflang(mut self, hreflang: impl Into<String>) -> Self {
        self.hreflang = Some(hreflang.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

impl Link {
    /// Create a `GET` link. Fails when `rel` or `href` is empty.
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Result<Self> {
        Self::with_options(rel, href, DEFAULT_LINK_METHOD, LinkOptions::default())
    }

    pub fn with_options(
        rel: impl Into<String>,
        href: impl Into<String>,
        method: impl Into<String>,
        options: LinkOptions,
    ) -> Result<Self> {
        let link = Self {
            rel: rel.into(),
            href: href.into(),
            method: method.into(),
            templated: options.templated,
            title: options.title,
            media_type: options.media_type,
            hreflang: options.hreflang,
            name: options.name,
            profile: options.profile,
            attrs: options.attrs,
        };
        link.validate()?;
        Ok(link)
    }

    fn validate(&self) -> Result<()> {
        if self.rel.trim().is_empty() {
            return Err(Error::invalid_argument("link relation must be a non-empty string"));
        }
        if self.href.trim().is_empty() {
            return Err(Error::invalid_argument(format!(
                "link '{}' requires a non-empty href",
                self.rel
            )));
        }
        Ok(())
    }

    /// Wire form: standard fields first, unset ones omitted, then extension attributes.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("href".into(), Value::String(self.href.clone()));
        out.insert("method".into(), Value::String(self.method.clone()));
        if self.templated {
            out.insert("templated".into(), Value::Bool(true));
        }
        for (key, value) in [
            ("title", &self.title),
            ("type", &self.media_type),
            ("hreflang", &self.hreflang),
            ("name", &self.name),
            ("profile", &self.profile),
        ] {
            if let Some(v) = value {
                out.insert(key.into(), Value::String(v.clone()));
            }
        }
        for (key, value) in &self.attrs {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Value::Object(out)
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// The link(s) stored under one relation.
///
/// A relation starts out as [`LinkEntry::One`] and is promoted to
/// [`LinkEntry::Many`] when a second link is added. `Many` always holds at
/// least two links, in insertion order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LinkEntry {
    One(Link),
    Many(Vec<Link>),
}

impl LinkEntry {
    /// All links under the relation, whatever the wire shape.
    pub fn as_slice(&self) -> &[Link] {
        match self {
            LinkEntry::One(link) => std::slice::from_ref(link),
            LinkEntry::Many(links) => links,
        }
    }

    /// Whether this relation serializes as a single object rather than an array.
    pub fn is_single(&self) -> bool {
        matches!(self, LinkEntry::One(_))
    }

    /// The first link in insertion order. `None` only for a hand-built
    /// empty `Many`.
    pub fn first(&self) -> Option<&Link> {
        self.as_slice().first()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// `Link` for a single entry, `[Link, ...]` otherwise.
    pub fn to_json(&self) -> Value {
        match self {
            LinkEntry::One(link) => link.to_json(),
            LinkEntry::Many(links) => Value::Array(links.iter().map(Link::to_json).collect()),
        }
    }

    fn push(&mut self, link: Link) {
        match self {
            LinkEntry::One(existing) => {
                let first = existing.clone();
                *self = LinkEntry::Many(vec![first, link]);
            }
            LinkEntry::Many(links) => links.push(link),
        }
    }

    fn set_rel(&mut self, rel: &str) {
        match self {
            LinkEntry::One(link) => link.rel = rel.to_string(),
            LinkEntry::Many(links) => {
                for link in links {
                    link.rel = rel.to_string();
                }
            }
        }
    }
}

/// Relation → link registry owned by a resource.
///
/// Relations are kept in insertion order and never deduplicated.
///
/// ```
/// use hateoas::v1::LinkManager;
///
/// let mut links = LinkManager::new();
/// links.add_link("item", "/items/1").unwrap();
/// links.add_link("item", "/items/2").unwrap();
///
/// let entry = links.get_link("item").unwrap();
/// assert!(!entry.is_single());
/// assert_eq!(entry.as_slice()[1].href, "/items/2");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkManager {
    relations: Vec<(String, LinkEntry)>,
}

impl LinkManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_link(&mut self, rel: impl Into<String>, href: impl Into<String>) -> Result<&mut Self> {
        self.insert(Link::new(rel, href)?)
    }

    pub fn add_link_with(
        &mut self,
        rel: impl Into<String>,
        href: impl Into<String>,
        method: impl Into<String>,
        options: LinkOptions,
    ) -> Result<&mut Self> {
        self.insert(Link::with_options(rel, href, method, options)?)
    }

    /// Add a prebuilt link under its own relation.
    pub fn insert(&mut self, link: Link) -> Result<&mut Self> {
        link.validate()?;
        match self.relations.iter_mut().find(|(rel, _)| *rel == link.rel) {
            Some((_, entry)) => entry.push(link),
            None => self.relations.push((link.rel.clone(), LinkEntry::One(link))),
        }
        Ok(self)
    }

    pub fn set_self_link(
        &mut self,
        href: impl Into<String>,
        method: impl Into<String>,
    ) -> Result<&mut Self> {
        self.add_link_with("self", href, method, LinkOptions::default())
    }

    /// Remove a relation and every link under it.
    pub fn remove_link(&mut self, rel: &str) -> Option<LinkEntry> {
        let idx = self.relations.iter().position(|(r, _)| r == rel)?;
        Some(self.relations.remove(idx).1)
    }

    pub fn has_link(&self, rel: &str) -> bool {
        self.relations.iter().any(|(r, _)| r == rel)
    }

    pub fn get_link(&self, rel: &str) -> Option<&LinkEntry> {
        self.relations
            .iter()
            .find(|(r, _)| r == rel)
            .map(|(_, entry)| entry)
    }

    /// Relation names in insertion order.
    pub fn relations(&self) -> Vec<&str> {
        self.relations.iter().map(|(r, _)| r.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkEntry)> {
        self.relations.iter().map(|(r, e)| (r.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// The `_links` object: relation → link or list of links.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.relations
                .iter()
                .map(|(rel, entry)| (rel.clone(), entry.to_json()))
                .collect(),
        )
    }

    /// Build links relative to `base_url`.
    ///
    /// The returned closure joins base and path with exactly one slash.
    ///
    /// ```
    /// use hateoas::v1::{LinkManager, LinkOptions};
    ///
    /// let build = LinkManager::create_link_builder("https://api.example.com/");
    /// let link = build("orders", "orders", "GET", LinkOptions::default()).unwrap();
    /// assert_eq!(link.href, "https://api.example.com/orders");
    /// ```
    pub fn create_link_builder(
        base_url: impl Into<String>,
    ) -> impl Fn(&str, &str, &str, LinkOptions) -> Result<Link> {
        let base = base_url.into().trim_end_matches('/').to_string();
        move |path, rel, method, options| {
            let href = join_url(&base, path);
            Link::with_options(rel, href, method, options)
        }
    }
}

impl Serialize for LinkEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

impl Serialize for LinkManager {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.relations.len()))?;
        for (rel, entry) in &self.relations {
            map.serialize_entry(rel, &entry.to_json())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LinkManager {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct LinkMapVisitor;

        impl<'de> Visitor<'de> for LinkMapVisitor {
            type Value = LinkManager;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of relation names to links")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<LinkManager, A::Error> {
                let mut manager = LinkManager::new();
                while let Some((rel, mut entry)) = access.next_entry::<String, LinkEntry>()? {
                    entry.set_rel(&rel);
                    let links = match entry {
                        LinkEntry::One(link) => vec![link],
                        LinkEntry::Many(links) => links,
                    };
                    if links.is_empty() {
                        return Err(de::Error::custom(format!(
                            "relation '{}' has an empty link list",
                            rel
                        )));
                    }
                    for link in links {
                        manager.insert(link).map_err(de::Error::custom)?;
                    }
                }
                Ok(manager)
            }
        }

        deserializer.deserialize_map(LinkMapVisitor)
    }
}
