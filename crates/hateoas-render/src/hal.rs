//! HAL+JSON projection.
//!
//! Properties are flattened to the top level, links keep only the HAL
//! link-object fields (plus `method`), and embedded resources recurse.
//! The resource `type` and `_state` are internal and not emitted.
//! Envelope fields take precedence over flattened properties with the
//! same key; the property is dropped and a warning logged.

use crate::{MEDIA_TYPE_HAL, RenderOptions, Renderer, to_string};
use hateoas::v1::{Collection, Document, Link, LinkEntry, LinkManager, Resource, Result};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Default)]
pub struct HalRenderer {
    pub pretty: bool,
}

impl HalRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            pretty: options.pretty,
        }
    }
}

impl Renderer for HalRenderer {
    fn media_type(&self) -> &str {
        MEDIA_TYPE_HAL
    }

    fn render(&self, doc: &Document) -> Result<String> {
        to_string(&to_hal(doc), self.pretty)
    }
}

/// Project a document into the HAL envelope.
pub fn to_hal(doc: &Document) -> Value {
    match doc {
        Document::Resource(r) => Value::Object(resource_to_hal(r, &[])),
        Document::Collection(c) => Value::Object(collection_to_hal(c)),
    }
}

/// Keys the HAL envelope always owns.
const ENVELOPE_KEYS: [&str; 2] = ["_links", "_embedded"];

/// Extra keys a collection envelope owns.
const COLLECTION_KEYS: [&str; 5] = ["count", "page", "pageSize", "total", "totalPages"];

/// Flatten `resource` into a HAL object.
///
/// Envelope fields win: a property whose key is in `reserved`, is an
/// envelope key, or is `id` on a resource with an id is dropped.
fn resource_to_hal(resource: &Resource, reserved: &[&str]) -> Map<String, Value> {
    let mut out = Map::new();
    if !resource.id().is_empty() {
        out.insert("id".into(), Value::String(resource.id().to_string()));
    }
    for (key, value) in resource.properties() {
        let key = key.as_str();
        if out.contains_key(key) || ENVELOPE_KEYS.contains(&key) || reserved.contains(&key) {
            tracing::warn!(
                resource_type = resource.resource_type(),
                id = resource.id(),
                property = key,
                "property collides with a HAL envelope field, dropping it"
            );
            continue;
        }
        out.insert(key.to_string(), value.clone());
    }
    if !resource.links().is_empty() {
        out.insert("_links".into(), hal_links(resource.links()));
    }
    let embedded: Map<String, Value> = resource
        .all_embedded()
        .filter(|(_, list)| !list.is_empty())
        .map(|(rel, list)| (rel.to_string(), hal_list(list)))
        .collect();
    if !embedded.is_empty() {
        out.insert("_embedded".into(), Value::Object(embedded));
    }
    out
}

fn collection_to_hal(collection: &Collection) -> Map<String, Value> {
    let mut out = resource_to_hal(collection.resource(), &COLLECTION_KEYS);

    out.insert("count".into(), json!(collection.count()));
    if let Some(p) = collection.pagination() {
        out.insert("page".into(), json!(p.page));
        out.insert("pageSize".into(), json!(p.page_size));
        out.insert("total".into(), json!(p.total));
        out.insert("totalPages".into(), json!(p.total_pages()));
    }

    // Keep `_links` and `_embedded` last, after the scalar fields.
    let links = out.shift_remove("_links");
    let mut embedded = match out.shift_remove("_embedded") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let list = embedded
        .entry(collection.collection_name().to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(list) = list {
        list.extend(
            collection
                .items()
                .iter()
                .map(|r| Value::Object(resource_to_hal(r, &[]))),
        );
    }
    if let Some(links) = links {
        out.insert("_links".into(), links);
    }
    out.insert("_embedded".into(), Value::Object(embedded));
    out
}

fn hal_list(resources: &[Resource]) -> Value {
    Value::Array(
        resources
            .iter()
            .map(|r| Value::Object(resource_to_hal(r, &[])))
            .collect(),
    )
}

fn hal_links(links: &LinkManager) -> Value {
    let map: Map<String, Value> = links
        .iter()
        .map(|(rel, entry)| {
            let value = match entry {
                LinkEntry::One(link) => hal_link(link),
                LinkEntry::Many(list) => Value::Array(list.iter().map(hal_link).collect()),
            };
            (rel.to_string(), value)
        })
        .collect();
    Value::Object(map)
}

fn hal_link(link: &Link) -> Value {
    let mut out = Map::new();
    out.insert("href".into(), Value::String(link.href.clone()));
    if link.templated {
        out.insert("templated".into(), Value::Bool(true));
    }
    for (key, value) in [
        ("title", &link.title),
        ("name", &link.name),
        ("hreflang", &link.hreflang),
        ("profile", &link.profile),
    ] {
        if let Some(v) = value {
            out.insert(key.into(), Value::String(v.clone()));
        }
    }
    out.insert("method".into(), Value::String(link.method.clone()));
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hateoas::v1::{LinkOptions, Transition};

    fn order() -> Resource {
        let mut r = Resource::new("order", "1").with_state("pending");
        r.set_property("total", 10).unwrap();
        r.set_property("customer.name", "Alex").unwrap();
        r.add_link("self", "/orders/1").unwrap();
        r.add_transition(Transition::new("pending", "paid", "pay", "/orders/1/pay").unwrap())
            .unwrap();
        r
    }

    #[test]
    fn test_resource_properties_flattened() {
        let hal = to_hal(&Document::from(order()));
        assert_eq!(hal["id"], "1");
        assert_eq!(hal["total"], 10);
        assert_eq!(hal["customer"]["name"], "Alex");
        assert!(hal.get("properties").is_none());
        assert!(hal.get("type").is_none());
        assert!(hal.get("_state").is_none());
    }

    #[test]
    fn test_links_restricted_to_hal_fields() {
        let mut r = Resource::new("order", "1");
        r.add_link_with(
            "search",
            "/orders{?q}",
            "GET",
            LinkOptions::default()
                .templated()
                .with_title("Search")
                .with_media_type("application/json")
                .with_attr("x-internal", true),
        )
        .unwrap();
        let hal = to_hal(&Document::from(r));
        assert_eq!(
            hal["_links"]["search"],
            json!({
                "href": "/orders{?q}",
                "templated": true,
                "title": "Search",
                "method": "GET"
            })
        );
    }

    #[test]
    fn test_link_lists_preserved() {
        let mut r = Resource::new("order", "1");
        r.add_link("item", "/a").unwrap();
        r.add_link("item", "/b").unwrap();
        let hal = to_hal(&Document::from(r));
        assert_eq!(hal["_links"]["item"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_transition_links_keep_method() {
        let hal = to_hal(&Document::from(order()));
        assert_eq!(hal["_links"]["pay"]["method"], "POST");
    }

    #[test]
    fn test_embedded_recurses() {
        let mut line = Resource::new("line", "a");
        line.set_property("qty", 2).unwrap();
        line.add_link("self", "/lines/a").unwrap();
        let mut r = order();
        r.embed("lines", line).unwrap();
        let hal = to_hal(&Document::from(r));
        let first = &hal["_embedded"]["lines"][0];
        assert_eq!(first["qty"], 2);
        assert_eq!(first["_links"]["self"]["href"], "/lines/a");
        assert!(first.get("type").is_none());
    }

    #[test]
    fn test_collection_envelope() {
        let mut c = Collection::named("orders");
        c.add_items(vec![order(), order()]);
        c.set_pagination(1, 2, 5).unwrap();
        c.add_pagination_links("/orders").unwrap();
        let hal = to_hal(&Document::from(c));
        assert_eq!(hal["count"], 2);
        assert_eq!(hal["page"], 1);
        assert_eq!(hal["pageSize"], 2);
        assert_eq!(hal["total"], 5);
        assert_eq!(hal["totalPages"], 3);
        assert_eq!(hal["_embedded"]["orders"].as_array().unwrap().len(), 2);
        assert_eq!(hal["_links"]["next"]["href"], "/orders?page=2&pageSize=2");
        assert!(hal.get("id").is_none());
    }

    #[test]
    fn test_collection_without_pagination() {
        let hal = to_hal(&Document::from(Collection::new()));
        assert_eq!(hal["count"], 0);
        assert!(hal.get("page").is_none());
        assert_eq!(hal["_embedded"]["items"], json!([]));
    }

    #[test]
    fn test_collection_keeps_wrapped_children_under_collection_rel() {
        let mut c = Collection::new();
        c.resource_mut()
            .embed("items", Resource::new("summary", "s"))
            .unwrap();
        c.add_item(Resource::new("order", 1));
        let hal = to_hal(&Document::from(c));
        let items = hal["_embedded"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], "s");
        assert_eq!(items[1]["id"], "1");
    }

    // ── Property collisions ────────────────────────────────────────────

    #[test]
    fn test_envelope_keys_win_over_properties() {
        let mut r = Resource::new("order", "1");
        r.set_property("id", "shadow").unwrap();
        r.set_property("_links", "shadow").unwrap();
        r.set_property("_embedded", "shadow").unwrap();
        r.set_property("total", 10).unwrap();
        r.add_link("self", "/orders/1").unwrap();
        let hal = to_hal(&Document::from(r));
        assert_eq!(hal["id"], "1");
        assert_eq!(hal["_links"]["self"]["href"], "/orders/1");
        assert!(hal.get("_embedded").is_none());
        assert_eq!(hal["total"], 10);
    }

    #[test]
    fn test_id_property_kept_without_resource_id() {
        let mut r = Resource::new("order", "");
        r.set_property("id", "external-7").unwrap();
        let hal = to_hal(&Document::from(r));
        assert_eq!(hal["id"], "external-7");
    }

    #[test]
    fn test_collection_fields_win_over_properties() {
        let mut c = Collection::new();
        for key in ["count", "page", "pageSize", "total", "totalPages"] {
            c.resource_mut().set_property(key, "shadow").unwrap();
        }
        c.resource_mut().set_property("label", "recent").unwrap();
        c.add_item(Resource::new("order", 1));
        let hal = to_hal(&Document::from(c.clone()));
        assert_eq!(hal["count"], 1);
        assert!(hal.get("page").is_none());
        assert!(hal.get("totalPages").is_none());
        assert_eq!(hal["label"], "recent");

        c.set_pagination(2, 5, 12).unwrap();
        let hal = to_hal(&Document::from(c));
        assert_eq!(hal["page"], 2);
        assert_eq!(hal["pageSize"], 5);
        assert_eq!(hal["total"], 12);
        assert_eq!(hal["totalPages"], 3);
    }

    #[test]
    fn test_renderer_output_parses() {
        let body = HalRenderer::default()
            .render(&Document::from(order()))
            .unwrap();
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["_links"]["self"]["href"], "/orders/1");
    }
}
