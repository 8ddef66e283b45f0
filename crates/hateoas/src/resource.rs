use crate::error::{Error, Result};
use crate::link::{DEFAULT_LINK_METHOD, LinkEntry, LinkManager, LinkOptions};
use crate::props;
use crate::state::{ResourceState, Transition};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A self-describing API resource.
///
/// A resource carries an identity (`type` + `id`), nested properties, typed
/// links, a state machine, and embedded child resources. Embedded children
/// are owned values: embedding the same resource under two parents means
/// cloning it.
///
/// # Builder API
///
/// ```
/// use hateoas::v1::{Resource, Transition};
///
/// let mut order = Resource::new("order", 1).with_state("pending");
/// order
///     .set_property("total", 42.5).unwrap()
///     .set_property("customer.name", "Alex").unwrap()
///     .add_link("self", "/orders/1").unwrap()
///     .add_transition(Transition::new("pending", "processing", "process", "/orders/1/process").unwrap())
///     .unwrap();
///
/// order.apply_transition("process").unwrap();
/// assert_eq!(order.state(), "processing");
/// assert!(order.available_transitions().is_empty());
/// ```
///
/// # JSON shape
///
/// ```json
/// {
///   "type": "order",
///   "id": "1",
///   "properties": { "total": 42.5, "customer": { "name": "Alex" } },
///   "_links": {
///     "self": { "href": "/orders/1", "method": "GET" },
///     "process": { "href": "/orders/1/process", "method": "POST" }
///   },
///   "_state": "processing"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    resource_type: String,
    id: String,
    properties: Map<String, Value>,
    links: LinkManager,
    state: ResourceState,
    embedded: Vec<(String, Vec<Resource>)>,
}

impl Resource {
    /// Create a resource. Numeric ids are stored in their string form.
    pub fn new(resource_type: impl Into<String>, id: impl ToString) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Replace all properties.
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    /// Set the initial state.
    pub fn with_state(mut self, initial: impl Into<String>) -> Self {
        self.state.force_state(initial);
        self
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn set_type(&mut self, resource_type: impl Into<String>) -> &mut Self {
        self.resource_type = resource_type.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl ToString) -> &mut Self {
        self.id = id.to_string();
        self
    }

    // ── Properties ─────────────────────────────────────────────────────

    /// Set a property by dot path (`"customer.address.city"`).
    ///
    /// Intermediate objects are created as needed. An intermediate that
    /// holds a non-object value is replaced by an object.
    pub fn set_property(&mut self, key: &str, value: impl Into<Value>) -> Result<&mut Self> {
        props::assign(&mut self.properties, key, value.into())?;
        Ok(self)
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        props::lookup(&self.properties, key)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }

    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        props::remove(&mut self.properties, key)
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    // ── Links ──────────────────────────────────────────────────────────

    pub fn add_link(&mut self, rel: impl Into<String>, href: impl Into<String>) -> Result<&mut Self> {
        self.links.add_link(rel, href)?;
        Ok(self)
    }

    pub fn add_link_with(
        &mut self,
        rel: impl Into<String>,
        href: impl Into<String>,
        method: impl Into<String>,
        options: LinkOptions,
    ) -> Result<&mut Self> {
        self.links.add_link_with(rel, href, method, options)?;
        Ok(self)
    }

    /// Add a URI-template link (`templated: true`).
    pub fn add_templated_link(
        &mut self,
        rel: impl Into<String>,
        href: impl Into<String>,
    ) -> Result<&mut Self> {
        self.add_link_with(rel, href, DEFAULT_LINK_METHOD, LinkOptions::default().templated())
    }

    pub fn get_link(&self, rel: &str) -> Option<&LinkEntry> {
        self.links.get_link(rel)
    }

    /// The `self` href; the first one when several are registered.
    pub fn self_link(&self) -> Option<&str> {
        self.links
            .get_link("self")
            .and_then(LinkEntry::first)
            .map(|link| link.href.as_str())
    }

    pub fn remove_link(&mut self, rel: &str) -> Option<LinkEntry> {
        self.links.remove_link(rel)
    }

    pub fn has_link(&self, rel: &str) -> bool {
        self.links.has_link(rel)
    }

    pub fn links(&self) -> &LinkManager {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut LinkManager {
        &mut self.links
    }

    // ── State ──────────────────────────────────────────────────────────

    /// Register a transition and advertise it as a link named after it.
    ///
    /// The link is added whatever the current state; use
    /// [`Resource::available_transitions`] for state-gated visibility.
    pub fn add_transition(&mut self, transition: Transition) -> Result<&mut Self> {
        let added = self.state.add_transition(transition)?;
        let (name, href, method) = (added.name.clone(), added.href.clone(), added.method.clone());
        self.links
            .add_link_with(name, href, method, LinkOptions::default())?;
        Ok(self)
    }

    /// Transitions that may fire from the current state and properties.
    pub fn available_transitions(&self) -> Vec<&Transition> {
        self.state
            .available_transitions(self.state.state(), &self.properties)
    }

    /// Fire a transition. On failure the state is left unchanged.
    pub fn apply_transition(&mut self, name: &str) -> Result<&mut Self> {
        self.state.apply(name, &self.properties)?;
        Ok(self)
    }

    pub fn state(&self) -> &str {
        self.state.state()
    }

    /// Overwrite the current state without checking the transition table.
    pub fn force_state(&mut self, state: impl Into<String>) -> &mut Self {
        self.state.force_state(state);
        self
    }

    pub fn state_machine(&self) -> &ResourceState {
        &self.state
    }

    // ── Embedded ───────────────────────────────────────────────────────

    /// Append `resource` under `rel`.
    pub fn embed(&mut self, rel: impl Into<String>, resource: Resource) -> Result<&mut Self> {
        let rel = rel.into();
        if rel.trim().is_empty() {
            return Err(Error::invalid_argument("embedded relation must be a non-empty string"));
        }
        match self.embedded.iter_mut().find(|(r, _)| *r == rel) {
            Some((_, list)) => list.push(resource),
            None => self.embedded.push((rel, vec![resource])),
        }
        Ok(self)
    }

    /// Append every resource in `resources` under `rel`.
    pub fn embed_all(
        &mut self,
        rel: impl Into<String>,
        resources: impl IntoIterator<Item = Resource>,
    ) -> Result<&mut Self> {
        let rel = rel.into();
        for resource in resources {
            self.embed(rel.clone(), resource)?;
        }
        Ok(self)
    }

    pub fn embedded(&self, rel: &str) -> Option<&[Resource]> {
        self.embedded
            .iter()
            .find(|(r, _)| r == rel)
            .map(|(_, list)| list.as_slice())
    }

    pub fn all_embedded(&self) -> impl Iterator<Item = (&str, &[Resource])> {
        self.embedded
            .iter()
            .map(|(rel, list)| (rel.as_str(), list.as_slice()))
    }

    pub fn has_embedded(&self, rel: &str) -> bool {
        self.embedded(rel).is_some_and(|list| !list.is_empty())
    }

    pub fn remove_embedded(&mut self, rel: &str) -> Option<Vec<Resource>> {
        let idx = self.embedded.iter().position(|(r, _)| r == rel)?;
        Some(self.embedded.remove(idx).1)
    }

    // ── Serialization ──────────────────────────────────────────────────

    /// Canonical JSON form. Empty properties, links, embedded maps, and an
    /// empty state are omitted.
    pub fn to_json(&self) -> Value {
        Value::Object(self.to_json_map())
    }

    pub(crate) fn to_json_map(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("type".into(), Value::String(self.resource_type.clone()));
        out.insert("id".into(), Value::String(self.id.clone()));
        if !self.properties.is_empty() {
            out.insert("properties".into(), Value::Object(self.properties.clone()));
        }
        if !self.links.is_empty() {
            out.insert("_links".into(), self.links.to_json());
        }
        let embedded: Map<String, Value> = self
            .embedded
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(rel, list)| {
                (
                    rel.clone(),
                    Value::Array(list.iter().map(Resource::to_json).collect()),
                )
            })
            .collect();
        if !embedded.is_empty() {
            out.insert("_embedded".into(), Value::Object(embedded));
        }
        if !self.state.state().is_empty() {
            out.insert("_state".into(), Value::String(self.state.state().to_string()));
        }
        out
    }

    /// Parse the canonical JSON form produced by [`Resource::to_json`].
    ///
    /// Transitions are not part of the wire form; only the current state
    /// is restored.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::invalid_argument("resource must be a JSON object"))?;

        let mut resource = Resource::new(
            optional_string(obj, "type")?.unwrap_or_default(),
            optional_string(obj, "id")?.unwrap_or_default(),
        );

        match obj.get("properties") {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => resource.properties = map.clone(),
            Some(_) => return Err(Error::invalid_argument("'properties' must be an object")),
        }

        if let Some(links) = obj.get("_links") {
            resource.links = serde_json::from_value(links.clone())?;
        }

        if let Some(embedded) = obj.get("_embedded") {
            let map = embedded
                .as_object()
                .ok_or_else(|| Error::invalid_argument("'_embedded' must be an object"))?;
            for (rel, children) in map {
                for child in embedded_values(rel, children)? {
                    resource.embed(rel.clone(), Resource::from_json(child)?)?;
                }
            }
        }

        if let Some(state) = optional_string(obj, "_state")? {
            resource.state.force_state(state);
        }

        Ok(resource)
    }
}

/// Read a string field, accepting numbers in their string form.
fn optional_string(obj: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(Error::invalid_argument(format!("'{}' must be a string", key))),
    }
}

/// Embedded values are lists of objects; a lone object is accepted too.
pub(crate) fn embedded_values<'a>(rel: &str, value: &'a Value) -> Result<Vec<&'a Value>> {
    let values: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => {
            return Err(Error::invalid_argument(format!(
                "embedded relation '{}' must hold objects",
                rel
            )));
        }
    };
    if let Some(bad) = values.iter().position(|v| !v.is_object()) {
        return Err(Error::invalid_argument(format!(
            "embedded relation '{}' item {} is not a resource object",
            rel, bad
        )));
    }
    Ok(values)
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Condition;
    use serde_json::json;

    fn order() -> Resource {
        let mut r = Resource::new("order", "1").with_state("pending");
        r.set_property("total", 10).unwrap();
        r.add_link("self", "/orders/1").unwrap();
        r.add_transition(
            Transition::new("pending", "processing", "process", "/orders/1/process").unwrap(),
        )
        .unwrap();
        r
    }

    // ── Identity ───────────────────────────────────────────────────────

    #[test]
    fn test_numeric_id_is_coerced() {
        let r = Resource::new("order", 42);
        assert_eq!(r.id(), "42");
        let mut r = Resource::default();
        r.set_id(7u64).set_type("user");
        assert_eq!(r.id(), "7");
        assert_eq!(r.resource_type(), "user");
    }

    // ── Properties ─────────────────────────────────────────────────────

    #[test]
    fn test_set_and_get_nested_property() {
        let mut r = Resource::new("user", "1");
        r.set_property("address.city", "Oslo").unwrap();
        assert_eq!(r.get_property("address.city"), Some(&json!("Oslo")));
        assert_eq!(r.get_property("address"), Some(&json!({ "city": "Oslo" })));
        assert!(r.has_property("address"));
        assert!(!r.has_property("address.zip"));
    }

    #[test]
    fn test_set_property_overwrites_scalar_path() {
        let mut r = Resource::new("user", "1");
        r.set_property("address", "unknown").unwrap();
        r.set_property("address.city", "Oslo").unwrap();
        assert_eq!(r.get_property("address"), Some(&json!({ "city": "Oslo" })));
    }

    #[test]
    fn test_set_property_empty_key_fails() {
        let mut r = Resource::new("user", "1");
        assert!(matches!(
            r.set_property("", 1).unwrap_err(),
            Error::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_properties_keep_insertion_order() {
        let mut r = Resource::new("user", "1");
        r.set_property("zeta", 1).unwrap();
        r.set_property("alpha", 2).unwrap();
        let keys: Vec<_> = r.properties().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_remove_property() {
        let mut r = Resource::new("user", "1");
        r.set_property("a.b", 1).unwrap();
        assert_eq!(r.remove_property("a.b"), Some(json!(1)));
        assert!(!r.has_property("a.b"));
    }

    // ── Links ──────────────────────────────────────────────────────────

    #[test]
    fn test_templated_link() {
        let mut r = Resource::new("search", "");
        r.add_templated_link("find", "/orders{?q}").unwrap();
        assert!(r.get_link("find").unwrap().first().unwrap().templated);
    }

    #[test]
    fn test_self_link_uses_first_of_list() {
        let mut r = Resource::new("order", "1");
        assert!(r.self_link().is_none());
        r.add_link("self", "/a").unwrap();
        r.add_link("self", "/b").unwrap();
        assert_eq!(r.self_link(), Some("/a"));
    }

    #[test]
    fn test_remove_link_delegates() {
        let mut r = order();
        assert!(r.has_link("self"));
        r.remove_link("self");
        assert!(!r.has_link("self"));
    }

    // ── Transitions ────────────────────────────────────────────────────

    #[test]
    fn test_add_transition_adds_link_unconditionally() {
        let mut r = Resource::new("order", "1").with_state("draft");
        r.add_transition(
            Transition::new("pending", "shipped", "ship", "/orders/1/ship")
                .unwrap()
                .with_method("PUT"),
        )
        .unwrap();
        let link = r.get_link("ship").unwrap().first().unwrap();
        assert_eq!(link.href, "/orders/1/ship");
        assert_eq!(link.method, "PUT");
        assert!(r.available_transitions().is_empty());
    }

    #[test]
    fn test_order_scenario() {
        let mut r = order();
        let before: Vec<_> = r.available_transitions().iter().map(|t| t.name.clone()).collect();
        assert_eq!(before, vec!["process"]);

        r.apply_transition("process").unwrap();
        assert_eq!(r.state(), "processing");
        assert!(r.available_transitions().iter().all(|t| t.name != "process"));
    }

    #[test]
    fn test_apply_transition_failure_leaves_state() {
        let mut r = order();
        let err = r.apply_transition("ship").unwrap_err();
        assert!(matches!(err, Error::StateTransition { .. }));
        assert_eq!(err.status(), 422);
        assert_eq!(r.state(), "pending");
    }

    #[test]
    fn test_conditions_read_resource_properties() {
        let mut r = Resource::new("order", "1").with_state("processing");
        r.add_transition(
            Transition::new("processing", "shipped", "ship", "/ship")
                .unwrap()
                .with_condition("paid", Condition::equals(true)),
        )
        .unwrap();
        assert!(r.apply_transition("ship").is_err());
        r.set_property("paid", true).unwrap();
        r.apply_transition("ship").unwrap();
        assert_eq!(r.state(), "shipped");
    }

    #[test]
    fn test_force_state() {
        let mut r = order();
        r.force_state("archived");
        assert_eq!(r.state(), "archived");
    }

    // ── Embedded ───────────────────────────────────────────────────────

    #[test]
    fn test_embed_appends() {
        let mut r = Resource::new("order", "1");
        r.embed("lines", Resource::new("line", "a")).unwrap();
        r.embed("lines", Resource::new("line", "b")).unwrap();
        let ids: Vec<_> = r.embedded("lines").unwrap().iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(r.has_embedded("lines"));
        assert!(!r.has_embedded("customer"));
    }

    #[test]
    fn test_embed_all_and_remove() {
        let mut r = Resource::new("order", "1");
        r.embed_all("lines", (0..3).map(|i| Resource::new("line", i)))
            .unwrap();
        assert_eq!(r.embedded("lines").unwrap().len(), 3);
        assert_eq!(r.remove_embedded("lines").unwrap().len(), 3);
        assert!(r.embedded("lines").is_none());
    }

    #[test]
    fn test_embed_rejects_empty_rel() {
        let mut r = Resource::new("order", "1");
        assert!(r.embed("", Resource::new("line", "a")).is_err());
    }

    // ── Serialization ──────────────────────────────────────────────────

    #[test]
    fn test_to_json_canonical_shape() {
        let mut r = order();
        r.embed("customer", Resource::new("customer", "c1")).unwrap();
        assert_eq!(
            r.to_json(),
            json!({
                "type": "order",
                "id": "1",
                "properties": { "total": 10 },
                "_links": {
                    "self": { "href": "/orders/1", "method": "GET" },
                    "process": { "href": "/orders/1/process", "method": "POST" }
                },
                "_embedded": {
                    "customer": [{ "type": "customer", "id": "c1" }]
                },
                "_state": "pending"
            })
        );
    }

    #[test]
    fn test_to_json_omits_empty_sections() {
        let r = Resource::new("thing", "1");
        assert_eq!(r.to_json(), json!({ "type": "thing", "id": "1" }));
    }

    #[test]
    fn test_clone_round_trip() {
        let mut r = order();
        r.set_property("a.b.c", json!([1, 2])).unwrap();
        r.embed("lines", order()).unwrap();
        assert_eq!(r.clone().to_json(), r.to_json());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut r = order();
        r.embed("lines", Resource::new("line", "a")).unwrap();
        let mut copy = r.clone();
        copy.set_property("total", 99).unwrap();
        copy.add_link("next", "/x").unwrap();
        copy.embed("lines", Resource::new("line", "b")).unwrap();
        copy.apply_transition("process").unwrap();

        assert_eq!(r.get_property("total"), Some(&json!(10)));
        assert!(!r.has_link("next"));
        assert_eq!(r.embedded("lines").unwrap().len(), 1);
        assert_eq!(r.state(), "pending");
    }

    #[test]
    fn test_from_json_round_trip() {
        let mut r = order();
        r.embed("lines", Resource::new("line", "a")).unwrap();
        r.add_link("item", "/a").unwrap();
        r.add_link("item", "/b").unwrap();
        let json = r.to_json();
        let parsed = Resource::from_json(&json).unwrap();
        assert_eq!(parsed.to_json(), json);
        assert_eq!(parsed.state(), "pending");
        assert_eq!(parsed.get_link("item").unwrap().len(), 2);
    }

    #[test]
    fn test_from_json_numeric_id() {
        let parsed = Resource::from_json(&json!({ "type": "order", "id": 5 })).unwrap();
        assert_eq!(parsed.id(), "5");
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Resource::from_json(&json!([1, 2])).is_err());
        assert!(Resource::from_json(&json!({ "properties": 3 })).is_err());
        assert!(Resource::from_json(&json!({ "_embedded": { "x": [1] } })).is_err());
        assert!(Resource::from_json(&json!({ "_links": { "self": { "href": "" } } })).is_err());
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let r = order();
        assert_eq!(serde_json::to_value(&r).unwrap(), r.to_json());
    }
}
