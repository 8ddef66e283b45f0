//! Declarative state machine backing a resource's available actions.
//!
//! Transitions are plain data: each one names a source and target state,
//! and carries the `href`/`method` under which it is advertised to clients.
//! The set of states is implicit in the transition table; a state with no
//! outgoing transitions is terminal.

use crate::error::{Error, Result};
use crate::props;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub(crate) const DEFAULT_TRANSITION_METHOD: &str = "POST";

fn default_transition_method() -> String {
    DEFAULT_TRANSITION_METHOD.to_string()
}

/// A guard on one property, checked before a transition is offered.
///
/// # JSON shape
///
/// A plain value compares by equality; `{ "exists": bool }` checks presence.
/// Any other object, including one with extra keys beside `exists`, is an
/// equality condition.
///
/// ```json
/// { "paid": true, "tracking_number": { "exists": true } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Condition {
    Exists { exists: bool },
    Equals(Value),
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let exists = match &value {
            Value::Object(map) if map.len() == 1 => map.get("exists").and_then(Value::as_bool),
            _ => None,
        };
        Ok(match exists {
            Some(exists) => Condition::Exists { exists },
            None => Condition::Equals(value),
        })
    }
}

impl Condition {
    pub fn equals(value: impl Into<Value>) -> Self {
        Condition::Equals(value.into())
    }

    /// Property must be present.
    pub fn present() -> Self {
        Condition::Exists { exists: true }
    }

    /// Property must be absent.
    pub fn absent() -> Self {
        Condition::Exists { exists: false }
    }

    fn matches(&self, key: &str, properties: &Map<String, Value>) -> bool {
        let actual = props::lookup(properties, key);
        match self {
            Condition::Exists { exists } => actual.is_some() == *exists,
            Condition::Equals(expected) => actual == Some(expected),
        }
    }
}

/// A named edge in the state graph.
///
/// ```
/// use hateoas::v1::{Condition, Transition};
///
/// let ship = Transition::new("paid", "shipped", "ship", "/orders/1/ship")
///     .unwrap()
///     .with_condition("address", Condition::present());
/// assert_eq!(ship.method, "POST");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub name: String,
    pub href: String,
    #[serde(default = "default_transition_method")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<BTreeMap<String, Condition>>,
}

impl Transition {
    /// Create a `POST` transition without conditions.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        name: impl Into<String>,
        href: impl Into<String>,
    ) -> Result<Self> {
        let transition = Self {
            from: from.into(),
            to: to.into(),
            name: name.into(),
            href: href.into(),
            method: default_transition_method(),
            conditions: None,
        };
        transition.validate()?;
        Ok(transition)
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_condition(mut self, key: impl Into<String>, condition: Condition) -> Self {
        self.conditions
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), condition);
        self
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("from", &self.from),
            ("to", &self.to),
            ("name", &self.name),
            ("href", &self.href),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_argument(format!(
                    "transition {} must be a non-empty string",
                    field
                )));
            }
        }
        Ok(())
    }

    /// Whether this transition may fire from `state` given `properties`.
    pub fn is_available(&self, state: &str, properties: &Map<String, Value>) -> bool {
        if self.from != state {
            return false;
        }
        match &self.conditions {
            Some(conditions) => conditions
                .iter()
                .all(|(key, condition)| condition.matches(key, properties)),
            None => true,
        }
    }
}

/// Current state plus the transition table, owned by one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceState {
    current: String,
    transitions: Vec<Transition>,
}

impl ResourceState {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: initial.into(),
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> &str {
        &self.current
    }

    /// Set the current state without consulting the transition table.
    ///
    /// Use [`ResourceState::apply_transition`] for validated changes.
    pub fn force_state(&mut self, state: impl Into<String>) {
        self.current = state.into();
    }

    pub fn add_transition(&mut self, transition: Transition) -> Result<&Transition> {
        transition.validate()?;
        self.transitions.push(transition);
        Ok(&self.transitions[self.transitions.len() - 1])
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transitions leaving `state` whose conditions hold for `properties`.
    pub fn available_transitions(
        &self,
        state: &str,
        properties: &Map<String, Value>,
    ) -> Vec<&Transition> {
        self.transitions
            .iter()
            .filter(|t| t.is_available(state, properties))
            .collect()
    }

    /// Resolve `name` from `state` and return the target state.
    ///
    /// Does not mutate; see [`ResourceState::apply`] for the in-place form.
    pub fn apply_transition(
        &self,
        name: &str,
        state: &str,
        properties: &Map<String, Value>,
    ) -> Result<String> {
        self.available_transitions(state, properties)
            .into_iter()
            .find(|t| t.name == name)
            .map(|t| t.to.clone())
            .ok_or_else(|| Error::StateTransition {
                name: name.to_string(),
                state: state.to_string(),
            })
    }

    /// Fire `name` from the current state, updating it on success.
    pub fn apply(&mut self, name: &str, properties: &Map<String, Value>) -> Result<&str> {
        let next = self.apply_transition(name, &self.current, properties)?;
        tracing::debug!(transition = name, from = %self.current, to = %next, "applied transition");
        self.current = next;
        Ok(&self.current)
    }
}
