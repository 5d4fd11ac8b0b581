// src/payload/state.rs
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Primary value observed by a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum State {
    Text(String),
    Bool(bool),
}

impl State {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            State::Text(s) => Some(s),
            State::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            State::Bool(b) => Some(*b),
            State::Text(_) => None,
        }
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        State::Text(s)
    }
}

impl From<bool> for State {
    fn from(b: bool) -> Self {
        State::Bool(b)
    }
}

/// Result of a single check run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub state: State,
    pub attributes: HashMap<String, Value>,
}

impl Payload {
    pub fn new(state: impl Into<State>) -> Self {
        Self {
            state: state.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// String attribute lookup; `None` if missing or not a string.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}
