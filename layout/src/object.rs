use crate::archetype::NodeDescriptor;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A domain object instance: its archetype short name plus node values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IMObject {
    pub archetype: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl IMObject {
    pub fn new(archetype: &str) -> Self {
        Self {
            archetype: archetype.to_string(),
            id: None,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, node: &str, value: impl Into<Value>) -> Self {
        self.set(node, value);
        self
    }

    pub fn set(&mut self, node: &str, value: impl Into<Value>) {
        self.values.insert(node.to_string(), value.into());
    }

    pub fn value(&self, node: &str) -> Option<&Value> {
        self.values.get(node)
    }

    /// True when the node is unset, null, an empty string or an empty
    /// collection.
    pub fn is_empty(&self, node: &str) -> bool {
        self.value(node).is_none_or(is_empty_value)
    }
}

pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// A node of a specific object, as handed to a component factory.
#[derive(Debug, Clone, Copy)]
pub struct Property<'a> {
    pub descriptor: &'a NodeDescriptor,
    pub value: Option<&'a Value>,
}

impl<'a> Property<'a> {
    pub fn of(object: &'a IMObject, descriptor: &'a NodeDescriptor) -> Self {
        Self {
            descriptor,
            value: object.value(&descriptor.name),
        }
    }

    pub fn name(&self) -> &'a str {
        &self.descriptor.name
    }

    pub fn display_name(&self) -> &'a str {
        &self.descriptor.display_name
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none_or(is_empty_value)
    }

    /// The value as display text. Strings are unquoted; null is empty.
    pub fn text(&self) -> String {
        match self.value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_values() {
        let object = IMObject::new("party.customerperson")
            .with_value("firstName", "")
            .with_value("contacts", json!([]))
            .with_value("active", true);
        assert!(object.is_empty("firstName"));
        assert!(object.is_empty("contacts"));
        assert!(object.is_empty("lastName"));
        assert!(!object.is_empty("active"));
    }

    #[test]
    fn property_text_unquotes_strings() {
        let descriptor = NodeDescriptor::simple("name");
        let object = IMObject::new("party.patientpet").with_value("name", "Fido");
        assert_eq!(Property::of(&object, &descriptor).text(), "Fido");
    }
}
