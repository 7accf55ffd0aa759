//! Dynamically typed API results.
//!
//! Every mapped element becomes an [`Entity`]. Structured elements keep their
//! attribute and child-element values in one field map, and pluralized
//! containers (`<photos>` holding `<photo>`s) additionally expose their items
//! positionally. Field lookups never fail: an unknown name is simply `None`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker for structured entities produced by a registered variant constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    User,
    Photo,
    Custom(String),
}

/// Result of mapping one XML element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    /// Leaf element text; `None` when the element had no text at all
    Text(Option<String>),
    Object(Response),
    List(Vec<Entity>),
}

/// A structured element: tag, named fields and positional items
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    tag: String,
    fields: BTreeMap<String, Entity>,
    children: Vec<Entity>,
    variant: Option<Variant>,
}

impl Response {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub(crate) fn from_parts(
        tag: String,
        fields: BTreeMap<String, Entity>,
        children: Vec<Entity>,
    ) -> Self {
        Self {
            tag,
            fields,
            children,
            variant: None,
        }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn variant(&self) -> Option<&Variant> {
        self.variant.as_ref()
    }

    /// Field by name; absent fields resolve to `None`
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.fields.get(name)
    }

    /// Text of a field, when the field exists and is a text value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Entity::text)
    }

    pub fn fields(&self) -> &BTreeMap<String, Entity> {
        &self.fields
    }

    pub fn items(&self) -> &[Entity] {
        &self.children
    }

    pub fn item(&self, index: usize) -> Option<&Entity> {
        self.children.get(index)
    }

    pub fn last(&self) -> Option<&Entity> {
        self.children.last()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.children.iter()
    }

    pub fn into_items(self) -> Vec<Entity> {
        self.children
    }
}

impl<'a> IntoIterator for &'a Response {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

impl Entity {
    /// Text of a leaf entity
    pub fn text(&self) -> Option<&str> {
        match self {
            Entity::Text(text) => text.as_deref(),
            _ => None,
        }
    }

    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Entity::Object(response) => Some(response),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Entity]> {
        match self {
            Entity::List(items) => Some(items),
            _ => None,
        }
    }

    /// Field lookup; anything that is not a structured entity has no fields
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.as_response().and_then(|response| response.get(name))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Entity::text)
    }

    /// Positional items: a container's children, or the entries of a list
    pub fn items(&self) -> &[Entity] {
        match self {
            Entity::Object(response) => response.items(),
            Entity::List(items) => items,
            Entity::Text(_) => &[],
        }
    }

    pub fn item(&self, index: usize) -> Option<&Entity> {
        self.items().get(index)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.items().iter()
    }

    pub fn into_items(self) -> Vec<Entity> {
        match self {
            Entity::Object(response) => response.into_items(),
            Entity::List(items) => items,
            Entity::Text(_) => Vec::new(),
        }
    }

    /// Plain JSON rendering: text as strings, structured entities as objects
    /// with `_tag` and, for containers, `_items`
    pub fn to_json(&self) -> Value {
        match self {
            Entity::Text(Some(text)) => Value::String(text.clone()),
            Entity::Text(None) => Value::Null,
            Entity::List(items) => Value::Array(items.iter().map(Entity::to_json).collect()),
            Entity::Object(response) => {
                let mut map = Map::new();
                map.insert("_tag".to_string(), Value::String(response.tag.clone()));
                for (name, value) in &response.fields {
                    map.insert(name.clone(), value.to_json());
                }
                if !response.children.is_empty() {
                    map.insert(
                        "_items".to_string(),
                        Value::Array(response.children.iter().map(Entity::to_json).collect()),
                    );
                }
                Value::Object(map)
            }
        }
    }

    /// Indented multi-line dump of the whole structure
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        write_entity(&mut out, self, 0);
        out
    }
}

impl From<Response> for Entity {
    fn from(response: Response) -> Self {
        Entity::Object(response)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pretty().trim_end())
    }
}

fn write_entity(out: &mut String, entity: &Entity, indent: usize) {
    let pad = " ".repeat(indent);
    match entity {
        Entity::Text(Some(text)) => out.push_str(&format!("{}{:?}\n", pad, text)),
        Entity::Text(None) => out.push_str(&format!("{}(none)\n", pad)),
        Entity::List(items) => {
            for item in items {
                write_entity(out, item, indent);
            }
        }
        Entity::Object(response) => {
            out.push_str(&format!("{}<{}>", pad, response.tag));
            for (name, value) in &response.fields {
                match value {
                    Entity::Text(Some(text)) => out.push_str(&format!(" {}={:?}", name, text)),
                    Entity::Text(None) => out.push_str(&format!(" {}=(none)", name)),
                    _ => {}
                }
            }
            out.push('\n');
            for (name, value) in &response.fields {
                if !matches!(value, Entity::Text(_)) {
                    out.push_str(&format!("{}  .{}\n", pad, name));
                    write_entity(out, value, indent + 4);
                }
            }
            for child in &response.children {
                write_entity(out, child, indent + 2);
            }
        }
    }
}
