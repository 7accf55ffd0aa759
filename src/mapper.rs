//! Response mapping: XML node tree to [`Entity`].
//!
//! There is no schema to consult, so structure is inferred from shape:
//!
//! - an element with no attributes and no element children is its text;
//! - a tag ending in `s` treats children named by the tag minus that `s` as
//!   positional items (`<photos>` / `<photo>`); this is a literal suffix
//!   strip, so `<bus>` looks for `<bu>` children;
//! - container/child pairs listed in the [`MultiplesTable`] collect into a
//!   list-valued field;
//! - every other child becomes a single field, and a second value for the
//!   same field name is an [`Error::AttributeConflict`].

use std::collections::{BTreeMap, BTreeSet};

use crate::client::Session;
use crate::entity::{Entity, Response};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::variants::VariantRegistry;

/// Envelope attribute carrying the overall status
pub const STATUS_ATTRIBUTE: &str = "stat";
pub const STATUS_OK: &str = "ok";
/// Child element of a failing envelope
pub const ERROR_TAG: &str = "err";

/// Container tags whose children repeat without the container being a plural
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplesTable {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl MultiplesTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The repeating shapes known from the Flickr API
    pub fn standard() -> Self {
        Self::empty()
            .with_entry("activity", &["event"]) // flickr.activity.*
            .with_entry("iconsphoto", &["photo"]) // flickr.collections.getInfo
            .with_entry("collection", &["set", "collection"]) // flickr.collections.getTree
            .with_entry("category", &["subcat", "group"]) // flickr.groups.browse
            .with_entry("photo", &["exif", "person"]) // flickr.photos.getExif, getFavorites
            .with_entry("uploader", &["ticket"]) // flickr.photos.upload.checkTickets
            .with_entry("photoset", &["photo"]) // flickr.photosets.getPhotos
            .with_entry("cluster", &["tag"]) // flickr.tags.getClusters
            .with_entry("hottags", &["tag"]) // flickr.tags.getHotList
            .with_entry("tag", &["raw"]) // flickr.tags.getListUserRaw
            .with_entry("people", &["person"]) // flickr.photos.people.getList
    }

    pub fn with_entry(mut self, container: &str, children: &[&str]) -> Self {
        self.entries
            .entry(container.to_string())
            .or_default()
            .extend(children.iter().map(|child| child.to_string()));
        self
    }

    pub fn contains(&self, container: &str, child: &str) -> bool {
        self.entries
            .get(container)
            .is_some_and(|children| children.contains(child))
    }
}

impl Default for MultiplesTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Maps parsed responses into entities. Built once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ResponseMapper {
    variants: VariantRegistry,
    multiples: MultiplesTable,
}

impl ResponseMapper {
    pub fn new(variants: VariantRegistry, multiples: MultiplesTable) -> Self {
        Self {
            variants,
            multiples,
        }
    }

    pub fn variants(&self) -> &VariantRegistry {
        &self.variants
    }

    pub fn multiples(&self) -> &MultiplesTable {
        &self.multiples
    }

    /// Map a full response document, checking the envelope status first
    pub fn map_envelope(&self, session: &Session, envelope: &Node) -> Result<Entity> {
        if envelope.attribute(STATUS_ATTRIBUTE) != Some(STATUS_OK) {
            return Err(envelope_error(envelope));
        }

        match envelope.children.as_slice() {
            [payload] => self.map(session, payload),
            payloads => payloads
                .iter()
                .map(|payload| self.map(session, payload))
                .collect::<Result<Vec<_>>>()
                .map(Entity::List),
        }
    }

    /// Map one element, dispatching to a registered variant when there is one
    pub fn map(&self, session: &Session, node: &Node) -> Result<Entity> {
        if node.is_leaf() {
            return Ok(Entity::Text(node.text.clone()));
        }

        match self.variants.get(&node.tag) {
            Some(constructor) => constructor(self, session, node),
            None => self.structured(session, node).map(Entity::Object),
        }
    }

    /// Default structured construction; variant constructors delegate here
    pub fn structured(&self, session: &Session, node: &Node) -> Result<Response> {
        let singular = node.tag.strip_suffix('s');
        let mut fields: BTreeMap<String, Entity> = node
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), Entity::Text(Some(value.clone()))))
            .collect();
        let mut children = Vec::new();

        for child in &node.children {
            if Some(child.tag.as_str()) == singular {
                children.push(self.map(session, child)?);
            } else if self.multiples.contains(&node.tag, &child.tag) {
                match fields.get(&child.tag) {
                    None | Some(Entity::List(_)) => {}
                    Some(_) => return Err(conflict(node, child)),
                }
                let mapped = self.map(session, child)?;
                match fields
                    .entry(child.tag.clone())
                    .or_insert_with(|| Entity::List(Vec::new()))
                {
                    Entity::List(values) => values.push(mapped),
                    _ => return Err(conflict(node, child)),
                }
            } else {
                if fields.contains_key(&child.tag) {
                    return Err(conflict(node, child));
                }
                let mapped = self.map(session, child)?;
                fields.insert(child.tag.clone(), mapped);
            }
        }

        Ok(Response::from_parts(node.tag.clone(), fields, children))
    }
}

fn conflict(node: &Node, child: &Node) -> Error {
    Error::AttributeConflict {
        tag: node.tag.clone(),
        field: child.tag.clone(),
    }
}

fn envelope_error(envelope: &Node) -> Error {
    match envelope.child(ERROR_TAG) {
        Some(err) => Error::Protocol {
            code: err.attribute("code").unwrap_or_default().to_string(),
            message: err.attribute("msg").unwrap_or_default().to_string(),
        },
        None => Error::Protocol {
            code: String::new(),
            message: format!(
                "response status {:?} without an <{}> element",
                envelope.attribute(STATUS_ATTRIBUTE).unwrap_or(""),
                ERROR_TAG
            ),
        },
    }
}
