//! In-memory tag tree rebuilt from the node records of a container.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::{
    decode::DecodeOptions,
    error::{Error, Result},
    table::Container,
    types::NO_LINK,
    value::Value,
};

/// Index of a [`Tag`] inside its [`Document`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TagId(usize);

impl TagId {
    /// Position in document order
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named, typed value attached to a tag
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: Value,
}

/// One node of the tree
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    /// Attributes in the order they are stored
    pub attributes: Vec<Attribute>,
    pub parent: Option<TagId>,
    pub child: Option<TagId>,
    pub next: Option<TagId>,
}

impl Tag {
    /// First attribute called `key`
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.key == key)
    }

    /// Value of an [`Value::Int`] attribute
    pub fn int(&self, key: &str) -> Option<i32> {
        match self.attribute(key)?.value {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Value of a [`Value::String`] attribute
    pub fn string(&self, key: &str) -> Option<&str> {
        match &self.attribute(key)?.value {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Value of a [`Value::Id`] attribute
    pub fn id(&self, key: &str) -> Option<&str> {
        match &self.attribute(key)?.value {
            Value::Id(v) => Some(v),
            _ => None,
        }
    }

    /// Whether the tag is rendered self-closing
    pub fn is_leaf(&self) -> bool {
        self.child.is_none()
    }
}

/// Where a freshly built tag gets linked in
#[derive(Debug, Copy, Clone)]
enum Link {
    Root,
    ChildOf(TagId),
    NextOf(TagId),
}

#[derive(Debug)]
struct Pending {
    offset: i32,
    parent: Option<TagId>,
    depth: usize,
    link: Link,
}

/// All tags of one container, stored in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    tags: Vec<Tag>,
}

impl Document {
    /// Rebuild the tree starting from the node at offset zero of the tree table.
    ///
    /// Attributes that fail to resolve are skipped with a warning, except for errors that
    /// invalidate the whole container such as a hash attribute with a bad stride.
    pub fn build(container: &Container<'_>, options: &DecodeOptions) -> Result<Document> {
        let mut document = Document::default();
        let mut visited = HashSet::new();
        let mut stack = vec![Pending {
            offset: 0,
            parent: None,
            depth: 0,
            link: Link::Root,
        }];

        while let Some(pending) = stack.pop() {
            if pending.depth > options.max_depth {
                return Err(Error::DepthExceeded(options.max_depth));
            }
            if !visited.insert(pending.offset) {
                return Err(Error::TreeCycle {
                    offset: pending.offset,
                });
            }

            let record = container.node(pending.offset)?;
            if (record.first_child == NO_LINK) != (record.last_child == NO_LINK) {
                return Err(Error::InconsistentChildren {
                    offset: pending.offset,
                });
            }

            let name = container.string(record.name)?;
            debug!(offset = pending.offset, depth = pending.depth, "building <{}>", name);

            let records = container.attributes(pending.offset, record.attribute_count)?;
            let mut attributes = Vec::with_capacity(records.len());
            for attribute in records {
                let resolved = container
                    .string(attribute.name)
                    .and_then(|key| Ok((key, Value::resolve(&attribute, container)?)));

                match resolved {
                    Ok((key, Some(value))) => attributes.push(Attribute { key, value }),
                    Ok((key, None)) => {
                        debug!("<{}> skipping {} with unknown type {}", name, key, attribute.kind)
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => warn!("<{}> skipping attribute: {}", name, e),
                }
            }

            let id = TagId(document.tags.len());
            document.tags.push(Tag {
                name,
                attributes,
                parent: pending.parent,
                child: None,
                next: None,
            });

            match pending.link {
                Link::Root => {}
                Link::ChildOf(parent) => document.tags[parent.0].child = Some(id),
                Link::NextOf(prev) => document.tags[prev.0].next = Some(id),
            }

            // the child is pushed last so the arena stays in document order
            if record.next != NO_LINK {
                stack.push(Pending {
                    offset: record.next,
                    parent: pending.parent,
                    depth: pending.depth,
                    link: Link::NextOf(id),
                });
            }
            if record.first_child != NO_LINK {
                stack.push(Pending {
                    offset: record.first_child,
                    parent: Some(id),
                    depth: pending.depth + 1,
                    link: Link::ChildOf(id),
                });
            }
        }

        Ok(document)
    }

    /// The first top level tag
    pub fn root(&self) -> Option<TagId> {
        (!self.tags.is_empty()).then_some(TagId(0))
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the document has no tags
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tag(&self, id: TagId) -> &Tag {
        &self.tags[id.0]
    }

    pub fn tag_mut(&mut self, id: TagId) -> &mut Tag {
        &mut self.tags[id.0]
    }

    pub fn parent(&self, id: TagId) -> Option<TagId> {
        self.tag(id).parent
    }

    /// Direct children of a tag, in order
    pub fn children(&self, id: TagId) -> impl Iterator<Item = TagId> + '_ {
        std::iter::successors(self.tag(id).child, |&c| self.tag(c).next)
    }

    /// Top level tags, in order
    pub fn roots(&self) -> impl Iterator<Item = TagId> + '_ {
        std::iter::successors(self.root(), |&c| self.tag(c).next)
    }

    /// Every tag, in document order
    pub fn iter(&self) -> impl Iterator<Item = (TagId, &Tag)> {
        self.tags.iter().enumerate().map(|(i, t)| (TagId(i), t))
    }

    /// Extracted paths of the `locale` tags listed under a `stringtable` tag.
    ///
    /// Only populated once the document has been written out.
    pub fn locale_sources(&self) -> Vec<&std::path::Path> {
        self.iter()
            .filter(|(_, tag)| tag.name == "stringtable")
            .flat_map(|(id, _)| self.children(id))
            .map(|id| self.tag(id))
            .filter(|tag| tag.name == "locale")
            .filter_map(|tag| match &tag.attribute("src")?.value {
                Value::Filename { output, .. } => output.as_deref(),
                _ => None,
            })
            .collect()
    }
}
