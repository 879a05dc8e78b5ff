//! Typed parse tree built from the walker events.
//!
//! Nodes live in a flat arena and refer to each other by index, so parent
//! links need no shared ownership. Offsets and lengths are byte spans into
//! the original source.

use crate::edit::Segment;
use crate::parser::{walk, ParseError, ParseErrorCode, ParseOptions, Scalar, Visitor};
use crate::syntax::SyntaxKind;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Array,
    Property,
    String,
    Number,
    Boolean,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub offset: usize,
    pub length: usize,
    /// Byte offset of the `:` separator of a property node.
    pub colon_offset: Option<usize>,
    pub parent: Option<NodeId>,
    /// A property node's children are exactly [key, value].
    pub children: Vec<NodeId>,
    pub value: Option<Scalar>,
}

impl Node {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// The parse tree of a document. Empty input produces a tree without root.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Resolves a path of property names and array indices to the node it
    /// addresses. An empty path addresses the root.
    pub fn node_at_path(&self, path: &[Segment]) -> Option<NodeId> {
        let mut id = self.root?;
        for segment in path {
            id = self.child_at(id, segment)?;
        }
        Some(id)
    }

    pub(crate) fn child_at(&self, id: NodeId, segment: &Segment) -> Option<NodeId> {
        let node = &self.nodes[id];
        match (node.kind, segment) {
            (NodeKind::Object, Segment::Property(name)) => {
                for &prop in &node.children {
                    if let Some(value) = self.property_value(prop, name) {
                        return Some(value);
                    }
                }
                None
            }
            (NodeKind::Array, Segment::Index(i)) if *i >= 0 => {
                node.children.get(*i as usize).copied()
            }
            _ => None,
        }
    }

    fn property_value(&self, prop: NodeId, name: &str) -> Option<NodeId> {
        let node = &self.nodes[prop];
        if node.kind != NodeKind::Property || node.children.len() != 2 {
            return None;
        }
        match &self.nodes[node.children[0]].value {
            Some(Scalar::String(key)) if key == name => Some(node.children[1]),
            _ => None,
        }
    }

    /// The property names of an object node, in source order.
    pub fn property_keys(&self, object: NodeId) -> Vec<String> {
        let mut keys = Vec::new();
        for &prop in &self.nodes[object].children {
            let node = &self.nodes[prop];
            if node.kind != NodeKind::Property || node.children.is_empty() {
                continue;
            }
            if let Some(Scalar::String(key)) = &self.nodes[node.children[0]].value {
                keys.push(key.clone());
            }
        }
        keys
    }
}

/// Parses `source` into a [`Tree`], collecting errors instead of failing.
pub fn parse_tree(source: &str, options: ParseOptions) -> (Tree, Vec<ParseError>) {
    let mut builder = TreeBuilder {
        tree: Tree::default(),
        stack: Vec::new(),
        errors: Vec::new(),
    };
    walk(source, options, &mut builder);
    (builder.tree, builder.errors)
}

struct TreeBuilder {
    tree: Tree,
    stack: Vec<NodeId>,
    errors: Vec<ParseError>,
}

impl TreeBuilder {
    fn add_node(
        &mut self,
        kind: NodeKind,
        offset: usize,
        length: usize,
        value: Option<Scalar>,
    ) -> NodeId {
        let id = self.tree.nodes.len();
        let parent = self.stack.last().copied();
        self.tree.nodes.push(Node {
            kind,
            offset,
            length,
            colon_offset: None,
            parent,
            children: Vec::new(),
            value,
        });
        match parent {
            Some(p) => self.tree.nodes[p].children.push(id),
            None => {
                if self.tree.root.is_none() {
                    self.tree.root = Some(id);
                }
            }
        }
        id
    }

    // A property node spans from its key to the end of its value; it is
    // closed when the value arrives (or its container closes without one).
    fn complete_property(&mut self, end: usize) {
        if let Some(&top) = self.stack.last() {
            if self.tree.nodes[top].kind == NodeKind::Property {
                self.tree.nodes[top].length = end - self.tree.nodes[top].offset;
                self.stack.pop();
            }
        }
    }

    fn close_container(&mut self, offset: usize, length: usize) {
        self.complete_property(offset);
        if let Some(top) = self.stack.pop() {
            self.tree.nodes[top].length = offset + length - self.tree.nodes[top].offset;
        }
        self.complete_property(offset + length);
    }
}

impl Visitor for TreeBuilder {
    fn on_object_begin(&mut self, offset: usize) {
        let id = self.add_node(NodeKind::Object, offset, 0, None);
        self.stack.push(id);
    }

    fn on_object_end(&mut self, offset: usize, length: usize) {
        self.close_container(offset, length);
    }

    fn on_array_begin(&mut self, offset: usize) {
        let id = self.add_node(NodeKind::Array, offset, 0, None);
        self.stack.push(id);
    }

    fn on_array_end(&mut self, offset: usize, length: usize) {
        self.close_container(offset, length);
    }

    fn on_property(&mut self, name: &str, offset: usize, length: usize) {
        let prop = self.add_node(NodeKind::Property, offset, 0, None);
        self.stack.push(prop);
        self.add_node(
            NodeKind::String,
            offset,
            length,
            Some(Scalar::String(name.to_string())),
        );
    }

    fn on_value(&mut self, value: &Scalar, offset: usize, length: usize, _kind: SyntaxKind) {
        let kind = match value {
            Scalar::Null => NodeKind::Null,
            Scalar::Bool(_) => NodeKind::Boolean,
            Scalar::Number(_) => NodeKind::Number,
            Scalar::String(_) => NodeKind::String,
        };
        self.add_node(kind, offset, length, Some(value.clone()));
        self.complete_property(offset + length);
    }

    fn on_separator(&mut self, ch: char, offset: usize, _length: usize) {
        if ch == ':' {
            if let Some(&top) = self.stack.last() {
                if self.tree.nodes[top].kind == NodeKind::Property {
                    self.tree.nodes[top].colon_offset = Some(offset);
                }
            }
        }
    }

    fn on_error(&mut self, code: ParseErrorCode, offset: usize, length: usize) {
        self.errors.push(ParseError {
            code,
            offset,
            length,
        });
    }
}
