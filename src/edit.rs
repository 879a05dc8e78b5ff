//! Path-addressed edit computation and application.
//!
//! Edits are minimal byte-range replacements: locating the addressed node
//! takes one walker pass, the splice is computed against the node spans,
//! and the formatter re-indents the affected lines. Callers receive the
//! collapsed result and apply it with [`apply_edits`].

use crate::formatter::{format_range, is_eol, FormatOptions};
use crate::parser::ParseOptions;
use crate::scanner::{ScanOptions, Scanner, Token};
use crate::syntax::SyntaxKind;
use crate::tree::{parse_tree, Node, NodeId, NodeKind, Tree};
use crate::util::escape::quote;
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A single text replacement: `source[offset..offset + length]` becomes
/// `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub offset: usize,
    pub length: usize,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("the path does not address a value in the document")]
    PathNotFound,
    #[error("path segment does not match the addressed container")]
    InvalidPathSegment,
    #[error("the value cannot be serialised to JSON")]
    Unserializable,
    #[error("edits overlap")]
    OverlappingEdits,
    #[error("edit reaches outside the source or splits a UTF-8 sequence")]
    InvalidEdit,
}

/// One step of a [`Path`]: a property name or an array index.
/// `Index(-1)` denotes appending to an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Property(String),
    Index(isize),
}

/// A sequence of segments addressing a value inside a document.
/// The empty path addresses the root.
pub type Path = Vec<Segment>;

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Segment::Property(name.to_string())
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Segment::Property(name)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index as isize)
    }
}

impl From<isize> for Segment {
    fn from(index: isize) -> Self {
        Segment::Index(index)
    }
}

impl From<i32> for Segment {
    fn from(index: i32) -> Self {
        Segment::Index(index as isize)
    }
}

// The external JSON form of a path is a plain array mixing strings and
// indices, e.g. `["a","",0,1]`.
impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Segment::Property(name) => serializer.serialize_str(name),
            Segment::Index(index) => serializer.serialize_i64(*index as i64),
        }
    }
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SegmentVisitor;

        impl<'de> Visitor<'de> for SegmentVisitor {
            type Value = Segment;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a property name or a non-negative array index")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Segment, E> {
                Ok(Segment::Property(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Segment, E> {
                Ok(Segment::Index(v as isize))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Segment, E> {
                if v < 0 {
                    return Err(E::custom("array index must be non-negative"));
                }
                Ok(Segment::Index(v as isize))
            }
        }

        deserializer.deserialize_any(SegmentVisitor)
    }
}

/// Builds a path of property names.
pub fn property_path<I>(names: I) -> Path
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    names
        .into_iter()
        .map(|name| Segment::Property(name.into()))
        .collect()
}

/// Builds a path from mixed property names and array indices:
/// `make_path!["foo", 0]`.
#[macro_export]
macro_rules! make_path {
    ($($segment:expr),* $(,)?) => {
        vec![$($crate::edit::Segment::from($segment)),*]
    };
}

/// The replacement payload for [`compute_property_edit`].
#[derive(Debug, Clone, PartialEq)]
pub enum NewValue {
    /// Serialised with the canonical JSON encoder; object keys keep their
    /// insertion order.
    Json(Value),
    /// Pre-serialised JSON (may contain comments), spliced in verbatim.
    Raw(String),
}

impl NewValue {
    pub fn raw(content: impl Into<String>) -> Self {
        NewValue::Raw(content.into())
    }

    fn to_json(&self) -> Result<String, EditError> {
        match self {
            NewValue::Json(value) => {
                serde_json::to_string(value).map_err(|_| EditError::Unserializable)
            }
            NewValue::Raw(content) => Ok(content.clone()),
        }
    }

    // `"key": value`, except that raw content starting with whitespace
    // supplies its own separation.
    fn property_text(&self, key: &str) -> Result<String, EditError> {
        let value = self.to_json()?;
        let space = if value.starts_with(|c: char| c.is_whitespace()) {
            ""
        } else {
            " "
        };
        Ok(format!("{}:{}{}", quote(key), space, value))
    }
}

impl From<Value> for NewValue {
    fn from(value: Value) -> Self {
        NewValue::Json(value)
    }
}

/// Computes the edits that set the value addressed by `path` to `value`,
/// inserting missing containers along the way. `insert_index` may place a
/// new property among the existing ones (given their names in source
/// order); by default new entries append.
pub fn compute_property_edit(
    text: &str,
    path: &[Segment],
    value: impl Into<NewValue>,
    insert_index: Option<&dyn Fn(&[String]) -> usize>,
    options: &FormatOptions,
) -> Result<Vec<Edit>, EditError> {
    set_property(text, path, Some(value.into()), insert_index, options)
}

/// Computes the edits that remove the property or array element addressed
/// by `path`. A path that addresses nothing yields no edits.
pub fn compute_property_removal(
    text: &str,
    path: &[Segment],
    options: &FormatOptions,
) -> Result<Vec<Edit>, EditError> {
    set_property(text, path, None, None, options)
}

fn set_property(
    text: &str,
    path: &[Segment],
    value: Option<NewValue>,
    insert_index: Option<&dyn Fn(&[String]) -> usize>,
    options: &FormatOptions,
) -> Result<Vec<Edit>, EditError> {
    let (tree, _) = parse_tree(text, ParseOptions::default());

    let mut segments = path.to_vec();
    let mut value = value;
    let mut parent: Option<NodeId> = None;
    let mut last_segment: Option<Segment> = None;

    // Resolve the parent of the addressed node; missing levels are folded
    // into the value as freshly created containers.
    while let Some(segment) = segments.pop() {
        let found = tree.node_at_path(&segments);
        if found.is_none() && value.is_some() {
            value = match value.take() {
                Some(v) => Some(wrap_value(&segment, v)?),
                None => None,
            };
            last_segment = Some(segment);
            continue;
        }
        parent = found;
        last_segment = Some(segment);
        break;
    }

    let parent = match parent {
        Some(parent) => parent,
        None => {
            // The whole root value is replaced (or created).
            let value = match value {
                Some(v) => v,
                None if last_segment.is_none() => return Err(EditError::InvalidPathSegment),
                None => return Err(EditError::PathNotFound),
            };
            let (offset, length) = match tree.root() {
                Some(root) => {
                    let node = tree.node(root);
                    (node.offset, node.length)
                }
                None => (0, 0),
            };
            return with_formatting(
                text,
                Edit {
                    offset,
                    length,
                    content: value.to_json()?,
                },
                options,
            );
        }
    };

    let last_segment = match last_segment {
        Some(segment) => segment,
        None => return Err(EditError::InvalidPathSegment),
    };
    let parent_node = tree.node(parent);

    match (parent_node.kind, &last_segment) {
        (NodeKind::Object, Segment::Property(name)) => {
            match tree.child_at(parent, &last_segment) {
                Some(existing) => match value {
                    None => {
                        let prop = match tree.node(existing).parent {
                            Some(prop) => prop,
                            None => return Err(EditError::PathNotFound),
                        };
                        let index = match parent_node.children.iter().position(|&c| c == prop) {
                            Some(index) => index,
                            None => return Err(EditError::PathNotFound),
                        };
                        remove_child(text, &tree, parent, index, options)
                    }
                    Some(v) => {
                        let node = tree.node(existing);
                        with_formatting(
                            text,
                            Edit {
                                offset: node.offset,
                                length: node.length,
                                content: v.to_json()?,
                            },
                            options,
                        )
                    }
                },
                None => match value {
                    // The property does not exist; nothing to remove.
                    None => Ok(Vec::new()),
                    Some(v) => {
                        let children = &parent_node.children;
                        let index = match insert_index {
                            Some(f) => f(&tree.property_keys(parent)).min(children.len()),
                            None => children.len(),
                        };
                        let content = v.property_text(name)?;
                        let edit = if index > 0 {
                            let previous = tree.node(children[index - 1]);
                            Edit {
                                offset: previous.end(),
                                length: 0,
                                content: format!(",{}", content),
                            }
                        } else if children.is_empty() {
                            Edit {
                                offset: parent_node.offset + 1,
                                length: 0,
                                content,
                            }
                        } else {
                            Edit {
                                offset: parent_node.offset + 1,
                                length: 0,
                                content: format!("{},", content),
                            }
                        };
                        with_formatting(text, edit, options)
                    }
                },
            }
        }
        (NodeKind::Array, Segment::Index(index)) => {
            let children = &parent_node.children;
            if *index < 0 {
                // Append.
                let v = match value {
                    Some(v) => v,
                    None => return Err(EditError::InvalidPathSegment),
                };
                let content = v.to_json()?;
                let edit = match children.last() {
                    None => Edit {
                        offset: parent_node.offset + 1,
                        length: 0,
                        content,
                    },
                    Some(&last) => Edit {
                        offset: tree.node(last).end(),
                        length: 0,
                        content: format!(",{}", content),
                    },
                };
                return with_formatting(text, edit, options);
            }
            let index = *index as usize;
            match value {
                None => {
                    if index >= children.len() {
                        return Err(EditError::PathNotFound);
                    }
                    remove_child(text, &tree, parent, index, options)
                }
                Some(v) => {
                    if index < children.len() {
                        let node = tree.node(children[index]);
                        with_formatting(
                            text,
                            Edit {
                                offset: node.offset,
                                length: node.length,
                                content: v.to_json()?,
                            },
                            options,
                        )
                    } else {
                        // Out-of-range indices clamp to append.
                        let content = v.to_json()?;
                        let edit = match children.last() {
                            None => Edit {
                                offset: parent_node.offset + 1,
                                length: 0,
                                content,
                            },
                            Some(&last) => Edit {
                                offset: tree.node(last).end(),
                                length: 0,
                                content: format!(",{}", content),
                            },
                        };
                        with_formatting(text, edit, options)
                    }
                }
            }
        }
        (NodeKind::Object, _) | (NodeKind::Array, _) => Err(EditError::InvalidPathSegment),
        _ => Err(EditError::PathNotFound),
    }
}

// A freshly created level: a missing property becomes an object, a missing
// index an array, holding the value built so far.
fn wrap_value(segment: &Segment, value: NewValue) -> Result<NewValue, EditError> {
    Ok(match (segment, value) {
        (Segment::Property(name), NewValue::Json(v)) => {
            let mut map = serde_json::Map::new();
            map.insert(name.clone(), v);
            NewValue::Json(Value::Object(map))
        }
        (Segment::Property(name), NewValue::Raw(raw)) => {
            NewValue::Raw(format!("{{{}: {}}}", quote(name), raw))
        }
        (Segment::Index(_), NewValue::Json(v)) => NewValue::Json(Value::Array(vec![v])),
        (Segment::Index(_), NewValue::Raw(raw)) => NewValue::Raw(format!("[{}]", raw)),
    })
}

fn remove_child(
    text: &str,
    tree: &Tree,
    parent: NodeId,
    index: usize,
    options: &FormatOptions,
) -> Result<Vec<Edit>, EditError> {
    let parent_node = tree.node(parent);
    let children = &parent_node.children;
    let target = tree.node(children[index]);

    if children.len() == 1 {
        // Collapse to an empty container, unless comments inside would be
        // destroyed with it.
        let inner_start = parent_node.offset + 1;
        let inner_end = parent_node.end().saturating_sub(1).max(inner_start);
        let around_has_comments = has_comments(&text[inner_start..target.offset.max(inner_start)])
            || has_comments(&text[target.end().min(inner_end)..inner_end]);
        if !around_has_comments {
            return with_formatting(
                text,
                Edit {
                    offset: inner_start,
                    length: inner_end - inner_start,
                    content: String::new(),
                },
                options,
            );
        }
        return excise_element(text, parent_node, target, options);
    }

    let (begin, end) = if parent_node.kind == NodeKind::Object {
        if index > 0 {
            // The separating comma before the property goes with it; an
            // original trailing comma stays.
            (tree.node(children[index - 1]).end(), target.end())
        } else {
            (parent_node.offset + 1, tree.node(children[1]).offset)
        }
    } else if index == children.len() - 1 {
        // Everything from the previous element up to the closing bracket,
        // so no comma dangles.
        (
            tree.node(children[index - 1]).end(),
            parent_node.end().saturating_sub(1),
        )
    } else {
        (target.offset, tree.node(children[index + 1]).offset)
    };

    if has_comments(&text[begin..end]) {
        return excise_element(text, parent_node, target, options);
    }
    with_formatting(
        text,
        Edit {
            offset: begin,
            length: end - begin,
            content: String::new(),
        },
        options,
    )
}

// Comment-preserving removal: only the element itself and one adjacent
// comma are excised.
fn excise_element(
    text: &str,
    parent_node: &Node,
    target: &Node,
    options: &FormatOptions,
) -> Result<Vec<Edit>, EditError> {
    let tokens: Vec<Token> = Scanner::new(
        &text[parent_node.offset..parent_node.end()],
        ScanOptions { trivia: true },
    )
    .collect();
    let target_start = target.offset - parent_node.offset;
    let target_end = target.end() - parent_node.offset;

    let mut begin = target.offset;
    let mut end = target.end();

    // A comma following the element (across plain whitespace) is removed
    // with any inline whitespace after it.
    let mut after = tokens
        .iter()
        .skip_while(|t| t.offset < target_end)
        .skip_while(|t| matches!(t.kind, SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE));
    if let Some(token) = after.next() {
        if token.kind == SyntaxKind::COMMA {
            end = parent_node.offset + token.offset + token.length;
            if let Some(next) = after.next() {
                if next.kind == SyntaxKind::WHITESPACE {
                    end += next.length;
                }
            }
            return with_formatting(
                text,
                Edit {
                    offset: begin,
                    length: end - begin,
                    content: String::new(),
                },
                options,
            );
        }
    }

    // Otherwise a comma preceding it is removed together with the
    // whitespace in between.
    for token in tokens.iter().rev() {
        if token.offset + token.length > target_start {
            continue;
        }
        if matches!(token.kind, SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE) {
            continue;
        }
        if token.kind == SyntaxKind::COMMA {
            begin = parent_node.offset + token.offset;
        }
        break;
    }
    with_formatting(
        text,
        Edit {
            offset: begin,
            length: end - begin,
            content: String::new(),
        },
        options,
    )
}

// Applies the splice, formats the touched lines, and collapses splice and
// format edits into a single replacement against the original text.
fn with_formatting(
    text: &str,
    edit: Edit,
    options: &FormatOptions,
) -> Result<Vec<Edit>, EditError> {
    let mut new_text = apply_edit(text, &edit)?;

    let mut begin = edit.offset;
    let mut end = edit.offset + edit.content.len();
    if edit.length == 0 || edit.content.is_empty() {
        // Pure insertions and removals widen to whole lines.
        while begin > 0 && !is_eol(&new_text, begin - 1) {
            begin -= 1;
        }
        while end < new_text.len() && !is_eol(&new_text, end) {
            end += 1;
        }
    }

    let format_edits = format_range(&new_text, begin, end - begin, options);
    for e in format_edits.iter().rev() {
        new_text = apply_edit(&new_text, e)?;
        begin = begin.min(e.offset);
        end = end.max(e.offset + e.length) - e.length + e.content.len();
    }

    let length = text.len() - (new_text.len() - end) - begin;
    Ok(vec![Edit {
        offset: begin,
        length,
        content: new_text[begin..end].to_string(),
    }])
}

fn has_comments(text: &str) -> bool {
    Scanner::new(text, ScanOptions { trivia: true }).any(|t| t.kind.is_comment())
}

/// Applies a set of non-overlapping edits, validating and sorting them by
/// descending offset first so earlier offsets stay valid.
pub fn apply_edits(text: &str, edits: &[Edit]) -> Result<String, EditError> {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by(|a, b| b.offset.cmp(&a.offset));
    for pair in sorted.windows(2) {
        if pair[1].offset + pair[1].length > pair[0].offset {
            return Err(EditError::OverlappingEdits);
        }
    }
    let mut result = text.to_string();
    for edit in sorted {
        result = apply_edit(&result, edit)?;
    }
    Ok(result)
}

fn apply_edit(text: &str, edit: &Edit) -> Result<String, EditError> {
    let end = match edit.offset.checked_add(edit.length) {
        Some(end) if end <= text.len() => end,
        _ => return Err(EditError::InvalidEdit),
    };
    if !text.is_char_boundary(edit.offset) || !text.is_char_boundary(end) {
        return Err(EditError::InvalidEdit);
    }
    let mut result = String::with_capacity(text.len() + edit.content.len());
    result.push_str(&text[..edit.offset]);
    result.push_str(&edit.content);
    result.push_str(&text[end..]);
    Ok(result)
}
