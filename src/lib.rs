pub mod edit;
pub mod formatter;
pub mod parser;
pub mod scanner;
pub mod syntax;
pub mod tree;
pub mod util;

pub use edit::{
    apply_edits, compute_property_edit, compute_property_removal, property_path, Edit, EditError,
    NewValue, Path, Segment,
};
pub use formatter::{format, format_range, FormatOptions};
pub use parser::{parse, walk, ParseError, ParseErrorCode, ParseOptions, Scalar, Visitor};
pub use scanner::{ScanOptions, Scanner, Token};
pub use syntax::{ScanError, SyntaxKind};
pub use tree::{parse_tree, Node, NodeId, NodeKind, Tree};
