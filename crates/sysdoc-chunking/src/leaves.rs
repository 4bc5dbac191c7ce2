//! Depth-first flattening of a structure tree into content leaves.

use sysdoc_core::models::{NodeKind, StructureNode, StructureTree};

/// A node that carries chunkable content.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Leaf<'a> {
    pub kind: NodeKind,
    pub text: &'a str,
    pub path: &'a [String],
}

/// Collect content leaves in document order. Headings only contribute to
/// paths; blank nodes are dropped.
pub(crate) fn flatten(tree: &StructureTree) -> Vec<Leaf<'_>> {
    let mut out = Vec::new();
    for node in &tree.nodes {
        walk(node, &mut out);
    }
    out
}

fn walk<'a>(node: &'a StructureNode, out: &mut Vec<Leaf<'a>>) {
    if !node.is_heading() && !node.text.trim().is_empty() {
        out.push(Leaf {
            kind: node.kind,
            text: &node.text,
            path: &node.path,
        });
    }
    for child in &node.children {
        walk(child, out);
    }
}
