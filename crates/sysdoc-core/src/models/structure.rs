use serde::{Deserialize, Serialize};

/// Kind of a node in a parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Heading,
    Paragraph,
    Table,
    CodeBlock,
    ListItem,
}

impl NodeKind {
    /// Tables and code blocks are never split across chunks.
    pub fn is_atomic(self) -> bool {
        matches!(self, NodeKind::Table | NodeKind::CodeBlock)
    }
}

/// A node of a document's normalized tree.
///
/// `path` holds the headings above this node. A child's path is its parent's
/// path, plus the parent's text when the parent is a heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureNode {
    pub kind: NodeKind,
    /// Heading depth, 0 for anything that is not a heading.
    #[serde(default)]
    pub level: u8,
    pub text: String,
    #[serde(default)]
    pub children: Vec<StructureNode>,
    #[serde(default)]
    pub path: Vec<String>,
}

impl StructureNode {
    fn new(kind: NodeKind, level: u8, text: impl Into<String>) -> Self {
        Self {
            kind,
            level,
            text: text.into(),
            children: Vec::new(),
            path: Vec::new(),
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(NodeKind::Heading, level.max(1), text)
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Paragraph, 0, text)
    }

    pub fn table(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Table, 0, text)
    }

    pub fn code_block(text: impl Into<String>) -> Self {
        Self::new(NodeKind::CodeBlock, 0, text)
    }

    pub fn list_item(text: impl Into<String>) -> Self {
        Self::new(NodeKind::ListItem, 0, text)
    }

    pub fn with_children(mut self, children: Vec<StructureNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_heading(&self) -> bool {
        self.kind == NodeKind::Heading
    }

    /// The path every direct child of this node must carry.
    pub fn child_path(&self) -> Vec<String> {
        let mut path = self.path.clone();
        if self.is_heading() {
            path.push(self.text.trim().to_string());
        }
        path
    }

    fn assign_paths(&mut self, path: Vec<String>) {
        self.path = path;
        let child_path = self.child_path();
        for child in &mut self.children {
            child.assign_paths(child_path.clone());
        }
    }

    fn paths_valid(&self, expected: &[String]) -> bool {
        if self.path != expected {
            return false;
        }
        let child_path = self.child_path();
        self.children.iter().all(|c| c.paths_valid(&child_path))
    }

    fn collect_leaf_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        if !self.is_heading() && !self.text.trim().is_empty() {
            out.push(&self.text);
        }
        for child in &self.children {
            child.collect_leaf_texts(out);
        }
    }
}

/// A whole parsed document: an ordered forest of top-level nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureTree {
    pub document_id: String,
    #[serde(default)]
    pub nodes: Vec<StructureNode>,
}

impl StructureTree {
    /// Build a tree and derive every node's path from its ancestors.
    pub fn new(document_id: impl Into<String>, nodes: Vec<StructureNode>) -> Self {
        let mut tree = Self {
            document_id: document_id.into(),
            nodes,
        };
        tree.rebuild_paths();
        tree
    }

    pub fn empty(document_id: impl Into<String>) -> Self {
        Self::new(document_id, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recompute all paths from the heading hierarchy.
    pub fn rebuild_paths(&mut self) {
        for node in &mut self.nodes {
            node.assign_paths(Vec::new());
        }
    }

    /// Whether every node satisfies the path invariant.
    pub fn validate_paths(&self) -> bool {
        self.nodes.iter().all(|n| n.paths_valid(&[]))
    }

    /// Content of every non-heading node, depth-first, in document order.
    pub fn leaf_texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.collect_leaf_texts(&mut out);
        }
        out
    }

    /// All leaf text joined, used for document-type detection.
    pub fn full_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        fn walk(node: &StructureNode, parts: &mut Vec<String>) {
            parts.push(node.text.clone());
            for child in &node.children {
                walk(child, parts);
            }
        }
        for node in &self.nodes {
            walk(node, &mut parts);
        }
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StructureTree {
        StructureTree::new(
            "doc-1",
            vec![StructureNode::heading(1, "Users").with_children(vec![
                StructureNode::paragraph("intro"),
                StructureNode::heading(2, "Create").with_children(vec![
                    StructureNode::paragraph("POST body"),
                    StructureNode::list_item("item").with_children(vec![
                        StructureNode::list_item("nested"),
                    ]),
                ]),
            ])],
        )
    }

    #[test]
    fn paths_follow_heading_hierarchy() {
        let tree = sample();
        let users = &tree.nodes[0];
        assert!(users.path.is_empty());
        assert_eq!(users.children[0].path, vec!["Users"]);
        let create = &users.children[1];
        assert_eq!(create.children[0].path, vec!["Users", "Create"]);
        // A non-heading parent passes its path through unchanged.
        let nested = &create.children[1].children[0];
        assert_eq!(nested.path, vec!["Users", "Create"]);
        assert!(tree.validate_paths());
    }

    #[test]
    fn tampered_path_is_detected_and_repaired() {
        let mut tree = sample();
        tree.nodes[0].children[0].path = vec!["Wrong".to_string()];
        assert!(!tree.validate_paths());
        tree.rebuild_paths();
        assert!(tree.validate_paths());
    }

    #[test]
    fn leaf_texts_skip_headings() {
        let tree = sample();
        assert_eq!(tree.leaf_texts(), vec!["intro", "POST body", "item", "nested"]);
    }

    #[test]
    fn deserializes_without_paths() {
        let json = r#"{"document_id":"d","nodes":[{"kind":"heading","level":1,"text":"A",
            "children":[{"kind":"paragraph","text":"x"}]}]}"#;
        let mut tree: StructureTree = serde_json::from_str(json).unwrap();
        tree.rebuild_paths();
        assert_eq!(tree.nodes[0].children[0].path, vec!["A"]);
    }
}
