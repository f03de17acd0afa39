//! Rendered UI tree
//!
//! The question component projects definitions onto this tree. It is plain
//! data: it can be inspected in tests, dumped as JSON, or drawn by `ui`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Container,
    Question,
    Title,
    Instruction,
    Scale,
    Choice { multiple: bool },
    Option,
    TextInput { multiline: bool },
    NumericInput {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        slider: bool,
    },
    DateInput,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            key: None,
            text: None,
            children: Vec::new(),
        }
    }

    pub fn container(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Container).with_children(children)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// First direct child of the given kind
    pub fn child(&self, kind: &NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| &c.kind == kind)
    }

    /// All descendants (depth first, self excluded) whose kind matches
    pub fn descendants<'a>(&'a self, pred: &dyn Fn(&NodeKind) -> bool) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.collect(pred, &mut found);
        found
    }

    fn collect<'a>(&'a self, pred: &dyn Fn(&NodeKind) -> bool, found: &mut Vec<&'a Node>) {
        for child in &self.children {
            if pred(&child.kind) {
                found.push(child);
            }
            child.collect(pred, found);
        }
    }

    /// The input node of a question (scale, choice, typed input or placeholder)
    pub fn input(&self) -> Option<&Node> {
        self.children
            .iter()
            .find(|c| !matches!(c.kind, NodeKind::Title | NodeKind::Instruction))
    }

    /// Option labels under this node, in display order
    pub fn option_labels(&self) -> Vec<&str> {
        self.descendants(&|k| *k == NodeKind::Option)
            .into_iter()
            .filter_map(|n| n.text.as_deref())
            .collect()
    }

    /// Option keys under this node, in display order
    pub fn option_keys(&self) -> Vec<&str> {
        self.descendants(&|k| *k == NodeKind::Option)
            .into_iter()
            .filter_map(|n| n.key.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendants_depth_first() {
        let tree = Node::container(vec![
            Node::new(NodeKind::Scale).with_children(vec![
                Node::new(NodeKind::Option).with_key("a").with_text("A"),
                Node::new(NodeKind::Option).with_key("b").with_text("B"),
            ]),
            Node::new(NodeKind::Option).with_key("c").with_text("C"),
        ]);

        assert_eq!(tree.option_labels(), vec!["A", "B", "C"]);
        assert_eq!(tree.option_keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_serializes_kind_inline() {
        let node = Node::new(NodeKind::Choice { multiple: true }).with_key("q");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"kind": "choice", "multiple": true, "key": "q"})
        );
    }
}
