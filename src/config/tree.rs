//! Tree rendering for settings summaries
//!
//! Settings are displayed as a rooted tree of label/value lines, one root
//! line naming the category and one child per field.

use std::fmt;

/// Marker shown in place of a secret that has a value
pub const SECRET_SET: &str = "[set]";

/// Marker shown for a secret that is empty, and for any absent field
pub const NOT_SET: &str = "[not set]";

/// A node of a lines tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinesNode {
    line: String,
    children: Vec<LinesNode>,
}

impl LinesNode {
    /// Create a new root node
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            children: Vec::new(),
        }
    }

    /// Append a leaf line and return it so it can receive children
    pub fn append(&mut self, line: impl Into<String>) -> &mut LinesNode {
        self.children.push(LinesNode::new(line));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Append an existing subtree
    pub fn append_node(&mut self, node: LinesNode) {
        self.children.push(node);
    }

    /// The line of this node
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Children of this node, in insertion order
    pub fn children(&self) -> &[LinesNode] {
        &self.children
    }

    /// Rendered lines, prefixes included
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![self.line.clone()];
        self.push_children(&mut lines, "");
        lines
    }

    fn push_children(&self, lines: &mut Vec<String>, indent: &str) {
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            let last = i + 1 == count;
            let (branch, nested) = if last { ("└── ", "    ") } else { ("├── ", "|   ") };
            lines.push(format!("{}{}{}", indent, branch, child.line));
            child.push_children(lines, &format!("{}{}", indent, nested));
        }
    }
}

impl fmt::Display for LinesNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lines().join("\n"))
    }
}

/// Render an optional boolean as yes/no
pub fn bool_to_yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => NOT_SET,
    }
}

/// Replace a secret with a marker that reveals neither its length nor its content
pub fn obfuscate(secret: Option<&str>) -> &'static str {
    match secret {
        Some(s) if !s.is_empty() => SECRET_SET,
        _ => NOT_SET,
    }
}

/// Render an optional plain value, or the not-set marker
pub fn or_not_set<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| NOT_SET.to_string(), |v| v.to_string())
}

/// Render a list, or `[none]` when it is empty
pub fn list_or_none<T: fmt::Display>(values: Option<&Vec<T>>) -> String {
    match values {
        None => NOT_SET.to_string(),
        Some(values) if values.is_empty() => "[none]".to_string(),
        Some(values) => values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}
