//! Debug dumps of a document tree.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::{DomTree, NodeId, NodeType};

/// Print the subtree rooted at `id` to stdout, one node per line.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let mut out = String::new();
    write_tree(tree, id, indent, &mut out);
    print!("{out}");
}

/// Append an indented dump of the subtree rooted at `id` to `out`.
///
/// Attributes are listed in name order so the output is stable.
pub fn write_tree(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    // Writing into a String cannot fail.
    let _ = match &node.node_type {
        NodeType::Document => writeln!(out, "{prefix}Document"),
        NodeType::Element(data) => {
            let mut parts = vec![data.tag_name.clone()];
            let attrs: BTreeMap<&String, &String> = data.attrs.iter().collect();
            for (k, v) in attrs {
                if v.is_empty() {
                    parts.push(k.clone());
                } else {
                    parts.push(format!("{k}=\"{v}\""));
                }
            }
            if !data.style.is_empty() {
                let style: Vec<String> = data
                    .style
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect();
                parts.push(format!("style=\"{}\"", style.join("; ")));
            }
            writeln!(out, "{prefix}<{}>", parts.join(" "))
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n");
            writeln!(out, "{prefix}\"{display}\"")
        }
        NodeType::Comment(data) => writeln!(out, "{prefix}<!-- {data} -->"),
        NodeType::Markup(html) => writeln!(out, "{prefix}{html}"),
    };
    for &child_id in tree.children(id) {
        write_tree(tree, child_id, indent + 1, out);
    }
}

/// Serializable copy of a subtree, for JSON dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeSnapshot {
    /// The document node.
    Document {
        /// Child nodes in tree order.
        children: Vec<NodeSnapshot>,
    },
    /// An element.
    #[serde(rename_all = "camelCase")]
    Element {
        /// Local name.
        tag_name: String,
        /// Attributes, sorted by name.
        attributes: BTreeMap<String, String>,
        /// Inline style declarations.
        style: BTreeMap<String, String>,
        /// Child nodes in tree order.
        children: Vec<NodeSnapshot>,
    },
    /// A text node.
    Text {
        /// Character data.
        content: String,
    },
    /// A comment node.
    Comment {
        /// Character data.
        content: String,
    },
    /// An opaque markup fragment.
    Markup {
        /// The markup as it was injected.
        html: String,
    },
}

impl NodeSnapshot {
    /// Capture the subtree rooted at `id`, or `None` if the id is unknown.
    #[must_use]
    pub fn capture(tree: &DomTree, id: NodeId) -> Option<Self> {
        let node = tree.get(id)?;
        let children = || {
            tree.children(id)
                .iter()
                .filter_map(|&child| Self::capture(tree, child))
                .collect()
        };
        Some(match &node.node_type {
            NodeType::Document => Self::Document {
                children: children(),
            },
            NodeType::Element(data) => Self::Element {
                tag_name: data.tag_name.clone(),
                attributes: data
                    .attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                style: data.style.clone(),
                children: children(),
            },
            NodeType::Text(content) => Self::Text {
                content: content.clone(),
            },
            NodeType::Comment(content) => Self::Comment {
                content: content.clone(),
            },
            NodeType::Markup(html) => Self::Markup { html: html.clone() },
        })
    }
}
