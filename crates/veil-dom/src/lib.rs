//! Host document for the veil modal stack.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), together with the
//! pieces of a browser host that modals depend on: class-list and inline-style
//! mutation, host-provided layout metrics, click and keyboard dispatch,
//! one-shot transition-completion notifications, and a deferred task queue.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues.
//! [`Document`] wraps the tree in a cheaply clonable, single-threaded handle
//! so that event handlers can reach back into the document they were fired
//! from.

mod document;
mod error;
mod events;
mod snapshot;
mod tasks;

pub use document::Document;
pub use error::DomError;
pub use events::{ClickHandler, KeyHandler, KeyboardEvent, ListenerId, MouseEvent, OnceListeners};
pub use snapshot::{NodeSnapshot, print_tree, write_tree};
pub use tasks::{Task, TaskQueue};

use std::collections::{BTreeMap, HashMap};

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// Map of inline style property names to values, kept sorted for stable output.
pub type StyleMap = BTreeMap<String, String>;

/// Width of a classic (non-overlay) scrollbar when the host does not say otherwise.
pub const DEFAULT_SCROLLBAR_WIDTH: f32 = 15.0;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// NodeId provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
/// "Each node has an associated node document... and parent (null or an element)."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
    /// Markup injected through `innerHTML`.
    ///
    /// The host never parses it; it is carried as an opaque fragment and
    /// emitted verbatim when the tree is dumped.
    Markup(String),
}

/// Layout numbers for an element, supplied by whoever hosts the document.
///
/// There is no layout engine here. Tests and the CLI set these to describe
/// the page they want to simulate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxMetrics {
    /// Content-box width in px.
    pub width: f32,
    /// Visible height in px.
    pub height: f32,
    /// Height of the scrollable content; `None` means it fits (`height`).
    pub scroll_height: Option<f32>,
    /// Right padding from the stylesheet, used when no inline override exists.
    pub padding_right: f32,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// - "Elements have an associated namespace, namespace prefix, local name, custom element state,
///    custom element definition, is value."
///
/// NOTE: We only store tag_name (local name), attrs, inline style and metrics.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
    /// Inline `style` declarations.
    pub style: StyleMap,
    /// Host-provided layout metrics.
    pub metrics: BoxMetrics,
}

impl ElementData {
    /// Create element data with the given local name and nothing else.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&String> {
        self.attrs.get("id")
    }

    /// Returns the class names from the class attribute, in attribute order.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        self.attrs
            .get("class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether the class list contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    /// [§ 7.1 DOMTokenList add()](https://dom.spec.whatwg.org/#dom-domtokenlist-add)
    ///
    /// "For each token in tokens, append token to this's token set."
    /// Appending a token that is already present is a no-op.
    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() || self.has_class(class) {
            return;
        }
        let mut list: Vec<String> = self.classes().into_iter().map(str::to_string).collect();
        list.push(class.to_string());
        let _ = self.attrs.insert("class".to_string(), list.join(" "));
    }

    /// [§ 7.1 DOMTokenList remove()](https://dom.spec.whatwg.org/#dom-domtokenlist-remove)
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let list: Vec<&str> = self.classes().into_iter().filter(|c| *c != class).collect();
        let joined = list.join(" ");
        let _ = self.attrs.insert("class".to_string(), joined);
    }
}

/// Parse a CSS pixel length such as `"12px"` or `"12"`.
///
/// Anything that is not a plain number of px yields `None`.
#[must_use]
pub fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f32>().ok()
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// Detached nodes stay in the arena; they are simply unreachable from the root.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by NodeId.
    /// The Document node is always at index 0 (NodeId::ROOT).
    nodes: Vec<Node>,

    /// Width of the platform scrollbar gutter in px.
    scrollbar_width: f32,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        };
        Self {
            nodes: vec![document],
            scrollbar_width: DEFAULT_SCROLLBAR_WIDTH,
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Width of the platform scrollbar gutter in px.
    #[must_use]
    pub const fn scrollbar_width(&self) -> f32 {
        self.scrollbar_width
    }

    /// Change the platform scrollbar width (0 simulates overlay scrollbars).
    pub fn set_scrollbar_width(&mut self, width: f32) {
        self.scrollbar_width = width;
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// [§ 4.5 createElement](https://dom.spec.whatwg.org/#dom-document-createelement)
    ///
    /// Allocates a detached element with the given local name.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.alloc(NodeType::Element(ElementData::new(tag_name)))
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Pre-insertion first removes the node from its old parent, so appending
    /// an attached node moves it to the end of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NodeNotFound`] if either id is unknown and
    /// [`DomError::HierarchyRequest`] if `child` is `parent` or one of its
    /// ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.ensure_exists(parent)?;
        self.ensure_exists(child)?;
        if child == parent || self.is_descendant_of(parent, child) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child);

        // Get the current last child of parent (if any) to set up sibling links
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
        Ok(())
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Removes `child` from `parent`'s children and clears its tree links.
    /// Does nothing if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(position) = self
            .get(parent)
            .and_then(|p| p.children.iter().position(|&c| c == child))
        else {
            return;
        };

        let _ = self.nodes[parent.0].children.remove(position);

        let prev = self.nodes[child.0].prev_sibling.take();
        let next = self.nodes[child.0].next_sibling.take();
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = next;
        }
        if let Some(next_id) = next {
            self.nodes[next_id.0].prev_sibling = prev;
        }
        self.nodes[child.0].parent = None;
    }

    /// Remove a node from whatever parent it currently has.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
    }

    /// Detach every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove_child(id, child);
        }
    }

    /// [§ 4.4 cloneNode(true)](https://dom.spec.whatwg.org/#concept-node-clone)
    ///
    /// Deep-copies the subtree rooted at `id` into fresh, detached nodes and
    /// returns the new root.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NodeNotFound`] if `id` is unknown.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId, DomError> {
        let node_type = self
            .get(id)
            .map(|n| n.node_type.clone())
            .ok_or(DomError::NodeNotFound(id))?;
        let copy = self.alloc(node_type);
        for child in self.children(id).to_vec() {
            let child_copy = self.clone_subtree(child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Replace the children of `id` with one opaque markup fragment.
    ///
    /// An empty string leaves the element empty, as `innerHTML = ""` does.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        if self.as_element(id).is_none() {
            return;
        }
        self.clear_children(id);
        if !html.is_empty() {
            let markup = self.alloc(NodeType::Markup(html.to_string()));
            // Both nodes are known to exist and `markup` is fresh.
            let _ = self.append_child(id, markup);
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// [§ 4.4 isConnected](https://dom.spec.whatwg.org/#dom-node-isconnected)
    ///
    /// Whether the node is reachable from the document root.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || self.is_descendant_of(id, NodeId::ROOT)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;

        self.children(html)
            .iter()
            .find(|&&id| {
                self.as_element(id)
                    .is_some_and(|e| e.tag_name == "body" || e.tag_name == "frameset")
            })
            .copied()
    }

    /// [§ 5.1 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// STEP 1: "If elementId is the empty string, return null."
    /// STEP 2: "Return the first element in tree order within node's descendants
    ///          whose ID is elementId; otherwise, return null."
    #[must_use]
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        if element_id.is_empty() {
            return None;
        }
        let mut pending = vec![NodeId::ROOT];
        while let Some(id) = pending.pop() {
            if self
                .as_element(id)
                .and_then(ElementData::id)
                .is_some_and(|v| v == element_id)
            {
                return Some(id);
            }
            pending.extend(self.children(id).iter().rev());
        }
        None
    }

    /// `offsetWidth`: content width plus the scrollbar gutter, if any.
    #[must_use]
    pub fn offset_width(&self, id: NodeId) -> f32 {
        self.as_element(id)
            .map_or(0.0, |e| e.metrics.width + self.gutter(e))
    }

    /// `clientWidth`: content width, excluding any scrollbar.
    #[must_use]
    pub fn client_width(&self, id: NodeId) -> f32 {
        self.as_element(id).map_or(0.0, |e| e.metrics.width)
    }

    /// `clientHeight`: visible height.
    #[must_use]
    pub fn client_height(&self, id: NodeId) -> f32 {
        self.as_element(id).map_or(0.0, |e| e.metrics.height)
    }

    /// `scrollHeight`: height of the content, at least the visible height.
    #[must_use]
    pub fn scroll_height(&self, id: NodeId) -> f32 {
        self.as_element(id).map_or(0.0, |e| {
            e.metrics
                .scroll_height
                .unwrap_or(e.metrics.height)
                .max(e.metrics.height)
        })
    }

    /// Computed `padding-right`: the inline value when set, otherwise the
    /// stylesheet value carried in the metrics.
    #[must_use]
    pub fn computed_padding_right(&self, id: NodeId) -> f32 {
        self.as_element(id).map_or(0.0, |e| {
            e.style
                .get("padding-right")
                .and_then(|v| parse_px(v))
                .unwrap_or(e.metrics.padding_right)
        })
    }

    fn gutter(&self, element: &ElementData) -> f32 {
        match element.style.get("overflow").map(String::as_str) {
            Some("scroll") => self.scrollbar_width,
            _ => 0.0,
        }
    }

    fn ensure_exists(&self, id: NodeId) -> Result<(), DomError> {
        if self.get(id).is_some() {
            Ok(())
        } else {
            Err(DomError::NodeNotFound(id))
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
