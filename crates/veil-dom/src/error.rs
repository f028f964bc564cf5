//! Errors raised by tree mutation.

use thiserror::Error;

use crate::NodeId;

/// A DOM operation that could not be carried out.
///
/// Named after the `DOMException` kinds the DOM Standard throws for the same
/// situations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomError {
    /// The id does not refer to a node in this document.
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    /// The node exists but is not an element.
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    ///
    /// "If node is a host-including inclusive ancestor of parent, then throw a
    /// `HierarchyRequestError` `DOMException`."
    #[error("cannot insert {child:?} into {parent:?}: it would become its own ancestor")]
    HierarchyRequest {
        /// The would-be parent.
        parent: NodeId,
        /// The node being inserted.
        child: NodeId,
    },
}
