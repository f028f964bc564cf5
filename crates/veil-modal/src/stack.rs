//! Registry of open modals.
//!
//! The stack records *logical* open state: a modal is pushed when `open` is
//! called and removed when `close` is called, not when its hide transition
//! finishes. It holds ids only; removing an entry never touches the modal's
//! elements.
//!
//! # Invariants
//!
//! - An id appears at most once.
//! - Order is open order; the last entry is the top.
//!
//! # Failure Modes
//!
//! - `pop()` / `peek()` on an empty stack return `None`.
//! - `push()` of an id already present is refused and returns `false`.
//! - `remove()` of an absent id returns `false`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique modal ids.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a modal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u64);

impl ModalId {
    /// Allocate a new unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ModalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered set of open modal ids, bottom first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalStack {
    entries: Vec<ModalId>,
}

impl ModalStack {
    /// Create an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Put `id` on top. Returns `false` (and changes nothing) if it is already
    /// on the stack.
    pub fn push(&mut self, id: ModalId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.entries.push(id);
        true
    }

    /// Remove and return the top id.
    pub fn pop(&mut self) -> Option<ModalId> {
        self.entries.pop()
    }

    /// The top id.
    #[must_use]
    pub fn peek(&self) -> Option<ModalId> {
        self.entries.last().copied()
    }

    /// Whether `id` is the top entry.
    #[must_use]
    pub fn is_top(&self, id: ModalId) -> bool {
        self.peek() == Some(id)
    }

    /// Whether `id` is anywhere on the stack.
    #[must_use]
    pub fn contains(&self, id: ModalId) -> bool {
        self.entries.contains(&id)
    }

    /// Remove `id` wherever it sits. Returns whether it was present.
    pub fn remove(&mut self, id: ModalId) -> bool {
        match self.entries.iter().position(|&entry| entry == id) {
            Some(index) => {
                let _ = self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of open modals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no modal is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = ModalId> + '_ {
        self.entries.iter().copied()
    }
}
