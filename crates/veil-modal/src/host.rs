//! Per-document shared state: the modal stack and the scroll lock.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use veil_dom::Document;

use crate::scroll_lock::ScrollLock;
use crate::stack::{ModalId, ModalStack};

/// Everything the modals on one document share.
///
/// Clone it into every modal of the page; clones share the same stack and
/// scroll lock. Create one per document.
#[derive(Clone)]
pub struct ModalHost {
    document: Document,
    stack: Rc<RefCell<ModalStack>>,
    scroll_lock: Rc<RefCell<ScrollLock>>,
}

impl ModalHost {
    /// Create the shared state for `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            stack: Rc::new(RefCell::new(ModalStack::new())),
            scroll_lock: Rc::new(RefCell::new(ScrollLock::new())),
        }
    }

    /// The document modals are inserted into.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Borrow the stack.
    #[must_use]
    pub fn stack(&self) -> Ref<'_, ModalStack> {
        self.stack.borrow()
    }

    /// Open modal ids, bottom to top.
    #[must_use]
    pub fn open_modals(&self) -> Vec<ModalId> {
        self.stack.borrow().iter().collect()
    }

    /// The topmost open modal.
    #[must_use]
    pub fn top(&self) -> Option<ModalId> {
        self.stack.borrow().peek()
    }

    /// Borrow the scroll lock.
    #[must_use]
    pub fn scroll_lock(&self) -> Ref<'_, ScrollLock> {
        self.scroll_lock.borrow()
    }

    /// Whether background scrolling is currently locked.
    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock.borrow().is_engaged()
    }

    pub(crate) fn stack_mut(&self) -> RefMut<'_, ModalStack> {
        self.stack.borrow_mut()
    }

    pub(crate) fn scroll_lock_mut(&self) -> RefMut<'_, ScrollLock> {
        self.scroll_lock.borrow_mut()
    }
}
