//! Stackable modal dialogs over a host document.
//!
//! A [`Modal`] is built lazily into the document the first time it opens:
//!
//! ```text
//! <body>
//!   <div class="veil__backdrop [veil--show]">
//!     <div class="veil__container [custom classes]">
//!       <button class="veil__close">&times;</button>   (button close method)
//!       <div class="veil__content">…content…</div>
//!       <div class="veil__footer">                      (footer enabled)
//!         <div class="veil__footer-content">…</div>
//!         <button class="…">…</button>…
//!       </div>
//!     </div>
//!   </div>
//! </body>
//! ```
//!
//! Every modal on a document shares one [`ModalHost`]: the stack of open
//! modals (only the top one reacts to Escape) and the background scroll
//! lock (held while at least one modal is open).
//!
//! ```ignore
//! let host = ModalHost::new(Document::new());
//! let modal = Modal::new(&host, ModalOptions::default().with_content("<p>Hi</p>"));
//! modal.open();
//! host.document().run_tasks();           // show flag lands
//! modal.close();
//! host.document().finish_transition(modal.backdrop().unwrap());
//! ```

pub mod classes;
mod content;
mod footer;
mod host;
mod modal;
mod options;
mod scroll_lock;
mod stack;

pub use content::{ConfigError, ContentSource};
pub use footer::{ButtonCallback, FooterButton};
pub use host::ModalHost;
pub use modal::{Modal, ModalState};
pub use options::{Callback, CloseMethod, CloseMethods, ModalOptions, ScrollLockTarget};
pub use scroll_lock::{ScrollLock, has_scrollbar, measure_scrollbar_width};
pub use stack::{ModalId, ModalStack};
