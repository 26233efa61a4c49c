//! # convoy-panel
//!
//! The interaction surface over the attachment store: selection state for
//! batch actions and the panel presentation model that dispatches each
//! attachment to its card view and gates the send action.

pub mod panel;
pub mod selection;

pub use panel::{AttachmentCard, AttachmentPanel, CardView, DeleteTarget};
pub use selection::SelectionController;
