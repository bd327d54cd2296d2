//! View layer: the [`ViewBinding`] seam, HTML templates and the shared
//! modal.

pub mod binding;
pub mod modal;
pub mod render;

pub use binding::ViewBinding;
pub use modal::{Modal, ModalContent};
pub use render::RenderOptions;
