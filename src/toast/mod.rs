//! Toast payload construction and image asset handling

pub mod assets;
pub mod builder;

pub use assets::relocate;
pub use builder::{build_toast_xml, ToastXmlOptions};
