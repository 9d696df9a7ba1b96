//! LSP Protocol Implementation
//!
//! tower-lsp backend; all document logic lives in `core`.

pub mod backend;
pub mod handlers;
pub mod server;

pub use backend::Backend;
