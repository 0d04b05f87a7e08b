//! FFI (Foreign Function Interface) 模块
//!
//! C-compatible API for native recognition clients

pub mod exports;
pub mod safety;
pub mod types;

// Re-export key types for cbindgen
pub use exports::*;
pub use types::*;
