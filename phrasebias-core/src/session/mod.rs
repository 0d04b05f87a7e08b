//! 识别会话模块
//!
//! 语法绑定所依附的会话生命周期

pub mod handle;

pub use handle::{RecognitionSession, SessionHandle, SessionState};
