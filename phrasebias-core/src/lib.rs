//! PhraseBias Core
//!
//! 流式语音识别的动态短语偏置语法
//!
//! 调用方为进行中的识别会话创建 [`PhraseListGrammar`]，随时添加短语、调整权重或清空；
//! 解码器在每次识别时通过 [`RecognitionSession::grammar_snapshots`] 读取一致的快照。

#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod error;
pub mod ffi;
pub mod grammar;
pub mod phrases;
pub mod session;

// Re-export key types
pub use config::{BiasConfig, GrammarConfig};
pub use error::{BiasError, BiasResult, ErrorKind};
pub use grammar::{BindingState, Grammar, GrammarId, GrammarKind, GrammarSnapshot, LoadMode, PhraseListGrammar};
pub use phrases::{PhraseSet, PhraseSetEdit, PhraseSnapshot};
pub use session::{RecognitionSession, SessionHandle, SessionState};

/// 初始化日志系统
///
/// 生产模式: 静默运行
/// 调试模式 (--features debug-logs): 按 PHRASEBIAS_LOG 过滤，默认 warn
///
/// 注意: 此函数可以安全地多次调用
pub fn init_logging() {
    #[cfg(feature = "debug-logs")]
    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_env("PHRASEBIAS_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        // 使用 try_init() 代替 init()，避免重复初始化时 panic
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(filter)
            .try_init();
    }
}
