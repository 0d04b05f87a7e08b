use thiserror::Error;

#[derive(Error, Debug)]
pub enum BiasError {
    // 短语错误
    #[error("Invalid phrase: {reason}")]
    InvalidArgument { reason: String },

    #[error("Weight out of range ({min}-{max}): {value}")]
    DomainError { value: f64, min: f64, max: f64 },

    #[error("Phrase limit reached: {limit}")]
    PhraseLimitExceeded { limit: usize },

    // 会话错误
    #[error("Recognition session unavailable: {state}")]
    SessionUnavailable { state: String },

    #[error("Recognition session {session_id} has ended")]
    SessionEnded { session_id: u64 },

    // 短语文件错误
    #[error("Phrase file error: {location} - {reason}")]
    PhraseFile { location: String, reason: String },

    // 配置错误
    #[error("Config parse error: {path} - {reason}")]
    ConfigParse { path: String, reason: String },

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // 其他错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 错误类别（供调用方和 FFI 层判断失败原因）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    DomainError,
    PhraseLimitExceeded,
    SessionUnavailable,
    SessionEnded,
    PhraseFile,
    Config,
    Io,
}

impl BiasError {
    /// 获取错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            BiasError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            BiasError::DomainError { .. } => ErrorKind::DomainError,
            BiasError::PhraseLimitExceeded { .. } => ErrorKind::PhraseLimitExceeded,
            BiasError::SessionUnavailable { .. } => ErrorKind::SessionUnavailable,
            BiasError::SessionEnded { .. } => ErrorKind::SessionEnded,
            BiasError::PhraseFile { .. } => ErrorKind::PhraseFile,
            BiasError::ConfigParse { .. } | BiasError::ConfigNotFound(_) => ErrorKind::Config,
            BiasError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid_phrase(reason: impl Into<String>) -> Self {
        BiasError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

pub type BiasResult<T> = Result<T, BiasError>;
