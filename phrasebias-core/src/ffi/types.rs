//! FFI C-compatible 类型定义

use crate::error::ErrorKind;

/// FFI 结果码
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseBiasResult {
    /// 成功
    Success = 0,
    /// 空指针错误
    NullPointer = -1,
    /// 无效参数（空短语、非 UTF-8 文本）
    InvalidArgument = -2,
    /// 权重超出 [0.0, 2.0]
    DomainError = -3,
    /// 会话不可用（未就绪或已释放）
    SessionUnavailable = -4,
    /// 会话已结束
    SessionEnded = -5,
    /// 短语数量超限
    PhraseLimitExceeded = -6,
    /// 内部错误
    InternalError = -7,
}

impl From<ErrorKind> for PhraseBiasResult {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidArgument => PhraseBiasResult::InvalidArgument,
            ErrorKind::DomainError => PhraseBiasResult::DomainError,
            ErrorKind::PhraseLimitExceeded => PhraseBiasResult::PhraseLimitExceeded,
            ErrorKind::SessionUnavailable => PhraseBiasResult::SessionUnavailable,
            ErrorKind::SessionEnded => PhraseBiasResult::SessionEnded,
            ErrorKind::PhraseFile | ErrorKind::Config | ErrorKind::Io => {
                PhraseBiasResult::InternalError
            }
        }
    }
}
