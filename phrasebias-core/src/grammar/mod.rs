//! 语法模块
//!
//! 绑定到识别会话的偏置语法。目前只有短语列表一种实现。

pub mod phrase_list;

pub use phrase_list::{LoadMode, PhraseListGrammar};

use crate::phrases::PhraseSnapshot;
use std::fmt;
use std::sync::Arc;

/// 语法类型
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarKind {
    /// 动态短语列表
    PhraseList,
}

/// 会话内的语法编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrammarId(pub(crate) u64);

impl GrammarId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GrammarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 绑定状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// 已绑定到进行中的会话
    Bound,
    /// 会话结束或已主动释放，不会再回到 Bound
    Released,
}

/// 解码器读取的单个语法快照
#[derive(Debug, Clone)]
pub struct GrammarSnapshot {
    pub id: GrammarId,
    pub kind: GrammarKind,
    pub phrases: Arc<PhraseSnapshot>,
}

/// 偏置语法的公共接口
pub trait Grammar: Send + Sync {
    fn id(&self) -> GrammarId;

    fn kind(&self) -> GrammarKind;

    /// 所属会话编号
    fn session_id(&self) -> u64;

    fn state(&self) -> BindingState;

    /// 解除与会话的关联（会话本身不受影响）
    fn release(&self);
}
