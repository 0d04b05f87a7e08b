//! 短语集合模块
//!
//! Phrase Set - 提升特定短语识别准确率

pub mod parser;
pub mod set;

// 导出核心类型
pub use parser::{PhraseList, PhraseListParser};
pub use set::{
    normalize_phrase, validate_weight, PhraseSet, PhraseSetEdit, PhraseSnapshot,
    DEFAULT_MAX_PHRASES, DEFAULT_WEIGHT, MAX_WEIGHT, MIN_WEIGHT,
};
