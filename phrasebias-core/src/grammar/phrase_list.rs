//! 短语列表语法
//!
//! 把一个 `PhraseSet` 绑定到进行中的识别会话。会话结束或主动释放后，
//! 所有操作返回 `SessionEnded`。

use crate::config::GrammarConfig;
use crate::error::{BiasError, BiasResult};
use crate::grammar::{BindingState, Grammar, GrammarId, GrammarKind};
use crate::phrases::{
    validate_weight, PhraseListParser, PhraseSet, PhraseSetEdit, PhraseSnapshot,
    DEFAULT_MAX_PHRASES,
};
use crate::session::SessionHandle;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 短语文件加载方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// 清空现有短语后加载
    #[default]
    Replace,
    /// 追加到现有短语之后
    Append,
}

/// 短语列表语法（会话绑定）
pub struct PhraseListGrammar {
    id: GrammarId,
    session: SessionHandle,
    phrases: Arc<PhraseSet>,
    released: AtomicBool,
}

impl PhraseListGrammar {
    /// 为指定会话创建短语列表语法
    pub fn from_session(session: &SessionHandle) -> BiasResult<Self> {
        Self::with_max_phrases(session, DEFAULT_MAX_PHRASES)
    }

    /// 创建带短语数量限制的语法
    pub fn with_max_phrases(session: &SessionHandle, max_phrases: usize) -> BiasResult<Self> {
        let phrases = Arc::new(PhraseSet::with_max_phrases(max_phrases));
        let id = session.attach(GrammarKind::PhraseList, Arc::clone(&phrases))?;

        Ok(Self {
            id,
            session: session.clone(),
            phrases,
            released: AtomicBool::new(false),
        })
    }

    /// 按配置创建语法，并一次性写入配置中的权重和短语
    ///
    /// 短语文件中的 `weight` 优先于配置中的 `weight`。
    pub fn with_config(session: &SessionHandle, config: &GrammarConfig) -> BiasResult<Self> {
        let weight = validate_weight(config.weight)?;
        let file_list = config
            .phrases_file
            .as_deref()
            .map(PhraseListParser::load_file)
            .transpose()?;

        let grammar = Self::with_max_phrases(session, config.max_phrases)?;

        grammar.phrases.update(|edit| {
            edit.set_weight(weight)?;

            for phrase in &config.phrases {
                match edit.add_phrase(phrase) {
                    Ok(()) => {}
                    Err(BiasError::InvalidArgument { reason }) => {
                        tracing::warn!("跳过配置中的短语 {:?}: {}", phrase, reason);
                    }
                    Err(e) => return Err(e),
                }
            }

            if let Some(list) = &file_list {
                if let Some(w) = list.weight {
                    edit.set_weight(w)?;
                }
                for phrase in &list.phrases {
                    edit.add_phrase(phrase)?;
                }
            }

            Ok(())
        })?;

        let snapshot = grammar.phrases.snapshot();
        tracing::info!(
            "语法 {} 按配置初始化: {} 个短语, weight={}",
            grammar.id,
            snapshot.len(),
            snapshot.weight()
        );
        Ok(grammar)
    }

    /// 添加短语
    pub fn add_phrase(&self, text: &str) -> BiasResult<()> {
        self.ensure_bound()?;
        self.phrases.add_phrase(text)
    }

    /// 设置偏置权重 [0.0, 2.0]，0 表示关闭
    pub fn set_weight(&self, weight: f64) -> BiasResult<()> {
        self.ensure_bound()?;
        self.phrases.set_weight(weight)
    }

    /// 清空所有短语
    pub fn clear(&self) -> BiasResult<()> {
        self.ensure_bound()?;
        self.phrases.clear();
        Ok(())
    }

    /// 原子批量修改，参见 [`PhraseSet::update`]
    pub fn update<F>(&self, f: F) -> BiasResult<()>
    where
        F: FnOnce(&mut PhraseSetEdit) -> BiasResult<()>,
    {
        self.ensure_bound()?;
        self.phrases.update(f)
    }

    /// 从文件加载短语，返回加载的短语数
    pub fn load_file(&self, path: &Path, mode: LoadMode) -> BiasResult<usize> {
        self.ensure_bound()?;
        let list = PhraseListParser::load_file(path)?;

        self.phrases.update(|edit| {
            if mode == LoadMode::Replace {
                edit.clear();
            }
            if let Some(w) = list.weight {
                edit.set_weight(w)?;
            }
            for phrase in &list.phrases {
                edit.add_phrase(phrase)?;
            }
            Ok(())
        })?;

        Ok(list.phrases.len())
    }

    /// 获取当前快照
    pub fn snapshot(&self) -> BiasResult<Arc<PhraseSnapshot>> {
        self.ensure_bound()?;
        Ok(self.phrases.snapshot())
    }

    /// 获取当前权重
    pub fn weight(&self) -> BiasResult<f64> {
        self.snapshot().map(|s| s.weight())
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn ensure_bound(&self) -> BiasResult<()> {
        if self.released.load(Ordering::Acquire) {
            return Err(BiasError::SessionEnded {
                session_id: self.session.session_id(),
            });
        }
        self.session.ensure_active()
    }
}

impl Grammar for PhraseListGrammar {
    fn id(&self) -> GrammarId {
        self.id
    }

    fn kind(&self) -> GrammarKind {
        GrammarKind::PhraseList
    }

    fn session_id(&self) -> u64 {
        self.session.session_id()
    }

    fn state(&self) -> BindingState {
        if self.released.load(Ordering::Acquire) || !self.session.is_active() {
            BindingState::Released
        } else {
            BindingState::Bound
        }
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            self.session.detach(self.id);
        }
    }
}

impl Drop for PhraseListGrammar {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for PhraseListGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseListGrammar")
            .field("id", &self.id)
            .field("session", &self.session)
            .field("released", &self.released.load(Ordering::Relaxed))
            .finish()
    }
}
