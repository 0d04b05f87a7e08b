//! 识别会话与非拥有句柄
//!
//! `RecognitionSession` 由外部识别器持有；语法绑定只持有 `SessionHandle`（弱引用），
//! 构造时校验会话存活，之后每次操作重新检查。

use crate::error::{BiasError, BiasResult};
use crate::grammar::{GrammarId, GrammarKind, GrammarSnapshot};
use crate::phrases::PhraseSet;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// 已创建，识别器尚未就绪
    Initializing = 0,
    /// 正在识别，可以绑定语法
    Active = 1,
    /// 会话已结束
    Ended = 2,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Initializing,
            1 => SessionState::Active,
            _ => SessionState::Ended,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::Active => write!(f, "active"),
            SessionState::Ended => write!(f, "ended"),
        }
    }
}

/// 已绑定到会话的语法
struct AttachedGrammar {
    id: GrammarId,
    kind: GrammarKind,
    phrases: Arc<PhraseSet>,
}

struct SessionInner {
    id: u64,
    state: AtomicU8,
    grammars: Mutex<Vec<AttachedGrammar>>,
    next_grammar_id: AtomicU64,
}

impl SessionInner {
    fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// 识别会话（拥有方）
///
/// Drop 时自动结束会话，所有绑定随之失效。
pub struct RecognitionSession {
    inner: Arc<SessionInner>,
}

impl RecognitionSession {
    /// 创建新会话（初始状态 Initializing）
    pub fn new() -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        tracing::info!("创建识别会话 #{}", id);

        Self {
            inner: Arc::new(SessionInner {
                id,
                state: AtomicU8::new(SessionState::Initializing as u8),
                grammars: Mutex::new(Vec::new()),
                next_grammar_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// 标记识别器初始化完成
    pub fn activate(&self) -> BiasResult<()> {
        match self.inner.state.compare_exchange(
            SessionState::Initializing as u8,
            SessionState::Active as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                tracing::info!("识别会话 #{} 已就绪", self.inner.id);
                Ok(())
            }
            Err(current) => match SessionState::from_u8(current) {
                SessionState::Active => Ok(()),
                _ => Err(BiasError::SessionEnded {
                    session_id: self.inner.id,
                }),
            },
        }
    }

    /// 结束会话（可重复调用）
    pub fn end(&self) {
        let previous = self
            .inner
            .state
            .swap(SessionState::Ended as u8, Ordering::AcqRel);

        if SessionState::from_u8(previous) == SessionState::Ended {
            return;
        }

        let detached = {
            let mut grammars = self.inner.grammars.lock();
            let count = grammars.len();
            grammars.clear();
            count
        };

        tracing::info!(
            "识别会话 #{} 结束，释放 {} 个语法绑定",
            self.inner.id,
            detached
        );
    }

    /// 获取非拥有句柄
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            inner: Arc::downgrade(&self.inner),
            session_id: self.inner.id,
        }
    }

    /// 当前绑定的语法数量
    pub fn grammar_count(&self) -> usize {
        self.inner.grammars.lock().len()
    }

    /// 获取所有语法的快照（解码器每次识别调用一次）
    ///
    /// 按绑定顺序返回；会话结束后返回空列表。
    pub fn grammar_snapshots(&self) -> Vec<GrammarSnapshot> {
        let grammars = self.inner.grammars.lock();
        grammars
            .iter()
            .map(|g| GrammarSnapshot {
                id: g.id,
                kind: g.kind,
                phrases: g.phrases.snapshot(),
            })
            .collect()
    }
}

impl Default for RecognitionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RecognitionSession {
    fn drop(&mut self) {
        self.end();
    }
}

impl fmt::Debug for RecognitionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionSession")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish()
    }
}

/// 会话句柄（非拥有，可克隆）
#[derive(Clone)]
pub struct SessionHandle {
    inner: Weak<SessionInner>,
    session_id: u64,
}

impl SessionHandle {
    /// 不指向任何会话的句柄
    pub fn detached() -> Self {
        Self {
            inner: Weak::new(),
            session_id: 0,
        }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// 会话状态，会话已释放时返回 None
    pub fn state(&self) -> Option<SessionState> {
        self.inner.upgrade().map(|inner| inner.state())
    }

    pub fn is_active(&self) -> bool {
        self.state() == Some(SessionState::Active)
    }

    /// 将语法登记到会话
    pub(crate) fn attach(&self, kind: GrammarKind, phrases: Arc<PhraseSet>) -> BiasResult<GrammarId> {
        let inner = self.inner.upgrade().ok_or_else(|| BiasError::SessionUnavailable {
            state: "disposed".to_string(),
        })?;

        // 在锁内检查状态，与 end() 的清理互斥
        let mut grammars = inner.grammars.lock();
        let state = inner.state();
        if state != SessionState::Active {
            return Err(BiasError::SessionUnavailable {
                state: state.to_string(),
            });
        }

        let id = GrammarId(inner.next_grammar_id.fetch_add(1, Ordering::Relaxed));
        grammars.push(AttachedGrammar { id, kind, phrases });

        tracing::info!(
            "语法 {} 绑定到会话 #{} (共 {} 个)",
            id,
            inner.id,
            grammars.len()
        );
        Ok(id)
    }

    /// 从会话移除语法
    pub(crate) fn detach(&self, id: GrammarId) {
        if let Some(inner) = self.inner.upgrade() {
            let mut grammars = inner.grammars.lock();
            let before = grammars.len();
            grammars.retain(|g| g.id != id);

            if grammars.len() != before {
                tracing::info!("语法 {} 已从会话 #{} 解绑", id, inner.id);
            }
        }
    }

    /// 确认会话仍在进行
    pub(crate) fn ensure_active(&self) -> BiasResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(BiasError::SessionEnded {
                session_id: self.session_id,
            })
        }
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let session = RecognitionSession::new();
        assert_eq!(session.state(), SessionState::Initializing);

        session.activate().unwrap();
        assert!(session.is_active());

        // 重复激活无副作用
        session.activate().unwrap();

        session.end();
        assert_eq!(session.state(), SessionState::Ended);
        assert!(session.activate().is_err());
    }

    #[test]
    fn test_session_ids_unique() {
        let a = RecognitionSession::new();
        let b = RecognitionSession::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_handle_tracks_session() {
        let session = RecognitionSession::new();
        let handle = session.handle();
        assert_eq!(handle.session_id(), session.id());
        assert_eq!(handle.state(), Some(SessionState::Initializing));

        session.activate().unwrap();
        assert!(handle.is_active());

        drop(session);
        assert_eq!(handle.state(), None);
        assert!(!handle.is_active());
    }

    #[test]
    fn test_attach_requires_active_session() {
        let session = RecognitionSession::new();
        let handle = session.handle();

        let err = handle
            .attach(GrammarKind::PhraseList, Arc::new(PhraseSet::new()))
            .unwrap_err();
        assert!(matches!(err, BiasError::SessionUnavailable { ref state } if state == "initializing"));

        let err = SessionHandle::detached()
            .attach(GrammarKind::PhraseList, Arc::new(PhraseSet::new()))
            .unwrap_err();
        assert!(matches!(err, BiasError::SessionUnavailable { ref state } if state == "disposed"));
    }

    #[test]
    fn test_attach_detach() {
        let session = RecognitionSession::new();
        session.activate().unwrap();
        let handle = session.handle();

        let first = handle
            .attach(GrammarKind::PhraseList, Arc::new(PhraseSet::new()))
            .unwrap();
        let second = handle
            .attach(GrammarKind::PhraseList, Arc::new(PhraseSet::new()))
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(session.grammar_count(), 2);

        handle.detach(first);
        let snapshots = session.grammar_snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].id, second);
    }

    #[test]
    fn test_end_detaches_all() {
        let session = RecognitionSession::new();
        session.activate().unwrap();
        let handle = session.handle();

        handle
            .attach(GrammarKind::PhraseList, Arc::new(PhraseSet::new()))
            .unwrap();
        session.end();

        assert_eq!(session.grammar_count(), 0);
        assert!(session.grammar_snapshots().is_empty());
        assert!(handle.ensure_active().is_err());
    }
}
