//! 短语集合核心
//!
//! 管理偏置短语列表和全局权重，为解码器提供一致的快照
//!
//! 写入方在私有副本上完成修改后整体替换 `Arc<PhraseSnapshot>`，
//! 读取方只在读锁内克隆一次 `Arc`，不会看到半途的修改。

use crate::error::{BiasError, BiasResult};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// 权重下限（0.0 表示关闭短语偏置）
pub const MIN_WEIGHT: f64 = 0.0;

/// 权重上限
pub const MAX_WEIGHT: f64 = 2.0;

/// 默认权重
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// 默认短语数量上限
pub const DEFAULT_MAX_PHRASES: usize = 10_000;

/// 校验权重范围，超出 [0.0, 2.0] 的值（包括 NaN）直接拒绝，不做截断
pub fn validate_weight(weight: f64) -> BiasResult<f64> {
    if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        return Err(BiasError::DomainError {
            value: weight,
            min: MIN_WEIGHT,
            max: MAX_WEIGHT,
        });
    }
    Ok(weight)
}

/// 规范化短语文本：去除首尾空白，拒绝空文本和换行
pub fn normalize_phrase(text: &str) -> BiasResult<String> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(BiasError::invalid_phrase("phrase text is empty"));
    }

    // 解码器按行读取热词，换行会把一个短语拆成多个
    if trimmed.contains(['\n', '\r', '\0']) {
        return Err(BiasError::invalid_phrase(format!(
            "phrase contains a line break or NUL: {:?}",
            trimmed
        )));
    }

    Ok(trimmed.to_string())
}

/// 短语集合快照（不可变）
///
/// 解码器在每次识别时获取一次，整个识别过程中使用同一份数据。
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseSnapshot {
    phrases: Vec<String>,
    weight: f64,
    version: u64,
}

impl PhraseSnapshot {
    fn initial() -> Self {
        Self {
            phrases: Vec::new(),
            weight: DEFAULT_WEIGHT,
            version: 0,
        }
    }

    /// 短语列表（按添加顺序）
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// 偏置权重
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// 版本号，每次提交修改加一
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// 是否实际产生偏置效果
    pub fn is_biasing_enabled(&self) -> bool {
        self.weight > MIN_WEIGHT && !self.phrases.is_empty()
    }

    /// 权重为 0 时偏置被关闭（与“短语为空”区分开）
    pub fn is_disabled_by_weight(&self) -> bool {
        self.weight == MIN_WEIGHT
    }

    /// 生成解码器所需的热词缓冲区
    ///
    /// 格式：每行一个短语（权重统一由 `weight` 控制）
    pub fn to_hotwords_buffer(&self) -> String {
        self.phrases.join("\n")
    }
}

/// 批量修改的工作副本
///
/// 由 [`PhraseSet::update`] 创建，闭包返回 `Ok` 时整体提交，返回错误时全部丢弃。
#[derive(Debug)]
pub struct PhraseSetEdit {
    phrases: Vec<String>,
    weight: f64,
    max_phrases: usize,
    dirty: bool,
}

impl PhraseSetEdit {
    fn from_snapshot(snapshot: &PhraseSnapshot, max_phrases: usize) -> Self {
        Self {
            phrases: snapshot.phrases.clone(),
            weight: snapshot.weight,
            max_phrases,
            dirty: false,
        }
    }

    /// 添加短语
    pub fn add_phrase(&mut self, text: &str) -> BiasResult<()> {
        let phrase = normalize_phrase(text)?;

        if self.phrases.len() >= self.max_phrases {
            return Err(BiasError::PhraseLimitExceeded {
                limit: self.max_phrases,
            });
        }

        self.phrases.push(phrase);
        self.dirty = true;
        Ok(())
    }

    /// 设置权重
    pub fn set_weight(&mut self, weight: f64) -> BiasResult<()> {
        let weight = validate_weight(weight)?;

        if weight != self.weight {
            self.weight = weight;
            self.dirty = true;
        }
        Ok(())
    }

    /// 清空短语（权重不变）
    pub fn clear(&mut self) {
        if !self.phrases.is_empty() {
            self.phrases.clear();
            self.dirty = true;
        }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// 短语集合
#[derive(Debug)]
pub struct PhraseSet {
    /// 当前已提交的快照
    current: RwLock<Arc<PhraseSnapshot>>,

    /// 串行化写入方
    writer: Mutex<()>,

    /// 短语总数限制
    max_phrases: usize,
}

impl PhraseSet {
    /// 创建空集合（默认权重 1.0）
    pub fn new() -> Self {
        Self::with_max_phrases(DEFAULT_MAX_PHRASES)
    }

    /// 创建带数量限制的空集合
    pub fn with_max_phrases(max_phrases: usize) -> Self {
        Self {
            current: RwLock::new(Arc::new(PhraseSnapshot::initial())),
            writer: Mutex::new(()),
            max_phrases,
        }
    }

    /// 添加单个短语
    pub fn add_phrase(&self, text: &str) -> BiasResult<()> {
        self.update(|edit| edit.add_phrase(text))
    }

    /// 设置偏置权重
    pub fn set_weight(&self, weight: f64) -> BiasResult<()> {
        self.update(|edit| edit.set_weight(weight))
    }

    /// 清空所有短语
    pub fn clear(&self) {
        let _writer = self.writer.lock();
        let current = self.snapshot();

        if current.is_empty() {
            return;
        }

        self.publish(PhraseSnapshot {
            phrases: Vec::new(),
            weight: current.weight,
            version: current.version + 1,
        });
    }

    /// 原子批量修改
    ///
    /// 闭包中的所有修改作为一次提交对读取方可见；闭包返回错误时集合保持不变。
    pub fn update<F>(&self, f: F) -> BiasResult<()>
    where
        F: FnOnce(&mut PhraseSetEdit) -> BiasResult<()>,
    {
        let _writer = self.writer.lock();
        let current = self.snapshot();

        let mut edit = PhraseSetEdit::from_snapshot(&current, self.max_phrases);
        f(&mut edit)?;

        if !edit.dirty {
            return Ok(());
        }

        self.publish(PhraseSnapshot {
            phrases: edit.phrases,
            weight: edit.weight,
            version: current.version + 1,
        });
        Ok(())
    }

    /// 获取当前快照（解码器调用）
    pub fn snapshot(&self) -> Arc<PhraseSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// 获取短语数量
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// 获取当前权重
    pub fn weight(&self) -> f64 {
        self.snapshot().weight()
    }

    pub fn max_phrases(&self) -> usize {
        self.max_phrases
    }

    // 调用方必须持有 writer 锁
    fn publish(&self, next: PhraseSnapshot) {
        tracing::debug!(
            "短语集合更新: version={}, phrases={}, weight={}",
            next.version,
            next.phrases.len(),
            next.weight
        );
        *self.current.write() = Arc::new(next);
    }
}

impl Default for PhraseSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_set_new() {
        let set = PhraseSet::new();
        let snapshot = set.snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.weight(), 1.0);
        assert_eq!(snapshot.version(), 0);
        assert_eq!(set.max_phrases(), DEFAULT_MAX_PHRASES);
    }

    #[test]
    fn test_add_phrase_order() {
        let set = PhraseSet::new();
        set.add_phrase("Contoso").unwrap();
        set.add_phrase("Fabrikam").unwrap();

        let snapshot = set.snapshot();
        assert_eq!(snapshot.phrases(), ["Contoso", "Fabrikam"]);
        assert_eq!(snapshot.version(), 2);
    }

    #[test]
    fn test_add_phrase_rejects_blank() {
        let set = PhraseSet::new();
        set.add_phrase("Contoso").unwrap();

        for text in ["", "   ", "\t\n"] {
            let err = set.add_phrase(text).unwrap_err();
            assert!(matches!(err, BiasError::InvalidArgument { .. }));
        }
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_add_phrase_trims_and_rejects_line_breaks() {
        let set = PhraseSet::new();
        set.add_phrase("  Northwind Traders ").unwrap();
        assert_eq!(set.snapshot().phrases(), ["Northwind Traders"]);

        assert!(set.add_phrase("Contoso\nFabrikam").is_err());
        assert!(set.add_phrase("Contoso\0").is_err());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_duplicate_phrases_kept() {
        let set = PhraseSet::new();
        set.add_phrase("Contoso").unwrap();
        set.add_phrase("Contoso").unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_set_weight_valid_range() {
        let set = PhraseSet::new();
        for w in [0.0, 0.25, 0.5, 1.0, 1.5, 1.99, 2.0] {
            set.set_weight(w).unwrap();
            assert_eq!(set.snapshot().weight(), w);
        }
    }

    #[test]
    fn test_set_weight_out_of_range() {
        let set = PhraseSet::new();
        set.set_weight(1.5).unwrap();

        for w in [-0.001, -1.0, 2.0001, 10.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = set.set_weight(w).unwrap_err();
            assert!(matches!(err, BiasError::DomainError { .. }));
            assert_eq!(set.weight(), 1.5);
        }
    }

    #[test]
    fn test_clear_keeps_weight() {
        let set = PhraseSet::new();
        set.set_weight(0.7).unwrap();
        set.add_phrase("Contoso").unwrap();

        set.clear();
        let snapshot = set.snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.weight(), 0.7);
    }

    #[test]
    fn test_clear_empty_is_noop() {
        let set = PhraseSet::new();
        set.clear();
        assert_eq!(set.snapshot().version(), 0);
    }

    #[test]
    fn test_zero_weight_keeps_phrases() {
        let set = PhraseSet::new();
        set.add_phrase("Contoso").unwrap();
        set.set_weight(0.0).unwrap();

        let snapshot = set.snapshot();
        assert_eq!(snapshot.phrases(), ["Contoso"]);
        assert_eq!(snapshot.weight(), 0.0);
        assert!(snapshot.is_disabled_by_weight());
        assert!(!snapshot.is_biasing_enabled());
    }

    #[test]
    fn test_empty_set_not_disabled_by_weight() {
        let snapshot = PhraseSet::new().snapshot();
        assert!(!snapshot.is_biasing_enabled());
        assert!(!snapshot.is_disabled_by_weight());
    }

    #[test]
    fn test_snapshot_is_immutable() {
        let set = PhraseSet::new();
        set.add_phrase("Contoso").unwrap();
        let before = set.snapshot();

        set.add_phrase("Fabrikam").unwrap();
        set.set_weight(2.0).unwrap();

        assert_eq!(before.phrases(), ["Contoso"]);
        assert_eq!(before.weight(), 1.0);
        assert_eq!(set.snapshot().len(), 2);
    }

    #[test]
    fn test_update_commits_together() {
        let set = PhraseSet::new();
        set.update(|edit| {
            edit.add_phrase("Contoso")?;
            edit.add_phrase("Fabrikam")?;
            edit.set_weight(1.8)
        })
        .unwrap();

        let snapshot = set.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.weight(), 1.8);
        assert_eq!(snapshot.version(), 1);
    }

    #[test]
    fn test_update_failure_applies_nothing() {
        let set = PhraseSet::new();
        set.add_phrase("Contoso").unwrap();

        let result = set.update(|edit| {
            edit.clear();
            edit.add_phrase("Fabrikam")?;
            edit.set_weight(3.0)
        });

        assert!(matches!(result, Err(BiasError::DomainError { .. })));
        let snapshot = set.snapshot();
        assert_eq!(snapshot.phrases(), ["Contoso"]);
        assert_eq!(snapshot.weight(), 1.0);
        assert_eq!(snapshot.version(), 1);
    }

    #[test]
    fn test_same_weight_does_not_bump_version() {
        let set = PhraseSet::new();
        set.set_weight(1.0).unwrap();
        assert_eq!(set.snapshot().version(), 0);
    }

    #[test]
    fn test_max_phrases_limit() {
        let set = PhraseSet::with_max_phrases(2);
        set.add_phrase("word1").unwrap();
        set.add_phrase("word2").unwrap();

        // Should fail - limit reached
        let err = set.add_phrase("word3").unwrap_err();
        assert!(matches!(err, BiasError::PhraseLimitExceeded { limit: 2 }));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_to_hotwords_buffer() {
        let set = PhraseSet::new();
        set.add_phrase("Contoso").unwrap();
        set.add_phrase("Wide World Importers").unwrap();

        assert_eq!(
            set.snapshot().to_hotwords_buffer(),
            "Contoso\nWide World Importers"
        );
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight(0.0).is_ok());
        assert!(validate_weight(2.0).is_ok());
        assert!(validate_weight(-0.1).is_err());
        assert!(validate_weight(2.1).is_err());
    }
}
