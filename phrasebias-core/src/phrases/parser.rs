//! 短语文件解析器
//!
//! 解析 phrases.txt 和 phrases.toml 格式的短语列表文件

use crate::error::{BiasError, BiasResult};
use crate::phrases::set::{normalize_phrase, validate_weight};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// 解析后的短语列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhraseList {
    /// 文件中指定的权重（可选）
    pub weight: Option<f64>,
    /// 短语（按文件顺序）
    pub phrases: Vec<String>,
}

/// TOML 文件结构
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PhraseListFile {
    weight: Option<f64>,
    #[serde(default)]
    phrases: Vec<String>,
    #[serde(default)]
    groups: BTreeMap<String, Vec<String>>,
}

/// 短语文件解析器
pub struct PhraseListParser;

impl PhraseListParser {
    /// 从文本文件解析短语
    ///
    /// 格式：
    /// ```text
    /// # 注释
    /// @weight 1.5
    /// Contoso
    /// Wide World Importers
    /// ```
    pub fn parse_txt(content: &str) -> BiasResult<PhraseList> {
        let mut list = PhraseList::default();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // 跳过空行和注释
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(value) = line.strip_prefix("@weight") {
                if list.weight.is_some() {
                    return Err(Self::line_error(line_num, "duplicate @weight directive"));
                }

                let weight = value.trim().parse::<f64>().map_err(|_| {
                    Self::line_error(line_num, format!("invalid weight '{}'", value.trim()))
                })?;
                let weight = validate_weight(weight)
                    .map_err(|e| Self::line_error(line_num, e.to_string()))?;

                list.weight = Some(weight);
                continue;
            }

            let phrase =
                normalize_phrase(line).map_err(|e| Self::line_error(line_num, e.to_string()))?;
            list.phrases.push(phrase);
        }

        Ok(list)
    }

    /// 从 TOML 文件解析短语
    ///
    /// 格式：
    /// ```toml
    /// weight = 1.5
    /// phrases = ["Contoso", "Fabrikam"]
    ///
    /// [groups]
    /// people = ["Ana Trujillo", "Thomas Hardy"]
    /// ```
    ///
    /// 分组按名称排序后追加在 `phrases` 之后。
    pub fn parse_toml(content: &str) -> BiasResult<PhraseList> {
        let file: PhraseListFile = toml::from_str(content).map_err(|e| BiasError::PhraseFile {
            location: "toml".to_string(),
            reason: e.message().to_string(),
        })?;

        let weight = match file.weight {
            Some(w) => Some(validate_weight(w).map_err(|e| BiasError::PhraseFile {
                location: "weight".to_string(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        let mut phrases = Vec::with_capacity(file.phrases.len());
        for (index, text) in file.phrases.iter().enumerate() {
            phrases.push(normalize_phrase(text).map_err(|e| BiasError::PhraseFile {
                location: format!("phrases[{}]", index),
                reason: e.to_string(),
            })?);
        }

        for (group_name, group) in &file.groups {
            for (index, text) in group.iter().enumerate() {
                phrases.push(normalize_phrase(text).map_err(|e| BiasError::PhraseFile {
                    location: format!("groups.{}[{}]", group_name, index),
                    reason: e.to_string(),
                })?);
            }
        }

        Ok(PhraseList { weight, phrases })
    }

    /// 加载短语文件（自动检测格式）
    pub fn load_file(path: &Path) -> BiasResult<PhraseList> {
        let content = std::fs::read_to_string(path).map_err(|e| BiasError::PhraseFile {
            location: path.display().to_string(),
            reason: format!("failed to read phrase file: {}", e),
        })?;

        // 根据文件扩展名选择解析器
        let result = match path.extension() {
            Some(ext) if ext == "toml" => Self::parse_toml(&content),
            // 默认使用 txt 格式
            _ => Self::parse_txt(&content),
        };

        let list = result.map_err(|e| match e {
            BiasError::PhraseFile { location, reason } => BiasError::PhraseFile {
                location: format!("{}:{}", path.display(), location),
                reason,
            },
            other => other,
        })?;

        tracing::info!("加载短语文件 {:?}: {} 个短语", path, list.phrases.len());
        Ok(list)
    }

    fn line_error(line_num: usize, reason: impl Into<String>) -> BiasError {
        BiasError::PhraseFile {
            location: format!("line {}", line_num + 1),
            reason: reason.into(),
        }
    }
}
