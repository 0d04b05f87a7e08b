//! PhraseBias 配置模块
//!
//! 统一的配置管理，从 ~/.config/phrasebias/config.toml 加载

use crate::error::{BiasError, BiasResult};
use crate::phrases::{validate_weight, DEFAULT_MAX_PHRASES, DEFAULT_WEIGHT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BiasConfig {
    /// 短语列表语法配置
    #[serde(default)]
    pub grammar: GrammarConfig,
}

/// 短语列表语法配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// 初始偏置权重 [0.0, 2.0]
    pub weight: f64,
    /// 最大短语数
    pub max_phrases: usize,
    /// 初始短语
    pub phrases: Vec<String>,
    /// 短语文件路径（.txt 或 .toml）
    pub phrases_file: Option<PathBuf>,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            max_phrases: DEFAULT_MAX_PHRASES,
            phrases: Vec::new(),
            phrases_file: None,
        }
    }
}

impl BiasConfig {
    /// 加载默认位置的配置文件，不存在时使用默认配置
    pub fn load() -> BiasResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("配置文件不存在，使用默认配置: {:?}", config_path);
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// 加载指定配置文件
    pub fn load_from(path: &Path) -> BiasResult<Self> {
        if !path.exists() {
            return Err(BiasError::ConfigNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| BiasError::ConfigParse {
            path: path.display().to_string(),
            reason: e.message().to_string(),
        })?;
        config.validate().map_err(|e| BiasError::ConfigParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!(
            "📋 加载配置成功: {:?} (weight={}, phrases={}, max_phrases={})",
            path,
            config.grammar.weight,
            config.grammar.phrases.len(),
            config.grammar.max_phrases
        );
        Ok(config)
    }

    /// 保存到默认位置
    pub fn save(&self) -> BiasResult<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// 保存到指定路径
    pub fn save_to(&self, path: &Path) -> BiasResult<()> {
        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| BiasError::ConfigParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, content)?;

        tracing::info!("保存配置成功: {:?}", path);
        Ok(())
    }

    /// 校验配置取值
    pub fn validate(&self) -> BiasResult<()> {
        validate_weight(self.grammar.weight)?;
        Ok(())
    }

    /// 获取配置文件路径
    pub fn config_path() -> BiasResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| BiasError::ConfigNotFound("user config directory".to_string()))?;

        Ok(config_dir.join("phrasebias").join("config.toml"))
    }
}
