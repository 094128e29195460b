//! 설정 모듈
//!
//! 우선순위: `--config` 경로 > [`default_config_path`] > 기본값.
//! 기본 경로는 `dirs::data_local_dir()` 아래 `.zends-copilot/config.toml`입니다
//! (Linux: `~/.local/share/.zends-copilot/config.toml`).
//! 이후 환경변수(`ZENDS_KNOWLEDGE_BASE`, `ZENDS_CLASSIFIER_BACKEND`)가 덮어씁니다.
//!
//! ```toml
//! knowledge_base = "knowledge_base/zends_policies.txt"
//!
//! [classifier]
//! backend = "huggingface"
//! sentiment_scheme = "three_class"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::inference::{LabelScheme, DEFAULT_INTENT_MODEL, DEFAULT_SENTIMENT_MODEL};

/// 기본 지식베이스 경로
pub const DEFAULT_KNOWLEDGE_BASE: &str = "knowledge_base/zends_policies.txt";

/// 지식베이스 경로 환경변수
pub const ENV_KNOWLEDGE_BASE: &str = "ZENDS_KNOWLEDGE_BASE";
/// 분류기 백엔드 환경변수
pub const ENV_CLASSIFIER_BACKEND: &str = "ZENDS_CLASSIFIER_BACKEND";

// ============================================================================
// Data Directory
// ============================================================================

/// 데이터 디렉토리 경로 (`<data_local_dir>/.zends-copilot/`, 없으면 홈 디렉토리 아래)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".zends-copilot")
}

/// 기본 설정 파일 경로
pub fn default_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

// ============================================================================
// Types
// ============================================================================

/// 분류기 백엔드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// 키워드 기반 (오프라인, 결정적)
    #[default]
    Keyword,
    /// Hugging Face Inference API
    Huggingface,
}

impl FromStr for ClassifierBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "huggingface" | "hf" => Ok(Self::Huggingface),
            other => bail!("Unknown classifier backend: '{}' (expected keyword or huggingface)", other),
        }
    }
}

/// 분류기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: ClassifierBackend,
    #[serde(default = "default_intent_model")]
    pub intent_model: String,
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,
    /// 감정 모델의 `LABEL_n` 해석 방식
    #[serde(default)]
    pub sentiment_scheme: LabelScheme,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 추론 엔드포인트 (없으면 Hugging Face 기본값)
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_intent_model() -> String { DEFAULT_INTENT_MODEL.into() }
fn default_sentiment_model() -> String { DEFAULT_SENTIMENT_MODEL.into() }
fn default_timeout_secs() -> u64 { 30 }
fn default_knowledge_base() -> PathBuf { PathBuf::from(DEFAULT_KNOWLEDGE_BASE) }

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            intent_model: default_intent_model(),
            sentiment_model: default_sentiment_model(),
            sentiment_scheme: LabelScheme::default(),
            timeout_secs: default_timeout_secs(),
            endpoint: None,
        }
    }
}

/// 루트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopilotConfig {
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: PathBuf,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// 설정을 읽어온 파일 (기본값이면 None)
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            knowledge_base: default_knowledge_base(),
            classifier: ClassifierConfig::default(),
            source: None,
        }
    }
}

impl CopilotConfig {
    /// 설정 로드 + 환경변수 적용
    ///
    /// # Arguments
    /// * `explicit` - `--config`로 지정된 경로 (없어도 되지만 지정했다면 존재해야 함)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::resolve(explicit, &default_config_path())?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 명시 경로, 없으면 `fallback` 파일, 그것도 없으면 기본값
    fn resolve(explicit: Option<&Path>, fallback: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None if fallback.exists() => Self::load_from(fallback),
            None => {
                tracing::debug!("No config file at {:?}, using defaults", fallback);
                Ok(Self::default())
            }
        }
    }

    /// 특정 파일에서 로드
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        config.source = Some(path.to_path_buf());

        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// 환경변수 덮어쓰기
    ///
    /// `lookup`은 변수 이름으로 값을 찾습니다 (테스트에서 대체 가능).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_KNOWLEDGE_BASE).filter(|v| !v.is_empty()) {
            self.knowledge_base = PathBuf::from(path);
        }

        if let Some(backend) = lookup(ENV_CLASSIFIER_BACKEND).filter(|v| !v.is_empty()) {
            self.classifier.backend = backend
                .parse()
                .with_context(|| format!("Invalid {}", ENV_CLASSIFIER_BACKEND))?;
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
