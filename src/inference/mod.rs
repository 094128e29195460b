//! 추론 모듈 - 의도/감정 분류 경계
//!
//! 분류 모델은 외부 서비스로 취급합니다: 텍스트를 넣으면
//! 레이블과 신뢰도(0~1)를 돌려줍니다.
//!
//! ## 사용법
//! ```rust,ignore
//! let classifier = KeywordIntentClassifier::new();
//! let prediction = classifier.classify("I was charged twice").await?;
//! ```

mod huggingface;
mod keyword;
mod sentiment;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

pub use huggingface::{
    get_api_token, has_api_token, HuggingFaceClassifier, DEFAULT_INTENT_MODEL,
    DEFAULT_SENTIMENT_MODEL,
};
pub use keyword::{KeywordIntentClassifier, KeywordSentimentAnalyzer, GENERAL_INTENT};
pub use sentiment::{LabelScheme, Priority, Sentiment, SentimentError};

// ============================================================================
// Types
// ============================================================================

/// 분류 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// 원본 레이블
    pub label: String,
    /// 신뢰도 (0.0 ~ 1.0)
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score: score.clamp(0.0, 1.0),
        }
    }
}

// ============================================================================
// TextClassifier Trait
// ============================================================================

/// 텍스트 분류기 트레이트
///
/// 의도 분류와 감정 분석 모두 이 인터페이스를 사용합니다.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    /// 단일 텍스트 분류
    async fn classify(&self, text: &str) -> Result<Prediction>;

    /// 분류기 이름
    fn name(&self) -> &str;
}
