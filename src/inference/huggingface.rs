//! Hugging Face Inference API 분류기
//!
//! text-classification 파이프라인 모델을 원격으로 호출합니다.
//! 모델이 아직 로드되지 않은 경우(503)와 rate limit(429)은
//! 지수 백오프로 재시도합니다.
//!
//! ref: https://huggingface.co/docs/api-inference/tasks/text-classification

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Prediction, TextClassifier};

/// Inference API 기본 엔드포인트
pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";

/// 기본 의도 분류 모델
pub const DEFAULT_INTENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

/// 기본 감정 분석 모델 (3분류)
pub const DEFAULT_SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment";

/// 503/429 에러 시 최대 재시도 횟수
const MAX_RETRIES: u32 = 3;
/// 재시도 시 초기 백오프 (ms)
const INITIAL_BACKOFF_MS: u64 = 2000;
/// 모델 로딩 대기 상한 (초)
const MAX_LOADING_WAIT_SECS: f64 = 30.0;

// ============================================================================
// HuggingFaceClassifier
// ============================================================================

/// Hugging Face 원격 분류기
#[derive(Debug)]
pub struct HuggingFaceClassifier {
    api_token: String,
    model: String,
    endpoint: String,
    initial_backoff: Duration,
    client: reqwest::Client,
}

/// 요청 본문
#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

/// 레이블-점수 쌍
#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// 응답 본문 (모델에 따라 중첩 여부가 다름)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// API 에러 응답
#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
    #[serde(default)]
    estimated_time: Option<f64>,
}

impl HuggingFaceClassifier {
    /// 새 분류기 생성
    ///
    /// # Arguments
    /// * `api_token` - Hugging Face API 토큰
    /// * `model` - 모델 ID (예: `cardiffnlp/twitter-roberta-base-sentiment`)
    /// * `timeout` - 요청 타임아웃
    pub fn new(api_token: String, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("zends-copilot/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_token,
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            client,
        })
    }

    /// 환경변수 토큰으로 생성
    pub fn from_env(model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let token = get_api_token()?;
        Self::new(token, model, timeout)
    }

    /// 엔드포인트 변경 (자체 호스팅 추론 서버 등)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// 재시도 초기 백오프 변경 (서버가 `estimated_time`을 주면 그 값이 우선)
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 모델 호출 URL
    fn model_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model)
    }
}

/// 응답에서 최고 점수 레이블 선택
fn top_prediction(response: ClassifyResponse) -> Option<Prediction> {
    let candidates = match response {
        ClassifyResponse::Nested(mut outer) => {
            if outer.is_empty() {
                return None;
            }
            outer.swap_remove(0)
        }
        ClassifyResponse::Flat(inner) => inner,
    };

    candidates
        .into_iter()
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
        .map(|best| Prediction::new(best.label, best.score))
}

/// 재시도 대기 시간 계산
fn backoff_for(attempt: u32, estimated_time: Option<f64>, initial: Duration) -> Duration {
    match estimated_time {
        Some(secs) if secs > 0.0 => Duration::from_secs_f64(secs.min(MAX_LOADING_WAIT_SECS)),
        _ => initial * 2u32.pow(attempt),
    }
}

#[async_trait]
impl TextClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Prediction> {
        let url = self.model_url();
        let request = ClassifyRequest { inputs: text };

        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 0..=MAX_RETRIES {
            let response = match self
                .client
                .post(&url)
                .bearer_auth(&self.api_token)
                .json(&request)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = Some(anyhow::anyhow!("Failed to send inference request: {}", e));
                    if attempt < MAX_RETRIES {
                        let backoff = backoff_for(attempt, None, self.initial_backoff);
                        tracing::warn!(
                            "Request failed, retrying in {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            MAX_RETRIES
                        );
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    break;
                }
            };

            let status = response.status();
            let body = response
                .text()
                .await
                .context("Failed to read response body")?;

            if status.is_success() {
                let parsed: ClassifyResponse = serde_json::from_str(&body)
                    .context("Failed to parse classification response")?;
                return top_prediction(parsed).ok_or_else(|| {
                    anyhow::anyhow!("Model {} returned no labels", self.model)
                });
            }

            let api_error = serde_json::from_str::<ApiError>(&body).ok();

            // 503 모델 로딩 중 / 429 Rate Limit - 재시도
            if status.as_u16() == 503 || status.as_u16() == 429 {
                let estimated = api_error.as_ref().and_then(|e| e.estimated_time);
                let message = api_error
                    .map(|e| e.error)
                    .unwrap_or_else(|| status.to_string());
                last_error = Some(anyhow::anyhow!("Model {} unavailable: {}", self.model, message));

                if attempt < MAX_RETRIES {
                    let backoff = backoff_for(attempt, estimated, self.initial_backoff);
                    tracing::warn!(
                        "Model {} not ready ({}), backing off {:?} (attempt {}/{})",
                        self.model,
                        status,
                        backoff,
                        attempt + 1,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            } else {
                // 다른 에러 - 즉시 실패
                if let Some(error) = api_error {
                    anyhow::bail!("Inference API error ({}): {}", status, error.error);
                }
                anyhow::bail!("Inference API error ({}): {}", status, body);
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("Classification failed after {} retries", MAX_RETRIES)
        }))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// API Token Management
// ============================================================================

/// API 토큰 로드 (환경변수에서)
///
/// 우선순위:
/// 1. `HF_API_TOKEN` 환경변수
/// 2. `HUGGINGFACE_API_TOKEN` 환경변수
pub fn get_api_token() -> Result<String> {
    for var in ["HF_API_TOKEN", "HUGGINGFACE_API_TOKEN"] {
        if let Ok(token) = std::env::var(var) {
            if !token.is_empty() {
                tracing::debug!("Using API token from {}", var);
                return Ok(token);
            }
        }
    }

    anyhow::bail!(
        "API token not found. Set HF_API_TOKEN or HUGGINGFACE_API_TOKEN environment variable.\n\
         Get your token at: https://huggingface.co/settings/tokens"
    )
}

/// API 토큰 존재 여부 확인
pub fn has_api_token() -> bool {
    get_api_token().is_ok()
}

// ============================================================================
// Tests
// ============================================================================
