//! 키워드 기반 분류기 - 결정적 오프라인 구현
//!
//! 모델 없이 키워드 적중 수로 분류합니다.
//! 기본 백엔드이며 테스트에서도 사용합니다.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::knowledge::tokenize;

use super::{Prediction, TextClassifier};

/// 키워드가 하나도 맞지 않을 때의 의도 레이블
pub const GENERAL_INTENT: &str = "General";

/// 의도별 키워드 (공백이 있으면 구문으로 매칭)
const INTENT_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Billing",
        &[
            "bill", "billed", "billing", "charged", "charge", "charges", "invoice", "price",
            "payment", "overcharged", "fee", "extra",
        ],
    ),
    (
        "Refund",
        &["refund", "refunds", "refunded", "reimburse", "money back", "cashback"],
    ),
    (
        "Technical",
        &[
            "network", "internet", "connection", "signal", "outage", "slow", "error",
            "not working", "is down", "no service",
        ],
    ),
    (
        "Complaint",
        &[
            "complaint", "complain", "unhappy", "poor", "terrible", "worst", "disappointed",
            "rude", "raise a complaint",
        ],
    ),
    (
        "Product",
        &[
            "benefits", "available", "features", "offer", "offers", "upgrade", "tell me about",
            "details",
        ],
    ),
];

const NEGATIVE_CUES: &[&str] = &[
    "not", "no", "never", "unhappy", "poor", "angry", "terrible", "worst", "bad", "down",
    "incorrectly", "overcharged", "disappointed", "frustrated", "rude", "issues",
];

const POSITIVE_CUES: &[&str] = &[
    "thanks", "thank", "great", "good", "love", "happy", "excellent", "awesome", "benefits",
    "helpful", "pleased",
];

/// 텍스트에서 키워드 적중 수 계산
fn count_hits(lowered: &str, tokens: &HashSet<String>, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .filter(|kw| {
            if kw.contains(' ') {
                lowered.contains(*kw)
            } else {
                tokens.contains(**kw)
            }
        })
        .count()
}

// ============================================================================
// KeywordIntentClassifier
// ============================================================================

/// 키워드 의도 분류기
///
/// 신뢰도 = 1위 의도 적중 수 / 전체 적중 수.
/// 동점이면 목록 앞쪽 의도가 선택됩니다.
#[derive(Debug, Default, Clone)]
pub struct KeywordIntentClassifier;

impl KeywordIntentClassifier {
    pub fn new() -> Self {
        tracing::debug!("Initialized KeywordIntentClassifier");
        Self
    }

    fn predict(&self, text: &str) -> Prediction {
        let lowered = text.to_lowercase();
        let tokens: HashSet<String> = tokenize(&lowered).into_iter().collect();

        let mut best: Option<(&str, usize)> = None;
        let mut total = 0;

        for (intent, keywords) in INTENT_KEYWORDS {
            let hits = count_hits(&lowered, &tokens, keywords);
            total += hits;
            if hits > best.map(|(_, h)| h).unwrap_or(0) {
                best = Some((*intent, hits));
            }
        }

        match best {
            Some((intent, hits)) => Prediction::new(intent, hits as f32 / total as f32),
            None => Prediction::new(GENERAL_INTENT, 0.0),
        }
    }
}

#[async_trait]
impl TextClassifier for KeywordIntentClassifier {
    async fn classify(&self, text: &str) -> Result<Prediction> {
        Ok(self.predict(text))
    }

    fn name(&self) -> &str {
        "keyword-intent"
    }
}

// ============================================================================
// KeywordSentimentAnalyzer
// ============================================================================

/// 키워드 감정 분석기
///
/// `NEGATIVE` / `NEUTRAL` / `POSITIVE` 이름 레이블을 반환합니다.
#[derive(Debug, Default, Clone)]
pub struct KeywordSentimentAnalyzer;

impl KeywordSentimentAnalyzer {
    pub fn new() -> Self {
        tracing::debug!("Initialized KeywordSentimentAnalyzer");
        Self
    }

    fn predict(&self, text: &str) -> Prediction {
        let lowered = text.to_lowercase();
        let tokens: HashSet<String> = tokenize(&lowered).into_iter().collect();

        let negative = count_hits(&lowered, &tokens, NEGATIVE_CUES);
        let positive = count_hits(&lowered, &tokens, POSITIVE_CUES);
        let total = (negative + positive) as f32;

        if negative > positive {
            Prediction::new("NEGATIVE", negative as f32 / total)
        } else if positive > negative {
            Prediction::new("POSITIVE", positive as f32 / total)
        } else {
            Prediction::new("NEUTRAL", 0.5)
        }
    }
}

#[async_trait]
impl TextClassifier for KeywordSentimentAnalyzer {
    async fn classify(&self, text: &str) -> Result<Prediction> {
        Ok(self.predict(text))
    }

    fn name(&self) -> &str {
        "keyword-sentiment"
    }
}

// ============================================================================
// Tests
// ============================================================================
