//! Support Copilot - 분석 파이프라인 컨텍스트
//!
//! 지식베이스, TF-IDF 인덱스, 분류기를 시작 시 한 번 구성하고
//! 요청마다 같은 컨텍스트로 분석합니다.
//!
//! 파이프라인: 빈 입력 검사 → 의도 → 감정 → 우선순위 → 정책 검색 → 응답 구성

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;

use crate::config::{ClassifierBackend, ClassifierConfig, CopilotConfig};
use crate::inference::{
    HuggingFaceClassifier, KeywordIntentClassifier, KeywordSentimentAnalyzer, LabelScheme,
    Prediction, Priority, Sentiment, SentimentError, TextClassifier,
};
use crate::knowledge::{
    compose, KnowledgeError, KnowledgeStore, PolicyRetriever, RetrievalResult,
};

// ============================================================================
// Errors
// ============================================================================

/// 분석 요청 에러
#[derive(Debug, Error)]
pub enum CopilotError {
    /// 빈(공백) 쿼리
    #[error("customer query is empty")]
    EmptyQuery,

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    #[error(transparent)]
    Sentiment(#[from] SentimentError),

    /// 분류기 호출 실패
    #[error("{stage} classifier failed: {error:#}")]
    Classifier {
        stage: &'static str,
        error: anyhow::Error,
    },
}

// ============================================================================
// Types
// ============================================================================

/// 분석 결과
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub query: String,
    pub intent: Prediction,
    /// 감정 모델 원본 결과
    pub sentiment_raw: Prediction,
    pub sentiment: Sentiment,
    pub priority: Priority,
    pub policy: RetrievalResult,
    pub response: String,
}

// ============================================================================
// SupportCopilot
// ============================================================================

/// 고객지원 코파일럿
///
/// 생성 후에는 읽기 전용이며 요청마다 `&self`로 사용합니다.
pub struct SupportCopilot {
    retriever: PolicyRetriever,
    intent: Box<dyn TextClassifier>,
    sentiment: Box<dyn TextClassifier>,
    scheme: LabelScheme,
}

impl SupportCopilot {
    /// 구성 요소로 생성 (인덱스 학습 포함)
    ///
    /// # Arguments
    /// * `store` - 로드된 지식베이스
    /// * `intent` - 의도 분류기
    /// * `sentiment` - 감정 분석기
    /// * `scheme` - 감정 모델의 위치 레이블 해석 방식
    ///
    /// 정책 블록이 없는 지식베이스는 `CopilotError::Knowledge`로 거부합니다.
    pub fn new(
        store: KnowledgeStore,
        intent: Box<dyn TextClassifier>,
        sentiment: Box<dyn TextClassifier>,
        scheme: LabelScheme,
    ) -> Result<Self, CopilotError> {
        let retriever = PolicyRetriever::new(store)?;

        tracing::info!(
            "Copilot ready: {} policies, intent={}, sentiment={}",
            retriever.store().len(),
            intent.name(),
            sentiment.name()
        );

        Ok(Self {
            retriever,
            intent,
            sentiment,
            scheme,
        })
    }

    /// 설정으로 생성
    ///
    /// 지식베이스를 읽을 수 없거나 원격 백엔드 토큰이 없으면 실패합니다.
    pub fn from_config(config: &CopilotConfig) -> Result<Self> {
        let store = KnowledgeStore::load(&config.knowledge_base)
            .context("Failed to load knowledge base")?;

        let (intent, sentiment) = create_classifiers(&config.classifier)?;

        let copilot = Self::new(store, intent, sentiment, config.classifier.sentiment_scheme)?;
        Ok(copilot)
    }

    /// 고객 쿼리 분석
    pub async fn analyze(&self, query: &str) -> Result<AnalysisReport, CopilotError> {
        if query.trim().is_empty() {
            return Err(CopilotError::EmptyQuery);
        }

        let intent = self
            .intent
            .classify(query)
            .await
            .map_err(|error| CopilotError::Classifier {
                stage: "intent",
                error,
            })?;

        let sentiment_raw = self
            .sentiment
            .classify(query)
            .await
            .map_err(|error| CopilotError::Classifier {
                stage: "sentiment",
                error,
            })?;

        let sentiment = Sentiment::from_label(&sentiment_raw.label, self.scheme)?;
        let priority = Priority::from(sentiment);

        let policy = self.retriever.retrieve(query);
        let response = compose(&policy.document);

        tracing::debug!(
            "Analyzed query: intent={} sentiment={:?} priority={:?} policy=#{}",
            intent.label,
            sentiment,
            priority,
            policy.document.index
        );

        Ok(AnalysisReport {
            query: query.to_string(),
            intent,
            sentiment_raw,
            sentiment,
            priority,
            policy,
            response,
        })
    }

    pub fn retriever(&self) -> &PolicyRetriever {
        &self.retriever
    }

    pub fn intent_classifier(&self) -> &dyn TextClassifier {
        self.intent.as_ref()
    }

    pub fn sentiment_analyzer(&self) -> &dyn TextClassifier {
        self.sentiment.as_ref()
    }
}

// ============================================================================
// Factory Function
// ============================================================================

/// 설정된 백엔드로 (의도, 감정) 분류기 생성
pub fn create_classifiers(
    config: &ClassifierConfig,
) -> Result<(Box<dyn TextClassifier>, Box<dyn TextClassifier>)> {
    match config.backend {
        ClassifierBackend::Keyword => Ok((
            Box::new(KeywordIntentClassifier::new()),
            Box::new(KeywordSentimentAnalyzer::new()),
        )),
        ClassifierBackend::Huggingface => {
            let timeout = Duration::from_secs(config.timeout_secs);

            let build = |model: &str| -> Result<HuggingFaceClassifier> {
                let classifier = HuggingFaceClassifier::from_env(model, timeout)
                    .with_context(|| format!("Failed to create classifier for {}", model))?;
                Ok(match &config.endpoint {
                    Some(endpoint) => classifier.with_endpoint(endpoint.as_str()),
                    None => classifier,
                })
            };

            let intent = build(&config.intent_model)?;
            let sentiment = build(&config.sentiment_model)?;

            tracing::info!(
                "Using Hugging Face inference (intent={}, sentiment={})",
                intent.model(),
                sentiment.model()
            );
            Ok((Box::new(intent), Box::new(sentiment)))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const POLICIES: &str = "Billing disputes must be raised within 30 days of the bill date.\n\n\
        Refund requests are processed within 7 business days after approval.\n\n\
        Network outages are reported to the technical team and resolved within 24 hours.\n\n\
        Prepaid plans renew monthly and unused data does not carry over.";

    /// 고정 레이블을 반환하고 호출 횟수를 세는 분류기
    struct FixedClassifier {
        label: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TextClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<Prediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Prediction::new(self.label, 0.9))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl TextClassifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<Prediction> {
            anyhow::bail!("model not loaded")
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn keyword_copilot() -> SupportCopilot {
        SupportCopilot::new(
            KnowledgeStore::from_text(POLICIES),
            Box::new(KeywordIntentClassifier::new()),
            Box::new(KeywordSentimentAnalyzer::new()),
            LabelScheme::ThreeClass,
        )
        .unwrap()
    }

    fn fixed_copilot(sentiment: &'static str, scheme: LabelScheme) -> (SupportCopilot, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let copilot = SupportCopilot::new(
            KnowledgeStore::from_text(POLICIES),
            Box::new(FixedClassifier {
                label: "Refund",
                calls: calls.clone(),
            }),
            Box::new(FixedClassifier {
                label: sentiment,
                calls: calls.clone(),
            }),
            scheme,
        )
        .unwrap();
        (copilot, calls)
    }

    #[tokio::test]
    async fn test_refund_complaint_is_high_priority() {
        let copilot = keyword_copilot();
        let report = copilot
            .analyze("My refund has not been processed after approval")
            .await
            .unwrap();

        assert_eq!(report.intent.label, "Refund");
        assert_eq!(report.sentiment, Sentiment::Negative);
        assert_eq!(report.priority, Priority::High);
        assert_eq!(report.policy.document.index, 1);
        assert!(report.response.starts_with("Refund requests are processed"));
        assert!(report
            .response
            .ends_with("Our support team will assist you further if needed.\n"));
    }

    #[tokio::test]
    async fn test_product_question_is_normal_priority() {
        let copilot = keyword_copilot();
        let report = copilot
            .analyze("Thanks! What are the benefits of prepaid plans?")
            .await
            .unwrap();

        assert_eq!(report.intent.label, "Product");
        assert_eq!(report.sentiment, Sentiment::Positive);
        assert_eq!(report.priority, Priority::Normal);
        assert_eq!(report.policy.document.index, 3);
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_classifiers() {
        let (copilot, calls) = fixed_copilot("NEGATIVE", LabelScheme::ThreeClass);

        for query in ["", "   ", "\n\t"] {
            let err = copilot.analyze(query).await.unwrap_err();
            assert!(matches!(err, CopilotError::EmptyQuery));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_positional_labels_follow_scheme() {
        let (copilot, _) = fixed_copilot("LABEL_1", LabelScheme::ThreeClass);
        let report = copilot.analyze("my bill").await.unwrap();
        assert_eq!(report.sentiment, Sentiment::Neutral);
        assert_eq!(report.priority, Priority::Normal);

        let (copilot, _) = fixed_copilot("LABEL_1", LabelScheme::Binary);
        let report = copilot.analyze("my bill").await.unwrap();
        assert_eq!(report.sentiment, Sentiment::Positive);

        let (copilot, _) = fixed_copilot("LABEL_0", LabelScheme::Binary);
        let report = copilot.analyze("my bill").await.unwrap();
        assert_eq!(report.priority, Priority::High);
    }

    #[tokio::test]
    async fn test_unknown_sentiment_label_errors() {
        let (copilot, _) = fixed_copilot("LABEL_7", LabelScheme::ThreeClass);
        let err = copilot.analyze("my bill").await.unwrap_err();
        assert!(matches!(err, CopilotError::Sentiment(_)));
    }

    #[tokio::test]
    async fn test_classifier_failure_reports_stage() {
        let copilot = SupportCopilot::new(
            KnowledgeStore::from_text(POLICIES),
            Box::new(KeywordIntentClassifier::new()),
            Box::new(FailingClassifier),
            LabelScheme::ThreeClass,
        )
        .unwrap();

        let err = copilot.analyze("network is down").await.unwrap_err();
        match err {
            CopilotError::Classifier { stage, .. } => assert_eq!(stage, "sentiment"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let copilot = keyword_copilot();
        let report = copilot.analyze("I was charged extra on my bill").await.unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["intent"]["label"], "Billing");
        assert_eq!(json["priority"], "normal");
        assert_eq!(json["policy"]["document"]["index"], 0);
    }

    #[test]
    fn test_empty_knowledge_base_rejected_at_construction() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = SupportCopilot::new(
            KnowledgeStore::from_text("\n\n"),
            Box::new(FixedClassifier {
                label: "Refund",
                calls: calls.clone(),
            }),
            Box::new(KeywordSentimentAnalyzer::new()),
            LabelScheme::ThreeClass,
        );

        match result {
            Err(CopilotError::Knowledge(KnowledgeError::EmptyKnowledgeBase(_))) => {}
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("empty knowledge base accepted"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_from_config_missing_knowledge_base() {
        let mut config = CopilotConfig::default();
        config.knowledge_base = "/definitely/not/here.txt".into();
        assert!(SupportCopilot::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_keyword_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("policies.txt");
        std::fs::write(&path, POLICIES).unwrap();

        let mut config = CopilotConfig::default();
        config.knowledge_base = path;

        let copilot = SupportCopilot::from_config(&config).unwrap();
        assert_eq!(copilot.retriever().store().len(), 4);
        assert_eq!(copilot.intent_classifier().name(), "keyword-intent");
        assert_eq!(copilot.sentiment_analyzer().name(), "keyword-sentiment");
    }
}
