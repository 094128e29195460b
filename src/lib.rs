//! zends-copilot - 고객지원 코파일럿
//!
//! 고객 쿼리의 의도와 감정을 분류하고, 정적 정책 지식베이스에서
//! TF-IDF 코사인 유사도로 가장 관련 있는 정책을 찾아 응답을 구성합니다.

pub mod cli;
pub mod config;
pub mod copilot;
pub mod inference;
pub mod knowledge;

// Re-exports
pub use config::{get_data_dir, ClassifierBackend, ClassifierConfig, CopilotConfig};
pub use copilot::{create_classifiers, AnalysisReport, CopilotError, SupportCopilot};
pub use inference::{
    HuggingFaceClassifier, KeywordIntentClassifier, KeywordSentimentAnalyzer, LabelScheme,
    Prediction, Priority, Sentiment, TextClassifier,
};
pub use knowledge::{
    compose, retrieve, KnowledgeError, KnowledgeStore, PolicyDocument, PolicyRetriever,
    RetrievalResult, SparseVector, VectorSpace,
};
