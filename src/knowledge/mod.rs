//! Knowledge 모듈 - 정책 지식베이스 검색 (RAG)
//!
//! - Store: 빈 줄 기준 정책 블록 로드
//! - Tokenizer / Index: TF-IDF 벡터 공간
//! - Retriever: 코사인 유사도 최댓값 정책 선택
//! - Composer: 정책 + 고정 안내 문구

mod composer;
mod index;
mod retriever;
mod store;
mod tokenizer;
mod vector;

// Re-exports
pub use composer::{compose, CLOSING_NOTICE};
pub use index::{VectorSpace, Vocabulary};
pub use retriever::{retrieve, PolicyRetriever, RetrievalResult};
pub use store::{KnowledgeError, KnowledgeStore, PolicyDocument, StoreStats, BLOCK_DELIMITER};
pub use tokenizer::{tokenize, TOKEN_PATTERN};
pub use vector::{cosine_similarity, SparseVector};
