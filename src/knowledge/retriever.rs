//! Retriever - TF-IDF 코사인 유사도 정책 검색
//!
//! 쿼리를 학습된 벡터 공간에 투영한 뒤 모든 문서 행과의
//! 코사인 유사도를 계산해 최댓값 문서를 반환합니다.
//! 항상 결과를 하나 반환합니다(임계값 없음).

use std::path::Path;

use serde::Serialize;

use super::index::VectorSpace;
use super::store::{KnowledgeError, KnowledgeStore, PolicyDocument};
use super::vector::cosine_similarity;

// ============================================================================
// Types
// ============================================================================

/// 검색 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    /// 정책 문서
    pub document: PolicyDocument,
    /// 코사인 유사도 (0.0 ~ 1.0)
    pub score: f32,
}

// ============================================================================
// Functions
// ============================================================================

/// 가장 유사한 정책 문서 반환
///
/// 동점이면 인덱스가 낮은 문서가 선택됩니다.
/// 빈 쿼리는 영 벡터가 되어 첫 번째 문서가 반환되므로,
/// 빈 입력은 호출 측에서 걸러야 합니다.
///
/// # Panics
/// `documents`가 비어 있거나 `space`를 학습한 문서 수와 다르면 패닉합니다.
/// 항상 `space`를 학습한 그 문서 슬라이스를 넘겨야 합니다.
/// `PolicyRetriever`는 빈 지식베이스를 생성 시 거부합니다.
pub fn retrieve<'a>(
    query: &str,
    space: &VectorSpace,
    documents: &'a [PolicyDocument],
) -> &'a PolicyDocument {
    let (best, _) = best_match(query, space, documents);
    &documents[best]
}

/// (인덱스, 점수) 최댓값. 최댓값이 여러 개면 첫 번째
fn best_match(query: &str, space: &VectorSpace, documents: &[PolicyDocument]) -> (usize, f32) {
    assert!(!documents.is_empty(), "retrieve requires at least one document");
    assert_eq!(
        space.row_count(),
        documents.len(),
        "documents do not match the fitted vector space"
    );

    let query_vec = space.transform(query);

    let mut best = (0, f32::NEG_INFINITY);
    for (i, row) in space.rows().iter().enumerate() {
        let score = cosine_similarity(&query_vec, row);
        if score > best.1 {
            best = (i, score);
        }
    }
    best
}

// ============================================================================
// PolicyRetriever
// ============================================================================

/// 지식베이스 + 학습된 벡터 공간 묶음
///
/// 생성 시 한 번 학습하며 이후 읽기 전용입니다.
#[derive(Debug, Clone)]
pub struct PolicyRetriever {
    store: KnowledgeStore,
    space: VectorSpace,
}

impl PolicyRetriever {
    /// 지식베이스로 검색기 생성 (인덱스 학습)
    ///
    /// 정책 블록이 없는 지식베이스는 거부합니다.
    pub fn new(store: KnowledgeStore) -> Result<Self, KnowledgeError> {
        if store.is_empty() {
            let path = store.source_path().map(Path::to_path_buf).unwrap_or_default();
            return Err(KnowledgeError::EmptyKnowledgeBase(path));
        }

        let space = VectorSpace::fit(store.documents());
        Ok(Self { store, space })
    }

    /// 최상위 정책 검색
    pub fn retrieve(&self, query: &str) -> RetrievalResult {
        let (index, score) = best_match(query, &self.space, self.store.documents());
        tracing::debug!("Retrieved policy #{} (score={:.4})", index, score);

        RetrievalResult {
            document: self.store.documents()[index].clone(),
            score,
        }
    }

    /// 점수 내림차순 상위 `limit`개 (동점은 인덱스 오름차순)
    pub fn rank(&self, query: &str, limit: usize) -> Vec<RetrievalResult> {
        let query_vec = self.space.transform(query);

        let mut scored: Vec<(usize, f32)> = self
            .space
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| (i, cosine_similarity(&query_vec, row)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(i, score)| RetrievalResult {
                document: self.store.documents()[i].clone(),
                score,
            })
            .collect()
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn space(&self) -> &VectorSpace {
        &self.space
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const REFUND: &str = "Refunds are processed within 7 days.";
    const PREPAID: &str = "Prepaid plans renew monthly.";

    fn sample_retriever() -> PolicyRetriever {
        PolicyRetriever::new(KnowledgeStore::from_text(&format!("{REFUND}\n\n{PREPAID}"))).unwrap()
    }

    fn telecom_retriever() -> PolicyRetriever {
        PolicyRetriever::new(KnowledgeStore::from_text(
            "Billing disputes must be raised within 30 days of the bill date.\n\n\
             Refund requests are processed within 7 business days after approval.\n\n\
             Network outages are reported to the technical team and resolved within 24 hours.\n\n\
             Prepaid plans renew monthly and unused data does not carry over.",
        ))
        .unwrap()
    }

    #[test]
    fn test_refund_query_returns_refund_policy() {
        let retriever = sample_retriever();
        let result = retriever.retrieve("When will my refund arrive?");
        assert_eq!(result.document.text, REFUND);
    }

    #[test]
    fn test_empty_query_returns_first_document() {
        let retriever = sample_retriever();

        let result = retriever.retrieve("");
        assert_eq!(result.document.index, 0);
        assert_eq!(result.score, 0.0);

        let result = retriever.retrieve("   \t");
        assert_eq!(result.document.index, 0);
    }

    #[test]
    fn test_exact_document_text_returns_itself() {
        let retriever = telecom_retriever();
        for doc in retriever.store().documents() {
            let result = retriever.retrieve(&doc.text);
            assert_eq!(result.document.index, doc.index);
            assert!((result.score - 1.0).abs() < 0.0001);
        }
    }

    #[test]
    fn test_keyword_query_matches_topic() {
        let retriever = telecom_retriever();
        assert_eq!(retriever.retrieve("network outage in my area").document.index, 2);
        assert_eq!(retriever.retrieve("my prepaid data").document.index, 3);
        assert_eq!(retriever.retrieve("dispute my bill").document.index, 0);
    }

    #[test]
    fn test_always_returns_member_document() {
        let retriever = telecom_retriever();
        for query in ["", "zzz qqq", "refund", "plans", "!!!", "日本語"] {
            let result = retriever.retrieve(query);
            assert!(retriever.store().documents().contains(&result.document));
        }
    }

    #[test]
    fn test_deterministic() {
        let retriever = telecom_retriever();
        let first = retriever.retrieve("refund for my prepaid plan");
        for _ in 0..10 {
            assert_eq!(retriever.retrieve("refund for my prepaid plan"), first);
        }
    }

    #[test]
    fn test_tie_break_lowest_index() {
        // 두 문서가 동일 → 동일 점수, 앞 문서 선택
        let retriever =
            PolicyRetriever::new(KnowledgeStore::from_text("roaming charges\n\nroaming charges"))
                .unwrap();
        let result = retriever.retrieve("roaming");
        assert_eq!(result.document.index, 0);

        // 쿼리 용어가 두 문서 각각에 대칭으로 등장
        let retriever =
            PolicyRetriever::new(KnowledgeStore::from_text("alpha beta\n\nalpha gamma")).unwrap();
        assert_eq!(retriever.retrieve("alpha").document.index, 0);
    }

    #[test]
    fn test_free_function_matches_retriever() {
        let retriever = telecom_retriever();
        let doc = retrieve(
            "refund approval",
            retriever.space(),
            retriever.store().documents(),
        );
        assert_eq!(doc, &retriever.retrieve("refund approval").document);
    }

    #[test]
    fn test_rank_orders_by_score_then_index() {
        let retriever = telecom_retriever();
        let ranked = retriever.rank("refund requests", 10);

        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].document.index, 1);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].document.index < pair[1].document.index);
            }
        }
    }

    #[test]
    fn test_bundled_knowledge_base() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("knowledge_base/zends_policies.txt");
        let retriever = PolicyRetriever::new(KnowledgeStore::load(&path).unwrap()).unwrap();

        assert_eq!(retriever.store().len(), 8);
        assert!(retriever
            .retrieve("my internet connection is down, network outage")
            .document
            .text
            .starts_with("Network Issues"));
        assert!(retriever
            .retrieve("is roaming available in Singapore?")
            .document
            .text
            .starts_with("International Roaming"));
    }

    #[test]
    fn test_rank_limit() {
        let retriever = telecom_retriever();
        assert_eq!(retriever.rank("plans", 2).len(), 2);
        assert!(retriever.rank("plans", 0).is_empty());
    }

    #[test]
    fn test_empty_store_rejected() {
        for text in ["", "\n\n", "  \n\n\t\n\n"] {
            let err = PolicyRetriever::new(KnowledgeStore::from_text(text)).unwrap_err();
            assert!(matches!(err, KnowledgeError::EmptyKnowledgeBase(_)));
        }
    }

    #[test]
    #[should_panic(expected = "do not match the fitted vector space")]
    fn test_mismatched_documents_panic() {
        let retriever = telecom_retriever();
        let fewer = &retriever.store().documents()[..2];
        retrieve("refund approval", retriever.space(), fewer);
    }
}
