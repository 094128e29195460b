//! Similarity Index - TF-IDF 벡터 공간
//!
//! 시작 시 정책 문서 전체로 한 번 학습(fit)하고 이후에는 변경하지 않습니다.
//! 문서가 바뀌면 처음부터 다시 학습합니다.
//!
//! - tf: 문서 내 용어 등장 횟수
//! - idf: ln((1 + n) / (1 + df)) + 1 (smooth)
//! - 각 행은 L2 정규화
//!
//! ref: https://scikit-learn.org/stable/modules/feature_extraction.html#tfidf-term-weighting

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::store::PolicyDocument;
use super::tokenizer::tokenize;
use super::vector::SparseVector;

// ============================================================================
// Vocabulary
// ============================================================================

/// 용어 → 열 인덱스 매핑
///
/// 용어는 사전순으로 정렬되어 열 번호가 입력 순서와 무관하게 결정됩니다.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: BTreeMap<String, usize>,
}

impl Vocabulary {
    fn from_terms(terms: BTreeSet<String>) -> Self {
        let terms = terms
            .into_iter()
            .enumerate()
            .map(|(col, term)| (term, col))
            .collect();
        Self { terms }
    }

    /// 용어의 열 인덱스 (학습에 없던 용어는 None)
    pub fn column(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// 열 순서대로 용어 반환
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }
}

// ============================================================================
// VectorSpace
// ============================================================================

/// 학습된 TF-IDF 벡터 공간
///
/// 불변식: `rows.len()` == 문서 수, 각 행의 열 인덱스 < `vocabulary.len()`
#[derive(Debug, Clone)]
pub struct VectorSpace {
    vocabulary: Vocabulary,
    idf: Vec<f32>,
    rows: Vec<SparseVector>,
}

impl VectorSpace {
    /// 문서 집합으로 벡터 공간 학습
    pub fn fit(documents: &[PolicyDocument]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(&d.text)).collect();

        let all_terms: BTreeSet<String> = tokenized.iter().flatten().cloned().collect();
        let vocabulary = Vocabulary::from_terms(all_terms);

        // 문서 빈도 (df)
        let mut df = vec![0usize; vocabulary.len()];
        for tokens in &tokenized {
            let unique: BTreeSet<usize> = tokens
                .iter()
                .filter_map(|t| vocabulary.column(t))
                .collect();
            for col in unique {
                df[col] += 1;
            }
        }

        let n = documents.len() as f32;
        let idf: Vec<f32> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
            .collect();

        let mut space = Self {
            vocabulary,
            idf,
            rows: Vec::with_capacity(documents.len()),
        };

        let rows = tokenized.iter().map(|tokens| space.weigh(tokens)).collect();
        space.rows = rows;

        tracing::info!(
            "Fitted TF-IDF space: {} documents, {} terms",
            space.rows.len(),
            space.vocabulary.len()
        );

        space
    }

    /// 텍스트를 학습된 공간에 투영 (OOV 용어는 버림)
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&tokenize(text))
    }

    /// 토큰 목록 → 정규화된 TF-IDF 벡터
    fn weigh(&self, tokens: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in tokens {
            if let Some(col) = self.vocabulary.column(token) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col]))
            .collect();

        SparseVector::from_entries(entries).normalized()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// 문서별 행 벡터 (문서 순서)
    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// 용어의 idf 가중치
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.column(term).map(|col| self.idf[col])
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.vocabulary.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
