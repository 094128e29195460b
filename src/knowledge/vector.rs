//! Sparse Vector - 희소 벡터 및 유사도 유틸리티

use serde::Serialize;

// ============================================================================
// Types
// ============================================================================

/// 희소 벡터
///
/// 0이 아닌 차원만 `(열 인덱스, 가중치)` 쌍으로 저장합니다.
/// 열 인덱스는 오름차순으로 정렬되어 있어야 합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// `(열, 가중치)` 쌍으로 생성 (열 기준 정렬, 0 가중치 제거)
    pub fn from_entries(mut entries: Vec<(usize, f32)>) -> Self {
        entries.retain(|&(_, w)| w != 0.0);
        entries.sort_by_key(|&(col, _)| col);
        Self { entries }
    }

    /// 빈(영) 벡터
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    /// 0이 아닌 항목 수
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// L2 노름
    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// L2 정규화 (영 벡터는 그대로)
    pub fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }

    /// 내적 (정렬된 인덱스 병합)
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (ca, wa) = self.entries[i];
            let (cb, wb) = other.entries[j];
            match ca.cmp(&cb) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }
}

// ============================================================================
// Utility Functions
// ============================================================================

/// 코사인 유사도 계산
///
/// 결과는 -1.0 ~ 1.0 범위이며, 어느 한쪽이 영 벡터이면 0.0입니다.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    let norm_a = a.norm();
    let norm_b = b.norm();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    a.dot(b) / (norm_a * norm_b)
}

// ============================================================================
// Tests
// ============================================================================
