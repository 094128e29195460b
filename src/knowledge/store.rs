//! Knowledge Store - 정적 정책 문서 로더
//!
//! 빈 줄("\n\n")로 구분된 정책 텍스트 파일을 읽어
//! 순서가 보존된 정책 블록 목록으로 만듭니다.
//! 로드 이후에는 변경되지 않습니다.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// 정책 블록 구분자
pub const BLOCK_DELIMITER: &str = "\n\n";

// ============================================================================
// Errors
// ============================================================================

/// 지식베이스 로드 에러
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// 파일이 없거나 읽을 수 없음
    #[error("failed to read knowledge base {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 정책 블록이 하나도 없음
    #[error("knowledge base {0:?} contains no policy blocks")]
    EmptyKnowledgeBase(PathBuf),
}

// ============================================================================
// Types
// ============================================================================

/// 정책 문서 (로드 후 불변)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    /// 컬렉션 내 위치 (0-based)
    pub index: usize,
    /// 정책 원문
    pub text: String,
}

/// 저장소 통계
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub document_count: usize,
    pub total_content_bytes: usize,
    pub source_path: Option<PathBuf>,
}

// ============================================================================
// KnowledgeStore
// ============================================================================

/// 순서가 보존된 정책 문서 컬렉션
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    documents: Vec<PolicyDocument>,
    source_path: Option<PathBuf>,
}

impl KnowledgeStore {
    /// 파일에서 정책 블록 로드
    ///
    /// # Arguments
    /// * `path` - 지식베이스 텍스트 파일 경로
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let text = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut store = Self::from_text(&text);
        if store.is_empty() {
            return Err(KnowledgeError::EmptyKnowledgeBase(path.to_path_buf()));
        }
        store.source_path = Some(path.to_path_buf());

        tracing::info!(
            "Loaded {} policy blocks from {:?}",
            store.len(),
            path
        );
        Ok(store)
    }

    /// 메모리 내 텍스트에서 생성
    ///
    /// CRLF는 LF로 정규화하고, 각 블록의 앞뒤 공백을 제거하며
    /// 비어 있는 블록은 버립니다.
    pub fn from_text(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n");

        let documents = normalized
            .split(BLOCK_DELIMITER)
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .enumerate()
            .map(|(index, block)| PolicyDocument {
                index,
                text: block.to_string(),
            })
            .collect();

        Self {
            documents,
            source_path: None,
        }
    }

    /// 전체 문서 (원래 순서)
    pub fn documents(&self) -> &[PolicyDocument] {
        &self.documents
    }

    /// 인덱스로 문서 조회
    pub fn get(&self, index: usize) -> Option<&PolicyDocument> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// 로드한 파일 경로 (from_text로 만든 경우 None)
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// 저장소 통계
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            document_count: self.documents.len(),
            total_content_bytes: self.documents.iter().map(|d| d.text.len()).sum(),
            source_path: self.source_path.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
