//! Response Composer - 검색된 정책으로 응답 문구 구성

use super::store::PolicyDocument;

/// 응답 끝에 붙는 고정 안내 문구
pub const CLOSING_NOTICE: &str = "Our support team will assist you further if needed.";

/// 정책 원문 + 빈 줄 + 안내 문구
pub fn compose(policy: &PolicyDocument) -> String {
    format!("{}\n\n{}\n", policy.text, CLOSING_NOTICE)
}
