//! 토크나이저 - TF-IDF 용어 추출
//!
//! 두 글자 이상의 단어 문자 연속(`\b\w\w+\b`)을 소문자로 추출합니다.
//! 불용어 제거나 어간 추출은 하지 않습니다.
//!
//! ref: https://scikit-learn.org/stable/modules/feature_extraction.html#text-feature-extraction

use std::sync::LazyLock;

use regex::Regex;

/// 용어 패턴 (2글자 이상 단어)
pub const TOKEN_PATTERN: &str = r"\b\w\w+\b";

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN_PATTERN).expect("TOKEN_PATTERN is a valid regex"));

/// 텍스트를 소문자 용어 목록으로 분할
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}
