//! 감정 레이블 매핑 및 우선순위
//!
//! 모델마다 레이블 체계가 다릅니다:
//! - 이진 모델 (SST-2 등): `NEGATIVE` / `POSITIVE` 또는 `LABEL_0` / `LABEL_1`
//! - 3분류 모델 (twitter-roberta-base-sentiment 등): `LABEL_0` / `LABEL_1` / `LABEL_2`
//!
//! 위치 기반 레이블(`LABEL_n`)은 `LabelScheme`으로 해석하고,
//! 이름 레이블은 체계와 무관하게 그대로 매핑합니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 감정 매핑 에러
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SentimentError {
    #[error("unknown sentiment label '{label}' for {scheme:?} scheme")]
    UnknownLabel { label: String, scheme: LabelScheme },
}

/// 위치 기반 레이블 해석 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelScheme {
    /// LABEL_0 = 부정, LABEL_1 = 긍정
    Binary,
    /// LABEL_0 = 부정, LABEL_1 = 중립, LABEL_2 = 긍정
    #[default]
    ThreeClass,
}

/// 감정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// 원본 레이블을 감정으로 변환
    pub fn from_label(label: &str, scheme: LabelScheme) -> Result<Self, SentimentError> {
        let normalized = label.trim().to_ascii_uppercase();

        let sentiment = match (normalized.as_str(), scheme) {
            ("NEGATIVE" | "NEG", _) => Some(Sentiment::Negative),
            ("NEUTRAL" | "NEU", _) => Some(Sentiment::Neutral),
            ("POSITIVE" | "POS", _) => Some(Sentiment::Positive),

            ("LABEL_0", _) => Some(Sentiment::Negative),
            ("LABEL_1", LabelScheme::Binary) => Some(Sentiment::Positive),
            ("LABEL_1", LabelScheme::ThreeClass) => Some(Sentiment::Neutral),
            ("LABEL_2", LabelScheme::ThreeClass) => Some(Sentiment::Positive),

            _ => None,
        };

        sentiment.ok_or_else(|| SentimentError::UnknownLabel {
            label: label.to_string(),
            scheme,
        })
    }

    /// 화면 표시용 문구
    pub fn display_text(&self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative / Angry",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }
}

/// 처리 우선순위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
}

impl From<Sentiment> for Priority {
    fn from(sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Negative => Priority::High,
            Sentiment::Neutral | Sentiment::Positive => Priority::Normal,
        }
    }
}

impl Priority {
    pub fn display_text(&self) -> &'static str {
        match self {
            Priority::High => "HIGH PRIORITY",
            Priority::Normal => "NORMAL PRIORITY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_labels_any_scheme() {
        for scheme in [LabelScheme::Binary, LabelScheme::ThreeClass] {
            assert_eq!(Sentiment::from_label("NEGATIVE", scheme), Ok(Sentiment::Negative));
            assert_eq!(Sentiment::from_label("neutral", scheme), Ok(Sentiment::Neutral));
            assert_eq!(Sentiment::from_label("Positive", scheme), Ok(Sentiment::Positive));
        }
    }

    #[test]
    fn test_three_class_positional_labels() {
        let s = LabelScheme::ThreeClass;
        assert_eq!(Sentiment::from_label("LABEL_0", s), Ok(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("LABEL_1", s), Ok(Sentiment::Neutral));
        assert_eq!(Sentiment::from_label("LABEL_2", s), Ok(Sentiment::Positive));
    }

    #[test]
    fn test_binary_positional_labels() {
        let s = LabelScheme::Binary;
        assert_eq!(Sentiment::from_label("LABEL_0", s), Ok(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("LABEL_1", s), Ok(Sentiment::Positive));
        assert!(Sentiment::from_label("LABEL_2", s).is_err());
    }

    #[test]
    fn test_unknown_label_rejected() {
        let err = Sentiment::from_label("ANGRY", LabelScheme::ThreeClass).unwrap_err();
        assert_eq!(
            err,
            SentimentError::UnknownLabel {
                label: "ANGRY".to_string(),
                scheme: LabelScheme::ThreeClass,
            }
        );
    }

    #[test]
    fn test_priority_high_only_for_negative() {
        assert_eq!(Priority::from(Sentiment::Negative), Priority::High);
        assert_eq!(Priority::from(Sentiment::Neutral), Priority::Normal);
        assert_eq!(Priority::from(Sentiment::Positive), Priority::Normal);
    }

    #[test]
    fn test_label_scheme_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            scheme: LabelScheme,
        }
        let w: Wrapper = toml::from_str("scheme = \"three_class\"").unwrap();
        assert_eq!(w.scheme, LabelScheme::ThreeClass);
        let w: Wrapper = toml::from_str("scheme = \"binary\"").unwrap();
        assert_eq!(w.scheme, LabelScheme::Binary);
    }
}
