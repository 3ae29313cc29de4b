//! Keyword-threshold document classifier.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::DocumentType;

use super::keywords::{matched_keywords, KeywordProfile};

/// Shortest text that is not treated as a probable scanned image.
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 50;

/// Why a text was left unclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownReason {
    /// Empty or too short; likely a scanned image requiring OCR.
    InsufficientText,
    /// Text present but no keyword threshold reached.
    Unrecognized,
}

/// Result of classifying one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub document_type: DocumentType,
    pub payroll_matches: Vec<String>,
    pub time_card_matches: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_reason: Option<UnknownReason>,
}

impl Classification {
    pub fn is_known(&self) -> bool {
        self.document_type != DocumentType::Unknown
    }

    /// One-line description for logs and traces.
    pub fn summary(&self) -> String {
        match self.unknown_reason {
            Some(UnknownReason::InsufficientText) => {
                "unknown: insufficient text, likely a scanned image requiring OCR".to_string()
            }
            Some(UnknownReason::Unrecognized) => format!(
                "unknown: {} payroll / {} time card keywords",
                self.payroll_matches.len(),
                self.time_card_matches.len()
            ),
            None => format!(
                "{} ({} payroll / {} time card keywords)",
                self.document_type,
                self.payroll_matches.len(),
                self.time_card_matches.len()
            ),
        }
    }
}

/// Classifies normalized text as time card, pay slip or unknown.
#[derive(Debug, Clone)]
pub struct DocumentClassifier {
    profile: KeywordProfile,
    min_text_length: usize,
}

impl DocumentClassifier {
    pub fn new(profile: KeywordProfile) -> Self {
        Self {
            profile,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
        }
    }

    /// Classifier for machine-extracted text.
    pub fn standard() -> Self {
        Self::new(KeywordProfile::standard())
    }

    /// Classifier for OCR text.
    pub fn ocr() -> Self {
        Self::new(KeywordProfile::ocr())
    }

    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    pub fn profile(&self) -> &KeywordProfile {
        &self.profile
    }

    /// Classify a text. Payroll is checked first.
    pub fn classify(&self, text: &str) -> Classification {
        let upper = text.to_uppercase();
        let payroll_matches = matched_keywords(&upper, &self.profile.payroll);
        let time_card_matches = matched_keywords(&upper, &self.profile.time_card);

        let (document_type, unknown_reason) = if payroll_matches.len() >= self.profile.payroll_threshold {
            (DocumentType::Payroll, None)
        } else if time_card_matches.len() >= self.profile.time_card_threshold {
            (DocumentType::TimeCard, None)
        } else if text.trim().chars().count() < self.min_text_length {
            (DocumentType::Unknown, Some(UnknownReason::InsufficientText))
        } else {
            (DocumentType::Unknown, Some(UnknownReason::Unrecognized))
        };

        debug!(
            payroll = payroll_matches.len(),
            time_card = time_card_matches.len(),
            "Classified text as {}",
            document_type
        );

        Classification {
            document_type,
            payroll_matches,
            time_card_matches,
            unknown_reason,
        }
    }
}

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_payroll_threshold() {
        let classifier = DocumentClassifier::standard();
        let result = classifier.classify("Proventos Descontos Holerite");

        assert_eq!(result.document_type, DocumentType::Payroll);
        assert_eq!(
            result.payroll_matches,
            vec!["PROVENTOS".to_string(), "DESCONTOS".to_string(), "HOLERITE".to_string()]
        );

        // Two hits are not enough
        let result = classifier.classify("Proventos Holerite ................................................");
        assert_eq!(result.document_type, DocumentType::Unknown);
        assert_eq!(result.unknown_reason, Some(UnknownReason::Unrecognized));
    }

    #[test]
    fn test_payroll_checked_first() {
        let classifier = DocumentClassifier::standard();
        let result = classifier.classify("SEG TER ENTRADA SAÍDA PROVENTOS DESCONTOS LÍQUIDO");
        assert_eq!(result.document_type, DocumentType::Payroll);
    }

    #[test]
    fn test_time_card_threshold() {
        let classifier = DocumentClassifier::standard();
        let result = classifier.classify("03 SEG 08:00 ENTRADA");

        assert_eq!(result.document_type, DocumentType::TimeCard);
        assert!(result.payroll_matches.len() < 3);
    }

    #[test]
    fn test_short_text_is_insufficient() {
        let classifier = DocumentClassifier::standard();

        for text in ["", "   ", "abc xyz 123"] {
            let result = classifier.classify(text);
            assert_eq!(result.document_type, DocumentType::Unknown);
            assert_eq!(result.unknown_reason, Some(UnknownReason::InsufficientText));
            assert!(result.summary().contains("OCR"));
        }
    }

    #[test]
    fn test_ocr_profile_single_payroll_hit() {
        let text = "documento digitalizado com a palavra holerite apenas";
        assert_eq!(DocumentClassifier::ocr().classify(text).document_type, DocumentType::Payroll);
        assert_eq!(DocumentClassifier::standard().classify(text).document_type, DocumentType::Unknown);
    }

    #[test]
    fn test_ocr_profile_time_card() {
        let text = "Mês/Ano: 01/2024 02 qua 08:00 - 12:00";
        let result = DocumentClassifier::ocr().classify(text);
        assert_eq!(result.document_type, DocumentType::TimeCard);
        assert_eq!(result.time_card_matches, vec!["MÊS/ANO".to_string(), "QUA".to_string()]);
    }
}
