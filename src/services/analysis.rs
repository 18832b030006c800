//! Simulated document analysis.
//!
//! Produces a canned summary from the title alone: a word count and the
//! kinds of legal instruments it cites.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::Document;

/// Legal instrument references such as "Ley 3/2024" or "Resolución 12/2023".
static LEGAL_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Ley|Decreto|Resoluci[oó]n)\s+\d+/\d{4}").unwrap());

/// Instrument kinds referenced in `text`, in order of appearance.
pub fn detect_entities(text: &str) -> Vec<&str> {
    LEGAL_ENTITY
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Mock analysis message for a document.
pub fn analyze(document: &Document) -> String {
    let title = &document.title;
    let words = title.split_whitespace().count();
    let entities = detect_entities(title);
    let detected = if entities.is_empty() {
        "None".to_string()
    } else {
        entities.join(", ")
    };

    format!(
        "Summary (simulated AI): This document titled '{}' contains {} words. Detected entities: {}.",
        title, words, detected
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn doc(title: &str) -> Document {
        Document {
            id: 1,
            title: title.to_string(),
            number: "BOE-A-2024-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            status: "Publicado".to_string(),
            url: "N/A".to_string(),
        }
    }

    #[test]
    fn test_detect_entities() {
        let found = detect_entities("Real Decreto 5/2024 y Ley 2/2023, Resolución 7/2024, Resolucion 8/2024");
        assert_eq!(found, vec!["Decreto", "Ley", "Resolución", "Resolucion"]);
        assert!(detect_entities("Ley de presupuestos").is_empty());
    }

    #[test]
    fn test_analyze_message() {
        let message = analyze(&doc("Ley 1/2024 de prueba"));
        assert_eq!(
            message,
            "Summary (simulated AI): This document titled 'Ley 1/2024 de prueba' contains 4 words. Detected entities: Ley."
        );

        let message = analyze(&doc("Anuncio"));
        assert!(message.ends_with("contains 1 words. Detected entities: None."));
    }
}
