//! Copyright notices for the instruments a survey draws its questions from

use std::collections::BTreeMap;

use crate::question::QuestionDefinition;

pub const NO_COPYRIGHT: &str = "No Copyright information available";

/// Map each question `source` to its copyright text.
///
/// Questions missing either field are skipped. A later question with the same
/// source replaces the earlier text.
pub fn collect_notices(questions: &[QuestionDefinition]) -> BTreeMap<String, String> {
    let mut notices = BTreeMap::new();
    for question in questions {
        let source = question.source.trim();
        let text = question.copyright_text.trim();
        if source.is_empty() || text.is_empty() {
            continue;
        }
        notices.insert(source.to_string(), text.to_string());
    }
    notices
}

/// Registry-level notice, with the standard text when none is configured
pub fn registry_notice(copyright_text: Option<&str>) -> &str {
    match copyright_text {
        Some(text) if !text.trim().is_empty() => text,
        _ => NO_COPYRIGHT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(source: &str, copyright_text: &str) -> QuestionDefinition {
        QuestionDefinition {
            source: source.to_string(),
            copyright_text: copyright_text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_collect_skips_incomplete_entries() {
        let questions = vec![
            question("EQ-5D", "© EuroQol Research Foundation"),
            question("", "orphan text"),
            question("PROMIS", ""),
        ];

        let notices = collect_notices(&questions);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices["EQ-5D"], "© EuroQol Research Foundation");
    }

    #[test]
    fn test_collect_later_source_wins() {
        let questions = vec![question("EQ-5D", "old"), question("EQ-5D", "new")];
        assert_eq!(collect_notices(&questions)["EQ-5D"], "new");
    }

    #[test]
    fn test_registry_notice_fallback() {
        assert_eq!(registry_notice(None), NO_COPYRIGHT);
        assert_eq!(registry_notice(Some("  ")), NO_COPYRIGHT);
        assert_eq!(registry_notice(Some("© Registry")), "© Registry");
    }
}
