pub mod widget;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

pub use widget::WidgetKind;

/// One survey question as it comes out of the registry's question catalog.
///
/// Every field is optional on input. A definition with nothing in it still
/// deserializes and renders as a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionDefinition {
    pub tag: String,                          // "cde" for common data elements
    pub cde: String,
    pub datatype: String,
    pub instructions: String,
    pub title: String,
    pub survey_question_instruction: String,
    pub copyright_text: String,
    pub source: String,
    pub spec: QuestionSpec,
}

/// Datatype-dependent payload of a question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionSpec {
    pub ui: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ChoiceOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceOption {
    pub code: String,
    pub text: String,
}

impl ChoiceOption {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
        }
    }
}

impl QuestionDefinition {
    /// Widget this question renders as
    pub fn widget(&self) -> Result<WidgetKind, QuestionError> {
        WidgetKind::select(self)
    }

    /// Key used for answers and rendered nodes.
    /// Falls back to the position when the catalog left `cde` empty.
    pub fn key(&self, index: usize) -> String {
        if self.cde.is_empty() {
            format!("question-{}", index)
        } else {
            self.cde.clone()
        }
    }
}

/// Keys for a whole list of questions, one per definition and all distinct.
///
/// A `cde` that repeats gets its position appended from the second occurrence on.
pub fn question_keys(questions: &[QuestionDefinition]) -> Vec<String> {
    let mut seen = HashSet::new();
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let mut key = question.key(index);
            if !seen.insert(key.clone()) {
                tracing::warn!("Duplicate question key '{}' at position {}", key, index);
                key = format!("{}-{}", key, index);
                seen.insert(key.clone());
            }
            key
        })
        .collect()
}

/// Why a definition could not be turned into a known widget.
///
/// These never leave the renderer; they end up as a placeholder node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuestionError {
    #[error("unknown datatype '{datatype}' (ui '{ui}')")]
    UnknownDatatype { datatype: String, ui: String },

    #[error("malformed spec for ui '{ui}': {reason}")]
    MalformedSpec { ui: String, reason: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<QuestionDefinition>),
    Table { questions: Vec<QuestionDefinition> },
}

impl From<CatalogFile> for Vec<QuestionDefinition> {
    fn from(file: CatalogFile) -> Self {
        match file {
            CatalogFile::List(questions) => questions,
            CatalogFile::Table { questions } => questions,
        }
    }
}

/// Parse catalog content. TOML when `is_toml` is set, JSON otherwise.
pub fn parse_catalog(content: &str, is_toml: bool) -> Result<Vec<QuestionDefinition>> {
    let file: CatalogFile = if is_toml {
        toml::from_str(content).context("Invalid TOML question catalog")?
    } else {
        serde_json::from_str(content).context("Invalid JSON question catalog")?
    };
    Ok(file.into())
}

/// Load a question catalog from disk.
/// The format is picked from the file extension (`.toml`, anything else is JSON).
pub async fn load_catalog(path: &Path) -> Result<Vec<QuestionDefinition>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;

    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let questions = parse_catalog(&content, is_toml)?;
    tracing::info!("Loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_education_fixture_deserializes() {
        let value = json!({
            "tag": "cde",
            "cde": "EDUCATION",
            "datatype": "range",
            "instructions": "",
            "title": "What was the highest level of schooling you completed",
            "survey_question_instruction": "To date",
            "copyright_text": "",
            "source": "",
            "spec": {
                "ui": "range",
                "options": [
                    {"code": "0", "text": "None"},
                    {"code": "1", "text": "Primary"},
                    {"code": "2", "text": "Secondary"},
                    {"code": "3", "text": "Tertiary"}
                ]
            }
        });

        let question: QuestionDefinition = serde_json::from_value(value).unwrap();
        assert_eq!(question.cde, "EDUCATION");
        assert_eq!(question.spec.ui, "range");
        let options = question.spec.options.unwrap();
        assert_eq!(options.len(), 4);
        assert_eq!(options[3], ChoiceOption::new("3", "Tertiary"));
    }

    #[test]
    fn test_empty_object_deserializes() {
        let question: QuestionDefinition = serde_json::from_value(json!({})).unwrap();
        assert_eq!(question, QuestionDefinition::default());
        assert_eq!(question.key(2), "question-2");
    }

    #[test]
    fn test_parse_json_catalog_forms() {
        let list = r#"[{"cde": "A", "datatype": "date"}]"#;
        let table = r#"{"questions": [{"cde": "A"}, {"cde": "B"}]}"#;

        assert_eq!(parse_catalog(list, false).unwrap().len(), 1);
        assert_eq!(parse_catalog(table, false).unwrap()[1].cde, "B");
    }

    #[test]
    fn test_parse_toml_catalog() {
        let content = r#"
            [[questions]]
            cde = "EQ_VAS"
            datatype = "integer"
            title = "Your health today"

            [questions.spec]
            ui = "slider"
            min = 0.0
            max = 100.0
        "#;

        let questions = parse_catalog(content, true).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].spec.max, Some(100.0));
    }

    #[test]
    fn test_parse_catalog_rejects_garbage() {
        assert!(parse_catalog("not json", false).is_err());
    }

    #[test]
    fn test_single_definition_is_not_a_catalog() {
        let single = r#"{"cde": "EDUCATION", "datatype": "range"}"#;
        assert!(parse_catalog(single, false).is_err());
        assert!(parse_catalog(r#"cde = "EDUCATION""#, true).is_err());
    }

    #[test]
    fn test_question_keys_are_distinct() {
        let questions: Vec<QuestionDefinition> = serde_json::from_value(json!([
            {"cde": "PAIN"},
            {"cde": "PAIN"},
            {},
            {"cde": "MOOD"}
        ]))
        .unwrap();

        assert_eq!(
            question_keys(&questions),
            vec!["PAIN", "PAIN-1", "question-2", "MOOD"]
        );
    }
}
