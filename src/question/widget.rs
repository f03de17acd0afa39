//! Widget selection for question definitions
//!
//! `datatype` and `spec.ui` are free strings in the catalog. They are mapped
//! once, here, onto a closed set of widget kinds. Anything that does not map
//! comes back as a `QuestionError` and the renderer draws a placeholder.

use std::collections::HashSet;

use super::{ChoiceOption, QuestionDefinition, QuestionError};

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    /// Ordered ordinal scale (e.g. education level)
    Range { options: Vec<ChoiceOption> },
    SingleChoice { options: Vec<ChoiceOption> },
    MultipleChoice { options: Vec<ChoiceOption> },
    Text { multiline: bool },
    Numeric {
        min: Option<f64>,
        max: Option<f64>,
        slider: bool,
        integer: bool,  // whole numbers only
    },
    Date,
}

impl WidgetKind {
    /// Pick the widget for a definition.
    pub fn select(question: &QuestionDefinition) -> Result<Self, QuestionError> {
        let datatype = question.datatype.trim().to_ascii_lowercase();
        let ui = question.spec.ui.trim().to_ascii_lowercase();
        let integer = datatype == "integer";

        match (datatype.as_str(), ui.as_str()) {
            ("range", "" | "range") => Ok(WidgetKind::Range {
                options: checked_options(question)?,
            }),
            ("range", "radio" | "select" | "dropdown") => Ok(WidgetKind::SingleChoice {
                options: checked_options(question)?,
            }),
            ("range", "multi_select" | "multiselect" | "checkbox") => {
                Ok(WidgetKind::MultipleChoice {
                    options: checked_options(question)?,
                })
            }
            ("string" | "text", "" | "text") => Ok(WidgetKind::Text { multiline: false }),
            ("string" | "text", "textarea") => Ok(WidgetKind::Text { multiline: true }),
            ("integer" | "float" | "decimal" | "number", "" | "number" | "integer") => {
                Ok(WidgetKind::Numeric {
                    min: question.spec.min,
                    max: question.spec.max,
                    slider: false,
                    integer,
                })
            }
            ("integer" | "float" | "decimal" | "number", "slider") => {
                let (min, max) = slider_bounds(question)?;
                Ok(WidgetKind::Numeric {
                    min: Some(min),
                    max: Some(max),
                    slider: true,
                    integer,
                })
            }
            ("date", "" | "date") => Ok(WidgetKind::Date),
            _ => Err(QuestionError::UnknownDatatype {
                datatype: question.datatype.clone(),
                ui: question.spec.ui.clone(),
            }),
        }
    }

    /// Options shown by choice-style widgets, empty for the rest
    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            WidgetKind::Range { options }
            | WidgetKind::SingleChoice { options }
            | WidgetKind::MultipleChoice { options } => options.as_slice(),
            WidgetKind::Text { .. } | WidgetKind::Numeric { .. } | WidgetKind::Date => &[],
        }
    }

    /// Whether the widget takes typed input rather than a pick from options
    pub fn is_typed(&self) -> bool {
        matches!(
            self,
            WidgetKind::Text { .. } | WidgetKind::Numeric { .. } | WidgetKind::Date
        )
    }
}

fn checked_options(question: &QuestionDefinition) -> Result<Vec<ChoiceOption>, QuestionError> {
    let malformed = |reason: &str| QuestionError::MalformedSpec {
        ui: question.spec.ui.clone(),
        reason: reason.to_string(),
    };

    let options = match &question.spec.options {
        Some(options) if !options.is_empty() => options,
        Some(_) => return Err(malformed("options list is empty")),
        None => return Err(malformed("options are missing")),
    };

    let mut seen = HashSet::new();
    for option in options {
        if !seen.insert(option.code.as_str()) {
            return Err(malformed(&format!("duplicate option code '{}'", option.code)));
        }
    }

    Ok(options.clone())
}

fn slider_bounds(question: &QuestionDefinition) -> Result<(f64, f64), QuestionError> {
    match (question.spec.min, question.spec.max) {
        (Some(min), Some(max)) if min < max => Ok((min, max)),
        (Some(_), Some(_)) => Err(QuestionError::MalformedSpec {
            ui: question.spec.ui.clone(),
            reason: "slider min must be below max".to_string(),
        }),
        _ => Err(QuestionError::MalformedSpec {
            ui: question.spec.ui.clone(),
            reason: "slider needs both min and max".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::QuestionSpec;

    fn question(datatype: &str, ui: &str, options: Option<Vec<ChoiceOption>>) -> QuestionDefinition {
        QuestionDefinition {
            cde: "Q".to_string(),
            datatype: datatype.to_string(),
            spec: QuestionSpec {
                ui: ui.to_string(),
                options,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn yes_no() -> Option<Vec<ChoiceOption>> {
        Some(vec![ChoiceOption::new("1", "Yes"), ChoiceOption::new("0", "No")])
    }

    #[test]
    fn test_range_keeps_option_order() {
        let kind = WidgetKind::select(&question("range", "range", yes_no())).unwrap();
        let texts: Vec<&str> = kind.options().iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["Yes", "No"]);
        assert!(matches!(kind, WidgetKind::Range { .. }));
    }

    #[test]
    fn test_choice_variants_by_ui() {
        assert!(matches!(
            WidgetKind::select(&question("range", "radio", yes_no())),
            Ok(WidgetKind::SingleChoice { .. })
        ));
        assert!(matches!(
            WidgetKind::select(&question("Range", "multi_select", yes_no())),
            Ok(WidgetKind::MultipleChoice { .. })
        ));
    }

    #[test]
    fn test_typed_variants() {
        assert_eq!(
            WidgetKind::select(&question("string", "textarea", None)),
            Ok(WidgetKind::Text { multiline: true })
        );
        assert_eq!(WidgetKind::select(&question("date", "", None)), Ok(WidgetKind::Date));
        assert!(WidgetKind::select(&question("integer", "", None)).unwrap().is_typed());
        assert!(matches!(
            WidgetKind::select(&question("float", "", None)),
            Ok(WidgetKind::Numeric { integer: false, .. })
        ));
    }

    #[test]
    fn test_unknown_datatype() {
        let err = WidgetKind::select(&question("", "", None)).unwrap_err();
        assert!(matches!(err, QuestionError::UnknownDatatype { .. }));

        let err = WidgetKind::select(&question("range", "carousel", yes_no())).unwrap_err();
        assert!(matches!(err, QuestionError::UnknownDatatype { .. }));
    }

    #[test]
    fn test_malformed_options() {
        let missing = WidgetKind::select(&question("range", "range", None));
        assert!(matches!(missing, Err(QuestionError::MalformedSpec { .. })));

        let empty = WidgetKind::select(&question("range", "range", Some(vec![])));
        assert!(matches!(empty, Err(QuestionError::MalformedSpec { .. })));

        let duplicated = Some(vec![ChoiceOption::new("1", "A"), ChoiceOption::new("1", "B")]);
        let err = WidgetKind::select(&question("range", "range", duplicated)).unwrap_err();
        assert!(err.to_string().contains("duplicate option code '1'"));
    }

    #[test]
    fn test_slider_bounds() {
        let mut q = question("integer", "slider", None);
        assert!(WidgetKind::select(&q).is_err());

        q.spec.min = Some(100.0);
        q.spec.max = Some(0.0);
        assert!(WidgetKind::select(&q).is_err());

        q.spec.min = Some(0.0);
        q.spec.max = Some(100.0);
        assert_eq!(
            WidgetKind::select(&q),
            Ok(WidgetKind::Numeric {
                min: Some(0.0),
                max: Some(100.0),
                slider: true,
                integer: true
            })
        );
    }
}
