//! Question component
//!
//! Takes the `questions` prop (a list of catalog definitions) and renders one
//! question node per definition, in order. Rendering never fails: a definition
//! whose datatype or spec can't be mapped to a widget becomes a placeholder.

use crate::question::{question_keys, ChoiceOption, QuestionDefinition, WidgetKind};
use crate::ui::node::{Node, NodeKind};

/// Display toggles for the metadata around each question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionOptions {
    pub show_instructions: bool,
}

impl Default for QuestionOptions {
    fn default() -> Self {
        Self {
            show_instructions: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Question {
    pub questions: Vec<QuestionDefinition>,
    pub options: QuestionOptions,
}

impl Question {
    pub fn new(questions: Vec<QuestionDefinition>) -> Self {
        Self {
            questions,
            options: QuestionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QuestionOptions) -> Self {
        self.options = options;
        self
    }

    /// Render the whole list into a container node
    pub fn render(&self) -> Node {
        let children = self
            .questions
            .iter()
            .zip(question_keys(&self.questions))
            .map(|(question, key)| render_question(question, key, self.options))
            .collect();
        Node::container(children)
    }
}

/// Render a single definition under the given key
pub fn render_question(question: &QuestionDefinition, key: String, options: QuestionOptions) -> Node {
    let mut node = Node::new(NodeKind::Question).with_key(key);

    node.push(Node::new(NodeKind::Title).with_text(question.title.clone()));

    if options.show_instructions {
        for text in [&question.survey_question_instruction, &question.instructions] {
            if !text.trim().is_empty() {
                node.push(Node::new(NodeKind::Instruction).with_text(text.clone()));
            }
        }
    }

    let input = match question.widget() {
        Ok(kind) => render_widget(&kind),
        Err(e) => {
            tracing::debug!("Question {:?} falls back to placeholder: {}", node.key, e);
            Node::new(NodeKind::Placeholder)
        }
    };
    node.push(input);

    node
}

fn render_widget(kind: &WidgetKind) -> Node {
    match kind {
        WidgetKind::Range { options } => {
            Node::new(NodeKind::Scale).with_children(option_nodes(options))
        }
        WidgetKind::SingleChoice { options } => {
            Node::new(NodeKind::Choice { multiple: false }).with_children(option_nodes(options))
        }
        WidgetKind::MultipleChoice { options } => {
            Node::new(NodeKind::Choice { multiple: true }).with_children(option_nodes(options))
        }
        WidgetKind::Text { multiline } => Node::new(NodeKind::TextInput {
            multiline: *multiline,
        }),
        WidgetKind::Numeric { min, max, slider, .. } => Node::new(NodeKind::NumericInput {
            min: *min,
            max: *max,
            slider: *slider,
        }),
        WidgetKind::Date => Node::new(NodeKind::DateInput),
    }
}

fn option_nodes(options: &[ChoiceOption]) -> Vec<Node> {
    options
        .iter()
        .map(|o| {
            Node::new(NodeKind::Option)
                .with_key(o.code.clone())
                .with_text(o.text.clone())
        })
        .collect()
}
