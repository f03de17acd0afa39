use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::config::AppConfig;
use crate::copyright;
use crate::question::{question_keys, QuestionDefinition, WidgetKind};
use crate::theme::Theme;
use crate::ui::node::Node;
use crate::ui::question::{Question, QuestionOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
    Copyright,
}

/// A patient's answer to one question
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Code(String),
    Codes(Vec<String>),
    Integer(i64),
    Number(f64),
    Text(String),
}

pub struct App {
    pub popup: Popup,
    pub theme: Theme,

    // Survey content
    pub questions: Vec<QuestionDefinition>,
    pub keys: Vec<String>,                 // Distinct per question, shared with the rendered tree
    pub widgets: Vec<Option<WidgetKind>>,  // None where the question rendered as a placeholder
    pub tree: Node,

    // Position
    pub current: usize,
    pub cursor: usize,  // Option cursor within the current question

    // Answers keyed by question key
    pub answers: HashMap<String, Answer>,
    pub input_buffer: String,

    pub status_message: Option<String>,
    pub copyright_notices: BTreeMap<String, String>,
    pub registry_copyright: String,
    pub show_copyright: bool,

    pub submitted: bool,
}

impl App {
    pub fn new(questions: Vec<QuestionDefinition>, config: &AppConfig) -> Self {
        let component = Question::new(questions).with_options(QuestionOptions {
            show_instructions: config.show_instructions,
        });
        let tree = component.render();
        let questions = component.questions;

        let keys = question_keys(&questions);
        let widgets = questions.iter().map(|q| q.widget().ok()).collect();
        let copyright_notices = copyright::collect_notices(&questions);
        let registry_copyright =
            copyright::registry_notice(config.registry_copyright.as_deref()).to_string();

        tracing::info!("Survey page opened with {} questions", questions.len());

        Self {
            popup: Popup::None,
            theme: Theme::from_config(&config.theme),
            questions,
            keys,
            widgets,
            tree,
            current: 0,
            cursor: 0,
            answers: HashMap::new(),
            input_buffer: String::new(),
            status_message: None,
            copyright_notices,
            registry_copyright,
            show_copyright: config.show_copyright,
            submitted: false,
        }
    }

    pub fn current_question(&self) -> Option<&QuestionDefinition> {
        self.questions.get(self.current)
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.tree.children.get(self.current)
    }

    pub fn current_widget(&self) -> Option<&WidgetKind> {
        self.widgets.get(self.current).and_then(|w| w.as_ref())
    }

    fn current_key(&self) -> Option<String> {
        self.keys.get(self.current).cloned()
    }

    pub fn current_answer(&self) -> Option<&Answer> {
        self.current_key().and_then(|key| self.answers.get(&key))
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Whether keystrokes currently go into the input buffer
    pub fn is_typing(&self) -> bool {
        self.popup == Popup::None && self.current_widget().map(|w| w.is_typed()).unwrap_or(false)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::Help | Popup::Copyright => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::Char('c') | KeyCode::F(1)) {
                    self.popup = Popup::None;
                }
                return Ok(());
            }
            Popup::None => {}
        }

        // Work the same whether or not a typed question has focus
        match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.submit();
                return Ok(());
            }
            KeyCode::F(1) => {
                self.popup = Popup::Help;
                return Ok(());
            }
            _ => {}
        }

        if self.is_typing() {
            match key.code {
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.input_buffer.push(c);
                    return Ok(());
                }
                KeyCode::Backspace => {
                    self.input_buffer.pop();
                    return Ok(());
                }
                KeyCode::Enter => {
                    self.commit_input();
                    return Ok(());
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('n') => self.next_question(),
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('p') => self.previous_question(),
            KeyCode::Char(' ') | KeyCode::Enter => self.choose(),
            KeyCode::Char('h') | KeyCode::Char('?') => self.popup = Popup::Help,
            KeyCode::Char('c') => self.popup = Popup::Copyright,
            KeyCode::Char('s') => self.submit(),
            _ => {}
        }

        Ok(())
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.current_widget().map(|w| w.options().len()).unwrap_or(0);
        if count == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(count - 1);
    }

    pub fn next_question(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.go_to(self.current + 1);
        }
    }

    pub fn previous_question(&mut self) {
        if self.current > 0 {
            self.go_to(self.current - 1);
        }
    }

    fn go_to(&mut self, index: usize) {
        self.current = index;
        self.status_message = None;

        // Put the cursor on the chosen option, and reload typed answers for editing
        let cursor = match (self.current_widget(), self.current_answer()) {
            (Some(widget), Some(Answer::Code(code))) => widget
                .options()
                .iter()
                .position(|o| &o.code == code)
                .unwrap_or(0),
            _ => 0,
        };
        self.cursor = cursor;
        self.input_buffer = match self.current_answer() {
            Some(Answer::Text(text)) => text.clone(),
            Some(Answer::Integer(n)) => n.to_string(),
            Some(Answer::Number(n)) => n.to_string(),
            _ => String::new(),
        };
    }

    /// Pick (or toggle, for multiple choice) the option under the cursor
    pub fn choose(&mut self) {
        let Some(key) = self.current_key() else { return };
        let Some(widget) = self.current_widget().cloned() else {
            self.status_message = Some("This question can't be answered here".to_string());
            return;
        };
        let Some(option) = widget.options().get(self.cursor) else { return };
        let code = option.code.clone();

        match widget {
            WidgetKind::Range { .. } | WidgetKind::SingleChoice { .. } => {
                self.answers.insert(key, Answer::Code(code));
            }
            WidgetKind::MultipleChoice { options } => {
                let mut chosen = match self.answers.remove(&key) {
                    Some(Answer::Codes(codes)) => codes,
                    _ => Vec::new(),
                };
                if let Some(pos) = chosen.iter().position(|c| *c == code) {
                    chosen.remove(pos);
                } else {
                    chosen.push(code);
                }
                // Keep display order
                chosen.sort_by_key(|c| options.iter().position(|o| &o.code == c));
                if !chosen.is_empty() {
                    self.answers.insert(key, Answer::Codes(chosen));
                }
            }
            WidgetKind::Text { .. } | WidgetKind::Numeric { .. } | WidgetKind::Date => {}
        }
    }

    /// Validate the input buffer against the current typed widget and store it
    pub fn commit_input(&mut self) {
        let Some(key) = self.current_key() else { return };
        let Some(widget) = self.current_widget().cloned() else { return };
        let input = self.input_buffer.trim().to_string();

        if input.is_empty() {
            self.answers.remove(&key);
            return;
        }

        let answer = match widget {
            WidgetKind::Text { .. } => Ok(Answer::Text(input)),
            WidgetKind::Numeric { min, max, integer, .. } => parse_number(&input, min, max, integer),
            WidgetKind::Date => {
                if is_iso_date(&input) {
                    Ok(Answer::Text(input))
                } else {
                    Err("Dates must be written as YYYY-MM-DD".to_string())
                }
            }
            _ => return,
        };

        match answer {
            Ok(answer) => {
                self.answers.insert(key, answer);
                self.status_message = None;
            }
            Err(message) => self.status_message = Some(message),
        }
    }

    pub fn submit(&mut self) {
        self.submitted = true;
        tracing::info!(
            "Survey submitted with {}/{} answers",
            self.answers.len(),
            self.questions.len()
        );
    }

    /// Answers in question order, as posted back to the registry
    pub fn answers_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for key in &self.keys {
            if let Some(answer) = self.answers.get(key) {
                if let Ok(value) = serde_json::to_value(answer) {
                    map.insert(key.clone(), value);
                }
            }
        }
        serde_json::Value::Object(map)
    }
}

fn parse_number(input: &str, min: Option<f64>, max: Option<f64>, integer: bool) -> Result<Answer, String> {
    let value: f64 = input
        .parse()
        .map_err(|_| format!("'{}' is not a number", input))?;

    if !value.is_finite() {
        return Err(format!("'{}' is not a number", input));
    }
    if let Some(min) = min {
        if value < min {
            return Err(format!("Value must be at least {}", min));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(format!("Value must be at most {}", max));
        }
    }

    if !integer {
        return Ok(Answer::Number(value));
    }
    if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        return Err("Please enter a whole number".to_string());
    }
    Ok(Answer::Integer(value as i64))
}

/// `YYYY-MM-DD` with a real month and a day that exists in it
fn is_iso_date(input: &str) -> bool {
    let parts: Vec<&str> = input.split('-').collect();
    if parts.len() != 3 || parts[0].len() != 4 || parts[1].len() != 2 || parts[2].len() != 2 {
        return false;
    }
    let (Ok(year), Ok(month), Ok(day)) = (
        parts[0].parse::<u32>(),
        parts[1].parse::<u32>(),
        parts[2].parse::<u32>(),
    ) else {
        return false;
    };

    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days_in_month).contains(&day)
}
