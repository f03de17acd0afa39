pub mod node;
pub mod question;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

use crate::app::{Answer, App, Popup};
use crate::theme::Theme;
use node::{Node, NodeKind};

/// Interaction state drawn on top of a question node
#[derive(Debug, Clone, Default)]
pub struct Focus<'a> {
    pub cursor: usize,
    pub chosen: Vec<&'a str>,
    pub input: &'a str,
}

/// Draws a rendered node (a whole container or a single question).
/// Without focus it is a static preview.
pub struct QuestionView<'a> {
    node: &'a Node,
    theme: &'a Theme,
    focus: Option<Focus<'a>>,
    block: Option<Block<'a>>,
}

impl<'a> QuestionView<'a> {
    pub fn new(node: &'a Node, theme: &'a Theme) -> Self {
        Self {
            node,
            theme,
            focus: None,
            block: None,
        }
    }

    pub fn focus(mut self, focus: Focus<'a>) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn lines(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        self.push_node(self.node, &mut lines);
        lines
    }

    fn push_node(&self, node: &'a Node, lines: &mut Vec<Line<'a>>) {
        let t = self.theme;
        match &node.kind {
            NodeKind::Container => {
                if node.children.is_empty() {
                    lines.push(Line::styled("No questions", Style::default().fg(t.text_dim)));
                }
                for (i, child) in node.children.iter().enumerate() {
                    if i > 0 {
                        lines.push(Line::from(""));
                    }
                    self.push_node(child, lines);
                }
            }
            NodeKind::Question => {
                for child in &node.children {
                    self.push_node(child, lines);
                }
            }
            NodeKind::Title => {
                let title = node.text.as_deref().unwrap_or("");
                let title = if title.is_empty() { "(untitled question)" } else { title };
                lines.push(Line::styled(
                    title,
                    Style::default().fg(t.header).add_modifier(Modifier::BOLD),
                ));
            }
            NodeKind::Instruction => {
                lines.push(Line::styled(
                    node.text.as_deref().unwrap_or(""),
                    Style::default().fg(t.text_dim).add_modifier(Modifier::ITALIC),
                ));
            }
            NodeKind::Scale | NodeKind::Choice { .. } => {
                let multiple = matches!(node.kind, NodeKind::Choice { multiple: true });
                let ordinal = node.kind == NodeKind::Scale;
                for (i, option) in node.children.iter().enumerate() {
                    lines.push(self.option_line(option, i, multiple, ordinal));
                }
            }
            NodeKind::Option => {
                lines.push(self.option_line(node, 0, false, false));
            }
            NodeKind::TextInput { multiline } => {
                let hint = if *multiline { "free text (long)" } else { "free text" };
                lines.push(self.input_line(hint));
            }
            NodeKind::NumericInput { min, max, slider } => {
                let hint = match (min, max) {
                    (Some(min), Some(max)) => format!("number {}–{}", min, max),
                    (Some(min), None) => format!("number ≥ {}", min),
                    (None, Some(max)) => format!("number ≤ {}", max),
                    (None, None) => "number".to_string(),
                };
                lines.push(self.input_line(&hint));
                if let (true, Some(min), Some(max)) = (*slider, min, max) {
                    lines.push(self.slider_line(*min, *max));
                }
            }
            NodeKind::DateInput => lines.push(self.input_line("YYYY-MM-DD")),
            NodeKind::Placeholder => {
                lines.push(Line::styled(
                    "  (this question is not available)",
                    Style::default().fg(t.inactive),
                ));
            }
        }
    }

    fn option_line(&self, option: &'a Node, index: usize, multiple: bool, ordinal: bool) -> Line<'a> {
        let t = self.theme;
        let code = option.key.as_deref().unwrap_or("");
        let label = option.text.as_deref().unwrap_or(code);

        let (under_cursor, chosen) = match &self.focus {
            Some(focus) => (focus.cursor == index, focus.chosen.contains(&code)),
            None => (false, false),
        };

        let mark = match (multiple, chosen) {
            (true, true) => "[x]",
            (true, false) => "[ ]",
            (false, true) => "(•)",
            (false, false) => "( )",
        };

        let row_style = if under_cursor {
            Style::default().bg(t.bg_selected).fg(t.text)
        } else {
            Style::default()
        };
        let mark_color = if chosen { t.success } else { t.inactive };

        let mut spans = vec![
            Span::styled(if under_cursor { "› " } else { "  " }, Style::default().fg(t.accent)),
            Span::styled(mark, Style::default().fg(mark_color)),
            Span::raw(" "),
        ];
        if ordinal {
            spans.push(Span::styled(format!("{}. ", index + 1), Style::default().fg(t.text_dim)));
        }
        spans.push(Span::styled(label, Style::default().fg(t.text)));

        Line::from(spans).style(row_style)
    }

    fn input_line(&self, hint: &str) -> Line<'a> {
        let t = self.theme;
        match &self.focus {
            Some(focus) if !focus.input.is_empty() => Line::from(vec![
                Span::styled("  > ", Style::default().fg(t.accent)),
                Span::styled(focus.input.to_string(), Style::default().fg(t.text)),
                Span::styled("_", Style::default().fg(t.accent)),
            ]),
            Some(_) => Line::from(vec![
                Span::styled("  > ", Style::default().fg(t.accent)),
                Span::styled("_ ", Style::default().fg(t.accent)),
                Span::styled(format!("({})", hint), Style::default().fg(t.text_dim)),
            ]),
            None => Line::from(vec![
                Span::styled("  [", Style::default().fg(t.inactive)),
                Span::styled(hint.to_string(), Style::default().fg(t.text_dim)),
                Span::styled("]", Style::default().fg(t.inactive)),
            ]),
        }
    }

    fn slider_line(&self, min: f64, max: f64) -> Line<'a> {
        const WIDTH: usize = 20;
        let t = self.theme;

        let value = self
            .focus
            .as_ref()
            .and_then(|f| f.input.trim().parse::<f64>().ok())
            .filter(|v| (min..=max).contains(v));

        let filled = value
            .map(|v| (((v - min) / (max - min)) * WIDTH as f64).round() as usize)
            .unwrap_or(0)
            .min(WIDTH);

        Line::from(vec![
            Span::styled(format!("  {} ", min), Style::default().fg(t.text_dim)),
            Span::styled("█".repeat(filled), Style::default().fg(t.accent)),
            Span::styled("░".repeat(WIDTH - filled), Style::default().fg(t.inactive)),
            Span::styled(format!(" {}", max), Style::default().fg(t.text_dim)),
        ])
    }
}

impl Widget for QuestionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines();
        let mut paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        if let Some(block) = self.block {
            paragraph = paragraph.block(block);
        }
        paragraph.render(area, buf);
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),               // Progress line
            Constraint::Min(6),                  // Question box
            Constraint::Length(1),               // Status / validation line
            Constraint::Length(1),               // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_question_box(f, app, chunks[1]);
    draw_status_line(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f, app),
        Popup::Copyright => draw_copyright_popup(f, app),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let total = app.questions.len();
    let position = if total == 0 { 0 } else { app.current + 1 };

    let mut spans = vec![
        Span::styled(" Question ", Style::default().fg(t.text_dim)),
        Span::styled(format!("{}/{}", position, total), Style::default().fg(t.accent)),
        Span::styled("  │  ", Style::default().fg(t.inactive)),
        Span::styled(format!("{} answered", app.answered_count()), Style::default().fg(t.success)),
    ];
    if app.submitted {
        spans.push(Span::styled("  │  submitted", Style::default().fg(t.success)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_question_box(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let block = Block::default()
        .title(Span::styled(" Survey ", Style::default().fg(t.accent).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.accent));

    let Some(node) = app.current_node() else {
        let empty = Paragraph::new("This survey has no questions")
            .style(Style::default().fg(t.text_dim))
            .block(block);
        f.render_widget(empty, area);
        return;
    };

    let chosen: Vec<&str> = match app.current_answer() {
        Some(Answer::Code(code)) => vec![code.as_str()],
        Some(Answer::Codes(codes)) => codes.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    };

    let focus = Focus {
        cursor: app.cursor,
        chosen,
        input: &app.input_buffer,
    };

    f.render_widget(QuestionView::new(node, t).focus(focus).block(block), area);
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let line = match (&app.status_message, app.show_copyright) {
        (Some(message), _) => Line::styled(format!(" ⚠ {}", message), Style::default().fg(t.danger)),
        (None, true) => {
            let notice = app
                .current_question()
                .and_then(|q| app.copyright_notices.get(q.source.trim()))
                .map(String::as_str)
                .unwrap_or(&app.registry_copyright);
            Line::styled(format!(" {}", notice), Style::default().fg(t.text_dim))
        }
        (None, false) => Line::from(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let hints: Vec<(&str, &str)> = if app.is_typing() {
        vec![
            ("type", "Answer"),
            ("Enter", "Save"),
            ("Tab", "Next"),
            ("C-s", "Submit"),
            ("F1", "Help"),
            ("Esc", "Quit"),
        ]
    } else {
        vec![
            ("↑↓", "Option"),
            ("Space", "Choose"),
            ("←→", "Question"),
            ("s/C-s", "Submit"),
            ("c", "©"),
            ("h/F1", "Help"),
        ]
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(t.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(t.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let popup_area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, popup_area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), Style::default().fg(t.accent)),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("═══ Answering ═══", Style::default().fg(t.header).add_modifier(Modifier::BOLD))),
        key("↑/↓ j/k", "Move between options"),
        key("Space", "Choose option (toggle for multiple choice)"),
        key("typing", "Text, number and date questions take typed input"),
        key("Enter", "Save typed answer"),
        Line::from(""),
        Line::from(Span::styled("═══ Survey ═══", Style::default().fg(t.header).add_modifier(Modifier::BOLD))),
        key("←/→ Tab", "Previous / next question"),
        key("s Ctrl-S", "Submit answers (Ctrl-S also while typing)"),
        key("F1", "This help, also while typing"),
        key("c", "Copyright notices"),
        key("q Esc", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(t.text_dim)),
            Span::styled("h", Style::default().fg(t.accent)),
            Span::styled("/", Style::default().fg(t.text_dim)),
            Span::styled("Esc", Style::default().fg(t.accent)),
            Span::styled(" to close", Style::default().fg(t.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" Help ", Style::default().fg(t.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn draw_copyright_popup(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let popup_area = centered_rect(80, 60, f.area());
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::styled(app.registry_copyright.as_str(), Style::default().fg(t.text)),
        Line::from(""),
    ];
    for (source, text) in &app.copyright_notices {
        lines.push(Line::styled(source.as_str(), Style::default().fg(t.header).add_modifier(Modifier::BOLD)));
        lines.push(Line::styled(format!("  {}", text), Style::default().fg(t.text_dim)));
    }

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(" Copyright ", Style::default().fg(t.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(popup, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::question::QuestionDefinition;
    use crate::ui::question::Question;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn education() -> Vec<QuestionDefinition> {
        serde_json::from_value(json!([{
            "cde": "EDUCATION",
            "datatype": "range",
            "title": "What was the highest level of schooling you completed",
            "survey_question_instruction": "To date",
            "source": "ABS",
            "copyright_text": "© Australian Bureau of Statistics",
            "spec": {"ui": "range", "options": [
                {"code": "0", "text": "None"},
                {"code": "1", "text": "Primary"},
                {"code": "2", "text": "Secondary"},
                {"code": "3", "text": "Tertiary"}
            ]}
        }]))
        .unwrap()
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_view_draws_title_and_options_in_order() {
        let tree = Question::new(education()).render();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 70, 8);
        let mut buf = Buffer::empty(area);

        QuestionView::new(&tree, &theme).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("What was the highest level of schooling"));
        let positions: Vec<usize> = ["None", "Primary", "Secondary", "Tertiary"]
            .iter()
            .map(|label| text.find(label).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_view_of_empty_container() {
        let tree = Question::default().render();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);

        QuestionView::new(&tree, &theme).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("No questions"));
    }

    #[test]
    fn test_focus_marks_chosen_option() {
        let tree = Question::new(education()).render();
        let theme = Theme::default();
        let view = QuestionView::new(&tree.children[0], &theme).focus(Focus {
            cursor: 2,
            chosen: vec!["1"],
            input: "",
        });

        let lines: Vec<String> = view
            .lines()
            .iter()
            .map(|l| l.spans.iter().map(|s| &*s.content).collect())
            .collect();

        assert!(lines.iter().any(|l| l.contains("(•) 2. Primary")));
        assert!(lines.iter().any(|l| l.starts_with("› ( ) 3. Secondary")));
    }

    #[test]
    fn test_draw_full_page() {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let app = App::new(education(), &AppConfig::default());

        terminal.draw(|f| draw(f, &app)).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Question 1/1"));
        assert!(text.contains("Tertiary"));
        assert!(text.contains("© Australian Bureau of Statistics"));
    }

    #[test]
    fn test_typing_footer_lists_submit_key() {
        let questions: Vec<QuestionDefinition> =
            serde_json::from_value(json!([{"cde": "NOTE", "datatype": "string"}])).unwrap();
        let backend = TestBackend::new(100, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let app = App::new(questions, &AppConfig::default());

        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("C-s Submit"));
        assert!(text.contains("F1 Help"));
    }

    #[test]
    fn test_draw_page_without_questions() {
        let backend = TestBackend::new(60, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let app = App::new(Vec::new(), &AppConfig::default());

        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains("This survey has no questions"));
    }
}
