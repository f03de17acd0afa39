//! Survey question rendering for registry PROMS pages.
//!
//! [`ui::question::Question`] turns catalog question definitions into a
//! [`ui::node::Node`] tree; [`ui::QuestionView`] draws that tree with ratatui.

pub mod app;
pub mod config;
pub mod copyright;
pub mod question;
pub mod theme;
pub mod ui;

pub use question::{ChoiceOption, QuestionDefinition, QuestionError, QuestionSpec, WidgetKind};
pub use ui::node::{Node, NodeKind};
pub use ui::question::Question;
