use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proms_question::app::{App, Popup};
use proms_question::config::AppConfig;
use proms_question::question::{load_catalog, QuestionDefinition};
use proms_question::ui::question::{Question, QuestionOptions};
use proms_question::{copyright, ui};

#[derive(Parser, Debug)]
#[command(name = "proms")]
#[command(version)]
#[command(about = "Preview and answer a PROMS question catalog in the terminal")]
struct Args {
    /// Question catalog (.json or .toml); defaults to the configured catalog
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Print the rendered question tree as JSON and exit
    #[arg(short, long)]
    dump: bool,

    /// Print copyright notices for the catalog and exit
    #[arg(long)]
    copyright: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so it stays out of JSON output)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();

    let questions = match args.catalog.as_ref().or(config.default_catalog.as_ref()) {
        Some(path) => load_catalog(path).await?,
        None => anyhow::bail!("No catalog given; pass --catalog or set default_catalog in the config"),
    };

    if args.dump {
        return dump_tree(questions, &config);
    }

    if args.copyright {
        return print_copyright(&questions, &config);
    }

    run_tui(questions, &config).await
}

fn dump_tree(questions: Vec<QuestionDefinition>, config: &AppConfig) -> Result<()> {
    let tree = Question::new(questions)
        .with_options(QuestionOptions {
            show_instructions: config.show_instructions,
        })
        .render();

    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}

fn print_copyright(questions: &[QuestionDefinition], config: &AppConfig) -> Result<()> {
    println!("{}", copyright::registry_notice(config.registry_copyright.as_deref()));
    for (source, text) in copyright::collect_notices(questions) {
        println!("{}: {}", source, text);
    }
    Ok(())
}

async fn run_tui(questions: Vec<QuestionDefinition>, config: &AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(questions, config);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;

    if app.submitted {
        let answers = serde_json::to_string_pretty(&app.answers_json())
            .context("Failed to serialize answers")?;
        println!("{}", answers);
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if app.submitted {
            return Ok(());
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None && !app.is_typing() => return Ok(()),
                        KeyCode::Esc if app.popup == Popup::None => {
                            return Ok(())
                        }
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key) {
                                app.status_message = Some(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }
    }
}
