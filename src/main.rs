use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::info;
use tracing::level_filters::LevelFilter;

mod columns;
mod controller;
mod domain;
mod form;
mod html;
mod inputter;
mod logging;
mod model;
mod pagination;
mod record;
mod render;
mod scheduler;
mod sort;
mod ui;

use controller::Controller;
use domain::{Locale, PTError, TableConfig};
use html::HtmlDocument;
use model::{Model, Status};
use pagination::{DEFAULT_PAGE_SIZE, DEFAULT_WINDOW_SIZE};
use record::{Record, expand_path, load_records};
use render::ViewBuffer;
use ui::TableUI;

/// Browse and edit a JSON list of people records as a paginated table.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file holding an array of records
    #[arg(default_value = "tests/fixtures/people.json")]
    data: String,

    /// Rows per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Page numbers shown in the pagination bar
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window_size: usize,

    #[arg(long, value_enum, default_value_t = Locale::En)]
    locale: Locale,

    /// Key event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_time: u64,

    #[arg(long, default_value_t = 500)]
    fade_in_ms: u64,

    #[arg(long, default_value_t = 350)]
    fade_out_ms: u64,

    #[arg(long, default_value = "ptable.log")]
    log_file: PathBuf,

    /// Overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Write the first page as an HTML document instead of starting the UI
    #[arg(long)]
    html: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: Args) -> Result<(), PTError> {
    logging::init_tracing(&args.log_file, args.log_level)?;

    let path = expand_path(&args.data)?;
    let records = load_records(&path)?;
    info!("Loaded {} records from {}", records.len(), path.display());

    let cfg = TableConfig::default()
        .with_page_size(args.page_size)
        .with_window_size(args.window_size)
        .with_event_poll_time(args.poll_time)
        .with_fade_in(Duration::from_millis(args.fade_in_ms))
        .with_fade_out(Duration::from_millis(args.fade_out_ms))
        .with_locale(args.locale);

    if let Some(out) = args.html {
        let model = Model::new(&cfg, records, HtmlDocument::new(cfg.locale));
        fs::write(&out, model.target().to_document())?;
        info!("Wrote {}", out.display());
        return Ok(());
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.data.clone());

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &cfg, records, name);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    cfg: &TableConfig,
    records: Vec<Record>,
    name: String,
) -> Result<(), PTError> {
    let mut model = Model::new(cfg, records, ViewBuffer::default());
    let ui = TableUI::new(name);
    let controller = Controller::new(cfg);
    let mut last_tick = Instant::now();

    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }

        // Let pending form transitions catch up with wall time
        model.advance(last_tick.elapsed());
        last_tick = Instant::now();
    }

    info!("Bye");
    Ok(())
}
