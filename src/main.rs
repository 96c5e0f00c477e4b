use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{debug, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod controller;
mod domain;
mod fetcher;
mod inputter;
mod model;
mod paginator;
mod table;
mod ui;

use controller::Controller;
use domain::{AppConfig, AppError, DEFAULT_API_URL, Message};
use fetcher::{Fetcher, HttpSource};
use model::{Model, Status};
use ui::TableUI;

/// Browse the artworks of the Art Institute of Chicago, one page at a time.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Base url of the artworks api
    #[arg(short, long, default_value = DEFAULT_API_URL)]
    url: String,

    /// Rows shown per page
    #[arg(short, long, default_value_t = 10)]
    rows: usize,

    /// Page to start on (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Log file, the terminal belongs to the table
    #[arg(long, default_value = "${TMPDIR:-/tmp}/artable.log")]
    log_file: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

impl Args {
    fn into_config(self) -> Result<AppConfig, AppError> {
        let log_file = shellexpand::full(&self.log_file)
            .map_err(|e| AppError::InvalidConfig(format!("log file: {e}")))?;
        let cfg = AppConfig::default()
            .with_api_url(self.url)
            .with_rows_per_page(self.rows)
            .with_start_page(self.page)
            .with_request_timeout_secs(self.timeout)
            .with_event_poll_time(self.poll_ms)
            .with_log_file(Some(PathBuf::from(log_file.as_ref())));
        cfg.validate()?;
        Ok(cfg)
    }
}

fn init_logging(cfg: &AppConfig, level: &str) -> Result<(), AppError> {
    let Some(path) = &cfg.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = args.log_level.clone();

    match args.into_config().and_then(|cfg| {
        init_logging(&cfg, &level)?;
        run(&cfg)
    }) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(cfg: &AppConfig) -> Result<(), AppError> {
    info!("Starting artable against {}", cfg.api_url);

    let fetcher = Fetcher::new(Arc::new(HttpSource::new(cfg)?));
    let mut model = Model::init(cfg)?;
    let mut ui = TableUI::new(cfg);
    let controller = Controller::new(cfg);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut model, &mut ui, &controller, &fetcher);
    ratatui::restore();

    debug!("Shutting down: {:?}", result.as_ref().err());
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    model: &mut Model,
    ui: &mut TableUI,
    controller: &Controller,
    fetcher: &Fetcher,
) -> Result<(), AppError> {
    while model.status != Status::QUITTING {
        for request in model.take_requests() {
            fetcher.dispatch(request);
        }
        while let Some(outcome) = fetcher.try_recv() {
            model.update(Some(Message::Fetched(outcome)))?;
        }

        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(model)?;
        model.update(message)?;
    }
    Ok(())
}
