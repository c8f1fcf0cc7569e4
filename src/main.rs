use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use codesense::api::{DemoBackend, HttpBackend, ReviewBackend};
use codesense::config::Config;
use codesense::health::{HealthMonitor, HealthStatus};
use codesense::input::CodeBuffer;
use codesense::store::{FileSlot, ReviewStore};
use codesense::submit::{SubmissionController, SubmitOutcome, View};
use codesense::view::{self, Mount, ResultView, SectionId, Tab};

/// CodeSense — submit code for automated review and inspect the findings,
/// scores, and suggested corrections.
#[derive(Parser, Debug)]
#[command(name = "codesense", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Use the built-in demo backend (no review service needed)
    #[arg(long, global = true)]
    r#mock: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit code for review, then show the result
    Review {
        /// Source file to review (reads stdin when neither FILE nor --code is given)
        file: Option<PathBuf>,

        /// Code to review, passed inline
        #[arg(short, long, conflicts_with = "file")]
        code: Option<String>,

        /// Print the line-numbered code before submitting
        #[arg(long)]
        preview: bool,

        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Show the last stored review
    Show {
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Check whether the review service is reachable
    Status {
        /// Keep probing and report every status until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
    /// Show or set the dark-mode preference
    Theme {
        mode: Option<ThemeMode>,
    },
}

#[derive(Args, Debug)]
struct DisplayArgs {
    /// Code tab to show first
    #[arg(long, value_enum, default_value_t = Tab::Original)]
    tab: Tab,

    /// Sections to start collapsed
    #[arg(long, value_enum, value_delimiter = ',')]
    collapse: Vec<SectionId>,

    /// Write a markdown report to this path instead of the terminal
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Switch tabs and toggle sections from the keyboard
    #[arg(short, long, conflicts_with = "output")]
    interactive: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeMode {
    Dark,
    Light,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    info!("loading configuration");
    let config = Config::load()?;
    let slot = FileSlot::new(config.store_path());
    debug!(path = %slot.path().display(), "opening review store");
    let store = Arc::new(ReviewStore::new(slot));

    let backend: Arc<dyn ReviewBackend> = if cli.r#mock {
        info!("using demo backend");
        Arc::new(DemoBackend)
    } else {
        debug!(url = %config.api_url(), "using review service");
        Arc::new(HttpBackend::new(config.api_url(), config.request_timeout())?)
    };

    match cli.command {
        Command::Review {
            file,
            code,
            preview,
            display,
        } => {
            let buffer = match (file, code) {
                (Some(path), _) => CodeBuffer::from_file(&path, &config.input.extensions)?,
                (None, Some(code)) => CodeBuffer::from_text(code),
                (None, None) => CodeBuffer::from_reader(std::io::stdin().lock())?,
            };
            if let Some(name) = &buffer.file_name {
                eprintln!("{}", name.dimmed());
            }
            if preview {
                eprintln!("{}", buffer.numbered());
            }

            let span = info_span!("review", lines = buffer.line_count());
            let outcome = submit_review(&buffer, backend, store.clone(), &config)
                .instrument(span)
                .await?;
            if outcome == SubmitOutcome::Navigate(View::Result) {
                show(&store, &display)?;
            }
        }
        Command::Show { display } => show(&store, &display)?,
        Command::Status { watch } => status(backend, &config, watch).await,
        Command::Theme { mode } => {
            if let Some(mode) = mode {
                store.set_dark_mode(matches!(mode, ThemeMode::Dark))?;
            }
            let current = if store.dark_mode() { "dark" } else { "light" };
            println!("Theme: {}", current);
        }
    }

    Ok(())
}

/// Input view: gate on the first health probe, then submit once.
async fn submit_review(
    buffer: &CodeBuffer,
    backend: Arc<dyn ReviewBackend>,
    store: Arc<ReviewStore>,
    config: &Config,
) -> Result<SubmitOutcome, Box<dyn std::error::Error>> {
    let monitor = HealthMonitor::start(backend.clone(), config.probe_interval());
    let first = monitor.first_probe().await;
    eprintln!("{}", status_line(first));

    let controller = SubmissionController::new(backend, store, monitor.subscribe());
    if controller.is_enabled() {
        eprintln!("{}", "Analyzing...".bold());
    }
    let outcome = controller.submit(&buffer.code).await;
    monitor.stop().await;

    let outcome = outcome?;
    info!(?outcome, "submission finished");
    Ok(outcome)
}

/// Result view. With nothing stored, point the user back at the input view.
fn show(store: &ReviewStore, display: &DisplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut result_view = match ResultView::open(store) {
        Mount::Ready(view) => view,
        Mount::Redirect(_) => {
            eprintln!("No review to show yet. Run `codesense review <FILE>` first.");
            return Ok(());
        }
    };

    result_view.select_tab(display.tab);
    for id in &display.collapse {
        if result_view.is_expanded(*id) {
            result_view.toggle_section(*id);
        }
    }

    if display.interactive {
        let stdin = std::io::stdin();
        result_view.run_interactive(stdin.lock(), std::io::stdout())?;
    } else if let Some(path) = &display.output {
        result_view.write_markdown(path)?;
        info!(path = %path.display(), "wrote markdown report");
    } else {
        print!("{}", view::render::terminal(&result_view));
    }
    Ok(())
}

async fn status(backend: Arc<dyn ReviewBackend>, config: &Config, watch: bool) {
    let monitor = HealthMonitor::start(backend, config.probe_interval());
    if !watch {
        println!("{}", status_line(monitor.first_probe().await));
        monitor.stop().await;
        return;
    }

    println!("{}", status_line(monitor.status()));
    let mut rx = monitor.subscribe();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *rx.borrow_and_update();
                println!("{}", status_line(current));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    monitor.stop().await;
}

fn status_line(status: HealthStatus) -> colored::ColoredString {
    match status {
        HealthStatus::Up => format!("✔ {}", status).green().bold(),
        HealthStatus::Down => format!("✘ {}", status).red().bold(),
        HealthStatus::Checking => status.label().yellow(),
    }
}
