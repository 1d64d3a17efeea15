use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use leadsbox_doctor::data::duration::parse_duration;
use leadsbox_doctor::{
    agenda, events, export, replay, ui, App, ChannelSource, DataSource, DoctorConfig, FileSource,
    Replayer,
};
use leadsbox_monitor::MonitorConfig;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "leadsbox-doctor", version)]
#[command(about = "Diagnostic TUI for LeadsBox API flow health and follow-up agendas")]
struct Args {
    /// Persisted monitoring state written by the API monitor
    #[arg(short, long, default_value = "leadsbox.api-monitoring.json")]
    file: PathBuf,

    /// Refresh interval when watching the state file (e.g. "1s", "500ms")
    #[arg(short, long, default_value = "1s")]
    refresh: String,

    /// Replay a newline-delimited JSON request log through a fresh monitor
    #[arg(long, conflicts_with = "tasks")]
    replay: Option<PathBuf>,

    /// Print the replay report instead of opening the TUI
    #[arg(long, requires = "replay")]
    headless: bool,

    /// Real time waited between replayed requests
    #[arg(long, default_value = "50ms")]
    pace: String,

    /// Simulated time between replayed requests; drives alert cooldowns
    #[arg(long, default_value = "1s")]
    spacing: String,

    /// Persist replay state in this directory instead of memory
    #[arg(long, requires = "replay")]
    state_dir: Option<PathBuf>,

    /// Write the current snapshot to a JSON file and exit
    #[arg(short, long, conflicts_with = "tasks")]
    export: Option<PathBuf>,

    /// Print the follow-up agenda for a JSON payload of follow-up rules
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Reference time for the agenda (RFC 3339); defaults to now
    #[arg(long, requires = "tasks")]
    at: Option<String>,

    /// Emit the agenda as JSON
    #[arg(long, requires = "tasks")]
    json: bool,

    /// TOML configuration file (thresholds, window, cooldown)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref tasks) = args.tasks {
        init_tracing();
        return print_agenda(tasks, args.at.as_deref(), args.json);
    }

    let config = DoctorConfig::load(args.config.as_deref())?.monitor;

    if let Some(ref log) = args.replay {
        let spacing = parse_duration(&args.spacing).context("invalid --spacing")?;
        let replayer = Replayer::new(config.clone(), args.state_dir.as_deref(), spacing);
        let outcomes = replay::load_outcomes(log)?;

        if args.headless || args.export.is_some() {
            init_tracing();
            return replay_headless(&replayer, &outcomes, args.export.as_deref());
        }

        let pace = parse_duration(&args.pace).context("invalid --pace")?;
        return run_with_replay(replayer, outcomes, pace, config, log);
    }

    if let Some(ref out) = args.export {
        init_tracing();
        let snapshot = export::snapshot_from_state_file(&args.file, &config)?;
        export::write_snapshot(&snapshot, out)?;
        println!("Exported {} flows to {}", snapshot.len(), out.display());
        return Ok(());
    }

    let refresh = parse_duration(&args.refresh).context("invalid --refresh")?;
    let source = Box::new(FileSource::new(&args.file, config.clone()));
    run_tui(source, config, refresh)
}

/// Log to stderr; only used outside the TUI, where stdout carries output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_agenda(path: &Path, at: Option<&str>, json: bool) -> Result<()> {
    let reference = agenda::reference_time(at)?;
    let buckets = agenda::load_agenda(path, &reference)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &buckets)?;
        writeln!(out)?;
    } else {
        agenda::render_agenda(&buckets, &reference, &mut out)?;
    }
    Ok(())
}

fn replay_headless(
    replayer: &Replayer,
    outcomes: &[leadsbox_monitor::RequestOutcome],
    export_path: Option<&Path>,
) -> Result<()> {
    let report = replayer.run(outcomes);
    let snapshot = replayer.monitor().snapshot();

    let stdout = io::stdout();
    replay::render_report(&report, &snapshot, &mut stdout.lock())?;

    if let Some(path) = export_path {
        export::write_snapshot(&snapshot, path)?;
        println!("\nExported {} flows to {}", snapshot.len(), path.display());
    }
    Ok(())
}

/// Replay in the background and watch it live.
fn run_with_replay(
    replayer: Replayer,
    outcomes: Vec<leadsbox_monitor::RequestOutcome>,
    pace: Duration,
    config: MonitorConfig,
    log: &Path,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    let (feed, source) = ChannelSource::create(&format!("replay:{}", log.display()));
    let handle = {
        let _guard = rt.enter();
        replayer.spawn(outcomes, pace, feed)
    };

    let result = run_tui(Box::new(source), config, Duration::from_millis(100));

    handle.abort();
    result
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    config: MonitorConfig,
    refresh_interval: Duration,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, config);
    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW);
                }
                // redrawn on the next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            let _ = app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
