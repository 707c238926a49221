use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use clusterwatch::config::thresholds_are_valid;
use clusterwatch::data::duration::parse_duration;
use clusterwatch::data::export::write_export;
use clusterwatch::{
    events, logging, ui, App, ClusterData, DataSource, FileSource, HttpSource, Settings,
    StreamSource, Theme, ThemeChoice,
};

/// Rows above the first transfer row: header, tabs, badges, table border, column header.
const TRANSFER_TABLE_START_ROW: u16 = ui::CONTENT_START_ROW + 3;

/// Poll interval for push-based sources.
const STREAM_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "clusterwatch")]
#[command(about = "Terminal dashboard for monitoring a distributed inference cluster")]
struct Args {
    /// Path to a cluster snapshot JSON file
    #[arg(short, long, default_value = "cluster.json", conflicts_with_all = ["connect", "url"])]
    file: PathBuf,

    /// Connect to a TCP endpoint streaming newline-delimited snapshots (host:port)
    #[arg(short, long, conflicts_with_all = ["file", "url"])]
    connect: Option<String>,

    /// Poll the cluster admin API at this base URL
    #[arg(short, long, conflicts_with_all = ["file", "connect"])]
    url: Option<String>,

    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh interval (e.g., "1s", "500ms")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Usage percentage that marks a node as warning
    #[arg(long)]
    usage_warn: Option<f64>,

    /// Usage percentage that marks a node as critical
    #[arg(long)]
    usage_crit: Option<f64>,

    /// Color theme
    #[arg(long, value_enum)]
    theme: Option<ThemeChoice>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export current state to JSON file and exit
    #[arg(short, long, conflicts_with_all = ["connect", "url"])]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = resolve_settings(&args)?;

    logging::init(settings.log_file.as_deref())?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(&args.file, export_path);
    }

    if let Some(ref addr) = args.connect {
        return run_with_tcp(addr, &settings);
    }

    if let Some(ref url) = args.url {
        return run_with_url(url, &settings);
    }

    run_with_file(&args.file, &settings)
}

/// Merge the settings file and environment with command-line overrides.
fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if let Some(ref refresh) = args.refresh {
        settings.refresh = parse_duration(refresh)?;
        if settings.refresh.is_zero() {
            bail!("Refresh interval must be greater than zero");
        }
    }
    if let Some(warn) = args.usage_warn {
        settings.thresholds.usage_warning = warn;
    }
    if let Some(crit) = args.usage_crit {
        settings.thresholds.usage_critical = crit;
    }
    thresholds_are_valid(&settings.thresholds)?;

    if let Some(theme) = args.theme {
        settings.theme = theme;
    }
    if args.log_file.is_some() {
        settings.log_file = args.log_file.clone();
    }

    Ok(settings)
}

/// Run with a file-based data source
fn run_with_file(path: &Path, settings: &Settings) -> Result<()> {
    info!(path = %path.display(), "watching snapshot file");
    let source = Box::new(FileSource::new(path));
    run_tui(source, settings, settings.refresh)
}

/// Run with a TCP stream data source
fn run_with_tcp(addr: &str, settings: &Settings) -> Result<()> {
    // The runtime must outlive the TUI so the reader task keeps running
    let rt = tokio::runtime::Runtime::new()?;

    let source = rt.block_on(async {
        use tokio::net::TcpStream;

        println!("Connecting to {}...", addr);
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("Failed to connect to {}", addr))?;
        println!("Connected!");
        info!(%addr, "connected to snapshot stream");
        Ok::<_, anyhow::Error>(Box::new(StreamSource::spawn(stream, addr)) as Box<dyn DataSource>)
    })?;

    run_tui(source, settings, STREAM_POLL_INTERVAL)
}

/// Run with the REST API poller
fn run_with_url(url: &str, settings: &Settings) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let source = HttpSource::spawn(url, settings.refresh)
        .with_context(|| format!("Invalid cluster URL {}", url))?;

    run_tui(Box::new(source), settings, STREAM_POLL_INTERVAL)
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    settings: &Settings,
    refresh_interval: Duration,
) -> Result<()> {
    // Detect the background before raw mode takes over the terminal
    let theme = Theme::from_choice(settings.theme);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, settings.thresholds.clone(), theme)
        .with_spinner_fullscreen(settings.spinner_fullscreen);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
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
        app.tick();

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    let visible = ui::transfers::visible_rows(terminal.size()?.height);
                    events::handle_mouse_event(app, mouse, TRANSFER_TABLE_START_ROW, visible);
                }
                // Redrawn on the next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    info!("exiting");
    Ok(())
}

/// Export the current snapshot file as a JSON summary
fn export_to_file(snapshot_path: &Path, export_path: &Path) -> Result<()> {
    let mut source = FileSource::new(snapshot_path);
    let Some(snapshot) = source.poll() else {
        match source.error() {
            Some(e) => bail!("Failed to read {}: {}", snapshot_path.display(), e),
            None => bail!("No snapshot available in {}", snapshot_path.display()),
        }
    };

    let data = ClusterData::from_snapshot(&snapshot);
    write_export(&data, export_path)?;

    info!(path = %export_path.display(), nodes = data.nodes.len(), "exported cluster state");
    println!("Exported cluster state to: {}", export_path.display());
    Ok(())
}
