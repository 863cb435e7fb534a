#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flow_nav::config::AgentConfig;
use flow_nav::simulation::actions::ActionCatalog;
use flow_nav::simulation::generator::{MapGenerator, MapGeneratorConfig};
use flow_nav::simulation::map_reader::write_flow_field;
use flow_nav::simulation::motion;
use flow_nav::simulation::params::{DEFAULT_MAX_TICKS, DEFAULT_TICK_INTERVAL_MS};
use flow_nav::simulation::policy::PolicyTable;
use flow_nav::simulation::state::StateEncoder;
use flow_nav::simulation::{Episode, GridPoint, Navigator, TickOutcome};
use flow_nav::ui::field::{compute_field_grid, grid_to_screen};
use flow_nav::ui::render::{draw_ui, AGENT_CHAR};
use flow_nav::ui::DashboardState;

#[derive(Parser)]
#[command(name = "flow_nav")]
#[command(version)]
#[command(about = "Steer an agent through a flow field with a precomputed policy table")]
struct Cli {
    /// Agent config (appsettings.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use a generated map instead of a config
    #[arg(long, global = true)]
    demo: bool,

    /// Seed for the generated map
    #[arg(long, default_value = "42", global = true)]
    seed: u64,

    /// Policy table for the generated map (default: empty table)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Use the test map and test start/end points from the config
    #[arg(long, global = true)]
    test_map: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate the agent in the terminal (default)
    Run {
        /// Write logs here; without it the TUI runs silently
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Override the tick interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Run one episode without rendering and print a summary
    Headless {
        /// Override the tick cap
        #[arg(long)]
        max_ticks: Option<u64>,
    },
    /// Write the flow field as text
    DumpMap {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Everything loaded at startup.
struct Scenario {
    navigator: Navigator,
    start: GridPoint,
    interval: Duration,
    max_ticks: u64,
}

fn load_scenario(cli: &Cli) -> Result<Scenario> {
    match (&cli.config, cli.demo) {
        (Some(path), false) => {
            let config = AgentConfig::load(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let navigator = config
                .build_navigator(cli.test_map)
                .context("loading map and policy table")?;
            Ok(Scenario {
                start: config.start(cli.test_map)?,
                navigator,
                interval: Duration::from_millis(config.interval_ms),
                max_ticks: config.max_ticks,
            })
        }
        _ => {
            let field = MapGenerator::new(MapGeneratorConfig::default(), cli.seed)
                .generate()
                .context("generating demo map")?;
            let table = match &cli.policy {
                Some(path) => PolicyTable::load(path)
                    .with_context(|| format!("reading policy table {}", path.display()))?,
                None => PolicyTable::new(),
            };
            info!(seed = cli.seed, "using generated demo map");
            Ok(Scenario {
                start: field.start_point(),
                navigator: Navigator::new(
                    field,
                    table,
                    ActionCatalog::default(),
                    StateEncoder::default(),
                ),
                interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
                max_ticks: DEFAULT_MAX_TICKS,
            })
        }
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

fn init_file_tracing(verbose: bool, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Headless { max_ticks }) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(cli.verbose))
                .with_writer(io::stderr)
                .init();
            let scenario = load_scenario(&cli)?;
            run_headless(&scenario, max_ticks.unwrap_or(scenario.max_ticks))
        }
        Some(Commands::DumpMap { output }) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(cli.verbose))
                .with_writer(io::stderr)
                .init();
            let scenario = load_scenario(&cli)?;
            let field = scenario.navigator.field();
            match output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    write_flow_field(field, BufWriter::new(file))?;
                }
                None => write_flow_field(field, io::stdout().lock())?,
            }
            Ok(())
        }
        Some(Commands::Run {
            log_file,
            interval_ms,
        }) => run_tui(&cli, log_file.as_deref(), *interval_ms),
        None => run_tui(&cli, None, None),
    }
}

fn run_headless(scenario: &Scenario, max_ticks: u64) -> Result<()> {
    let summary = Episode::new(&scenario.navigator, scenario.start)?.run(max_ticks)?;
    let end = summary.trajectory.last().copied().unwrap_or(scenario.start);
    println!(
        "outcome: {} | ticks: {} | table hits: {} | misses: {} | final position: {}",
        summary.outcome, summary.ticks, summary.table_hits, summary.table_misses, end
    );
    Ok(())
}

fn run_tui(cli: &Cli, log_file: Option<&Path>, interval_ms: Option<u64>) -> Result<()> {
    if let Some(path) = log_file {
        init_file_tracing(cli.verbose, path)?;
    }
    let mut scenario = load_scenario(cli)?;
    if let Some(ms) = interval_ms {
        scenario.interval = Duration::from_millis(ms);
    }

    // Setup Terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &scenario);

    // Restore Terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    let dashboard = res?;
    println!("{}", dashboard.hud_line());
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    scenario: &Scenario,
) -> Result<DashboardState> {
    let navigator = &scenario.navigator;
    let field = navigator.field();
    let mut position = scenario.start;
    let mut tick = 0;
    let mut dashboard = DashboardState::idle(position, motion::classify(field, position));
    let mut last_tick = Instant::now();

    loop {
        // 1. Update
        if !dashboard.outcome.is_terminal() && last_tick.elapsed() >= scenario.interval {
            let report = navigator.tick(position)?;
            tick += 1;
            position = report.new_position;
            dashboard = DashboardState::from_report(tick, &report);
            if report.outcome != TickOutcome::Continue {
                info!(outcome = %report.outcome, tick, position = %position, "run halted");
            }
            last_tick = Instant::now();
        }

        // 2. Render
        terminal.draw(|f| {
            let area = f.area();
            let rows = (area.height as usize).saturating_sub(1); // -1 for HUD
            let cols = area.width as usize;

            let mut grid = compute_field_grid(field, rows, cols);

            // Overlay Agent
            if let Some((r, c)) = grid_to_screen(field, position, rows, cols) {
                if let Some(line) = grid.get_mut(r) {
                    if c < line.len() {
                        line.replace_range(c..=c, &AGENT_CHAR.to_string());
                    }
                }
            }

            draw_ui(f, grid, &dashboard.hud_line(), dashboard.outcome);
        })?;

        // 3. Input
        let timeout = if dashboard.outcome.is_terminal() {
            scenario.interval
        } else {
            scenario
                .interval
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO)
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.code == KeyCode::Char('q') {
                    return Ok(dashboard);
                }
            }
        }
    }
}
