//! Command dispatch

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime;
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::application::runtime::{self as demo_runtime, DemoHandle, Outcome};
use crate::application::{DemoState, Snapshot};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::play::{PlayCommand, HELP};
use crate::config::{global_config_path, Settings};
use crate::domain::{Forest, ForestBuilder, NodeId};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{InfraError, IoResultExt};
use crate::render::{render_text, to_svg, RenderAdapter, Scene};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Build {
            leaves,
            format,
            output,
            salt,
            select,
        } => {
            let settings = load_settings(cli)?;
            cmd_build(settings, *leaves, *format, output.as_deref(), *salt, *select)
        }
        Commands::Demo { max, interval_ms } => {
            let mut settings = load_settings(cli)?;
            if let Some(max) = max {
                settings.demo.auto_max_leaves = *max;
            }
            if let Some(interval_ms) = interval_ms {
                settings.demo.auto_interval_ms = *interval_ms;
            }
            settings.validate()?;
            cmd_demo(settings)
        }
        Commands::Play => cmd_play(load_settings(cli)?),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cmd_config_show(&load_settings(cli)?),
            ConfigCommands::Path => cmd_config_path(cli.config.as_deref()),
            ConfigCommands::Init { force } => cmd_config_init(cli.config.as_deref(), *force),
        },
        Commands::Completion { shell } => cmd_completion(*shell),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    Ok(Settings::load(cli.config.as_deref())?)
}

fn current_thread_runtime() -> CliResult<runtime::Runtime> {
    runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| InfraError::io("start async runtime", e).into())
}

// ============================================================
// build
// ============================================================

#[derive(Serialize)]
struct BuildReport<'a> {
    forest: &'a Forest,
    scene: Scene,
}

#[instrument(skip(settings))]
fn cmd_build(
    settings: Settings,
    leaves: usize,
    format: OutputFormat,
    output_path: Option<&Path>,
    salt: Option<u64>,
    select: Option<NodeId>,
) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let builder = match salt {
        Some(salt) => ForestBuilder::new(container.settings.layout).with_salt(salt),
        None => container.builder(),
    };
    let forest = builder.build(leaves);
    forest.validate()?;

    if let Some(id) = select.filter(|id| !forest.contains(id)) {
        output::warning(&format!("{id} is not part of a forest with {leaves} leaves"));
    }

    let adapter = RenderAdapter::new(&forest, select);
    let rendered = match format {
        OutputFormat::Text => text_report(&adapter),
        OutputFormat::Json => {
            let report = BuildReport {
                forest: &forest,
                scene: adapter.scene(),
            };
            let mut json =
                serde_json::to_string_pretty(&report).map_err(|source| InfraError::Json {
                    what: "forest".into(),
                    source,
                })?;
            json.push('\n');
            json
        }
        OutputFormat::Svg => to_svg(&adapter.scene(), builder.canvas()),
    };

    match output_path {
        Some(path) => {
            fs::write(path, rendered).with_path_context("write", path)?;
            output::success(&format!("wrote {}", path.display()));
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn text_report(adapter: &RenderAdapter<'_>) -> String {
    let mut out = format!("{}\n", adapter.stats());
    out.push_str(&render_text(adapter.forest()));
    if let Some(details) = adapter.details() {
        out.push('\n');
        out.push_str(&details.to_string());
    }
    out
}

// ============================================================
// demo
// ============================================================

#[instrument(skip(settings))]
fn cmd_demo(settings: Settings) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    current_thread_runtime()?.block_on(run_demo(&container))
}

async fn run_demo(container: &ServiceContainer) -> CliResult<()> {
    let (handle, mut snapshots) = demo_runtime::spawn(container.controller(), container.timing());
    let mut shown = Arc::clone(&snapshots.borrow_and_update().forest);

    output::header(&format!(
        "Auto-sequence up to {} leaves",
        container.settings.demo.auto_max_leaves
    ));
    report(handle.start_auto_sequence().await?);

    let mut step = 0;
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if !Arc::ptr_eq(&shown, &snapshot.forest) {
                    step += 1;
                    print_step(step, &snapshot);
                    shown = Arc::clone(&snapshot.forest);
                }
                if snapshot.state == DemoState::Idle {
                    output::success("auto-sequence finished");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                report(handle.stop_auto_sequence().await?);
                output::warning("auto-sequence stopped");
                break;
            }
        }
    }
    Ok(())
}

fn print_step(step: usize, snapshot: &Snapshot) {
    let adapter = RenderAdapter::new(&snapshot.forest, snapshot.selected);
    output::action(&format!("step {step}"), &adapter.stats());
    print!("{}", render_text(&snapshot.forest));
}

// ============================================================
// play
// ============================================================

#[instrument(skip(settings))]
fn cmd_play(settings: Settings) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    current_thread_runtime()?.block_on(run_play(&container))
}

async fn run_play(container: &ServiceContainer) -> CliResult<()> {
    let (handle, snapshots) = demo_runtime::spawn(container.controller(), container.timing());
    show(&handle.snapshot().await?);
    tokio::spawn(announce_changes(snapshots));

    output::info("type 'help' for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output::prompt("forestviz>");
        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| InfraError::io("read stdin", e))?
        else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<PlayCommand>() {
            Ok(PlayCommand::Quit) => break,
            Ok(command) => dispatch(&handle, command).await?,
            Err(e) => output::warning(&e),
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(handle))]
async fn dispatch(handle: &DemoHandle, command: PlayCommand) -> CliResult<()> {
    match command {
        PlayCommand::Add => report(handle.add_leaf().await?.map(|_| ())),
        PlayCommand::Remove => report(handle.remove_leaf().await?.map(|_| ())),
        PlayCommand::Reset => report(handle.reset().await?),
        PlayCommand::Auto => report(handle.start_auto_sequence().await?),
        PlayCommand::Stop => report(handle.stop_auto_sequence().await?),
        PlayCommand::Select(id) => {
            report(handle.select_node(Some(id)).await?);
            print_details(&handle.snapshot().await?);
        }
        PlayCommand::Toggle(id) => {
            report(handle.toggle_node(id).await?);
            print_details(&handle.snapshot().await?);
        }
        PlayCommand::Clear => report(handle.select_node(None).await?),
        PlayCommand::Show => show(&handle.snapshot().await?),
        PlayCommand::Help => output::info(HELP),
        PlayCommand::Quit => {}
    }
    Ok(())
}

/// Rejections are not errors: tell the user and carry on.
fn report(outcome: Outcome<()>) {
    if let Err(reason) = outcome {
        debug!(%reason, "request rejected");
        output::warning(&reason);
    }
}

/// Prints a one-line summary whenever the forest is replaced.
async fn announce_changes(mut snapshots: watch::Receiver<Snapshot>) {
    let mut shown = Arc::clone(&snapshots.borrow_and_update().forest);
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        if !Arc::ptr_eq(&shown, &snapshot.forest) {
            let stats = RenderAdapter::new(&snapshot.forest, None).stats();
            output::success_detail(&format!("[{}] {}", snapshot.state, stats));
            shown = Arc::clone(&snapshot.forest);
        }
    }
}

fn show(snapshot: &Snapshot) {
    let adapter = RenderAdapter::new(&snapshot.forest, snapshot.selected);
    output::header(&format!("{} ({})", adapter.stats(), snapshot.state));
    print!("{}", render_text(&snapshot.forest));
    print_details(snapshot);
}

fn print_details(snapshot: &Snapshot) {
    if let Some(details) = RenderAdapter::new(&snapshot.forest, snapshot.selected).details() {
        output::header("Node Details");
        for line in details.to_string().lines() {
            output::detail(line);
        }
    }
}

// ============================================================
// config
// ============================================================

fn cmd_config_show(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(explicit: Option<&Path>) -> CliResult<()> {
    let mark = |path: &Path| if path.exists() { "exists" } else { "not found" };
    match global_config_path() {
        Some(path) => output::action("global", &format!("{} ({})", path.display(), mark(path.as_path()))),
        None => output::warning("no home directory, global config disabled"),
    }
    if let Some(path) = explicit {
        output::action("file", &format!("{} ({})", path.display(), mark(path)));
    }
    Ok(())
}

#[instrument]
fn cmd_config_init(explicit: Option<&Path>, force: bool) -> CliResult<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => global_config_path()
            .ok_or_else(|| CliError::Usage("no home directory, pass --config FILE".into()))?,
    };
    if path.exists() && !force {
        return Err(CliError::Usage(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_path_context("create directory", dir)?;
    }
    fs::write(&path, Settings::template()).with_path_context("write", &path)?;
    output::success(&format!("created {}", path.display()));
    Ok(())
}

// ============================================================
// completion
// ============================================================

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
