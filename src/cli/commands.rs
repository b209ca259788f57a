//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::FamilyTreeService;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render;
use crate::cli::script::{SessionScript, StepReport, StepStatus};
use crate::config::{global_config_path, Settings};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Run { script, connectors }) => cmd_run(cli, script, *connectors),
        Some(Commands::Levels { script }) => cmd_levels(cli, script),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(cli),
            ConfigCommands::Path => cmd_config_path(),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `famtree --help`".into(),
        )),
    }
}

/// Settings from config files and env, then CLI flags on top.
fn effective_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        settings.model = model;
    }
    if let Some(style) = cli.connector_style {
        settings.connector_style = style;
    }
    Ok(settings)
}

/// Load the script and replay it on a fresh session.
///
/// Model precedence: `--model` flag, then the script's `model`, then settings.
fn replay_script(cli: &Cli, path: &Path) -> CliResult<(FamilyTreeService, Vec<StepReport>)> {
    let script = SessionScript::load(path)?;
    let mut settings = effective_settings(cli)?;
    if cli.model.is_none() {
        if let Some(model) = script.model {
            settings.model = model;
        }
    }
    debug!(
        "replay_script: {} steps, model={}",
        script.steps.len(),
        settings.model
    );
    let mut service = FamilyTreeService::new(&settings)?;
    let reports = script.replay(&mut service);
    Ok((service, reports))
}

fn print_reports(reports: &[StepReport]) {
    for report in reports {
        let line = format!("[{}] {}", report.index, report.summary);
        match &report.status {
            StepStatus::Applied => output::success(&line),
            StepStatus::AppliedWithNotices(notices) => {
                output::success(&line);
                for notice in notices {
                    output::warning(notice);
                }
            }
            StepStatus::Skipped(reason) => output::detail(&format!("{} ({})", line, reason)),
            StepStatus::Failed(reason) => {
                output::failure(&line);
                output::warning(reason);
            }
        }
    }
}

#[instrument(skip(cli))]
fn cmd_run(cli: &Cli, script: &Path, connectors: bool) -> CliResult<()> {
    let (service, reports) = replay_script(cli, script)?;
    print_reports(&reports);

    let layout = service.layout();
    output::info("");
    output::info(&render::level_tree(&service, &layout));

    if connectors {
        output::header(&format!("Connectors ({})", layout.style()));
        for connector in layout.connectors() {
            output::detail(&render::connector_line(service.tree(), connector));
        }
    }
    output::detail(&format!(
        "{} undoable step(s)",
        service.history().undo_depth()
    ));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_levels(cli: &Cli, script: &Path) -> CliResult<()> {
    let (service, reports) = replay_script(cli, script)?;
    let failed = reports
        .iter()
        .filter(|r| matches!(r.status, StepStatus::Failed(_)))
        .count();
    if failed > 0 {
        output::warning(&format!("{} step(s) failed; run `famtree run` for details", failed));
    }

    let layout = service.layout();
    for row in layout.rows() {
        output::header(&format!("{} [level {}]", row.label, row.level));
        for slot in &row.slots {
            let name = service
                .tree()
                .get(slot.member)
                .map(|m| m.name.as_str())
                .unwrap_or("?");
            output::detail(&format!("[{}] x={:.3} {}", slot.index, slot.x, name));
        }
    }
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> CliResult<()> {
    let settings = effective_settings(cli)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path() -> CliResult<()> {
    match global_config_path() {
        Some(path) => {
            output::info(&path.display());
            Ok(())
        }
        None => Err(CliError::Usage(
            "cannot determine config directory".into(),
        )),
    }
}
