//! Command dispatch: wires parsed arguments to the allocation service.

use std::io;
use std::path::PathBuf;

use clap::{Command, CommandFactory};
use clap_complete::{generate, Generator};
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::EditMode;
use crate::application::AllocationService;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::SelectionItem;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, settings: Settings) -> CliResult<()> {
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Show) => show(cli, &container),
        Some(Commands::Tree) => tree(cli, &container),
        Some(Commands::Edit {
            node,
            percent,
            set,
            distribute,
        }) => edit(
            cli,
            &container,
            node.as_deref(),
            percent.as_deref(),
            set.as_deref(),
            *distribute,
        ),
        Some(Commands::Total) => total(cli, &container),
        Some(Commands::Info) => info(cli, &container),
        Some(Commands::Completion { shell }) => {
            print_completions(*shell, &mut Cli::command());
            Ok(())
        }
        None => {
            // No subcommand: behave like `show`
            show(cli, &container)
        }
    }
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Resolve the document path: `--file` wins over the configured default.
fn document_path(cli: &Cli, container: &ServiceContainer) -> PathBuf {
    cli.file
        .clone()
        .unwrap_or_else(|| container.settings.default_file.clone())
}

fn load_service(cli: &Cli, container: &ServiceContainer) -> CliResult<AllocationService> {
    let path = document_path(cli, container);
    debug!(path = %path.display(), "loading allocation document");
    let service = AllocationService::load(container.fs.clone(), &path)?;
    Ok(service)
}

#[instrument(level = "debug", skip_all)]
fn show(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let service = load_service(cli, container)?;
    output::print_table(service.snapshot(), container.settings.precision);
    Ok(())
}

#[instrument(level = "debug", skip_all)]
fn tree(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let service = load_service(cli, container)?;
    output::print_tree(service.snapshot(), container.settings.precision);
    Ok(())
}

#[instrument(level = "debug", skip_all)]
fn edit(
    cli: &Cli,
    container: &ServiceContainer,
    node: Option<&str>,
    percent: Option<&str>,
    set: Option<&str>,
    distribute: bool,
) -> CliResult<()> {
    let (raw_input, mode) = match (percent, set) {
        (Some(raw), None) => (raw, EditMode::Percentage),
        (None, Some(raw)) => (raw, EditMode::Absolute),
        _ => {
            return Err(CliError::InvalidArgs(
                "provide exactly one of --percent or --set".to_string(),
            ))
        }
    };

    let mut service = load_service(cli, container)?;

    let target = match node {
        Some(id) => id.to_string(),
        None => select_node(&service, container)?,
    };

    service.edit(&target, raw_input, mode, distribute)?;

    output::print_table(service.snapshot(), container.settings.precision);
    output::success(&format!("updated {target}"));
    Ok(())
}

/// Interactive node selection over the flat row projection.
fn select_node(service: &AllocationService, container: &ServiceContainer) -> CliResult<String> {
    let precision = container.settings.precision;
    let items: Vec<SelectionItem> = service
        .snapshot()
        .flatten()
        .iter()
        .map(|row| SelectionItem {
            display: output::selection_display(row, precision),
            value: row.id.clone(),
        })
        .collect();

    let selected = container
        .selector
        .select_one(&items, "edit node> ")
        .map_err(|message| InfraError::Selector { message })?;

    match selected {
        Some(item) => Ok(item.value),
        None => Err(CliError::Cancelled),
    }
}

#[instrument(level = "debug", skip_all)]
fn total(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let service = load_service(cli, container)?;
    output::info(&output::format_value(
        service.snapshot().grand_total(),
        container.settings.precision,
    ));
    Ok(())
}

#[instrument(level = "debug", skip_all)]
fn info(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let service = load_service(cli, container)?;
    let summary = service.summary();
    let precision = container.settings.precision;

    output::header("Allocation document");
    output::detail(&format!("file:     {}", service.source().display()));
    output::detail(&format!("nodes:    {}", summary.nodes));
    output::detail(&format!("depth:    {}", summary.depth));
    output::detail(&format!(
        "total:    {}",
        output::format_value(summary.grand_total, precision)
    ));
    output::detail(&format!(
        "baseline: {}",
        output::format_value(summary.baseline_total, precision)
    ));

    let overall = (summary.grand_total - summary.baseline_total) / summary.baseline_total * 100.0;
    output::detail(&format!(
        "variance: {}",
        output::format_variance(overall, precision)
    ));

    output::header("Settings");
    for line in container.settings.to_toml()?.lines() {
        output::detail(line);
    }
    Ok(())
}
