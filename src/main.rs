#[macro_use]
mod macros;

mod cli;
mod console;
mod dashboard;
mod error;
mod export;
mod fonts;
mod forms;
mod metadata;
mod share;
mod steps;
mod storage;
mod summary;
mod types;
mod wizard;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, Settings};
use crate::console::TerminalResponder;
use crate::error::{ServiceError, ServiceResult};
use crate::share::ConfiguredShare;
use crate::steps::StepSequencer;
use crate::export::Exporter;
use crate::storage::{JsonFileRepository, MemoryRepository, SubmissionRepository};
use crate::wizard::Wizard;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = cli.settings;
    settings.validate().map_err(ServiceError::Config)?;

    let store = JsonFileRepository::new(settings.store_path());
    tracing::debug!(store = %store.path().display(), "starting {}", metadata::PKG_NAME);

    let command = cli.command.unwrap_or(Command::Wizard);
    match command {
        Command::Config => print_config(&settings, &store),
        Command::Version => println!("{} {}", metadata::PKG_NAME, metadata::PKG_VERSION),
        command if settings.dry_run => {
            let repository = MemoryRepository::with_submissions(store.load()?);
            tracing::info!("dry run: changes stay in memory");
            run(command, &repository, &settings).await?;
        }
        command => run(command, &store, &settings).await?,
    }

    Ok(())
}

async fn run<R: SubmissionRepository>(
    command: Command,
    repository: &R,
    settings: &Settings,
) -> ServiceResult<()> {
    let share_target = settings.share_target();
    let exporter = settings.exporter()?;

    match command {
        Command::Dashboard(args) => match args.action {
            Some(action) => {
                console::run_dashboard_action(action, repository, &share_target, &exporter, settings)
                    .await
            }
            None => {
                console::run_dashboard(repository, &share_target, &exporter, settings).await?;
                run_wizard(repository, &share_target, exporter, settings).await
            }
        },
        _ => run_wizard(repository, &share_target, exporter, settings).await,
    }
}

async fn run_wizard<R: SubmissionRepository>(
    repository: &R,
    share_target: &ConfiguredShare,
    exporter: Exporter,
    settings: &Settings,
) -> ServiceResult<()> {
    console::clear_screen();
    let outcome = Wizard::new(
        repository,
        share_target,
        settings.contact(),
        settings.download_path(),
    )
    .with_sequencer(StepSequencer::default().with_move_hook(console::clear_screen))
    .with_exporter(exporter)
    .run(&mut TerminalResponder::new())
    .await?;

    if let Some(id) = &outcome.submission_id {
        println!("{}", format!("Saved to the studio inbox as {id}.").green());
    }
    for path in &outcome.saved_files {
        println!("PDF saved to {}", path.display());
    }
    if outcome.completed {
        println!("{}", "Thank you! We will be in touch soon.".bold());
    }
    Ok(())
}

fn print_config(settings: &Settings, repository: &JsonFileRepository) {
    println!("store:         {}", repository.path().display());
    println!("download dir:  {}", settings.download_path().display());
    println!("studio email:  {}", settings.contact().email);
    println!("studio phone:  {}", settings.contact().phone);
    println!(
        "share command: {}",
        settings.share_command.as_deref().unwrap_or("(none, links only)")
    );
    println!("compact:       {}", settings.compact);
    println!(
        "pdf font:      {}",
        settings
            .pdf_font
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "(system default)".into())
    );
    println!("dry run:       {}", settings.dry_run);
}
