use std::sync::Arc;

use anyhow::Context;
use catsync_gate::{ConfirmationGate, StaticGate};
use catsync_store::{InMemoryRecordStore, PartitionDirectory, RecordStoreExt, Scope};
use catsync_sync::{
    LineLevel, RunStatus, SyncAction, SyncConfig, SyncEngine, SyncReport, SyncRequest, SyncTrigger,
};
use catsync_types::{CatalogEntry, OwnerId, PartitionId, RecordId, UserId};
use colored::Colorize;

use crate::cli::*;
use crate::fixture::Fixture;
use crate::prompt;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };
    let store = Arc::new(Fixture::load(&cli.fixture)?.into_store()?);

    match &cli.command {
        Command::Partitions(args) => cmd_partitions(&store, args, cli.format).await?,
        Command::Sync(args) => cmd_sync(&store, &config, args, cli.format).await?,
        Command::OnSave(args) => cmd_on_save(&store, &config, args, cli.format).await?,
    }

    if cli.dump {
        println!("{}", serde_json::to_string_pretty(&Fixture::snapshot(&store))?);
    }
    if cli.write {
        Fixture::snapshot(&store).save(&cli.fixture)?;
        println!("{} Saved {}", "✓".green(), cli.fixture.display());
    }
    Ok(())
}

async fn cmd_partitions(store: &InMemoryRecordStore, args: &PartitionsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let owner = OwnerId::parse(args.owner.as_str())?;
    let partitions = store.partitions_of(&owner).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&partitions)?),
        OutputFormat::Text => {
            if partitions.is_empty() {
                println!("No partitions for {}.", owner.to_string().bold());
            }
            for p in &partitions {
                let entries = store.count(&Scope::catalog(&p.id));
                println!("  {}  {}  ({} entries)", p.id.to_string().yellow(), p.display_name.bold(), entries);
            }
        }
    }
    Ok(())
}

fn gate_for(answers: AnswerArgs, config: &SyncConfig) -> Arc<dyn ConfirmationGate> {
    if answers.accept_all {
        Arc::new(StaticGate::accept_all())
    } else if answers.decline_all {
        Arc::new(StaticGate::decline_all())
    } else {
        prompt::terminal_gate(config.gate.clone())
    }
}

struct Target {
    partition: PartitionId,
    entry: RecordId,
    owner: OwnerId,
    user: UserId,
}

fn parse_target(args: &TargetArgs) -> anyhow::Result<Target> {
    Ok(Target {
        partition: PartitionId::parse(args.partition.as_str())?,
        entry: RecordId::parse(args.entry.as_str())?,
        owner: OwnerId::parse(args.owner.as_str())?,
        user: UserId::parse(args.user.as_str())?,
    })
}

fn trigger_for(store: &Arc<InMemoryRecordStore>, answers: AnswerArgs, config: &SyncConfig) -> SyncTrigger {
    SyncTrigger::new(SyncEngine::with_backend(store.clone(), gate_for(answers, config)))
}

async fn cmd_sync(
    store: &Arc<InMemoryRecordStore>,
    config: &SyncConfig,
    args: &SyncArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let t = parse_target(&args.target)?;
    let trigger = trigger_for(store, args.answers, config);
    let report = trigger
        .sync_now(&t.partition, &t.entry, &t.owner, &t.user)
        .await?;
    print_report(&report, format)
}

async fn cmd_on_save(
    store: &Arc<InMemoryRecordStore>,
    config: &SyncConfig,
    args: &OnSaveArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let t = parse_target(&args.target)?;
    let entry: CatalogEntry = store
        .get_as(&Scope::catalog(&t.partition), &t.entry)
        .await?
        .with_context(|| format!("entry {} not found in partition {}", t.entry, t.partition))?;

    let mut request = SyncRequest::new(t.partition, entry, t.owner, t.user);
    if let Some(original) = &args.original_code {
        request = request.with_original_code(Some(original.as_str()));
    }
    let prefs = config.preferences(&request.owner);

    let trigger = trigger_for(store, args.answers, config);
    let report = trigger.on_entry_saved(request, &prefs).await?;
    print_report(&report, format)
}

fn print_report(report: &SyncReport, format: OutputFormat) -> anyhow::Result<()> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for line in report.transcript.lines() {
        let prefix = match line.level {
            LineLevel::Info => "·".dimmed(),
            LineLevel::Warn => "warning:".yellow().bold(),
            LineLevel::Error => "error:".red().bold(),
        };
        match &line.partition {
            Some(p) => println!("{prefix} [{}] {}", p.cyan(), line.message),
            None => println!("{prefix} {}", line.message),
        }
    }

    match report.status {
        RunStatus::Disabled => println!("{} Propagation on save is off.", "-".yellow()),
        RunStatus::NoSiblingPartitions => println!("{} No other partitions to update.", "-".yellow()),
        RunStatus::Completed => {
            println!();
            for o in &report.outcomes {
                let mark = match o.action {
                    SyncAction::Created | SyncAction::Updated => "✓".green().bold(),
                    SyncAction::Skipped => "-".yellow().bold(),
                    SyncAction::Failed => "✗".red().bold(),
                };
                println!("{mark} {:<20} {:<8} {}", o.partition_name.bold(), o.action.label(), o.message);
                for w in &o.warnings {
                    println!("    {} {w}", "!".yellow());
                }
            }
            let failed = report.count(SyncAction::Failed);
            let summary = format!("{} partition(s) touched", report.touched());
            if failed > 0 {
                println!("{summary}, {}", format!("{failed} failed").red());
            } else {
                println!("{}", summary.green());
            }
            if let Some(root) = &report.root_id {
                println!("  Root id: {}", root.to_string().dimmed());
            }
        }
    }
    Ok(())
}
