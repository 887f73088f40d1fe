//! `hrsync` entry point: runs one synchronization operation against both stores.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use hrsync::config::SyncSettings;
use hrsync::domain::ports::{HumanStore, PayrollStore};
use hrsync::domain::sync::SyncService;
use hrsync::domain::{EntityKind, Error, StoreName};
use hrsync::outbound::persistence::{
    DbPool, DieselHumanStore, DieselPayrollStore, run_pending,
};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `hrsync` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "hrsync",
    about = "Keep employees, departments and positions consistent across the HR and payroll databases",
    version
)]
struct CliArgs {
    /// Human-resources database URL. Overrides `HRSYNC_HUMAN_DATABASE_URL`.
    #[arg(long, value_name = "url", global = true)]
    human_database_url: Option<String>,
    /// Payroll database URL. Overrides `HRSYNC_PAYROLL_DATABASE_URL`.
    #[arg(long, value_name = "url", global = true)]
    payroll_database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations to both stores.
    Migrate,
    #[command(flatten)]
    Sync(SyncCommand),
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
enum SyncCommand {
    /// Print the next free identifier for a kind.
    Allocate { kind: EntityKind },
    /// Create an entity in both stores from a camelCase JSON object.
    Create {
        kind: EntityKind,
        #[arg(value_parser = parse_payload)]
        payload: Value,
    },
    /// Apply the fields present in a camelCase JSON object to both copies.
    Update {
        kind: EntityKind,
        id: i32,
        #[arg(value_parser = parse_payload)]
        payload: Value,
    },
    /// Delete an entity from every store holding it, unless dependents remain.
    Delete { kind: EntityKind, id: i32 },
    /// List the records that would block deleting an entity.
    Dependents { kind: EntityKind, id: i32 },
    /// Report which stores hold an entity and which shared fields differ.
    Inspect { kind: EntityKind, id: i32 },
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: CliArgs) -> Result<ExitCode> {
    let settings = SyncSettings::load_from_iter([OsString::from("hrsync")])
        .map_err(|err| eyre!("load settings: {err}"))?
        .with_overrides(args.human_database_url, args.payroll_database_url);

    match args.command {
        Command::Migrate => migrate(&settings).await,
        Command::Sync(command) => {
            let service = connect(&settings).await?;
            Ok(report(execute(&service, command).await))
        }
    }
}

async fn migrate(settings: &SyncSettings) -> Result<ExitCode> {
    let mut applied = Map::new();
    for store in [StoreName::Human, StoreName::Payroll] {
        let url = settings.database_url(store)?.to_owned();
        let versions = tokio::task::spawn_blocking(move || run_pending(store, &url))
            .await
            .wrap_err("migration task panicked")??;
        applied.insert(store.to_string(), json!(versions));
    }
    println!("{:#}", json!({ "applied": applied }));
    Ok(ExitCode::SUCCESS)
}

async fn connect(
    settings: &SyncSettings,
) -> Result<SyncService<DieselHumanStore, DieselPayrollStore>> {
    let human = DbPool::new(settings.pool_config(StoreName::Human)?)
        .await
        .wrap_err("create human database pool")?;
    let payroll = DbPool::new(settings.pool_config(StoreName::Payroll)?)
        .await
        .wrap_err("create payroll database pool")?;
    Ok(SyncService::new(
        Arc::new(DieselHumanStore::new(human)),
        Arc::new(DieselPayrollStore::new(payroll)),
        Arc::new(DefaultClock),
    ))
}

async fn execute<H, P>(service: &SyncService<H, P>, command: SyncCommand) -> Result<Value, Error>
where
    H: HumanStore,
    P: PayrollStore,
{
    match command {
        SyncCommand::Allocate { kind } => {
            let id = service.allocate_identifier(kind).await?;
            Ok(json!({ "kind": kind, "id": id }))
        }
        SyncCommand::Create { kind, payload } => {
            render(&service.create_entity(kind, payload).await?)
        }
        SyncCommand::Update { kind, id, payload } => {
            render(&service.update_entity(kind, id, payload).await?)
        }
        SyncCommand::Delete { kind, id } => render(&service.delete_entity(kind, id).await?),
        SyncCommand::Dependents { kind, id } => {
            let dependents = service.dependents(kind, id).await?;
            Ok(json!({ "kind": kind, "id": id, "dependents": dependents }))
        }
        SyncCommand::Inspect { kind, id } => render(&service.inspect_entity(kind, id).await?),
    }
}

fn render<T: Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value)
        .map_err(|err| Error::internal(format!("failed to render result: {err}")))
}

fn report(result: Result<Value, Error>) -> ExitCode {
    match result {
        Ok(value) => {
            println!("{value:#}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            match serde_json::to_value(&error) {
                Ok(body) => println!("{:#}", json!({ "error": body })),
                Err(_) => eprintln!("{error}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn parse_payload(raw: &str) -> Result<Value, String> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| format!("payload is not valid JSON: {err}"))?;
    if !value.is_object() {
        return Err("payload must be a JSON object".to_owned());
    }
    Ok(value)
}
