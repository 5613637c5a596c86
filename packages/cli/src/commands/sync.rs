use crate::app::AppContext;
use crate::cli::sync::SyncArgs;
use crate::db;
use crate::error::CliError;
use crate::output::{self, StatusLine};
use formsync_rs_sdk::{Form, JsonFileHost, SyncOrchestrator, SyncReport};
use std::path::Path;

pub async fn run(context: &AppContext, args: SyncArgs) -> Result<(), CliError> {
    if args.setup {
        let created = db::setup_database(&context.store).await?;
        let verb = if created { "created" } else { "already exists:" };
        println!("{verb} {}", context.store.describe());
        return Ok(());
    }

    let org = args.org.ok_or(CliError::InvalidArgs("sync needs --org"))?;
    let data = args.data.ok_or(CliError::InvalidArgs("sync needs --data"))?;

    let report = sync_org(context, &org, &data).await?;
    output::print_sync_report(&report);
    Ok(())
}

/// Rebuilds every active form of `org`, reporting progress on the status line.
pub async fn sync_org(context: &AppContext, org: &str, data: &Path) -> Result<SyncReport, CliError> {
    let host = JsonFileHost::load(data)
        .map_err(|err| CliError::sync("failed to load host export", err))?;
    let backend = db::open_backend(&context.store).await?;

    let mut orchestrator = SyncOrchestrator::new(backend, context.sync_config());
    orchestrator
        .activate()
        .await
        .map_err(|err| CliError::sync("failed to read the table catalog", err))?;

    let mut status = StatusLine::stdout();
    let result = orchestrator
        .sync_account(&host, org, &mut |form: &Form, count: usize| {
            status.update(&format!("{}: {count} records", form.name));
        })
        .await;
    status.finish();

    result.map_err(|err| CliError::sync(format!("failed to sync organization {org}"), err))
}
