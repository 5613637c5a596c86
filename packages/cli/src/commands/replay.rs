use crate::app::AppContext;
use crate::cli::sync::ReplayArgs;
use crate::db;
use crate::error::CliError;
use crate::output;
use formsync_rs_sdk::errors::{account_not_found_error, host_data_unavailable_error};
use formsync_rs_sdk::{
    Account, Form, Host, JsonFileHost, Record, SyncError, SyncEvent, SyncOrchestrator,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::BufRead;

/// One line of the event log.
///
/// A `form:save` line without `old_form` diffs against the last definition
/// seen for that form, either in earlier lines or in the host export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event")]
pub enum EventLine {
    #[serde(rename = "form:save")]
    FormSave {
        form: Form,
        #[serde(default)]
        old_form: Option<Form>,
        #[serde(default)]
        deleted: bool,
    },
    #[serde(rename = "record:save")]
    RecordSave { record: Record },
    #[serde(rename = "record:delete")]
    RecordDelete { record: Record },
}

pub async fn run(context: &AppContext, args: ReplayArgs) -> Result<(), CliError> {
    let lines = read_event_lines(&args.events)?;
    let counts = replay(context, &args.org, &args.data, lines).await?;
    output::print_event_counts(&counts);
    Ok(())
}

/// Applies `lines` in order and returns how many events of each kind ran.
pub async fn replay(
    context: &AppContext,
    org: &str,
    data: &std::path::Path,
    lines: Vec<EventLine>,
) -> Result<Vec<(&'static str, usize)>, CliError> {
    let host = JsonFileHost::load(data)
        .map_err(|err| CliError::sync("failed to load host export", err))?;
    let account = host
        .fetch_account(org)
        .await
        .and_then(|account| account.ok_or_else(|| account_not_found_error(org)))
        .map_err(|err| CliError::sync(format!("failed to replay events for {org}"), err))?;

    let backend = db::open_backend(&context.store).await?;
    let mut orchestrator = SyncOrchestrator::new(backend, context.sync_config());
    orchestrator
        .activate()
        .await
        .map_err(|err| CliError::sync("failed to read the table catalog", err))?;

    let mut forms = FormResolver::new(&host, &account);
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();

    for (index, line) in lines.into_iter().enumerate() {
        let event = forms
            .event_for(line)
            .map_err(|err| CliError::sync(format!("event {}", index + 1), err))?;
        let name = event.name();
        let label = describe(&event);

        orchestrator
            .handle_event(&host, event)
            .await
            .map_err(|err| CliError::sync(format!("event {} ({label})", index + 1), err))?;
        *counts.entry(name).or_default() += 1;
    }

    Ok(counts.into_iter().collect())
}

pub fn parse_event_lines(source: &str, reader: impl BufRead) -> Result<Vec<EventLine>, CliError> {
    let mut lines = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::io("failed to read event log", source))?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed = serde_json::from_str(&line).map_err(|err| {
            CliError::sync(
                "failed to read event log",
                host_data_unavailable_error(&format!("{source}:{}", index + 1), &err.to_string()),
            )
        })?;
        lines.push(parsed);
    }
    Ok(lines)
}

fn read_event_lines(events: &str) -> Result<Vec<EventLine>, CliError> {
    if events == "-" {
        return parse_event_lines("stdin", std::io::stdin().lock());
    }
    let file = std::fs::File::open(events).map_err(|err| {
        CliError::sync(
            "failed to read event log",
            host_data_unavailable_error(events, &err.to_string()),
        )
    })?;
    parse_event_lines(events, std::io::BufReader::new(file))
}

fn describe(event: &SyncEvent) -> String {
    match event {
        SyncEvent::FormSaved { form, .. } => format!("form:save {}", form.name),
        SyncEvent::RecordSaved { form, record, .. }
        | SyncEvent::RecordDeleted { form, record, .. } => {
            format!("{} record {} of {}", event.name(), record.id, form.name)
        }
    }
}

/// Tracks the latest known definition of every form touched by the log.
struct FormResolver<'h> {
    host: &'h JsonFileHost,
    account: &'h Account,
    known: BTreeMap<String, Option<Form>>,
}

impl<'h> FormResolver<'h> {
    fn new(host: &'h JsonFileHost, account: &'h Account) -> Self {
        Self {
            host,
            account,
            known: BTreeMap::new(),
        }
    }

    fn current(&self, form_id: &str) -> Option<Form> {
        match self.known.get(form_id) {
            Some(known) => known.clone(),
            None => self.host.find_form(self.account, form_id).cloned(),
        }
    }

    fn event_for(&mut self, line: EventLine) -> Result<SyncEvent, SyncError> {
        let account = self.account.clone();
        match line {
            EventLine::FormSave {
                form,
                old_form,
                deleted,
            } => {
                let old_form = old_form
                    .or_else(|| self.current(&form.id))
                    .map(|old| old.version())
                    .transpose()?;
                let new_form = if deleted { None } else { Some(form.version()?) };
                self.known
                    .insert(form.id.clone(), (!deleted).then(|| form.clone()));
                Ok(SyncEvent::FormSaved {
                    account,
                    old_form,
                    new_form,
                    form,
                })
            }
            EventLine::RecordSave { record } => Ok(SyncEvent::RecordSaved {
                account,
                form: self.record_form(&record)?,
                record,
            }),
            EventLine::RecordDelete { record } => Ok(SyncEvent::RecordDeleted {
                account,
                form: self.record_form(&record)?,
                record,
            }),
        }
    }

    fn record_form(&self, record: &Record) -> Result<Form, SyncError> {
        self.current(&record.form_id).ok_or_else(|| {
            host_data_unavailable_error(
                "event log",
                &format!("record {} refers to unknown form {}", record.id, record.form_id),
            )
        })
    }
}
