//! Scripted wizard session for `onboard fill`
//!
//! Answers are a flat camelCase JSON object using the draft's own field
//! names. On every page the answers are laid over the current record and the
//! page's section is re-read from the result, then the wizard moves on. The
//! walk stops at the first page whose validation fails.

use crate::{record_id, required, App};
use anyhow::{Context, Result};
use clap::ArgMatches;
use onboard_record::{
    AccountSetup, AdditionalAccess, Applications, ComputerSetup, EmployeeName, MiscNotes,
    PhoneMobile, Record, RemoteAccess, Requestor, Scheduling, SoftwareAccess,
};
use onboard_store::{load_requestor_profile, DraftIndexEntry};
use onboard_wizard::{
    EmailDetails, Section, UserDetails, WizardConfig, WizardController, WizardError,
};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Keys owned by the store, never taken from answers
const PROTECTED_KEYS: &[&str] = &[
    "recordId",
    "schemaVersion",
    "status",
    "createdAt",
    "lastModified",
    "finalizedAt",
];

/// How a walk ended
#[derive(Debug)]
pub(crate) enum Outcome {
    /// Reached the last page
    Completed {
        entry: DraftIndexEntry,
        finalize_requested: bool,
    },
    /// A page refused to advance
    Stopped {
        entry: DraftIndexEntry,
        title: String,
        message: String,
    },
}

pub(crate) fn run(app: &App, args: &ArgMatches) -> Result<()> {
    let answers = match args.get_one::<std::path::PathBuf>("answers") {
        Some(path) => read_answers(path)?,
        None => Map::new(),
    };
    let config = WizardConfig::from_settings(&app.settings.get())
        .with_requestor(load_requestor_profile(&app.layout)?);
    let store = Arc::clone(&app.store);

    let wizard = if args.get_one::<String>("id").is_some() {
        WizardController::resume(store, record_id(args)?, None, &config)?
    } else {
        WizardController::start_new(
            store,
            required(args, "first")?,
            required(args, "last")?,
            &config,
        )?
    };

    let outcome = walk(&wizard, &answers, args.get_flag("finalize"));
    wizard.close()?;

    match outcome? {
        Outcome::Completed {
            entry,
            finalize_requested,
        } => {
            println!("{}  {}  saved", entry.record_id, entry.employee_name);
            if finalize_requested {
                println!("finalizing is not available; the draft was saved instead");
            }
            Ok(())
        }
        Outcome::Stopped {
            entry,
            title,
            message,
        } => anyhow::bail!(
            "{} stopped on page {} ({title}): {message}",
            entry.record_id,
            entry.last_page_index + 1,
        ),
    }
}

fn read_answers(path: &Path) -> Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read answers from {}", path.display()))?;
    match serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("{} must contain a JSON object", path.display()),
    }
}

/// Lay `answers` over `record`, leaving identity and timestamps alone
pub(crate) fn merge_answers(record: &Record, answers: &Map<String, Value>) -> Result<Record> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(fields) = &mut value {
        for (key, answer) in answers {
            if !PROTECTED_KEYS.contains(&key.as_str()) {
                fields.insert(key.clone(), answer.clone());
            }
        }
    }
    serde_json::from_value(value).context("answers do not fit the draft")
}

fn apply<S: Section>(wizard: &WizardController, answered: &Record) -> bool {
    wizard
        .edit_section::<S, _>(|fields| *fields = S::read(answered))
        .is_some()
}

/// Fill the current page from `answered`; `false` if no page type matched
fn apply_current_page(wizard: &WizardController, answered: &Record) -> bool {
    apply::<EmployeeName>(wizard, answered)
        || apply::<Scheduling>(wizard, answered)
        || apply::<UserDetails>(wizard, answered)
        || apply::<Requestor>(wizard, answered)
        || apply::<AccountSetup>(wizard, answered)
        || apply::<EmailDetails>(wizard, answered)
        || apply::<Applications>(wizard, answered)
        || apply::<ComputerSetup>(wizard, answered)
        || apply::<RemoteAccess>(wizard, answered)
        || apply::<SoftwareAccess>(wizard, answered)
        || apply::<AdditionalAccess>(wizard, answered)
        || apply::<PhoneMobile>(wizard, answered)
        || apply::<MiscNotes>(wizard, answered)
}

/// Apply answers page by page until the last page or a validation refusal
pub(crate) fn walk(
    wizard: &WizardController,
    answers: &Map<String, Value>,
    finalize: bool,
) -> Result<Outcome> {
    loop {
        let answered = merge_answers(&wizard.record(), answers)?;
        if !apply_current_page(wizard, &answered) {
            tracing::warn!(page = wizard.current_index(), "page has no answer mapping");
        }

        let nav = wizard.navigation();
        if !nav.can_go_next {
            break;
        }
        match wizard.next() {
            Ok(nav) => {
                tracing::debug!(page = nav.index, title = %nav.title, "advanced");
            }
            Err(WizardError::Validation(message)) => {
                let entry = wizard.save_and_close()?;
                return Ok(Outcome::Stopped {
                    entry,
                    title: nav.title,
                    message,
                });
            }
            Err(err) => return Err(err.into()),
        }
    }

    let finalize_requested = finalize
        && match wizard.finalize() {
            Err(WizardError::FinalizeUnavailable) => true,
            Ok(()) => false,
            Err(err) => return Err(err.into()),
        };
    let entry = wizard.save_and_close()?;
    Ok(Outcome::Completed {
        entry,
        finalize_requested,
    })
}
