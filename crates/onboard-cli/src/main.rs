//! onboard - manage onboarding drafts from the command line
//!
//! Every command works on one data directory (`--data-dir` or
//! `ONBOARD_DATA_DIR`), laid out as:
//! - `Drafts/<id>_draft.json`, one file per draft
//! - `draft-index.json` and `record-index.json`
//! - `settings.json`, `customer-profile.json` and `requestor.json`, created on
//!   first use

mod fill;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use onboard_record::RecordId;
use onboard_store::{
    load_customer_profile, load_requestor_profile, save_requestor_profile, DataLayout,
    DraftIndexEntry, DraftStore, RecordLibrary, SettingsStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DATA_DIR: &str = "onboard-data";

/// Everything a command needs, opened once per invocation
pub(crate) struct App {
    pub(crate) layout: DataLayout,
    pub(crate) store: Arc<DraftStore>,
    pub(crate) settings: SettingsStore,
    pub(crate) library: RecordLibrary,
}

impl App {
    fn open(data_dir: &Path) -> Result<Self> {
        let layout = DataLayout::new(data_dir);
        layout
            .ensure_dirs()
            .with_context(|| format!("cannot prepare data directory {}", data_dir.display()))?;
        let profile = load_customer_profile(&layout)?;
        let settings = SettingsStore::open(&layout)?;
        let library = RecordLibrary::open(&layout);
        let store = Arc::new(DraftStore::open(layout.clone(), Arc::new(profile))?);
        Ok(Self {
            layout,
            store,
            settings,
            library,
        })
    }
}

fn cli() -> Command {
    Command::new("onboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Create, resume and move new-employee onboarding drafts")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .env("ONBOARD_DATA_DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_DATA_DIR)
                .help("Directory holding drafts, indexes and settings"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("new")
                .about("Create a draft for a new employee")
                .arg(Arg::new("first").required(true).help("First name"))
                .arg(Arg::new("last").required(true).help("Last name")),
        )
        .subcommand(
            Command::new("list")
                .about("List drafts, most recently modified first")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the index rows as JSON"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Print a draft as JSON")
                .arg(Arg::new("id").required(true).help("Record id")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a draft and its index row")
                .arg(Arg::new("id").required(true).help("Record id")),
        )
        .subcommand(
            Command::new("export")
                .about("Write a draft into a portable zip package")
                .arg(Arg::new("id").required(true).help("Record id"))
                .arg(
                    Arg::new("dest")
                        .long("dest")
                        .value_parser(value_parser!(PathBuf))
                        .help("Destination directory (default: last used, else current)"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import a draft package as a new draft")
                .arg(
                    Arg::new("archive")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Package to import"),
                ),
        )
        .subcommand(
            Command::new("reconcile")
                .about("Prune index rows whose draft file is gone or unreadable")
                .arg(
                    Arg::new("rebuild")
                        .long("rebuild")
                        .action(ArgAction::SetTrue)
                        .help("Also adopt draft files the index does not know about"),
                ),
        )
        .subcommand(
            Command::new("records")
                .about("List finalized records")
                .arg(
                    Arg::new("verify")
                        .long("verify")
                        .action(ArgAction::SetTrue)
                        .help("Check that each exported JSON file still exists"),
                ),
        )
        .subcommand(
            Command::new("requestor")
                .about("Show or update the requestor offered to new drafts")
                .args(["name", "title", "phone", "email", "department"].map(|field| {
                    Arg::new(field)
                        .long(field)
                        .help(format!("Set the requestor {field}"))
                })),
        )
        .subcommand(
            Command::new("fill")
                .about("Walk the wizard pages, applying answers from a JSON file")
                .arg(Arg::new("id").long("id").help("Resume this draft instead of creating one"))
                .arg(
                    Arg::new("first")
                        .long("first")
                        .required_unless_present("id")
                        .help("First name for a new draft"),
                )
                .arg(
                    Arg::new("last")
                        .long("last")
                        .required_unless_present("id")
                        .help("Last name for a new draft"),
                )
                .arg(
                    Arg::new("answers")
                        .long("answers")
                        .value_parser(value_parser!(PathBuf))
                        .help("Record fields (camelCase JSON object) to enter on each page"),
                )
                .arg(
                    Arg::new("finalize")
                        .long("finalize")
                        .action(ArgAction::SetTrue)
                        .help("Request finalization on the last page"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

pub(crate) fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a String> {
    args.get_one::<String>(name)
        .with_context(|| format!("missing <{name}>"))
}

pub(crate) fn record_id(args: &ArgMatches) -> Result<RecordId> {
    let raw = required(args, "id")?;
    raw.parse()
        .with_context(|| format!("'{raw}' is not a record id"))
}

fn print_entry(entry: &DraftIndexEntry) {
    println!(
        "{}  {:<28}  page {:>2}  {}",
        entry.record_id,
        entry.employee_name,
        entry.last_page_index + 1,
        entry.last_modified.format("%Y-%m-%d %H:%M"),
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let data_dir = matches
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let app = App::open(&data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), "data directory opened");

    match matches.subcommand() {
        Some(("new", args)) => {
            let record = app
                .store
                .create(required(args, "first")?, required(args, "last")?, 0)?;
            println!("{}  {}", record.id(), record.display_name());
        }
        Some(("list", args)) => {
            let entries = app.store.list_all()?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("no drafts");
            } else {
                entries.iter().for_each(print_entry);
            }
        }
        Some(("show", args)) => {
            let id = record_id(args)?;
            let record = app
                .store
                .load(id)?
                .with_context(|| format!("no draft with id {id}"))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Some(("delete", args)) => {
            let id = record_id(args)?;
            app.store.delete(id)?;
            println!("deleted {id}");
        }
        Some(("export", args)) => {
            let id = record_id(args)?;
            let dest = match args.get_one::<PathBuf>("dest") {
                Some(dir) => dir.clone(),
                None => match app.settings.get().last_draft_export_directory {
                    Some(dir) => dir,
                    None => std::env::current_dir().context("cannot resolve current directory")?,
                },
            };
            let package = app.store.export_package(id, &dest)?;
            app.settings.remember_export_dir(&dest)?;
            println!("{}", package.display());
        }
        Some(("import", args)) => {
            let archive = args
                .get_one::<PathBuf>("archive")
                .context("missing <archive>")?;
            let record = app.store.import_package(archive)?;
            if let Some(dir) = archive.parent().filter(|p| !p.as_os_str().is_empty()) {
                app.settings.remember_import_dir(dir)?;
            }
            println!("{}  {}", record.id(), record.display_name());
        }
        Some(("reconcile", args)) => {
            let report = app.store.reconcile()?;
            for (id, reason) in &report.pruned {
                println!("pruned {id} ({reason:?})");
            }
            println!("{} draft(s) kept", report.kept);
            if args.get_flag("rebuild") {
                let adopted = app.store.rebuild_index()?;
                println!("index rebuilt with {adopted} draft(s)");
            }
        }
        Some(("records", args)) => {
            if args.get_flag("verify") {
                let report = app.library.verify()?;
                println!("{} present, {} missing", report.present, report.missing.len());
                for id in &report.missing {
                    println!("missing {id}");
                }
            }
            for entry in app.library.list()? {
                println!(
                    "{}  {:<28}  {:<16}  {}{}",
                    entry.record_id,
                    entry.employee_name,
                    entry.department,
                    entry.finalized_at.format("%Y-%m-%d"),
                    if entry.last_verified { "" } else { "  (missing)" },
                );
            }
        }
        Some(("requestor", args)) => {
            let mut profile = load_requestor_profile(&app.layout)?;
            let mut changed = false;
            for (field, slot) in [
                ("name", &mut profile.name),
                ("title", &mut profile.title),
                ("phone", &mut profile.phone),
                ("email", &mut profile.email),
                ("department", &mut profile.department),
            ] {
                if let Some(value) = args.get_one::<String>(field) {
                    *slot = value.trim().to_string();
                    changed = true;
                }
            }
            if changed {
                save_requestor_profile(&app.layout, &profile)?;
            }
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Some(("fill", args)) => fill::run(&app, args)?,
        Some((other, _)) => anyhow::bail!("unknown command {other}"),
        None => anyhow::bail!("no command given"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn fill_needs_a_name_or_an_id() {
        assert!(cli().try_get_matches_from(["onboard", "fill"]).is_err());
        assert!(cli()
            .try_get_matches_from(["onboard", "fill", "--first", "Jane", "--last", "Smith"])
            .is_ok());
        assert!(cli()
            .try_get_matches_from(["onboard", "fill", "--id", "abc"])
            .is_ok());
    }

    #[test]
    fn requestor_fields_are_optional_flags() {
        let matches = cli()
            .try_get_matches_from(["onboard", "requestor", "--name", "Pat", "--phone", "555"])
            .unwrap();
        let Some(("requestor", args)) = matches.subcommand() else {
            panic!("expected requestor");
        };
        assert_eq!(args.get_one::<String>("name").map(String::as_str), Some("Pat"));
        assert!(args.get_one::<String>("title").is_none());
    }

    #[test]
    fn data_dir_is_global() {
        let matches = cli()
            .try_get_matches_from(["onboard", "list", "--data-dir", "/tmp/x"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("data-dir"),
            Some(&PathBuf::from("/tmp/x"))
        );
    }

    #[test]
    fn malformed_ids_are_rejected() {
        let matches = cli()
            .try_get_matches_from(["onboard", "show", "not-a-uuid"])
            .unwrap();
        let Some(("show", args)) = matches.subcommand() else {
            panic!("expected show");
        };
        assert!(record_id(args).is_err());
    }
}
