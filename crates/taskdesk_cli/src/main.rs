//! Command-line front end for the record validator and store.
//!
//! # Responsibility
//! - Validate JSON documents from a file or stdin without a server.
//! - Offer a local validate-then-persist path against a SQLite file.
//!
//! # Exit codes
//! - `0` success, `1` validation failure, `2` usage/IO/storage errors.

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::warn;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taskdesk_core::db::open_db;
use taskdesk_core::validate::schema::fields_for;
use taskdesk_core::{
    core_version, default_log_level, init_logging, validate_record, Credential, LocalOperator,
    Record, RecordId, RecordKind, RecordService, ServiceError, SqliteRecordRepository,
};

/// Acting subject when neither `--as` nor `TASKDESK_SUBJECT` is given.
const DEFAULT_SUBJECT: &str = "local";

#[derive(Debug, Parser)]
#[command(name = "taskdesk", about = "Validate and store task, sub-task and todo records")]
struct Cli {
    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true, env = "TASKDESK_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true, env = "TASKDESK_LOG_DIR")]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a JSON record and print the normalized form.
    Validate {
        #[arg(long, value_enum)]
        kind: KindArg,
        /// JSON file; reads stdin when omitted.
        path: Option<PathBuf>,
    },
    /// Validate a JSON record and store it.
    Submit {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long, value_enum)]
        kind: KindArg,
        path: Option<PathBuf>,
    },
    /// Print one stored record.
    Show {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        id: RecordId,
    },
    /// List record kinds and their field rules.
    Kinds,
    /// Print the core version.
    Version,
}

#[derive(Debug, Args)]
struct StoreArgs {
    /// SQLite database file; created when missing.
    #[arg(long, env = "TASKDESK_DB")]
    db: PathBuf,
    /// Operator name recorded as the acting subject.
    #[arg(long = "as", env = "TASKDESK_SUBJECT", default_value = DEFAULT_SUBJECT)]
    subject: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Task,
    SubTask,
    Todo,
}

impl From<KindArg> for RecordKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Task => RecordKind::Task,
            KindArg::SubTask => RecordKind::SubTask,
            KindArg::Todo => RecordKind::Todo,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("taskdesk: logging disabled: {err}");
        }
    }

    match run(cli.command) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("taskdesk: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Command) -> Result<ExitCode, String> {
    match command {
        Command::Validate { kind, path } => {
            let input = read_json(path.as_deref())?;
            Ok(match validate_record(kind.into(), &input) {
                Ok(record) => print_json(&record),
                Err(failure) => {
                    print_json(&failure.to_response_body());
                    ExitCode::from(1)
                }
            })
        }
        Command::Submit { store, kind, path } => {
            let input = read_json(path.as_deref())?;
            let conn = open_db(&store.db).map_err(|err| err.to_string())?;
            let service = RecordService::new(SqliteRecordRepository::new(&conn), LocalOperator);
            let credential = Credential::new(store.subject);
            service_outcome(service.submit_record(&credential, kind.into(), &input))
        }
        Command::Show { store, kind, id } => {
            let conn = open_db(&store.db).map_err(|err| err.to_string())?;
            let service = RecordService::new(SqliteRecordRepository::new(&conn), LocalOperator);
            let credential = Credential::new(store.subject);
            service_outcome(service.fetch_record(&credential, kind.into(), id))
        }
        Command::Kinds => Ok(print_json(&kinds_report())),
        Command::Version => {
            println!("taskdesk {}", core_version());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn service_outcome(result: Result<Record, ServiceError>) -> Result<ExitCode, String> {
    match result {
        Ok(record) => Ok(print_json(&record)),
        Err(ServiceError::Validation(failure)) => {
            print_json(&failure.to_response_body());
            Ok(ExitCode::from(1))
        }
        Err(err) => {
            warn!(
                "event=cli_command module=cli status=error status_code={}",
                err.status_code()
            );
            Err(err.to_string())
        }
    }
}

fn kinds_report() -> Value {
    let kinds: Vec<Value> = RecordKind::ALL
        .iter()
        .map(|kind| {
            let fields: Vec<Value> = fields_for(*kind)
                .iter()
                .map(|spec| {
                    json!({
                        "name": spec.name,
                        "type": spec.ty.as_str(),
                        "required": spec.required,
                        "nullable": spec.nullable,
                        "min_chars": spec.min_chars,
                        "default": spec.default,
                    })
                })
                .collect();
            json!({ "kind": kind.as_str(), "fields": fields })
        })
        .collect();
    Value::Array(kinds)
}

fn read_json(path: Option<&Path>) -> Result<Value, String> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| format!("cannot read `{}`: {err}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("cannot read stdin: {err}"))?;
            buffer
        }
    };
    serde_json::from_str(&text).map_err(|err| format!("input is not valid JSON: {err}"))
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("taskdesk: cannot render output: {err}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        kinds_report, read_json, run, Cli, Command, KindArg, StoreArgs, DEFAULT_SUBJECT,
    };
    use clap::Parser;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;
    use taskdesk_core::RecordKind;

    fn json_file(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{body}").expect("write temp file");
        file
    }

    fn validate(kind: KindArg, path: &Path) -> Result<ExitCode, String> {
        run(Command::Validate {
            kind,
            path: Some(path.to_path_buf()),
        })
    }

    fn store(db: &Path) -> StoreArgs {
        StoreArgs {
            db: db.to_path_buf(),
            subject: "ops".to_string(),
        }
    }

    #[test]
    fn parses_validate_with_kind_and_path() {
        let cli = Cli::try_parse_from(["taskdesk", "validate", "--kind", "sub-task", "body.json"])
            .expect("valid arguments");
        match cli.command {
            Command::Validate { kind, path } => {
                assert_eq!(RecordKind::from(kind), RecordKind::SubTask);
                assert_eq!(path.as_deref().and_then(|p| p.to_str()), Some("body.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["taskdesk", "validate", "--kind", "order"]).is_err());
    }

    #[test]
    fn kinds_report_lists_every_kind() {
        let report = kinds_report();
        let kinds = report.as_array().expect("array report");
        assert_eq!(kinds.len(), 3);
        assert_eq!(kinds[1]["kind"], "sub_task");
        assert!(kinds[1]["fields"]
            .as_array()
            .expect("fields")
            .iter()
            .any(|field| field["name"] == "task_id" && field["required"] == true));
    }

    #[test]
    fn read_json_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ not json").expect("write temp file");
        let err = read_json(Some(file.path())).expect_err("invalid JSON must fail");
        assert!(err.contains("not valid JSON"));
    }

    #[test]
    fn validate_exits_zero_for_valid_body() {
        let file = json_file(r#"{"task_id": 1, "title": "Test Sub-Task"}"#);
        assert_eq!(validate(KindArg::SubTask, file.path()), Ok(ExitCode::SUCCESS));
    }

    #[test]
    fn validate_exits_one_for_short_title() {
        let file = json_file(r#"{"title": "A"}"#);
        assert_eq!(validate(KindArg::Task, file.path()), Ok(ExitCode::from(1)));
    }

    #[test]
    fn validate_returns_error_for_malformed_json() {
        let file = json_file("{ \"title\": ");
        let err = validate(KindArg::Todo, file.path()).expect_err("malformed JSON must fail");
        assert!(err.contains("not valid JSON"), "{err}");
    }

    #[test]
    fn validate_returns_error_for_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = validate(KindArg::Task, &dir.path().join("missing.json"))
            .expect_err("missing file must fail");
        assert!(err.contains("cannot read"), "{err}");
    }

    #[test]
    fn store_subject_defaults_to_non_blank_operator() {
        let cli = Cli::try_parse_from([
            "taskdesk", "show", "--db", "x.db", "--kind", "task", "--id", "1",
        ])
        .expect("valid arguments");
        match cli.command {
            Command::Show { store, .. } => {
                assert!(!store.subject.trim().is_empty());
                if std::env::var_os("TASKDESK_SUBJECT").is_none() {
                    assert_eq!(store.subject, DEFAULT_SUBJECT);
                }
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn submit_and_show_map_outcomes_to_exit_codes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db: PathBuf = dir.path().join("taskdesk.db");

        let body = json_file(r#"{"title": "Restock shelf"}"#);
        let stored = run(Command::Submit {
            store: store(&db),
            kind: KindArg::Task,
            path: Some(body.path().to_path_buf()),
        });
        assert_eq!(stored, Ok(ExitCode::SUCCESS));

        let short = json_file(r#"{"title": "x"}"#);
        let rejected = run(Command::Submit {
            store: store(&db),
            kind: KindArg::Todo,
            path: Some(short.path().to_path_buf()),
        });
        assert_eq!(rejected, Ok(ExitCode::from(1)));

        let shown = run(Command::Show {
            store: store(&db),
            kind: KindArg::Task,
            id: 1,
        });
        assert_eq!(shown, Ok(ExitCode::SUCCESS));

        let missing = run(Command::Show {
            store: store(&db),
            kind: KindArg::Task,
            id: 99,
        })
        .expect_err("unknown id must fail");
        assert!(missing.contains("not found"), "{missing}");
    }

    #[test]
    fn kind_arg_maps_to_record_kind() {
        assert_eq!(RecordKind::from(KindArg::Todo), RecordKind::Todo);
    }
}
