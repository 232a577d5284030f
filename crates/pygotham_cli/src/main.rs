//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `pygotham_core` linkage and print the core version.
//! - Optionally dump one event and its accepted talks as API JSON.
//!
//! Usage: `pygotham_cli [DB_PATH] [EVENT_SLUG]`
//!
//! Logs go to `$PYGOTHAM_LOG_DIR`, or `<tmp>/pygotham_cli/logs` when unset.

use pygotham_core::db::open_db;
use pygotham_core::{
    default_log_level, init_logging, ApiService, SqliteEventRepository, SqliteTalkRepository,
};
use serde_json::{json, Value};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "PYGOTHAM_LOG_DIR";

fn main() -> ExitCode {
    println!("pygotham_core version={}", pygotham_core::core_version());

    let mut args = std::env::args().skip(1);
    let (Some(db_path), Some(event_slug)) = (args.next(), args.next()) else {
        return ExitCode::SUCCESS;
    };

    let dir = log_dir();
    if let Err(err) = init_logging(default_log_level().as_str(), &dir.to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
    }

    match dump_event(&db_path, &event_slug) {
        Ok(Some(document)) => {
            println!("{document:#}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("event not found: {event_slug}");
            ExitCode::FAILURE
        }
        Err(err) => {
            log::error!("event=cli_dump module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn dump_event(db_path: &str, event_slug: &str) -> Result<Option<Value>, Box<dyn Error>> {
    let conn = open_db(db_path)?;
    let api = ApiService::new(
        SqliteEventRepository::try_new(&conn)?,
        SqliteTalkRepository::try_new(&conn)?,
    );

    let Some(event_id) = api.event_id_for_slug(event_slug)? else {
        return Ok(None);
    };

    Ok(Some(json!({
        "event": api.event(event_id)?,
        "talks": api.talks(event_id)?,
    })))
}

fn log_dir() -> PathBuf {
    match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::temp_dir().join("pygotham_cli").join("logs"),
    }
}

#[cfg(test)]
mod tests {
    use super::{log_dir, LOG_DIR_ENV};
    use std::path::Path;

    #[test]
    fn log_dir_is_absolute_for_logger_init() {
        std::env::remove_var(LOG_DIR_ENV);
        let default_dir = log_dir();
        assert!(default_dir.is_absolute());
        assert!(default_dir.ends_with(Path::new("pygotham_cli").join("logs")));

        std::env::set_var(LOG_DIR_ENV, "/var/log/pygotham");
        assert_eq!(log_dir(), Path::new("/var/log/pygotham"));
        std::env::remove_var(LOG_DIR_ENV);
    }
}
