//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `draftbox_core` linkage.
//! - Optionally print a one-line summary per repository of a database file.
//!
//! Usage: `draftbox [DB_PATH] [LOG_DIR]`
//!
//! `LOG_DIR` falls back to `DRAFTBOX_LOG_DIR`. Without either, nothing is
//! logged. The database is opened read-only and must already exist.

use draftbox_core::db::open_db_read_only;
use draftbox_core::{
    DraftService, RepoError, RepositoryService, SqliteIntroductionStore, SqliteRepositoryStore,
};
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "DRAFTBOX_LOG_DIR";

fn main() -> ExitCode {
    println!("draftbox_core ping={}", draftbox_core::ping());
    println!("draftbox_core version={}", draftbox_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        return ExitCode::SUCCESS;
    };

    let log_dir = args
        .next()
        .or_else(|| std::env::var(LOG_DIR_ENV).ok())
        .filter(|dir| !dir.trim().is_empty());
    if let Some(dir) = log_dir {
        if let Err(err) = start_logging(&dir) {
            eprintln!("draftbox warning=logging_init_failed error={err}");
        }
    }

    match print_summary(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("draftbox error={err}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(dir: &str) -> Result<(), String> {
    // Core only accepts absolute directories.
    let mut path = PathBuf::from(dir);
    if path.is_relative() {
        let cwd = std::env::current_dir().map_err(|err| err.to_string())?;
        path = cwd.join(path);
    }
    let path = path
        .to_str()
        .ok_or_else(|| format!("log dir is not valid UTF-8: {}", path.display()))?;
    draftbox_core::init_logging(draftbox_core::default_log_level(), path)
}

fn print_summary(db_path: &str) -> Result<(), RepoError> {
    let conn = open_db_read_only(db_path)?;
    let repositories = RepositoryService::new(SqliteRepositoryStore::try_new(&conn)?);
    let drafts = DraftService::new(SqliteIntroductionStore::try_new(&conn)?);

    for repository in repositories.list_repositories()? {
        let versions = drafts.list_for_repository(repository.id)?;
        let latest_version = versions.first().map_or(0, |draft| draft.version);
        println!(
            "repository id={} name={:?} deadline_ms={} drafts={} latest_version={}",
            repository.id,
            repository.name,
            repository.deadline,
            versions.len(),
            latest_version
        );
    }

    Ok(())
}
