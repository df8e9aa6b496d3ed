//! Demo entry point for `jsonstore_core`.
//!
//! # Responsibility
//! - Seed a `users` collection, list it, then exercise single and bulk delete.
//! - Keep output deterministic apart from generated user ids.

mod sample;

use clap::Parser;
use jsonstore_core::{
    core_version, default_log_level, init_console_logging, init_logging, Driver, FacadeLogger,
    Options, StoreResult,
};
use log::{error, info};
use sample::{employees, User, USERS_COLLECTION};
use std::path::PathBuf;
use std::process::ExitCode;

/// Seed, list and delete sample records in a JSON file store.
#[derive(Parser, Debug)]
#[command(name = "jsonstore", version)]
struct Args {
    /// Store root directory; created when missing.
    #[arg(long, default_value = "./db")]
    root: PathBuf,

    /// trace|debug|info|warn|error (defaults by build mode).
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when omitted.
    #[arg(long)]
    log_dir: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = args.log_level.as_deref().unwrap_or_else(|| default_log_level());
    let logging = match args.log_dir.as_deref() {
        Some(dir) => init_logging(level, dir),
        None => init_console_logging(level),
    };
    if let Err(message) = logging {
        eprintln!("jsonstore: {message}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(
                "event=demo_run module=cli status=error error_code={} error={}",
                err.code(),
                err
            );
            eprintln!("jsonstore: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> StoreResult<()> {
    info!(
        "event=demo_run module=cli status=start version={} root={}",
        core_version(),
        args.root.display()
    );
    let db = Driver::open(&args.root, Options::with_logger(FacadeLogger))?;

    for user in employees() {
        db.write(USERS_COLLECTION, &user.name, &user)?;
    }

    let records = db.read_all(USERS_COLLECTION)?;
    println!("{} raw records in `{USERS_COLLECTION}`", records.len());
    for record in &records {
        print!("{record}");
    }

    let users: Vec<User> = db.read_all_as(USERS_COLLECTION)?;
    for user in &users {
        println!(
            "{} (age {}) - {}, {}",
            user.name, user.age, user.address.city, user.address.pincode
        );
    }

    db.delete(USERS_COLLECTION, "Aron")?;
    println!(
        "deleted Aron; {} records remain",
        db.read_all(USERS_COLLECTION)?.len()
    );

    db.delete(USERS_COLLECTION, "")?;
    println!("deleted collection `{USERS_COLLECTION}`");

    info!("event=demo_run module=cli status=ok");
    Ok(())
}
