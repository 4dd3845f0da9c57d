mod curriculum;
mod ipc;
mod setup;

use anyhow::{anyhow, Context};
use curriculum::fields::parse_timestamp;
use curriculum::ids::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidIds};
use curriculum::{Curriculum, ExpandedWeeks};
use setup::EditorDefaults;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CURRICULUMD_LOG";
const SETUP_ENV: &str = "CURRICULUMD_SETUP";
const IDS_ENV: &str = "CURRICULUMD_IDS";
const CLOCK_ENV: &str = "CURRICULUMD_CLOCK";

fn setup_logging() {
    // stdout carries the protocol; logs go to stderr only.
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn id_generator() -> anyhow::Result<Box<dyn IdGenerator>> {
    match std::env::var(IDS_ENV).ok().as_deref().map(str::trim) {
        None | Some("") | Some("uuid") => Ok(Box::new(UuidIds)),
        Some("sequential") => Ok(Box::new(SequentialIds::default())),
        Some(other) => Err(anyhow!("{} must be uuid or sequential, got {}", IDS_ENV, other)),
    }
}

fn clock() -> anyhow::Result<Box<dyn Clock>> {
    match std::env::var(CLOCK_ENV).ok().filter(|s| !s.trim().is_empty()) {
        None => Ok(Box::new(SystemClock)),
        Some(raw) => parse_timestamp(&raw)
            .map(|ts| Box::new(FixedClock(ts)) as Box<dyn Clock>)
            .ok_or_else(|| anyhow!("{} is not a timestamp: {}", CLOCK_ENV, raw)),
    }
}

fn build_state() -> anyhow::Result<ipc::AppState> {
    let defaults = match std::env::var_os(SETUP_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            EditorDefaults::load_file(&path)
                .with_context(|| format!("loading {}", SETUP_ENV))?
        }
        None => EditorDefaults::default(),
    };
    Ok(ipc::AppState {
        curriculum: Curriculum::new(),
        expanded: ExpandedWeeks::new(),
        defaults,
        ids: id_generator()?,
        clock: clock()?,
    })
}

fn main() {
    setup_logging();

    let mut state = match build_state() {
        Ok(s) => s,
        Err(e) => {
            error!("startup failed: {:#}", e);
            std::process::exit(2);
        }
    };
    info!(version = env!("CARGO_PKG_VERSION"), "curriculumd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to echo back.
                let _ = writeln!(stdout, "{}", ipc::err("", "bad_json", e.to_string(), None));
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
