mod backup;
mod clock;
mod config;
mod db;
mod entities;
mod filter;
mod form;
mod gradebook;
mod ipc;
mod notify;
mod routes;
mod sample;
mod school;
mod session;
mod settings;
mod store;

use clap::Parser;
use std::io::{self, BufRead, Write};

fn main() {
    let args = config::Args::parse();
    config::setup_tracing(&args.log);

    let school = if args.seed_sample {
        school::School::with_sample_data()
    } else {
        school::School::default()
    };
    let mut state = ipc::AppState::new(school);

    if let Some(path) = args.workspace.clone() {
        if let Err(e) = ipc::open_workspace(&mut state, path) {
            tracing::error!("failed to open workspace: {e:#}");
        }
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        seeded = args.seed_sample,
        "educored ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("stdin closed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!("bad request line: {e}");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
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
