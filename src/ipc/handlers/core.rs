use anyhow::Context;
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::clock;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::school::KINDS;

const SETTINGS_KEY: &str = "settings";
const GRADEBOOK_KEY: &str = "gradebook";

/// Open (or create) a workspace and load whatever it has saved into the
/// in-memory school. Lists without a saved snapshot keep their current rows.
/// Nothing changes in `state` unless every saved snapshot decodes.
pub fn open_workspace(state: &mut AppState, path: PathBuf) -> anyhow::Result<usize> {
    let conn = db::open_db(&path)?;
    let mut school = state.school.clone();
    let mut restored = 0;
    for (kind, payload) in db::load_lists(&conn)? {
        if school
            .restore_list(&kind, payload)
            .with_context(|| format!("snapshot for {kind} does not match its record shape"))?
        {
            restored += 1;
        }
    }
    if let Some(v) = db::settings_get_json(&conn, SETTINGS_KEY)? {
        school.settings = serde_json::from_value(v).context("saved settings are invalid")?;
    }
    if let Some(v) = db::settings_get_json(&conn, GRADEBOOK_KEY)? {
        school.gradebook = serde_json::from_value(v).context("saved gradebook is invalid")?;
    }
    tracing::info!(path = %path.to_string_lossy(), restored, "workspace opened");
    state.school = school;
    state.workspace = Some(path);
    state.db = Some(conn);
    Ok(restored)
}

pub fn save_workspace(state: &mut AppState) -> anyhow::Result<usize> {
    let Some(conn) = state.db.as_mut() else {
        anyhow::bail!("no workspace selected");
    };
    let lists = state.school.list_snapshots()?;
    let saved = db::save_lists(conn, &lists, &clock::stamp_text(clock::now()))?;
    db::settings_set_json(conn, SETTINGS_KEY, &serde_json::to_value(&state.school.settings)?)?;
    db::settings_set_json(conn, GRADEBOOK_KEY, &serde_json::to_value(&state.school.gradebook)?)?;
    tracing::info!(lists = saved, "workspace saved");
    Ok(saved)
}

fn handle_health(state: &mut AppState, req: &Request) -> Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "signedIn": state.session.is_some(),
            "kinds": KINDS,
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match open_workspace(state, path.clone()) {
        Ok(restored) => ok(
            &req.id,
            json!({ "workspacePath": path.to_string_lossy(), "restoredLists": restored }),
        ),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:#}"), None),
    }
}

fn handle_workspace_save(state: &mut AppState, req: &Request) -> Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    match save_workspace(state) {
        Ok(saved) => ok(&req.id, json!({ "savedLists": saved })),
        Err(e) => err(&req.id, "db_write_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "workspace.save" => Some(handle_workspace_save(state, req)),
        _ => None,
    }
}
