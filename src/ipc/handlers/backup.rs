use serde_json::{json, Value};
use std::path::PathBuf;

use crate::backup;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::core::{open_workspace, save_workspace};
use crate::ipc::types::{AppState, Request};

/// The open workspace is saved first so the bundle matches what the shell shows.
fn handle_backup_export_workspace_bundle(state: &mut AppState, req: &Request) -> Value {
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing outPath", None),
    };
    let Some(workspace_path) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if let Err(e) = save_workspace(state) {
        return err(&req.id, "db_write_failed", format!("{e:#}"), None);
    }
    if let Some(conn) = state.db.as_ref() {
        let _ = conn.execute_batch("PRAGMA wal_checkpoint(FULL)");
    }

    let export = match backup::export_workspace_bundle(&workspace_path, &PathBuf::from(&out_path)) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "backup_failed",
                format!("{e:#}"),
                Some(json!({ "path": out_path })),
            )
        }
    };
    tracing::info!(path = %out_path, sha256 = %export.sha256, "workspace bundle exported");

    ok(
        &req.id,
        json!({
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count,
            "sha256": export.sha256,
        }),
    )
}

fn handle_backup_import_workspace_bundle(state: &mut AppState, req: &Request) -> Value {
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing inPath", None),
    };
    let workspace_path = req
        .params
        .get("workspacePath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .or_else(|| state.workspace.clone());
    let Some(workspace_path) = workspace_path else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return err(
            &req.id,
            "not_found",
            "bundle file not found",
            Some(json!({ "path": in_path })),
        );
    }

    let bundle = match backup::verify_workspace_bundle(&src) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "backup_failed",
                format!("{e:#}"),
                Some(json!({ "path": in_path })),
            )
        }
    };

    // Drop open handle before replacing file.
    state.db = None;
    if let Err(e) = backup::install_workspace_bundle(&bundle, &workspace_path) {
        reconnect(state);
        return err(
            &req.id,
            "backup_failed",
            format!("{e:#}"),
            Some(json!({ "path": in_path })),
        );
    }

    match open_workspace(state, workspace_path.clone()) {
        Ok(restored) => {
            tracing::info!(path = %in_path, "workspace bundle imported");
            ok(
                &req.id,
                json!({
                    "workspacePath": workspace_path.to_string_lossy(),
                    "bundleFormat": bundle.bundle_format,
                    "sha256": bundle.sha256,
                    "restoredLists": restored,
                }),
            )
        }
        Err(e) => {
            reconnect(state);
            err(&req.id, "db_open_failed", format!("{e:#}"), None)
        }
    }
}

/// Reattach the previously selected workspace without reloading its rows.
fn reconnect(state: &mut AppState) {
    let Some(path) = state.workspace.clone() else {
        return;
    };
    match db::open_db(&path) {
        Ok(conn) => state.db = Some(conn),
        Err(e) => {
            tracing::warn!(path = %path.to_string_lossy(), "workspace lost: {e:#}");
            state.workspace = None;
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "backup.exportWorkspaceBundle" => Some(handle_backup_export_workspace_bundle(state, req)),
        "backup.importWorkspaceBundle" => Some(handle_backup_import_workspace_bundle(state, req)),
        _ => None,
    }
}
