use serde_json::{json, Value};

use crate::ipc::error::{respond, HandlerErr, HandlerResult};
use crate::ipc::helpers::{get_required_str, with_notice};
use crate::ipc::types::{AppState, Request};
use crate::notify::{Notice, NotificationSink};
use crate::settings::SECTIONS;

fn settings_get(state: &mut AppState, params: &Value) -> HandlerResult {
    let settings = &state.school.settings;
    match params.get("section").and_then(|v| v.as_str()) {
        Some(name) => {
            let value = settings.section(name).ok_or_else(|| HandlerErr {
                code: "bad_params",
                message: format!("unknown settings section: {}", name),
                details: Some(json!({ "sections": SECTIONS })),
            })?;
            Ok(json!({ "section": name, "value": value }))
        }
        None => Ok(json!({ "settings": settings })),
    }
}

fn settings_update(state: &mut AppState, params: &Value) -> HandlerResult {
    let section = get_required_str(params, "section")?;
    let value = params
        .get("value")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing value"))?;
    match state.school.settings.replace_section(&section, value) {
        Ok(message) => {
            state.notices.notify(Notice::success(message));
            tracing::info!(section = %section, "settings updated");
            Ok(json!({ "section": section, "value": state.school.settings.section(&section) }))
        }
        Err(e) => {
            state.notices.notify(Notice::error(e.to_string()));
            Err(e.into())
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let mark = state.notices.raised();
    let result = match req.method.as_str() {
        "settings.get" => settings_get(state, &req.params),
        "settings.update" => settings_update(state, &req.params),
        _ => return None,
    };
    Some(respond(
        &req.id,
        result.map(|v| with_notice(v, &state.notices, mark)),
    ))
}
