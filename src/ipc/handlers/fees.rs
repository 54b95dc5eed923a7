use serde_json::{json, Value};

use crate::entities::finance::FeeSummary;
use crate::ipc::error::{respond, HandlerErr, HandlerResult};
use crate::ipc::helpers::{get_required_str, with_notice};
use crate::ipc::types::{AppState, Request};

fn fees_collect(state: &mut AppState, params: &Value) -> HandlerResult {
    let id = get_required_str(params, "id")?;
    let amount = params
        .get("amount")
        .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .ok_or_else(|| HandlerErr::bad_params("amount must be a whole number"))?;
    let (record, applied) = state.school.collect_fee(&id, amount, &mut state.notices)?;
    tracing::info!(id = %record.id, applied, due = record.due, "fee payment recorded");
    Ok(json!({ "record": record, "applied": applied }))
}

fn fees_summary(state: &mut AppState) -> HandlerResult {
    let summary = FeeSummary::of(state.school.fees.list.records());
    Ok(json!({ "summary": summary }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let mark = state.notices.raised();
    let result = match req.method.as_str() {
        "fees.collect" => fees_collect(state, &req.params),
        "fees.summary" => fees_summary(state),
        _ => return None,
    };
    Some(respond(
        &req.id,
        result.map(|v| with_notice(v, &state.notices, mark)),
    ))
}
