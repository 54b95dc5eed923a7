//! `<kind>.<operation>` methods shared by every record list.

use serde_json::{json, Value};

use crate::form::merge_fields;
use crate::ipc::error::{respond, HandlerErr, HandlerResult};
use crate::ipc::helpers::{
    get_required_str, parse_or_default, parse_required, query_from_params, with_notice,
};
use crate::ipc::types::{AppState, Request};
use crate::notify::NoticeLog;
use crate::store::{Entity, Manager, Removal, StoreError};

fn not_found<T: Entity>(id: &str) -> HandlerErr {
    StoreError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    }
    .into()
}

fn list<T: Entity>(mgr: &Manager<T>, params: &Value) -> HandlerResult {
    let query = query_from_params(params)?;
    let items = mgr.list.filter(&query);
    Ok(json!({
        "kind": T::KIND,
        "items": items,
        "total": mgr.list.len(),
        "nextId": mgr.list.next_id(),
    }))
}

fn get<T: Entity>(mgr: &Manager<T>, params: &Value) -> HandlerResult {
    let id = get_required_str(params, "id")?;
    let record = mgr.list.get(&id).ok_or_else(|| not_found::<T>(&id))?;
    Ok(json!({ "record": record }))
}

fn create<T: Entity>(
    mgr: &mut Manager<T>,
    notices: &mut NoticeLog,
    params: &Value,
) -> HandlerResult {
    let draft: T::Draft = parse_required(params, "draft")?;
    let record = mgr.add(draft, notices)?;
    Ok(json!({ "record": record }))
}

/// Fields missing from `patch` keep their stored values.
fn update<T: Entity>(
    mgr: &mut Manager<T>,
    notices: &mut NoticeLog,
    params: &Value,
) -> HandlerResult {
    let id = get_required_str(params, "id")?;
    let patch_fields = params.get("patch").cloned().unwrap_or_else(|| json!({}));
    if !patch_fields.is_object() {
        return Err(HandlerErr::bad_params("patch must be an object"));
    }
    let patch = match mgr.list.get(&id) {
        Some(current) => merge_fields(&current.to_draft(), &patch_fields)
            .map_err(|e| HandlerErr::bad_params(format!("invalid patch: {}", e)))?,
        None => T::Draft::default(),
    };
    let record = mgr.update(&id, &patch, notices)?;
    Ok(json!({ "record": record }))
}

fn delete<T: Entity>(
    mgr: &mut Manager<T>,
    notices: &mut NoticeLog,
    params: &Value,
) -> HandlerResult {
    let id = get_required_str(params, "id")?;
    let removed = matches!(mgr.delete(&id, notices), Removal::Removed(_));
    Ok(json!({ "id": id, "removed": removed, "remaining": mgr.list.len() }))
}

fn toggle_status<T: Entity>(
    mgr: &mut Manager<T>,
    notices: &mut NoticeLog,
    params: &Value,
) -> HandlerResult {
    let id = get_required_str(params, "id")?;
    let record = mgr.toggle_status(&id, notices)?;
    Ok(json!({ "record": record }))
}

fn dialog_state<T: Entity>(mgr: &Manager<T>) -> HandlerResult {
    Ok(json!({ "dialog": mgr.dialog }))
}

fn dialog_op<T: Entity>(
    mgr: &mut Manager<T>,
    notices: &mut NoticeLog,
    op: &str,
    params: &Value,
) -> Option<HandlerResult> {
    let result = match op {
        "openCreate" => mgr.dialog.open_create().map_err(HandlerErr::from),
        "openView" => get_required_str(params, "id").and_then(|id| Ok(mgr.open_view(&id)?)),
        "edit" => mgr.dialog.begin_edit().map_err(HandlerErr::from),
        "set" => parse_or_default::<Value>(params, "fields")
            .and_then(|fields| Ok(mgr.dialog.set_fields(&fields)?)),
        "cancel" => {
            mgr.dialog.cancel();
            Ok(())
        }
        "state" => Ok(()),
        "submit" => {
            return Some(
                mgr.submit(notices)
                    .map(|record| json!({ "record": record, "dialog": mgr.dialog }))
                    .map_err(HandlerErr::from),
            )
        }
        _ => return None,
    };
    Some(result.and_then(|()| dialog_state(mgr)))
}

fn dispatch<T: Entity>(
    mgr: &mut Manager<T>,
    notices: &mut NoticeLog,
    op: &str,
    params: &Value,
) -> Option<HandlerResult> {
    if let Some(dialog) = op.strip_prefix("dialog.") {
        return dialog_op(mgr, notices, dialog, params);
    }
    let result = match op {
        "list" => list(mgr, params),
        "get" => get(mgr, params),
        "create" => create(mgr, notices, params),
        "update" => update(mgr, notices, params),
        "delete" => delete(mgr, notices, params),
        "toggleStatus" => toggle_status(mgr, notices, params),
        _ => return None,
    };
    Some(result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let (kind, op) = req.method.split_once('.')?;
    let mark = state.notices.raised();
    let school = &mut state.school;
    let notices = &mut state.notices;
    let p = &req.params;
    let result = match kind {
        "teachers" => dispatch(&mut school.teachers, notices, op, p),
        "students" => dispatch(&mut school.students, notices, op, p),
        "parents" => dispatch(&mut school.parents, notices, op, p),
        "classes" => dispatch(&mut school.classes, notices, op, p),
        "subjects" => dispatch(&mut school.subjects, notices, op, p),
        "timetable" => dispatch(&mut school.timetable, notices, op, p),
        "exams" => dispatch(&mut school.exams, notices, op, p),
        "homework" => dispatch(&mut school.homework, notices, op, p),
        "announcements" => dispatch(&mut school.announcements, notices, op, p),
        "messages" => dispatch(&mut school.messages, notices, op, p),
        "fees" => dispatch(&mut school.fees, notices, op, p),
        "enquiries" => dispatch(&mut school.enquiries, notices, op, p),
        _ => None,
    }?;
    tracing::debug!(method = %req.method, ok = result.is_ok(), "entity request");
    Some(respond(
        &req.id,
        result.map(|v| with_notice(v, &state.notices, mark)),
    ))
}
