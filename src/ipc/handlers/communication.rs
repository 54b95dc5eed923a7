use serde_json::{json, Value};

use crate::entities::communication::{AnnouncementDraft, EnquiryDraft, MessageDraft};
use crate::ipc::error::{respond, HandlerResult};
use crate::ipc::helpers::{get_required_str, parse_required, with_notice};
use crate::ipc::types::{AppState, Request};

fn announcements_send(state: &mut AppState, params: &Value) -> HandlerResult {
    let draft: AnnouncementDraft = parse_required(params, "draft")?;
    let record = state.school.send_announcement(draft, &mut state.notices)?;
    tracing::info!(id = %record.id, audience = ?record.target, "announcement sent");
    Ok(json!({ "record": record }))
}

fn announcements_save_draft(state: &mut AppState, params: &Value) -> HandlerResult {
    let draft: AnnouncementDraft = parse_required(params, "draft")?;
    let record = state
        .school
        .save_announcement_draft(draft, &mut state.notices)?;
    Ok(json!({ "record": record }))
}

fn announcements_publish(state: &mut AppState, params: &Value) -> HandlerResult {
    let id = get_required_str(params, "id")?;
    let record = state.school.publish_announcement(&id, &mut state.notices)?;
    tracing::info!(id = %record.id, "announcement published");
    Ok(json!({ "record": record }))
}

fn messages_send(state: &mut AppState, params: &Value) -> HandlerResult {
    let draft: MessageDraft = parse_required(params, "draft")?;
    let sender = state.session.as_ref().map(|s| &s.user);
    let record = state
        .school
        .send_message(draft, sender, &mut state.notices)?;
    Ok(json!({ "record": record }))
}

fn messages_mark_read(state: &mut AppState, params: &Value) -> HandlerResult {
    let id = get_required_str(params, "id")?;
    let record = state.school.mark_message_read(&id)?;
    Ok(json!({ "record": record, "unread": state.school.unread_messages() }))
}

fn messages_reply(state: &mut AppState, params: &Value) -> HandlerResult {
    let id = get_required_str(params, "id")?;
    let text = params
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let sender = state.session.as_ref().map(|s| &s.user);
    let record = state
        .school
        .reply_to_message(&id, sender, text, &mut state.notices)?;
    Ok(json!({ "record": record }))
}

fn messages_unread_count(state: &mut AppState) -> HandlerResult {
    Ok(json!({ "unread": state.school.unread_messages() }))
}

/// Public contact form; lands in the enquiries list.
fn contact_submit(state: &mut AppState, params: &Value) -> HandlerResult {
    let draft: EnquiryDraft = parse_required(params, "draft")?;
    let record = state.school.enquiries.add(draft, &mut state.notices)?;
    tracing::info!(id = %record.id, school = %record.school_name, "demo enquiry received");
    Ok(json!({ "record": record }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let mark = state.notices.raised();
    let p = &req.params;
    let result = match req.method.as_str() {
        "announcements.send" => announcements_send(state, p),
        "announcements.saveDraft" => announcements_save_draft(state, p),
        "announcements.publish" => announcements_publish(state, p),
        "messages.send" => messages_send(state, p),
        "messages.markRead" => messages_mark_read(state, p),
        "messages.reply" => messages_reply(state, p),
        "messages.unreadCount" => messages_unread_count(state),
        "contact.submit" => contact_submit(state, p),
        _ => return None,
    };
    Some(respond(
        &req.id,
        result.map(|v| with_notice(v, &state.notices, mark)),
    ))
}
