use serde_json::{json, Value};

use crate::clock;
use crate::ipc::error::{respond, HandlerErr, HandlerResult};
use crate::ipc::helpers::{get_optional_str, get_required_str};
use crate::ipc::types::{AppState, Request};
use crate::routes;
use crate::session::{Credentials, Role, Session};

fn parse_role(raw: &str) -> Result<Role, HandlerErr> {
    Role::parse(raw).ok_or_else(|| HandlerErr {
        code: "bad_params",
        message: format!("unknown role: {}", raw),
        details: Some(json!({ "roles": Role::ALL })),
    })
}

/// Explicit `role` param, else the signed-in role.
fn role_param(state: &AppState, params: &Value) -> Result<Role, HandlerErr> {
    match get_optional_str(params, "role") {
        Some(raw) => parse_role(&raw),
        None => state
            .session
            .as_ref()
            .map(Session::role)
            .ok_or_else(|| HandlerErr::bad_params("missing role")),
    }
}

fn session_login(state: &mut AppState, params: &Value) -> HandlerResult {
    let role = parse_role(&get_required_str(params, "role")?)?;
    let credentials: Credentials = serde_json::from_value(params.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid credentials: {}", e)))?;
    let user = state
        .identity
        .sign_in(role, &credentials)
        .map_err(|e| HandlerErr::new("auth_failed", e.to_string()))?;
    let session = Session::open(user, clock::now());
    tracing::info!(role = role.as_str(), user = %session.user.name, "signed in");
    let result = json!({ "session": session });
    state.session = Some(session);
    Ok(result)
}

fn session_current(state: &mut AppState) -> HandlerResult {
    Ok(json!({ "session": state.session }))
}

fn session_logout(state: &mut AppState) -> HandlerResult {
    let was = state.session.take();
    if let Some(s) = &was {
        tracing::info!(user = %s.user.name, "signed out");
    }
    Ok(json!({ "signedOut": was.is_some(), "redirect": "/" }))
}

fn routes_resolve(params: &Value) -> HandlerResult {
    let path = get_required_str(params, "path")?;
    Ok(json!({ "path": path, "match": routes::resolve(&path) }))
}

fn routes_nav(state: &mut AppState, params: &Value) -> HandlerResult {
    let role = role_param(state, params)?;
    Ok(json!({
        "role": role,
        "label": role.label(),
        "home": routes::home_route(role),
        "links": routes::nav_for(role),
    }))
}

fn dashboard_summary(state: &mut AppState, params: &Value) -> HandlerResult {
    let role = role_param(state, params)?;
    Ok(json!({ "summary": state.school.dashboard(role) }))
}

fn notices_drain(state: &mut AppState) -> HandlerResult {
    Ok(json!({ "notices": state.notices.drain() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "session.login" => session_login(state, p),
        "session.current" => session_current(state),
        "session.logout" => session_logout(state),
        "routes.resolve" => routes_resolve(p),
        "routes.nav" => routes_nav(state, p),
        "dashboard.summary" => dashboard_summary(state, p),
        "notices.drain" => notices_drain(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
