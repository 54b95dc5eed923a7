use chrono::Duration;
use serde_json::{json, Value};

use crate::clock;
use crate::gradebook::{AttendanceStatus, RosterEntry};
use crate::ipc::error::{respond, HandlerErr, HandlerResult};
use crate::ipc::helpers::{
    get_required_date, get_required_str, parse_or_default, query_from_params, with_notice,
};
use crate::ipc::types::{AppState, Request};
use crate::notify::{Notice, NotificationSink};
use crate::school::School;

/// Explicit `students` param, or everyone in the students list with that class.
fn roster_for(
    school: &School,
    class: &str,
    params: &Value,
) -> Result<Vec<RosterEntry>, HandlerErr> {
    if params.get("students").is_some_and(|v| !v.is_null()) {
        return parse_or_default(params, "students");
    }
    let mut roster: Vec<RosterEntry> = school
        .students
        .list
        .records()
        .iter()
        .filter(|s| s.class == class)
        .map(|s| RosterEntry {
            id: s.id.clone(),
            name: s.name.clone(),
            roll_no: s.roll_no,
        })
        .collect();
    roster.sort_by_key(|r| r.roll_no);
    Ok(roster)
}

fn marks_roster(state: &mut AppState, params: &Value) -> HandlerResult {
    let class = get_required_str(params, "class")?;
    let roster = roster_for(&state.school, &class, params)?;
    let count = state.school.gradebook.set_marks_roster(&class, roster);
    Ok(json!({ "class": class, "students": count }))
}

fn marks_set(state: &mut AppState, params: &Value) -> HandlerResult {
    let class = get_required_str(params, "class")?;
    let student_id = get_required_str(params, "studentId")?;
    let exam_id = get_required_str(params, "examId")?;
    let marks = match params.get("marks") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_f64()
                .ok_or_else(|| HandlerErr::bad_params("marks must be a number or null"))?,
        ),
    };
    let max_marks = state.school.exam_max_marks(&exam_id);
    state
        .school
        .gradebook
        .set_mark(&class, &student_id, &exam_id, marks, max_marks)?;
    Ok(json!({ "class": class, "studentId": student_id, "examId": exam_id, "marks": marks }))
}

fn marks_sheet(state: &mut AppState, params: &Value) -> HandlerResult {
    let class = get_required_str(params, "class")?;
    let exam_id = get_required_str(params, "examId")?;
    let query = query_from_params(params)?;
    let school = &state.school;
    let sheet = school.gradebook.mark_sheet(
        &class,
        &exam_id,
        school.exam_max_marks(&exam_id),
        &school.settings.grading,
        &query,
    );
    Ok(json!({ "sheet": sheet }))
}

fn marks_save(state: &mut AppState, params: &Value) -> HandlerResult {
    let class = get_required_str(params, "class")?;
    let exam_id = get_required_str(params, "examId")?;
    let school = &state.school;
    let sheet = school.gradebook.mark_sheet(
        &class,
        &exam_id,
        school.exam_max_marks(&exam_id),
        &school.settings.grading,
        &Default::default(),
    );
    state
        .notices
        .notify(Notice::success("Marks saved successfully"));
    tracing::info!(class = %class, exam = %exam_id, entered = sheet.entered, "marks saved");
    Ok(json!({ "entered": sheet.entered, "pending": sheet.pending, "average": sheet.average }))
}

fn attendance_roster(state: &mut AppState, params: &Value) -> HandlerResult {
    let class = get_required_str(params, "class")?;
    let date = get_required_date(params, "date")?;
    let roster = roster_for(&state.school, &class, params)?;
    let count = state
        .school
        .gradebook
        .set_attendance_roster(&class, date, roster);
    Ok(json!({ "class": class, "date": clock::date_text(date), "students": count }))
}

fn attendance_mark(state: &mut AppState, params: &Value) -> HandlerResult {
    let class = get_required_str(params, "class")?;
    let date = get_required_date(params, "date")?;
    let student_id = get_required_str(params, "studentId")?;
    let status: Option<AttendanceStatus> = parse_or_default(params, "status")?;
    state
        .school
        .gradebook
        .mark_attendance(&class, date, &student_id, status)?;
    Ok(json!({ "studentId": student_id, "status": status }))
}

fn attendance_mark_all_present(state: &mut AppState, params: &Value) -> HandlerResult {
    let class = get_required_str(params, "class")?;
    let date = get_required_date(params, "date")?;
    let marked = state.school.gradebook.mark_all_present(&class, date)?;
    state
        .notices
        .notify(Notice::success("All students marked as present"));
    Ok(json!({ "marked": marked }))
}

fn attendance_sheet(state: &mut AppState, params: &Value) -> HandlerResult {
    let class = get_required_str(params, "class")?;
    let date = get_required_date(params, "date")?;
    let query = query_from_params(params)?;
    let sheet = state.school.gradebook.attendance_sheet(&class, date, &query);
    Ok(json!({ "sheet": sheet }))
}

fn attendance_save(state: &mut AppState, params: &Value) -> HandlerResult {
    let class = get_required_str(params, "class")?;
    let date = get_required_date(params, "date")?;
    match state.school.gradebook.save_attendance(&class, date) {
        Ok(saved) => {
            state
                .notices
                .notify(Notice::success("Attendance saved successfully"));
            tracing::info!(class = %class, date = %date, saved, "attendance saved");
            Ok(json!({ "saved": saved }))
        }
        Err(e) => {
            state.notices.notify(Notice::warning(e.to_string()));
            Err(e.into())
        }
    }
}

fn attendance_history(state: &mut AppState, params: &Value) -> HandlerResult {
    let student_id = get_required_str(params, "studentId")?;
    let history = state.school.gradebook.attendance_history(&student_id);
    Ok(json!({ "history": history }))
}

fn attendance_shift_date(params: &Value) -> HandlerResult {
    let date = get_required_date(params, "date")?;
    let days = params.get("days").and_then(|v| v.as_i64()).unwrap_or(1);
    let shifted = Duration::try_days(days)
        .and_then(|d| date.checked_add_signed(d))
        .ok_or_else(|| HandlerErr::bad_params("date out of range"))?;
    Ok(json!({ "date": clock::date_text(shifted) }))
}

/// Parent results page: every mark entered for one student.
fn marks_student(state: &mut AppState, params: &Value) -> HandlerResult {
    let student_id = get_required_str(params, "studentId")?;
    let results = state.school.gradebook.results_for(&student_id);
    Ok(json!({ "studentId": student_id, "results": results }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let mark = state.notices.raised();
    let p = &req.params;
    let result = match req.method.as_str() {
        "marks.roster" => marks_roster(state, p),
        "marks.set" => marks_set(state, p),
        "marks.sheet" => marks_sheet(state, p),
        "marks.save" => marks_save(state, p),
        "marks.student" => marks_student(state, p),
        "attendance.roster" => attendance_roster(state, p),
        "attendance.mark" => attendance_mark(state, p),
        "attendance.markAllPresent" => attendance_mark_all_present(state, p),
        "attendance.sheet" => attendance_sheet(state, p),
        "attendance.save" => attendance_save(state, p),
        "attendance.history" => attendance_history(state, p),
        "attendance.shiftDate" => attendance_shift_date(p),
        _ => return None,
    };
    Some(respond(
        &req.id,
        result.map(|v| with_notice(v, &state.notices, mark)),
    ))
}
