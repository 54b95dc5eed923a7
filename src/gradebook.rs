//! Marks entry and daily attendance sheets, one roster per class.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filter::Query;
use crate::settings::GradingSettings;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roll_no: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkRow {
    student: RosterEntry,
    /// Keyed by exam id; absent means not entered yet.
    marks: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    /// Late arrivals still count towards attendance.
    pub fn attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRow {
    #[serde(flatten)]
    pub student: RosterEntry,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub class: String,
    pub date: NaiveDate,
    pub student_id: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSheetRow {
    pub id: String,
    pub name: String,
    pub roll_no: i64,
    pub marks: Option<f64>,
    pub percentage: Option<f64>,
    pub grade: Option<String>,
    pub passed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSheet {
    pub class: String,
    pub exam_id: String,
    pub max_marks: i64,
    pub rows: Vec<MarkSheetRow>,
    pub entered: usize,
    pub pending: usize,
    /// Rounded mean percentage of entered marks.
    pub average: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    pub class: String,
    pub exam_id: String,
    pub marks: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheet {
    pub class: String,
    pub date: NaiveDate,
    pub rows: Vec<AttendanceRow>,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub unmarked: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceHistory {
    pub student_id: String,
    pub days: Vec<AttendanceEntry>,
    pub attended: usize,
    pub total: usize,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradebook {
    #[serde(default)]
    marks: BTreeMap<String, Vec<MarkRow>>,
    #[serde(default)]
    attendance: BTreeMap<String, BTreeMap<NaiveDate, Vec<AttendanceRow>>>,
    #[serde(default)]
    history: Vec<AttendanceEntry>,
}

fn not_found(kind: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn rounded(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

impl Gradebook {
    /// Install the marks roster for a class. Marks already entered for
    /// students that stay on the roster are kept.
    pub fn set_marks_roster(&mut self, class: &str, roster: Vec<RosterEntry>) -> usize {
        let previous = self.marks.remove(class).unwrap_or_default();
        let rows: Vec<MarkRow> = roster
            .into_iter()
            .map(|student| {
                let marks = previous
                    .iter()
                    .find(|r| r.student.id == student.id)
                    .map(|r| r.marks.clone())
                    .unwrap_or_default();
                MarkRow { student, marks }
            })
            .collect();
        let n = rows.len();
        self.marks.insert(class.to_string(), rows);
        n
    }

    pub fn set_mark(
        &mut self,
        class: &str,
        student_id: &str,
        exam_id: &str,
        marks: Option<f64>,
        max_marks: i64,
    ) -> Result<(), StoreError> {
        if let Some(m) = marks {
            if !m.is_finite() || m < 0.0 || m > max_marks as f64 {
                return Err(StoreError::rejected(format!(
                    "Marks must be between 0 and {max_marks}"
                )));
            }
        }
        let rows = self
            .marks
            .get_mut(class)
            .ok_or_else(|| not_found("marks", class))?;
        let row = rows
            .iter_mut()
            .find(|r| r.student.id == student_id)
            .ok_or_else(|| not_found("students", student_id))?;
        match marks {
            Some(m) => {
                row.marks.insert(exam_id.to_string(), m);
            }
            None => {
                row.marks.remove(exam_id);
            }
        }
        Ok(())
    }

    pub fn mark_sheet(
        &self,
        class: &str,
        exam_id: &str,
        max_marks: i64,
        grading: &GradingSettings,
        query: &Query,
    ) -> MarkSheet {
        let all = self.marks.get(class).map(Vec::as_slice).unwrap_or(&[]);
        let max = max_marks.max(1) as f64;
        // Marks above a since-lowered maximum count as full marks.
        let scored = |m: f64| m.min(max);
        let entered: Vec<f64> = all
            .iter()
            .filter_map(|r| r.marks.get(exam_id).copied())
            .map(scored)
            .collect();
        let average = (!entered.is_empty()).then(|| {
            (entered.iter().sum::<f64>() / entered.len() as f64 / max * 100.0).round() as i64
        });
        let rows = all
            .iter()
            .filter(|r| query.matches_text([r.student.name.as_str()]))
            .map(|r| {
                let marks = r.marks.get(exam_id).copied();
                let percentage = marks.map(|m| rounded(scored(m) / max * 100.0));
                MarkSheetRow {
                    id: r.student.id.clone(),
                    name: r.student.name.clone(),
                    roll_no: r.student.roll_no,
                    marks,
                    percentage,
                    grade: percentage.map(|p| grading.grade_for(p).to_string()),
                    passed: percentage.map(|p| grading.passes(p)),
                }
            })
            .collect();
        MarkSheet {
            class: class.to_string(),
            exam_id: exam_id.to_string(),
            max_marks,
            rows,
            entered: entered.len(),
            pending: all.len() - entered.len(),
            average,
        }
    }

    pub fn results_for(&self, student_id: &str) -> Vec<StudentResult> {
        self.marks
            .iter()
            .flat_map(|(class, rows)| {
                rows.iter()
                    .filter(move |r| r.student.id == student_id)
                    .flat_map(move |r| {
                        r.marks.iter().map(move |(exam_id, m)| StudentResult {
                            class: class.clone(),
                            exam_id: exam_id.clone(),
                            marks: *m,
                        })
                    })
            })
            .collect()
    }

    pub fn set_attendance_roster(
        &mut self,
        class: &str,
        date: NaiveDate,
        roster: Vec<RosterEntry>,
    ) -> usize {
        let days = self.attendance.entry(class.to_string()).or_default();
        let previous = days.remove(&date).unwrap_or_default();
        let rows: Vec<AttendanceRow> = roster
            .into_iter()
            .map(|student| {
                let status = previous
                    .iter()
                    .find(|r| r.student.id == student.id)
                    .and_then(|r| r.status);
                AttendanceRow { student, status }
            })
            .collect();
        let n = rows.len();
        days.insert(date, rows);
        n
    }

    fn attendance_rows_mut(
        &mut self,
        class: &str,
        date: NaiveDate,
    ) -> Result<&mut Vec<AttendanceRow>, StoreError> {
        self.attendance
            .get_mut(class)
            .and_then(|days| days.get_mut(&date))
            .ok_or_else(|| not_found("attendance", &format!("{class} {date}")))
    }

    pub fn mark_attendance(
        &mut self,
        class: &str,
        date: NaiveDate,
        student_id: &str,
        status: Option<AttendanceStatus>,
    ) -> Result<(), StoreError> {
        let rows = self.attendance_rows_mut(class, date)?;
        let row = rows
            .iter_mut()
            .find(|r| r.student.id == student_id)
            .ok_or_else(|| not_found("students", student_id))?;
        row.status = status;
        Ok(())
    }

    pub fn mark_all_present(&mut self, class: &str, date: NaiveDate) -> Result<usize, StoreError> {
        let rows = self.attendance_rows_mut(class, date)?;
        for r in rows.iter_mut() {
            r.status = Some(AttendanceStatus::Present);
        }
        Ok(rows.len())
    }

    pub fn attendance_sheet(&self, class: &str, date: NaiveDate, query: &Query) -> AttendanceSheet {
        let all = self
            .attendance
            .get(class)
            .and_then(|days| days.get(&date))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let count = |s: Option<AttendanceStatus>| all.iter().filter(|r| r.status == s).count();
        AttendanceSheet {
            class: class.to_string(),
            date,
            rows: all
                .iter()
                .filter(|r| query.matches_text([r.student.name.as_str()]))
                .cloned()
                .collect(),
            present: count(Some(AttendanceStatus::Present)),
            absent: count(Some(AttendanceStatus::Absent)),
            late: count(Some(AttendanceStatus::Late)),
            unmarked: count(None),
        }
    }

    /// Commit a fully marked day to history, replacing an earlier save of the
    /// same class and date.
    pub fn save_attendance(&mut self, class: &str, date: NaiveDate) -> Result<usize, StoreError> {
        let rows = self.attendance_rows_mut(class, date)?;
        let mut entries = Vec::with_capacity(rows.len());
        let mut unmarked = 0;
        for r in rows.iter() {
            match r.status {
                Some(status) => entries.push(AttendanceEntry {
                    class: class.to_string(),
                    date,
                    student_id: r.student.id.clone(),
                    status,
                }),
                None => unmarked += 1,
            }
        }
        if unmarked > 0 {
            return Err(StoreError::rejected(format!(
                "{unmarked} students are still unmarked"
            )));
        }
        self.history.retain(|e| !(e.class == class && e.date == date));
        let saved = entries.len();
        self.history.extend(entries);
        Ok(saved)
    }

    pub fn attendance_history(&self, student_id: &str) -> AttendanceHistory {
        let mut days: Vec<AttendanceEntry> = self
            .history
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect();
        days.sort_by(|a, b| a.date.cmp(&b.date));
        let attended = days.iter().filter(|e| e.status.attended()).count();
        let total = days.len();
        AttendanceHistory {
            student_id: student_id.to_string(),
            percentage: (total > 0).then(|| rounded(attended as f64 / total as f64 * 100.0)),
            days,
            attended,
            total,
        }
    }
}
