use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{blank_fields, lenient_int, overwrite, parse_word, split_list, text_or_number, trimmed};
use crate::store::{Draft, Entity, Placement};

/// Homework is assigned to a class of this size unless told otherwise.
pub const DEFAULT_CLASS_STRENGTH: i64 = 35;
pub const DEFAULT_MAX_MARKS: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSection {
    pub id: String,
    pub class_name: String,
    pub section: String,
    pub class_teacher: String,
    pub strength: i64,
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassSectionDraft {
    pub class_name: String,
    pub section: String,
    pub class_teacher: String,
}

impl Draft for ClassSectionDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[
            ("className", self.class_name.as_str()),
            ("section", self.section.as_str()),
        ])
    }
}

impl Entity for ClassSection {
    type Draft = ClassSectionDraft;

    const KIND: &'static str = "classes";
    const LABEL: &'static str = "Class";
    const ID_PREFIX: &'static str = "C";

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: ClassSectionDraft, _now: NaiveDateTime) -> Self {
        Self {
            id,
            class_name: trimmed(&draft.class_name),
            section: trimmed(&draft.section),
            class_teacher: trimmed(&draft.class_teacher),
            strength: 0,
            subjects: Vec::new(),
        }
    }

    fn patch(&mut self, draft: &ClassSectionDraft) {
        overwrite(&mut self.class_name, &draft.class_name);
        overwrite(&mut self.section, &draft.section);
        overwrite(&mut self.class_teacher, &draft.class_teacher);
    }

    fn to_draft(&self) -> ClassSectionDraft {
        ClassSectionDraft {
            class_name: self.class_name.clone(),
            section: self.section.clone(),
            class_teacher: self.class_teacher.clone(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.class_name.as_str(),
            self.section.as_str(),
            self.class_teacher.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub code: String,
    pub classes: Vec<String>,
    pub teacher: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubjectDraft {
    pub name: String,
    pub code: String,
    pub teacher: String,
    pub classes: String,
}

impl Draft for SubjectDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[("name", self.name.as_str()), ("code", self.code.as_str())])
    }
}

impl Entity for Subject {
    type Draft = SubjectDraft;

    const KIND: &'static str = "subjects";
    const LABEL: &'static str = "Subject";
    const ID_PREFIX: &'static str = "S";

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: SubjectDraft, _now: NaiveDateTime) -> Self {
        Self {
            id,
            name: trimmed(&draft.name),
            code: trimmed(&draft.code),
            classes: split_list(&draft.classes),
            teacher: trimmed(&draft.teacher),
        }
    }

    fn patch(&mut self, draft: &SubjectDraft) {
        overwrite(&mut self.name, &draft.name);
        overwrite(&mut self.code, &draft.code);
        overwrite(&mut self.teacher, &draft.teacher);
        let classes = split_list(&draft.classes);
        if !classes.is_empty() {
            self.classes = classes;
        }
    }

    fn to_draft(&self) -> SubjectDraft {
        SubjectDraft {
            name: self.name.clone(),
            code: self.code.clone(),
            teacher: self.teacher.clone(),
            classes: self.classes.join(", "),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.code.as_str(), self.teacher.as_str()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSlot {
    pub id: String,
    pub day: String,
    pub time: String,
    pub class: String,
    pub subject: String,
    pub teacher: String,
    pub room: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimetableSlotDraft {
    pub day: String,
    pub time: String,
    pub class: String,
    pub subject: String,
    pub teacher: String,
    pub room: String,
}

impl Draft for TimetableSlotDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[
            ("day", self.day.as_str()),
            ("time", self.time.as_str()),
            ("class", self.class.as_str()),
        ])
    }
}

impl Entity for TimetableSlot {
    type Draft = TimetableSlotDraft;

    const KIND: &'static str = "timetable";
    const LABEL: &'static str = "Timetable slot";
    const ID_PREFIX: &'static str = "TT";

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: TimetableSlotDraft, _now: NaiveDateTime) -> Self {
        Self {
            id,
            day: trimmed(&draft.day),
            time: trimmed(&draft.time),
            class: trimmed(&draft.class),
            subject: trimmed(&draft.subject),
            teacher: trimmed(&draft.teacher),
            room: trimmed(&draft.room),
        }
    }

    fn patch(&mut self, draft: &TimetableSlotDraft) {
        overwrite(&mut self.day, &draft.day);
        overwrite(&mut self.time, &draft.time);
        overwrite(&mut self.class, &draft.class);
        overwrite(&mut self.subject, &draft.subject);
        overwrite(&mut self.teacher, &draft.teacher);
        overwrite(&mut self.room, &draft.room);
    }

    fn to_draft(&self) -> TimetableSlotDraft {
        TimetableSlotDraft {
            day: self.day.clone(),
            time: self.time.clone(),
            class: self.class.clone(),
            subject: self.subject.clone(),
            teacher: self.teacher.clone(),
            room: self.room.clone(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.class.as_str(),
            self.subject.as_str(),
            self.teacher.as_str(),
            self.room.as_str(),
        ]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            "day" => Some(self.day.as_str()),
            "class" => Some(self.class.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
}

impl ExamStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExamStatus::Upcoming => "upcoming",
            ExamStatus::Ongoing => "ongoing",
            ExamStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub classes: Vec<String>,
    pub status: ExamStatus,
    pub max_marks: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExamDraft {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub classes: String,
    #[serde(deserialize_with = "text_or_number")]
    pub max_marks: String,
    pub status: String,
}

impl Draft for ExamDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[("name", self.name.as_str()), ("startDate", self.start_date.as_str())])
    }
}

fn max_marks_or_default(raw: &str) -> i64 {
    match lenient_int(raw) {
        n if n > 0 => n,
        _ => DEFAULT_MAX_MARKS,
    }
}

impl Entity for Exam {
    type Draft = ExamDraft;

    const KIND: &'static str = "exams";
    const LABEL: &'static str = "Exam";
    const ID_PREFIX: &'static str = "E";

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: ExamDraft, _now: NaiveDateTime) -> Self {
        Self {
            id,
            name: trimmed(&draft.name),
            start_date: trimmed(&draft.start_date),
            end_date: trimmed(&draft.end_date),
            classes: split_list(&draft.classes),
            status: ExamStatus::Upcoming,
            max_marks: max_marks_or_default(&draft.max_marks),
        }
    }

    fn patch(&mut self, draft: &ExamDraft) {
        overwrite(&mut self.name, &draft.name);
        overwrite(&mut self.start_date, &draft.start_date);
        overwrite(&mut self.end_date, &draft.end_date);
        let classes = split_list(&draft.classes);
        if !classes.is_empty() {
            self.classes = classes;
        }
        if !draft.max_marks.trim().is_empty() {
            self.max_marks = max_marks_or_default(&draft.max_marks);
        }
        if let Some(status) = parse_word(&draft.status) {
            self.status = status;
        }
    }

    fn to_draft(&self) -> ExamDraft {
        ExamDraft {
            name: self.name.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            classes: self.classes.join(", "),
            max_marks: self.max_marks.to_string(),
            status: self.status.as_str().to_string(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    #[default]
    Active,
    Overdue,
    Completed,
}

impl HomeworkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HomeworkStatus::Active => "active",
            HomeworkStatus::Overdue => "overdue",
            HomeworkStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    pub id: String,
    pub title: String,
    pub description: String,
    pub class: String,
    pub subject: String,
    pub due_date: String,
    pub attachments: Vec<String>,
    pub submissions: i64,
    pub total_students: i64,
    pub status: HomeworkStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HomeworkDraft {
    pub title: String,
    pub description: String,
    pub class: String,
    pub subject: String,
    pub due_date: String,
    pub status: String,
}

impl Draft for HomeworkDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[
            ("title", self.title.as_str()),
            ("class", self.class.as_str()),
            ("dueDate", self.due_date.as_str()),
        ])
    }
}

impl Entity for Homework {
    type Draft = HomeworkDraft;

    const KIND: &'static str = "homework";
    const LABEL: &'static str = "Homework";
    const ID_PREFIX: &'static str = "HW";
    const PLACEMENT: Placement = Placement::Prepend;

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: HomeworkDraft, _now: NaiveDateTime) -> Self {
        Self {
            id,
            title: trimmed(&draft.title),
            description: trimmed(&draft.description),
            class: trimmed(&draft.class),
            subject: trimmed(&draft.subject),
            due_date: trimmed(&draft.due_date),
            attachments: Vec::new(),
            submissions: 0,
            total_students: DEFAULT_CLASS_STRENGTH,
            status: HomeworkStatus::Active,
        }
    }

    fn patch(&mut self, draft: &HomeworkDraft) {
        overwrite(&mut self.title, &draft.title);
        overwrite(&mut self.description, &draft.description);
        overwrite(&mut self.class, &draft.class);
        overwrite(&mut self.subject, &draft.subject);
        overwrite(&mut self.due_date, &draft.due_date);
        if let Some(status) = parse_word(&draft.status) {
            self.status = status;
        }
    }

    fn to_draft(&self) -> HomeworkDraft {
        HomeworkDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            class: self.class.clone(),
            subject: self.subject.clone(),
            due_date: self.due_date.clone(),
            status: self.status.as_str().to_string(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.subject.as_str(), self.class.as_str()]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            "status" => Some(self.status.as_str()),
            "class" => Some(self.class.as_str()),
            _ => None,
        }
    }
}
