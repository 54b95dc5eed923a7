use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{
    blank_fields, lenient_int, overwrite, parse_word, split_list, text_or_number, trimmed,
    ActiveStatus, FeeStatus,
};
use crate::clock;
use crate::store::{Draft, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StaffStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
}

impl StaffStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StaffStatus::Active => "active",
            StaffStatus::Inactive => "inactive",
            StaffStatus::OnLeave => "on-leave",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub classes: Vec<String>,
    pub status: StaffStatus,
    pub join_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeacherDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    /// Comma separated, e.g. `10-A, 10-B`.
    pub classes: String,
    pub status: String,
}

impl Draft for TeacherDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
        ])
    }
}

impl Entity for Teacher {
    type Draft = TeacherDraft;

    const KIND: &'static str = "teachers";
    const LABEL: &'static str = "Teacher";
    const ID_PREFIX: &'static str = "T";
    const TOGGLES_STATUS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: TeacherDraft, now: NaiveDateTime) -> Self {
        Self {
            id,
            name: trimmed(&draft.name),
            email: trimmed(&draft.email),
            phone: trimmed(&draft.phone),
            subject: trimmed(&draft.subject),
            classes: split_list(&draft.classes),
            status: parse_word(&draft.status).unwrap_or_default(),
            join_date: clock::date_text(now.date()),
        }
    }

    fn patch(&mut self, draft: &TeacherDraft) {
        overwrite(&mut self.name, &draft.name);
        overwrite(&mut self.email, &draft.email);
        overwrite(&mut self.phone, &draft.phone);
        overwrite(&mut self.subject, &draft.subject);
        let classes = split_list(&draft.classes);
        if !classes.is_empty() {
            self.classes = classes;
        }
        if let Some(status) = parse_word(&draft.status) {
            self.status = status;
        }
    }

    fn to_draft(&self) -> TeacherDraft {
        TeacherDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            subject: self.subject.clone(),
            classes: self.classes.join(", "),
            status: self.status.as_str().to_string(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.subject.as_str()]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            "status" => Some(self.status.as_str()),
            "subject" => Some(self.subject.as_str()),
            _ => None,
        }
    }

    fn toggle_status(&mut self) {
        self.status = match self.status {
            StaffStatus::Active => StaffStatus::Inactive,
            StaffStatus::Inactive | StaffStatus::OnLeave => StaffStatus::Active,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class: String,
    pub roll_no: i64,
    pub parent_name: String,
    pub phone: String,
    pub fee_status: FeeStatus,
    /// Attendance percentage, 0..=100.
    pub attendance: i64,
    pub status: ActiveStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentDraft {
    pub name: String,
    pub class: String,
    #[serde(deserialize_with = "text_or_number")]
    pub roll_no: String,
    pub parent_name: String,
    pub phone: String,
    pub fee_status: String,
}

impl Draft for StudentDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[("name", self.name.as_str()), ("class", self.class.as_str())])
    }
}

impl Entity for Student {
    type Draft = StudentDraft;

    const KIND: &'static str = "students";
    const LABEL: &'static str = "Student";
    const ID_PREFIX: &'static str = "STU";
    const ID_WIDTH: usize = 3;
    const TOGGLES_STATUS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: StudentDraft, _now: NaiveDateTime) -> Self {
        Self {
            id,
            name: trimmed(&draft.name),
            class: trimmed(&draft.class),
            roll_no: lenient_int(&draft.roll_no),
            parent_name: trimmed(&draft.parent_name),
            phone: trimmed(&draft.phone),
            fee_status: parse_word(&draft.fee_status).unwrap_or_default(),
            attendance: 0,
            status: ActiveStatus::Active,
        }
    }

    fn patch(&mut self, draft: &StudentDraft) {
        overwrite(&mut self.name, &draft.name);
        overwrite(&mut self.class, &draft.class);
        if !draft.roll_no.trim().is_empty() {
            self.roll_no = lenient_int(&draft.roll_no);
        }
        overwrite(&mut self.parent_name, &draft.parent_name);
        overwrite(&mut self.phone, &draft.phone);
        if let Some(fee_status) = parse_word(&draft.fee_status) {
            self.fee_status = fee_status;
        }
    }

    fn to_draft(&self) -> StudentDraft {
        StudentDraft {
            name: self.name.clone(),
            class: self.class.clone(),
            roll_no: self.roll_no.to_string(),
            parent_name: self.parent_name.clone(),
            phone: self.phone.clone(),
            fee_status: self.fee_status.as_str().to_string(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.id.as_str(), self.class.as_str()]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            "class" => Some(self.class.as_str()),
            "feeStatus" => Some(self.fee_status.as_str()),
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn toggle_status(&mut self) {
        self.status = self.status.flipped();
    }
}

/// Denormalized copy of a child's name and class; not linked to `Student`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    pub name: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub children: Vec<ChildRef>,
    pub status: ActiveStatus,
    pub occupation: String,
    pub address: String,
    pub join_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParentDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub occupation: String,
    pub address: String,
    pub child_name: String,
    pub child_class: String,
}

impl Draft for ParentDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
        ])
    }
}

impl Entity for Parent {
    type Draft = ParentDraft;

    const KIND: &'static str = "parents";
    const LABEL: &'static str = "Parent";
    const ID_PREFIX: &'static str = "P";
    const ID_WIDTH: usize = 3;
    const TOGGLES_STATUS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: ParentDraft, now: NaiveDateTime) -> Self {
        let children = if draft.child_name.trim().is_empty() {
            Vec::new()
        } else {
            vec![ChildRef {
                name: trimmed(&draft.child_name),
                class: trimmed(&draft.child_class),
            }]
        };
        Self {
            id,
            name: trimmed(&draft.name),
            email: trimmed(&draft.email),
            phone: trimmed(&draft.phone),
            children,
            status: ActiveStatus::Active,
            occupation: trimmed(&draft.occupation),
            address: trimmed(&draft.address),
            join_date: clock::date_text(now.date()),
        }
    }

    /// Children are only set at creation; edits touch the contact fields.
    fn patch(&mut self, draft: &ParentDraft) {
        overwrite(&mut self.name, &draft.name);
        overwrite(&mut self.email, &draft.email);
        overwrite(&mut self.phone, &draft.phone);
        overwrite(&mut self.occupation, &draft.occupation);
        overwrite(&mut self.address, &draft.address);
    }

    fn to_draft(&self) -> ParentDraft {
        let first = self.children.first();
        ParentDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            occupation: self.occupation.clone(),
            address: self.address.clone(),
            child_name: first.map(|c| c.name.clone()).unwrap_or_default(),
            child_class: first.map(|c| c.class.clone()).unwrap_or_default(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.phone.as_str()]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn toggle_status(&mut self) {
        self.status = self.status.flipped();
    }
}
