use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{blank_fields, overwrite, trimmed};
use crate::clock;
use crate::session::Role;
use crate::store::{Draft, Entity, Placement, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Audience {
    Parents,
    Teachers,
    Students,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementStatus {
    Draft,
    Sent,
}

impl AnnouncementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AnnouncementStatus::Draft => "draft",
            AnnouncementStatus::Sent => "sent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub message: String,
    pub target: Vec<Audience>,
    pub priority: Priority,
    pub status: AnnouncementStatus,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
}

impl Announcement {
    /// Rules for leaving the draft state: a body and somebody to send it to.
    pub fn check_sendable(&self) -> Result<(), StoreError> {
        if self.title.trim().is_empty() || self.message.trim().is_empty() {
            let missing = blank_fields(&[
                ("title", self.title.as_str()),
                ("message", self.message.as_str()),
            ]);
            return Err(StoreError::Validation {
                message: "Please fill in title and message".to_string(),
                missing,
            });
        }
        if self.target.is_empty() {
            return Err(StoreError::rejected(
                "Please select at least one target audience",
            ));
        }
        Ok(())
    }

    pub fn mark_sent(&mut self, now: NaiveDateTime) {
        self.status = AnnouncementStatus::Sent;
        self.sent_at = Some(clock::stamp_text(now));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnouncementDraft {
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub target_parents: bool,
    pub target_teachers: bool,
    pub target_students: bool,
}

impl Default for AnnouncementDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            message: String::new(),
            priority: Priority::Medium,
            target_parents: true,
            target_teachers: false,
            target_students: false,
        }
    }
}

impl AnnouncementDraft {
    pub fn targets(&self) -> Vec<Audience> {
        [
            (self.target_parents, Audience::Parents),
            (self.target_teachers, Audience::Teachers),
            (self.target_students, Audience::Students),
        ]
        .into_iter()
        .filter_map(|(on, a)| on.then_some(a))
        .collect()
    }
}

impl Draft for AnnouncementDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[("title", self.title.as_str())])
    }
}

impl Entity for Announcement {
    type Draft = AnnouncementDraft;

    const KIND: &'static str = "announcements";
    const LABEL: &'static str = "Announcement";
    const ID_PREFIX: &'static str = "A";
    const PLACEMENT: Placement = Placement::Prepend;

    fn id(&self) -> &str {
        &self.id
    }

    /// Every announcement starts life as a draft.
    fn create(id: String, draft: AnnouncementDraft, now: NaiveDateTime) -> Self {
        Self {
            id,
            title: trimmed(&draft.title),
            message: trimmed(&draft.message),
            target: draft.targets(),
            priority: draft.priority,
            status: AnnouncementStatus::Draft,
            created_at: clock::stamp_text(now),
            sent_at: None,
        }
    }

    fn patch(&mut self, draft: &AnnouncementDraft) {
        overwrite(&mut self.title, &draft.title);
        overwrite(&mut self.message, &draft.message);
        self.priority = draft.priority;
        let targets = draft.targets();
        if !targets.is_empty() {
            self.target = targets;
        }
    }

    fn to_draft(&self) -> AnnouncementDraft {
        AnnouncementDraft {
            title: self.title.clone(),
            message: self.message.clone(),
            priority: self.priority,
            target_parents: self.target.contains(&Audience::Parents),
            target_teachers: self.target.contains(&Audience::Teachers),
            target_students: self.target.contains(&Audience::Students),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.message.as_str()]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            "status" => Some(self.status.as_str()),
            "priority" => Some(self.priority.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub from: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub from: String,
    pub from_role: Role,
    pub to: String,
    pub subject: String,
    pub message: String,
    pub timestamp: String,
    pub read: bool,
    pub replies: Vec<Reply>,
}

impl Message {
    pub fn add_reply(
        &mut self,
        from: &str,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<(), StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::required(vec!["message"]));
        }
        self.replies.push(Reply {
            from: from.to_string(),
            message: text.trim().to_string(),
            timestamp: clock::stamp_text(now),
        });
        Ok(())
    }

    fn read_state(&self) -> &'static str {
        if self.read {
            "read"
        } else {
            "unread"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageDraft {
    pub to: String,
    pub subject: String,
    pub message: String,
}

impl Draft for MessageDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[
            ("to", self.to.as_str()),
            ("subject", self.subject.as_str()),
            ("message", self.message.as_str()),
        ])
    }
}

/// Sender shown on messages composed without a signed-in user.
pub const ANONYMOUS_SENDER: &str = "You";

impl Entity for Message {
    type Draft = MessageDraft;

    const KIND: &'static str = "messages";
    const LABEL: &'static str = "Message";
    const ID_PREFIX: &'static str = "M";
    const PLACEMENT: Placement = Placement::Prepend;

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: MessageDraft, now: NaiveDateTime) -> Self {
        Self {
            id,
            from: ANONYMOUS_SENDER.to_string(),
            from_role: Role::Teacher,
            to: trimmed(&draft.to),
            subject: trimmed(&draft.subject),
            message: trimmed(&draft.message),
            timestamp: clock::stamp_text(now),
            read: true,
            replies: Vec::new(),
        }
    }

    fn patch(&mut self, draft: &MessageDraft) {
        overwrite(&mut self.to, &draft.to);
        overwrite(&mut self.subject, &draft.subject);
        overwrite(&mut self.message, &draft.message);
    }

    fn to_draft(&self) -> MessageDraft {
        MessageDraft {
            to: self.to.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.subject.as_str(), self.from.as_str(), self.message.as_str()]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            "read" => Some(self.read_state()),
            "fromRole" => Some(self.from_role.as_str()),
            _ => None,
        }
    }
}

/// Demo request sent from the public contact page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: String,
    pub school_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub received_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnquiryDraft {
    pub school_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl Draft for EnquiryDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[
            ("schoolName", self.school_name.as_str()),
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
        ])
    }
}

impl Entity for Enquiry {
    type Draft = EnquiryDraft;

    const KIND: &'static str = "enquiries";
    const LABEL: &'static str = "Enquiry";
    const ID_PREFIX: &'static str = "Q";
    const PLACEMENT: Placement = Placement::Prepend;

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: EnquiryDraft, now: NaiveDateTime) -> Self {
        Self {
            id,
            school_name: trimmed(&draft.school_name),
            name: trimmed(&draft.name),
            email: trimmed(&draft.email),
            phone: trimmed(&draft.phone),
            message: trimmed(&draft.message),
            received_at: clock::stamp_text(now),
        }
    }

    fn patch(&mut self, draft: &EnquiryDraft) {
        overwrite(&mut self.school_name, &draft.school_name);
        overwrite(&mut self.name, &draft.name);
        overwrite(&mut self.email, &draft.email);
        overwrite(&mut self.phone, &draft.phone);
        overwrite(&mut self.message, &draft.message);
    }

    fn to_draft(&self) -> EnquiryDraft {
        EnquiryDraft {
            school_name: self.school_name.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            message: self.message.clone(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.school_name.as_str(), self.name.as_str(), self.email.as_str()]
    }
}
