//! Everything one daemon instance manages: a list per record kind, the
//! gradebook and the school settings.

use serde::Serialize;
use serde_json::Value;

use crate::clock;
use crate::entities::academics::{
    ClassSection, Exam, ExamStatus, Homework, HomeworkStatus, Subject, TimetableSlot,
};
use crate::entities::communication::{
    Announcement, AnnouncementDraft, AnnouncementStatus, Audience, Enquiry, Message, MessageDraft,
    ANONYMOUS_SENDER,
};
use crate::entities::finance::{FeeRecord, FeeSummary};
use crate::entities::people::{Parent, StaffStatus, Student, Teacher};
use crate::entities::ActiveStatus;
use crate::gradebook::Gradebook;
use crate::notify::{Notice, NotificationSink};
use crate::sample;
use crate::session::{Role, User};
use crate::settings::Settings;
use crate::store::{Entity, EntityList, ListSnapshot, Manager, StoreError};

pub const KINDS: [&str; 12] = [
    "teachers",
    "students",
    "parents",
    "classes",
    "subjects",
    "timetable",
    "exams",
    "homework",
    "announcements",
    "messages",
    "fees",
    "enquiries",
];

#[derive(Debug, Clone, Default)]
pub struct School {
    pub teachers: Manager<Teacher>,
    pub students: Manager<Student>,
    pub parents: Manager<Parent>,
    pub classes: Manager<ClassSection>,
    pub subjects: Manager<Subject>,
    pub timetable: Manager<TimetableSlot>,
    pub exams: Manager<Exam>,
    pub homework: Manager<Homework>,
    pub announcements: Manager<Announcement>,
    pub messages: Manager<Message>,
    pub fees: Manager<FeeRecord>,
    pub enquiries: Manager<Enquiry>,
    pub gradebook: Gradebook,
    pub settings: Settings,
}

fn snapshot_of<T: Entity>(m: &Manager<T>) -> serde_json::Result<(&'static str, Value)> {
    Ok((T::KIND, serde_json::to_value(m.list.snapshot())?))
}

fn restore_into<T: Entity>(m: &mut Manager<T>, payload: Value) -> serde_json::Result<()> {
    let snapshot: ListSnapshot<T> = serde_json::from_value(payload)?;
    *m = Manager::with_list(EntityList::restore(snapshot));
    Ok(())
}

impl School {
    /// Teachers, students and fees preloaded with the demo rows.
    pub fn with_sample_data() -> Self {
        Self {
            teachers: Manager::with_list(EntityList::seeded(sample::teachers())),
            students: Manager::with_list(EntityList::seeded(sample::students())),
            fees: Manager::with_list(EntityList::seeded(sample::fees())),
            ..Self::default()
        }
    }

    /// `(kind, payload)` for every list, in `KINDS` order.
    pub fn list_snapshots(&self) -> serde_json::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            snapshot_of(&self.teachers)?,
            snapshot_of(&self.students)?,
            snapshot_of(&self.parents)?,
            snapshot_of(&self.classes)?,
            snapshot_of(&self.subjects)?,
            snapshot_of(&self.timetable)?,
            snapshot_of(&self.exams)?,
            snapshot_of(&self.homework)?,
            snapshot_of(&self.announcements)?,
            snapshot_of(&self.messages)?,
            snapshot_of(&self.fees)?,
            snapshot_of(&self.enquiries)?,
        ])
    }

    /// Replace one list from a saved snapshot. Unknown kinds return `Ok(false)`.
    pub fn restore_list(&mut self, kind: &str, payload: Value) -> serde_json::Result<bool> {
        match kind {
            "teachers" => restore_into(&mut self.teachers, payload)?,
            "students" => restore_into(&mut self.students, payload)?,
            "parents" => restore_into(&mut self.parents, payload)?,
            "classes" => restore_into(&mut self.classes, payload)?,
            "subjects" => restore_into(&mut self.subjects, payload)?,
            "timetable" => restore_into(&mut self.timetable, payload)?,
            "exams" => restore_into(&mut self.exams, payload)?,
            "homework" => restore_into(&mut self.homework, payload)?,
            "announcements" => restore_into(&mut self.announcements, payload)?,
            "messages" => restore_into(&mut self.messages, payload)?,
            "fees" => restore_into(&mut self.fees, payload)?,
            "enquiries" => restore_into(&mut self.enquiries, payload)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn send_announcement(
        &mut self,
        draft: AnnouncementDraft,
        sink: &mut dyn NotificationSink,
    ) -> Result<Announcement, StoreError> {
        let now = clock::now();
        let result = Announcement::create(String::new(), draft.clone(), now)
            .check_sendable()
            .and_then(|()| self.announcements.list.insert(draft, now))
            .and_then(|a| {
                self.announcements
                    .list
                    .modify(&a.id, |a| a.mark_sent(now))
                    .found(Announcement::KIND, &a.id)
            });
        report(sink, &result, "Announcement sent successfully");
        result
    }

    pub fn save_announcement_draft(
        &mut self,
        draft: AnnouncementDraft,
        sink: &mut dyn NotificationSink,
    ) -> Result<Announcement, StoreError> {
        let result = self.announcements.list.insert(draft, clock::now());
        report(sink, &result, "Announcement saved as draft");
        result
    }

    pub fn publish_announcement(
        &mut self,
        id: &str,
        sink: &mut dyn NotificationSink,
    ) -> Result<Announcement, StoreError> {
        let now = clock::now();
        let result = self.announcements.list.try_modify(id, |a| {
            if a.status == AnnouncementStatus::Sent {
                return Err(StoreError::rejected("Announcement was already sent"));
            }
            a.check_sendable()?;
            a.mark_sent(now);
            Ok(())
        });
        report(sink, &result, "Announcement sent successfully");
        result
    }

    /// Compose a message as `sender`, or anonymously without a session.
    pub fn send_message(
        &mut self,
        draft: MessageDraft,
        sender: Option<&User>,
        sink: &mut dyn NotificationSink,
    ) -> Result<Message, StoreError> {
        let result = self.messages.list.insert(draft, clock::now()).and_then(|m| {
            let Some(user) = sender else {
                return Ok(m);
            };
            self.messages
                .list
                .modify(&m.id, |m| {
                    m.from = user.name.clone();
                    m.from_role = user.role;
                })
                .found(Message::KIND, &m.id)
        });
        report(sink, &result, "Message sent successfully");
        result
    }

    pub fn reply_to_message(
        &mut self,
        id: &str,
        sender: Option<&User>,
        text: &str,
        sink: &mut dyn NotificationSink,
    ) -> Result<Message, StoreError> {
        let from = sender.map_or(ANONYMOUS_SENDER, |u| u.name.as_str());
        let now = clock::now();
        let result = self
            .messages
            .list
            .try_modify(id, |m| m.add_reply(from, text, now));
        report(sink, &result, "Reply sent");
        result
    }

    pub fn mark_message_read(&mut self, id: &str) -> Result<Message, StoreError> {
        self.messages
            .list
            .modify(id, |m| m.read = true)
            .found(Message::KIND, id)
    }

    pub fn unread_messages(&self) -> usize {
        self.messages.list.records().iter().filter(|m| !m.read).count()
    }

    pub fn collect_fee(
        &mut self,
        id: &str,
        amount: i64,
        sink: &mut dyn NotificationSink,
    ) -> Result<(FeeRecord, i64), StoreError> {
        let today = clock::today();
        let mut applied = 0;
        let result = self.fees.list.try_modify(id, |r| {
            applied = r.collect(amount, today)?;
            Ok(())
        });
        match &result {
            Ok(r) => sink.notify(Notice::success(format!(
                "Payment of {applied} recorded for {}",
                r.student
            ))),
            Err(e) => sink.notify(Notice::error(e.to_string())),
        }
        result.map(|r| (r, applied))
    }

    /// Max marks of an exam, or the default when the exam is unknown.
    pub fn exam_max_marks(&self, exam_id: &str) -> i64 {
        self.exams
            .list
            .get(exam_id)
            .map(|e| e.max_marks)
            .unwrap_or(crate::entities::academics::DEFAULT_MAX_MARKS)
    }

    pub fn dashboard(&self, role: Role) -> DashboardSummary {
        match role {
            Role::Admin => DashboardSummary::Admin(self.admin_summary()),
            Role::Teacher => DashboardSummary::Teacher(self.teacher_summary()),
            Role::Parent => DashboardSummary::Parent(self.parent_summary()),
        }
    }

    fn admin_summary(&self) -> AdminSummary {
        let teachers = self.teachers.list.records();
        let students = self.students.list.records();
        AdminSummary {
            teachers: teachers.len(),
            active_teachers: teachers.iter().filter(|t| t.status == StaffStatus::Active).count(),
            students: students.len(),
            active_students: students.iter().filter(|s| s.status == ActiveStatus::Active).count(),
            parents: self.parents.list.len(),
            classes: self.classes.list.len(),
            fees: FeeSummary::of(self.fees.list.records()),
            enquiries: self.enquiries.list.len(),
        }
    }

    fn homework_counts(&self) -> HomeworkCounts {
        let count = |s: HomeworkStatus| {
            self.homework
                .list
                .records()
                .iter()
                .filter(|h| h.status == s)
                .count()
        };
        HomeworkCounts {
            active: count(HomeworkStatus::Active),
            overdue: count(HomeworkStatus::Overdue),
            completed: count(HomeworkStatus::Completed),
        }
    }

    fn teacher_summary(&self) -> TeacherSummary {
        TeacherSummary {
            classes: self.classes.list.len(),
            homework: self.homework_counts(),
            unread_messages: self.unread_messages(),
            upcoming_exams: self
                .exams
                .list
                .records()
                .iter()
                .filter(|e| e.status == ExamStatus::Upcoming)
                .count(),
        }
    }

    fn parent_summary(&self) -> ParentSummary {
        ParentSummary {
            homework: self.homework_counts(),
            fee_dues: self
                .fees
                .list
                .records()
                .iter()
                .fold(0, |acc: i64, f| acc.saturating_add(f.due)),
            announcements: self
                .announcements
                .list
                .records()
                .iter()
                .filter(|a| {
                    a.status == AnnouncementStatus::Sent && a.target.contains(&Audience::Parents)
                })
                .count(),
            unread_messages: self.unread_messages(),
        }
    }
}

fn report<T>(sink: &mut dyn NotificationSink, result: &Result<T, StoreError>, success: &str) {
    match result {
        Ok(_) => sink.notify(Notice::success(success)),
        Err(e) => sink.notify(Notice::error(e.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub teachers: usize,
    pub active_teachers: usize,
    pub students: usize,
    pub active_students: usize,
    pub parents: usize,
    pub classes: usize,
    pub fees: FeeSummary,
    pub enquiries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeworkCounts {
    pub active: usize,
    pub overdue: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub classes: usize,
    pub homework: HomeworkCounts,
    pub unread_messages: usize,
    pub upcoming_exams: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSummary {
    pub homework: HomeworkCounts,
    pub fee_dues: i64,
    pub announcements: usize,
    pub unread_messages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardSummary {
    Admin(AdminSummary),
    Teacher(TeacherSummary),
    Parent(ParentSummary),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Level, NoticeLog};

    fn holiday(parents: bool) -> AnnouncementDraft {
        AnnouncementDraft {
            title: "Holiday".into(),
            message: "School closed on Friday".into(),
            target_parents: parents,
            ..AnnouncementDraft::default()
        }
    }

    #[test]
    fn send_without_audience_leaves_feed_untouched() {
        let mut school = School::default();
        let mut log = NoticeLog::default();
        let e = school
            .send_announcement(holiday(false), &mut log)
            .expect_err("no audience");
        assert_eq!(e.to_string(), "Please select at least one target audience");
        assert!(school.announcements.list.records().is_empty());
        assert_eq!(log.last().map(|n| n.level), Some(Level::Error));
    }

    #[test]
    fn drafts_publish_once() {
        let mut school = School::default();
        let mut log = NoticeLog::default();
        let d = school
            .save_announcement_draft(holiday(true), &mut log)
            .expect("draft");
        assert_eq!(d.status, AnnouncementStatus::Draft);
        let sent = school.publish_announcement(&d.id, &mut log).expect("publish");
        assert_eq!(sent.status, AnnouncementStatus::Sent);
        assert!(school.publish_announcement(&d.id, &mut log).is_err());
    }

    #[test]
    fn message_takes_sender_from_session() {
        let mut school = School::default();
        let mut log = NoticeLog::default();
        let user = crate::session::StubIdentityProvider::display_user(Role::Parent);
        let draft = MessageDraft {
            to: "Class Teacher".into(),
            subject: "Leave".into(),
            message: "Aarav will be absent tomorrow".into(),
        };
        let m = school
            .send_message(draft, Some(&user), &mut log)
            .expect("send");
        assert_eq!(m.from, "Mr. Rakesh Sharma");
        assert_eq!(m.from_role, Role::Parent);
        assert_eq!(school.unread_messages(), 0);
    }

    #[test]
    fn snapshots_round_trip_every_list() {
        let school = School::with_sample_data();
        let snaps = school.list_snapshots().expect("snapshots");
        assert_eq!(snaps.iter().map(|(k, _)| *k).collect::<Vec<_>>(), KINDS.to_vec());

        let mut restored = School::default();
        for (kind, payload) in snaps {
            assert!(restored.restore_list(kind, payload).expect("restore"));
        }
        assert_eq!(restored.teachers.list.len(), 5);
        assert_eq!(restored.fees.list.next_id(), 6);
        assert!(!restored.restore_list("nope", Value::Null).expect("unknown"));
    }

    #[test]
    fn fee_collection_updates_dashboard() {
        let mut school = School::with_sample_data();
        let mut log = NoticeLog::default();
        let (record, applied) = school.collect_fee("F3", 10_000, &mut log).expect("collect");
        assert_eq!(applied, 10_000);
        assert_eq!(record.due, 15_000);
        let DashboardSummary::Admin(admin) = school.dashboard(Role::Admin) else {
            panic!("admin summary");
        };
        assert_eq!(admin.fees.pending_dues, 90_000);
        assert_eq!(admin.teachers, 5);
        assert_eq!(admin.active_teachers, 4);
    }
}
