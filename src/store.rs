//! Generic entity lists.
//!
//! Every management screen keeps one ordered list of flat records. `EntityList`
//! owns the records and the id sequence; `Manager` pairs a list with its dialog
//! and reports outcomes to a notification sink.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::Query;
use crate::form::Dialog;
use crate::notify::{Notice, NotificationSink};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Tabular lists grow at the bottom.
    Append,
    /// Feeds show the newest record first.
    Prepend,
}

/// Form buffer contents for one entity kind. Also used as the edit patch:
/// blank fields leave the stored value alone.
pub trait Draft: Default + Clone + Serialize + DeserializeOwned {
    /// Names of required fields that are blank, in form order.
    fn missing_fields(&self) -> Vec<&'static str>;
}

pub trait Entity: Clone + Serialize + DeserializeOwned {
    type Draft: Draft;

    /// Method prefix and snapshot key, e.g. `teachers`.
    const KIND: &'static str;
    /// Human label used in notices, e.g. `Teacher`.
    const LABEL: &'static str;
    const ID_PREFIX: &'static str;
    /// Zero-pad the sequence number to this many digits.
    const ID_WIDTH: usize = 0;
    const PLACEMENT: Placement = Placement::Append;
    const TOGGLES_STATUS: bool = false;

    fn id(&self) -> &str;

    fn create(id: String, draft: Self::Draft, now: NaiveDateTime) -> Self;

    /// Field-level overwrite: only non-blank draft fields replace stored values.
    fn patch(&mut self, draft: &Self::Draft);

    /// Prefill for the view/edit dialog.
    fn to_draft(&self) -> Self::Draft;

    fn search_fields(&self) -> Vec<&str>;

    /// Value of a categorical field (status, class, role...) used by filters.
    fn category(&self, _key: &str) -> Option<&str> {
        None
    }

    /// Flip a binary status. Only called when `TOGGLES_STATUS` is set.
    fn toggle_status(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{message}")]
    Validation {
        message: String,
        missing: Vec<&'static str>,
    },
    #[error("{kind} record {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} does not support {operation}")]
    Unsupported {
        kind: &'static str,
        operation: &'static str,
    },
    #[error("{message}")]
    Rejected { message: String },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation { .. } => "validation_failed",
            StoreError::NotFound { .. } => "not_found",
            StoreError::Unsupported { .. } => "unsupported",
            StoreError::Rejected { .. } => "rejected",
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        StoreError::Rejected {
            message: message.into(),
        }
    }

    pub fn required(missing: Vec<&'static str>) -> Self {
        StoreError::Validation {
            message: REQUIRED_FIELDS_MESSAGE.to_string(),
            missing,
        }
    }
}

/// Outcome of a lookup-and-change by id.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    Applied(T),
    NotFound,
}

impl<T> Mutation<T> {
    pub fn found(self, kind: &'static str, id: &str) -> Result<T, StoreError> {
        match self {
            Mutation::Applied(v) => Ok(v),
            Mutation::NotFound => Err(StoreError::NotFound {
                kind,
                id: id.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Removal<T> {
    Removed(T),
    Absent,
}

/// Monotonic id counter. Never reuses a number, even after deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSequence {
    pub fn starting_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn issue(&mut self, prefix: &str, width: usize) -> String {
        let n = self.next;
        self.next += 1;
        format!("{prefix}{n:0width$}")
    }

    /// Move past every numeric suffix already used by `ids`.
    pub fn skip_past<'a>(&mut self, prefix: &str, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            if let Some(n) = id.strip_prefix(prefix).and_then(|s| s.parse::<u64>().ok()) {
                if n >= self.next {
                    self.next = n + 1;
                }
            }
        }
    }
}

/// Serialized form of a list, used by workspace snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnapshot<T> {
    pub records: Vec<T>,
    pub next_id: u64,
}

#[derive(Debug, Clone)]
pub struct EntityList<T: Entity> {
    records: Vec<T>,
    ids: IdSequence,
}

impl<T: Entity> Default for EntityList<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            ids: IdSequence::default(),
        }
    }
}

impl<T: Entity> EntityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from fixed rows; the id sequence continues after the highest seeded id.
    pub fn seeded(records: Vec<T>) -> Self {
        let mut ids = IdSequence::default();
        ids.skip_past(T::ID_PREFIX, records.iter().map(|r| r.id()));
        Self { records, ids }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn next_id(&self) -> u64 {
        self.ids.peek()
    }

    pub fn filter(&self, query: &Query) -> Vec<&T> {
        query.apply(&self.records)
    }

    /// Validate and add a record. The list is untouched on failure.
    pub fn insert(&mut self, draft: T::Draft, now: NaiveDateTime) -> Result<T, StoreError> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(StoreError::required(missing));
        }
        let id = self.ids.issue(T::ID_PREFIX, T::ID_WIDTH);
        let record = T::create(id, draft, now);
        match T::PLACEMENT {
            Placement::Append => self.records.push(record.clone()),
            Placement::Prepend => self.records.insert(0, record.clone()),
        }
        Ok(record)
    }

    pub fn update(&mut self, id: &str, patch: &T::Draft) -> Mutation<T> {
        self.modify(id, |r| r.patch(patch))
    }

    pub fn remove(&mut self, id: &str) -> Removal<T> {
        match self.records.iter().position(|r| r.id() == id) {
            Some(idx) => Removal::Removed(self.records.remove(idx)),
            None => Removal::Absent,
        }
    }

    pub fn toggle_status(&mut self, id: &str) -> Result<Mutation<T>, StoreError> {
        if !T::TOGGLES_STATUS {
            return Err(StoreError::Unsupported {
                kind: T::KIND,
                operation: "toggleStatus",
            });
        }
        Ok(self.modify(id, |r| r.toggle_status()))
    }

    /// Apply `f` to the record with this id and return the updated copy.
    pub fn modify(&mut self, id: &str, f: impl FnOnce(&mut T)) -> Mutation<T> {
        match self.records.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                f(record);
                Mutation::Applied(record.clone())
            }
            None => Mutation::NotFound,
        }
    }

    /// Like `modify`, but `f` may refuse the change.
    pub fn try_modify(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut T) -> Result<(), StoreError>,
    ) -> Result<T, StoreError> {
        let Some(record) = self.records.iter_mut().find(|r| r.id() == id) else {
            return Err(StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            });
        };
        let mut next = record.clone();
        f(&mut next)?;
        *record = next.clone();
        Ok(next)
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        ListSnapshot {
            records: self.records.clone(),
            next_id: self.ids.peek(),
        }
    }

    pub fn restore(snapshot: ListSnapshot<T>) -> Self {
        let mut ids = IdSequence::starting_at(snapshot.next_id);
        ids.skip_past(T::ID_PREFIX, snapshot.records.iter().map(|r| r.id()));
        Self {
            records: snapshot.records,
            ids,
        }
    }
}

/// One management screen: the list, its dialog, and notices for each outcome.
#[derive(Debug, Clone)]
pub struct Manager<T: Entity> {
    pub list: EntityList<T>,
    pub dialog: Dialog<T::Draft>,
}

impl<T: Entity> Default for Manager<T> {
    fn default() -> Self {
        Self {
            list: EntityList::new(),
            dialog: Dialog::Closed,
        }
    }
}

impl<T: Entity> Manager<T> {
    pub fn with_list(list: EntityList<T>) -> Self {
        Self {
            list,
            dialog: Dialog::Closed,
        }
    }

    pub fn add(
        &mut self,
        draft: T::Draft,
        sink: &mut dyn NotificationSink,
    ) -> Result<T, StoreError> {
        match self.list.insert(draft, crate::clock::now()) {
            Ok(record) => {
                sink.notify(Notice::success(format!("{} added successfully", T::LABEL)));
                Ok(record)
            }
            Err(e) => {
                sink.notify(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn update(
        &mut self,
        id: &str,
        patch: &T::Draft,
        sink: &mut dyn NotificationSink,
    ) -> Result<T, StoreError> {
        let result = self.list.update(id, patch).found(T::KIND, id);
        match &result {
            Ok(_) => sink.notify(Notice::success(format!(
                "{} updated successfully",
                T::LABEL
            ))),
            Err(_) => sink.notify(Notice::error(format!("{} not found", T::LABEL))),
        }
        result
    }

    pub fn delete(&mut self, id: &str, sink: &mut dyn NotificationSink) -> Removal<T> {
        let removal = self.list.remove(id);
        match &removal {
            Removal::Removed(_) => {
                sink.notify(Notice::success(format!(
                    "{} removed successfully",
                    T::LABEL
                )));
                let showing = matches!(
                    &self.dialog,
                    Dialog::View { id: open, .. } | Dialog::Edit { id: open, .. } if open == id
                );
                if showing {
                    self.dialog = Dialog::Closed;
                }
            }
            Removal::Absent => {
                sink.notify(Notice::info(format!("{} already removed", T::LABEL)))
            }
        }
        removal
    }

    pub fn toggle_status(
        &mut self,
        id: &str,
        sink: &mut dyn NotificationSink,
    ) -> Result<T, StoreError> {
        let result = self
            .list
            .toggle_status(id)
            .and_then(|m| m.found(T::KIND, id));
        match &result {
            Ok(_) => sink.notify(Notice::success(format!("{} status updated", T::LABEL))),
            Err(e) => sink.notify(Notice::error(e.to_string())),
        }
        result
    }

    pub fn open_view(&mut self, id: &str) -> Result<(), StoreError> {
        let draft = self
            .list
            .get(id)
            .map(|r| r.to_draft())
            .ok_or_else(|| StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            })?;
        self.dialog.open_view(id, draft)
    }

    /// Commit the open create/edit dialog. On failure the dialog stays open and
    /// shows the error; the list is unchanged.
    pub fn submit(&mut self, sink: &mut dyn NotificationSink) -> Result<T, StoreError> {
        let (target, draft) = match &self.dialog {
            Dialog::Create { draft, .. } => (None, draft.clone()),
            Dialog::Edit { id, draft, .. } => (Some(id.clone()), draft.clone()),
            Dialog::Closed | Dialog::View { .. } => {
                return Err(StoreError::rejected("no form is open for submission"))
            }
        };
        let result = match target {
            None => self.add(draft, sink),
            Some(id) => self.update(&id, &draft, sink),
        };
        match &result {
            Ok(_) => self.dialog = Dialog::Closed,
            Err(e) => self.dialog.show_error(e.to_string()),
        }
        result
    }
}
