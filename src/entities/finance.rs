use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{blank_fields, lenient_int, overwrite, text_or_number, trimmed, FeeStatus};
use crate::clock;
use crate::store::{Draft, Entity, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecord {
    pub id: String,
    pub student: String,
    pub class: String,
    pub total_fee: i64,
    pub paid: i64,
    pub due: i64,
    pub status: FeeStatus,
    pub last_payment: Option<String>,
}

impl FeeRecord {
    fn settle(&mut self) {
        self.total_fee = self.total_fee.max(0);
        self.paid = self.paid.clamp(0, self.total_fee);
        self.due = self.total_fee - self.paid;
        self.status = if self.due == 0 {
            FeeStatus::Paid
        } else if self.paid == 0 {
            FeeStatus::Pending
        } else {
            FeeStatus::Partial
        };
    }

    /// Record a payment. Anything above the outstanding amount is not taken.
    /// Returns the amount actually applied.
    pub fn collect(&mut self, amount: i64, on: NaiveDate) -> Result<i64, StoreError> {
        if amount <= 0 {
            return Err(StoreError::rejected("Payment amount must be positive"));
        }
        if self.due == 0 {
            return Err(StoreError::rejected("No dues outstanding"));
        }
        let applied = amount.min(self.due);
        self.paid += applied;
        self.last_payment = Some(clock::date_text(on));
        self.settle();
        Ok(applied)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeeDraft {
    pub student: String,
    pub class: String,
    #[serde(deserialize_with = "text_or_number")]
    pub total_fee: String,
    #[serde(deserialize_with = "text_or_number")]
    pub paid: String,
}

impl Draft for FeeDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[
            ("student", self.student.as_str()),
            ("class", self.class.as_str()),
        ])
    }
}

impl Entity for FeeRecord {
    type Draft = FeeDraft;

    const KIND: &'static str = "fees";
    const LABEL: &'static str = "Fee record";
    const ID_PREFIX: &'static str = "F";

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: String, draft: FeeDraft, now: NaiveDateTime) -> Self {
        let paid = lenient_int(&draft.paid);
        let mut record = Self {
            id,
            student: trimmed(&draft.student),
            class: trimmed(&draft.class),
            total_fee: lenient_int(&draft.total_fee),
            paid,
            due: 0,
            status: FeeStatus::Pending,
            last_payment: (paid > 0).then(|| clock::date_text(now.date())),
        };
        record.settle();
        record
    }

    fn patch(&mut self, draft: &FeeDraft) {
        overwrite(&mut self.student, &draft.student);
        overwrite(&mut self.class, &draft.class);
        if !draft.total_fee.trim().is_empty() {
            self.total_fee = lenient_int(&draft.total_fee);
        }
        if !draft.paid.trim().is_empty() {
            self.paid = lenient_int(&draft.paid);
        }
        self.settle();
    }

    fn to_draft(&self) -> FeeDraft {
        FeeDraft {
            student: self.student.clone(),
            class: self.class.clone(),
            total_fee: self.total_fee.to_string(),
            paid: self.paid.to_string(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.student.as_str(), self.id.as_str(), self.class.as_str()]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            "status" => Some(self.status.as_str()),
            "class" => Some(self.class.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSummary {
    pub total_collected: i64,
    pub pending_dues: i64,
    pub fully_paid: usize,
    pub defaulters: usize,
}

impl FeeSummary {
    pub fn of<'a>(records: impl IntoIterator<Item = &'a FeeRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut acc, r| {
            acc.total_collected = acc.total_collected.saturating_add(r.paid);
            acc.pending_dues = acc.pending_dues.saturating_add(r.due);
            match r.status {
                FeeStatus::Paid => acc.fully_paid += 1,
                FeeStatus::Pending => acc.defaulters += 1,
                FeeStatus::Partial => {}
            }
            acc
        })
    }
}
