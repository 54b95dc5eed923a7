use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

/// A toast: what the user is told after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: Level,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn new(level: Level, title: &str, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn success(description: impl Into<String>) -> Self {
        Self::new(Level::Success, "Success", description)
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::new(Level::Error, "Error", description)
    }

    pub fn warning(description: impl Into<String>) -> Self {
        Self::new(Level::Warning, "Warning", description)
    }

    pub fn info(description: impl Into<String>) -> Self {
        Self::new(Level::Info, "Info", description)
    }
}

pub trait NotificationSink {
    fn notify(&mut self, notice: Notice);
}

/// How many undrained notices are kept; older ones are dropped first.
pub const NOTICE_CAP: usize = 64;

/// Notices raised since the shell last drained them, newest last.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: VecDeque<Notice>,
    raised: u64,
}

impl NoticeLog {
    pub fn last(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Notices raised over the log's lifetime, drained or not.
    pub fn raised(&self) -> u64 {
        self.raised
    }
}

impl NotificationSink for NoticeLog {
    fn notify(&mut self, notice: Notice) {
        match notice.level {
            Level::Error | Level::Warning => {
                tracing::warn!(title = %notice.title, "{}", notice.description)
            }
            Level::Success | Level::Info => {
                tracing::debug!(title = %notice.title, "{}", notice.description)
            }
        }
        if self.notices.len() == NOTICE_CAP {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
        self.raised += 1;
    }
}
