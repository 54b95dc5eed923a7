use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::notify::NoticeLog;
use crate::school::School;
use crate::session::{IdentityProvider, Session, StubIdentityProvider};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub school: School,
    pub session: Option<Session>,
    pub identity: Box<dyn IdentityProvider>,
    pub notices: NoticeLog,
}

impl AppState {
    pub fn new(school: School) -> Self {
        Self {
            workspace: None,
            db: None,
            school,
            session: None,
            identity: Box::new(StubIdentityProvider),
            notices: NoticeLog::default(),
        }
    }
}
