//! Sign-in boundary.
//!
//! The dashboards only need to know who is signed in and under which role.
//! `IdentityProvider` is the seam a real directory plugs into; the stub accepts
//! any non-blank credentials and hands back a fixed display user per role.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::routes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Parent,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Parent];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Teacher => "Teacher",
            Role::Parent => "Parent",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.as_str() == raw.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,
}

pub trait IdentityProvider {
    fn sign_in(&self, role: Role, credentials: &Credentials) -> Result<User, AuthError>;
}

/// Placeholder provider: no credential check at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubIdentityProvider;

impl StubIdentityProvider {
    pub fn display_user(role: Role) -> User {
        let (name, email) = match role {
            Role::Admin => ("Admin User", "admin@school.edu"),
            Role::Teacher => ("Dr. Rajesh Kumar", "rajesh@school.edu"),
            Role::Parent => ("Mr. Rakesh Sharma", "rakesh@school.edu"),
        };
        User {
            name: name.to_string(),
            email: email.to_string(),
            role,
        }
    }
}

impl IdentityProvider for StubIdentityProvider {
    fn sign_in(&self, role: Role, credentials: &Credentials) -> Result<User, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(Self::display_user(role))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: Uuid,
    pub user: User,
    pub home: &'static str,
    pub started_at: String,
}

impl Session {
    pub fn open(user: User, now: NaiveDateTime) -> Self {
        Self {
            token: Uuid::new_v4(),
            home: routes::home_route(user.role),
            user,
            started_at: crate::clock::stamp_text(now),
        }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }
}
