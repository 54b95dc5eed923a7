use serde::Serialize;

use crate::session::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

const fn link(label: &'static str, href: &'static str) -> NavLink {
    NavLink { label, href }
}

pub const PUBLIC_PATHS: [&str; 4] = ["/", "/features", "/pricing", "/contact"];
pub const LOGIN_PATH: &str = "/login";

const ADMIN_NAV: [NavLink; 9] = [
    link("Dashboard", "/admin"),
    link("Teachers", "/admin/teachers"),
    link("Students", "/admin/students"),
    link("Parents", "/admin/parents"),
    link("Academics", "/admin/academics"),
    link("Fees & Accounts", "/admin/fees"),
    link("Communication", "/admin/communication"),
    link("Reports", "/admin/reports"),
    link("Settings", "/admin/settings"),
];

const TEACHER_NAV: [NavLink; 7] = [
    link("Dashboard", "/teacher"),
    link("My Classes", "/teacher/classes"),
    link("Attendance", "/teacher/attendance"),
    link("Homework", "/teacher/homework"),
    link("Marks Entry", "/teacher/marks"),
    link("Messages", "/teacher/messages"),
    link("Profile", "/teacher/profile"),
];

const PARENT_NAV: [NavLink; 7] = [
    link("Dashboard", "/parent"),
    link("Student Profile", "/parent/student"),
    link("Attendance", "/parent/attendance"),
    link("Homework", "/parent/homework"),
    link("Results", "/parent/results"),
    link("Fees", "/parent/fees"),
    link("Messages", "/parent/messages"),
];

pub fn nav_for(role: Role) -> &'static [NavLink] {
    match role {
        Role::Admin => &ADMIN_NAV,
        Role::Teacher => &TEACHER_NAV,
        Role::Parent => &PARENT_NAV,
    }
}

pub fn home_route(role: Role) -> &'static str {
    nav_for(role)[0].href
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RouteMatch {
    Public { path: &'static str },
    Login,
    Dashboard { role: Role, label: &'static str },
    NotFound,
}

pub fn resolve(path: &str) -> RouteMatch {
    let path = match path.trim() {
        "" => "/",
        p if p.len() > 1 => p.trim_end_matches('/'),
        p => p,
    };
    if let Some(public) = PUBLIC_PATHS.iter().find(|p| **p == path) {
        return RouteMatch::Public { path: public };
    }
    if path == LOGIN_PATH {
        return RouteMatch::Login;
    }
    for role in Role::ALL {
        if let Some(l) = nav_for(role).iter().find(|l| l.href == path) {
            return RouteMatch::Dashboard {
                role,
                label: l.label,
            };
        }
    }
    RouteMatch::NotFound
}
