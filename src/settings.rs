use serde::{Deserialize, Serialize};

use crate::store::StoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchoolProfile {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub principal_name: String,
    pub established_year: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AcademicSettings {
    pub current_session: String,
    pub start_month: String,
    pub end_month: String,
    pub working_days: Vec<String>,
}

impl Default for AcademicSettings {
    fn default() -> Self {
        Self {
            current_session: "2024-25".to_string(),
            start_month: "April".to_string(),
            end_month: "March".to_string(),
            working_days: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GradingSystem {
    #[default]
    Percentage,
    Grades,
    Cgpa,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBand {
    pub grade: String,
    pub min_score: i64,
    pub max_score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GradingSettings {
    pub system: GradingSystem,
    pub passing_score: i64,
    pub grades: Vec<GradeBand>,
}

impl Default for GradingSettings {
    fn default() -> Self {
        let band = |grade: &str, min_score, max_score| GradeBand {
            grade: grade.to_string(),
            min_score,
            max_score,
        };
        Self {
            system: GradingSystem::Percentage,
            passing_score: 33,
            grades: vec![
                band("A+", 90, 100),
                band("A", 80, 89),
                band("B+", 70, 79),
                band("B", 60, 69),
                band("C", 50, 59),
                band("D", 33, 49),
                band("F", 0, 32),
            ],
        }
    }
}

impl GradingSettings {
    pub fn validate(&self) -> Result<(), StoreError> {
        if !(0..=100).contains(&self.passing_score) {
            return Err(StoreError::rejected("Passing score must be between 0 and 100"));
        }
        if self.grades.is_empty() {
            return Err(StoreError::rejected("At least one grade band is required"));
        }
        if let Some(bad) = self
            .grades
            .iter()
            .find(|b| b.grade.trim().is_empty() || b.min_score > b.max_score)
        {
            return Err(StoreError::rejected(format!(
                "Grade band {:?} has an invalid range",
                bad.grade
            )));
        }
        Ok(())
    }

    /// Highest band whose floor the percentage reaches; below every floor
    /// falls into the lowest band.
    pub fn grade_for(&self, percentage: f64) -> &str {
        let mut bands: Vec<&GradeBand> = self.grades.iter().collect();
        bands.sort_by(|a, b| b.min_score.cmp(&a.min_score));
        bands
            .iter()
            .copied()
            .find(|b| percentage >= b.min_score as f64)
            .or_else(|| bands.last().copied())
            .map(|b| b.grade.as_str())
            .unwrap_or("")
    }

    pub fn passes(&self, percentage: f64) -> bool {
        percentage >= self.passing_score as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub fee_reminders: bool,
    pub attendance_alerts: bool,
    pub exam_notifications: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            sms_notifications: false,
            fee_reminders: true,
            attendance_alerts: true,
            exam_notifications: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissions {
    pub id: String,
    pub name: String,
    pub permissions: Vec<String>,
}

fn default_roles() -> Vec<RolePermissions> {
    let role = |id: &str, name: &str, perms: &[&str]| RolePermissions {
        id: id.to_string(),
        name: name.to_string(),
        permissions: perms.iter().map(|p| p.to_string()).collect(),
    };
    vec![
        role("1", "Super Admin", &["all"]),
        role(
            "2",
            "Admin",
            &["manage_students", "manage_teachers", "manage_fees", "view_reports"],
        ),
        role(
            "3",
            "Teacher",
            &["view_students", "mark_attendance", "upload_marks"],
        ),
        role("4", "Parent", &["view_student", "view_fees", "view_reports"]),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub school_profile: SchoolProfile,
    #[serde(default)]
    pub academic: AcademicSettings,
    #[serde(default)]
    pub grading: GradingSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default = "default_roles")]
    pub roles: Vec<RolePermissions>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            school_profile: SchoolProfile::default(),
            academic: AcademicSettings::default(),
            grading: GradingSettings::default(),
            notifications: NotificationSettings::default(),
            roles: default_roles(),
        }
    }
}

pub const SECTIONS: [&str; 5] = ["schoolProfile", "academic", "grading", "notifications", "roles"];

impl Settings {
    pub fn section(&self, name: &str) -> Option<serde_json::Value> {
        let v = match name {
            "schoolProfile" => serde_json::to_value(&self.school_profile),
            "academic" => serde_json::to_value(&self.academic),
            "grading" => serde_json::to_value(&self.grading),
            "notifications" => serde_json::to_value(&self.notifications),
            "roles" => serde_json::to_value(&self.roles),
            _ => return None,
        };
        v.ok()
    }

    /// Replace one section. Returns the notice text for the saved section.
    pub fn replace_section(
        &mut self,
        name: &str,
        value: serde_json::Value,
    ) -> Result<&'static str, StoreError> {
        let bad = |e: serde_json::Error| StoreError::rejected(format!("invalid {name}: {e}"));
        match name {
            "schoolProfile" => {
                self.school_profile = serde_json::from_value(value).map_err(bad)?;
                Ok("School profile saved successfully")
            }
            "academic" => {
                let academic: AcademicSettings = serde_json::from_value(value).map_err(bad)?;
                if academic.working_days.is_empty() {
                    return Err(StoreError::rejected("Select at least one working day"));
                }
                self.academic = academic;
                Ok("Academic settings saved successfully")
            }
            "grading" => {
                let grading: GradingSettings = serde_json::from_value(value).map_err(bad)?;
                grading.validate()?;
                self.grading = grading;
                Ok("Grading settings saved successfully")
            }
            "notifications" => {
                self.notifications = serde_json::from_value(value).map_err(bad)?;
                Ok("Notification settings saved successfully")
            }
            "roles" => {
                self.roles = serde_json::from_value(value).map_err(bad)?;
                Ok("Roles saved successfully")
            }
            other => Err(StoreError::rejected(format!(
                "unknown settings section: {other}"
            ))),
        }
    }
}
