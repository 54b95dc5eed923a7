//! Demo rows loaded by `--seed-sample`.

use crate::entities::finance::FeeRecord;
use crate::entities::people::{StaffStatus, Student, Teacher};
use crate::entities::{ActiveStatus, FeeStatus};

fn classes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

#[rustfmt::skip]
pub fn teachers() -> Vec<Teacher> {
    let row = |n: u32, name: &str, email: &str, subject: &str, cls: &[&str], status, joined: &str| {
        Teacher {
            id: format!("T{n}"),
            name: name.to_string(),
            email: email.to_string(),
            phone: format!("+91 98765 4321{}", n - 1),
            subject: subject.to_string(),
            classes: classes(cls),
            status,
            join_date: joined.to_string(),
        }
    };
    vec![
        row(1, "Dr. Rajesh Kumar", "rajesh.kumar@school.edu", "Mathematics", &["10-A", "10-B", "11-A"], StaffStatus::Active, "2020-06-15"),
        row(2, "Mrs. Priya Sharma", "priya.sharma@school.edu", "English", &["9-A", "9-B", "10-A"], StaffStatus::Active, "2019-03-20"),
        row(3, "Mr. Anil Verma", "anil.verma@school.edu", "Physics", &["11-A", "11-B", "12-A"], StaffStatus::Active, "2021-07-10"),
        row(4, "Mrs. Sunita Patel", "sunita.patel@school.edu", "Chemistry", &["11-A", "12-A", "12-B"], StaffStatus::OnLeave, "2018-01-05"),
        row(5, "Mr. Vikram Singh", "vikram.singh@school.edu", "Biology", &["9-A", "10-A", "11-A"], StaffStatus::Active, "2022-08-01"),
    ]
}

#[rustfmt::skip]
pub fn students() -> Vec<Student> {
    let row = |n: u32, name: &str, class: &str, roll_no, parent: &str, fee_status, attendance| Student {
        id: format!("STU{n:03}"),
        name: name.to_string(),
        class: class.to_string(),
        roll_no,
        parent_name: parent.to_string(),
        phone: format!("+91 98765 4321{}", n - 1),
        fee_status,
        attendance,
        status: ActiveStatus::Active,
    };
    vec![
        row(1, "Aarav Sharma", "10-A", 1, "Mr. Rakesh Sharma", FeeStatus::Paid, 95),
        row(2, "Ananya Patel", "10-A", 2, "Mrs. Sunita Patel", FeeStatus::Paid, 98),
        row(3, "Arjun Verma", "10-A", 3, "Mr. Anil Verma", FeeStatus::Pending, 88),
        row(4, "Diya Singh", "10-B", 1, "Mr. Vikram Singh", FeeStatus::Paid, 92),
        row(5, "Ishaan Kumar", "10-B", 2, "Dr. Rajesh Kumar", FeeStatus::Partial, 85),
    ]
}

pub fn fees() -> Vec<FeeRecord> {
    let row = |n: u32, student: &str, class: &str, paid: i64, last: Option<&str>| {
        let due = 75_000 - paid;
        FeeRecord {
            id: format!("F{n}"),
            student: student.to_string(),
            class: class.to_string(),
            total_fee: 75_000,
            paid,
            due,
            status: if due == 0 {
                FeeStatus::Paid
            } else if paid == 0 {
                FeeStatus::Pending
            } else {
                FeeStatus::Partial
            },
            last_payment: last.map(str::to_string),
        }
    };
    vec![
        row(1, "Aarav Sharma", "10-A", 75_000, Some("2024-01-05")),
        row(2, "Ananya Patel", "10-A", 75_000, Some("2024-01-03")),
        row(3, "Arjun Verma", "10-A", 50_000, Some("2023-12-15")),
        row(4, "Diya Singh", "10-B", 75_000, Some("2024-01-02")),
        row(5, "Ishaan Kumar", "10-B", 0, None),
    ]
}
