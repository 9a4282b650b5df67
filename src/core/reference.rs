// Reference records the assignment workflow points at.
//
// Purpose
// - Describe exam sessions, halls, invigilators and students as the core sees them.
// - Describe the acting identity handed to the core by the identity port.
//
// Boundaries
// - The core never mutates these records. Creating and editing them belongs to the
//   reference data store.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSession {
    pub id: String,
    pub course_code: String,
    pub course_title: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hall {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub matric_number: String,
    pub email: String,
    pub name: String,
    pub department: String,
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invigilator {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
}

/// The identity performing a request, as resolved by the identity port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    pub fn teacher(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Teacher,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act on behalf of anyone, teachers only on their own behalf.
    pub fn may_act_for(&self, user_id: &str) -> bool {
        self.is_admin() || self.user_id == user_id
    }
}

/// Criteria for listing registered students. All set criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFilter {
    pub level: Option<String>,
    pub department: Option<String>,
    pub search: Option<String>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        if let Some(level) = non_blank(&self.level) {
            let matches_level = student
                .level
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(level));
            if !matches_level {
                return false;
            }
        }
        if let Some(department) = non_blank(&self.department) {
            if !student.department.eq_ignore_ascii_case(department) {
                return false;
            }
        }
        match non_blank(&self.search) {
            Some(needle) => student_matches_text(student, needle),
            None => true,
        }
    }
}

/// Case-insensitive substring match over a student's name, matric number and email.
pub fn student_matches_text(student: &Student, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [&student.name, &student.matric_number, &student.email]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod reference_tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn student() -> Student {
        Student {
            id: "stu-0001".to_string(),
            matric_number: "CSC/2021/001".to_string(),
            email: "ada.obi@uni.example".to_string(),
            name: "Ada Obi".to_string(),
            department: "Computer Science".to_string(),
            level: Some("300".to_string()),
        }
    }

    #[rstest]
    fn it_should_match_everything_with_an_empty_filter(student: Student) {
        assert!(StudentFilter::default().matches(&student));
    }

    #[rstest]
    #[case("ada", true)]
    #[case("csc/2021", true)]
    #[case("UNI.EXAMPLE", true)]
    #[case("bola", false)]
    fn it_should_search_name_matric_and_email(
        student: Student,
        #[case] search: &str,
        #[case] expected: bool,
    ) {
        let filter = StudentFilter {
            search: Some(search.to_string()),
            ..StudentFilter::default()
        };
        assert_eq!(filter.matches(&student), expected);
    }

    #[rstest]
    fn it_should_combine_level_and_department(student: Student) {
        let filter = StudentFilter {
            level: Some("300".to_string()),
            department: Some("computer science".to_string()),
            search: None,
        };
        assert!(filter.matches(&student));

        let wrong_level = StudentFilter {
            level: Some("400".to_string()),
            ..filter
        };
        assert!(!wrong_level.matches(&student));
    }

    #[rstest]
    fn it_should_only_let_admins_act_for_others() {
        let admin = Actor::admin("adm-1");
        let teacher = Actor::teacher("tch-1");
        assert!(admin.may_act_for("tch-2"));
        assert!(teacher.may_act_for("tch-1"));
        assert!(!teacher.may_act_for("tch-2"));
    }
}
