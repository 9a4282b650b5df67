// The assignment aggregate.
//
// Purpose
// - Bind one exam session, one hall and one invigilator to a roster of students.
// - Track presence per roster entry.
//
// Responsibilities
// - Reject empty rosters and students listed twice at construction time.
// - Only ever move a roster entry from absent to present.
// - Never perform input or output.

use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub student_id: String,
    pub is_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub session_id: String,
    pub hall_id: String,
    pub invigilator_id: String,
    students: Vec<RosterEntry>,
    pub encoded_payload: Option<String>,
    pub created_at: i64,
    pub version: u64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("an assignment needs at least one student")]
    Empty,

    #[error("student {0} is listed more than once")]
    DuplicateStudent(String),
}

/// What marking a single roster entry did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceChange {
    NewlyPresent,
    AlreadyPresent,
}

impl Assignment {
    pub fn new(
        id: impl Into<String>,
        session_id: impl Into<String>,
        hall_id: impl Into<String>,
        invigilator_id: impl Into<String>,
        student_ids: &[String],
        created_at: i64,
    ) -> Result<Self, RosterError> {
        if student_ids.is_empty() {
            return Err(RosterError::Empty);
        }
        let mut seen = HashSet::with_capacity(student_ids.len());
        let mut students = Vec::with_capacity(student_ids.len());
        for student_id in student_ids {
            if !seen.insert(student_id.as_str()) {
                return Err(RosterError::DuplicateStudent(student_id.clone()));
            }
            students.push(RosterEntry {
                student_id: student_id.clone(),
                is_present: false,
            });
        }
        Ok(Self {
            id: id.into(),
            session_id: session_id.into(),
            hall_id: hall_id.into(),
            invigilator_id: invigilator_id.into(),
            students,
            encoded_payload: None,
            created_at,
            version: 0,
        })
    }

    pub fn students(&self) -> &[RosterEntry] {
        &self.students
    }

    pub fn student_ids(&self) -> impl Iterator<Item = &str> {
        self.students.iter().map(|entry| entry.student_id.as_str())
    }

    pub fn contains_student(&self, student_id: &str) -> bool {
        self.students.iter().any(|entry| entry.student_id == student_id)
    }

    pub fn is_invigilated_by(&self, user_id: &str) -> bool {
        self.invigilator_id == user_id
    }

    /// Marks the roster entry for `student_id` present. `None` when the student is not on
    /// the roster.
    pub fn mark_present(&mut self, student_id: &str) -> Option<PresenceChange> {
        let entry = self
            .students
            .iter_mut()
            .find(|entry| entry.student_id == student_id)?;
        if entry.is_present {
            return Some(PresenceChange::AlreadyPresent);
        }
        entry.is_present = true;
        Some(PresenceChange::NewlyPresent)
    }

    pub fn assigned_count(&self) -> usize {
        self.students.len()
    }

    pub fn present_count(&self) -> usize {
        self.students.iter().filter(|entry| entry.is_present).count()
    }
}
