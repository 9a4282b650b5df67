// Scan payload codec.
//
// Purpose
// - Turn an assignment and its referenced records into a self-contained JSON snapshot that
//   the presentation layer renders as a scannable code.
// - Turn scanned text back into a structured payload.
//
// Responsibilities
// - Keep stable identifiers readable as-is and wrap every display field in `Untrusted`.
// - The embedded invigilator block is untrusted as a whole, including its id.
//
// Boundaries
// - Decoding never consults a store. Deciding what a payload is allowed to do belongs to the
//   attendance handler, which re-resolves the canonical assignment by id.

use crate::core::assignment::Assignment;
use crate::core::reference::{ExamSession, Hall, Invigilator, Student};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data copied into a payload for display only. It can be forged by whoever produced the
/// scan, so it must never drive matching or authorization.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Untrusted<T>(T);

impl<T> Untrusted<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn for_display(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Untrusted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Untrusted({:?})", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRef {
    pub id: String,
    pub course_code: Untrusted<String>,
    pub course_title: Untrusted<String>,
    pub date: Untrusted<Option<NaiveDate>>,
    pub start_time: Untrusted<Option<NaiveTime>>,
    pub end_time: Untrusted<Option<NaiveTime>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HallRef {
    pub id: String,
    pub name: Untrusted<String>,
    pub location: Untrusted<Option<String>>,
    pub capacity: Untrusted<Option<u32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvigilatorSnapshot {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentRef {
    pub id: String,
    pub name: Untrusted<String>,
    pub matric: Untrusted<String>,
    pub email: Untrusted<String>,
    pub level: Untrusted<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPayload {
    pub assignment_id: String,
    #[serde(default)]
    pub exam: SessionRef,
    #[serde(default)]
    pub hall: HallRef,
    #[serde(default)]
    pub teacher: Untrusted<InvigilatorSnapshot>,
    #[serde(default)]
    pub students: Vec<StudentRef>,
    #[serde(default)]
    pub assigned_at: i64,
}

impl ScanPayload {
    pub fn student_ids(&self) -> impl Iterator<Item = &str> {
        self.students.iter().map(|student| student.id.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is not valid: {0}")]
    Malformed(String),

    #[error("payload has no assignment id")]
    MissingAssignmentId,

    #[error("payload lists no students")]
    NoStudents,
}

/// Snapshot of `assignment` and its references. Only students on the assignment's roster
/// are embedded, in roster order.
pub fn encode(
    assignment: &Assignment,
    session: &ExamSession,
    hall: &Hall,
    invigilator: &Invigilator,
    students: &[Student],
) -> Result<String, serde_json::Error> {
    let students = assignment
        .student_ids()
        .filter_map(|id| students.iter().find(|student| student.id == id))
        .map(|student| StudentRef {
            id: student.id.clone(),
            name: Untrusted::new(student.name.clone()),
            matric: Untrusted::new(student.matric_number.clone()),
            email: Untrusted::new(student.email.clone()),
            level: Untrusted::new(student.level.clone()),
        })
        .collect();

    let payload = ScanPayload {
        assignment_id: assignment.id.clone(),
        exam: SessionRef {
            id: session.id.clone(),
            course_code: Untrusted::new(session.course_code.clone()),
            course_title: Untrusted::new(session.course_title.clone()),
            date: Untrusted::new(Some(session.date)),
            start_time: Untrusted::new(session.start_time),
            end_time: Untrusted::new(session.end_time),
        },
        hall: HallRef {
            id: hall.id.clone(),
            name: Untrusted::new(hall.name.clone()),
            location: Untrusted::new(hall.location.clone()),
            capacity: Untrusted::new(hall.capacity),
        },
        teacher: Untrusted::new(InvigilatorSnapshot {
            id: invigilator.id.clone(),
            name: invigilator.name.clone(),
            email: invigilator.email.clone(),
            department: invigilator.department.clone(),
        }),
        students,
        assigned_at: assignment.created_at,
    };
    serde_json::to_string(&payload)
}

pub fn decode(payload: &str) -> Result<ScanPayload, DecodeError> {
    let parsed: ScanPayload =
        serde_json::from_str(payload).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    validate(parsed)
}

/// Same as [`decode`] for a payload the presentation layer already parsed into JSON.
pub fn decode_value(payload: serde_json::Value) -> Result<ScanPayload, DecodeError> {
    let parsed: ScanPayload =
        serde_json::from_value(payload).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    validate(parsed)
}

fn validate(payload: ScanPayload) -> Result<ScanPayload, DecodeError> {
    if payload.assignment_id.trim().is_empty() {
        return Err(DecodeError::MissingAssignmentId);
    }
    if payload.students.is_empty() {
        return Err(DecodeError::NoStudents);
    }
    Ok(payload)
}
