// Shared test fixtures: reference records and a seeded pair of in-memory stores.
// Compiled only for tests through `crate::test_support`.

use crate::adapters::in_memory::in_memory_assignment_store::InMemoryAssignmentStore;
use crate::adapters::in_memory::in_memory_reference_data::InMemoryReferenceData;
use crate::application::command_handlers::create_assignment_handler::{persist_new, resolve_context};
use crate::core::assignment::Assignment;
use crate::core::ports::{AssignmentRepository, ReferenceData, ReferenceRegistry};
use crate::core::reference::{Actor, ExamSession, Hall, Invigilator, Student};
use chrono::NaiveDate;
use rstest::fixture;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

pub const SEEDED_STUDENTS: usize = 10;

pub fn exam_session(id: &str) -> ExamSession {
    ExamSession {
        id: id.to_string(),
        course_code: "CSC301".to_string(),
        course_title: "Operating Systems".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        start_time: None,
        end_time: None,
        duration: "2h".to_string(),
    }
}

pub fn hall(id: &str) -> Hall {
    Hall {
        id: id.to_string(),
        name: format!("Hall {id}"),
        location: Some("Main campus".to_string()),
        capacity: Some(120),
    }
}

pub fn invigilator(id: &str) -> Invigilator {
    Invigilator {
        id: id.to_string(),
        name: format!("Invigilator {id}"),
        email: format!("{id}@staff.uni.example"),
        department: Some("Computer Science".to_string()),
    }
}

pub fn student(id: &str) -> Student {
    Student {
        id: id.to_string(),
        matric_number: format!("MAT/{id}"),
        email: format!("{id}@uni.example"),
        name: format!("Student {id}"),
        department: "Computer Science".to_string(),
        level: Some("300".to_string()),
    }
}

pub struct Seeded {
    pub store: Arc<InMemoryAssignmentStore>,
    pub reference: Arc<InMemoryReferenceData>,
    pub admin: Actor,
    pub teacher: Actor,
    pub other_teacher: Actor,
    pub session_id: String,
    pub other_session_id: String,
    pub hall_id: String,
    pub other_hall_id: String,
    clock: AtomicI64,
}

impl Seeded {
    /// Assigns students to the default session and hall, invigilated by `teacher`.
    pub async fn assign(&self, student_ids: &[&str]) -> Assignment {
        self.insert(&self.session_id, &self.hall_id, &self.teacher.user_id, student_ids)
            .await
    }

    pub async fn assign_in(&self, session_id: &str, hall_id: &str, student_ids: &[&str]) -> Assignment {
        self.insert(session_id, hall_id, &self.teacher.user_id, student_ids)
            .await
    }

    pub async fn assign_for(&self, invigilator_id: &str, student_ids: &[&str]) -> Assignment {
        self.insert(&self.session_id, &self.hall_id, invigilator_id, student_ids)
            .await
    }

    /// Marks students present straight through the store.
    pub async fn mark(&self, assignment_id: &str, student_ids: &[&str]) -> Assignment {
        let mut assignment = self.store.get(assignment_id).await.unwrap().unwrap();
        for student_id in student_ids {
            assignment.mark_present(student_id).unwrap();
        }
        let version = assignment.version;
        self.store.save(assignment, version).await.unwrap()
    }

    async fn insert(
        &self,
        session_id: &str,
        hall_id: &str,
        invigilator_id: &str,
        student_ids: &[&str],
    ) -> Assignment {
        let context = resolve_context(&*self.reference, session_id, hall_id, invigilator_id)
            .await
            .unwrap();
        let mut students = Vec::with_capacity(student_ids.len());
        for id in student_ids {
            students.push(self.reference.student(id).await.unwrap().unwrap());
        }
        // strictly increasing timestamps keep the oldest-first order deterministic
        let created_at = self.clock.fetch_add(1_000, Ordering::Relaxed);
        persist_new(&*self.store, &context, &students, created_at)
            .await
            .unwrap()
    }
}

#[fixture]
pub async fn seeded() -> Seeded {
    let reference = InMemoryReferenceData::new();
    for id in ["exm-0001", "exm-0002"] {
        reference.add_session(exam_session(id)).await.unwrap();
    }
    for id in ["hal-0001", "hal-0002"] {
        reference.add_hall(hall(id)).await.unwrap();
    }
    for id in ["adm-0001", "tch-0001", "tch-0002"] {
        reference.add_invigilator(invigilator(id)).await.unwrap();
    }
    for n in 1..=SEEDED_STUDENTS {
        reference
            .add_student(student(&format!("stu-{n:04}")))
            .await
            .unwrap();
    }

    Seeded {
        store: Arc::new(InMemoryAssignmentStore::new()),
        reference: Arc::new(reference),
        admin: Actor::admin("adm-0001"),
        teacher: Actor::teacher("tch-0001"),
        other_teacher: Actor::teacher("tch-0002"),
        session_id: "exm-0001".to_string(),
        other_session_id: "exm-0002".to_string(),
        hall_id: "hal-0001".to_string(),
        other_hall_id: "hal-0002".to_string(),
        clock: AtomicI64::new(1_700_000_000_000),
    }
}
