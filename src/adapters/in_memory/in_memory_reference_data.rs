// In memory reference data store.
//
// Purpose
// - Hold exam sessions, halls, invigilators and students for tests and local development.
//
// Responsibilities
// - Hall names are unique. Student matric numbers and emails are unique.

use crate::core::ports::{ReferenceData, ReferenceDataError, ReferenceRegistry};
use crate::core::reference::{ExamSession, Hall, Invigilator, Student, StudentFilter};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryReferenceData {
    sessions: RwLock<HashMap<String, ExamSession>>,
    halls: RwLock<HashMap<String, Hall>>,
    invigilators: RwLock<HashMap<String, Invigilator>>,
    students: RwLock<Vec<Student>>,
    is_offline: bool,
}

impl InMemoryReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    fn ensure_online(&self) -> Result<(), ReferenceDataError> {
        if self.is_offline {
            return Err(ReferenceDataError::Backend(
                "Reference data store offline".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReferenceRegistry for InMemoryReferenceData {
    async fn add_session(&self, session: ExamSession) -> Result<(), ReferenceDataError> {
        self.ensure_online()?;
        let mut guard = self.sessions.write().await;
        if guard.contains_key(&session.id) {
            return Err(ReferenceDataError::Duplicate(format!(
                "exam session {}",
                session.id
            )));
        }
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    async fn add_hall(&self, hall: Hall) -> Result<(), ReferenceDataError> {
        self.ensure_online()?;
        let mut guard = self.halls.write().await;
        if guard.contains_key(&hall.id) || guard.values().any(|h| h.name == hall.name) {
            return Err(ReferenceDataError::Duplicate(format!("hall {}", hall.name)));
        }
        guard.insert(hall.id.clone(), hall);
        Ok(())
    }

    async fn add_invigilator(&self, invigilator: Invigilator) -> Result<(), ReferenceDataError> {
        self.ensure_online()?;
        let mut guard = self.invigilators.write().await;
        if guard.contains_key(&invigilator.id) {
            return Err(ReferenceDataError::Duplicate(format!(
                "invigilator {}",
                invigilator.id
            )));
        }
        guard.insert(invigilator.id.clone(), invigilator);
        Ok(())
    }

    async fn add_student(&self, student: Student) -> Result<(), ReferenceDataError> {
        self.ensure_online()?;
        let mut guard = self.students.write().await;
        if let Some(existing) = guard.iter().find(|s| {
            s.id == student.id || s.matric_number == student.matric_number || s.email == student.email
        }) {
            let field = if existing.id == student.id {
                "id"
            } else if existing.matric_number == student.matric_number {
                "matric number"
            } else {
                "email"
            };
            return Err(ReferenceDataError::Duplicate(format!(
                "student with this {field}"
            )));
        }
        guard.push(student);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReferenceData for InMemoryReferenceData {
    async fn session(&self, id: &str) -> Result<Option<ExamSession>, ReferenceDataError> {
        self.ensure_online()?;
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn hall(&self, id: &str) -> Result<Option<Hall>, ReferenceDataError> {
        self.ensure_online()?;
        Ok(self.halls.read().await.get(id).cloned())
    }

    async fn invigilator(&self, id: &str) -> Result<Option<Invigilator>, ReferenceDataError> {
        self.ensure_online()?;
        Ok(self.invigilators.read().await.get(id).cloned())
    }

    async fn student(&self, id: &str) -> Result<Option<Student>, ReferenceDataError> {
        self.ensure_online()?;
        Ok(self
            .students
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn students(&self, filter: &StudentFilter) -> Result<Vec<Student>, ReferenceDataError> {
        self.ensure_online()?;
        Ok(self
            .students
            .read()
            .await
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn sessions(&self) -> Result<Vec<ExamSession>, ReferenceDataError> {
        self.ensure_online()?;
        let mut sessions: Vec<ExamSession> = self.sessions.read().await.values().cloned().collect();
        sessions.sort_by(|a, b| {
            (a.date, &a.course_code, &a.id).cmp(&(b.date, &b.course_code, &b.id))
        });
        Ok(sessions)
    }

    async fn halls(&self) -> Result<Vec<Hall>, ReferenceDataError> {
        self.ensure_online()?;
        let mut halls: Vec<Hall> = self.halls.read().await.values().cloned().collect();
        halls.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(halls)
    }

    async fn invigilators(&self) -> Result<Vec<Invigilator>, ReferenceDataError> {
        self.ensure_online()?;
        let mut invigilators: Vec<Invigilator> =
            self.invigilators.read().await.values().cloned().collect();
        invigilators.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        Ok(invigilators)
    }
}

#[cfg(test)]
mod in_memory_reference_data_tests {
    use super::*;
    use crate::test_support::fixtures::{exam_session, hall, invigilator, student};
    use rstest::{fixture, rstest};

    #[fixture]
    fn reference() -> InMemoryReferenceData {
        InMemoryReferenceData::new()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_resolve_added_records(reference: InMemoryReferenceData) {
        reference.add_session(exam_session("exm-1")).await.unwrap();
        reference.add_hall(hall("hal-1")).await.unwrap();
        reference.add_invigilator(invigilator("tch-1")).await.unwrap();
        reference.add_student(student("stu-1")).await.unwrap();

        assert!(reference.session("exm-1").await.unwrap().is_some());
        assert!(reference.hall("hal-1").await.unwrap().is_some());
        assert!(reference.invigilator("tch-1").await.unwrap().is_some());
        assert_eq!(
            reference.student("stu-1").await.unwrap(),
            Some(student("stu-1"))
        );
        assert_eq!(reference.student("stu-2").await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_duplicate_hall_name(reference: InMemoryReferenceData) {
        reference.add_hall(hall("hal-1")).await.unwrap();
        let mut same_name = hall("hal-2");
        same_name.name = hall("hal-1").name;
        assert_eq!(
            reference.add_hall(same_name).await,
            Err(ReferenceDataError::Duplicate("hall Hall hal-1".into()))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_duplicate_student_email(reference: InMemoryReferenceData) {
        reference.add_student(student("stu-1")).await.unwrap();
        let mut same_email = student("stu-2");
        same_email.email = student("stu-1").email;
        assert_eq!(
            reference.add_student(same_email).await,
            Err(ReferenceDataError::Duplicate("student with this email".into()))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_filter_students(reference: InMemoryReferenceData) {
        reference.add_student(student("stu-1")).await.unwrap();
        let mut senior = student("stu-2");
        senior.level = Some("400".into());
        reference.add_student(senior).await.unwrap();

        let filter = StudentFilter {
            level: Some("400".into()),
            ..StudentFilter::default()
        };
        let found = reference.students(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "stu-2");
        assert_eq!(
            reference
                .students(&StudentFilter::default())
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_list_halls_sessions_and_invigilators_in_a_stable_order(
        reference: InMemoryReferenceData,
    ) {
        reference.add_hall(hall("hal-2")).await.unwrap();
        reference.add_hall(hall("hal-1")).await.unwrap();
        let mut later = exam_session("exm-1");
        later.date = later.date.succ_opt().unwrap();
        reference.add_session(later).await.unwrap();
        reference.add_session(exam_session("exm-2")).await.unwrap();
        reference.add_invigilator(invigilator("tch-2")).await.unwrap();
        reference.add_invigilator(invigilator("tch-1")).await.unwrap();

        let halls: Vec<String> = reference.halls().await.unwrap().into_iter().map(|h| h.id).collect();
        assert_eq!(halls, vec!["hal-1", "hal-2"]);
        let sessions: Vec<String> = reference
            .sessions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(sessions, vec!["exm-2", "exm-1"]);
        let invigilators: Vec<String> = reference
            .invigilators()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(invigilators, vec!["tch-1", "tch-2"]);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_if_the_store_is_offline(reference: InMemoryReferenceData) {
        let mut reference = reference;
        reference.toggle_offline();
        let result = reference.student("stu-1").await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Reference data store offline")
        );
    }
}
