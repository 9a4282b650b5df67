// Demo reference data and bearer tokens for local runs.

use crate::adapters::in_memory::in_memory_identity::InMemoryIdentityProvider;
use crate::adapters::in_memory::in_memory_reference_data::InMemoryReferenceData;
use crate::core::ports::{ReferenceDataError, ReferenceRegistry};
use crate::core::reference::{Actor, ExamSession, Hall, Invigilator, Student};
use chrono::{NaiveDate, NaiveTime};

pub const DEMO_ADMIN_TOKEN: &str = "demo-admin";
pub const DEMO_TEACHER_TOKEN: &str = "demo-teacher";

pub async fn seed_demo(
    reference: &InMemoryReferenceData,
    identity: &InMemoryIdentityProvider,
) -> Result<(), ReferenceDataError> {
    reference
        .add_session(ExamSession {
            id: "exm-demo-0001".into(),
            course_code: "CSC301".into(),
            course_title: "Operating Systems".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap_or_default(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(11, 0, 0),
            duration: "2h".into(),
        })
        .await?;
    reference
        .add_hall(Hall {
            id: "hal-demo-0001".into(),
            name: "Main Hall".into(),
            location: Some("North campus".into()),
            capacity: Some(200),
        })
        .await?;
    reference
        .add_invigilator(Invigilator {
            id: "tch-demo-0001".into(),
            name: "Demo Invigilator".into(),
            email: "invigilator@uni.example".into(),
            department: Some("Computer Science".into()),
        })
        .await?;
    for n in 1..=5 {
        reference
            .add_student(Student {
                id: format!("stu-demo-{n:04}"),
                matric_number: format!("CSC/2021/{n:03}"),
                email: format!("student{n}@uni.example"),
                name: format!("Demo Student {n}"),
                department: "Computer Science".into(),
                level: Some("300".into()),
            })
            .await?;
    }

    identity
        .register(DEMO_ADMIN_TOKEN, Actor::admin("adm-demo-0001"))
        .await;
    identity
        .register(DEMO_TEACHER_TOKEN, Actor::teacher("tch-demo-0001"))
        .await;
    tracing::info!(
        admin_token = DEMO_ADMIN_TOKEN,
        teacher_token = DEMO_TEACHER_TOKEN,
        "demo data seeded"
    );
    Ok(())
}
