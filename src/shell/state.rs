use crate::adapters::in_memory::in_memory_assignment_store::InMemoryAssignmentStore;
use crate::adapters::in_memory::in_memory_reference_data::InMemoryReferenceData;
use crate::application::command_handlers::bulk_assignment_handler::BulkAssignmentHandler;
use crate::application::command_handlers::create_assignment_handler::CreateAssignmentHandler;
use crate::application::command_handlers::delete_assignment_handler::DeleteAssignmentHandler;
use crate::application::command_handlers::mark_attendance_handler::MarkAttendanceHandler;
use crate::application::command_handlers::register_reference_data_handler::RegisterReferenceDataHandler;
use crate::application::query_handlers::assignment_queries::AssignmentQueries;
use crate::application::query_handlers::attendance_reports::AttendanceReports;
use crate::application::query_handlers::reference_data_queries::ReferenceDataQueries;
use crate::core::ports::IdentityProvider;
use crate::shell::config::AppConfig;
use std::sync::Arc;

type Store = InMemoryAssignmentStore;
type Reference = InMemoryReferenceData;

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub create_handler: Arc<CreateAssignmentHandler<Store, Reference>>,
    pub bulk_handler: Arc<BulkAssignmentHandler<Store, Reference>>,
    pub mark_handler: Arc<MarkAttendanceHandler<Store>>,
    pub delete_handler: Arc<DeleteAssignmentHandler<Store>>,
    pub queries: Arc<AssignmentQueries<Store, Reference>>,
    pub reports: Arc<AttendanceReports<Store, Reference>>,
    pub register_handler: Arc<RegisterReferenceDataHandler<Reference>>,
    pub reference_queries: Arc<ReferenceDataQueries<Reference>>,
}

impl AppState {
    pub fn in_memory(
        store: Arc<Store>,
        reference: Arc<Reference>,
        identity: Arc<dyn IdentityProvider>,
        config: &AppConfig,
    ) -> Self {
        Self {
            identity,
            create_handler: Arc::new(CreateAssignmentHandler::new(
                store.clone(),
                reference.clone(),
            )),
            bulk_handler: Arc::new(BulkAssignmentHandler::new(
                store.clone(),
                reference.clone(),
                config.bulk_concurrency,
            )),
            mark_handler: Arc::new(MarkAttendanceHandler::new(
                store.clone(),
                config.mark_retry_limit,
            )),
            delete_handler: Arc::new(DeleteAssignmentHandler::new(store.clone())),
            queries: Arc::new(AssignmentQueries::new(store.clone(), reference.clone())),
            reports: Arc::new(AttendanceReports::new(store, reference.clone())),
            register_handler: Arc::new(RegisterReferenceDataHandler::new(reference.clone())),
            reference_queries: Arc::new(ReferenceDataQueries::new(reference)),
        }
    }
}
