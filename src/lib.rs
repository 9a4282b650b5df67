pub mod core {
    pub mod assignment;
    pub mod attendance;
    pub mod payload;
    pub mod ports;
    pub mod reference;
}

pub mod application {
    pub mod errors;
    pub mod views;
    pub mod command_handlers {
        pub mod bulk_assignment_handler;
        pub mod create_assignment_handler;
        pub mod delete_assignment_handler;
        pub mod mark_attendance_handler;
        pub mod register_reference_data_handler;
    }
    pub mod query_handlers {
        pub mod assignment_queries;
        pub mod attendance_reports;
        pub mod reference_data_queries;
    }
}

pub mod adapters {
    pub mod in_memory {
        pub mod in_memory_assignment_store;
        pub mod in_memory_identity;
        pub mod in_memory_reference_data;
    }
    pub mod inbound {
        pub mod graphql;
        pub mod http {
            pub mod admin;
            pub mod assignments;
            pub mod attendance;
            pub mod auth;
            pub mod errors;
        }
    }
}

pub mod shell;
