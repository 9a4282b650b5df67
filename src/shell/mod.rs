// Composition root.
//
// Responsibilities
// - Read config from the environment.
// - Instantiate the in-memory adapters and wire them into the use case handlers.
// - Expose the HTTP and GraphQL surfaces on one router.

pub mod config;
pub mod http;
pub mod seed;
pub mod state;
