//! REST API: job intake, teardown and introspection

pub mod handlers;
pub mod router;
pub mod state;
