//! To-do list demo application served by flecha.

pub mod routes;
pub mod store;
