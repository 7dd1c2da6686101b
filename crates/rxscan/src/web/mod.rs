//! Browser surface: one server-rendered page plus a handful of form actions.
//!
//! - **server**: router, shared state, startup
//! - **handlers**: upload / extract / download / clear
//! - **page**: HTML rendering of a session
//! - **cookie**: session id cookie

pub mod cookie;
pub mod handlers;
pub mod page;
pub mod server;

pub use server::{router, start_server, AppState};
