//! Core business logic layer
//!
//! Menu state, narrative parsing and the visible log.
//! NO imports from frontend/ or rendering code.
//! Core updates its own state, frontends read and render.

pub mod app_core;
pub mod channel;
pub mod input_router;
pub mod menu;
pub mod message_log;
pub mod parser;

pub use app_core::AppCore;
