pub mod focus_session;
pub mod mood;
pub mod task;
