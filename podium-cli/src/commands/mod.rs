pub mod config;
pub mod dashboard;
pub mod pods;
pub mod session;
pub mod templates;
pub mod vms;
