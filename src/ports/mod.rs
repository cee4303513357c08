//! Port traits the domain talks to collaborators through.

pub mod config_port;
pub mod data_port;
pub mod report_port;
