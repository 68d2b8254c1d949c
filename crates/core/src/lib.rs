//! healthbuddy-core: Shared HealthBuddy types and routing logic
//!
//! This crate holds everything that does not touch the network: the doctor
//! directory, the intent classifier, the answer composer, and the adapter
//! error type.

pub mod compose;
pub mod doctor;
pub mod error;
pub mod intent;

pub use compose::{Snippet, compose_answer};
pub use doctor::{DoctorDirectory, DoctorRecord};
pub use error::AdapterError;
pub use intent::Plan;
