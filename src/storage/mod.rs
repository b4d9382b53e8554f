//! Storage ports and in-memory adapters.
//!
//! The lifecycle engine depends on two collaborators: a
//! [`SickLeaveRepository`] for records and their tracking log, and a
//! [`SalaryDirectory`] supplying the salaries that base daily values are
//! derived from.

mod memory;
mod repository;
mod salary;

pub use memory::InMemoryRepository;
pub use repository::SickLeaveRepository;
pub use salary::{InMemorySalaryDirectory, SalaryDirectory, SalaryEntry};
