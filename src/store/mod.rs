//! Student store boundary.
//!
//! The oracle never owns student records; it reads them through this trait
//! and never writes back. Production deployments put a real database behind
//! it; tests and the demo binary use the in-memory implementation.

pub mod memory;

pub use memory::InMemoryStudentStore;

use crate::oracle::types::StudentRecord;

/// Read-only lookup of off-chain student records.
pub trait StudentStore {
    /// Fetch a single student by id.
    fn get_student(&self, student_id: u64) -> Option<StudentRecord>;

    /// Fetch every known student, in a stable iteration order.
    fn get_all_students(&self) -> Vec<StudentRecord>;
}
