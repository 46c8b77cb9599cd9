//! In-memory student store.

use std::collections::BTreeMap;

use crate::oracle::types::StudentRecord;
use crate::store::StudentStore;

/// Student records keyed by id. BTreeMap keeps `get_all_students` in
/// ascending id order, which fixes batch iteration order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStudentStore {
    students: BTreeMap<u64, StudentRecord>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = StudentRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert or replace a student record.
    pub fn insert(&mut self, student: StudentRecord) {
        self.students.insert(student.student_id, student);
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

impl StudentStore for InMemoryStudentStore {
    fn get_student(&self, student_id: u64) -> Option<StudentRecord> {
        self.students.get(&student_id).cloned()
    }

    fn get_all_students(&self) -> Vec<StudentRecord> {
        self.students.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::types::AcademicStanding;
    use alloy::primitives::Address;

    fn student(id: u64) -> StudentRecord {
        StudentRecord {
            student_id: id,
            wallet_address: Address::repeat_byte(id as u8),
            name: format!("Student {}", id),
            gpa: 3.5,
            income_level: 30000.0,
            academic_standing: AcademicStanding::Good,
            documents_verified: true,
        }
    }

    #[test]
    fn test_lookup_and_iteration_order() {
        let store = InMemoryStudentStore::from_records([student(3), student(1), student(2)]);

        assert_eq!(store.len(), 3);
        assert_eq!(store.get_student(2).unwrap().student_id, 2);
        assert!(store.get_student(99).is_none());

        let ids: Vec<u64> = store
            .get_all_students()
            .iter()
            .map(|s| s.student_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut store = InMemoryStudentStore::new();
        store.insert(student(1));
        let mut updated = student(1);
        updated.gpa = 2.0;
        store.insert(updated);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_student(1).unwrap().gpa, 2.0);
    }
}
