//! Department registry.
//!
//! Read-only name -> listing URL mapping produced by the external discovery
//! process, plus the configured fallback department.

use crate::models::Department;
use crate::storage::DepartmentRecord;

pub struct DepartmentRegistry {
    departments: DepartmentRecord,
    default: Department,
}

impl DepartmentRegistry {
    pub fn new(departments: DepartmentRecord, default: Department) -> Self {
        Self {
            departments,
            default,
        }
    }

    /// Look up a department by name.
    pub fn resolve(&self, name: &str) -> Option<Department> {
        self.departments
            .get(name)
            .map(|url| Department::new(name, url))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.departments.contains_key(name)
    }

    /// The fallback department for unbound channels.
    pub fn default_department(&self) -> &Department {
        &self.default
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.departments.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.departments.len()
    }
}
