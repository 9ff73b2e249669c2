//! Domain records guarded by the RBAC core

use crate::rbac::ScopedRecord;
use serde::{Deserialize, Serialize};

/// A personnel record. Its owner is the employee it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelRecord {
    /// Employee id, the same id the employee authenticates with
    pub id: String,
    pub name: String,
    pub system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl PersonnelRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            system: system.into(),
            department: None,
            position: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

impl ScopedRecord for PersonnelRecord {
    fn owner_id(&self) -> &str {
        &self.id
    }

    fn system(&self) -> &str {
        &self.system
    }

    fn record_id(&self) -> Option<&str> {
        Some(self.id.as_str())
    }
}

/// A competency / qualification standard. Its owner is the author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationStandard {
    pub id: String,
    pub title: String,
    pub system: String,
    /// Qualification level the standard applies to, e.g. "P5"
    pub level: String,
    /// Id of the user who authored the standard
    pub created_by: String,
}

impl ScopedRecord for QualificationStandard {
    fn owner_id(&self) -> &str {
        &self.created_by
    }

    fn system(&self) -> &str {
        &self.system
    }

    fn record_id(&self) -> Option<&str> {
        Some(self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::{Role, User, filter_by_scope};

    #[test]
    fn test_personnel_owner_is_employee_id() {
        let record =
            PersonnelRecord::new("EMP001", "张三", "技术体系").with_department("研发部");
        assert_eq!(record.owner_id(), "EMP001");
        assert_eq!(record.record_id(), Some("EMP001"));

        let employee = User::new("EMP001", "张三", Role::Employee);
        let records = vec![record, PersonnelRecord::new("EMP002", "钱七", "技术体系")];
        let visible = filter_by_scope(Some(&employee), &records);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "张三");
    }

    #[test]
    fn test_standard_owner_is_author() {
        let standard = QualificationStandard {
            id: "STD-1".to_string(),
            title: "后端工程师任职资格".to_string(),
            system: "技术体系".to_string(),
            level: "P5".to_string(),
            created_by: "COE001".to_string(),
        };
        assert_eq!(standard.owner_id(), "COE001");
        assert_eq!(standard.system(), "技术体系");
    }
}
