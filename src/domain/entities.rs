//! Domain entities: department records and their projections

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;

/// Shortest accepted department name (after trimming).
pub const NAME_MIN_CHARS: usize = 2;
/// Longest accepted department name (after trimming).
pub const NAME_MAX_CHARS: usize = 100;
/// Longest accepted description.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Opaque department identifier, stable across the node's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(String);

impl DepartmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier for newly created records.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DepartmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DepartmentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

fn default_active() -> bool {
    true
}

/// Flat department record as held by the Node Store.
///
/// `level` is derived data. It is recomputed by the engine whenever the
/// tree shape changes; the value received from a store is only a hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    #[serde(alias = "_id")]
    pub id: DepartmentId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_active", alias = "isActive")]
    pub is_active: bool,
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<DepartmentId>,
    #[serde(default)]
    pub level: u32,
    #[serde(default, alias = "managerId", skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, alias = "managerName", skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
    #[serde(default, alias = "userCount")]
    pub user_count: u32,
    #[serde(default, alias = "companyId", skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

impl Department {
    /// Active root department with no manager and no users.
    pub fn new(id: impl Into<DepartmentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            is_active: true,
            parent_id: None,
            level: 0,
            manager_id: None,
            manager_name: None,
            user_count: 0,
            company_id: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<DepartmentId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_manager(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.manager_id = Some(id.into());
        self.manager_name = Some(name.into());
        self
    }

    pub fn with_users(mut self, count: u32) -> Self {
        self.user_count = count;
        self
    }

    pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn has_manager(&self) -> bool {
        self.manager_id.is_some()
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Owned tree projection of a department, used for serialization and views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedDepartment {
    #[serde(flatten)]
    pub department: Department,
    #[serde(default)]
    pub children: Vec<NestedDepartment>,
}

impl NestedDepartment {
    pub fn id(&self) -> &DepartmentId {
        &self.department.id
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Input for the "create department" collaborator call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Absent means the department is created as a root.
    #[serde(default)]
    pub parent_id: Option<DepartmentId>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub manager_name: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
}

impl NewDepartment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Check name and description bounds, trimming the name in place.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.name = validate_name(&self.name)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

/// Partial update for the "update department" collaborator call.
///
/// Carries no parent or level field: structural changes only flow through
/// the reparent engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub manager_name: Option<String>,
}

impl DepartmentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
            && self.manager_id.is_none()
            && self.manager_name.is_none()
    }

    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            self.name = Some(validate_name(name)?);
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }

    /// Apply the set fields onto a record.
    pub fn apply_to(&self, department: &mut Department) {
        if let Some(name) = &self.name {
            department.name = name.clone();
        }
        if let Some(description) = &self.description {
            department.description = Some(description.clone());
        }
        if let Some(active) = self.is_active {
            department.is_active = active;
        }
        if let Some(manager_id) = &self.manager_id {
            department.manager_id = Some(manager_id.clone());
        }
        if let Some(manager_name) = &self.manager_name {
            department.manager_name = Some(manager_name.clone());
        }
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    let chars = trimmed.chars().count();
    if chars < NAME_MIN_CHARS {
        return Err(ValidationError::NameTooShort {
            min: NAME_MIN_CHARS,
            actual: chars,
        });
    }
    if chars > NAME_MAX_CHARS {
        return Err(ValidationError::NameTooLong {
            max: NAME_MAX_CHARS,
            actual: chars,
        });
    }
    Ok(trimmed.to_string())
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    let chars = description.chars().count();
    if chars > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::DescriptionTooLong {
            max: DESCRIPTION_MAX_CHARS,
            actual: chars,
        });
    }
    Ok(())
}

/// UI-layer sentinel meaning "no parent".
pub const ROOT_SENTINEL: &str = "root";

/// Translate a raw parent selection into an optional parent id.
///
/// `None`, empty input and the `"root"` sentinel all mean root placement.
pub fn parse_parent_choice(raw: Option<&str>) -> Option<DepartmentId> {
    match raw.map(str::trim) {
        None | Some("") => None,
        Some(value) if value.eq_ignore_ascii_case(ROOT_SENTINEL) => None,
        Some(value) => Some(DepartmentId::from(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_camel_case_record_when_deserializing_then_reads_aliases() {
        let json = r#"{"id":"2","name":"Sales","isActive":false,"parentId":"1","userCount":7,"managerId":"u1"}"#;
        let dept: Department = serde_json::from_str(json).expect("parse");
        assert_eq!(dept.parent_id, Some(DepartmentId::from("1")));
        assert!(!dept.is_active);
        assert_eq!(dept.user_count, 7);
        assert!(dept.has_manager());
    }

    #[test]
    fn given_underscore_id_when_deserializing_then_reads_id() {
        let json = r#"{"_id":"64f1c2","name":"Support","parentId":null}"#;
        let dept: Department = serde_json::from_str(json).expect("parse");
        assert_eq!(dept.id, DepartmentId::from("64f1c2"));
        assert!(dept.is_root());
    }

    #[test]
    fn given_minimal_record_when_deserializing_then_defaults_to_active_root() {
        let dept: Department = serde_json::from_str(r#"{"id":"a","name":"Ops"}"#).expect("parse");
        assert!(dept.is_active);
        assert!(dept.is_root());
        assert_eq!(dept.level, 0);
    }

    #[test]
    fn given_root_sentinel_when_parsing_parent_choice_then_returns_none() {
        assert_eq!(parse_parent_choice(Some("root")), None);
        assert_eq!(parse_parent_choice(Some("ROOT")), None);
        assert_eq!(parse_parent_choice(Some("  ")), None);
        assert_eq!(parse_parent_choice(None), None);
        assert_eq!(
            parse_parent_choice(Some("42")),
            Some(DepartmentId::from("42"))
        );
    }

    #[test]
    fn given_short_name_when_validating_then_rejects() {
        let mut input = NewDepartment::new(" x ");
        assert!(matches!(
            input.validate(),
            Err(ValidationError::NameTooShort { actual: 1, .. })
        ));
    }

    #[test]
    fn given_padded_name_when_validating_then_trims() {
        let mut input = NewDepartment::new("  Finance  ");
        input.validate().expect("valid");
        assert_eq!(input.name, "Finance");
    }

    #[test]
    fn given_long_description_when_validating_patch_then_rejects() {
        let mut patch = DepartmentPatch {
            description: Some("d".repeat(DESCRIPTION_MAX_CHARS + 1)),
            ..DepartmentPatch::default()
        };
        assert!(matches!(
            patch.validate(),
            Err(ValidationError::DescriptionTooLong { .. })
        ));
    }

    #[test]
    fn given_patch_when_applying_then_only_set_fields_change() {
        let mut dept = Department::new("1", "Engineering").with_users(4);
        let patch = DepartmentPatch {
            is_active: Some(false),
            manager_name: Some("Ada".into()),
            ..DepartmentPatch::default()
        };
        patch.apply_to(&mut dept);
        assert_eq!(dept.name, "Engineering");
        assert!(!dept.is_active);
        assert_eq!(dept.manager_name.as_deref(), Some("Ada"));
        assert_eq!(dept.user_count, 4);
    }
}
