use crate::shared::error::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend tables the sync queue is allowed to write to.
pub const ALLOWED_TABLES: [&str; 4] = ["checklists", "users", "companies", "inspections"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTable {
    Checklists,
    Users,
    Companies,
    Inspections,
}

impl SyncTable {
    pub const ALL: [SyncTable; 4] = [
        SyncTable::Checklists,
        SyncTable::Users,
        SyncTable::Companies,
        SyncTable::Inspections,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTable::Checklists => "checklists",
            SyncTable::Users => "users",
            SyncTable::Companies => "companies",
            SyncTable::Inspections => "inspections",
        }
    }

    /// Columns an insert must carry for this table.
    pub fn required_insert_fields(&self) -> &'static [&'static str] {
        match self {
            SyncTable::Checklists => &["title"],
            SyncTable::Users => &["email"],
            SyncTable::Companies => &["fantasy_name"],
            SyncTable::Inspections => &["company_id", "checklist_id"],
        }
    }
}

impl fmt::Display for SyncTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncTable {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "checklists" => Ok(SyncTable::Checklists),
            "users" => Ok(SyncTable::Users),
            "companies" => Ok(SyncTable::Companies),
            "inspections" => Ok(SyncTable::Inspections),
            other => Err(SyncError::InvalidTable(other.to_string())),
        }
    }
}

pub fn is_valid_table(name: &str) -> bool {
    ALLOWED_TABLES.contains(&name)
}

pub fn validated_table(name: &str) -> Result<SyncTable, SyncError> {
    name.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_matches_enum() {
        for table in SyncTable::ALL {
            assert!(is_valid_table(table.as_str()));
            assert_eq!(validated_table(table.as_str()).unwrap(), table);
        }
        assert_eq!(ALLOWED_TABLES.len(), SyncTable::ALL.len());
    }

    #[test]
    fn rejects_unknown_and_near_miss_names() {
        for name in ["", "audits", "Companies", " users", "inspections;drop", "company"] {
            assert!(!is_valid_table(name), "{name:?} should be rejected");
            assert_eq!(
                validated_table(name),
                Err(SyncError::InvalidTable(name.to_string()))
            );
        }
    }

    #[test]
    fn serializes_as_snake_case_name() {
        let json = serde_json::to_string(&SyncTable::Inspections).unwrap();
        assert_eq!(json, "\"inspections\"");
    }
}
