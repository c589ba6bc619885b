//! Shared domain types for accounts and staffing demands.

use serde::{Deserialize, Serialize};

/// Sentinel meaning "no resource currently mapped to this demand".
pub const UNASSIGNED: &str = "Unassigned";

/// Allowed values for an account's win probability.
pub const PROBABILITY_VALUES: [i32; 7] = [10, 20, 30, 50, 70, 90, 100];

/// Allowed values for a demand's allocation percentage.
pub const ALLOCATION_VALUES: [i32; 4] = [25, 50, 75, 100];

/// Role name → role code. Matching is case-insensitive on the full name;
/// anything not in the table gets [`OTHER_ROLE_CODE`].
const ROLE_CODES: &[(&str, &str)] = &[
    ("Solution Architect", "SA"),
    ("Technical Lead", "TL"),
    ("Senior Software Engineer", "SSE"),
    ("Software Engineer", "SE"),
    ("QA Engineer", "QA"),
    ("DevOps Engineer", "DOE"),
    ("Business Analyst", "BA"),
    ("Project Manager", "PM"),
    ("Scrum Master", "SM"),
    ("UX Designer", "UX"),
    ("Data Engineer", "DE"),
];

/// Code assigned to role names missing from the lookup table.
pub const OTHER_ROLE_CODE: &str = "OTH";

/// Derive the role code for a role name.
pub fn role_code_for(role: &str) -> &'static str {
    let trimmed = role.trim();
    ROLE_CODES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        .map(|(_, code)| *code)
        .unwrap_or(OTHER_ROLE_CODE)
}

/// Lifecycle status of a staffing demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Fulfilled,
    Cancelled,
}

impl DemandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandStatus::Open => "Open",
            DemandStatus::InProgress => "In Progress",
            DemandStatus::Fulfilled => "Fulfilled",
            DemandStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(DemandStatus::Open),
            "In Progress" => Some(DemandStatus::InProgress),
            "Fulfilled" => Some(DemandStatus::Fulfilled),
            "Cancelled" => Some(DemandStatus::Cancelled),
            _ => None,
        }
    }
}

/// A tracked sales opportunity/project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub client: String,
    pub project: String,
    pub vertical: String,
    pub geo: String,
    /// Display label like "Jan 2024".
    pub start_month: String,
    pub revised_start_date: Option<String>,
    pub planned_start_date: Option<String>,
    pub planned_end_date: Option<String>,
    /// One of [`PROBABILITY_VALUES`].
    pub probability: i32,
    pub opportunity_status: String,
    pub sow_status: String,
    pub project_status: String,
    pub client_partner: String,
    pub proposal_anchor: String,
    pub delivery_partner: String,
    pub comment: Option<String>,
    pub added_by: String,
    pub added_on: String,
    pub last_updated_by: String,
    pub updated_on: String,
}

/// Client-supplied fields for creating or replacing an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInput {
    pub client: String,
    pub project: String,
    pub vertical: String,
    pub geo: String,
    pub start_month: String,
    pub revised_start_date: Option<String>,
    pub planned_start_date: Option<String>,
    pub planned_end_date: Option<String>,
    pub probability: i32,
    pub opportunity_status: String,
    pub sow_status: String,
    pub project_status: String,
    pub client_partner: String,
    pub proposal_anchor: String,
    pub delivery_partner: String,
    pub comment: Option<String>,
}

/// A staffing role request linked to one account.
///
/// `project`, `probability`, `start_month` and the date fields are copied
/// from the parent account at creation time. The copies do not track later
/// edits to the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    pub id: String,
    /// Display ordinal. Monotonic, never reused after deletions.
    pub sno: i64,
    pub account_id: String,
    pub project: String,
    pub role: String,
    /// Derived from `role` via the fixed lookup table.
    pub role_code: String,
    pub location: String,
    pub revised: Option<String>,
    pub original_start_date: Option<String>,
    pub allocation_end_date: Option<String>,
    /// One of [`ALLOCATION_VALUES`].
    pub allocation_percentage: i32,
    pub probability: i32,
    pub status: DemandStatus,
    pub resource_mapped: Option<String>,
    pub comment: Option<String>,
    pub start_month: String,
    pub added_by: String,
    pub added_on: String,
    pub last_updated_by: String,
    pub updated_on: String,
}

/// Client-supplied fields for creating or replacing a demand. Denormalized
/// account fields and the role code are filled in by the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandInput {
    pub account_id: String,
    pub role: String,
    pub location: String,
    pub allocation_percentage: i32,
    pub status: DemandStatus,
    pub resource_mapped: Option<String>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_code_lookup_is_case_insensitive() {
        assert_eq!(role_code_for("Software Engineer"), "SE");
        assert_eq!(role_code_for("software engineer"), "SE");
        assert_eq!(role_code_for("  Technical Lead "), "TL");
    }

    #[test]
    fn unknown_roles_get_the_fallback_code() {
        assert_eq!(role_code_for("Basket Weaver"), OTHER_ROLE_CODE);
        assert_eq!(role_code_for(""), OTHER_ROLE_CODE);
    }

    #[test]
    fn demand_status_round_trips_through_wire_names() {
        let json = serde_json::to_string(&DemandStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: DemandStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DemandStatus::InProgress);
        assert_eq!(DemandStatus::parse("Fulfilled"), Some(DemandStatus::Fulfilled));
        assert_eq!(DemandStatus::parse("Closed"), None);
    }
}
