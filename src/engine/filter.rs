//! Constraint filtering: AND across fields, OR within a field's value list.
//!
//! A constraint set maps a field to the values a record may have for it.
//! Fields without a constraint (or with an empty list) don't restrict
//! anything; a record with no value for a constrained field never matches.

use std::collections::HashMap;
use std::hash::Hash;

use crate::types::{Account, Demand};

/// Records that expose field values by a typed field key.
pub trait FieldValues {
    type Field: Copy + Eq + Hash;

    /// The record's value for a field, as the string the filter compares
    /// against. `None` when the record has no value for the field.
    fn field_value(&self, field: Self::Field) -> Option<String>;
}

/// Field → allowed values. Empty lists mean "no restriction".
pub type ConstraintSet<F> = HashMap<F, Vec<String>>;

/// Return the records satisfying every non-empty constraint.
///
/// An empty constraint set returns the input unchanged.
pub fn apply<T: FieldValues + Clone>(records: &[T], constraints: &ConstraintSet<T::Field>) -> Vec<T> {
    records
        .iter()
        .filter(|r| matches(*r, constraints))
        .cloned()
        .collect()
}

/// True when the record satisfies every non-empty constraint.
pub fn matches<T: FieldValues>(record: &T, constraints: &ConstraintSet<T::Field>) -> bool {
    constraints.iter().all(|(field, allowed)| {
        if allowed.is_empty() {
            return true;
        }
        match record.field_value(*field) {
            Some(value) => allowed.contains(&value),
            None => false,
        }
    })
}

/// Filterable fields of an [`Account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountField {
    Client,
    Project,
    Vertical,
    Geo,
    StartMonth,
    Probability,
    OpportunityStatus,
    SowStatus,
    ProjectStatus,
    ClientPartner,
    DeliveryPartner,
}

impl AccountField {
    /// Map a camelCase query-parameter name to a field. Unknown names are
    /// ignored by callers rather than rejected.
    pub fn from_param(name: &str) -> Option<Self> {
        match name {
            "client" => Some(Self::Client),
            "project" => Some(Self::Project),
            "vertical" => Some(Self::Vertical),
            "geo" => Some(Self::Geo),
            "startMonth" => Some(Self::StartMonth),
            "probability" => Some(Self::Probability),
            "opportunityStatus" => Some(Self::OpportunityStatus),
            "sowStatus" => Some(Self::SowStatus),
            "projectStatus" => Some(Self::ProjectStatus),
            "clientPartner" => Some(Self::ClientPartner),
            "deliveryPartner" => Some(Self::DeliveryPartner),
            _ => None,
        }
    }
}

impl FieldValues for Account {
    type Field = AccountField;

    fn field_value(&self, field: AccountField) -> Option<String> {
        match field {
            AccountField::Client => Some(self.client.clone()),
            AccountField::Project => Some(self.project.clone()),
            AccountField::Vertical => Some(self.vertical.clone()),
            AccountField::Geo => Some(self.geo.clone()),
            AccountField::StartMonth => Some(self.start_month.clone()),
            AccountField::Probability => Some(self.probability.to_string()),
            AccountField::OpportunityStatus => Some(self.opportunity_status.clone()),
            AccountField::SowStatus => Some(self.sow_status.clone()),
            AccountField::ProjectStatus => Some(self.project_status.clone()),
            AccountField::ClientPartner => Some(self.client_partner.clone()),
            AccountField::DeliveryPartner => Some(self.delivery_partner.clone()),
        }
    }
}

/// Filterable fields of a [`Demand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemandField {
    AccountId,
    Project,
    Role,
    RoleCode,
    Location,
    AllocationPercentage,
    Probability,
    Status,
    ResourceMapped,
    StartMonth,
}

impl DemandField {
    pub fn from_param(name: &str) -> Option<Self> {
        match name {
            "accountId" => Some(Self::AccountId),
            "project" => Some(Self::Project),
            "role" => Some(Self::Role),
            "roleCode" => Some(Self::RoleCode),
            "location" => Some(Self::Location),
            "allocationPercentage" => Some(Self::AllocationPercentage),
            "probability" => Some(Self::Probability),
            "status" => Some(Self::Status),
            "resourceMapped" => Some(Self::ResourceMapped),
            "startMonth" => Some(Self::StartMonth),
            _ => None,
        }
    }
}

impl FieldValues for Demand {
    type Field = DemandField;

    fn field_value(&self, field: DemandField) -> Option<String> {
        match field {
            DemandField::AccountId => Some(self.account_id.clone()),
            DemandField::Project => Some(self.project.clone()),
            DemandField::Role => Some(self.role.clone()),
            DemandField::RoleCode => Some(self.role_code.clone()),
            DemandField::Location => Some(self.location.clone()),
            DemandField::AllocationPercentage => Some(self.allocation_percentage.to_string()),
            DemandField::Probability => Some(self.probability.to_string()),
            DemandField::Status => Some(self.status.as_str().to_string()),
            DemandField::ResourceMapped => self.resource_mapped.clone(),
            DemandField::StartMonth => Some(self.start_month.clone()),
        }
    }
}
