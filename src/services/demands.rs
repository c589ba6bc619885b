//! Demand business logic: parent denormalization, role-code derivation,
//! sequence numbering and cloning.

use chrono::Utc;
use uuid::Uuid;

use crate::db::Db;
use crate::error::AppError;
use crate::types::{
    role_code_for, Account, Demand, DemandInput, ALLOCATION_VALUES, UNASSIGNED,
};

/// Upper bound on clones per request, matching the original API contract.
pub const MAX_CLONES: u32 = 10;

fn new_demand_id() -> String {
    format!("dem-{}", Uuid::new_v4())
}

fn validate_input(input: &DemandInput) -> Result<(), AppError> {
    if input.role.trim().is_empty() {
        return Err(AppError::validation("role is required"));
    }
    if !ALLOCATION_VALUES.contains(&input.allocation_percentage) {
        return Err(AppError::validation(format!(
            "allocation percentage must be one of {:?}, got {}",
            ALLOCATION_VALUES, input.allocation_percentage
        )));
    }
    Ok(())
}

/// Normalize the assigned resource: blank or missing means the sentinel.
fn normalize_resource(resource: Option<String>) -> Option<String> {
    match resource {
        Some(r) if !r.trim().is_empty() => Some(r),
        _ => Some(UNASSIGNED.to_string()),
    }
}

pub fn list_demands(db: &Db) -> Result<Vec<Demand>, AppError> {
    Ok(db.get_all_demands()?)
}

pub fn list_demands_for_account(db: &Db, account_id: &str) -> Result<Vec<Demand>, AppError> {
    if db.get_account(account_id)?.is_none() {
        return Err(AppError::not_found("Account", account_id));
    }
    Ok(db.get_demands_for_account(account_id)?)
}

pub fn get_demand(db: &Db, id: &str) -> Result<Demand, AppError> {
    db.get_demand(id)?
        .ok_or_else(|| AppError::not_found("Demand", id))
}

/// Create a demand under an existing account.
///
/// Project, probability, start month and the date fields are copied from
/// the parent at this moment; later account edits do not touch them.
pub fn create_demand(db: &Db, input: DemandInput, user: &str) -> Result<Demand, AppError> {
    validate_input(&input)?;
    let parent = db
        .get_account(&input.account_id)?
        .ok_or_else(|| AppError::not_found("Account", input.account_id.clone()))?;

    let demand = db.with_transaction(|db| {
        let sno = db.next_demand_sno()?;
        let now = Utc::now().to_rfc3339();
        let demand = Demand {
            id: new_demand_id(),
            sno,
            account_id: parent.id.clone(),
            role_code: role_code_for(&input.role).to_string(),
            role: input.role.clone(),
            location: input.location.clone(),
            allocation_percentage: input.allocation_percentage,
            status: input.status,
            resource_mapped: normalize_resource(input.resource_mapped.clone()),
            comment: input.comment.clone(),
            added_by: user.to_string(),
            added_on: now.clone(),
            last_updated_by: user.to_string(),
            updated_on: now,
            ..denormalized_from(&parent)
        };
        db.insert_demand(&demand)?;
        Ok(demand)
    })?;
    tracing::info!(id = %demand.id, account = %demand.account_id, role = %demand.role, "created demand");
    Ok(demand)
}

/// Fields copied from the parent account at creation time. The remaining
/// fields are overwritten by the caller via struct update syntax.
fn denormalized_from(parent: &Account) -> Demand {
    Demand {
        id: String::new(),
        sno: 0,
        account_id: parent.id.clone(),
        project: parent.project.clone(),
        role: String::new(),
        role_code: String::new(),
        location: String::new(),
        revised: parent.revised_start_date.clone(),
        original_start_date: parent.planned_start_date.clone(),
        allocation_end_date: parent.planned_end_date.clone(),
        allocation_percentage: 0,
        probability: parent.probability,
        status: crate::types::DemandStatus::Open,
        resource_mapped: None,
        comment: None,
        start_month: parent.start_month.clone(),
        added_by: String::new(),
        added_on: String::new(),
        last_updated_by: String::new(),
        updated_on: String::new(),
    }
}

/// Replace a demand by id, preserving its ordinal and creation audit
/// fields. Moving the demand to another account re-copies the denormalized
/// fields from the new parent; otherwise the creation-time copies stand.
pub fn replace_demand(
    db: &Db,
    id: &str,
    input: DemandInput,
    user: &str,
) -> Result<Demand, AppError> {
    let existing = get_demand(db, id)?;
    validate_input(&input)?;

    let mut demand = if input.account_id != existing.account_id {
        let parent = db
            .get_account(&input.account_id)?
            .ok_or_else(|| AppError::not_found("Account", input.account_id.clone()))?;
        Demand {
            account_id: parent.id.clone(),
            ..denormalized_from(&parent)
        }
    } else {
        existing.clone()
    };

    demand.id = existing.id.clone();
    demand.sno = existing.sno;
    demand.role_code = role_code_for(&input.role).to_string();
    demand.role = input.role;
    demand.location = input.location;
    demand.allocation_percentage = input.allocation_percentage;
    demand.status = input.status;
    demand.resource_mapped = normalize_resource(input.resource_mapped);
    demand.comment = input.comment;
    demand.added_by = existing.added_by;
    demand.added_on = existing.added_on;
    demand.last_updated_by = user.to_string();
    demand.updated_on = Utc::now().to_rfc3339();

    if !db.update_demand(&demand)? {
        return Err(AppError::not_found("Demand", id));
    }
    Ok(demand)
}

pub fn delete_demand(db: &Db, id: &str) -> Result<(), AppError> {
    if !db.delete_demand(id)? {
        return Err(AppError::not_found("Demand", id));
    }
    tracing::info!(id = %id, "deleted demand");
    Ok(())
}

/// Clone a demand `count` times. Each clone gets a fresh id, ordinal and
/// audit stamps; every other field is copied verbatim.
pub fn clone_demand(
    db: &Db,
    id: &str,
    count: u32,
    user: &str,
) -> Result<Vec<Demand>, AppError> {
    if count == 0 || count > MAX_CLONES {
        return Err(AppError::validation(format!(
            "clone count must be between 1 and {MAX_CLONES}"
        )));
    }
    let source = get_demand(db, id)?;

    let clones = db.with_transaction(|db| {
        let mut clones = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let now = Utc::now().to_rfc3339();
            let clone = Demand {
                id: new_demand_id(),
                sno: db.next_demand_sno()?,
                added_by: user.to_string(),
                added_on: now.clone(),
                last_updated_by: user.to_string(),
                updated_on: now,
                ..source.clone()
            };
            db.insert_demand(&clone)?;
            clones.push(clone);
        }
        Ok(clones)
    })?;
    tracing::info!(source = %id, count = clones.len(), "cloned demand");
    Ok(clones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{open_temp_db, sample_account};
    use crate::engine::filter::{self, ConstraintSet, DemandField};
    use crate::types::DemandStatus;

    fn input(account_id: &str, role: &str) -> DemandInput {
        DemandInput {
            account_id: account_id.to_string(),
            role: role.to_string(),
            location: "Offshore".to_string(),
            allocation_percentage: 100,
            status: DemandStatus::Open,
            resource_mapped: None,
            comment: None,
        }
    }

    fn seed_account(db: &Db, id: &str) {
        db.insert_account(&sample_account(id, "Acme", "NA")).unwrap();
    }

    #[test]
    fn create_denormalizes_from_the_parent_account() {
        let (_dir, db) = open_temp_db();
        seed_account(&db, "acc-1");

        let demand = create_demand(&db, input("acc-1", "Software Engineer"), "pat").unwrap();
        assert_eq!(demand.project, "Acme Platform");
        assert_eq!(demand.probability, 70);
        assert_eq!(demand.start_month, "Jan 2024");
        assert_eq!(demand.original_start_date.as_deref(), Some("2024-01-15"));
        assert_eq!(demand.allocation_end_date.as_deref(), Some("2024-06-30"));
        assert_eq!(demand.role_code, "SE");
        assert_eq!(demand.resource_mapped.as_deref(), Some(UNASSIGNED));
        assert_eq!(demand.sno, 1);
    }

    #[test]
    fn account_edits_do_not_touch_existing_copies() {
        let (_dir, db) = open_temp_db();
        seed_account(&db, "acc-1");
        let demand = create_demand(&db, input("acc-1", "Software Engineer"), "pat").unwrap();

        let mut account = db.get_account("acc-1").unwrap().unwrap();
        account.probability = 100;
        account.start_month = "Mar 2024".to_string();
        db.update_account(&account).unwrap();

        let reloaded = db.get_demand(&demand.id).unwrap().unwrap();
        assert_eq!(reloaded.probability, 70);
        assert_eq!(reloaded.start_month, "Jan 2024");
    }

    #[test]
    fn create_requires_an_existing_parent() {
        let (_dir, db) = open_temp_db();
        let err = create_demand(&db, input("acc-ghost", "QA Engineer"), "pat").unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn create_rejects_allocation_outside_the_set() {
        let (_dir, db) = open_temp_db();
        seed_account(&db, "acc-1");
        let mut bad = input("acc-1", "QA Engineer");
        bad.allocation_percentage = 60;
        let err = create_demand(&db, bad, "pat").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn replace_keeps_ordinal_and_creation_audit() {
        let (_dir, db) = open_temp_db();
        seed_account(&db, "acc-1");
        let created = create_demand(&db, input("acc-1", "Software Engineer"), "pat").unwrap();

        let mut update = input("acc-1", "Technical Lead");
        update.status = DemandStatus::InProgress;
        update.resource_mapped = Some("Alice".to_string());
        let updated = replace_demand(&db, &created.id, update, "lee").unwrap();

        assert_eq!(updated.sno, created.sno);
        assert_eq!(updated.added_by, "pat");
        assert_eq!(updated.last_updated_by, "lee");
        assert_eq!(updated.role_code, "TL");
        assert_eq!(updated.resource_mapped.as_deref(), Some("Alice"));
        // Denormalized copies stand when the parent didn't change.
        assert_eq!(updated.start_month, "Jan 2024");
    }

    #[test]
    fn moving_a_demand_re_copies_from_the_new_parent() {
        let (_dir, db) = open_temp_db();
        seed_account(&db, "acc-1");
        let mut other = sample_account("acc-2", "Globex", "EMEA");
        other.start_month = "Apr 2024".to_string();
        other.probability = 30;
        db.insert_account(&other).unwrap();

        let created = create_demand(&db, input("acc-1", "Software Engineer"), "pat").unwrap();
        let moved =
            replace_demand(&db, &created.id, input("acc-2", "Software Engineer"), "pat").unwrap();

        assert_eq!(moved.account_id, "acc-2");
        assert_eq!(moved.project, "Globex Platform");
        assert_eq!(moved.start_month, "Apr 2024");
        assert_eq!(moved.probability, 30);
    }

    #[test]
    fn clone_copies_everything_but_identity_and_audit() {
        let (_dir, db) = open_temp_db();
        seed_account(&db, "acc-1");
        let mut source_input = input("acc-1", "Software Engineer");
        source_input.resource_mapped = Some("Alice".to_string());
        source_input.status = DemandStatus::Fulfilled;
        let source = create_demand(&db, source_input, "pat").unwrap();

        let clones = clone_demand(&db, &source.id, 2, "lee").unwrap();
        assert_eq!(clones.len(), 2);
        for clone in &clones {
            assert_ne!(clone.id, source.id);
            assert_ne!(clone.sno, source.sno);
            assert_eq!(clone.role, source.role);
            assert_eq!(clone.status, source.status);
            assert_eq!(clone.resource_mapped, source.resource_mapped);
            assert_eq!(clone.project, source.project);
            assert_eq!(clone.added_by, "lee");
        }

        // Clone fidelity: clones pass every filter the source passes.
        let all = db.get_all_demands().unwrap();
        let mut constraints: ConstraintSet<DemandField> = ConstraintSet::new();
        constraints.insert(DemandField::Status, vec!["Fulfilled".to_string()]);
        constraints.insert(DemandField::ResourceMapped, vec!["Alice".to_string()]);
        let matched = filter::apply(&all, &constraints);
        assert_eq!(matched.len(), 3);
    }

    #[test]
    fn clone_count_is_bounded() {
        let (_dir, db) = open_temp_db();
        seed_account(&db, "acc-1");
        let source = create_demand(&db, input("acc-1", "QA Engineer"), "pat").unwrap();

        assert!(matches!(
            clone_demand(&db, &source.id, 0, "pat").unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            clone_demand(&db, &source.id, 11, "pat").unwrap_err(),
            AppError::Validation(_)
        ));
    }
}
