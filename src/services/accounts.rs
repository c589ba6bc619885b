//! Account business logic: creation, replacement, and the referential
//! delete guard.

use chrono::Utc;
use uuid::Uuid;

use crate::db::Db;
use crate::error::AppError;
use crate::types::{Account, AccountInput, PROBABILITY_VALUES};

fn new_account_id() -> String {
    format!("acc-{}", Uuid::new_v4())
}

fn validate_input(input: &AccountInput) -> Result<(), AppError> {
    if input.client.trim().is_empty() {
        return Err(AppError::validation("client is required"));
    }
    if input.project.trim().is_empty() {
        return Err(AppError::validation("project is required"));
    }
    if !PROBABILITY_VALUES.contains(&input.probability) {
        return Err(AppError::validation(format!(
            "probability must be one of {:?}, got {}",
            PROBABILITY_VALUES, input.probability
        )));
    }
    Ok(())
}

pub fn list_accounts(db: &Db) -> Result<Vec<Account>, AppError> {
    Ok(db.get_all_accounts()?)
}

pub fn get_account(db: &Db, id: &str) -> Result<Account, AppError> {
    db.get_account(id)?
        .ok_or_else(|| AppError::not_found("Account", id))
}

/// Create an account with a generated id and fresh audit stamps.
pub fn create_account(db: &Db, input: AccountInput, user: &str) -> Result<Account, AppError> {
    validate_input(&input)?;
    let now = Utc::now().to_rfc3339();
    let account = Account {
        id: new_account_id(),
        client: input.client,
        project: input.project,
        vertical: input.vertical,
        geo: input.geo,
        start_month: input.start_month,
        revised_start_date: input.revised_start_date,
        planned_start_date: input.planned_start_date,
        planned_end_date: input.planned_end_date,
        probability: input.probability,
        opportunity_status: input.opportunity_status,
        sow_status: input.sow_status,
        project_status: input.project_status,
        client_partner: input.client_partner,
        proposal_anchor: input.proposal_anchor,
        delivery_partner: input.delivery_partner,
        comment: input.comment,
        added_by: user.to_string(),
        added_on: now.clone(),
        last_updated_by: user.to_string(),
        updated_on: now,
    };
    db.insert_account(&account)?;
    tracing::info!(id = %account.id, client = %account.client, "created account");
    Ok(account)
}

/// Replace an account by id, preserving its creation audit fields.
pub fn replace_account(
    db: &Db,
    id: &str,
    input: AccountInput,
    user: &str,
) -> Result<Account, AppError> {
    let existing = get_account(db, id)?;
    validate_input(&input)?;
    let account = Account {
        id: existing.id,
        client: input.client,
        project: input.project,
        vertical: input.vertical,
        geo: input.geo,
        start_month: input.start_month,
        revised_start_date: input.revised_start_date,
        planned_start_date: input.planned_start_date,
        planned_end_date: input.planned_end_date,
        probability: input.probability,
        opportunity_status: input.opportunity_status,
        sow_status: input.sow_status,
        project_status: input.project_status,
        client_partner: input.client_partner,
        proposal_anchor: input.proposal_anchor,
        delivery_partner: input.delivery_partner,
        comment: input.comment,
        added_by: existing.added_by,
        added_on: existing.added_on,
        last_updated_by: user.to_string(),
        updated_on: Utc::now().to_rfc3339(),
    };
    if !db.update_account(&account)? {
        // Row vanished between the read and the write.
        return Err(AppError::not_found("Account", id));
    }
    Ok(account)
}

/// Delete an account. Declined with the blocking count while demands still
/// reference it.
pub fn delete_account(db: &Db, id: &str) -> Result<(), AppError> {
    if db.get_account(id)?.is_none() {
        return Err(AppError::not_found("Account", id));
    }
    let count = db.count_demands_for_account(id)?;
    if count > 0 {
        return Err(AppError::AccountInUse {
            id: id.to_string(),
            count,
        });
    }
    db.delete_account(id)?;
    tracing::info!(id = %id, "deleted account");
    Ok(())
}
