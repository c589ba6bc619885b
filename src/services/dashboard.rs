//! Dashboard statistics and pivot dispatch.
//!
//! Loads both collections once, then hands them to the pure engines. The
//! three-level pivot always receives the unfiltered demand list alongside
//! the filtered one so its month columns stay stable across filter changes.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::Db;
use crate::engine::filter::{self, ConstraintSet, DemandField};
use crate::engine::pivot::{self, PivotMode, PivotOutput};
use crate::engine::aggregate;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_accounts: usize,
    pub total_demands: usize,
    /// Count per observed opportunity status. No dense fill: statuses with
    /// zero accounts are absent.
    pub accounts_by_status: HashMap<String, usize>,
    pub demands_by_status: HashMap<String, usize>,
    /// Percent of demands with a real resource mapped.
    pub fulfillment_rate: u32,
}

pub fn stats(db: &Db) -> Result<DashboardStats, AppError> {
    let accounts = db.get_all_accounts()?;
    let demands = db.get_all_demands()?;

    Ok(DashboardStats {
        total_accounts: accounts.len(),
        total_demands: demands.len(),
        accounts_by_status: aggregate::count_by(&accounts, |a| a.opportunity_status.clone()),
        demands_by_status: aggregate::count_by(&demands, |d| d.status.as_str().to_string()),
        fulfillment_rate: aggregate::fulfillment_rate(&demands),
    })
}

/// Run a pivot over the demand collection, narrowed by the constraint set.
pub fn pivot(
    db: &Db,
    mode: PivotMode,
    constraints: &ConstraintSet<DemandField>,
) -> Result<PivotOutput, AppError> {
    let accounts = db.get_all_accounts()?;
    let demands = db.get_all_demands()?;
    let filtered = filter::apply(&demands, constraints);

    Ok(match mode {
        PivotMode::ByRoleCode => {
            PivotOutput::Breakdown(pivot::status_breakdown_by_role_code(&filtered))
        }
        PivotMode::ByAccount => {
            PivotOutput::Breakdown(pivot::status_breakdown_by_account(&filtered, &accounts))
        }
        PivotMode::ByRoleCodeAndAccount => {
            PivotOutput::Matrix(pivot::role_account_matrix(&filtered, &accounts))
        }
        // Columns from the full set, cells from the filtered set.
        PivotMode::ByAccountRoleMonth => {
            PivotOutput::Months(pivot::account_role_month(&filtered, &demands, &accounts))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{open_temp_db, sample_account, sample_demand};
    use crate::types::DemandStatus;

    #[test]
    fn stats_count_both_collections() {
        let (_dir, db) = open_temp_db();
        db.insert_account(&sample_account("acc-1", "Acme", "NA"))
            .unwrap();
        db.insert_account(&sample_account("acc-2", "Globex", "EMEA"))
            .unwrap();
        let mut d1 = sample_demand("dem-1", 1, "acc-1", "SE");
        d1.resource_mapped = Some("Alice".to_string());
        db.insert_demand(&d1).unwrap();
        let mut d2 = sample_demand("dem-2", 2, "acc-1", "TL");
        d2.status = DemandStatus::Fulfilled;
        db.insert_demand(&d2).unwrap();

        let stats = stats(&db).unwrap();
        assert_eq!(stats.total_accounts, 2);
        assert_eq!(stats.total_demands, 2);
        assert_eq!(stats.accounts_by_status.get("Qualified"), Some(&2));
        assert_eq!(stats.demands_by_status.get("Open"), Some(&1));
        assert_eq!(stats.demands_by_status.get("Fulfilled"), Some(&1));
        assert_eq!(stats.fulfillment_rate, 50);
    }

    #[test]
    fn stats_on_an_empty_database_are_all_zero() {
        let (_dir, db) = open_temp_db();
        let stats = stats(&db).unwrap();
        assert_eq!(stats.total_accounts, 0);
        assert_eq!(stats.total_demands, 0);
        assert!(stats.accounts_by_status.is_empty());
        assert_eq!(stats.fulfillment_rate, 0);
    }

    #[test]
    fn pivot_dispatch_applies_the_constraint_set() {
        let (_dir, db) = open_temp_db();
        db.insert_account(&sample_account("acc-1", "Acme", "NA"))
            .unwrap();
        db.insert_demand(&sample_demand("dem-1", 1, "acc-1", "SE"))
            .unwrap();
        db.insert_demand(&sample_demand("dem-2", 2, "acc-1", "TL"))
            .unwrap();

        let mut constraints = ConstraintSet::new();
        constraints.insert(DemandField::RoleCode, vec!["SE".to_string()]);
        let out = pivot(&db, PivotMode::ByRoleCode, &constraints).unwrap();
        match out {
            PivotOutput::Breakdown(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].key, "SE");
            }
            other => panic!("expected breakdown rows, got {other:?}"),
        }
    }
}
