//! Substring search over either collection, done in SQL.

use rusqlite::params;

use crate::db::{Db, DbError};
use crate::types::{Account, Demand};

/// Search accounts by client, project, vertical or opportunity status.
pub fn search_accounts(db: &Db, query: &str) -> Result<Vec<Account>, DbError> {
    let mut stmt = db.conn_ref().prepare(
        "SELECT id, client, project, vertical, geo, start_month,
                revised_start_date, planned_start_date, planned_end_date,
                probability, opportunity_status, sow_status, project_status,
                client_partner, proposal_anchor, delivery_partner, comment,
                added_by, added_on, last_updated_by, updated_on
         FROM accounts
         WHERE client LIKE '%' || ?1 || '%'
            OR project LIKE '%' || ?1 || '%'
            OR vertical LIKE '%' || ?1 || '%'
            OR opportunity_status LIKE '%' || ?1 || '%'
         ORDER BY client, project",
    )?;
    let rows = stmt.query_map(params![query], Db::map_account_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Search demands by role, project, location or status.
pub fn search_demands(db: &Db, query: &str) -> Result<Vec<Demand>, DbError> {
    let mut stmt = db.conn_ref().prepare(
        "SELECT id, sno, account_id, project, role, role_code, location,
                revised, original_start_date, allocation_end_date,
                allocation_percentage, probability, status, resource_mapped,
                comment, start_month, added_by, added_on, last_updated_by,
                updated_on
         FROM demands
         WHERE role LIKE '%' || ?1 || '%'
            OR project LIKE '%' || ?1 || '%'
            OR location LIKE '%' || ?1 || '%'
            OR status LIKE '%' || ?1 || '%'
         ORDER BY sno",
    )?;
    let rows = stmt.query_map(params![query], Db::map_demand_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{open_temp_db, sample_account, sample_demand};

    #[test]
    fn account_search_matches_substrings_across_fields() {
        let (_dir, db) = open_temp_db();
        db.insert_account(&sample_account("acc-1", "Acme", "NA"))
            .unwrap();
        db.insert_account(&sample_account("acc-2", "Globex", "EMEA"))
            .unwrap();

        let hits = search_accounts(&db, "Glob").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].client, "Globex");

        // "Retail" only matches the vertical, both rows carry it.
        assert_eq!(search_accounts(&db, "Retail").unwrap().len(), 2);
        assert!(search_accounts(&db, "nothing-here").unwrap().is_empty());
    }

    #[test]
    fn demand_search_matches_role_and_status() {
        let (_dir, db) = open_temp_db();
        db.insert_account(&sample_account("acc-1", "Acme", "NA"))
            .unwrap();
        db.insert_demand(&sample_demand("dem-1", 1, "acc-1", "SE"))
            .unwrap();

        assert_eq!(search_demands(&db, "Engineer").unwrap().len(), 1);
        assert_eq!(search_demands(&db, "Open").unwrap().len(), 1);
        assert!(search_demands(&db, "Fulfilled").unwrap().is_empty());
    }
}
