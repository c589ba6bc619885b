use rusqlite::params;

use super::{Db, DbError};
use crate::types::Account;

const ACCOUNT_COLUMNS: &str = "id, client, project, vertical, geo, start_month,
    revised_start_date, planned_start_date, planned_end_date, probability,
    opportunity_status, sow_status, project_status, client_partner,
    proposal_anchor, delivery_partner, comment, added_by, added_on,
    last_updated_by, updated_on";

impl Db {
    /// Insert a new account row.
    pub fn insert_account(&self, account: &Account) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO accounts (
                id, client, project, vertical, geo, start_month,
                revised_start_date, planned_start_date, planned_end_date,
                probability, opportunity_status, sow_status, project_status,
                client_partner, proposal_anchor, delivery_partner, comment,
                added_by, added_on, last_updated_by, updated_on
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                       ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
            params![
                account.id,
                account.client,
                account.project,
                account.vertical,
                account.geo,
                account.start_month,
                account.revised_start_date,
                account.planned_start_date,
                account.planned_end_date,
                account.probability,
                account.opportunity_status,
                account.sow_status,
                account.project_status,
                account.client_partner,
                account.proposal_anchor,
                account.delivery_partner,
                account.comment,
                account.added_by,
                account.added_on,
                account.last_updated_by,
                account.updated_on,
            ],
        )?;
        Ok(())
    }

    /// Get an account by ID.
    pub fn get_account(&self, id: &str) -> Result<Option<Account>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_account_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Get all accounts, ordered by client then project.
    pub fn get_all_accounts(&self) -> Result<Vec<Account>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY client, project"
        ))?;
        let rows = stmt.query_map([], Self::map_account_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Replace an account row by ID. Returns `false` if no row matched.
    pub fn update_account(&self, account: &Account) -> Result<bool, DbError> {
        let rows = self.conn.execute(
            "UPDATE accounts SET
                client = ?2, project = ?3, vertical = ?4, geo = ?5,
                start_month = ?6, revised_start_date = ?7,
                planned_start_date = ?8, planned_end_date = ?9,
                probability = ?10, opportunity_status = ?11, sow_status = ?12,
                project_status = ?13, client_partner = ?14,
                proposal_anchor = ?15, delivery_partner = ?16, comment = ?17,
                last_updated_by = ?18, updated_on = ?19
             WHERE id = ?1",
            params![
                account.id,
                account.client,
                account.project,
                account.vertical,
                account.geo,
                account.start_month,
                account.revised_start_date,
                account.planned_start_date,
                account.planned_end_date,
                account.probability,
                account.opportunity_status,
                account.sow_status,
                account.project_status,
                account.client_partner,
                account.proposal_anchor,
                account.delivery_partner,
                account.comment,
                account.last_updated_by,
                account.updated_on,
            ],
        )?;
        Ok(rows > 0)
    }

    /// Delete an account row by ID. Returns `false` if no row matched.
    /// The referential guard lives in the service layer.
    pub fn delete_account(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Count demands referencing an account.
    pub fn count_demands_for_account(&self, account_id: &str) -> Result<i64, DbError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM demands WHERE account_id = ?1",
            params![account_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub(crate) fn map_account_row(row: &rusqlite::Row) -> rusqlite::Result<Account> {
        Ok(Account {
            id: row.get(0)?,
            client: row.get(1)?,
            project: row.get(2)?,
            vertical: row.get(3)?,
            geo: row.get(4)?,
            start_month: row.get(5)?,
            revised_start_date: row.get(6)?,
            planned_start_date: row.get(7)?,
            planned_end_date: row.get(8)?,
            probability: row.get(9)?,
            opportunity_status: row.get(10)?,
            sow_status: row.get(11)?,
            project_status: row.get(12)?,
            client_partner: row.get(13)?,
            proposal_anchor: row.get(14)?,
            delivery_partner: row.get(15)?,
            comment: row.get(16)?,
            added_by: row.get(17)?,
            added_on: row.get(18)?,
            last_updated_by: row.get(19)?,
            updated_on: row.get(20)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::{open_temp_db, sample_account};

    #[test]
    fn insert_and_get_round_trip() {
        let (_dir, db) = open_temp_db();
        let account = sample_account("acc-1", "Acme", "NA");
        db.insert_account(&account).unwrap();

        let loaded = db.get_account("acc-1").unwrap().expect("account exists");
        assert_eq!(loaded.client, "Acme");
        assert_eq!(loaded.probability, 70);
        assert_eq!(loaded.planned_start_date.as_deref(), Some("2024-01-15"));

        assert!(db.get_account("acc-missing").unwrap().is_none());
    }

    #[test]
    fn update_replaces_fields_and_reports_missing_rows() {
        let (_dir, db) = open_temp_db();
        let mut account = sample_account("acc-1", "Acme", "NA");
        db.insert_account(&account).unwrap();

        account.geo = "EMEA".to_string();
        account.probability = 90;
        assert!(db.update_account(&account).unwrap());
        let loaded = db.get_account("acc-1").unwrap().unwrap();
        assert_eq!(loaded.geo, "EMEA");
        assert_eq!(loaded.probability, 90);

        account.id = "acc-ghost".to_string();
        assert!(!db.update_account(&account).unwrap());
    }

    #[test]
    fn delete_reports_whether_a_row_matched() {
        let (_dir, db) = open_temp_db();
        db.insert_account(&sample_account("acc-1", "Acme", "NA"))
            .unwrap();
        assert!(db.delete_account("acc-1").unwrap());
        assert!(!db.delete_account("acc-1").unwrap());
    }
}
