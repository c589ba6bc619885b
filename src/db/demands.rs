use rusqlite::params;

use super::{Db, DbError};
use crate::types::{Demand, DemandStatus};

const DEMAND_COLUMNS: &str = "id, sno, account_id, project, role, role_code,
    location, revised, original_start_date, allocation_end_date,
    allocation_percentage, probability, status, resource_mapped, comment,
    start_month, added_by, added_on, last_updated_by, updated_on";

impl Db {
    /// Insert a new demand row.
    pub fn insert_demand(&self, demand: &Demand) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO demands (
                id, sno, account_id, project, role, role_code, location,
                revised, original_start_date, allocation_end_date,
                allocation_percentage, probability, status, resource_mapped,
                comment, start_month, added_by, added_on, last_updated_by,
                updated_on
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                       ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            params![
                demand.id,
                demand.sno,
                demand.account_id,
                demand.project,
                demand.role,
                demand.role_code,
                demand.location,
                demand.revised,
                demand.original_start_date,
                demand.allocation_end_date,
                demand.allocation_percentage,
                demand.probability,
                demand.status.as_str(),
                demand.resource_mapped,
                demand.comment,
                demand.start_month,
                demand.added_by,
                demand.added_on,
                demand.last_updated_by,
                demand.updated_on,
            ],
        )?;
        Ok(())
    }

    /// Get a demand by ID.
    pub fn get_demand(&self, id: &str) -> Result<Option<Demand>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DEMAND_COLUMNS} FROM demands WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_demand_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Get all demands, ordered by display ordinal.
    pub fn get_all_demands(&self) -> Result<Vec<Demand>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DEMAND_COLUMNS} FROM demands ORDER BY sno"
        ))?;
        let rows = stmt.query_map([], Self::map_demand_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Get all demands for an account, ordered by display ordinal.
    pub fn get_demands_for_account(&self, account_id: &str) -> Result<Vec<Demand>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DEMAND_COLUMNS} FROM demands WHERE account_id = ?1 ORDER BY sno"
        ))?;
        let rows = stmt.query_map(params![account_id], Self::map_demand_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Replace a demand row by ID. Returns `false` if no row matched.
    pub fn update_demand(&self, demand: &Demand) -> Result<bool, DbError> {
        let rows = self.conn.execute(
            "UPDATE demands SET
                account_id = ?2, project = ?3, role = ?4, role_code = ?5,
                location = ?6, revised = ?7, original_start_date = ?8,
                allocation_end_date = ?9, allocation_percentage = ?10,
                probability = ?11, status = ?12, resource_mapped = ?13,
                comment = ?14, start_month = ?15, last_updated_by = ?16,
                updated_on = ?17
             WHERE id = ?1",
            params![
                demand.id,
                demand.account_id,
                demand.project,
                demand.role,
                demand.role_code,
                demand.location,
                demand.revised,
                demand.original_start_date,
                demand.allocation_end_date,
                demand.allocation_percentage,
                demand.probability,
                demand.status.as_str(),
                demand.resource_mapped,
                demand.comment,
                demand.start_month,
                demand.last_updated_by,
                demand.updated_on,
            ],
        )?;
        Ok(rows > 0)
    }

    /// Delete a demand row by ID. Returns `false` if no row matched.
    pub fn delete_demand(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM demands WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Claim the next display ordinal. The counter only moves forward, so
    /// ordinals are never reused after deletions.
    pub fn next_demand_sno(&self) -> Result<i64, DbError> {
        let sno: i64 = self.conn.query_row(
            "SELECT next_sno FROM demand_seq WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "UPDATE demand_seq SET next_sno = next_sno + 1 WHERE id = 1",
            [],
        )?;
        Ok(sno)
    }

    pub(crate) fn map_demand_row(row: &rusqlite::Row) -> rusqlite::Result<Demand> {
        let status_text: String = row.get(12)?;
        let status = DemandStatus::parse(&status_text).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                12,
                rusqlite::types::Type::Text,
                format!("unknown demand status: {status_text}").into(),
            )
        })?;
        Ok(Demand {
            id: row.get(0)?,
            sno: row.get(1)?,
            account_id: row.get(2)?,
            project: row.get(3)?,
            role: row.get(4)?,
            role_code: row.get(5)?,
            location: row.get(6)?,
            revised: row.get(7)?,
            original_start_date: row.get(8)?,
            allocation_end_date: row.get(9)?,
            allocation_percentage: row.get(10)?,
            probability: row.get(11)?,
            status,
            resource_mapped: row.get(13)?,
            comment: row.get(14)?,
            start_month: row.get(15)?,
            added_by: row.get(16)?,
            added_on: row.get(17)?,
            last_updated_by: row.get(18)?,
            updated_on: row.get(19)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::{open_temp_db, sample_account, sample_demand};
    use crate::types::DemandStatus;

    #[test]
    fn insert_get_update_delete_round_trip() {
        let (_dir, db) = open_temp_db();
        db.insert_account(&sample_account("acc-1", "Acme", "NA"))
            .unwrap();

        let mut demand = sample_demand("dem-1", 1, "acc-1", "SE");
        db.insert_demand(&demand).unwrap();

        let loaded = db.get_demand("dem-1").unwrap().expect("demand exists");
        assert_eq!(loaded.sno, 1);
        assert_eq!(loaded.status, DemandStatus::Open);

        demand.status = DemandStatus::Fulfilled;
        demand.resource_mapped = Some("Alice".to_string());
        assert!(db.update_demand(&demand).unwrap());
        let loaded = db.get_demand("dem-1").unwrap().unwrap();
        assert_eq!(loaded.status, DemandStatus::Fulfilled);
        assert_eq!(loaded.resource_mapped.as_deref(), Some("Alice"));

        assert!(db.delete_demand("dem-1").unwrap());
        assert!(db.get_demand("dem-1").unwrap().is_none());
    }

    #[test]
    fn demands_for_account_excludes_other_accounts() {
        let (_dir, db) = open_temp_db();
        db.insert_account(&sample_account("acc-1", "Acme", "NA"))
            .unwrap();
        db.insert_account(&sample_account("acc-2", "Globex", "EMEA"))
            .unwrap();
        db.insert_demand(&sample_demand("dem-1", 1, "acc-1", "SE"))
            .unwrap();
        db.insert_demand(&sample_demand("dem-2", 2, "acc-2", "TL"))
            .unwrap();
        db.insert_demand(&sample_demand("dem-3", 3, "acc-1", "QA"))
            .unwrap();

        let for_acme = db.get_demands_for_account("acc-1").unwrap();
        assert_eq!(for_acme.len(), 2);
        assert!(for_acme.iter().all(|d| d.account_id == "acc-1"));
        assert_eq!(db.count_demands_for_account("acc-2").unwrap(), 1);
    }

    #[test]
    fn sequence_numbers_survive_deletions() {
        let (_dir, db) = open_temp_db();
        db.insert_account(&sample_account("acc-1", "Acme", "NA"))
            .unwrap();

        let first = db.next_demand_sno().unwrap();
        let second = db.next_demand_sno().unwrap();
        assert_eq!(second, first + 1);

        // Deleting a demand must not let the counter regress.
        db.insert_demand(&sample_demand("dem-1", second, "acc-1", "SE"))
            .unwrap();
        db.delete_demand("dem-1").unwrap();
        let third = db.next_demand_sno().unwrap();
        assert_eq!(third, second + 1);
    }
}
