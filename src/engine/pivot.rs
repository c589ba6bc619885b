//! Cross-tabulations of demands by role code, account and start month.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{Account, Demand, DemandStatus};

/// Bucket for demands whose account id matches no account.
pub const UNKNOWN_ACCOUNT: &str = "Unknown";

/// Grouping mode for the pivot endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotMode {
    ByRoleCode,
    ByAccount,
    ByRoleCodeAndAccount,
    ByAccountRoleMonth,
}

impl PivotMode {
    pub fn from_param(name: &str) -> Option<Self> {
        match name {
            "byRoleCode" => Some(Self::ByRoleCode),
            "byAccount" => Some(Self::ByAccount),
            "byRoleCodeAndAccount" => Some(Self::ByRoleCodeAndAccount),
            "byAccountRoleMonth" => Some(Self::ByAccountRoleMonth),
            _ => None,
        }
    }
}

/// One group with its status breakdown. Cancelled demands count toward
/// `total` but get no column of their own; `total - (open + inProgress +
/// fulfilled)` recovers them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdownRow {
    pub key: String,
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub fulfilled: usize,
}

/// Role code × account name count matrix. Every row is dense over
/// `accounts`: a role with no demands for an account gets 0, not a gap.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAccountMatrix {
    /// Column labels: distinct account names observed in the demand set.
    pub accounts: Vec<String>,
    pub rows: Vec<RoleAccountRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAccountRow {
    pub role_code: String,
    /// One count per entry of `RoleAccountMatrix::accounts`.
    pub cells: Vec<usize>,
    pub total: usize,
}

/// Account → role code → start-month table with role and account totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTable {
    /// Column labels. Derived from the *unfiltered* demand set so the table
    /// shape stays identical while filters change the cell values.
    pub months: Vec<String>,
    pub groups: Vec<AccountMonthGroup>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMonthGroup {
    pub account: String,
    pub roles: Vec<RoleMonthRow>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMonthRow {
    pub role_code: String,
    /// One count per entry of `MonthTable::months`.
    pub cells: Vec<usize>,
    pub total: usize,
}

/// Pivot result for whichever mode was requested.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PivotOutput {
    Breakdown(Vec<StatusBreakdownRow>),
    Matrix(RoleAccountMatrix),
    Months(MonthTable),
}

/// Group demands by role code with a status breakdown per group.
pub fn status_breakdown_by_role_code(demands: &[Demand]) -> Vec<StatusBreakdownRow> {
    status_breakdown(demands.iter().map(|d| (d.role_code.clone(), d)))
}

/// Group demands by parent account name with a status breakdown per group.
pub fn status_breakdown_by_account(
    demands: &[Demand],
    accounts: &[Account],
) -> Vec<StatusBreakdownRow> {
    let names = account_name_index(accounts);
    status_breakdown(
        demands
            .iter()
            .map(|d| (resolve_account_name(&names, &d.account_id), d)),
    )
}

fn status_breakdown<'a>(
    keyed: impl Iterator<Item = (String, &'a Demand)>,
) -> Vec<StatusBreakdownRow> {
    let mut groups: BTreeMap<String, StatusBreakdownRow> = BTreeMap::new();
    for (key, demand) in keyed {
        let row = groups.entry(key.clone()).or_insert(StatusBreakdownRow {
            key,
            total: 0,
            open: 0,
            in_progress: 0,
            fulfilled: 0,
        });
        row.total += 1;
        match demand.status {
            DemandStatus::Open => row.open += 1,
            DemandStatus::InProgress => row.in_progress += 1,
            DemandStatus::Fulfilled => row.fulfilled += 1,
            DemandStatus::Cancelled => {}
        }
    }
    groups.into_values().collect()
}

/// Build the role-code × account-name count matrix.
pub fn role_account_matrix(demands: &[Demand], accounts: &[Account]) -> RoleAccountMatrix {
    let names = account_name_index(accounts);

    let mut columns: BTreeSet<String> = BTreeSet::new();
    let mut counts: BTreeMap<String, HashMap<String, usize>> = BTreeMap::new();
    for demand in demands {
        let account_name = resolve_account_name(&names, &demand.account_id);
        columns.insert(account_name.clone());
        *counts
            .entry(demand.role_code.clone())
            .or_default()
            .entry(account_name)
            .or_insert(0) += 1;
    }

    let columns: Vec<String> = columns.into_iter().collect();
    let rows = counts
        .into_iter()
        .map(|(role_code, by_account)| {
            let cells: Vec<usize> = columns
                .iter()
                .map(|name| by_account.get(name).copied().unwrap_or(0))
                .collect();
            let total = cells.iter().sum();
            RoleAccountRow {
                role_code,
                cells,
                total,
            }
        })
        .collect();

    RoleAccountMatrix {
        accounts: columns,
        rows,
    }
}

/// Build the account → role code → start-month table.
///
/// `all_demands` supplies the month columns; `filtered` supplies the counts.
/// Passing the same slice for both gives the unfiltered table.
pub fn account_role_month(
    filtered: &[Demand],
    all_demands: &[Demand],
    accounts: &[Account],
) -> MonthTable {
    let months = month_columns(all_demands);
    let month_index: HashMap<&str, usize> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (m.as_str(), i))
        .collect();
    let names = account_name_index(accounts);

    // account name → role code → per-month counts
    let mut groups: BTreeMap<String, BTreeMap<String, Vec<usize>>> = BTreeMap::new();
    for demand in filtered {
        let account_name = resolve_account_name(&names, &demand.account_id);
        let cells = groups
            .entry(account_name)
            .or_default()
            .entry(demand.role_code.clone())
            .or_insert_with(|| vec![0; months.len()]);
        if let Some(&i) = month_index.get(demand.start_month.as_str()) {
            cells[i] += 1;
        }
    }

    let groups = groups
        .into_iter()
        .map(|(account, roles)| {
            let roles: Vec<RoleMonthRow> = roles
                .into_iter()
                .map(|(role_code, cells)| {
                    let total = cells.iter().sum();
                    RoleMonthRow {
                        role_code,
                        cells,
                        total,
                    }
                })
                .collect();
            let total = roles.iter().map(|r| r.total).sum();
            AccountMonthGroup {
                account,
                roles,
                total,
            }
        })
        .collect();

    MonthTable { months, groups }
}

/// Distinct start months across a demand set, in chronological order where
/// the label parses as "%b %Y" (e.g. "Jan 2024"); unparseable labels sort
/// lexicographically after the parseable ones.
fn month_columns(demands: &[Demand]) -> Vec<String> {
    let mut months: Vec<String> = demands
        .iter()
        .map(|d| d.start_month.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    months.sort_by(|a, b| match (parse_month(a), parse_month(b)) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    });
    months
}

fn parse_month(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("01 {}", label.trim()), "%d %b %Y").ok()
}

fn account_name_index(accounts: &[Account]) -> HashMap<&str, &str> {
    accounts
        .iter()
        .map(|a| (a.id.as_str(), a.client.as_str()))
        .collect()
}

fn resolve_account_name(names: &HashMap<&str, &str>, account_id: &str) -> String {
    names
        .get(account_id)
        .map(|n| n.to_string())
        .unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string())
}
