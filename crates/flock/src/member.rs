//! Member records and their column model.

use chrono::NaiveDate;
use flock_table::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Membership standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
    Visitor,
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Visitor => "visitor",
        };
        f.write_str(s)
    }
}

/// One person in the member directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub status: MemberStatus,
    #[serde(default)]
    pub group: Option<String>,
    pub joined: NaiveDate,
    #[serde(default)]
    pub giving_ytd: f64,
}

impl Member {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Formats an amount as dollars with thousands separators.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// The member directory columns.
///
/// Email and phone start hidden; phone is neither sortable nor filterable.
#[must_use]
pub fn member_columns() -> Vec<Column<Member>> {
    vec![
        Column::new("id", "ID", |m: &Member| m.id.into()).filterable(false),
        Column::new("name", "Name", |m: &Member| m.full_name().into()),
        Column::new("email", "Email", |m: &Member| m.email.as_str().into()).hidden(true),
        Column::new("phone", "Phone", |m: &Member| m.phone.clone().into())
            .hidden(true)
            .sortable(false)
            .filterable(false),
        Column::new("status", "Status", |m: &Member| m.status.to_string().into())
            .filter_kind(FilterKind::Exact),
        Column::new("group", "Group", |m: &Member| m.group.clone().into()),
        Column::new("joined", "Joined", |m: &Member| m.joined.into()),
        Column::new("giving", "Giving YTD", |m: &Member| m.giving_ytd.into())
            .cell(|m: &Member| format_currency(m.giving_ytd)),
    ]
}
