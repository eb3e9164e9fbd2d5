//! Record vocabulary shared by the gateway port and its adapters.

use super::{GatewayResult, RemoteError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// A single row exchanged with the remote store, keyed by column name.
pub type Record = serde_json::Map<String, Value>;

/// Tables exposed by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Workspace rows.
    Workspaces,
    /// Workspace membership rows.
    WorkspaceMembers,
    /// Task list rows.
    TaskLists,
    /// Task rows.
    Tasks,
    /// Read-only user directory used to resolve members by email.
    Users,
}

impl Table {
    /// Returns the store-side table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workspaces => "workspaces",
            Self::WorkspaceMembers => "workspace_members",
            Self::TaskLists => "task_lists",
            Self::Tasks => "tasks",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    value: Value,
}

impl Filter {
    /// Matches rows whose `field` equals `value`.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns the filtered column.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the expected value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns `true` when `record` satisfies the filter.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.field) == Some(&self.value)
    }
}

/// Sort instruction for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    field: String,
    ascending: bool,
}

impl OrderBy {
    /// Sorts by `field` in ascending order.
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    /// Sorts by `field` in descending order.
    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }

    /// Returns the sort column.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns `true` for ascending order.
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Compares two records on this column.
    ///
    /// Missing values sort first. Timestamps are compared chronologically
    /// rather than lexically.
    #[must_use]
    pub fn compare(&self, left: &Record, right: &Record) -> Ordering {
        let ordering = compare_values(left.get(&self.field), right.get(&self.field));
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_u64(), b.as_u64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (parse_timestamp(a), parse_timestamp(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.cmp(b),
            }
        }
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Serializes a value into a record.
///
/// # Errors
///
/// Returns [`RemoteError::Decode`] when `value` does not serialize to a JSON
/// object.
pub fn encode_record<T: Serialize>(table: Table, value: &T) -> GatewayResult<Record> {
    match serde_json::to_value(value) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(RemoteError::decode(
            table,
            format!("expected an object, found {other}"),
        )),
        Err(err) => Err(RemoteError::decode(table, err)),
    }
}

/// Decodes a record returned by the store into a row type.
///
/// # Errors
///
/// Returns [`RemoteError::Decode`] when the record does not match the row
/// shape.
pub fn decode_record<T: DeserializeOwned>(table: Table, record: Record) -> GatewayResult<T> {
    serde_json::from_value(Value::Object(record)).map_err(|err| RemoteError::decode(table, err))
}

/// Decodes every record of a query result, preserving order.
///
/// # Errors
///
/// Returns [`RemoteError::Decode`] on the first record that does not match
/// the row shape.
pub fn decode_records<T: DeserializeOwned>(
    table: Table,
    records: Vec<Record>,
) -> GatewayResult<Vec<T>> {
    records
        .into_iter()
        .map(|record| decode_record(table, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    #[rstest]
    #[case("position", json!({"position": 1}), json!({"position": 2}), Ordering::Less)]
    #[case("position", json!({"position": 3}), json!({"position": 2}), Ordering::Greater)]
    #[case("position", json!({}), json!({"position": 0}), Ordering::Less)]
    #[case(
        "created_at",
        json!({"created_at": "2024-01-01T00:00:00.500Z"}),
        json!({"created_at": "2024-01-01T00:00:01Z"}),
        Ordering::Less
    )]
    fn ascending_order_compares_columns(
        #[case] field: &str,
        #[case] left: Value,
        #[case] right: Value,
        #[case] expected: Ordering,
    ) {
        let order = OrderBy::asc(field);
        assert_eq!(order.compare(&record(left), &record(right)), expected);
    }

    #[rstest]
    fn descending_order_reverses_comparison() {
        let order = OrderBy::desc("position");
        let first = record(json!({"position": 1}));
        let second = record(json!({"position": 2}));
        assert_eq!(order.compare(&first, &second), Ordering::Greater);
    }

    #[rstest]
    fn filter_matches_exact_value_only() {
        let filter = Filter::equals("list_id", "abc");
        assert!(filter.matches(&record(json!({"list_id": "abc"}))));
        assert!(!filter.matches(&record(json!({"list_id": "abd"}))));
        assert!(!filter.matches(&record(json!({}))));
    }

    #[rstest]
    fn decode_record_reports_table_on_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Row {
            #[expect(dead_code, reason = "field exists only to shape the decoder")]
            position: u64,
        }

        let result: GatewayResult<Row> =
            decode_record(Table::Tasks, record(json!({"position": "first"})));
        assert!(matches!(
            result,
            Err(RemoteError::Decode {
                table: Table::Tasks,
                ..
            })
        ));
    }
}
