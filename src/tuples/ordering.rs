//! In-memory ordering of result rows.
//!
//! SQL sorts enumerations alphabetically; levels and execution statuses have
//! a business order instead, so rows are re-sorted once fetched.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::Value;
use crate::domain::{DataType, LevelKind, EXECUTION_STATUSES};
use crate::query::{AxisColumn, ChartColumn};

static EXECUTION_STATUS_RANKS: LazyLock<HashMap<&'static str, usize>> =
    LazyLock::new(|| ranks(EXECUTION_STATUSES));

static LEVEL_RANKS: LazyLock<HashMap<LevelKind, HashMap<&'static str, usize>>> =
    LazyLock::new(|| {
        LevelKind::ALL
            .iter()
            .map(|kind| (*kind, ranks(kind.levels())))
            .collect()
    });

fn ranks(codes: &'static [&'static str]) -> HashMap<&'static str, usize> {
    codes.iter().enumerate().map(|(i, c)| (*c, i)).collect()
}

pub fn execution_status_rank(code: &str) -> Option<usize> {
    EXECUTION_STATUS_RANKS.get(code).copied()
}

pub fn level_rank(kind: LevelKind, code: &str) -> Option<usize> {
    LEVEL_RANKS.get(&kind).and_then(|r| r.get(code)).copied()
}

/// Sort rule of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// Keep values comparable the usual way.
    Natural,
    Level(LevelKind),
    ExecutionStatus,
    Boolean,
}

impl AxisOrder {
    pub fn for_axis(axis: &AxisColumn) -> Self {
        let operation = axis.operation();
        if operation.yields_boolean() {
            return AxisOrder::Boolean;
        }
        if operation.is_date_bucket() {
            return AxisOrder::Natural;
        }
        match axis.prototype().data_type {
            DataType::Level(kind) => AxisOrder::Level(kind),
            DataType::ExecutionStatus => AxisOrder::ExecutionStatus,
            DataType::Boolean | DataType::BooleanAsString => AxisOrder::Boolean,
            _ => AxisOrder::Natural,
        }
    }

    /// Whether the database order has to be replaced.
    pub fn is_custom(&self) -> bool {
        !matches!(self, AxisOrder::Natural)
    }

    /// Nulls first, then by rule.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        match self {
            AxisOrder::Natural => natural(a, b),
            AxisOrder::Level(kind) => by_rank(a, b, |code| level_rank(*kind, code)),
            AxisOrder::ExecutionStatus => by_rank(a, b, execution_status_rank),
            AxisOrder::Boolean => match (a.as_bool(), b.as_bool()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => natural(a, b),
            },
        }
    }
}

/// Known codes by rank, unknown codes after them alphabetically.
fn by_rank(a: &Value, b: &Value, rank: impl Fn(&str) -> Option<usize>) -> Ordering {
    let (Some(x), Some(y)) = (a.as_str(), b.as_str()) else {
        return natural(a, b);
    };
    match (rank(x), rank(y)) {
        (Some(i), Some(j)) => i.cmp(&j),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => x.cmp(y),
    }
}

fn natural(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => kind_rank(a).cmp(&kind_rank(b)),
        },
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::Float(_) => 2,
        Value::Text(_) => 3,
    }
}
