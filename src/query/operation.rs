//! Operations applicable to chart columns.

use serde::{Deserialize, Serialize};

/// What is done with a column: grouping, aggregation or comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    #[default]
    None,
    // aggregates
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
    /// `TRUE` when at least one non-null value exists.
    Exists,
    // comparisons
    Equals,
    NotEquals,
    Greater,
    GreaterEqual,
    Lower,
    LowerEqual,
    Between,
    In,
    Like,
    IsNull,
    NotNull,
    // date buckets
    ByDay,
    ByWeek,
    ByMonth,
    ByYear,
}

impl Operation {
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Operation::Count
                | Operation::CountDistinct
                | Operation::Sum
                | Operation::Avg
                | Operation::Min
                | Operation::Max
                | Operation::Exists
        )
    }

    pub fn is_date_bucket(&self) -> bool {
        matches!(
            self,
            Operation::ByDay | Operation::ByWeek | Operation::ByMonth | Operation::ByYear
        )
    }

    pub fn is_nullness(&self) -> bool {
        matches!(self, Operation::IsNull | Operation::NotNull)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operation::Equals
                | Operation::NotEquals
                | Operation::Greater
                | Operation::GreaterEqual
                | Operation::Lower
                | Operation::LowerEqual
                | Operation::Between
                | Operation::In
                | Operation::Like
                | Operation::IsNull
                | Operation::NotNull
        )
    }

    /// Whether the projected value is a boolean regardless of the column type.
    pub fn yields_boolean(&self) -> bool {
        self.is_nullness() || *self == Operation::Exists
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::None => "NONE",
            Operation::Count => "COUNT",
            Operation::CountDistinct => "COUNT_DISTINCT",
            Operation::Sum => "SUM",
            Operation::Avg => "AVG",
            Operation::Min => "MIN",
            Operation::Max => "MAX",
            Operation::Exists => "EXISTS",
            Operation::Equals => "EQUALS",
            Operation::NotEquals => "NOT_EQUALS",
            Operation::Greater => "GREATER",
            Operation::GreaterEqual => "GREATER_EQUAL",
            Operation::Lower => "LOWER",
            Operation::LowerEqual => "LOWER_EQUAL",
            Operation::Between => "BETWEEN",
            Operation::In => "IN",
            Operation::Like => "LIKE",
            Operation::IsNull => "IS_NULL",
            Operation::NotNull => "NOT_NULL",
            Operation::ByDay => "BY_DAY",
            Operation::ByWeek => "BY_WEEK",
            Operation::ByMonth => "BY_MONTH",
            Operation::ByYear => "BY_YEAR",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
