//! Column prototypes: the typed, chartable attributes of the domain.

use serde::{Deserialize, Serialize};

use super::entity::{EntityType, SpecializedEntityType};
use crate::query::QueryDefinition;

/// Execution statuses from "not yet failed" to "could not run at all".
pub const EXECUTION_STATUSES: &[&str] = &[
    "READY",
    "RUNNING",
    "SUCCESS",
    "SETTLED",
    "WARNING",
    "FAILURE",
    "BLOCKED",
    "ERROR",
    "UNTESTABLE",
    "NOT_RUN",
    "NOT_FOUND",
];

/// Enumerations with a business order that differs from the alphabetical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LevelKind {
    TestCaseImportance,
    TestCaseStatus,
    RequirementCriticality,
    RequirementStatus,
}

impl LevelKind {
    pub const ALL: [LevelKind; 4] = [
        LevelKind::TestCaseImportance,
        LevelKind::TestCaseStatus,
        LevelKind::RequirementCriticality,
        LevelKind::RequirementStatus,
    ];

    /// Codes in ascending level order.
    pub fn levels(&self) -> &'static [&'static str] {
        match self {
            LevelKind::TestCaseImportance => &["VERY_HIGH", "HIGH", "MEDIUM", "LOW"],
            LevelKind::TestCaseStatus => &[
                "WORK_IN_PROGRESS",
                "UNDER_REVIEW",
                "APPROVED",
                "OBSOLETE",
                "TO_BE_UPDATED",
            ],
            LevelKind::RequirementCriticality => &["CRITICAL", "MAJOR", "MINOR", "UNDEFINED"],
            LevelKind::RequirementStatus => {
                &["WORK_IN_PROGRESS", "UNDER_REVIEW", "APPROVED", "OBSOLETE"]
            }
        }
    }
}

/// Value type of a column, driving literal conversion, valid operations
/// and in-memory ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Numeric,
    String,
    Date,
    /// Dates stored as `YYYY-MM-DD` text (custom fields).
    DateAsString,
    Boolean,
    /// Booleans stored as `"true"`/`"false"` text (custom fields).
    BooleanAsString,
    Level(LevelKind),
    ExecutionStatus,
    /// Code of an info list item, displayed through its label.
    InfoListItem,
    /// Code of a custom drop-down list option.
    List,
    /// Labels of a multi-valued custom field.
    Tag,
}

impl DataType {
    pub fn is_date(&self) -> bool {
        matches!(self, DataType::Date | DataType::DateAsString)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Numeric)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, DataType::Boolean | DataType::BooleanAsString)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Numeric => write!(f, "NUMERIC"),
            DataType::String => write!(f, "STRING"),
            DataType::Date => write!(f, "DATE"),
            DataType::DateAsString => write!(f, "DATE_AS_STRING"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::BooleanAsString => write!(f, "BOOLEAN_AS_STRING"),
            DataType::Level(_) => write!(f, "LEVEL_ENUM"),
            DataType::ExecutionStatus => write!(f, "EXECUTION_STATUS"),
            DataType::InfoListItem => write!(f, "INFO_LIST_ITEM"),
            DataType::List => write!(f, "LIST"),
            DataType::Tag => write!(f, "TAG"),
        }
    }
}

/// How a calculated column's nested query is combined with the outer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStrategy {
    /// Merge the nested entities and measure expression into the outer query.
    Inlined,
    /// Emit a correlated subquery.
    Subquery,
}

/// A calculated column's definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub strategy: QueryStrategy,
    pub query: Box<QueryDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    /// Plain attribute of the owning entity.
    Attribute,
    /// Derived from a nested query definition.
    Calculated(Calculation),
    /// Custom field value, resolved through the generic value store.
    Cuf,
}

/// A chartable column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPrototype {
    pub label: String,
    pub entity: SpecializedEntityType,
    pub data_type: DataType,
    pub column_type: ColumnType,
    /// Physical column; for custom fields, the column of the value store.
    pub attribute: String,
}

impl ColumnPrototype {
    pub fn attribute(
        label: &str,
        entity: SpecializedEntityType,
        data_type: DataType,
        attribute: &str,
    ) -> Self {
        Self {
            label: label.into(),
            entity,
            data_type,
            column_type: ColumnType::Attribute,
            attribute: attribute.into(),
        }
    }

    pub fn calculated(
        label: &str,
        entity: SpecializedEntityType,
        data_type: DataType,
        strategy: QueryStrategy,
        query: QueryDefinition,
    ) -> Self {
        Self {
            label: label.into(),
            entity,
            data_type,
            column_type: ColumnType::Calculated(Calculation {
                strategy,
                query: Box::new(query),
            }),
            attribute: String::new(),
        }
    }

    /// A custom field column on `entity_type`; the field id comes with each use.
    pub fn custom_field(label: &str, entity_type: EntityType, data_type: DataType) -> Self {
        let attribute = match data_type {
            DataType::Numeric => "numeric_value",
            DataType::Tag => "label",
            _ => "value",
        };
        Self {
            label: label.into(),
            entity: SpecializedEntityType::plain(entity_type),
            data_type,
            column_type: ColumnType::Cuf,
            attribute: attribute.into(),
        }
    }

    pub fn is_custom_field(&self) -> bool {
        matches!(self.column_type, ColumnType::Cuf)
    }

    pub fn calculation(&self) -> Option<&Calculation> {
        match &self.column_type {
            ColumnType::Calculated(calc) => Some(calc),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_orders() {
        assert_eq!(LevelKind::TestCaseImportance.levels()[0], "VERY_HIGH");
        assert_eq!(LevelKind::RequirementCriticality.levels().len(), 4);
        assert_eq!(EXECUTION_STATUSES.first(), Some(&"READY"));
        assert_eq!(EXECUTION_STATUSES.last(), Some(&"NOT_FOUND"));
    }

    #[test]
    fn test_custom_field_attribute_by_type() {
        let numeric = ColumnPrototype::custom_field("X", EntityType::TestCase, DataType::Numeric);
        let tag = ColumnPrototype::custom_field("Y", EntityType::TestCase, DataType::Tag);
        let text = ColumnPrototype::custom_field("Z", EntityType::TestCase, DataType::String);
        assert_eq!(numeric.attribute, "numeric_value");
        assert_eq!(tag.attribute, "label");
        assert_eq!(text.attribute, "value");
        assert!(tag.is_custom_field());
        assert!(tag.calculation().is_none());
    }
}
