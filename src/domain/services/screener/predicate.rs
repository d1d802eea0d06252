//! Declarative predicate trees evaluated against screener records.
//!
//! A predicate is pure data: `Leaf(condition) | And(children) | Or(children)`.
//! Presets and dimension filters are both compiled into this form, so the
//! planner evaluates a single tree per query.

use serde::{Deserialize, Serialize};

use super::fields::MetricField;

const NUMERIC_EPSILON: f64 = 1e-9;

/// Row abstraction the predicates are evaluated against
pub trait MetricRecord {
    /// Numeric value of a field, None when missing
    fn number(&self, field: MetricField) -> Option<f64>;

    /// Text value of a field, None when missing
    fn text(&self, field: MetricField) -> Option<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
}

impl Comparator {
    pub fn compare(&self, left: f64, right: f64) -> bool {
        match self {
            Comparator::Lt => left < right,
            Comparator::Lte => left <= right,
            Comparator::Gt => left > right,
            Comparator::Gte => left >= right,
            Comparator::Eq => (left - right).abs() < NUMERIC_EPSILON,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Lte => "<=",
            Comparator::Gt => ">",
            Comparator::Gte => ">=",
            Comparator::Eq => "=",
        }
    }
}

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operand {
    Number { value: f64 },
    /// Another field of the same record, scaled by `factor`
    Field { field: MetricField, factor: f64 },
    Text { value: String },
}

/// `field <op> operand`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: MetricField,
    pub op: Comparator,
    pub operand: Operand,
}

impl Condition {
    /// A condition over a missing value is false
    pub fn evaluate<R: MetricRecord + ?Sized>(&self, record: &R) -> bool {
        match &self.operand {
            Operand::Number { value } => record
                .number(self.field)
                .map_or(false, |left| self.op.compare(left, *value)),
            Operand::Field { field, factor } => {
                match (record.number(self.field), record.number(*field)) {
                    (Some(left), Some(right)) => self.op.compare(left, right * factor),
                    _ => false,
                }
            }
            Operand::Text { value } => match (self.op, record.text(self.field)) {
                (Comparator::Eq, Some(left)) => left.eq_ignore_ascii_case(value),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Leaf(Condition),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn evaluate<R: MetricRecord + ?Sized>(&self, record: &R) -> bool {
        match self {
            Predicate::Leaf(condition) => condition.evaluate(record),
            Predicate::And(children) => children.iter().all(|c| c.evaluate(record)),
            Predicate::Or(children) => children.iter().any(|c| c.evaluate(record)),
        }
    }

    /// Matches every record
    pub fn always() -> Self {
        Predicate::And(Vec::new())
    }

    pub fn and(children: Vec<Predicate>) -> Self {
        Predicate::And(children)
    }

    pub fn or(children: Vec<Predicate>) -> Self {
        Predicate::Or(children)
    }

    pub fn compare(field: MetricField, op: Comparator, value: f64) -> Self {
        Predicate::Leaf(Condition {
            field,
            op,
            operand: Operand::Number { value },
        })
    }

    pub fn lt(field: MetricField, value: f64) -> Self {
        Self::compare(field, Comparator::Lt, value)
    }

    pub fn lte(field: MetricField, value: f64) -> Self {
        Self::compare(field, Comparator::Lte, value)
    }

    pub fn gt(field: MetricField, value: f64) -> Self {
        Self::compare(field, Comparator::Gt, value)
    }

    pub fn gte(field: MetricField, value: f64) -> Self {
        Self::compare(field, Comparator::Gte, value)
    }

    /// Inclusive range
    pub fn between(field: MetricField, low: f64, high: f64) -> Self {
        Predicate::And(vec![Self::gte(field, low), Self::lte(field, high)])
    }

    /// `field <op> other * factor`
    pub fn relative(field: MetricField, op: Comparator, other: MetricField, factor: f64) -> Self {
        Predicate::Leaf(Condition {
            field,
            op,
            operand: Operand::Field {
                field: other,
                factor,
            },
        })
    }

    pub fn text_eq(field: MetricField, value: impl Into<String>) -> Self {
        Predicate::Leaf(Condition {
            field,
            op: Comparator::Eq,
            operand: Operand::Text {
                value: value.into(),
            },
        })
    }

    /// Number of leaf conditions in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::Leaf(_) => 1,
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().map(Predicate::leaf_count).sum()
            }
        }
    }
}
