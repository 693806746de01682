//! Attribute conditions: a field name paired with a comparison operator.

use crate::value::AttributeValue;

/// Comparison operator carrying its operand values.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionOp {
    Equals(AttributeValue),
    NotEquals(AttributeValue),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    GreaterThan(AttributeValue),
    LessThan(AttributeValue),
    /// Inclusive on both ends.
    Between(AttributeValue, AttributeValue),
    IsEmpty,
}

impl ConditionOp {
    /// Text rendering of the operand, used as a filename token during file
    /// search. Range and emptiness checks contribute no token.
    pub fn operand_text(&self) -> Option<String> {
        match self {
            ConditionOp::Equals(value)
            | ConditionOp::NotEquals(value)
            | ConditionOp::GreaterThan(value)
            | ConditionOp::LessThan(value) => value.as_text().map(|text| text.into_owned()),
            ConditionOp::Contains(text)
            | ConditionOp::StartsWith(text)
            | ConditionOp::EndsWith(text) => Some(text.clone()),
            ConditionOp::Between(_, _) | ConditionOp::IsEmpty => None,
        }
    }
}

/// One refine condition against a named attribute field.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeCondition {
    pub field: String,
    pub op: ConditionOp,
}

impl AttributeCondition {
    pub fn new(field: impl Into<String>, op: ConditionOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }
}
