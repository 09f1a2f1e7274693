//! Raw record values, classified once at ingestion.

use serde_json::{json, Value};

use crate::constants::{AMOUNT, VARIETY};

/// One element of a variety/amount list, e.g. `{"variety": "S - Database", "amount": 2}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub variety: String,
    pub amount: Option<f64>,
}

/// A raw record value at one flattened path.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Absent,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Cell>),
    Entry(Entry),
    /// Anything else: objects without a `variety`, numbers outside f64, ...
    Other(Value),
}

impl Cell {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or_else(|| Self::Other(value.clone())),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_item).collect()),
            Value::Object(_) => Self::from_item(value),
        }
    }

    fn from_item(value: &Value) -> Self {
        let Value::Object(obj) = value else {
            return Self::from_value(value);
        };
        match obj.get(VARIETY) {
            Some(Value::String(variety)) => Self::Entry(Entry {
                variety: variety.clone(),
                amount: obj.get(AMOUNT).and_then(Value::as_f64),
            }),
            _ => Self::Other(value.clone()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Enumeration check: a list holding `value`, or a string equal to it.
    pub fn contains_value(&self, value: &str) -> bool {
        match self {
            Self::List(items) => items.iter().any(|item| matches!(item, Self::Text(s) if s == value)),
            Self::Text(s) => s == value,
            _ => false,
        }
    }

    /// Variety check: some entry (or bare string entry) names `value`.
    pub fn has_variety(&self, value: &str) -> bool {
        match self {
            Self::List(items) => items.iter().any(|item| match item {
                Self::Entry(entry) => entry.variety == value,
                Self::Text(s) => s == value,
                _ => false,
            }),
            _ => false,
        }
    }

    /// Amount of the first entry naming `value` that carries one.
    pub fn amount_for(&self, value: &str) -> Option<f64> {
        match self {
            Self::List(items) => items.iter().find_map(|item| match item {
                Self::Entry(entry) if entry.variety == value => entry.amount,
                _ => None,
            }),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Absent => None,
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(format_number(*n)),
            Self::Bool(b) => Some(b.to_string()),
            other => Some(other.to_json().to_string()),
        }
    }

    /// Numeric reading of the cell; NaN when it has none.
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Absent => Value::Null,
            Self::Bool(b) => json!(b),
            Self::Number(n) => json!(n),
            Self::Text(s) => json!(s),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Entry(entry) => match entry.amount {
                Some(amount) => json!({ "variety": entry.variety, "amount": amount }),
                None => json!({ "variety": entry.variety }),
            },
            Self::Other(value) => value.clone(),
        }
    }
}

/// Renders integral values without a fractional part (`2019`, not `2019.0`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
