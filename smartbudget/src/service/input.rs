use crate::domain::filter::parse_date;
use crate::service::AppError;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Amounts arrive either as JSON numbers or as the text of a form field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn value(&self) -> Result<f64, AppError> {
        let value = match self {
            AmountInput::Number(n) => *n,
            AmountInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::Validation(format!("Invalid amount: {s}")))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(AppError::Validation("Invalid amount".to_string()))
        }
    }
}

pub(crate) fn amount(input: &Option<AmountInput>) -> Result<Option<f64>, AppError> {
    input.as_ref().map(AmountInput::value).transpose()
}

/// Unlike search filters, a date the client asked to store must parse.
pub(crate) fn timestamp(input: &Option<String>) -> Result<Option<DateTime<Utc>>, AppError> {
    input
        .as_deref()
        .map(|raw| parse_date(raw).ok_or_else(|| AppError::Validation(format!("Invalid date: {raw}"))))
        .transpose()
}

/// Trimmed, non-empty text or `None`.
pub(crate) fn text(input: &Option<String>) -> Option<String> {
    input
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
