use crate::domain::models::{Transaction, TransactionKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// Raw search parameters as they arrive in a query string.
///
/// Every field is kept as text: values that fail to parse are dropped when
/// the predicate is built instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    pub category: Option<String>,
    pub source: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_recurring: Option<String>,
    pub recurrence: Option<String>,
}

impl TransactionQuery {
    /// Collects decoded query-string pairs. A repeated key keeps its first
    /// value and unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> TransactionQuery
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = TransactionQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "category" => &mut query.category,
                "source" => &mut query.source,
                "min_amount" => &mut query.min_amount,
                "max_amount" => &mut query.max_amount,
                "start_date" => &mut query.start_date,
                "end_date" => &mut query.end_date,
                "is_recurring" => &mut query.is_recurring,
                "recurrence" => &mut query.recurrence,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    /// The label filter for the given collection: `category` for expenses,
    /// `source` for income.
    fn label(&self, kind: TransactionKind) -> Option<&str> {
        match kind {
            TransactionKind::Expense => non_blank(&self.category),
            TransactionKind::Income => non_blank(&self.source),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    LabelIs(String),
    AmountAtLeast(f64),
    AmountAtMost(f64),
    DateFrom(DateTime<Utc>),
    DateTo(DateTime<Utc>),
    RecurringIs(bool),
    RecurrenceIs(String),
}

impl Condition {
    fn matches(&self, tx: &Transaction) -> bool {
        match self {
            Condition::LabelIs(label) => &tx.label == label,
            Condition::AmountAtLeast(min) => tx.amount >= *min,
            Condition::AmountAtMost(max) => tx.amount <= *max,
            Condition::DateFrom(from) => tx.date >= *from,
            Condition::DateTo(to) => tx.date <= *to,
            Condition::RecurringIs(flag) => tx.is_recurring == *flag,
            Condition::RecurrenceIs(recurrence) => {
                tx.recurrence.as_deref() == Some(recurrence.as_str())
            }
        }
    }
}

/// Conjunction of conditions over one user's records of one kind.
///
/// The user scope is part of the type rather than a condition, so no
/// predicate can be built that reaches across users.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPredicate {
    user_id: i64,
    kind: TransactionKind,
    conditions: Vec<Condition>,
}

impl TransactionPredicate {
    pub fn for_user(user_id: i64, kind: TransactionKind) -> Self {
        TransactionPredicate {
            user_id,
            kind,
            conditions: Vec::new(),
        }
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.user_id == self.user_id
            && tx.kind == self.kind
            && self.conditions.iter().all(|c| c.matches(tx))
    }
}

/// Translates sparse query parameters into a predicate. Never fails.
pub fn build_predicate(
    user_id: i64,
    kind: TransactionKind,
    query: &TransactionQuery,
) -> TransactionPredicate {
    let mut predicate = TransactionPredicate::for_user(user_id, kind);

    if let Some(label) = query.label(kind) {
        predicate = predicate.and(Condition::LabelIs(label.to_string()));
    }
    if let Some(min) = query.min_amount.as_deref().and_then(parse_amount) {
        predicate = predicate.and(Condition::AmountAtLeast(min));
    }
    if let Some(max) = query.max_amount.as_deref().and_then(parse_amount) {
        predicate = predicate.and(Condition::AmountAtMost(max));
    }
    if let Some(from) = query.start_date.as_deref().and_then(parse_date) {
        predicate = predicate.and(Condition::DateFrom(from));
    }
    if let Some(to) = query.end_date.as_deref().and_then(parse_date) {
        predicate = predicate.and(Condition::DateTo(to));
    }
    if let Some(flag) = non_blank(&query.is_recurring) {
        predicate = predicate.and(Condition::RecurringIs(parse_flag(flag)));
    }
    if let Some(recurrence) = non_blank(&query.recurrence) {
        predicate = predicate.and(Condition::RecurrenceIs(recurrence.to_string()));
    }

    predicate
}

/// Accepts RFC 3339 timestamps as well as offset-less ISO-8601 datetimes and
/// plain dates, both read as UTC. Anything else yields `None`.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Blank parameters count as absent.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_amount(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn expense(amount: f64, category: &str) -> Transaction {
        Transaction {
            id: 1,
            user_id: 7,
            kind: TransactionKind::Expense,
            amount,
            label: category.to_string(),
            description: None,
            date: Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap(),
            is_recurring: false,
            recurrence: None,
            next_occurrence: None,
        }
    }

    #[test]
    fn no_parameters_scope_to_user_only() {
        let predicate = build_predicate(7, TransactionKind::Expense, &TransactionQuery::default());
        assert_eq!(predicate, TransactionPredicate::for_user(7, TransactionKind::Expense));
        assert!(predicate.conditions().is_empty());
        assert!(predicate.matches(&expense(1.0, "Food")));

        let mut foreign = expense(1.0, "Food");
        foreign.user_id = 8;
        assert!(!predicate.matches(&foreign));
    }

    #[test]
    fn malformed_dates_are_dropped() {
        let with_garbage = TransactionQuery {
            start_date: Some("not-a-date".to_string()),
            end_date: Some("2024-13-45".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_predicate(7, TransactionKind::Income, &with_garbage),
            build_predicate(7, TransactionKind::Income, &TransactionQuery::default()),
        );
    }

    #[test]
    fn blank_parameters_are_dropped() {
        let blank = TransactionQuery {
            category: Some(String::new()),
            source: Some("  ".to_string()),
            min_amount: Some(String::new()),
            max_amount: Some(String::new()),
            start_date: Some(String::new()),
            end_date: Some(String::new()),
            is_recurring: Some(String::new()),
            recurrence: Some(String::new()),
        };
        for kind in [TransactionKind::Expense, TransactionKind::Income] {
            assert_eq!(
                build_predicate(7, kind, &blank),
                build_predicate(7, kind, &TransactionQuery::default()),
            );
        }
    }

    #[test]
    fn repeated_keys_keep_the_first_value() {
        let pairs = [
            ("min_amount", "1"),
            ("min_amount", "2"),
            ("user_id", "99"),
            ("category", "Food"),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string()));
        let query = TransactionQuery::from_pairs(pairs);

        assert_eq!(query.min_amount.as_deref(), Some("1"));
        assert_eq!(query.category.as_deref(), Some("Food"));
        assert_eq!(
            build_predicate(7, TransactionKind::Expense, &query).conditions(),
            &[
                Condition::LabelIs("Food".to_string()),
                Condition::AmountAtLeast(1.0),
            ]
        );
    }

    #[test]
    fn date_bounds_accept_several_iso_forms() {
        let query = TransactionQuery {
            start_date: Some("2024-05-01".to_string()),
            end_date: Some("2024-05-31T23:59:59Z".to_string()),
            ..Default::default()
        };
        let predicate = build_predicate(7, TransactionKind::Expense, &query);
        assert_eq!(
            predicate.conditions(),
            &[
                Condition::DateFrom(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
                Condition::DateTo(Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap()),
            ]
        );
        assert!(predicate.matches(&expense(5.0, "Food")));
    }

    #[test]
    fn inverted_amount_range_is_kept_as_given() {
        let query = TransactionQuery {
            min_amount: Some("10".to_string()),
            max_amount: Some("5".to_string()),
            ..Default::default()
        };
        let predicate = build_predicate(7, TransactionKind::Expense, &query);
        assert_eq!(
            predicate.conditions(),
            &[Condition::AmountAtLeast(10.0), Condition::AmountAtMost(5.0)]
        );
        for amount in [0.0, 5.0, 7.5, 10.0, 20.0] {
            assert!(!predicate.matches(&expense(amount, "Food")));
        }
    }

    #[test]
    fn label_filter_follows_collection() {
        let query = TransactionQuery {
            category: Some("Food".to_string()),
            source: Some("Salary".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_predicate(1, TransactionKind::Expense, &query).conditions(),
            &[Condition::LabelIs("Food".to_string())]
        );
        assert_eq!(
            build_predicate(1, TransactionKind::Income, &query).conditions(),
            &[Condition::LabelIs("Salary".to_string())]
        );
    }

    #[test]
    fn recurring_flag_is_case_insensitive() {
        for (raw, expected) in [("TRUE", true), ("True", true), ("false", false), ("yes", false)] {
            let query = TransactionQuery {
                is_recurring: Some(raw.to_string()),
                ..Default::default()
            };
            assert_eq!(
                build_predicate(1, TransactionKind::Expense, &query).conditions(),
                &[Condition::RecurringIs(expected)],
                "{raw}"
            );
        }
    }

    #[test]
    fn non_numeric_amount_is_dropped() {
        let query = TransactionQuery {
            min_amount: Some("ten".to_string()),
            max_amount: Some("NaN".to_string()),
            recurrence: Some("monthly".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_predicate(1, TransactionKind::Expense, &query).conditions(),
            &[Condition::RecurrenceIs("monthly".to_string())]
        );
    }
}
