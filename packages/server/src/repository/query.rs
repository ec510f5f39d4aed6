//! Composition of the property filter into a store query.
//!
//! A [`PropertyQuery`] is the conjunction of the conditions whose inputs were
//! supplied. It renders to a MongoDB filter document for the database backend
//! and can be evaluated directly against entities by the in-memory backend, so
//! both backends agree on what matches.

use bson::{Document, doc};

use crate::entity::Property;
use crate::error::{AppError, FieldErrors};
use crate::models::property::PropertyFilter;

/// A single predicate on a property.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-insensitive literal substring of the name.
    NameContains(String),
    /// Case-insensitive literal substring of the address.
    AddressContains(String),
    /// `price >= bound`
    PriceAtLeast(f64),
    /// `price <= bound`
    PriceAtMost(f64),
}

impl Condition {
    fn matches(&self, property: &Property) -> bool {
        match self {
            Condition::NameContains(term) => contains_ignore_case(&property.name, term),
            Condition::AddressContains(term) => contains_ignore_case(&property.address, term),
            Condition::PriceAtLeast(min) => property.price >= *min,
            Condition::PriceAtMost(max) => property.price <= *max,
        }
    }

    fn to_document(&self) -> Document {
        match self {
            Condition::NameContains(term) => {
                doc! { "Name": { "$regex": escape_regex(term), "$options": "i" } }
            }
            Condition::AddressContains(term) => {
                doc! { "Address": { "$regex": escape_regex(term), "$options": "i" } }
            }
            Condition::PriceAtLeast(min) => doc! { "Price": { "$gte": *min } },
            Condition::PriceAtMost(max) => doc! { "Price": { "$lte": *max } },
        }
    }
}

/// Conjunction of [`Condition`]s. No conditions matches every property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyQuery {
    conditions: Vec<Condition>,
}

impl PropertyQuery {
    pub fn matches(&self, property: &Property) -> bool {
        self.conditions.iter().all(|c| c.matches(property))
    }

    /// MongoDB filter document. `$and` rejects an empty array, so the
    /// unconstrained query renders as `{}`.
    pub fn to_document(&self) -> Document {
        if self.conditions.is_empty() {
            return Document::new();
        }
        let clauses: Vec<Document> = self.conditions.iter().map(Condition::to_document).collect();
        doc! { "$and": clauses }
    }
}

/// Check a price range: each bound finite and non-negative, and `min <= max`
/// when both are given. Every violated rule is reported.
pub fn validate_range(min_price: Option<f64>, max_price: Option<f64>) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();

    check_bound(&mut errors, "MinPrice", "Minimum", min_price);
    check_bound(&mut errors, "MaxPrice", "Maximum", max_price);

    if let (Some(min), Some(max)) = (min_price, max_price)
        && min > max
    {
        errors
            .entry("Price".into())
            .or_default()
            .push("Minimum price cannot be greater than maximum price".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation_errors(errors))
    }
}

fn check_bound(errors: &mut FieldErrors, field: &str, label: &str, bound: Option<f64>) {
    let Some(value) = bound else {
        return;
    };
    let message = if !value.is_finite() {
        format!("{label} price must be a finite number")
    } else if value < 0.0 {
        format!("{label} price cannot be negative")
    } else {
        return;
    };
    errors.entry(field.into()).or_default().push(message);
}

/// Build the query for `filter`, re-validating its price range first.
pub fn build_filter(filter: &PropertyFilter) -> Result<PropertyQuery, AppError> {
    validate_range(filter.min_price, filter.max_price)?;

    let mut conditions = Vec::new();

    if let Some(name) = non_empty(&filter.name) {
        conditions.push(Condition::NameContains(name.to_owned()));
    }
    if let Some(address) = non_empty(&filter.address) {
        conditions.push(Condition::AddressContains(address.to_owned()));
    }
    if let Some(min) = filter.min_price {
        conditions.push(Condition::PriceAtLeast(min));
    }
    if let Some(max) = filter.max_price {
        conditions.push(Condition::PriceAtMost(max));
    }

    Ok(PropertyQuery { conditions })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Escape regular expression metacharacters so `s` matches literally.
fn escape_regex(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
