use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub attraction_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub currency: String,
    pub validity_start: DateTime<Utc>,
    pub validity_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket fields as submitted on the creation form. The price arrives as text
/// and is turned into a `Decimal` when the row is written.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_new_ticket_window"))]
pub struct NewTicket {
    #[validate(length(min = 1, message = "Ticket name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_price_text"))]
    pub price: String,
    #[validate(custom(function = "validate_currency"))]
    pub currency: String,
    pub validity_start: DateTime<Utc>,
    pub validity_end: DateTime<Utc>,
}

impl NewTicket {
    pub fn price_decimal(&self) -> Result<Decimal, ValidationError> {
        parse_price(&self.price)
    }

    pub fn currency_code(&self) -> String {
        normalize_currency(&self.currency)
    }
}

/// Partial update; unset fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_update_ticket_window"))]
pub struct UpdateTicket {
    #[validate(length(min = 1, message = "Ticket name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    #[validate(custom(function = "validate_currency"))]
    pub currency: Option<String>,
    pub validity_start: Option<DateTime<Utc>>,
    pub validity_end: Option<DateTime<Utc>>,
}

impl UpdateTicket {
    pub fn currency_code(&self) -> Option<String> {
        self.currency.as_deref().map(normalize_currency)
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn parse_price(raw: &str) -> Result<Decimal, ValidationError> {
    let price = Decimal::from_str(raw.trim())
        .map_err(|_| invalid("price", "Price must be a decimal number"))?;
    validate_price(&price)?;
    Ok(price)
}

fn validate_price_text(raw: &str) -> Result<(), ValidationError> {
    parse_price(raw).map(|_| ())
}

/// Prices are stored as `NUMERIC(12, 2)`.
const PRICE_SCALE: u32 = 2;
/// Exclusive upper bound: ten integer digits.
const PRICE_LIMIT: i64 = 10_000_000_000;

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(invalid("price", "Price cannot be negative"));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(invalid("price", "Price cannot have more than two decimal places"));
    }
    if *price >= Decimal::from(PRICE_LIMIT) {
        return Err(invalid("price", "Price must be less than 10000000000"));
    }
    Ok(())
}

fn normalize_currency(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

fn validate_currency(raw: &str) -> Result<(), ValidationError> {
    let code = raw.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(invalid("currency", "Currency must be a three-letter code"))
    }
}

fn check_window(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Result<(), ValidationError> {
    if end < start {
        return Err(invalid(
            "validity_window",
            "Validity end must not be before validity start",
        ));
    }
    Ok(())
}

fn validate_new_ticket_window(ticket: &NewTicket) -> Result<(), ValidationError> {
    check_window(&ticket.validity_start, &ticket.validity_end)
}

fn validate_update_ticket_window(ticket: &UpdateTicket) -> Result<(), ValidationError> {
    match (&ticket.validity_start, &ticket.validity_end) {
        (Some(start), Some(end)) => check_window(start, end),
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) fn adult_ticket() -> NewTicket {
    NewTicket {
        name: "Adult Ticket".to_string(),
        description: "Entry for one adult".to_string(),
        price: "29.99".to_string(),
        currency: "eur".to_string(),
        validity_start: "2024-06-01T00:00:00Z".parse().unwrap(),
        validity_end: "2024-12-31T23:59:59Z".parse().unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    #[test]
    fn test_price_text_is_parsed_as_decimal() {
        let ticket = adult_ticket();
        assert!(ticket.validate().is_ok());
        assert_eq!(ticket.price_decimal().unwrap(), Decimal::new(2999, 2));
        assert_eq!(ticket.currency_code(), "EUR");
    }

    #[test]
    fn test_unparsable_price_is_rejected() {
        let mut ticket = adult_ticket();
        ticket.price = "twenty".to_string();
        let errors = ticket.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        assert!(parse_price("-1.00").is_err());
        assert_eq!(parse_price(" 0 ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_price_must_fit_the_stored_precision() {
        assert!(parse_price("29.999").is_err());
        assert_eq!(parse_price("29.990").unwrap(), Decimal::new(29990, 3));
        assert!(parse_price("12345678901234.00").is_err());
        assert!(parse_price("10000000000").is_err());
        assert!(parse_price("9999999999.99").is_ok());

        let mut ticket = adult_ticket();
        ticket.price = "29.999".to_string();
        let errors = ticket.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn test_update_price_uses_the_same_limits() {
        let update = UpdateTicket {
            price: Some(Decimal::new(29999, 3)),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateTicket {
            price: Some(Decimal::from(10_000_000_000_i64)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_currency_must_be_three_letters() {
        let mut ticket = adult_ticket();
        ticket.currency = "EURO".to_string();
        assert!(ticket.validate().is_err());
        ticket.currency = "E1R".to_string();
        assert!(ticket.validate().is_err());
    }

    #[test]
    fn test_inverted_validity_window_is_rejected() {
        let mut ticket = adult_ticket();
        std::mem::swap(&mut ticket.validity_start, &mut ticket.validity_end);
        assert!(ticket.validate().is_err());
    }

    #[test]
    fn test_update_accepts_numeric_price() {
        let update: UpdateTicket =
            serde_json::from_value(serde_json::json!({ "price": 12.5, "currency": "usd" }))
                .unwrap();
        assert!(update.validate().is_ok());
        assert_eq!(update.price, Decimal::from_f64(12.5));
        assert_eq!(update.currency_code().as_deref(), Some("USD"));
    }

    #[test]
    fn test_update_rejects_empty_name_and_negative_price() {
        let update = UpdateTicket {
            name: Some(String::new()),
            price: Some(Decimal::new(-500, 2)),
            ..Default::default()
        };
        let errors = update.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
    }
}
