use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use super::ApiError;
use super::types::CardPayload;
use crate::constants::cards;
use crate::db::CardFields;
use crate::models::CardBrand;

static HOLDER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]+$").expect("valid holder name regex"));

static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})/(\d{2})$").expect("valid expiry regex"));

pub fn validate_id(resource: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {} ID: {}. ID must be a positive integer",
            resource, id
        )));
    }
    Ok(id)
}

/// Validates every card field and infers the brand from the number prefix.
/// The first offending field is named in the error.
pub fn validate_card_payload(payload: &CardPayload) -> Result<CardFields, ApiError> {
    validate_card_number(&payload.card_number)?;
    validate_holder_name(&payload.holder_name)?;
    validate_expiry(&payload.expiry)?;
    validate_cvv(&payload.cvv)?;

    Ok(CardFields {
        card_number: payload.card_number.clone(),
        holder_name: payload.holder_name.trim().to_string(),
        expiry: payload.expiry.clone(),
        cvv: payload.cvv.clone(),
        brand: CardBrand::from_number(&payload.card_number).map(|b| b.as_str().to_string()),
    })
}

fn validate_card_number(number: &str) -> Result<(), ApiError> {
    if !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation("card_number must contain digits only"));
    }
    if number.len() < cards::NUMBER_MIN_LEN || number.len() > cards::NUMBER_MAX_LEN {
        return Err(ApiError::validation(format!(
            "card_number must be {}-{} digits",
            cards::NUMBER_MIN_LEN,
            cards::NUMBER_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_holder_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() || !HOLDER_NAME_RE.is_match(name) {
        return Err(ApiError::validation(
            "holder_name must contain letters and spaces only",
        ));
    }
    Ok(())
}

/// MM/YY with a real month, not earlier than the current month.
fn validate_expiry(expiry: &str) -> Result<(), ApiError> {
    let captures = EXPIRY_RE
        .captures(expiry)
        .ok_or_else(|| ApiError::validation("expiry must match MM/YY"))?;

    let month: u32 = captures[1]
        .parse()
        .map_err(|_| ApiError::validation("expiry must match MM/YY"))?;
    let year: i32 = captures[2]
        .parse()
        .map_err(|_| ApiError::validation("expiry must match MM/YY"))?;

    if !(1..=12).contains(&month) {
        return Err(ApiError::validation("expiry month must be between 01 and 12"));
    }

    let now = chrono::Utc::now();
    let year = 2000 + year;
    if year < now.year() || (year == now.year() && month < now.month()) {
        return Err(ApiError::validation("expiry must not be in the past"));
    }

    Ok(())
}

fn validate_cvv(cvv: &str) -> Result<(), ApiError> {
    if !cvv.chars().all(|c| c.is_ascii_digit()) || !(3..=4).contains(&cvv.len()) {
        return Err(ApiError::validation("cvv must be 3-4 digits"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(number: &str, holder: &str, expiry: &str, cvv: &str) -> CardPayload {
        CardPayload {
            card_number: number.to_string(),
            holder_name: holder.to_string(),
            expiry: expiry.to_string(),
            cvv: cvv.to_string(),
        }
    }

    #[test]
    fn test_accepts_valid_card() {
        let fields =
            validate_card_payload(&payload("4111111111111111", "Jane Doe", "12/99", "123"))
                .expect("card should validate");
        assert_eq!(fields.brand.as_deref(), Some("visa"));
    }

    #[test]
    fn test_rejects_short_card_number() {
        assert!(validate_card_payload(&payload("123", "Jane Doe", "12/99", "123")).is_err());
    }

    #[test]
    fn test_rejects_non_digit_card_number() {
        assert!(
            validate_card_payload(&payload("4111a11111111111", "Jane Doe", "12/99", "123"))
                .is_err()
        );
    }

    #[test]
    fn test_rejects_invalid_month() {
        assert!(
            validate_card_payload(&payload("4111111111111111", "Jane Doe", "13/25", "123"))
                .is_err()
        );
    }

    #[test]
    fn test_rejects_past_expiry() {
        assert!(
            validate_card_payload(&payload("4111111111111111", "Jane Doe", "01/20", "123"))
                .is_err()
        );
    }

    #[test]
    fn test_rejects_short_cvv() {
        assert!(
            validate_card_payload(&payload("4111111111111111", "Jane Doe", "12/99", "12")).is_err()
        );
    }

    #[test]
    fn test_rejects_numeric_holder_name() {
        assert!(
            validate_card_payload(&payload("4111111111111111", "Jane D03", "12/99", "123"))
                .is_err()
        );
    }

    #[test]
    fn test_amex_cvv_length() {
        let fields = validate_card_payload(&payload("340000000000009", "Jane Doe", "12/99", "1234"))
            .expect("amex card should validate");
        assert_eq!(fields.brand.as_deref(), Some("amex"));
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("dish", 1).is_ok());
        assert!(validate_id("dish", 0).is_err());
        assert!(validate_id("dish", -3).is_err());
    }
}
