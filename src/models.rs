use serde::{Deserialize, Serialize};

/// Authorization role stored on a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Self::Customer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Complete,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    #[default]
    Card,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
        }
    }
}

/// Card network, derived from the leading digits of the card number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
}

impl CardBrand {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
        }
    }

    /// Infers the brand from the number prefix. Returns `None` for
    /// prefixes outside the four recognized networks.
    #[must_use]
    pub fn from_number(number: &str) -> Option<Self> {
        if number.starts_with('4') {
            return Some(Self::Visa);
        }
        if matches!(number.get(..2), Some("51" | "52" | "53" | "54" | "55")) {
            return Some(Self::Mastercard);
        }
        if matches!(number.get(..2), Some("34" | "37")) {
            return Some(Self::Amex);
        }
        if number.starts_with('6') {
            return Some(Self::Discover);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_from_number() {
        assert_eq!(
            CardBrand::from_number("4111111111111111"),
            Some(CardBrand::Visa)
        );
        assert_eq!(
            CardBrand::from_number("5500000000000004"),
            Some(CardBrand::Mastercard)
        );
        assert_eq!(
            CardBrand::from_number("340000000000009"),
            Some(CardBrand::Amex)
        );
        assert_eq!(
            CardBrand::from_number("6011000000000004"),
            Some(CardBrand::Discover)
        );
        assert_eq!(CardBrand::from_number("9999999999999"), None);
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("customer"), Some(Role::Customer));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn test_payment_method_default() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Card);
    }
}
