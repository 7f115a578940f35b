//! Money and currency value objects
//!
//! Amounts are `rust_decimal::Decimal` so planned amounts keep exact decimal
//! precision. Every `Money` carries its ISO-4217 currency, and arithmetic
//! between two amounts is only defined when the currencies agree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::BudgetError;

/// ISO-4217 alphabetic codes accepted as budget currencies
const RECOGNIZED_CURRENCIES: &[&str] = &[
    "AED", "ARS", "AUD", "BGN", "BRL", "BWP", "CAD", "CHF", "CLP", "CNY", "COP", "CZK", "DKK",
    "EGP", "EUR", "GBP", "GHS", "HKD", "HUF", "IDR", "ILS", "INR", "ISK", "JPY", "KES", "KRW",
    "LSL", "MAD", "MUR", "MXN", "MYR", "MZN", "NAD", "NGN", "NOK", "NZD", "PEN", "PHP", "PKR",
    "PLN", "RON", "RSD", "SAR", "SEK", "SGD", "SZL", "THB", "TRY", "TWD", "TZS", "UAH", "UGX",
    "USD", "VND", "XAF", "XOF", "ZAR", "ZMW",
];

/// A recognized ISO-4217 currency code, always upper case
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    /// Parse and validate a currency code (case-insensitive, surrounding
    /// whitespace ignored)
    pub fn parse(code: &str) -> Result<Self, BudgetError> {
        let upper = code.trim().to_ascii_uppercase();
        if !RECOGNIZED_CURRENCIES.contains(&upper.as_str()) {
            return Err(BudgetError::InvalidCurrency(code.trim().to_string()));
        }
        let bytes = upper.as_bytes();
        Ok(Self([bytes[0], bytes[1], bytes[2]]))
    }

    /// The three-letter code
    pub fn code(&self) -> &str {
        // Only constructed from ASCII entries of RECOGNIZED_CURRENCIES
        std::str::from_utf8(&self.0).unwrap_or("???")
    }

    /// Whether `code` is a recognized currency code
    pub fn is_recognized(code: &str) -> bool {
        RECOGNIZED_CURRENCIES.contains(&code.trim().to_ascii_uppercase().as_str())
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.code())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = BudgetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

/// A decimal amount in a specific currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Create a Money amount in an already validated currency
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a Money amount from a raw currency code
    pub fn of(amount: Decimal, currency_code: &str) -> Result<Self, BudgetError> {
        Ok(Self::new(amount, Currency::parse(currency_code)?))
    }

    /// Create a zero amount in the given currency
    pub const fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// The decimal amount
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    fn same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }

    /// Add two amounts of the same currency
    pub fn checked_add(&self, other: Money) -> Result<Money, MoneyError> {
        self.same_currency(&other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Subtract an amount of the same currency
    pub fn checked_sub(&self, other: Money) -> Result<Money, MoneyError> {
        self.same_currency(&other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Multiply two amounts of the same currency
    pub fn checked_mul(&self, other: Money) -> Result<Money, MoneyError> {
        self.same_currency(&other)?;
        let amount = self
            .amount
            .checked_mul(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Divide by an amount of the same currency
    pub fn checked_div(&self, other: Money) -> Result<Money, MoneyError> {
        self.same_currency(&other)?;
        if other.amount.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        let amount = self
            .amount
            .checked_div(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Multiply by a unit-less factor
    pub fn scale(&self, factor: Decimal) -> Result<Money, MoneyError> {
        let amount = self.amount.checked_mul(factor).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Compare two amounts, failing when the currencies differ
    pub fn try_cmp(&self, other: &Money) -> Result<Ordering, MoneyError> {
        self.same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// Sum amounts that must all be in `currency`
    pub fn sum_in<I>(currency: Currency, amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }

    /// Parse an amount from user input
    ///
    /// Accepts "500", "500.25", "ZAR 500" or "500 ZAR". A bare number is
    /// interpreted in `default_currency`.
    pub fn parse(s: &str, default_currency: Currency) -> Result<Money, MoneyParseError> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let (number, currency) = match parts.as_slice() {
            [number] => (*number, default_currency),
            [a, b] if Currency::is_recognized(a) => (*b, parse_code(a)?),
            [a, b] if Currency::is_recognized(b) => (*a, parse_code(b)?),
            _ => return Err(MoneyParseError::InvalidFormat(s.trim().to_string())),
        };

        let amount = Decimal::from_str(number)
            .map_err(|_| MoneyParseError::InvalidFormat(s.trim().to_string()))?;
        Ok(Money::new(amount, currency))
    }
}

fn parse_code(code: &str) -> Result<Currency, MoneyParseError> {
    Currency::parse(code).map_err(|_| MoneyParseError::UnknownCurrency(code.to_string()))
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}

/// Arithmetic failure between two amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyError {
    CurrencyMismatch { left: Currency, right: Currency },
    DivisionByZero,
    Overflow,
}

impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyError::CurrencyMismatch { left, right } => {
                write!(f, "Currency mismatch: {} vs {}", left, right)
            }
            MoneyError::DivisionByZero => write!(f, "Division by zero"),
            MoneyError::Overflow => write!(f, "Amount out of range"),
        }
    }
}

impl std::error::Error for MoneyError {}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    UnknownCurrency(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::UnknownCurrency(s) => write!(f, "Unrecognized currency code: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn zar() -> Currency {
        Currency::parse("ZAR").unwrap()
    }

    fn usd() -> Currency {
        Currency::parse("USD").unwrap()
    }

    fn money(amount: i64, currency: Currency) -> Money {
        Money::new(Decimal::new(amount, 0), currency)
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("zar").unwrap().code(), "ZAR");
        assert_eq!(Currency::parse(" EUR ").unwrap().code(), "EUR");
        assert_eq!(
            Currency::parse("ABC"),
            Err(BudgetError::InvalidCurrency("ABC".into()))
        );
        assert!(Currency::parse("").is_err());
        assert!(Currency::parse("EURO").is_err());
    }

    #[test]
    fn test_currency_serialization() {
        let json = serde_json::to_string(&zar()).unwrap();
        assert_eq!(json, "\"ZAR\"");
        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, zar());
        assert!(serde_json::from_str::<Currency>("\"QQQ\"").is_err());
    }

    #[test]
    fn test_arithmetic_same_currency() {
        let a = money(500, zar());
        let b = money(200, zar());

        assert_eq!(a.checked_add(b).unwrap(), money(700, zar()));
        assert_eq!(a.checked_sub(b).unwrap(), money(300, zar()));
        assert_eq!(a.checked_mul(b).unwrap(), money(100_000, zar()));
        assert_eq!(
            a.checked_div(b).unwrap().amount(),
            Decimal::new(25, 1)
        );
    }

    #[test]
    fn test_arithmetic_currency_mismatch() {
        let a = money(500, zar());
        let b = money(200, usd());

        let expected = MoneyError::CurrencyMismatch {
            left: zar(),
            right: usd(),
        };
        assert_eq!(a.checked_add(b), Err(expected));
        assert_eq!(a.checked_sub(b), Err(expected));
        assert_eq!(a.checked_mul(b), Err(expected));
        assert_eq!(a.checked_div(b), Err(expected));
    }

    #[test]
    fn test_division_by_zero() {
        let a = money(500, zar());
        assert_eq!(
            a.checked_div(Money::zero(zar())),
            Err(MoneyError::DivisionByZero)
        );
    }

    #[test]
    fn test_ordering_only_within_currency() {
        let a = money(500, zar());
        let b = money(200, zar());
        let c = money(200, usd());

        assert!(a > b);
        assert_eq!(a.partial_cmp(&c), None);
        assert!(a.try_cmp(&c).is_err());
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero(zar()).is_zero());
        assert!(!Money::zero(zar()).is_negative());
        assert!(money(-1, zar()).is_negative());
        assert!(money(1, zar()).is_positive());
    }

    #[test]
    fn test_sum_in() {
        let total = Money::sum_in(zar(), vec![money(100, zar()), money(250, zar())]).unwrap();
        assert_eq!(total, money(350, zar()));

        let empty = Money::sum_in(zar(), Vec::new()).unwrap();
        assert!(empty.is_zero());

        assert!(Money::sum_in(zar(), vec![money(1, usd())]).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("500", zar()).unwrap(), money(500, zar()));
        assert_eq!(
            Money::parse("12.50", zar()).unwrap().amount(),
            Decimal::new(1250, 2)
        );
        assert_eq!(Money::parse("USD 20", zar()).unwrap(), money(20, usd()));
        assert_eq!(Money::parse("20 usd", zar()).unwrap(), money(20, usd()));
        assert!(matches!(
            Money::parse("abc", zar()),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(Money::parse("20 QQQ", zar()).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(money(500, zar()).to_string(), "ZAR 500.00");
        assert_eq!(
            Money::new(Decimal::new(1234, 2), usd()).to_string(),
            "USD 12.34"
        );
    }

    #[test]
    fn test_serialization() {
        let m = Money::new(Decimal::new(1050, 2), zar());
        let json = serde_json::to_string(&m).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
