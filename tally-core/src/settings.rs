//! User preferences stored in the data blob, plus static-rate currency helpers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TallyError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    #[default]
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "dark")]
    Dark,
}

impl FromStr for Theme {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(TallyError::validation(format!("unknown theme '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "zh")]
    Chinese,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
            Language::Arabic => "ar",
            Language::Chinese => "zh",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Arabic)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::English),
            "fr" => Ok(Language::French),
            "ar" => Ok(Language::Arabic),
            "zh" => Ok(Language::Chinese),
            other => Err(TallyError::validation(format!("unsupported language '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// ISO 4217 code of the display/base currency
    pub currency: String,
    pub theme: Theme,
    pub language: Language,
    /// Units of `code` per one unit of `currency`. Static, user-maintained.
    pub exchange_rates: BTreeMap<String, f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            theme: Theme::default(),
            language: Language::default(),
            exchange_rates: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn set_currency(&mut self, code: &str) -> Result<(), TallyError> {
        self.currency = normalize_code(code)?;
        Ok(())
    }

    pub fn set_exchange_rate(&mut self, code: &str, rate: f64) -> Result<(), TallyError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(TallyError::validation(format!("exchange rate must be positive, got {rate}")));
        }
        self.exchange_rates.insert(normalize_code(code)?, rate);
        Ok(())
    }

    fn rate(&self, code: &str) -> Result<f64, TallyError> {
        let code = normalize_code(code)?;
        if code == self.currency {
            return Ok(1.0);
        }
        self.exchange_rates
            .get(&code)
            .copied()
            .ok_or_else(|| TallyError::validation(format!("no exchange rate configured for {code}")))
    }

    /// Convert through the base currency using the configured static rates.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, TallyError> {
        let base = amount / self.rate(from)?;
        Ok(base * self.rate(to)?)
    }
}

fn normalize_code(code: &str) -> Result<String, TallyError> {
    let c = code.trim().to_uppercase();
    if c.len() != 3 || !c.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(TallyError::validation(format!("invalid currency code '{code}'")));
    }
    Ok(c)
}

/// Two-decimal display form: `$12.50` for codes with a known symbol,
/// `7.00 CHF` otherwise.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();
    match currency_symbol(currency) {
        Some(sym) => format!("{sign}{sym}{abs:.2}"),
        None => format!("{sign}{abs:.2} {}", currency.to_uppercase()),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code.to_uppercase().as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" | "CNY" => Some("¥"),
        "SAR" => Some("﷼"),
        "INR" => Some("₹"),
        _ => None,
    }
}
