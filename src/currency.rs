//! The currencies a user can choose from and how money is displayed in each.

use maud::{Markup, html};
use numfmt::{Formatter, Precision};

/// A currency the user can select as their display preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    /// The ISO 4217 currency code, e.g. "USD".
    pub code: &'static str,
    /// The name shown in the settings form.
    pub name: &'static str,
    /// The symbol prefixed to amounts, e.g. "$".
    pub symbol: &'static str,
}

/// The supported currencies, in the order they are shown in the settings form.
pub const CURRENCIES: &[Currency] = &[
    Currency {
        code: "USD",
        name: "US Dollar",
        symbol: "$",
    },
    Currency {
        code: "EUR",
        name: "Euro",
        symbol: "€",
    },
    Currency {
        code: "GBP",
        name: "British Pound",
        symbol: "£",
    },
    Currency {
        code: "JPY",
        name: "Japanese Yen",
        symbol: "¥",
    },
    Currency {
        code: "AUD",
        name: "Australian Dollar",
        symbol: "A$",
    },
    Currency {
        code: "CAD",
        name: "Canadian Dollar",
        symbol: "C$",
    },
    Currency {
        code: "NZD",
        name: "New Zealand Dollar",
        symbol: "NZ$",
    },
    Currency {
        code: "PHP",
        name: "Philippine Peso",
        symbol: "₱",
    },
    Currency {
        code: "INR",
        name: "Indian Rupee",
        symbol: "₹",
    },
    Currency {
        code: "CNY",
        name: "Chinese Yuan",
        symbol: "¥",
    },
    Currency {
        code: "SGD",
        name: "Singapore Dollar",
        symbol: "S$",
    },
    Currency {
        code: "CHF",
        name: "Swiss Franc",
        symbol: "CHF ",
    },
];

/// The currency code used when a user has not chosen one.
pub const DEFAULT_CURRENCY_CODE: &str = "USD";

impl Currency {
    /// Find a supported currency by its code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Currency> {
        CURRENCIES
            .iter()
            .find(|currency| currency.code.eq_ignore_ascii_case(code.trim()))
            .copied()
    }

    /// Find a supported currency by its code, falling back to the default
    /// currency if the code is not supported.
    pub fn from_code_or_default(code: &str) -> Currency {
        Currency::from_code(code).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown currency code \"{code}\", falling back to {DEFAULT_CURRENCY_CODE}"
            );
            Currency::default()
        })
    }
}

impl Default for Currency {
    fn default() -> Self {
        CURRENCIES[0]
    }
}

/// Format `amount` with the currency symbol, thousands separators and two
/// decimal places, e.g. "$1,234.50" or "-€12.00".
pub fn format_currency(amount: f64, currency: &Currency) -> String {
    format_with_precision(amount, currency, 2)
}

/// Format `amount` rounded to the nearest whole number, e.g. "$1,235".
pub fn format_currency_rounded(amount: f64, currency: &Currency) -> String {
    format_with_precision(amount.round(), currency, 0)
}

/// Creates a span with `amount` rounded to the nearest whole number and a
/// tooltip (title) that shows `amount` rounded to two decimal places.
pub fn currency_rounded_with_tooltip(amount: f64, currency: &Currency) -> Markup {
    html!(
        span title=(format_currency(amount, currency)) {
            (format_currency_rounded(amount, currency))
        }
    )
}

fn format_with_precision(amount: f64, currency: &Currency, decimals: u8) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let prefix = format!("{sign}{}", currency.symbol);
    let magnitude = amount.abs();

    // numfmt renders zero as "0" regardless of the prefix.
    if magnitude == 0.0 {
        return pad_decimals(format!("{}0", currency.symbol), decimals);
    }

    let formatted = match Formatter::currency(&prefix) {
        Ok(formatter) => formatter
            .precision(Precision::Decimals(decimals))
            .fmt_string(magnitude),
        Err(error) => {
            tracing::warn!("Could not create currency formatter for \"{prefix}\": {error:?}");
            return format!("{prefix}{magnitude:.*}", decimals as usize);
        }
    };

    pad_decimals(formatted, decimals)
}

/// numfmt drops trailing zeros, e.g. "12.30" is rendered as "12.3", so put them back.
fn pad_decimals(formatted: String, decimals: u8) -> String {
    let decimals = decimals as usize;

    if decimals == 0 {
        return formatted;
    }

    match formatted.rfind('.') {
        None => format!("{formatted}.{}", "0".repeat(decimals)),
        Some(point) => {
            let written = formatted.len() - point - 1;

            if written < decimals {
                format!("{formatted}{}", "0".repeat(decimals - written))
            } else {
                formatted
            }
        }
    }
}
