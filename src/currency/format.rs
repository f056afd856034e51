//! Locale-aware money formatting for the supported display locales

use super::find_currency;

/// Options for price formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Currency style when true, plain decimal otherwise
    pub show_symbol: bool,
    /// Fixed number of fraction digits; `None` picks 0 for amounts of 100
    /// and above, 2 below
    pub precision: Option<u8>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            show_symbol: true,
            precision: None,
        }
    }
}

impl FormatOptions {
    #[must_use]
    pub fn with_precision(precision: u8) -> Self {
        Self {
            precision: Some(precision),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn decimal() -> Self {
        Self {
            show_symbol: false,
            precision: None,
        }
    }

    fn fraction_digits(self, value: f64) -> usize {
        match self.precision {
            Some(precision) => usize::from(precision),
            None if value >= 100.0 => 0,
            None => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPlacement {
    Prefix,
    PrefixSpaced,
    SuffixSpaced,
}

#[derive(Debug, Clone, Copy)]
struct LocaleFormat {
    group: &'static str,
    decimal: &'static str,
    /// 3-digit group followed by 2-digit groups (lakh/crore)
    indian_grouping: bool,
    placement: SymbolPlacement,
    home_currency: &'static str,
    home_symbol: &'static str,
}

const NBSP: &str = "\u{a0}";

const EN_US: LocaleFormat = LocaleFormat {
    group: ",",
    decimal: ".",
    indian_grouping: false,
    placement: SymbolPlacement::Prefix,
    home_currency: "USD",
    home_symbol: "$",
};

fn locale_format(locale: &str) -> LocaleFormat {
    match locale {
        "de-DE" => LocaleFormat {
            group: ".",
            decimal: ",",
            placement: SymbolPlacement::SuffixSpaced,
            home_currency: "EUR",
            home_symbol: "€",
            ..EN_US
        },
        "en-GB" => LocaleFormat {
            home_currency: "GBP",
            home_symbol: "£",
            ..EN_US
        },
        "ja-JP" => LocaleFormat {
            home_currency: "JPY",
            home_symbol: "￥",
            ..EN_US
        },
        "en-AU" => LocaleFormat {
            home_currency: "AUD",
            ..EN_US
        },
        "en-CA" => LocaleFormat {
            home_currency: "CAD",
            ..EN_US
        },
        "de-CH" => LocaleFormat {
            group: "’",
            placement: SymbolPlacement::PrefixSpaced,
            home_currency: "CHF",
            home_symbol: "CHF",
            ..EN_US
        },
        "zh-CN" => LocaleFormat {
            home_currency: "CNY",
            home_symbol: "¥",
            ..EN_US
        },
        "en-IN" => LocaleFormat {
            indian_grouping: true,
            home_currency: "INR",
            home_symbol: "₹",
            ..EN_US
        },
        "en-SG" => LocaleFormat {
            home_currency: "SGD",
            ..EN_US
        },
        "en-US" => EN_US,
        other => {
            tracing::debug!("No format rules for locale '{}', using en-US", other);
            EN_US
        }
    }
}

fn group_digits(digits: &str, separator: &str, indian: bool) -> String {
    let len = digits.len();
    let mut boundaries = Vec::new();
    if len > 3 {
        let step = if indian { 2 } else { 3 };
        let mut end = len - 3;
        boundaries.push(end);
        while end > step {
            end -= step;
            boundaries.push(end);
        }
    }
    boundaries.reverse();

    let mut out = String::with_capacity(len + boundaries.len() * separator.len());
    let mut start = 0;
    for boundary in boundaries {
        out.push_str(&digits[start..boundary]);
        out.push_str(separator);
        start = boundary;
    }
    out.push_str(&digits[start..]);
    out
}

/// Format `value` in `currency_code` using the conventions of `locale`.
///
/// The fraction-digit choice is made on `value` itself, so callers pass the
/// already converted amount.
#[must_use]
pub fn format_amount(value: f64, currency_code: &str, locale: &str, options: FormatOptions) -> String {
    let rules = locale_format(locale);
    let digits = options.fraction_digits(value);

    let fixed = format!("{:.*}", digits, value.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };
    // Rounding can produce "-0"
    let negative = value.is_sign_negative() && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');

    let mut number = group_digits(integer, rules.group, rules.indian_grouping);
    if let Some(fraction) = fraction {
        number.push_str(rules.decimal);
        number.push_str(fraction);
    }

    let body = if options.show_symbol {
        let symbol = if currency_code == rules.home_currency {
            rules.home_symbol
        } else {
            find_currency(currency_code).map_or(currency_code, |c| c.symbol)
        };
        match rules.placement {
            SymbolPlacement::Prefix => format!("{symbol}{number}"),
            SymbolPlacement::PrefixSpaced => format!("{symbol}{NBSP}{number}"),
            SymbolPlacement::SuffixSpaced => format!("{number}{NBSP}{symbol}"),
        }
    } else {
        number
    };

    if negative { format!("-{body}") } else { body }
}

/// Format a USD amount with cents, e.g. `$1,234.50`.
#[must_use]
pub fn format_price_usd(price: f64) -> String {
    format_amount(price, "USD", "en-US", FormatOptions::with_precision(2))
}

/// Format an amount that is already in `currency_code`.
#[must_use]
pub fn format_price_with_currency(
    price: f64,
    currency_code: &str,
    locale: &str,
    options: FormatOptions,
) -> String {
    format_amount(price, currency_code, locale, options)
}
