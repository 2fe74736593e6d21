// Steam Community Market response types.
// Defines the priceoverview payload and locale-formatted price parsing.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Response of the market priceoverview endpoint.
///
/// Prices arrive as locale-formatted strings like `"12,34 €"`; either field
/// may be missing even on a successful response.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceOverview {
    #[serde(default)]
    pub success: bool,
    pub lowest_price: Option<String>,
    pub median_price: Option<String>,
}

impl PriceOverview {
    /// The price string to use: lowest when present, median otherwise.
    pub fn price_field(&self) -> Option<&str> {
        self.lowest_price
            .as_deref()
            .or(self.median_price.as_deref())
    }
}

/// Parse a EUR-locale price string ("12,34 €") into a plain decimal.
///
/// Strips the currency symbol and any whitespace (including non-breaking
/// spaces), then swaps the comma decimal separator for a dot. Anything that
/// still fails to parse is reported as None.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let normalized: String = raw
        .chars()
        .filter(|c| *c != '€' && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    normalized.parse().ok()
}
