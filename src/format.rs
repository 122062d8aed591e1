//! Display formatting for amounts and timestamps.
//!
//! Everything here is a pure function of its inputs so the policies can be
//! tested without a terminal.
//!
//! Amount policy, identical on every list:
//! - empty or zero amounts render as `"0"`;
//! - the native asset and registered tokens are scaled by their configured
//!   decimal count and shown with six fractional digits plus the symbol;
//! - unregistered tokens are shown as raw base units with a `units` suffix,
//!   since their decimal count is unknown;
//! - integers too large for the decimal range are shown as raw base units
//!   with the `units` suffix;
//! - values that are not integers are shown unchanged.

use chrono::{DateTime, Local, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::assets::AssetRegistry;

/// Fractional digits shown for scaled amounts.
pub const DISPLAY_DECIMALS: u32 = 6;

/// Suffix for amounts whose decimals are unknown.
const RAW_UNITS_SUFFIX: &str = "units";

/// Output layout for timestamps.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats base-unit amounts using the decimals from an [`AssetRegistry`].
#[derive(Debug, Clone, Default)]
pub struct AmountFormatter {
    assets: AssetRegistry,
}

impl AmountFormatter {
    /// Creates a formatter backed by `assets`.
    pub fn new(assets: AssetRegistry) -> Self {
        Self { assets }
    }

    /// Returns the registry used for lookups.
    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    /// Formats `amount` (base units) for the asset identified by
    /// `token_address` (`None` for native).
    pub fn format(&self, amount: &str, token_address: Option<&str>) -> String {
        let amount = amount.trim();
        let Ok(units) = amount.parse::<i128>() else {
            if amount.bytes().all(|b| b == b'0') {
                return "0".to_string();
            }
            if amount.bytes().all(|b| b.is_ascii_digit()) {
                return format!("{amount} {RAW_UNITS_SUFFIX}");
            }
            return amount.to_string();
        };
        if units == 0 {
            return "0".to_string();
        }

        let (symbol, decimals) = match token_address {
            None => (self.assets.native().symbol.as_str(), self.assets.native().decimals),
            Some(address) => match self.assets.token(address) {
                Some(token) => (token.symbol.as_str(), token.decimals),
                None => return format!("{amount} {RAW_UNITS_SUFFIX}"),
            },
        };

        match scale_base_units(units, decimals) {
            Some(value) => format!("{value:.prec$} {symbol}", prec = DISPLAY_DECIMALS as usize),
            None => format!("{amount} {RAW_UNITS_SUFFIX}"),
        }
    }
}

/// Converts base units into a display value rounded to
/// [`DISPLAY_DECIMALS`] places, or `None` if it does not fit a [`Decimal`].
pub fn scale_base_units(units: i128, decimals: u32) -> Option<Decimal> {
    let value = Decimal::try_from_i128_with_scale(units, decimals).ok()?;
    Some(value.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero))
}

/// Renders a server timestamp in local time.
///
/// Offset-carrying RFC 3339 values are converted to the local zone; naive
/// values (the backend's default) are shown as sent. Anything unparseable
/// is returned verbatim.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive.format(TIMESTAMP_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Shortens a transaction hash to its first 20 characters.
pub fn short_hash(hash: &str) -> String {
    match hash.char_indices().nth(20) {
        Some((idx, _)) => format!("{}...", &hash[..idx]),
        None => hash.to_string(),
    }
}
