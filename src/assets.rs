//! Asset registry: display symbols and decimal counts per asset.
//!
//! Amounts travel in base units, so the console needs to know how many
//! decimals each asset has before it can show them. The native asset is
//! always known; ERC-20 style tokens are listed by contract address in a
//! JSON file:
//!
//! ```json
//! {
//!   "native": { "symbol": "ETH", "decimals": 18 },
//!   "tokens": [
//!     { "symbol": "USDC", "address": "0x1c7d...7238", "decimals": 6 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

/// Largest scale supported by the decimal type used for display.
pub const MAX_DECIMALS: u32 = 28;

/// Symbol and decimal count for the chain's native coin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NativeAsset {
    pub symbol: String,
    pub decimals: u32,
}

impl Default for NativeAsset {
    fn default() -> Self {
        Self {
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// A token contract the console knows how to display.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenAsset {
    pub symbol: String,
    /// Contract address, matched case-insensitively.
    pub address: String,
    pub decimals: u32,
}

/// Known assets, loaded from `TIDEWATCH_ASSETS` or defaulted to native ETH.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssetRegistry {
    #[serde(default)]
    native: NativeAsset,
    #[serde(default)]
    tokens: Vec<TokenAsset>,
}

impl AssetRegistry {
    /// Builds a registry from parts.
    pub fn new(native: NativeAsset, tokens: Vec<TokenAsset>) -> Self {
        Self { native, tokens }
    }

    /// Loads the registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an
    /// asset declares more decimals than can be displayed.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::TidewatchError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Parses the registry from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a decimal count exceeds
    /// [`MAX_DECIMALS`].
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let registry: Self = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> crate::Result<()> {
        let too_many = std::iter::once((self.native.symbol.as_str(), self.native.decimals))
            .chain(self.tokens.iter().map(|t| (t.symbol.as_str(), t.decimals)))
            .find(|(_, decimals)| *decimals > MAX_DECIMALS);
        if let Some((symbol, decimals)) = too_many {
            return Err(crate::TidewatchError::Config(format!(
                "{symbol} declares {decimals} decimals, at most {MAX_DECIMALS} are supported"
            )));
        }
        Ok(())
    }

    /// Returns the native asset.
    pub fn native(&self) -> &NativeAsset {
        &self.native
    }

    /// Returns all registered tokens in file order.
    pub fn tokens(&self) -> &[TokenAsset] {
        &self.tokens
    }

    /// Looks up a token by contract address.
    pub fn token(&self, address: &str) -> Option<&TokenAsset> {
        self.tokens
            .iter()
            .find(|t| t.address.eq_ignore_ascii_case(address))
    }

    /// Display label for a selection: the native symbol or the token symbol.
    pub fn label(&self, token_address: Option<&str>) -> String {
        match token_address {
            None => self.native.symbol.clone(),
            Some(address) => self
                .token(address)
                .map(|t| t.symbol.clone())
                .unwrap_or_else(|| "Token".to_string()),
        }
    }
}
