//! Wire and domain models for the custody backend REST API.
//!
//! Contains the chain/asset selection types shared by every address
//! request, the error body the backend returns on failure, and one
//! submodule per endpoint family.

pub mod address;
pub mod auth;
pub mod deposit;

use serde::{Deserialize, Serialize};

pub use address::{AddressResponse, DepositAddress, RefreshAddressRequest};
pub use auth::{LoginRequest, LoginResponse, RegisterRequest};
pub use deposit::{DepositRecord, DepositStatus};

/// Chains the backend issues deposit addresses on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    #[default]
    Sepolia,
    Mainnet,
}

impl Chain {
    /// All supported chains in selector order.
    pub const ALL: [Chain; 2] = [Chain::Sepolia, Chain::Mainnet];

    /// Returns the wire name expected by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Sepolia => "sepolia",
            Chain::Mainnet => "mainnet",
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Chain::Sepolia => "Sepolia",
            Chain::Mainnet => "Ethereum Mainnet",
        }
    }

    /// Returns the chain after this one, wrapping around.
    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

/// The (chain, asset) pair a deposit address is requested for.
///
/// `token` is `None` for the chain's native coin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub chain: Chain,
    pub token: Option<String>,
}

impl Selection {
    /// Creates a selection for the native asset on `chain`.
    pub fn native(chain: Chain) -> Self {
        Self { chain, token: None }
    }

    /// Returns the token address, or `""` for the native asset.
    ///
    /// The backend expects an empty `tokenAddress` query value rather than
    /// an omitted parameter.
    pub fn token_query(&self) -> &str {
        self.token.as_deref().unwrap_or("")
    }
}

/// Body returned by the backend alongside a 4xx status.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}
