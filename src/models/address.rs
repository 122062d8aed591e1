//! Deposit address models.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Chain, Selection};

/// Prefix of the QR image the backend embeds as a data URI.
const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Body of `POST /api/deposit/refresh-address`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshAddressRequest<'a> {
    pub chain: Chain,
    /// `null` for the native asset.
    pub token_address: Option<&'a str>,
}

impl<'a> From<&'a Selection> for RefreshAddressRequest<'a> {
    fn from(selection: &'a Selection) -> Self {
        Self {
            chain: selection.chain,
            token_address: selection.token.as_deref(),
        }
    }
}

/// Address payload returned by the three address endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub address: String,
    #[serde(default)]
    pub chain: Option<Chain>,
    #[serde(default)]
    pub token_address: Option<String>,
    /// `data:image/png;base64,...` QR code of the address.
    #[serde(default)]
    pub qr_code_data: Option<String>,
}

/// The deposit address currently shown for a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositAddress {
    pub address: String,
    pub chain: Chain,
    /// `None` for the native asset.
    pub token_address: Option<String>,
    pub qr_code_data: Option<String>,
}

impl DepositAddress {
    /// Builds the domain address, filling fields the server left out from
    /// the selection that was requested.
    pub fn from_response(response: AddressResponse, selection: &Selection) -> Self {
        Self {
            address: response.address,
            chain: response.chain.unwrap_or(selection.chain),
            token_address: response
                .token_address
                .filter(|t| !t.is_empty())
                .or_else(|| selection.token.clone()),
            qr_code_data: response.qr_code_data.filter(|q| !q.is_empty()),
        }
    }

    /// Decodes the QR code into PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TidewatchError::Io`](crate::TidewatchError::Io) when the
    /// server sent no QR code or it is not a base64 PNG data URI.
    pub fn qr_png(&self) -> crate::Result<Vec<u8>> {
        let data = self
            .qr_code_data
            .as_deref()
            .ok_or_else(|| crate::TidewatchError::Io("no QR code for this address".into()))?;
        let encoded = data.strip_prefix(PNG_DATA_URI_PREFIX).ok_or_else(|| {
            crate::TidewatchError::Io("QR code is not a PNG data URI".into())
        })?;
        BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| crate::TidewatchError::Io(format!("invalid QR code data: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> AddressResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn fills_missing_fields_from_selection() {
        let selection = Selection {
            chain: Chain::Mainnet,
            token: Some("0xtoken".to_string()),
        };
        let address = DepositAddress::from_response(
            response(r#"{"address":"0x1234","qrCodeData":""}"#),
            &selection,
        );
        assert_eq!(address.chain, Chain::Mainnet);
        assert_eq!(address.token_address.as_deref(), Some("0xtoken"));
        assert!(address.qr_code_data.is_none());
    }

    #[test]
    fn server_fields_win_over_selection() {
        let address = DepositAddress::from_response(
            response(r#"{"address":"0x1234","chain":"sepolia","tokenAddress":"0xserver"}"#),
            &Selection::native(Chain::Mainnet),
        );
        assert_eq!(address.chain, Chain::Sepolia);
        assert_eq!(address.token_address.as_deref(), Some("0xserver"));
    }

    #[test]
    fn decodes_png_data_uri() {
        let png = [0x89, b'P', b'N', b'G'];
        let address = DepositAddress {
            address: "0x1".to_string(),
            chain: Chain::Sepolia,
            token_address: None,
            qr_code_data: Some(format!("{PNG_DATA_URI_PREFIX}{}", BASE64_STANDARD.encode(png))),
        };
        assert_eq!(address.qr_png().unwrap(), png);
    }

    #[test]
    fn rejects_non_png_qr_data() {
        let address = DepositAddress {
            address: "0x1".to_string(),
            chain: Chain::Sepolia,
            token_address: None,
            qr_code_data: Some("data:image/svg+xml;utf8,<svg/>".to_string()),
        };
        assert!(address.qr_png().is_err());
    }

    #[test]
    fn refresh_request_serializes_null_token_for_native() {
        let selection = Selection::native(Chain::Sepolia);
        let json = serde_json::to_value(RefreshAddressRequest::from(&selection)).unwrap();
        assert_eq!(json["chain"], "sepolia");
        assert!(json["tokenAddress"].is_null());
    }
}
