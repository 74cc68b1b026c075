//! On-chain targets: chain prefixes, credential routing, and address validation.
//!
//! All validation here runs before the analyzer is invoked.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnChainError {
    #[error("Unsupported network prefix: {0}")]
    UnsupportedChain(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("API key must be specified if target is an onchain contract")]
    MissingCredential,
}

/// Chains the explorer-backed fetch supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Chain {
    Mainnet,
    Arbitrum,
    Polygon,
    Mumbai,
    Avalanche,
    Fantom,
    Bsc,
    Optimism,
}

/// Analyzer option receiving the API key for a given chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CredentialField {
    Etherscan,
    Arbiscan,
    Polygonscan,
    TestPolygonscan,
    Avax,
    Ftmscan,
    Bscan,
    Optim,
}

impl CredentialField {
    pub fn option_key(&self) -> &'static str {
        match self {
            CredentialField::Etherscan => "etherscan_api_key",
            CredentialField::Arbiscan => "arbiscan_api_key",
            CredentialField::Polygonscan => "polygonscan_api_key",
            CredentialField::TestPolygonscan => "test_polygonscan_api_key",
            CredentialField::Avax => "avax_api_key",
            CredentialField::Ftmscan => "ftmscan_api_key",
            CredentialField::Bscan => "bscan_api_key",
            CredentialField::Optim => "optim_api_key",
        }
    }
}

impl Chain {
    pub const ALL: [Chain; 8] = [
        Chain::Mainnet,
        Chain::Arbitrum,
        Chain::Polygon,
        Chain::Mumbai,
        Chain::Avalanche,
        Chain::Fantom,
        Chain::Bsc,
        Chain::Optimism,
    ];

    /// Prefix understood by the analyzer (`<prefix>:<address>`).
    pub fn prefix(&self) -> &'static str {
        match self {
            Chain::Mainnet => "mainet",
            Chain::Arbitrum => "arbi",
            Chain::Polygon => "poly",
            Chain::Mumbai => "mumbai",
            Chain::Avalanche => "avax",
            Chain::Fantom => "ftm",
            Chain::Bsc => "bsc",
            Chain::Optimism => "optim",
        }
    }

    pub fn credential_field(&self) -> CredentialField {
        match self {
            Chain::Mainnet => CredentialField::Etherscan,
            Chain::Arbitrum => CredentialField::Arbiscan,
            Chain::Polygon => CredentialField::Polygonscan,
            Chain::Mumbai => CredentialField::TestPolygonscan,
            Chain::Avalanche => CredentialField::Avax,
            Chain::Fantom => CredentialField::Ftmscan,
            Chain::Bsc => CredentialField::Bscan,
            Chain::Optimism => CredentialField::Optim,
        }
    }
}

impl FromStr for Chain {
    type Err = OnChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chain::ALL
            .into_iter()
            .find(|chain| chain.prefix() == s)
            .ok_or_else(|| OnChainError::UnsupportedChain(s.to_string()))
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A `0x`-prefixed, 20-byte hex contract address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContractAddress(String);

impl ContractAddress {
    pub fn parse(raw: &str) -> Result<Self, OnChainError> {
        if is_address(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(OnChainError::InvalidAddress(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `true` for `0x` followed by exactly 40 hex digits.
pub fn is_address(raw: &str) -> bool {
    match raw.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// A validated deployed-contract target.
#[derive(Clone, PartialEq, Eq)]
pub struct OnChainTarget {
    pub chain: Chain,
    pub address: ContractAddress,
    api_key: String,
}

impl fmt::Debug for OnChainTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnChainTarget")
            .field("chain", &self.chain)
            .field("address", &self.address)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OnChainTarget {
    /// Validate chain, address, and credential in that order.
    ///
    /// A missing or empty prefix selects mainnet.
    pub fn new(
        prefix: Option<&str>,
        address: &str,
        api_key: Option<&str>,
    ) -> Result<Self, OnChainError> {
        let chain = match prefix.map(str::trim) {
            None | Some("") => Chain::Mainnet,
            Some(p) => p.parse()?,
        };
        let address = ContractAddress::parse(address)?;
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(OnChainError::MissingCredential)?
            .to_string();
        Ok(Self { chain, address, api_key })
    }

    /// Target string handed to the analyzer.
    pub fn analyzer_target(&self) -> String {
        format!("{}:{}", self.chain.prefix(), self.address)
    }

    /// Analyzer options with the credential routed to the chain's field.
    ///
    /// User-supplied options are kept; the credential key always wins.
    pub fn analyzer_options(&self, extra: &Map<String, Value>) -> Map<String, Value> {
        let mut options = extra.clone();
        options.insert(
            self.chain.credential_field().option_key().to_string(),
            Value::String(self.api_key.clone()),
        );
        options
    }
}
