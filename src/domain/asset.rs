//! Assets, liquidity pool parameters and pool id derivation.

use super::errors::{DomainError, DomainResult};
use super::keypair::decode_public_key;
use super::xdr::{XdrEncode, XdrWriter};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Fee tier for constant-product pools, in basis points. The ledger accepts
/// no other value.
pub const LIQUIDITY_POOL_FEE_V18: i32 = 30;

const ASSET_TYPE_NATIVE: i32 = 0;
const ASSET_TYPE_CREDIT_ALPHANUM4: i32 = 1;
const ASSET_TYPE_CREDIT_ALPHANUM12: i32 = 2;
const ASSET_TYPE_POOL_SHARE: i32 = 3;
const LIQUIDITY_POOL_CONSTANT_PRODUCT: i32 = 0;
const PUBLIC_KEY_TYPE_ED25519: i32 = 0;

/// Writes an `AccountID` (a `PublicKey` union holding an ed25519 key).
pub(crate) fn encode_account_id(w: &mut XdrWriter, key: &[u8; 32]) {
    w.write_i32(PUBLIC_KEY_TYPE_ED25519);
    w.write_fixed_opaque(key);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Native,
    CreditAlphanum4 { code: String, issuer: [u8; 32] },
    CreditAlphanum12 { code: String, issuer: [u8; 32] },
}

impl Asset {
    pub fn native() -> Self {
        Asset::Native
    }

    /// Builds an issued asset. Codes are 1-12 ASCII alphanumerics; up to four
    /// characters selects the short form.
    pub fn new(code: &str, issuer: &str) -> DomainResult<Self> {
        if code.is_empty() || code.len() > 12 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidAssetCode(code.to_string()));
        }
        let issuer = decode_public_key(issuer)?;
        if code.len() <= 4 {
            Ok(Asset::CreditAlphanum4 { code: code.to_string(), issuer })
        } else {
            Ok(Asset::CreditAlphanum12 { code: code.to_string(), issuer })
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Asset::Native => "XLM",
            Asset::CreditAlphanum4 { code, .. } | Asset::CreditAlphanum12 { code, .. } => code,
        }
    }

    pub fn issuer(&self) -> Option<String> {
        match self {
            Asset::Native => None,
            Asset::CreditAlphanum4 { issuer, .. } | Asset::CreditAlphanum12 { issuer, .. } => {
                Some(stellar_strkey::ed25519::PublicKey(*issuer).to_string())
            }
        }
    }

    fn type_code(&self) -> i32 {
        match self {
            Asset::Native => ASSET_TYPE_NATIVE,
            Asset::CreditAlphanum4 { .. } => ASSET_TYPE_CREDIT_ALPHANUM4,
            Asset::CreditAlphanum12 { .. } => ASSET_TYPE_CREDIT_ALPHANUM12,
        }
    }
}

impl Ord for Asset {
    /// Ledger ordering: by type, then code, then issuer account id.
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_code()
            .cmp(&other.type_code())
            .then_with(|| self.code().cmp(other.code()))
            .then_with(|| self.issuer().cmp(&other.issuer()))
    }
}

impl PartialOrd for Asset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issuer() {
            None => write!(f, "native"),
            Some(issuer) => write!(f, "{}:{}", self.code(), issuer),
        }
    }
}

impl XdrEncode for Asset {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.type_code());
        match self {
            Asset::Native => {}
            Asset::CreditAlphanum4 { code, issuer } => {
                let mut raw = [0u8; 4];
                raw[..code.len()].copy_from_slice(code.as_bytes());
                w.write_fixed_opaque(&raw);
                encode_account_id(w, issuer);
            }
            Asset::CreditAlphanum12 { code, issuer } => {
                let mut raw = [0u8; 12];
                raw[..code.len()].copy_from_slice(code.as_bytes());
                w.write_fixed_opaque(&raw);
                encode_account_id(w, issuer);
            }
        }
    }
}

/// The pool share asset of a constant-product pool over two assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityPoolAsset {
    pub asset_a: Asset,
    pub asset_b: Asset,
    pub fee: i32,
}

impl LiquidityPoolAsset {
    pub fn new(asset_a: Asset, asset_b: Asset, fee: i32) -> DomainResult<Self> {
        if asset_a >= asset_b {
            return Err(DomainError::UnorderedAssets);
        }
        if fee != LIQUIDITY_POOL_FEE_V18 {
            return Err(DomainError::UnsupportedFee(fee));
        }
        Ok(Self { asset_a, asset_b, fee })
    }

    /// `LiquidityPoolParameters` for the constant-product pool type.
    pub fn encode_parameters(&self, w: &mut XdrWriter) {
        w.write_i32(LIQUIDITY_POOL_CONSTANT_PRODUCT);
        self.asset_a.encode(w);
        self.asset_b.encode(w);
        w.write_i32(self.fee);
    }

    /// SHA-256 over the pool parameters.
    pub fn pool_id(&self) -> PoolId {
        let mut w = XdrWriter::new();
        self.encode_parameters(&mut w);
        PoolId(Sha256::digest(w.into_bytes()).into())
    }
}

impl XdrEncode for LiquidityPoolAsset {
    /// Encoded as a `ChangeTrustAsset` of the pool share type.
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(ASSET_TYPE_POOL_SHARE);
        self.encode_parameters(w);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(pub [u8; 32]);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for PoolId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidPoolId(s.to_string());
        let bytes = hex::decode(s.trim()).map_err(|_| invalid())?;
        let raw: [u8; 32] = bytes.try_into().map_err(|_| invalid())?;
        Ok(PoolId(raw))
    }
}

impl XdrEncode for PoolId {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_fixed_opaque(&self.0);
    }
}
