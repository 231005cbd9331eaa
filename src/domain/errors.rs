use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Invalid asset code: {0}")]
    InvalidAssetCode(String),
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("{field} argument must be of type String, represent a positive number and have at most 7 digits after the decimal")]
    InvalidAmount { field: &'static str, value: String },
    #[error("Invalid liquidity pool ID: {0}")]
    InvalidPoolId(String),
    #[error("Assets are not in lexicographic order")]
    UnorderedAssets,
    #[error("Unsupported liquidity pool fee: {0}")]
    UnsupportedFee(i32),
    #[error("Transaction must contain at least one operation")]
    EmptyTransaction,
}

pub type DomainResult<T> = Result<T, DomainError>;
