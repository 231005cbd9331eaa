//! The boundary to the faucet and the ledger RPC server.

use super::models::{Account, SendTransactionResponse};
use thiserror::Error;

/// Coarse classification of a client failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Http,
    Rpc,
    NotFound,
    Rejected,
    Decode,
    /// User input failed local validation before anything was sent.
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("{0}")]
    Transport(String),
    #[error("HTTP {status}")]
    Http { status: u16, body: String },
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Transaction {status}{}", detail_suffix(.detail))]
    Rejected { status: String, detail: Option<String> },
    #[error("Malformed response: {0}")]
    Decode(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Http { .. } => ErrorKind::Http,
            ClientError::Rpc { .. } => ErrorKind::Rpc,
            ClientError::AccountNotFound(_) => ErrorKind::NotFound,
            ClientError::Rejected { .. } => ErrorKind::Rejected,
            ClientError::Decode(_) => ErrorKind::Decode,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// External calls made by the actions. Implementations must be usable from
/// worker threads.
pub trait LedgerClient: Send + Sync {
    /// Asks the faucet to fund `account_id`. Any 2xx response is success.
    fn fund(&self, account_id: &str) -> ClientResult<()>;

    fn get_account(&self, account_id: &str) -> ClientResult<Account>;

    /// Submits a base64 `TransactionEnvelope`. Statuses other than accepted
    /// ones come back as [`ClientError::Rejected`].
    fn send_transaction(&self, envelope_xdr: &str) -> ClientResult<SendTransactionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ClientError::Http { status: 500, body: String::new() }.to_string(),
            "HTTP 500"
        );
        assert_eq!(
            ClientError::Rejected { status: "ERROR".into(), detail: Some("AAAA".into()) }.to_string(),
            "Transaction ERROR: AAAA"
        );
        assert_eq!(
            ClientError::Rejected { status: "TRY_AGAIN_LATER".into(), detail: None }.to_string(),
            "Transaction TRY_AGAIN_LATER"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ClientError::Transport("x".into()).kind(), ErrorKind::Transport);
        assert_eq!(ClientError::AccountNotFound("G".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            ClientError::Rpc { code: -32600, message: "bad".into() }.kind(),
            ErrorKind::Rpc
        );
    }
}
