use serde::Deserialize;

/// On-ledger state of an account, as much of it as transaction building
/// needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub account_id: String,
    pub sequence: i64,
}

/// Status reported by the RPC server for a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendStatus {
    Pending,
    Duplicate,
    TryAgainLater,
    Error,
}

impl SendStatus {
    /// Whether the server accepted the transaction for inclusion.
    pub fn is_accepted(self) -> bool {
        matches!(self, SendStatus::Pending | SendStatus::Duplicate)
    }
}

impl std::fmt::Display for SendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SendStatus::Pending => "PENDING",
            SendStatus::Duplicate => "DUPLICATE",
            SendStatus::TryAgainLater => "TRY_AGAIN_LATER",
            SendStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResponse {
    pub status: SendStatus,
    pub hash: String,
    #[serde(default)]
    pub error_result_xdr: Option<String>,
}
