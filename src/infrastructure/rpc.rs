//! HTTP implementation of [`LedgerClient`]: the faucet over plain GET and the
//! ledger over JSON-RPC 2.0.

use crate::domain::asset::encode_account_id;
use crate::domain::xdr::{read_i32_at, read_i64_at, XdrWriter};
use crate::domain::{
    decode_public_key, Account, ClientError, ClientResult, LedgerClient,
    SendTransactionResponse,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const LEDGER_ENTRY_TYPE_ACCOUNT: i32 = 0;
// LedgerEntryData: type(4) + account id(4 + 32) + balance(8), then seqNum.
const ACCOUNT_SEQ_OFFSET: usize = 48;

pub struct HttpLedgerClient {
    http: Client,
    rpc_url: String,
    faucet_url: String,
    next_id: AtomicU64,
}

impl HttpLedgerClient {
    pub fn new(rpc_url: impl Into<String>, faucet_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            rpc_url: rpc_url.into(),
            faucet_url: faucet_url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> ClientResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "rpc request");

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Http { status: status.as_u16(), body });
        }

        let envelope: RpcEnvelope<T> = response
            .json()
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        envelope.into_result()
    }
}

impl LedgerClient for HttpLedgerClient {
    fn fund(&self, account_id: &str) -> ClientResult<()> {
        let response = self
            .http
            .get(&self.faucet_url)
            .query(&[("addr", account_id)])
            .send()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().unwrap_or_default();
            Err(ClientError::Http { status: status.as_u16(), body })
        }
    }

    fn get_account(&self, account_id: &str) -> ClientResult<Account> {
        let key = account_ledger_key(account_id)?;
        let result: LedgerEntriesResult =
            self.call("getLedgerEntries", json!({ "keys": [key] }))?;
        let entry = result
            .entries
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::AccountNotFound(account_id.to_string()))?;
        decode_account_entry(account_id, &entry.xdr)
    }

    fn send_transaction(&self, envelope_xdr: &str) -> ClientResult<SendTransactionResponse> {
        let response: SendTransactionResponse =
            self.call("sendTransaction", json!({ "transaction": envelope_xdr }))?;
        check_send_response(response)
    }
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

impl<T> RpcEnvelope<T> {
    fn into_result(self) -> ClientResult<T> {
        match (self.result, self.error) {
            (_, Some(err)) => Err(ClientError::Rpc { code: err.code, message: err.message }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(ClientError::Decode("response has neither result nor error".into())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LedgerEntry {
    xdr: String,
}

#[derive(Debug, Deserialize)]
struct LedgerEntriesResult {
    #[serde(default)]
    entries: Option<Vec<LedgerEntry>>,
}

/// Base64 `LedgerKey` selecting the account entry of `account_id`.
pub fn account_ledger_key(account_id: &str) -> ClientResult<String> {
    let key = decode_public_key(account_id).map_err(|e| ClientError::Decode(e.to_string()))?;
    let mut w = XdrWriter::new();
    w.write_i32(LEDGER_ENTRY_TYPE_ACCOUNT);
    encode_account_id(&mut w, &key);
    Ok(STANDARD.encode(w.into_bytes()))
}

/// Pulls the sequence number out of a base64 `LedgerEntryData` account entry.
pub fn decode_account_entry(account_id: &str, xdr: &str) -> ClientResult<Account> {
    let bytes = STANDARD
        .decode(xdr.trim())
        .map_err(|e| ClientError::Decode(format!("ledger entry is not base64: {e}")))?;

    match read_i32_at(&bytes, 0) {
        Some(LEDGER_ENTRY_TYPE_ACCOUNT) => {}
        Some(other) => {
            return Err(ClientError::Decode(format!("expected account entry, got type {other}")));
        }
        None => return Err(ClientError::Decode("empty ledger entry".into())),
    }

    let sequence = read_i64_at(&bytes, ACCOUNT_SEQ_OFFSET)
        .ok_or_else(|| ClientError::Decode("account entry too short".into()))?;
    Ok(Account {
        account_id: account_id.to_string(),
        sequence,
    })
}

/// Turns non-accepted submission statuses into errors.
pub fn check_send_response(response: SendTransactionResponse) -> ClientResult<SendTransactionResponse> {
    if response.status.is_accepted() {
        Ok(response)
    } else {
        Err(ClientError::Rejected {
            status: response.status.to_string(),
            detail: response.error_result_xdr,
        })
    }
}
