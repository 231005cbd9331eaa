//! Transaction construction, hashing and signing.
//!
//! Covers the v1 transaction envelope with a single source account, a time
//! bound precondition, no memo and the three liquidity pool operations this
//! client submits.

use super::amount::Price;
use super::asset::{LiquidityPoolAsset, PoolId};
use super::errors::{DomainError, DomainResult};
use super::keypair::{decode_public_key, Keypair};
use super::models::Account;
use super::xdr::{XdrEncode, XdrWriter};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// Minimum fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
/// Default trust line limit: the largest representable amount.
pub const MAX_TRUST_LIMIT: i64 = i64::MAX;

const KEY_TYPE_ED25519: i32 = 0;
const PRECOND_TIME: i32 = 1;
const MEMO_NONE: i32 = 0;
const ENVELOPE_TYPE_TX: i32 = 2;

const OP_CHANGE_TRUST: i32 = 6;
const OP_LIQUIDITY_POOL_DEPOSIT: i32 = 22;
const OP_LIQUIDITY_POOL_WITHDRAW: i32 = 23;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ChangeTrust {
        line: LiquidityPoolAsset,
        limit: i64,
    },
    LiquidityPoolDeposit {
        pool_id: PoolId,
        max_amount_a: i64,
        max_amount_b: i64,
        min_price: Price,
        max_price: Price,
    },
    LiquidityPoolWithdraw {
        pool_id: PoolId,
        amount: i64,
        min_amount_a: i64,
        min_amount_b: i64,
    },
}

impl Operation {
    pub fn change_trust(line: LiquidityPoolAsset) -> Self {
        Operation::ChangeTrust {
            line,
            limit: MAX_TRUST_LIMIT,
        }
    }
}

impl XdrEncode for Operation {
    fn encode(&self, w: &mut XdrWriter) {
        // no per-operation source account
        w.write_bool(false);
        match self {
            Operation::ChangeTrust { line, limit } => {
                w.write_i32(OP_CHANGE_TRUST);
                line.encode(w);
                w.write_i64(*limit);
            }
            Operation::LiquidityPoolDeposit {
                pool_id,
                max_amount_a,
                max_amount_b,
                min_price,
                max_price,
            } => {
                w.write_i32(OP_LIQUIDITY_POOL_DEPOSIT);
                pool_id.encode(w);
                w.write_i64(*max_amount_a);
                w.write_i64(*max_amount_b);
                min_price.encode(w);
                max_price.encode(w);
            }
            Operation::LiquidityPoolWithdraw {
                pool_id,
                amount,
                min_amount_a,
                min_amount_b,
            } => {
                w.write_i32(OP_LIQUIDITY_POOL_WITHDRAW);
                pool_id.encode(w);
                w.write_i64(*amount);
                w.write_i64(*min_amount_a);
                w.write_i64(*min_amount_b);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub source: [u8; 32],
    pub fee: u32,
    pub sequence: i64,
    pub time_bounds: TimeBounds,
    pub operations: Vec<Operation>,
}

impl XdrEncode for Transaction {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(KEY_TYPE_ED25519);
        w.write_fixed_opaque(&self.source);
        w.write_u32(self.fee);
        w.write_i64(self.sequence);
        w.write_i32(PRECOND_TIME);
        w.write_u64(self.time_bounds.min_time);
        w.write_u64(self.time_bounds.max_time);
        w.write_i32(MEMO_NONE);
        w.write_array(&self.operations);
        // ext: v0
        w.write_i32(0);
    }
}

/// SHA-256 of the network passphrase.
pub fn network_id(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

impl Transaction {
    /// Hash over the signature payload: network id, envelope type, and the
    /// transaction body.
    pub fn hash(&self, passphrase: &str) -> [u8; 32] {
        let mut w = XdrWriter::new();
        w.write_fixed_opaque(&network_id(passphrase));
        w.write_i32(ENVELOPE_TYPE_TX);
        self.encode(&mut w);
        Sha256::digest(w.into_bytes()).into()
    }

    pub fn sign(self, keypair: &Keypair, passphrase: &str) -> TransactionEnvelope {
        let hash = self.hash(passphrase);
        let signature = DecoratedSignature {
            hint: keypair.signature_hint(),
            signature: keypair.sign(&hash),
        };
        TransactionEnvelope {
            tx: self,
            signatures: vec![signature],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: [u8; 64],
}

impl XdrEncode for DecoratedSignature {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_fixed_opaque(&self.hint);
        w.write_var_opaque(&self.signature);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEnvelope {
    pub tx: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl XdrEncode for TransactionEnvelope {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(ENVELOPE_TYPE_TX);
        self.tx.encode(w);
        w.write_array(&self.signatures);
    }
}

impl TransactionEnvelope {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_xdr())
    }
}

/// Accumulates operations against a source account's current sequence.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    source: [u8; 32],
    sequence: i64,
    base_fee: u32,
    timeout_secs: u64,
    operations: Vec<Operation>,
}

impl TransactionBuilder {
    pub fn new(account: &Account, base_fee: u32) -> DomainResult<Self> {
        Ok(Self {
            source: decode_public_key(&account.account_id)?,
            sequence: account.sequence,
            base_fee,
            timeout_secs: 0,
            operations: Vec::new(),
        })
    }

    pub fn add_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Validity window in seconds from build time; zero means no upper bound.
    pub fn set_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Builds the transaction using the next sequence number. The total fee
    /// is the base fee times the operation count.
    pub fn build(self, now_unix: u64) -> DomainResult<Transaction> {
        if self.operations.is_empty() {
            return Err(DomainError::EmptyTransaction);
        }
        let max_time = if self.timeout_secs == 0 {
            0
        } else {
            now_unix + self.timeout_secs
        };
        Ok(Transaction {
            source: self.source,
            fee: self.base_fee.saturating_mul(self.operations.len() as u32),
            sequence: self.sequence + 1,
            time_bounds: TimeBounds { min_time: 0, max_time },
            operations: self.operations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Asset, LIQUIDITY_POOL_FEE_V18};
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    fn setup() -> (Keypair, Account, LiquidityPoolAsset) {
        let kp = Keypair::random();
        let account = Account {
            account_id: kp.public_key(),
            sequence: 41,
        };
        let custom = Asset::new("ABC", &kp.public_key()).unwrap();
        let lp = LiquidityPoolAsset::new(Asset::native(), custom, LIQUIDITY_POOL_FEE_V18).unwrap();
        (kp, account, lp)
    }

    fn deposit(pool_id: PoolId) -> Operation {
        Operation::LiquidityPoolDeposit {
            pool_id,
            max_amount_a: 1_000_000_000,
            max_amount_b: 500_000_000,
            min_price: Price::ONE,
            max_price: Price::ONE,
        }
    }

    #[test]
    fn test_build_uses_next_sequence_and_fee_per_op() {
        let (_, account, lp) = setup();
        let pool_id = lp.pool_id();
        let tx = TransactionBuilder::new(&account, BASE_FEE)
            .unwrap()
            .add_operation(Operation::change_trust(lp))
            .add_operation(deposit(pool_id))
            .set_timeout(30)
            .build(1_000)
            .unwrap();

        assert_eq!(tx.sequence, 42);
        assert_eq!(tx.fee, 200);
        assert_eq!(tx.time_bounds, TimeBounds { min_time: 0, max_time: 1_030 });
        assert_eq!(tx.operations.len(), 2);
    }

    #[test]
    fn test_build_rejects_empty() {
        let (_, account, _) = setup();
        let result = TransactionBuilder::new(&account, BASE_FEE).unwrap().build(0);
        assert_eq!(result, Err(DomainError::EmptyTransaction));
    }

    #[test]
    fn test_signature_covers_hash() {
        let (kp, account, lp) = setup();
        let tx = TransactionBuilder::new(&account, BASE_FEE)
            .unwrap()
            .add_operation(Operation::LiquidityPoolWithdraw {
                pool_id: lp.pool_id(),
                amount: 10,
                min_amount_a: 0,
                min_amount_b: 0,
            })
            .set_timeout(30)
            .build(0)
            .unwrap();
        let hash = tx.hash(TESTNET_PASSPHRASE);
        let envelope = tx.sign(&kp, TESTNET_PASSPHRASE);

        assert_eq!(envelope.signatures.len(), 1);
        let sig = &envelope.signatures[0];
        assert_eq!(sig.hint, kp.signature_hint());
        let vk = VerifyingKey::from_bytes(&kp.public_key_bytes()).unwrap();
        assert!(vk.verify(&hash, &Signature::from_bytes(&sig.signature)).is_ok());
    }

    #[test]
    fn test_hash_depends_on_network() {
        let (_, account, lp) = setup();
        let tx = TransactionBuilder::new(&account, BASE_FEE)
            .unwrap()
            .add_operation(Operation::change_trust(lp))
            .build(0)
            .unwrap();
        assert_ne!(
            tx.hash(TESTNET_PASSPHRASE),
            tx.hash("Public Global Stellar Network ; September 2015")
        );
    }

    #[test]
    fn test_envelope_matches_ledger_definitions() {
        use stellar_xdr::curr as ledger;
        use stellar_xdr::curr::{Limits, ReadXdr, WriteXdr};

        let (kp, account, lp) = setup();
        let pool_id = lp.pool_id();
        let tx = TransactionBuilder::new(&account, BASE_FEE)
            .unwrap()
            .add_operation(Operation::change_trust(lp))
            .add_operation(deposit(pool_id))
            .add_operation(Operation::LiquidityPoolWithdraw {
                pool_id,
                amount: 10,
                min_amount_a: 0,
                min_amount_b: 0,
            })
            .set_timeout(30)
            .build(1_000)
            .unwrap();
        let hash = tx.hash(TESTNET_PASSPHRASE);
        let ours = tx.sign(&kp, TESTNET_PASSPHRASE).to_xdr();

        let decoded = ledger::TransactionEnvelope::from_xdr(&ours, Limits::none()).unwrap();
        assert_eq!(decoded.to_xdr(Limits::none()).unwrap(), ours);
        let ledger::TransactionEnvelope::Tx(envelope) = decoded else {
            panic!("expected a v1 envelope");
        };

        let tx = &envelope.tx;
        assert_eq!(tx.fee, 300);
        assert_eq!(tx.seq_num, ledger::SequenceNumber(42));
        assert_eq!(
            tx.cond,
            ledger::Preconditions::Time(ledger::TimeBounds {
                min_time: ledger::TimePoint(0),
                max_time: ledger::TimePoint(1_030),
            })
        );
        assert_eq!(tx.memo, ledger::Memo::None);
        assert!(matches!(tx.operations[0].body, ledger::OperationBody::ChangeTrust(_)));
        assert!(matches!(tx.operations[1].body, ledger::OperationBody::LiquidityPoolDeposit(_)));
        assert!(matches!(tx.operations[2].body, ledger::OperationBody::LiquidityPoolWithdraw(_)));

        let payload = ledger::TransactionSignaturePayload {
            network_id: ledger::Hash(network_id(TESTNET_PASSPHRASE)),
            tagged_transaction: ledger::TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
        };
        let expected: [u8; 32] = Sha256::digest(payload.to_xdr(Limits::none()).unwrap()).into();
        assert_eq!(hash, expected);
        assert_eq!(envelope.signatures[0].hint.0, kp.signature_hint());
    }

    #[test]
    fn test_envelope_layout() {
        let (kp, account, lp) = setup();
        let pool_id = lp.pool_id();
        let envelope = TransactionBuilder::new(&account, BASE_FEE)
            .unwrap()
            .add_operation(deposit(pool_id))
            .set_timeout(30)
            .build(0)
            .unwrap()
            .sign(&kp, TESTNET_PASSPHRASE);

        let bytes = STANDARD.decode(envelope.to_base64()).unwrap();
        assert_eq!(&bytes[0..4], &ENVELOPE_TYPE_TX.to_be_bytes());
        assert_eq!(&bytes[8..40], &kp.public_key_bytes());
        // one signature: count, hint, length-prefixed 64 bytes
        let tail = &bytes[bytes.len() - (4 + 4 + 4 + 64)..];
        assert_eq!(&tail[0..4], &1u32.to_be_bytes());
        assert_eq!(&tail[8..12], &64u32.to_be_bytes());
        assert_eq!(bytes.len() % 4, 0);
    }
}
