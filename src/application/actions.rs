//! The four user actions.
//!
//! Each button press is split in two halves. The request half runs on the UI
//! thread: it checks preconditions, sets the action's loading flag and hands
//! back a [`LedgerJob`]. The job performs the network calls wherever it is
//! run and yields an [`ActionOutcome`], which [`App::complete`] folds back
//! into state, clearing the flag.

use super::notifications::Level;
use super::state::App;
use crate::domain::{
    parse_amount, Asset, ClientError, DomainError, ErrorKind, Keypair, LedgerClient,
    LiquidityPoolAsset, Operation, PoolId, Price, TransactionBuilder, LIQUIDITY_POOL_FEE_V18,
};
use crate::infrastructure::Job;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{info, warn};

pub const MISSING_KEYPAIR: &str = "Please generate a keypair first.";
pub const MISSING_POOL_INPUTS: &str = "Please ensure you have a keypair, asset name, and token amounts.";
pub const MISSING_WITHDRAW_INPUTS: &str =
    "Please ensure you have a keypair, liquidity pool ID, and withdrawal amount.";
pub const LEDGER_BUSY: &str = "A ledger transaction is already in flight; wait for it to finish.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GenerateKeypair,
    FundAccount,
    CreateLiquidityPool,
    WithdrawFromPool,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::GenerateKeypair,
        Action::FundAccount,
        Action::CreateLiquidityPool,
        Action::WithdrawFromPool,
    ];

    /// Whether the action submits a transaction from the session account.
    pub fn mutates_ledger(self) -> bool {
        matches!(self, Action::CreateLiquidityPool | Action::WithdrawFromPool)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::Client(e) => e.kind(),
            ActionError::Domain(_) => ErrorKind::Invalid,
        }
    }
}

/// Network parameters copied into each transaction job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxParams {
    pub network_passphrase: String,
    pub base_fee: u32,
    pub timeout_secs: u64,
}

/// Deferred external work for one action invocation.
#[derive(Debug, Clone)]
pub enum LedgerJob {
    Fund {
        account_id: String,
    },
    CreatePool {
        keypair: Keypair,
        asset_name: String,
        amount_a: String,
        amount_b: String,
        params: TxParams,
    },
    Withdraw {
        keypair: Keypair,
        pool_id: String,
        amount: String,
        params: TxParams,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Funded {
        account_id: String,
        result: Result<(), ClientError>,
    },
    /// `pool_id` is set once the pool id was derived, even when the
    /// submission that followed failed.
    PoolCreated {
        pool_id: Option<PoolId>,
        result: Result<String, ActionError>,
    },
    Withdrawn {
        result: Result<String, ActionError>,
    },
    /// The job never produced a result of its own.
    Aborted {
        action: Action,
        reason: String,
    },
}

impl ActionOutcome {
    pub fn action(&self) -> Action {
        match self {
            ActionOutcome::Funded { .. } => Action::FundAccount,
            ActionOutcome::PoolCreated { .. } => Action::CreateLiquidityPool,
            ActionOutcome::Withdrawn { .. } => Action::WithdrawFromPool,
            ActionOutcome::Aborted { action, .. } => *action,
        }
    }
}

impl Job for LedgerJob {
    type Output = ActionOutcome;
    type Ticket = Action;

    fn ticket(&self) -> Action {
        match self {
            LedgerJob::Fund { .. } => Action::FundAccount,
            LedgerJob::CreatePool { .. } => Action::CreateLiquidityPool,
            LedgerJob::Withdraw { .. } => Action::WithdrawFromPool,
        }
    }

    fn run(self, client: &dyn LedgerClient) -> ActionOutcome {
        match self {
            LedgerJob::Fund { account_id } => {
                let result = client.fund(&account_id);
                ActionOutcome::Funded { account_id, result }
            }
            LedgerJob::CreatePool {
                keypair,
                asset_name,
                amount_a,
                amount_b,
                params,
            } => {
                let (pool_id, result) =
                    create_pool(client, &keypair, &asset_name, &amount_a, &amount_b, &params);
                ActionOutcome::PoolCreated { pool_id, result }
            }
            LedgerJob::Withdraw {
                keypair,
                pool_id,
                amount,
                params,
            } => ActionOutcome::Withdrawn {
                result: withdraw(client, &keypair, &pool_id, &amount, &params),
            },
        }
    }

    fn aborted(action: Action, reason: String) -> ActionOutcome {
        ActionOutcome::Aborted { action, reason }
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Pool share asset pairing XLM with `asset_name` issued by `issuer`.
pub fn pool_asset_for(asset_name: &str, issuer: &str) -> Result<LiquidityPoolAsset, DomainError> {
    let custom = Asset::new(asset_name, issuer)?;
    LiquidityPoolAsset::new(Asset::native(), custom, LIQUIDITY_POOL_FEE_V18)
}

fn create_pool(
    client: &dyn LedgerClient,
    keypair: &Keypair,
    asset_name: &str,
    amount_a: &str,
    amount_b: &str,
    params: &TxParams,
) -> (Option<PoolId>, Result<String, ActionError>) {
    let public_key = keypair.public_key();
    let account = match client.get_account(&public_key) {
        Ok(account) => account,
        Err(e) => return (None, Err(e.into())),
    };
    let pool_asset = match pool_asset_for(asset_name, &public_key) {
        Ok(asset) => asset,
        Err(e) => return (None, Err(e.into())),
    };
    let pool_id = pool_asset.pool_id();

    let submit = || -> Result<String, ActionError> {
        let max_amount_a = parse_amount("maxAmountA", amount_a, false)?;
        let max_amount_b = parse_amount("maxAmountB", amount_b, false)?;
        // Both bounds pinned at 1:1: the deposit only succeeds at exactly
        // that price.
        let envelope = TransactionBuilder::new(&account, params.base_fee)?
            .add_operation(Operation::change_trust(pool_asset))
            .add_operation(Operation::LiquidityPoolDeposit {
                pool_id,
                max_amount_a,
                max_amount_b,
                min_price: Price::ONE,
                max_price: Price::ONE,
            })
            .set_timeout(params.timeout_secs)
            .build(now_unix())?
            .sign(keypair, &params.network_passphrase);
        let response = client.send_transaction(&envelope.to_base64())?;
        Ok(response.hash)
    };

    (Some(pool_id), submit())
}

fn withdraw(
    client: &dyn LedgerClient,
    keypair: &Keypair,
    pool_id: &str,
    amount: &str,
    params: &TxParams,
) -> Result<String, ActionError> {
    let account = client.get_account(&keypair.public_key())?;
    let pool_id: PoolId = pool_id.parse()?;
    let amount = parse_amount("amount", amount, false)?;
    // no slippage protection: any resulting amounts are accepted
    let envelope = TransactionBuilder::new(&account, params.base_fee)?
        .add_operation(Operation::LiquidityPoolWithdraw {
            pool_id,
            amount,
            min_amount_a: 0,
            min_amount_b: 0,
        })
        .set_timeout(params.timeout_secs)
        .build(now_unix())?
        .sign(keypair, &params.network_passphrase);
    let response = client.send_transaction(&envelope.to_base64())?;
    Ok(response.hash)
}

impl App {
    fn tx_params(&self) -> TxParams {
        TxParams {
            network_passphrase: self.settings.network_passphrase.clone(),
            base_fee: self.settings.base_fee,
            timeout_secs: self.settings.tx_timeout_secs,
        }
    }

    /// Presses the button for `action`. Buttons whose action is still in
    /// flight are disabled, so pressing them does nothing.
    pub fn press(&mut self, action: Action) -> Option<LedgerJob> {
        if self.loading.get(action) {
            return None;
        }
        match action {
            Action::GenerateKeypair => {
                self.generate_keypair();
                None
            }
            Action::FundAccount => self.fund_account(),
            Action::CreateLiquidityPool => self.create_liquidity_pool(),
            Action::WithdrawFromPool => self.withdraw_from_pool(),
        }
    }

    /// Replaces the session keypair with a fresh one.
    pub fn generate_keypair(&mut self) {
        self.loading.generate_keypair = true;
        let keypair = Keypair::random();
        let public_key = keypair.public_key();
        self.keypair = Some(keypair);
        info!(%public_key, "generated keypair");
        self.notify(
            Level::Info,
            format!("Generated new keypair. Public key: {}", public_key),
            None,
        );
        self.loading.generate_keypair = false;
    }

    pub fn fund_account(&mut self) -> Option<LedgerJob> {
        let Some(account_id) = self.public_key() else {
            self.notify(Level::Error, MISSING_KEYPAIR, None);
            return None;
        };
        self.loading.fund_account = true;
        info!(%account_id, "requesting faucet funding");
        Some(LedgerJob::Fund { account_id })
    }

    pub fn create_liquidity_pool(&mut self) -> Option<LedgerJob> {
        let keypair = match &self.keypair {
            Some(kp)
                if !self.form.asset_name.is_empty()
                    && !self.form.token_a_amount.is_empty()
                    && !self.form.token_b_amount.is_empty() =>
            {
                kp.clone()
            }
            _ => {
                self.notify(Level::Error, MISSING_POOL_INPUTS, None);
                return None;
            }
        };
        if self.ledger_busy() {
            self.notify(Level::Error, LEDGER_BUSY, None);
            return None;
        }
        self.loading.create_liquidity_pool = true;
        info!(asset = %self.form.asset_name, "creating liquidity pool");
        Some(LedgerJob::CreatePool {
            keypair,
            asset_name: self.form.asset_name.clone(),
            amount_a: self.form.token_a_amount.clone(),
            amount_b: self.form.token_b_amount.clone(),
            params: self.tx_params(),
        })
    }

    pub fn withdraw_from_pool(&mut self) -> Option<LedgerJob> {
        let keypair = match &self.keypair {
            Some(kp) if !self.liquidity_pool_id.is_empty() && !self.form.withdraw_amount.is_empty() => {
                kp.clone()
            }
            _ => {
                self.notify(Level::Error, MISSING_WITHDRAW_INPUTS, None);
                return None;
            }
        };
        if self.ledger_busy() {
            self.notify(Level::Error, LEDGER_BUSY, None);
            return None;
        }
        self.loading.withdraw_from_pool = true;
        info!(pool_id = %self.liquidity_pool_id, "withdrawing from liquidity pool");
        Some(LedgerJob::Withdraw {
            keypair,
            pool_id: self.liquidity_pool_id.clone(),
            amount: self.form.withdraw_amount.clone(),
            params: self.tx_params(),
        })
    }

    /// Whether a transaction from the session account is outstanding. Two
    /// concurrent submissions would race for the same sequence number.
    pub fn ledger_busy(&self) -> bool {
        Action::ALL
            .iter()
            .any(|a| a.mutates_ledger() && self.loading.get(*a))
    }

    /// Applies a finished job and clears its loading flag.
    pub fn complete(&mut self, outcome: ActionOutcome) {
        let action = outcome.action();
        match outcome {
            ActionOutcome::Funded { account_id, result } => match result {
                Ok(()) => {
                    info!(%account_id, "account funded");
                    self.notify(
                        Level::Success,
                        format!("Account {} successfully funded.", account_id),
                        None,
                    );
                }
                Err(ClientError::Http { status, body }) => {
                    warn!(%account_id, status, %body, "faucet refused funding");
                    self.notify(
                        Level::Error,
                        format!(
                            "Something went wrong funding account: {}. (HTTP {})",
                            account_id, status
                        ),
                        None,
                    );
                }
                Err(e) => {
                    warn!(%account_id, kind = ?e.kind(), error = %e, "faucet request failed");
                    self.notify(
                        Level::Error,
                        format!("Error funding account {}: {}", account_id, e),
                        None,
                    );
                }
            },
            ActionOutcome::PoolCreated { pool_id, result } => {
                if let Some(pool_id) = pool_id {
                    self.liquidity_pool_id = pool_id.to_string();
                }
                match result {
                    Ok(hash) => {
                        info!(%hash, pool_id = %self.liquidity_pool_id, "liquidity pool created");
                        let link = self.settings.explorer_tx_url(&hash);
                        self.notify(Level::Success, "Liquidity Pool created.", Some(link));
                    }
                    Err(e) => {
                        warn!(kind = ?e.kind(), error = %e, "liquidity pool creation failed");
                        self.notify(
                            Level::Error,
                            format!("Error creating Liquidity Pool: {}", e),
                            None,
                        );
                    }
                }
            }
            ActionOutcome::Withdrawn { result } => match result {
                Ok(hash) => {
                    info!(%hash, "withdrawal submitted");
                    let link = self.settings.explorer_tx_url(&hash);
                    self.notify(Level::Success, "Withdrawal successful.", Some(link));
                }
                Err(e) => {
                    warn!(kind = ?e.kind(), error = %e, "withdrawal failed");
                    self.notify(
                        Level::Error,
                        format!("Error withdrawing from Liquidity Pool: {}", e),
                        None,
                    );
                }
            },
            ActionOutcome::Aborted { action, reason } => {
                warn!(?action, %reason, "ledger job aborted");
                let what = match action {
                    Action::GenerateKeypair => "generating keypair",
                    Action::FundAccount => "funding account",
                    Action::CreateLiquidityPool => "creating Liquidity Pool",
                    Action::WithdrawFromPool => "withdrawing from Liquidity Pool",
                };
                self.notify(Level::Error, format!("Error {}: {}", what, reason), None);
            }
        }
        self.loading.set(action, false);
    }

    /// Presses `action` and runs any resulting job to completion on the
    /// calling thread.
    pub fn run_action(&mut self, action: Action, client: &dyn LedgerClient) {
        if let Some(job) = self.press(action) {
            let outcome = job.run(client);
            self.complete(outcome);
        }
    }
}
