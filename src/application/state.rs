//! Session state for the liquidity pool manager.
//!
//! This module holds everything a single session knows: the keypair, the
//! pool id, the form contents, per-action loading flags, the status line and
//! toast notifications, plus which form element has keyboard focus.

use super::actions::Action;
use super::notifications::{Level, Notifications};
use crate::domain::Keypair;
use crate::infrastructure::Settings;
use std::time::{Duration, Instant};

/// A focusable element of the form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    GenerateKeypair,
    FundAccount,
    AssetName,
    TokenAAmount,
    TokenBAmount,
    CreateLiquidityPool,
    LiquidityPoolId,
    WithdrawAmount,
    WithdrawFromPool,
}

impl Focus {
    pub const ORDER: [Focus; 9] = [
        Focus::GenerateKeypair,
        Focus::FundAccount,
        Focus::AssetName,
        Focus::TokenAAmount,
        Focus::TokenBAmount,
        Focus::CreateLiquidityPool,
        Focus::LiquidityPoolId,
        Focus::WithdrawAmount,
        Focus::WithdrawFromPool,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Focus {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Focus {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// The action behind a button, or `None` for text fields.
    pub fn action(self) -> Option<Action> {
        match self {
            Focus::GenerateKeypair => Some(Action::GenerateKeypair),
            Focus::FundAccount => Some(Action::FundAccount),
            Focus::CreateLiquidityPool => Some(Action::CreateLiquidityPool),
            Focus::WithdrawFromPool => Some(Action::WithdrawFromPool),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Focus::GenerateKeypair => "Generate Keypair",
            Focus::FundAccount => "Fund Account",
            Focus::AssetName => "Asset Name",
            Focus::TokenAAmount => "Token A Amount (XLM)",
            Focus::TokenBAmount => "Token B Amount (Custom Asset)",
            Focus::CreateLiquidityPool => "Create Liquidity Pool",
            Focus::LiquidityPoolId => "Liquidity Pool ID",
            Focus::WithdrawAmount => "Withdraw Amount",
            Focus::WithdrawFromPool => "Withdraw from Pool",
        }
    }
}

/// Text typed into the form. Nothing is parsed until an action needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub asset_name: String,
    pub token_a_amount: String,
    pub token_b_amount: String,
    pub withdraw_amount: String,
}

/// One flag per action; set only while that action's external call is
/// outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    pub generate_keypair: bool,
    pub fund_account: bool,
    pub create_liquidity_pool: bool,
    pub withdraw_from_pool: bool,
}

impl LoadingFlags {
    pub fn get(&self, action: Action) -> bool {
        match action {
            Action::GenerateKeypair => self.generate_keypair,
            Action::FundAccount => self.fund_account,
            Action::CreateLiquidityPool => self.create_liquidity_pool,
            Action::WithdrawFromPool => self.withdraw_from_pool,
        }
    }

    pub fn set(&mut self, action: Action, value: bool) {
        let slot = match action {
            Action::GenerateKeypair => &mut self.generate_keypair,
            Action::FundAccount => &mut self.fund_account,
            Action::CreateLiquidityPool => &mut self.create_liquidity_pool,
            Action::WithdrawFromPool => &mut self.withdraw_from_pool,
        };
        *slot = value;
    }

    pub fn any(&self) -> bool {
        self.generate_keypair || self.fund_account || self.create_liquidity_pool || self.withdraw_from_pool
    }
}

/// Main application state.
///
/// Owned by the event loop; the renderer borrows it immutably and the input
/// handler mutably.
///
/// # Examples
///
/// ```
/// use lpool::application::{App, Focus};
///
/// let app = App::default();
/// assert!(app.keypair.is_none());
/// assert_eq!(app.focus, Focus::GenerateKeypair);
/// ```
#[derive(Debug)]
pub struct App {
    /// Endpoints and transaction parameters
    pub settings: Settings,
    /// Current account keypair, replaced on every generation
    pub keypair: Option<Keypair>,
    /// Pool id text; filled in by pool creation, editable by the user
    pub liquidity_pool_id: String,
    pub form: FormFields,
    pub loading: LoadingFlags,
    /// Last status message, overwritten by every notification
    pub log: String,
    /// Explorer link of the last successful transaction
    pub last_link: Option<String>,
    pub notifications: Notifications,
    /// Element receiving keyboard input
    pub focus: Focus,
    pub show_help: bool,
    /// Frame counter driving the busy spinner
    pub tick: usize,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let ttl = Duration::from_secs(settings.toast_ttl_secs);
        Self {
            settings,
            keypair: None,
            liquidity_pool_id: String::new(),
            form: FormFields::default(),
            loading: LoadingFlags::default(),
            log: String::new(),
            last_link: None,
            notifications: Notifications::new(ttl),
            focus: Focus::GenerateKeypair,
            show_help: false,
            tick: 0,
        }
    }

    pub fn public_key(&self) -> Option<String> {
        self.keypair.as_ref().map(Keypair::public_key)
    }

    /// Overwrites the status line and raises a toast with the same text.
    pub fn notify(&mut self, level: Level, message: impl Into<String>, link: Option<String>) {
        let message = message.into();
        self.log = match &link {
            Some(link) => format!("{} {}", message, link),
            None => message.clone(),
        };
        if link.is_some() {
            self.last_link = link.clone();
        }
        self.notifications.push(level, message, link);
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// The text buffer behind the focused element, if it is a field.
    pub fn focused_input_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::AssetName => Some(&mut self.form.asset_name),
            Focus::TokenAAmount => Some(&mut self.form.token_a_amount),
            Focus::TokenBAmount => Some(&mut self.form.token_b_amount),
            Focus::LiquidityPoolId => Some(&mut self.liquidity_pool_id),
            Focus::WithdrawAmount => Some(&mut self.form.withdraw_amount),
            _ => None,
        }
    }

    pub fn field_value(&self, focus: Focus) -> Option<&str> {
        match focus {
            Focus::AssetName => Some(&self.form.asset_name),
            Focus::TokenAAmount => Some(&self.form.token_a_amount),
            Focus::TokenBAmount => Some(&self.form.token_b_amount),
            Focus::LiquidityPoolId => Some(&self.liquidity_pool_id),
            Focus::WithdrawAmount => Some(&self.form.withdraw_amount),
            _ => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(input) = self.focused_input_mut() {
            input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = self.focused_input_mut() {
            input.pop();
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Advances the spinner and drops expired toasts.
    pub fn on_tick(&mut self, now: Instant) {
        self.tick = self.tick.wrapping_add(1);
        self.notifications.prune(now);
    }

    /// Processes the result of a clipboard copy.
    pub fn set_copy_result(&mut self, what: &str, result: Result<String, String>) {
        match result {
            Ok(_) => self.notify(Level::Info, format!("Copied {} to clipboard", what), None),
            Err(error) => self.notify(Level::Error, format!("Copy failed: {}", error), None),
        }
    }
}
