//! Balance bookkeeping collaborator of the pact engine.
//!
//! Provides [`AccountingLedger`], a per-account credit store following the
//! credit-then-separately-pull pattern: the engine only ever credits (via the
//! narrow [`CreditLedger`] capability), and value leaves the system only
//! through a caller-initiated [`AccountingLedger::withdraw`] that zeroes the
//! balance before reporting the transferred amount.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::operation::PartyId;
use crate::operation::PositiveAmount;

pub mod ledger_account;
pub mod ledger_account_ops;

pub use ledger_account::LedgerAccount;
pub use ledger_account_ops::LedgerError;
pub use ledger_account_ops::credit;
pub use ledger_account_ops::withdraw_all;

/// The only ledger capability the pact engine sees: crediting.
///
/// [`CreditLedger::credit_pair`] exists because a pact resolution credits two
/// accounts and must be both-or-neither; implementations stage both new
/// balances before assigning either.
pub trait CreditLedger {
    /// # Errors
    ///
    /// Returns an error if crediting `amount` would overflow the account's balance.
    fn credit(&mut self, account: PartyId, amount: PositiveAmount) -> Result<(), LedgerError>;

    /// # Errors
    ///
    /// Returns an error if either credit would overflow; neither is applied in that case.
    fn credit_pair(
        &mut self,
        first: (PartyId, PositiveAmount),
        second: (PartyId, PositiveAmount),
    ) -> Result<(), LedgerError>;
}

/// A deposit accepted without being owed: recorded for provenance only,
/// never credited to any balance.
#[derive(Debug, Clone, Copy, parse_display::Display)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[display("donation=(from={from} amount={amount})")]
pub struct Donation {
    pub from: PartyId,
    pub amount: PositiveAmount,
}

pub struct AccountingLedger {
    accounts: HashMap<PartyId, LedgerAccount>,
    donations: Vec<Donation>,
}

impl AccountingLedger {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            donations: Vec::new(),
        }
    }

    /// The account's currently credited balance; zero for unknown accounts.
    pub fn credited(&self, account: PartyId) -> Decimal {
        self.accounts.get(&account).map_or(Decimal::ZERO, LedgerAccount::credited)
    }

    /// Zeroes the account's credited balance and returns exactly the
    /// transferred amount.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account is unknown or its credited balance is zero ([`LedgerError::NothingToWithdraw`]).
    /// - The withdrawn total overflows ([`LedgerError::WithdrawOverflow`]).
    pub fn withdraw(&mut self, account: PartyId) -> Result<Decimal, LedgerError> {
        let ledger_account = self
            .accounts
            .get_mut(&account)
            .ok_or(LedgerError::NothingToWithdraw { account })?;
        withdraw_all(ledger_account)
    }

    /// Accepts an unsolicited deposit: records provenance only, no balance change.
    pub fn accept_deposit(&mut self, from: PartyId, amount: PositiveAmount) -> Donation {
        let donation = Donation { from, amount };
        self.donations.push(donation);
        donation
    }

    pub fn donations(&self) -> &[Donation] {
        &self.donations
    }

    pub fn as_inner(&self) -> &HashMap<PartyId, LedgerAccount> {
        &self.accounts
    }

    fn get_or_create_account(&mut self, account: PartyId) -> &mut LedgerAccount {
        self.accounts.entry(account).or_insert(LedgerAccount::new(account))
    }
}

impl CreditLedger for AccountingLedger {
    fn credit(&mut self, account: PartyId, amount: PositiveAmount) -> Result<(), LedgerError> {
        ledger_account_ops::credit(self.get_or_create_account(account), amount)
    }

    fn credit_pair(
        &mut self,
        first: (PartyId, PositiveAmount),
        second: (PartyId, PositiveAmount),
    ) -> Result<(), LedgerError> {
        let (first_account_id, first_amount) = first;
        let (second_account_id, second_amount) = second;

        // Stage both credits on copies, assign only once both have succeeded.
        let mut first_account = *self.get_or_create_account(first_account_id);
        ledger_account_ops::credit(&mut first_account, first_amount)?;
        let mut second_account = if first_account_id == second_account_id {
            first_account
        } else {
            *self.get_or_create_account(second_account_id)
        };
        ledger_account_ops::credit(&mut second_account, second_amount)?;

        self.accounts.insert(first_account_id, first_account);
        self.accounts.insert(second_account_id, second_account);
        Ok(())
    }
}
