//! Free functions that mutate a supplied [`LedgerAccount`].
//!
//! Rationale:
//! Keeping the account a plain data container and the balance mutations as
//! standalone functions makes it easier to audit the only two ways value
//! moves inside the ledger: additive crediting and the all-or-nothing
//! withdrawal. The caller must make mutability explicit at the call site.

use rust_decimal::Decimal;

use crate::ledger::LedgerAccount;
use crate::operation::PartyId;
use crate::operation::PositiveAmount;

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("overflow while applying {amount} to {ledger_account:?}")]
    OperationOverflow {
        ledger_account: LedgerAccount,
        amount: PositiveAmount,
    },
    #[error("overflow while moving the credited balance of {ledger_account:?} to its withdrawn total")]
    WithdrawOverflow { ledger_account: LedgerAccount },
    #[error("nothing to withdraw, account={account}")]
    NothingToWithdraw { account: PartyId },
}

/// Adds `amount` to the account's credited balance.
///
/// # Errors
///
/// Returns an error if:
/// - Adding `amount` to the credited balance overflows ([`LedgerError::OperationOverflow`]).
pub fn credit(ledger_account: &mut LedgerAccount, amount: PositiveAmount) -> Result<(), LedgerError> {
    ledger_account.credited = checked_add_to_credited(ledger_account, amount)?;
    Ok(())
}

/// Zeroes the credited balance, adds it to the lifetime withdrawn total and
/// returns exactly the amount that was credited.
///
/// # Errors
///
/// Returns an error if:
/// - The credited balance is zero ([`LedgerError::NothingToWithdraw`]).
/// - Adding the balance to the withdrawn total overflows ([`LedgerError::OperationOverflow`]).
pub fn withdraw_all(ledger_account: &mut LedgerAccount) -> Result<Decimal, LedgerError> {
    let credited = ledger_account.credited;
    if credited.is_zero() {
        return Err(LedgerError::NothingToWithdraw {
            account: ledger_account.account,
        });
    }
    let new_withdrawn = ledger_account
        .withdrawn
        .checked_add(credited)
        .ok_or(LedgerError::WithdrawOverflow {
            ledger_account: *ledger_account,
        })?;
    ledger_account.credited = Decimal::ZERO;
    ledger_account.withdrawn = new_withdrawn;
    Ok(credited)
}

fn checked_add_to_credited(
    ledger_account: &LedgerAccount,
    amount: PositiveAmount,
) -> Result<Decimal, LedgerError> {
    ledger_account
        .credited
        .checked_add(amount.as_inner())
        .ok_or(LedgerError::OperationOverflow {
            ledger_account: *ledger_account,
            amount,
        })
}
