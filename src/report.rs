use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::AccountingLedger;
use crate::ledger::LedgerAccount;
use crate::operation::PartyId;

/// Write the supplied [`AccountingLedger`]'s accounts to stdout as CSV in
/// ascending `account` order.
///
/// The sorting happens at report time to keep the ledger's internal data
/// structure a [`std::collections::HashMap`] and permit fast credits (`O(1)`
/// on average), paying a one-shot `O(n log n)` only when producing the final
/// batch report.
pub fn write_csv_to_stdout(ledger: &AccountingLedger) -> color_eyre::Result<()> {
    let mut accounts: Vec<&LedgerAccount> = ledger.as_inner().values().collect();
    accounts.sort_unstable_by_key(|acc| acc.account());

    let mut writer = Writer::from_writer(std::io::stdout());
    for ledger_account in accounts {
        writer.serialize(LedgerAccountReport::from(ledger_account))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct LedgerAccountReport {
    account: PartyId,
    credited: Decimal,
    withdrawn: Decimal,
}

impl From<&LedgerAccount> for LedgerAccountReport {
    fn from(ledger_account: &LedgerAccount) -> Self {
        Self {
            account: ledger_account.account(),
            credited: ledger_account.credited(),
            withdrawn: ledger_account.withdrawn(),
        }
    }
}
