use rust_decimal::Decimal;

use crate::operation::PartyId;

#[derive(Debug, Copy, Clone)]
pub struct LedgerAccount {
    pub(in crate::ledger) account: PartyId,
    pub(in crate::ledger) credited: Decimal,
    pub(in crate::ledger) withdrawn: Decimal,
}

impl LedgerAccount {
    pub const fn new(account: PartyId) -> Self {
        Self {
            account,
            credited: Decimal::ZERO,
            withdrawn: Decimal::ZERO,
        }
    }

    pub const fn account(&self) -> PartyId {
        self.account
    }

    pub const fn credited(&self) -> Decimal {
        self.credited
    }

    pub const fn withdrawn(&self) -> Decimal {
        self.withdrawn
    }
}
