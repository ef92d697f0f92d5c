//! Payout matrix model and the conservation check that gates pact admission.

use color_eyre::eyre::bail;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Deserializer;

use crate::operation::PositiveAmount;

/// The four joint outcomes of the two attestations, in fixed row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display(style = "UPPERCASE")]
pub enum Outcome {
    Tt,
    Tf,
    Ft,
    Ff,
}

impl Outcome {
    pub const ALL: [Self; 4] = [Self::Tt, Self::Tf, Self::Ft, Self::Ff];

    pub const fn index(self) -> usize {
        match self {
            Self::Tt => 0,
            Self::Tf => 1,
            Self::Ft => 2,
            Self::Ff => 3,
        }
    }

    pub const fn from_answers(answer1: bool, answer2: bool) -> Self {
        match (answer1, answer2) {
            (true, true) => Self::Tt,
            (true, false) => Self::Tf,
            (false, true) => Self::Ft,
            (false, false) => Self::Ff,
        }
    }
}

/// One payout row: what each party is credited and what stays locked forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display("{p1}:{p2}:{burn}")]
pub struct Payout {
    pub p1: PositiveAmount,
    pub p2: PositiveAmount,
    pub burn: PositiveAmount,
}

impl Payout {
    pub fn total(&self) -> Option<Decimal> {
        self.p1
            .as_inner()
            .checked_add(self.p2.as_inner())?
            .checked_add(self.burn.as_inner())
    }
}

impl std::str::FromStr for Payout {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [p1, p2, burn] = parts.as_slice() else {
            bail!("payout row must be p1:p2:burn, got={s:?}");
        };
        Ok(Self {
            p1: p1.parse()?,
            p2: p2.parse()?,
            burn: burn.parse()?,
        })
    }
}

/// The 4 payout rows indexed by [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutMatrix([Payout; 4]);

impl PayoutMatrix {
    pub const fn new(rows: [Payout; 4]) -> Self {
        Self(rows)
    }

    pub const fn payout(&self, outcome: Outcome) -> Payout {
        self.0[outcome.index()]
    }

    /// Checks conservation for every row in fixed order TT, TF, FT, FF and
    /// fails on the first violated one: payouts must neither create nor
    /// destroy value beyond the escrowed deposits.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The escrow total `p1_deposit + p2_deposit` overflows ([`MatrixError::EscrowOverflow`]).
    /// - A row's `p1 + p2 + burn` differs from the escrow total, or overflows
    ///   and therefore cannot match it ([`MatrixError::Conservation`]).
    pub fn validate(&self, p1_deposit: PositiveAmount, p2_deposit: PositiveAmount) -> Result<(), MatrixError> {
        let escrow = p1_deposit
            .as_inner()
            .checked_add(p2_deposit.as_inner())
            .ok_or(MatrixError::EscrowOverflow { p1_deposit, p2_deposit })?;

        for outcome in Outcome::ALL {
            let payout = self.payout(outcome);
            if payout.total() != Some(escrow) {
                return Err(MatrixError::Conservation { outcome, payout, escrow });
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for PayoutMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [tt, tf, ft, ff] = &self.0;
        write!(f, "{tt};{tf};{ft};{ff}")
    }
}

impl std::str::FromStr for PayoutMatrix {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.split(';').collect();
        let [tt, tf, ft, ff] = rows.as_slice() else {
            bail!("payout matrix must have 4 rows tt;tf;ft;ff, got={s:?}");
        };
        Ok(Self([tt.parse()?, tf.parse()?, ft.parse()?, ff.parse()?]))
    }
}

impl<'de> Deserialize<'de> for PayoutMatrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|error: color_eyre::Report| serde::de::Error::custom(error.to_string()))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum MatrixError {
    #[error("escrowed deposits overflow, p1_deposit={p1_deposit}, p2_deposit={p2_deposit}")]
    EscrowOverflow {
        p1_deposit: PositiveAmount,
        p2_deposit: PositiveAmount,
    },
    #[error("payout row does not conserve escrowed deposits, outcome={outcome}, payout={payout}, escrow={escrow}")]
    Conservation {
        outcome: Outcome,
        payout: Payout,
        escrow: Decimal,
    },
}
