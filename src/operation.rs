use color_eyre::eyre::bail;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::commit_reveal::AnswerHash;
use crate::commit_reveal::Salt;
use crate::matrix::PayoutMatrix;

#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, parse_display::Display)]
pub struct PartyId(pub u64);

impl PartyId {
    /// The invalid identity: never a real party, rejected as counterparty at proposal.
    pub const ZERO: Self = Self(0);

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Deserialize, Copy, Clone, Hash, PartialEq, Eq, parse_display::Display)]
pub struct PactId(pub u64);

/// A reading of the externally supplied clock, in ticks.
#[derive(Debug, Deserialize, Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, parse_display::Display)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const fn checked_add_ticks(self, ticks: u64) -> Option<Self> {
        match self.0.checked_add(ticks) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }
}

#[derive(Debug, Clone, parse_display::Display)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Operation {
    #[display("{0}")]
    Propose(Propose),
    #[display("{0}")]
    Cancel(Cancel),
    #[display("{0}")]
    Seal(Seal),
    #[display("{0}")]
    CommitAnswer1(CommitAnswer1),
    #[display("{0}")]
    SubmitAnswer2(SubmitAnswer2),
    #[display("{0}")]
    RevealAnswer1(RevealAnswer1),
    #[display("{0}")]
    Timeout(TimeoutClaim),
    #[display("{0}")]
    Withdraw(Withdraw),
    #[display("{0}")]
    Donate(Donate),
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CsvRow {
            r#type: String,
            ts: Option<Timestamp>,
            actor: Option<PartyId>,
            pact: Option<PactId>,
            counterparty: Option<PartyId>,
            value: Option<PositiveAmount>,
            p1_deposit: Option<PositiveAmount>,
            p2_deposit: Option<PositiveAmount>,
            answer: Option<bool>,
            hash: Option<AnswerHash>,
            salt: Option<Salt>,
            matrix: Option<PayoutMatrix>,
            tags: Option<String>,
        }

        fn required<T, E: serde::de::Error>(field: Option<T>, name: &'static str) -> Result<T, E> {
            field.ok_or_else(|| serde::de::Error::missing_field(name))
        }

        let row = CsvRow::deserialize(deserializer)?;

        let op = match row.r#type.as_str() {
            "propose" => Self::Propose(Propose {
                caller: required(row.actor, "actor")?,
                counterparty: required(row.counterparty, "counterparty")?,
                value: required(row.value, "value")?,
                p1_deposit: required(row.p1_deposit, "p1_deposit")?,
                p2_deposit: required(row.p2_deposit, "p2_deposit")?,
                matrix: required(row.matrix, "matrix")?,
                tags: row.tags.unwrap_or_default(),
            }),
            "cancel" => Self::Cancel(Cancel {
                caller: required(row.actor, "actor")?,
                pact_id: required(row.pact, "pact")?,
            }),
            "seal" => Self::Seal(Seal {
                caller: required(row.actor, "actor")?,
                pact_id: required(row.pact, "pact")?,
                value: required(row.value, "value")?,
            }),
            "commit" => Self::CommitAnswer1(CommitAnswer1 {
                caller: required(row.actor, "actor")?,
                pact_id: required(row.pact, "pact")?,
                hash: required(row.hash, "hash")?,
            }),
            "answer" => Self::SubmitAnswer2(SubmitAnswer2 {
                caller: required(row.actor, "actor")?,
                pact_id: required(row.pact, "pact")?,
                answer2: required(row.answer, "answer")?,
                ts: required(row.ts, "ts")?,
            }),
            "reveal" => Self::RevealAnswer1(RevealAnswer1 {
                caller: required(row.actor, "actor")?,
                pact_id: required(row.pact, "pact")?,
                answer1: required(row.answer, "answer")?,
                salt: required(row.salt, "salt")?,
                ts: required(row.ts, "ts")?,
            }),
            "timeout" => Self::Timeout(TimeoutClaim {
                pact_id: required(row.pact, "pact")?,
                ts: required(row.ts, "ts")?,
            }),
            "withdraw" => Self::Withdraw(Withdraw {
                caller: required(row.actor, "actor")?,
            }),
            "donate" => Self::Donate(Donate {
                caller: required(row.actor, "actor")?,
                value: required(row.value, "value")?,
            }),
            other => {
                return Err(serde::de::Error::unknown_variant(
                    other,
                    &[
                        "propose", "cancel", "seal", "commit", "answer", "reveal", "timeout", "withdraw", "donate",
                    ],
                ));
            }
        };

        Ok(op)
    }
}

#[derive(Debug, Clone, parse_display::Display)]
#[display(
    "op=(propose caller={caller} counterparty={counterparty} value={value} p1_deposit={p1_deposit} p2_deposit={p2_deposit} matrix={matrix} tags={tags})"
)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Propose {
    pub caller: PartyId,
    pub counterparty: PartyId,
    pub value: PositiveAmount,
    pub p1_deposit: PositiveAmount,
    pub p2_deposit: PositiveAmount,
    pub matrix: PayoutMatrix,
    pub tags: String,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("op=(cancel caller={caller} pact={pact_id})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Cancel {
    pub caller: PartyId,
    pub pact_id: PactId,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("op=(seal caller={caller} pact={pact_id} value={value})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Seal {
    pub caller: PartyId,
    pub pact_id: PactId,
    pub value: PositiveAmount,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("op=(commit caller={caller} pact={pact_id} hash={hash})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct CommitAnswer1 {
    pub caller: PartyId,
    pub pact_id: PactId,
    pub hash: AnswerHash,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("op=(answer caller={caller} pact={pact_id} answer={answer2} ts={ts})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct SubmitAnswer2 {
    pub caller: PartyId,
    pub pact_id: PactId,
    pub answer2: bool,
    pub ts: Timestamp,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("op=(reveal caller={caller} pact={pact_id} answer={answer1} salt={salt} ts={ts})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct RevealAnswer1 {
    pub caller: PartyId,
    pub pact_id: PactId,
    pub answer1: bool,
    pub salt: Salt,
    pub ts: Timestamp,
}

/// Timeout claims have no caller guard: once the reveal window has lapsed
/// anyone may trigger the fallback payout to party 2.
#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("op=(timeout pact={pact_id} ts={ts})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct TimeoutClaim {
    pub pact_id: PactId,
    pub ts: Timestamp,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("op=(withdraw account={caller})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Withdraw {
    pub caller: PartyId,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("op=(donate from={caller} value={value})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Donate {
    pub caller: PartyId,
    pub value: PositiveAmount,
}

/// This permits to avoid checks on negative amounts while handling pact operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, parse_display::Display)]
pub struct PositiveAmount(Decimal);

impl TryFrom<Decimal> for PositiveAmount {
    type Error = color_eyre::Report;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() {
            bail!("Decimal must be positive value={value:?}");
        }
        Ok(Self(value))
    }
}

impl std::str::FromStr for PositiveAmount {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.parse::<Decimal>()?)
    }
}

impl PositiveAmount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub const fn as_inner(&self) -> Decimal {
        self.0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl<'de> Deserialize<'de> for PositiveAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let decimal = <Decimal as serde::Deserialize>::deserialize(deserializer)?;
        Self::try_from(decimal).map_err(|error| serde::de::Error::custom(error.to_string()))
    }
}
