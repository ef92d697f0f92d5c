//! One record per lifecycle transition, consumed by observers of the engine.

use crate::commit_reveal::AnswerHash;
use crate::commit_reveal::Salt;
use crate::matrix::PayoutMatrix;
use crate::operation::PactId;
use crate::operation::PartyId;
use crate::operation::PositiveAmount;
use crate::operation::Timestamp;
use crate::registry::pact::PactState;

#[derive(Debug, Clone, parse_display::Display)]
#[cfg_attr(test, derive(PartialEq))]
pub enum PactEvent {
    #[display("{0}")]
    Proposed(Proposed),
    #[display("{0}")]
    Canceled(Canceled),
    #[display("{0}")]
    Sealed(Sealed),
    #[display("{0}")]
    Answer1Committed(Answer1Committed),
    #[display("{0}")]
    Answer2Submitted(Answer2Submitted),
    #[display("{0}")]
    InvalidReveal(InvalidReveal),
    #[display("{0}")]
    Resolved(Resolved),
    #[display("{0}")]
    TimedOut(TimedOut),
}

#[derive(Debug, Clone, parse_display::Display)]
#[display(
    "event=(proposed id={id} p1={p1} p2={p2} p1_deposit={p1_deposit} p2_deposit={p2_deposit} matrix={matrix} tags={tags} state={state})"
)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Proposed {
    pub id: PactId,
    pub p1: PartyId,
    pub p2: PartyId,
    pub p1_deposit: PositiveAmount,
    pub p2_deposit: PositiveAmount,
    pub matrix: PayoutMatrix,
    pub tags: String,
    pub state: PactState,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("event=(canceled id={id} state={state})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Canceled {
    pub id: PactId,
    pub state: PactState,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("event=(sealed id={id} state={state})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Sealed {
    pub id: PactId,
    pub state: PactState,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("event=(answer1_committed id={id} hash={hash} state={state})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Answer1Committed {
    pub id: PactId,
    pub hash: AnswerHash,
    pub state: PactState,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("event=(answer2_submitted id={id} answer2={answer2} ts={ts} state={state})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Answer2Submitted {
    pub id: PactId,
    pub answer2: bool,
    pub ts: Timestamp,
    pub state: PactState,
}

/// A reveal whose digest did not match the commitment: recorded evidence,
/// not a state change.
#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("event=(invalid_reveal id={id} answer1={answer1} salt={salt})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct InvalidReveal {
    pub id: PactId,
    pub answer1: bool,
    pub salt: Salt,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("event=(resolved id={id} answer1={answer1} salt={salt} state={state})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Resolved {
    pub id: PactId,
    pub answer1: bool,
    pub salt: Salt,
    pub state: PactState,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("event=(timed_out id={id} state={state})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct TimedOut {
    pub id: PactId,
    pub state: PactState,
}
