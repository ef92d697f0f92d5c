use crate::commit_reveal::AnswerHash;
use crate::commit_reveal::Salt;
use crate::matrix::PayoutMatrix;
use crate::operation::PactId;
use crate::operation::PartyId;
use crate::operation::PositiveAmount;
use crate::operation::Timestamp;

/// Lifecycle states of a pact, forward-only.
///
/// [`PactState::can_advance_to`] is the single allowed-transitions table;
/// every state guard in the engine goes through it rather than re-encoding
/// the graph per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display(style = "snake_case")]
pub enum PactState {
    Proposed,
    Canceled,
    Sealed,
    Answer1HashSubmitted,
    Answer2Submitted,
    Resolved,
    TimedOut,
}

impl PactState {
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Proposed, Self::Canceled)
                | (Self::Proposed, Self::Sealed)
                | (Self::Sealed, Self::Answer1HashSubmitted)
                | (Self::Answer1HashSubmitted, Self::Answer2Submitted)
                | (Self::Answer2Submitted, Self::Resolved)
                | (Self::Answer2Submitted, Self::TimedOut)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Canceled | Self::Resolved | Self::TimedOut)
    }
}

/// Party 2's plaintext answer and the clock reading it was recorded at.
#[derive(Debug, Clone, Copy)]
pub struct Answer2 {
    pub(crate) value: bool,
    pub(crate) submitted_at: Timestamp,
}

impl Answer2 {
    pub const fn value(&self) -> bool {
        self.value
    }

    pub const fn submitted_at(&self) -> Timestamp {
        self.submitted_at
    }
}

/// Party 1's last reveal attempt, kept whether or not it matched the
/// commitment: a mismatching attempt is recorded evidence, not an abort.
#[derive(Debug, Clone, Copy)]
pub struct Reveal {
    pub(crate) answer1: bool,
    pub(crate) salt: Salt,
}

impl Reveal {
    pub const fn answer1(&self) -> bool {
        self.answer1
    }

    pub const fn salt(&self) -> Salt {
        self.salt
    }
}

#[derive(Debug, Clone)]
pub struct Pact {
    pub(in crate::registry) id: PactId,
    pub(in crate::registry) p1: PartyId,
    pub(in crate::registry) p2: PartyId,
    pub(in crate::registry) p1_deposit: PositiveAmount,
    pub(in crate::registry) p2_deposit: PositiveAmount,
    pub(in crate::registry) payout_matrix: PayoutMatrix,
    pub(in crate::registry) tags: String,
    pub(in crate::registry) answer1_hash: Option<AnswerHash>,
    pub(in crate::registry) answer2: Option<Answer2>,
    pub(in crate::registry) reveal: Option<Reveal>,
    pub(in crate::registry) state: PactState,
}

impl Pact {
    pub const fn id(&self) -> PactId {
        self.id
    }

    pub const fn p1(&self) -> PartyId {
        self.p1
    }

    pub const fn p2(&self) -> PartyId {
        self.p2
    }

    pub const fn p1_deposit(&self) -> PositiveAmount {
        self.p1_deposit
    }

    pub const fn p2_deposit(&self) -> PositiveAmount {
        self.p2_deposit
    }

    pub const fn payout_matrix(&self) -> PayoutMatrix {
        self.payout_matrix
    }

    pub fn tags(&self) -> &str {
        &self.tags
    }

    pub const fn answer1_hash(&self) -> Option<AnswerHash> {
        self.answer1_hash
    }

    pub const fn answer2(&self) -> Option<Answer2> {
        self.answer2
    }

    pub const fn reveal(&self) -> Option<Reveal> {
        self.reveal
    }

    pub const fn state(&self) -> PactState {
        self.state
    }

    pub(crate) fn set_state(&mut self, next: PactState) {
        self.state = next;
    }

    pub(crate) fn record_answer1_hash(&mut self, hash: AnswerHash) {
        self.answer1_hash = Some(hash);
    }

    pub(crate) fn record_answer2(&mut self, value: bool, submitted_at: Timestamp) {
        self.answer2 = Some(Answer2 { value, submitted_at });
    }

    pub(crate) fn record_reveal(&mut self, answer1: bool, salt: Salt) {
        self.reveal = Some(Reveal { answer1, salt });
    }
}
