use crate::commit_reveal::answer_hash;
use crate::event::Answer1Committed;
use crate::event::Answer2Submitted;
use crate::event::Canceled;
use crate::event::InvalidReveal;
use crate::event::PactEvent;
use crate::event::Proposed;
use crate::event::Resolved;
use crate::event::Sealed;
use crate::event::TimedOut;
use crate::ledger::CreditLedger;
use crate::ledger::LedgerError;
use crate::matrix::Outcome;
use crate::operation::Cancel;
use crate::operation::CommitAnswer1;
use crate::operation::PactId;
use crate::operation::PartyId;
use crate::operation::PositiveAmount;
use crate::operation::Propose;
use crate::operation::RevealAnswer1;
use crate::operation::Seal;
use crate::operation::SubmitAnswer2;
use crate::operation::TimeoutClaim;
use crate::operation::Timestamp;
use crate::registry::Pact;
use crate::registry::PactRegistry;
use crate::registry::PactRegistryError;
use crate::registry::pact::PactState;

#[cfg(test)]
#[path = "tests/pact_engine_tests.rs"]
mod pact_engine_tests;

pub struct PactEngine {
    registry: PactRegistry,
    /// Width of the reveal window in clock ticks, fixed at construction.
    timeout: u64,
}

impl PactEngine {
    pub fn new(timeout: u64) -> Self {
        Self {
            registry: PactRegistry::new(),
            timeout,
        }
    }

    pub const fn registry(&self) -> &PactRegistry {
        &self.registry
    }

    /// Admits a new pact escrowing the proposer's deposit.
    ///
    /// # Errors
    ///
    /// Propagates [`PactRegistryError`] for a zero counterparty, a mismatched
    /// escrowed value or a non-conserving payout matrix.
    pub fn propose(&mut self, propose: Propose) -> Result<PactEvent, PactEngineError> {
        let id = self.registry.propose(
            propose.caller,
            propose.counterparty,
            propose.p1_deposit,
            propose.p2_deposit,
            propose.matrix,
            propose.tags,
            propose.value,
        )?;
        let pact = self.registry.get(id)?;
        Ok(PactEvent::Proposed(Proposed {
            id,
            p1: pact.p1(),
            p2: pact.p2(),
            p1_deposit: pact.p1_deposit(),
            p2_deposit: pact.p2_deposit(),
            matrix: pact.payout_matrix(),
            tags: pact.tags().to_owned(),
            state: pact.state(),
        }))
    }

    /// Party 1 withdraws an unsealed proposal and is refunded its deposit.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pact is not in `Proposed` state ([`PactEngineError::WrongState`]).
    /// - The caller is not party 1 ([`PactEngineError::Unauthorized`]).
    pub fn cancel<L: CreditLedger>(&mut self, ledger: &mut L, cancel: Cancel) -> Result<PactEvent, PactEngineError> {
        let pact = self.registry.get(cancel.pact_id)?;
        Self::guard_transition(pact, PactState::Canceled)?;
        if cancel.caller != pact.p1() {
            return Err(Self::unauthorized(pact, cancel.caller));
        }

        let (p1, p1_deposit) = (pact.p1(), pact.p1_deposit());
        ledger.credit(p1, p1_deposit)?;
        let pact = self.registry.get_mut(cancel.pact_id)?;
        pact.set_state(PactState::Canceled);
        Ok(PactEvent::Canceled(Canceled {
            id: cancel.pact_id,
            state: pact.state(),
        }))
    }

    /// Party 2 accepts the proposal by escrowing its own deposit.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pact is not in `Proposed` state ([`PactEngineError::WrongState`]).
    /// - The caller is not party 2 ([`PactEngineError::Unauthorized`]).
    /// - The escrowed value differs from party 2's deposit ([`PactEngineError::DepositMismatch`]).
    pub fn seal(&mut self, seal: Seal) -> Result<PactEvent, PactEngineError> {
        let pact = self.registry.get(seal.pact_id)?;
        Self::guard_transition(pact, PactState::Sealed)?;
        if seal.caller != pact.p2() {
            return Err(Self::unauthorized(pact, seal.caller));
        }
        if seal.value != pact.p2_deposit() {
            return Err(PactEngineError::DepositMismatch {
                pact_id: seal.pact_id,
                expected: pact.p2_deposit(),
                value: seal.value,
            });
        }

        let pact = self.registry.get_mut(seal.pact_id)?;
        pact.set_state(PactState::Sealed);
        Ok(PactEvent::Sealed(Sealed {
            id: seal.pact_id,
            state: pact.state(),
        }))
    }

    /// Party 1 commits to its answer as a salted digest, before party 2
    /// answers in the clear.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pact is not in `Sealed` state ([`PactEngineError::WrongState`]).
    /// - The caller is not party 1 ([`PactEngineError::Unauthorized`]).
    pub fn commit_answer1(&mut self, commit: CommitAnswer1) -> Result<PactEvent, PactEngineError> {
        let pact = self.registry.get(commit.pact_id)?;
        Self::guard_transition(pact, PactState::Answer1HashSubmitted)?;
        if commit.caller != pact.p1() {
            return Err(Self::unauthorized(pact, commit.caller));
        }

        let pact = self.registry.get_mut(commit.pact_id)?;
        pact.record_answer1_hash(commit.hash);
        pact.set_state(PactState::Answer1HashSubmitted);
        Ok(PactEvent::Answer1Committed(Answer1Committed {
            id: commit.pact_id,
            hash: commit.hash,
            state: pact.state(),
        }))
    }

    /// Party 2 answers in the clear; the clock reading recorded here anchors
    /// the reveal window.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pact is not in `Answer1HashSubmitted` state ([`PactEngineError::WrongState`]).
    /// - The caller is not party 2 ([`PactEngineError::Unauthorized`]).
    pub fn submit_answer2(&mut self, answer: SubmitAnswer2) -> Result<PactEvent, PactEngineError> {
        let pact = self.registry.get(answer.pact_id)?;
        Self::guard_transition(pact, PactState::Answer2Submitted)?;
        if answer.caller != pact.p2() {
            return Err(Self::unauthorized(pact, answer.caller));
        }

        let pact = self.registry.get_mut(answer.pact_id)?;
        pact.record_answer2(answer.answer2, answer.ts);
        pact.set_state(PactState::Answer2Submitted);
        Ok(PactEvent::Answer2Submitted(Answer2Submitted {
            id: answer.pact_id,
            answer2: answer.answer2,
            ts: answer.ts,
            state: pact.state(),
        }))
    }

    /// Party 1 discloses its answer and salt for checking against the
    /// commitment, strictly before the reveal window lapses.
    ///
    /// A matching reveal resolves the pact and credits both parties from the
    /// payout row selected by the two answers; the burn portion is credited
    /// to nobody. A mismatching reveal is recorded and signalled but changes
    /// no state, so party 1 may retry with different inputs until the
    /// deadline and party 2 keeps the timeout fallback. Nothing limits the
    /// number of attempts.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pact is not in `Answer2Submitted` state ([`PactEngineError::WrongState`]).
    /// - The caller is not party 1 ([`PactEngineError::Unauthorized`]).
    /// - The reveal window has lapsed ([`PactEngineError::Expired`]).
    /// - The deadline or a credited balance would overflow
    ///   ([`PactEngineError::ArithmeticOverflow`], [`PactEngineError::Ledger`]).
    pub fn reveal_answer1<L: CreditLedger>(
        &mut self,
        ledger: &mut L,
        reveal: RevealAnswer1,
    ) -> Result<PactEvent, PactEngineError> {
        let pact = self.registry.get(reveal.pact_id)?;
        Self::guard_transition(pact, PactState::Resolved)?;
        if reveal.caller != pact.p1() {
            return Err(Self::unauthorized(pact, reveal.caller));
        }
        // Both are recorded before a pact can reach Answer2Submitted.
        let (Some(committed), Some(answer2)) = (pact.answer1_hash(), pact.answer2()) else {
            return Err(Self::wrong_state(pact, PactState::Resolved));
        };
        let deadline = Self::reveal_deadline(reveal.pact_id, answer2.submitted_at(), self.timeout)?;
        if reveal.ts >= deadline {
            return Err(PactEngineError::Expired {
                pact_id: reveal.pact_id,
                now: reveal.ts,
                deadline,
            });
        }

        let (p1, p2) = (pact.p1(), pact.p2());
        let payout = pact.payout_matrix().payout(Outcome::from_answers(reveal.answer1, answer2.value()));

        let computed = answer_hash(reveal.answer1, &reveal.salt);
        if computed != committed {
            let pact = self.registry.get_mut(reveal.pact_id)?;
            pact.record_reveal(reveal.answer1, reveal.salt);
            return Ok(PactEvent::InvalidReveal(InvalidReveal {
                id: reveal.pact_id,
                answer1: reveal.answer1,
                salt: reveal.salt,
            }));
        }

        ledger.credit_pair((p1, payout.p1), (p2, payout.p2))?;
        let pact = self.registry.get_mut(reveal.pact_id)?;
        pact.record_reveal(reveal.answer1, reveal.salt);
        pact.set_state(PactState::Resolved);
        Ok(PactEvent::Resolved(Resolved {
            id: reveal.pact_id,
            answer1: reveal.answer1,
            salt: reveal.salt,
            state: pact.state(),
        }))
    }

    /// Claims the fallback payout once the reveal window has lapsed: party 2
    /// is credited the entire escrow. Callable by anyone.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pact is not in `Answer2Submitted` state ([`PactEngineError::WrongState`]).
    /// - The reveal window is still open ([`PactEngineError::NotYetExpired`]).
    /// - The deadline or escrow total would overflow
    ///   ([`PactEngineError::ArithmeticOverflow`]).
    pub fn claim_timeout<L: CreditLedger>(
        &mut self,
        ledger: &mut L,
        claim: TimeoutClaim,
    ) -> Result<PactEvent, PactEngineError> {
        let pact = self.registry.get(claim.pact_id)?;
        Self::guard_transition(pact, PactState::TimedOut)?;
        let Some(answer2) = pact.answer2() else {
            return Err(Self::wrong_state(pact, PactState::TimedOut));
        };
        let deadline = Self::reveal_deadline(claim.pact_id, answer2.submitted_at(), self.timeout)?;
        if claim.ts < deadline {
            return Err(PactEngineError::NotYetExpired {
                pact_id: claim.pact_id,
                now: claim.ts,
                deadline,
            });
        }

        let escrow = pact
            .p1_deposit()
            .checked_add(pact.p2_deposit())
            .ok_or(PactEngineError::ArithmeticOverflow { pact_id: claim.pact_id })?;
        ledger.credit(pact.p2(), escrow)?;
        let pact = self.registry.get_mut(claim.pact_id)?;
        pact.set_state(PactState::TimedOut);
        Ok(PactEvent::TimedOut(TimedOut {
            id: claim.pact_id,
            state: pact.state(),
        }))
    }

    fn reveal_deadline(pact_id: PactId, submitted_at: Timestamp, timeout: u64) -> Result<Timestamp, PactEngineError> {
        submitted_at
            .checked_add_ticks(timeout)
            .ok_or(PactEngineError::ArithmeticOverflow { pact_id })
    }

    fn guard_transition(pact: &Pact, attempted: PactState) -> Result<(), PactEngineError> {
        if !pact.state().can_advance_to(attempted) {
            return Err(Self::wrong_state(pact, attempted));
        }
        Ok(())
    }

    const fn wrong_state(pact: &Pact, attempted: PactState) -> PactEngineError {
        PactEngineError::WrongState {
            pact_id: pact.id(),
            state: pact.state(),
            attempted,
        }
    }

    const fn unauthorized(pact: &Pact, caller: PartyId) -> PactEngineError {
        PactEngineError::Unauthorized {
            pact_id: pact.id(),
            caller,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PactEngineError {
    #[error("pact in wrong state for the requested transition, pact_id={pact_id}, state={state}, attempted={attempted}")]
    WrongState {
        pact_id: PactId,
        state: PactState,
        attempted: PactState,
    },
    #[error("caller not authorized for this operation, pact_id={pact_id}, caller={caller}")]
    Unauthorized { pact_id: PactId, caller: PartyId },
    #[error("escrowed value does not match the required deposit, pact_id={pact_id}, expected={expected}, value={value}")]
    DepositMismatch {
        pact_id: PactId,
        expected: PositiveAmount,
        value: PositiveAmount,
    },
    #[error("reveal window lapsed, pact_id={pact_id}, now={now}, deadline={deadline}")]
    Expired {
        pact_id: PactId,
        now: Timestamp,
        deadline: Timestamp,
    },
    #[error("reveal window still open, pact_id={pact_id}, now={now}, deadline={deadline}")]
    NotYetExpired {
        pact_id: PactId,
        now: Timestamp,
        deadline: Timestamp,
    },
    #[error("arithmetic overflow while processing pact, pact_id={pact_id}")]
    ArithmeticOverflow { pact_id: PactId },
    #[error(transparent)]
    Registry(#[from] PactRegistryError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
