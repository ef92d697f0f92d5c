use std::str::FromStr;

use assert2::let_assert;
use rust_decimal::Decimal;

use crate::commit_reveal::Salt;
use crate::commit_reveal::answer_hash;
use crate::engine::PactEngine;
use crate::engine::pact_engine::PactEngineError;
use crate::event::PactEvent;
use crate::ledger::AccountingLedger;
use crate::matrix::PayoutMatrix;
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
use crate::registry::PactRegistryError;
use crate::registry::pact::PactState;

const P1: PartyId = PartyId(1);
const P2: PartyId = PartyId(2);
const STRANGER: PartyId = PartyId(9);
const TIMEOUT_TICKS: u64 = 100;
const ANSWER2_TS: Timestamp = Timestamp(10);
// Rows sum to the 2.0 escrowed by 1.0 + 1.0 deposits.
const MATRIX: &str = "1:1:0;0:1.5:0.5;1.5:0:0.5;0.5:0.5:1";

#[test]
fn propose_emits_a_creation_event_with_sequential_ids() {
    let (mut engine, _) = setup_engine_and_ledger();
    let_assert!(Ok(PactEvent::Proposed(first)) = engine.propose(propose_op("first")));
    let_assert!(Ok(PactEvent::Proposed(second)) = engine.propose(propose_op("second")));
    assert_eq!(PactId(0), first.id);
    assert_eq!(PactId(1), second.id);
    assert_eq!(PactState::Proposed, first.state);
    assert_eq!("first", first.tags);
    assert_eq!(2, engine.registry().count());
}

#[test]
fn propose_with_a_non_conserving_matrix_errors() {
    let (mut engine, _) = setup_engine_and_ledger();
    let mut op = propose_op("");
    op.matrix = PayoutMatrix::from_str("1:1:0;0:3:0;1.5:0:0.5;0.5:0.5:1").unwrap();
    let_assert!(Err(PactEngineError::Registry(PactRegistryError::Matrix(_))) = engine.propose(op));
    assert_eq!(0, engine.registry().count());
}

#[test]
fn cancel_credits_the_proposer_and_terminates_the_pact() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = proposed(&mut engine);
    let_assert!(Ok(PactEvent::Canceled(event)) = engine.cancel(&mut ledger, Cancel { caller: P1, pact_id }));
    assert_eq!(PactState::Canceled, event.state);
    assert_eq!(dec("1.0"), ledger.credited(P1));
    assert_eq!(PactState::Canceled, engine.registry().get(pact_id).unwrap().state());
}

#[test]
fn cancel_by_the_counterparty_errors() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = proposed(&mut engine);
    let result = engine.cancel(&mut ledger, Cancel { caller: P2, pact_id });
    let_assert!(Err(PactEngineError::Unauthorized { caller, .. }) = result);
    assert_eq!(P2, caller);
    assert_eq!(Decimal::ZERO, ledger.credited(P2));
    assert_eq!(PactState::Proposed, engine.registry().get(pact_id).unwrap().state());
}

#[test]
fn seal_after_cancel_errors() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = proposed(&mut engine);
    engine.cancel(&mut ledger, Cancel { caller: P1, pact_id }).unwrap();
    let result = engine.seal(Seal {
        caller: P2,
        pact_id,
        value: amount("1.0"),
    });
    let_assert!(Err(PactEngineError::WrongState { state, attempted, .. }) = result);
    assert_eq!(PactState::Canceled, state);
    assert_eq!(PactState::Sealed, attempted);
}

#[test]
fn seal_advances_the_pact_to_sealed() {
    let (mut engine, _) = setup_engine_and_ledger();
    let pact_id = proposed(&mut engine);
    let_assert!(
        Ok(PactEvent::Sealed(event)) = engine.seal(Seal {
            caller: P2,
            pact_id,
            value: amount("1.0"),
        })
    );
    assert_eq!(PactState::Sealed, event.state);
}

#[test]
fn seal_with_a_mismatched_escrowed_value_errors() {
    let (mut engine, _) = setup_engine_and_ledger();
    let pact_id = proposed(&mut engine);
    let result = engine.seal(Seal {
        caller: P2,
        pact_id,
        value: amount("0.5"),
    });
    let_assert!(Err(PactEngineError::DepositMismatch { expected, value, .. }) = result);
    assert_eq!(amount("1.0"), expected);
    assert_eq!(amount("0.5"), value);
    assert_eq!(PactState::Proposed, engine.registry().get(pact_id).unwrap().state());
}

#[test]
fn seal_by_a_stranger_errors() {
    let (mut engine, _) = setup_engine_and_ledger();
    let pact_id = proposed(&mut engine);
    let result = engine.seal(Seal {
        caller: STRANGER,
        pact_id,
        value: amount("1.0"),
    });
    let_assert!(Err(PactEngineError::Unauthorized { caller, .. }) = result);
    assert_eq!(STRANGER, caller);
}

#[test]
fn commit_answer1_stores_the_hash_and_advances() {
    let (mut engine, _) = setup_engine_and_ledger();
    let pact_id = sealed(&mut engine);
    let hash = answer_hash(true, &salt(7));
    let_assert!(
        Ok(PactEvent::Answer1Committed(event)) = engine.commit_answer1(CommitAnswer1 {
            caller: P1,
            pact_id,
            hash,
        })
    );
    assert_eq!(hash, event.hash);
    assert_eq!(PactState::Answer1HashSubmitted, event.state);
    assert_eq!(Some(hash), engine.registry().get(pact_id).unwrap().answer1_hash());
}

#[test]
fn commit_answer1_by_the_counterparty_errors() {
    let (mut engine, _) = setup_engine_and_ledger();
    let pact_id = sealed(&mut engine);
    let result = engine.commit_answer1(CommitAnswer1 {
        caller: P2,
        pact_id,
        hash: answer_hash(true, &salt(7)),
    });
    let_assert!(Err(PactEngineError::Unauthorized { caller, .. }) = result);
    assert_eq!(P2, caller);
}

#[test]
fn commit_answer1_before_seal_errors() {
    let (mut engine, _) = setup_engine_and_ledger();
    let pact_id = proposed(&mut engine);
    let result = engine.commit_answer1(CommitAnswer1 {
        caller: P1,
        pact_id,
        hash: answer_hash(true, &salt(7)),
    });
    let_assert!(Err(PactEngineError::WrongState { state, attempted, .. }) = result);
    assert_eq!(PactState::Proposed, state);
    assert_eq!(PactState::Answer1HashSubmitted, attempted);
}

#[test]
fn submit_answer2_records_the_answer_and_its_timestamp() {
    let (mut engine, _) = setup_engine_and_ledger();
    let pact_id = committed(&mut engine, true, salt(7));
    let_assert!(
        Ok(PactEvent::Answer2Submitted(event)) = engine.submit_answer2(SubmitAnswer2 {
            caller: P2,
            pact_id,
            answer2: false,
            ts: ANSWER2_TS,
        })
    );
    assert_eq!(ANSWER2_TS, event.ts);
    assert_eq!(PactState::Answer2Submitted, event.state);
    let pact = engine.registry().get(pact_id).unwrap();
    let answer2 = pact.answer2().unwrap();
    assert!(!answer2.value());
    assert_eq!(ANSWER2_TS, answer2.submitted_at());
}

#[test]
fn submit_answer2_by_the_proposer_errors() {
    let (mut engine, _) = setup_engine_and_ledger();
    let pact_id = committed(&mut engine, true, salt(7));
    let result = engine.submit_answer2(SubmitAnswer2 {
        caller: P1,
        pact_id,
        answer2: false,
        ts: ANSWER2_TS,
    });
    let_assert!(Err(PactEngineError::Unauthorized { caller, .. }) = result);
    assert_eq!(P1, caller);
}

#[test]
fn reveal_answer1_with_a_matching_hash_resolves_and_pays_the_selected_row() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    // answer1=true, answer2=false selects the TF row 0:1.5:0.5.
    let pact_id = answered(&mut engine, true, salt(7), false);
    let_assert!(
        Ok(PactEvent::Resolved(event)) = engine.reveal_answer1(
            &mut ledger,
            RevealAnswer1 {
                caller: P1,
                pact_id,
                answer1: true,
                salt: salt(7),
                ts: Timestamp(50),
            }
        )
    );
    assert!(event.answer1);
    assert_eq!(PactState::Resolved, event.state);
    assert_eq!(dec("0"), ledger.credited(P1));
    assert_eq!(dec("1.5"), ledger.credited(P2));
    assert_eq!(PactState::Resolved, engine.registry().get(pact_id).unwrap().state());
}

#[test]
fn reveal_answer1_with_a_wrong_salt_changes_no_state_and_moves_no_funds() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = answered(&mut engine, true, salt(7), true);
    let_assert!(
        Ok(PactEvent::InvalidReveal(event)) = engine.reveal_answer1(
            &mut ledger,
            RevealAnswer1 {
                caller: P1,
                pact_id,
                answer1: true,
                salt: salt(8),
                ts: Timestamp(50),
            }
        )
    );
    assert!(event.answer1);
    assert_eq!(salt(8), event.salt);
    let pact = engine.registry().get(pact_id).unwrap();
    assert_eq!(PactState::Answer2Submitted, pact.state());
    let reveal = pact.reveal().unwrap();
    assert_eq!(salt(8), reveal.salt());
    assert_eq!(Decimal::ZERO, ledger.credited(P1));
    assert_eq!(Decimal::ZERO, ledger.credited(P2));
}

#[test]
fn reveal_answer1_may_be_retried_with_corrected_inputs_before_the_deadline() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    // answer1=true, answer2=true selects the TT row 1:1:0.
    let pact_id = answered(&mut engine, true, salt(7), true);
    let wrong = RevealAnswer1 {
        caller: P1,
        pact_id,
        answer1: true,
        salt: salt(8),
        ts: Timestamp(50),
    };
    let_assert!(Ok(PactEvent::InvalidReveal(_)) = engine.reveal_answer1(&mut ledger, wrong));
    let corrected = RevealAnswer1 { salt: salt(7), ..wrong };
    let_assert!(Ok(PactEvent::Resolved(_)) = engine.reveal_answer1(&mut ledger, corrected));
    assert_eq!(dec("1"), ledger.credited(P1));
    assert_eq!(dec("1"), ledger.credited(P2));
}

#[test]
fn reveal_answer1_at_the_deadline_errors_expired() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = answered(&mut engine, true, salt(7), true);
    let result = engine.reveal_answer1(
        &mut ledger,
        RevealAnswer1 {
            caller: P1,
            pact_id,
            answer1: true,
            salt: salt(7),
            ts: Timestamp(ANSWER2_TS.0 + TIMEOUT_TICKS),
        },
    );
    let_assert!(Err(PactEngineError::Expired { now, deadline, .. }) = result);
    assert_eq!(Timestamp(110), now);
    assert_eq!(Timestamp(110), deadline);
    assert_eq!(PactState::Answer2Submitted, engine.registry().get(pact_id).unwrap().state());
}

#[test]
fn reveal_answer1_by_the_counterparty_errors() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = answered(&mut engine, true, salt(7), true);
    let result = engine.reveal_answer1(
        &mut ledger,
        RevealAnswer1 {
            caller: P2,
            pact_id,
            answer1: true,
            salt: salt(7),
            ts: Timestamp(50),
        },
    );
    let_assert!(Err(PactEngineError::Unauthorized { caller, .. }) = result);
    assert_eq!(P2, caller);
}

#[test]
fn claim_timeout_before_the_deadline_errors() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = answered(&mut engine, true, salt(7), true);
    let result = engine.claim_timeout(
        &mut ledger,
        TimeoutClaim {
            pact_id,
            ts: Timestamp(ANSWER2_TS.0 + TIMEOUT_TICKS - 1),
        },
    );
    let_assert!(Err(PactEngineError::NotYetExpired { now, deadline, .. }) = result);
    assert_eq!(Timestamp(109), now);
    assert_eq!(Timestamp(110), deadline);
    assert_eq!(Decimal::ZERO, ledger.credited(P2));
}

#[test]
fn claim_timeout_at_the_deadline_credits_the_counterparty_with_the_whole_escrow() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = answered(&mut engine, true, salt(7), true);
    let_assert!(
        Ok(PactEvent::TimedOut(event)) = engine.claim_timeout(
            &mut ledger,
            TimeoutClaim {
                pact_id,
                ts: Timestamp(ANSWER2_TS.0 + TIMEOUT_TICKS),
            }
        )
    );
    assert_eq!(PactState::TimedOut, event.state);
    assert_eq!(dec("2.0"), ledger.credited(P2));
    assert_eq!(Decimal::ZERO, ledger.credited(P1));
    assert_eq!(PactState::TimedOut, engine.registry().get(pact_id).unwrap().state());
}

#[test]
fn claim_timeout_rescues_a_pact_after_an_invalid_reveal() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = answered(&mut engine, true, salt(7), true);
    let_assert!(
        Ok(PactEvent::InvalidReveal(_)) = engine.reveal_answer1(
            &mut ledger,
            RevealAnswer1 {
                caller: P1,
                pact_id,
                answer1: true,
                salt: salt(8),
                ts: Timestamp(50),
            }
        )
    );
    let_assert!(
        Ok(PactEvent::TimedOut(_)) = engine.claim_timeout(
            &mut ledger,
            TimeoutClaim {
                pact_id,
                ts: Timestamp(200),
            }
        )
    );
    assert_eq!(dec("2.0"), ledger.credited(P2));
}

#[test]
fn claim_timeout_twice_errors_on_the_second_attempt() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = answered(&mut engine, true, salt(7), true);
    engine
        .claim_timeout(
            &mut ledger,
            TimeoutClaim {
                pact_id,
                ts: Timestamp(200),
            },
        )
        .unwrap();
    let result = engine.claim_timeout(
        &mut ledger,
        TimeoutClaim {
            pact_id,
            ts: Timestamp(201),
        },
    );
    let_assert!(Err(PactEngineError::WrongState { state, .. }) = result);
    assert_eq!(PactState::TimedOut, state);
    assert_eq!(dec("2.0"), ledger.credited(P2));
}

#[test]
fn resolved_pacts_reject_further_operations() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let pact_id = answered(&mut engine, true, salt(7), true);
    engine
        .reveal_answer1(
            &mut ledger,
            RevealAnswer1 {
                caller: P1,
                pact_id,
                answer1: true,
                salt: salt(7),
                ts: Timestamp(50),
            },
        )
        .unwrap();
    let result = engine.claim_timeout(
        &mut ledger,
        TimeoutClaim {
            pact_id,
            ts: Timestamp(200),
        },
    );
    let_assert!(Err(PactEngineError::WrongState { state, .. }) = result);
    assert_eq!(PactState::Resolved, state);
}

#[test]
fn operations_on_an_unknown_pact_error() {
    let (mut engine, mut ledger) = setup_engine_and_ledger();
    let missing = PactId(42);
    let result = engine.cancel(
        &mut ledger,
        Cancel {
            caller: P1,
            pact_id: missing,
        },
    );
    let_assert!(Err(PactEngineError::Registry(PactRegistryError::PactNotFound { pact_id })) = result);
    assert_eq!(missing, pact_id);
}

fn setup_engine_and_ledger() -> (PactEngine, AccountingLedger) {
    (PactEngine::new(TIMEOUT_TICKS), AccountingLedger::new())
}

fn propose_op(tags: &str) -> Propose {
    Propose {
        caller: P1,
        counterparty: P2,
        value: amount("1.0"),
        p1_deposit: amount("1.0"),
        p2_deposit: amount("1.0"),
        matrix: PayoutMatrix::from_str(MATRIX).unwrap(),
        tags: tags.into(),
    }
}

fn proposed(engine: &mut PactEngine) -> PactId {
    let_assert!(Ok(PactEvent::Proposed(event)) = engine.propose(propose_op("")));
    event.id
}

fn sealed(engine: &mut PactEngine) -> PactId {
    let pact_id = proposed(engine);
    engine
        .seal(Seal {
            caller: P2,
            pact_id,
            value: amount("1.0"),
        })
        .unwrap();
    pact_id
}

fn committed(engine: &mut PactEngine, answer1: bool, salt: Salt) -> PactId {
    let pact_id = sealed(engine);
    engine
        .commit_answer1(CommitAnswer1 {
            caller: P1,
            pact_id,
            hash: answer_hash(answer1, &salt),
        })
        .unwrap();
    pact_id
}

fn answered(engine: &mut PactEngine, answer1: bool, salt: Salt, answer2: bool) -> PactId {
    let pact_id = committed(engine, answer1, salt);
    engine
        .submit_answer2(SubmitAnswer2 {
            caller: P2,
            pact_id,
            answer2,
            ts: ANSWER2_TS,
        })
        .unwrap();
    pact_id
}

fn salt(byte: u8) -> Salt {
    Salt::new([byte; 32])
}

fn amount(value: &str) -> PositiveAmount {
    PositiveAmount::try_from(dec(value)).unwrap()
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}
