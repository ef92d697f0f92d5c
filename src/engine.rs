//! Pact lifecycle engine.
//!
//! Provides [`PactEngine`] which applies incoming [`crate::operation::Operation`]s,
//! guards state, caller, escrowed value and timing, mutates pacts owned by the
//! [`crate::registry::PactRegistry`] and credits payouts through the
//! [`crate::ledger::CreditLedger`] capability.

pub mod pact_engine;

pub use pact_engine::PactEngine;
pub use pact_engine::PactEngineError;
