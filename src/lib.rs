//! Toy pact escrow engine: two parties escrow stakes, commit-then-reveal
//! private attestations and get paid out from a conservation-checked matrix.

pub mod commit_reveal;
pub mod engine;
pub mod event;
pub mod ledger;
pub mod matrix;
pub mod operation;
pub mod registry;
pub mod report;
