//! Durable, append-only store of [`Pact`] records.
//!
//! Pacts are history: they are keyed by a sequential id, assigned at
//! proposal, never reused and never deleted. A growable arena fits that
//! exactly, the id doubling as the index; ids outside the arena are
//! [`PactRegistryError::PactNotFound`] from every operation.

use crate::matrix::MatrixError;
use crate::matrix::PayoutMatrix;
use crate::operation::PactId;
use crate::operation::PartyId;
use crate::operation::PositiveAmount;
use crate::registry::pact::PactState;

pub mod pact;

pub use pact::Pact;

pub struct PactRegistry {
    pacts: Vec<Pact>,
}

impl PactRegistry {
    pub fn new() -> Self {
        Self { pacts: Vec::new() }
    }

    /// Admits a new pact in `Proposed` state and returns its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `counterparty` is the zero identity ([`PactRegistryError::InvalidCounterparty`]).
    /// - The escrowed `value` differs from `p1_deposit` ([`PactRegistryError::DepositMismatch`]).
    /// - The payout matrix fails the conservation check ([`PactRegistryError::Matrix`]).
    pub fn propose(
        &mut self,
        caller: PartyId,
        counterparty: PartyId,
        p1_deposit: PositiveAmount,
        p2_deposit: PositiveAmount,
        matrix: PayoutMatrix,
        tags: String,
        value: PositiveAmount,
    ) -> Result<PactId, PactRegistryError> {
        if counterparty.is_zero() {
            return Err(PactRegistryError::InvalidCounterparty { p2: counterparty });
        }
        if value != p1_deposit {
            return Err(PactRegistryError::DepositMismatch {
                expected: p1_deposit,
                value,
            });
        }
        matrix.validate(p1_deposit, p2_deposit)?;

        let id = PactId(self.pacts.len() as u64);
        self.pacts.push(Pact {
            id,
            p1: caller,
            p2: counterparty,
            p1_deposit,
            p2_deposit,
            payout_matrix: matrix,
            tags,
            answer1_hash: None,
            answer2: None,
            reveal: None,
            state: PactState::Proposed,
        });
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns [`PactRegistryError::PactNotFound`] if no pact has the supplied id.
    pub fn get(&self, pact_id: PactId) -> Result<&Pact, PactRegistryError> {
        self.pacts
            .get(pact_id.0 as usize)
            .ok_or(PactRegistryError::PactNotFound { pact_id })
    }

    /// # Errors
    ///
    /// Returns [`PactRegistryError::PactNotFound`] if no pact has the supplied id.
    pub fn payout_matrix(&self, pact_id: PactId) -> Result<PayoutMatrix, PactRegistryError> {
        self.get(pact_id).map(Pact::payout_matrix)
    }

    /// Number of pacts ever proposed.
    pub fn count(&self) -> u64 {
        self.pacts.len() as u64
    }

    pub fn as_inner(&self) -> &[Pact] {
        &self.pacts
    }

    pub(crate) fn get_mut(&mut self, pact_id: PactId) -> Result<&mut Pact, PactRegistryError> {
        self.pacts
            .get_mut(pact_id.0 as usize)
            .ok_or(PactRegistryError::PactNotFound { pact_id })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PactRegistryError {
    #[error("pact not found, pact_id={pact_id}")]
    PactNotFound { pact_id: PactId },
    #[error("counterparty must be a non-zero identity, p2={p2}")]
    InvalidCounterparty { p2: PartyId },
    #[error("escrowed value does not match the proposer deposit, expected={expected}, value={value}")]
    DepositMismatch {
        expected: PositiveAmount,
        value: PositiveAmount,
    },
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}
