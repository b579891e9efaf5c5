use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zk_primitives::Element;

use crate::{CircuitInput, CircuitKind, ProverError, Signal};

/// A proof as produced by the proving backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// The backend's proof object, opaque to this crate
    pub proof: serde_json::Value,
    /// The circuit's public signals, in circuit order
    pub public_signals: Vec<Signal>,
}

/// A proof encoded for the on-chain verifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallData {
    /// Proof bytes, as passed to the verifier
    pub proof: Vec<u8>,
    /// The public signals the verifier checks the proof against
    pub public_signals: Vec<Element>,
}

/// An external proving backend
#[async_trait]
pub trait Prover: Send + Sync {
    /// Generate a witness for `input` and prove it against `circuit`
    async fn full_prove(
        &self,
        circuit: CircuitKind,
        input: &CircuitInput,
    ) -> Result<Proof, ProverError>;

    /// Encode a proof for the on-chain verifier
    async fn export_call_data(&self, proof: &Proof) -> Result<CallData, ProverError>;
}
