use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use notes::{Amounts, SpendingKey};
use prover::{
    CallData, CircuitInput, CircuitKind, DepositInput, Proof, Prover, ProverError, Signal,
    TransactionInput,
};
use zk_primitives::{compute_merkle_root, Element};

/// A prover that checks every circuit constraint natively instead of proving
///
/// Inputs that would fail witness generation fail here with [`ProverError::Failed`]. The
/// "proof" it returns is the circuit name, and the public signals are in circuit order.
#[derive(Debug, Default)]
pub struct MockProver {
    proofs: AtomicUsize,
}

impl MockProver {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many proofs have been produced
    pub fn proofs(&self) -> usize {
        self.proofs.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Prover for MockProver {
    async fn full_prove(
        &self,
        circuit: CircuitKind,
        input: &CircuitInput,
    ) -> Result<Proof, ProverError> {
        let public_signals = match (circuit, input) {
            (CircuitKind::Deposit, CircuitInput::Deposit(input)) => check_deposit(input)?,
            (CircuitKind::Deposit, _) | (_, CircuitInput::Deposit(_)) => {
                return Err(failed(format!("{circuit} given the wrong input kind")));
            }
            (circuit, CircuitInput::Transaction(input)) => check_transaction(circuit, input)?,
        };

        self.proofs.fetch_add(1, Ordering::Relaxed);

        Ok(Proof {
            proof: serde_json::json!({ "circuit": circuit.name() }),
            public_signals,
        })
    }

    async fn export_call_data(&self, proof: &Proof) -> Result<CallData, ProverError> {
        Ok(CallData {
            proof: serde_json::to_vec(&proof.proof)?,
            public_signals: proof.public_signals.iter().map(|s| s.element()).collect(),
        })
    }
}

fn failed(reason: impl Into<String>) -> ProverError {
    ProverError::Failed(reason.into())
}

fn elements(signals: &[Signal]) -> Vec<Element> {
    signals.iter().map(|s| s.element()).collect()
}

fn amounts(signals: &[Signal]) -> Result<Amounts, ProverError> {
    Amounts::from_slice(&elements(signals)).map_err(|err| failed(err.to_string()))
}

fn ensure_len(what: &str, actual: usize, expected: usize) -> Result<(), ProverError> {
    if actual != expected {
        return Err(failed(format!("{what}: expected {expected}, got {actual}")));
    }
    Ok(())
}

fn check_deposit(input: &DepositInput) -> Result<Vec<Signal>, ProverError> {
    let (_, outputs) = CircuitKind::Deposit.shape();
    ensure_len("outAmounts", input.out_amounts.len(), outputs)?;
    ensure_len("outPubkeys", input.out_pubkeys.len(), outputs)?;
    ensure_len("outBlindings", input.out_blindings.len(), outputs)?;
    ensure_len("outCommitments", input.out_commitments.len(), outputs)?;

    let out_amounts = input
        .out_amounts
        .iter()
        .map(|a| amounts(a))
        .collect::<Result<Vec<_>, _>>()?;

    for (i, amounts) in out_amounts.iter().enumerate() {
        let expected = notes::commitment(
            amounts,
            input.out_pubkeys[i].element(),
            input.out_blindings[i].element(),
        );
        if expected != input.out_commitments[i].element() {
            return Err(failed(format!("output {i} commitment does not match")));
        }
    }

    let total = Amounts::checked_sum(&out_amounts).ok_or_else(|| failed("outputs overflow"))?;
    if total != amounts(&input.deposit_amount)? {
        return Err(failed("deposit amount does not match outputs"));
    }

    Ok(input
        .out_commitments
        .iter()
        .chain(&input.deposit_amount)
        .copied()
        .collect())
}

fn check_transaction(
    circuit: CircuitKind,
    input: &TransactionInput,
) -> Result<Vec<Signal>, ProverError> {
    let (inputs, outputs) = circuit.shape();
    ensure_len("inCommitment", input.in_commitment.len(), inputs)?;
    ensure_len("inAmount", input.in_amount.len(), inputs)?;
    ensure_len("inBlinding", input.in_blinding.len(), inputs)?;
    ensure_len("inPathIndices", input.in_path_indices.len(), inputs)?;
    ensure_len("inPathElements", input.in_path_elements.len(), inputs)?;
    ensure_len("inPrivateKey", input.in_private_key.len(), inputs)?;
    ensure_len("inNullifier", input.in_nullifier.len(), inputs)?;
    ensure_len("outAmount", input.out_amount.len(), outputs)?;
    ensure_len("outPubkey", input.out_pubkey.len(), outputs)?;
    ensure_len("outBlinding", input.out_blinding.len(), outputs)?;
    ensure_len("outCommitment", input.out_commitment.len(), outputs)?;

    let mut spent = Vec::with_capacity(inputs);
    for i in 0..inputs {
        let key = SpendingKey::from_element(input.in_private_key[i].element())
            .map_err(|err| failed(err.to_string()))?;
        let in_amounts = amounts(&input.in_amount[i])?;
        let commitment = input.in_commitment[i].element();

        if notes::commitment(&in_amounts, key.public_key(), input.in_blinding[i].element())
            != commitment
        {
            return Err(failed(format!("input {i} commitment does not match")));
        }

        let index = u64::try_from(input.in_path_indices[i].element())
            .map_err(|_| failed(format!("input {i} path index is too wide")))?;
        let siblings = elements(&input.in_path_elements[i]);
        let root = compute_merkle_root(
            commitment,
            siblings
                .into_iter()
                .enumerate()
                .map(|(level, sibling)| (sibling, (index >> level) & 1 == 1)),
        );
        if root != input.in_root.element() {
            return Err(failed(format!("input {i} is not in the tree at inRoot")));
        }

        if notes::nullifier(commitment, index, &key) != input.in_nullifier[i].element() {
            return Err(failed(format!("input {i} nullifier does not match")));
        }

        spent.push(in_amounts);
    }

    let mut created = Vec::with_capacity(outputs + 1);
    for i in 0..outputs {
        let out_amounts = amounts(&input.out_amount[i])?;
        let expected = notes::commitment(
            &out_amounts,
            input.out_pubkey[i].element(),
            input.out_blinding[i].element(),
        );
        if expected != input.out_commitment[i].element() {
            return Err(failed(format!("output {i} commitment does not match")));
        }
        created.push(out_amounts);
    }
    created.push(amounts(&input.withdraw_amount)?);

    let spent = Amounts::checked_sum(&spent).ok_or_else(|| failed("inputs overflow"))?;
    let created = Amounts::checked_sum(&created).ok_or_else(|| failed("outputs overflow"))?;
    if spent != created {
        return Err(failed("inputs do not equal outputs plus withdrawal"));
    }

    Ok(std::iter::once(input.in_root)
        .chain(input.out_commitment.iter().copied())
        .chain(input.in_nullifier.iter().copied())
        .chain(input.withdraw_amount.iter().copied())
        .collect())
}
