use std::{collections::HashSet, time::Duration, time::Instant};

use accumulator::Accumulator;
use notes::{Amounts, UtxoInput, UtxoOutput};
use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::{
    CallData, CircuitInput, CircuitKind, DepositArgs, DepositInput, Error, Prover, Result,
    Signal, TransactArgs, TransactionInput,
};

/// Builds circuit inputs, proves them, and packages the ledger call arguments
///
/// Every check the circuit would make is repeated here first, so a doomed witness fails
/// immediately instead of after a full proving run.
pub struct Assembler<P> {
    prover: P,
    timeout: Duration,
}

impl<P: Prover> Assembler<P> {
    /// Wrap `prover`, giving up on any single proof after `timeout`
    pub fn new(prover: P, timeout: Duration) -> Self {
        Self { prover, timeout }
    }

    /// The underlying prover
    pub fn prover(&self) -> &P {
        &self.prover
    }

    /// Build the deposit circuit input for two finalized outputs
    pub fn deposit_input(
        deposit_amount: &Amounts,
        outputs: [&UtxoOutput; 2],
    ) -> Result<DepositInput> {
        deposit_amount.ensure_canonical()?;
        for output in outputs {
            output.amounts().ensure_canonical()?;
        }

        let total = Amounts::checked_sum(outputs.iter().map(|output| output.amounts()))
            .ok_or(Error::Overflow)?;

        for (slot, (expected, actual)) in deposit_amount.iter().zip(total.iter()).enumerate() {
            if expected != actual {
                return Err(Error::DepositMismatch {
                    slot,
                    expected,
                    actual,
                });
            }
        }

        let out_commitments = outputs
            .iter()
            .map(|output| output.commitment().map(Signal))
            .collect::<notes::Result<Vec<_>>>()?;

        Ok(DepositInput {
            out_amounts: outputs.iter().map(|o| amount_signals(o.amounts())).collect(),
            out_pubkeys: Signal::many(outputs.iter().map(|o| o.public_key())),
            out_blindings: Signal::many(outputs.iter().map(|o| o.blinding())),
            out_commitments,
            deposit_amount: amount_signals(deposit_amount),
        })
    }

    /// Build a transaction circuit input, reading witnesses and the root from `tree`
    pub fn transaction_input<const DEPTH: usize>(
        tree: &Accumulator<DEPTH>,
        withdraw_amount: &Amounts,
        inputs: &[&UtxoInput],
        outputs: &[&UtxoOutput],
    ) -> Result<TransactionInput> {
        CircuitKind::transaction(inputs.len(), outputs.len())?;

        withdraw_amount.ensure_canonical()?;
        for input in inputs {
            input.amounts().ensure_canonical()?;
        }
        for output in outputs {
            output.amounts().ensure_canonical()?;
        }

        let mut seen = HashSet::with_capacity(inputs.len());
        for input in inputs {
            if !seen.insert(input.nullifier()) {
                return Err(Error::DuplicateInput(input.nullifier()));
            }
        }

        let spent = Amounts::checked_sum(inputs.iter().map(|input| input.amounts()))
            .ok_or(Error::Overflow)?;
        let created = Amounts::checked_sum(
            outputs
                .iter()
                .map(|output| output.amounts())
                .chain([withdraw_amount]),
        )
        .ok_or(Error::Overflow)?;

        for (slot, (inputs, outputs)) in spent.iter().zip(created.iter()).enumerate() {
            if inputs != outputs {
                return Err(Error::Unbalanced {
                    slot,
                    inputs,
                    outputs,
                });
            }
        }

        let witnesses = inputs
            .iter()
            .map(|input| {
                let witness = tree.witness(input.index())?;
                if witness.leaf() != input.commitment() {
                    return Err(Error::InputNotInTree {
                        index: input.index(),
                    });
                }
                Ok(witness)
            })
            .collect::<Result<Vec<_>>>()?;

        let out_commitment = outputs
            .iter()
            .map(|output| output.commitment().map(Signal))
            .collect::<notes::Result<Vec<_>>>()?;

        Ok(TransactionInput {
            in_commitment: Signal::many(inputs.iter().map(|i| i.commitment())),
            in_amount: inputs.iter().map(|i| amount_signals(i.amounts())).collect(),
            in_blinding: Signal::many(inputs.iter().map(|i| i.blinding())),
            in_path_indices: witnesses
                .iter()
                .map(|w| Signal::from(w.path_indices()))
                .collect(),
            in_path_elements: witnesses
                .iter()
                .map(|w| Signal::many(w.siblings().iter().copied()))
                .collect(),
            in_private_key: Signal::many(inputs.iter().map(|i| i.private_key())),
            out_amount: outputs.iter().map(|o| amount_signals(o.amounts())).collect(),
            out_pubkey: Signal::many(outputs.iter().map(|o| o.public_key())),
            out_blinding: Signal::many(outputs.iter().map(|o| o.blinding())),
            in_root: Signal(tree.root()),
            out_commitment,
            in_nullifier: Signal::many(inputs.iter().map(|i| i.nullifier())),
            withdraw_amount: amount_signals(withdraw_amount),
        })
    }

    /// Prove a deposit of `deposit_amount` into two finalized outputs
    #[instrument(err, skip_all)]
    pub async fn deposit(
        &self,
        deposit_amount: &Amounts,
        outputs: [&UtxoOutput; 2],
    ) -> Result<DepositArgs> {
        let input = Self::deposit_input(deposit_amount, outputs)?;

        let out_commitments = [outputs[0].commitment()?, outputs[1].commitment()?];
        let encrypted_outputs = [
            outputs[0].encrypted_data()?.to_vec(),
            outputs[1].encrypted_data()?.to_vec(),
        ];

        let call_data = self.prove(CircuitKind::Deposit, input.into()).await?;

        Ok(DepositArgs {
            deposit_amount: *deposit_amount,
            out_commitments,
            encrypted_outputs,
            proof: call_data.proof,
        })
    }

    /// Prove a transfer spending `inputs` into `outputs`, withdrawing `withdraw_amount`
    ///
    /// The witnesses and root are read under a single read guard, so they all describe the
    /// same tree state even while an observer keeps inserting.
    #[instrument(err, skip_all, fields(inputs = inputs.len(), outputs = outputs.len()))]
    pub async fn transfer<const DEPTH: usize>(
        &self,
        tree: &RwLock<Accumulator<DEPTH>>,
        withdraw_amount: &Amounts,
        inputs: &[&UtxoInput],
        outputs: &[&UtxoOutput],
    ) -> Result<TransactArgs> {
        let circuit = CircuitKind::transaction(inputs.len(), outputs.len())?;
        let input = Self::transaction_input(&*tree.read(), withdraw_amount, inputs, outputs)?;

        let encrypted_outputs = outputs
            .iter()
            .map(|output| output.encrypted_data().map(<[u8]>::to_vec))
            .collect::<notes::Result<Vec<_>>>()?;

        let root = input.in_root.element();
        let in_nullifiers = input.in_nullifier.iter().map(|s| s.element()).collect();
        let out_commitments = input.out_commitment.iter().map(|s| s.element()).collect();

        let call_data = self.prove(circuit, input.into()).await?;

        Ok(TransactArgs {
            root,
            withdraw_amount: *withdraw_amount,
            in_nullifiers,
            out_commitments,
            encrypted_outputs,
            proof: call_data.proof,
        })
    }

    async fn prove(&self, circuit: CircuitKind, input: CircuitInput) -> Result<CallData> {
        let started = Instant::now();

        let proving = async {
            let proof = self.prover.full_prove(circuit, &input).await?;
            self.prover.export_call_data(&proof).await
        };

        let call_data = tokio::time::timeout(self.timeout, proving)
            .await
            .map_err(|_| Error::Timeout {
                circuit,
                timeout: self.timeout,
            })?
            .map_err(|source| Error::Prover { circuit, source })?;

        debug!(%circuit, elapsed = ?started.elapsed(), "proved");

        Ok(call_data)
    }
}

fn amount_signals(amounts: &Amounts) -> Vec<Signal> {
    Signal::many(amounts.iter())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use notes::{Element, OwnedAccount};
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

    use super::*;
    use crate::{Proof, ProverError};

    const DEPTH: usize = 8;

    struct EchoProver;

    #[async_trait]
    impl Prover for EchoProver {
        async fn full_prove(
            &self,
            _circuit: CircuitKind,
            input: &CircuitInput,
        ) -> Result<Proof, ProverError> {
            Ok(Proof {
                proof: serde_json::to_value(input)?,
                public_signals: vec![],
            })
        }

        async fn export_call_data(&self, _proof: &Proof) -> Result<CallData, ProverError> {
            Ok(CallData {
                proof: vec![0xab; 4],
                public_signals: vec![],
            })
        }
    }

    struct SlowProver;

    #[async_trait]
    impl Prover for SlowProver {
        async fn full_prove(
            &self,
            _circuit: CircuitKind,
            _input: &CircuitInput,
        ) -> Result<Proof, ProverError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(ProverError::Failed("unreachable".to_owned()))
        }

        async fn export_call_data(&self, _proof: &Proof) -> Result<CallData, ProverError> {
            Err(ProverError::Failed("unreachable".to_owned()))
        }
    }

    fn account(seed: u8) -> OwnedAccount {
        OwnedAccount::random_with(ChaChaRng::from_seed([seed; 32]))
    }

    fn amount(slot: usize, value: u64) -> Amounts {
        Amounts::single(slot, Element::new(value)).unwrap()
    }

    fn finalized(account: &OwnedAccount, amounts: Amounts) -> UtxoOutput {
        let mut output = account.pay_self(amounts);
        output.finalize(true).unwrap();
        output
    }

    fn assembler() -> Assembler<EchoProver> {
        Assembler::new(EchoProver, Duration::from_secs(10))
    }

    /// A tree holding `outputs` at indices 0.., and the matching inputs owned by `account`
    fn deposited(
        account: &OwnedAccount,
        outputs: &[&UtxoOutput],
    ) -> (RwLock<Accumulator<DEPTH>>, Vec<UtxoInput>) {
        let mut tree = Accumulator::new();
        let inputs = outputs
            .iter()
            .map(|output| {
                let index = tree.insert(output.commitment().unwrap()).unwrap();
                UtxoInput::from_output(output, index, account.spending_key()).unwrap()
            })
            .collect();

        (RwLock::new(tree), inputs)
    }

    #[tokio::test]
    async fn deposit_packages_outputs() {
        let alice = account(1);
        let output = finalized(&alice, amount(0, 100));
        let dummy = notes::zero_output();

        let args = assembler()
            .deposit(&amount(0, 100), [&output, &dummy])
            .await
            .unwrap();

        assert_eq!(args.deposit_amount[0], Element::new(100));
        assert!(args.deposit_amount.iter().skip(1).all(Element::is_zero));
        assert_eq!(
            args.out_commitments,
            [output.commitment().unwrap(), dummy.commitment().unwrap()]
        );
        assert_eq!(args.encrypted_outputs[0], output.encrypted_data().unwrap());
        assert_eq!(args.proof, vec![0xab; 4]);
        assert!(args.encrypted_outputs_hex()[1].starts_with("0x"));
    }

    #[tokio::test]
    async fn deposit_must_match_outputs() {
        let alice = account(1);
        let output = finalized(&alice, amount(0, 100));
        let dummy = notes::zero_output();

        let error = assembler()
            .deposit(&amount(0, 99), [&output, &dummy])
            .await
            .unwrap_err();

        assert!(matches!(error, Error::DepositMismatch { slot: 0, .. }));
    }

    #[tokio::test]
    async fn deposit_needs_finalized_outputs() {
        let alice = account(1);
        let output = alice.pay_self(amount(0, 100));
        let dummy = notes::zero_output();

        let error = assembler()
            .deposit(&amount(0, 100), [&output, &dummy])
            .await
            .unwrap_err();

        assert!(matches!(error, Error::Notes(notes::Error::NotFinalized)));
    }

    #[test]
    fn deposit_input_binds_outputs_in_order() {
        let alice = account(1);
        let first = finalized(&alice, amount(0, 60));
        let second = finalized(&alice, amount(0, 40));

        let input =
            Assembler::<EchoProver>::deposit_input(&amount(0, 100), [&first, &second]).unwrap();

        assert_eq!(input.out_commitments[0], Signal(first.commitment().unwrap()));
        assert_eq!(input.out_blindings[1], Signal(second.blinding()));
        assert_eq!(input.out_amounts[0][0], Signal::from(60));
        assert_eq!(input.deposit_amount.len(), notes::MAX_TOKENS);
    }

    #[tokio::test]
    async fn transfer_spends_from_tree() {
        let alice = account(1);
        let bob = account(2);

        let a = finalized(&alice, amount(0, 100));
        let b = finalized(&alice, amount(1, 5));
        let (tree, inputs) = deposited(&alice, &[&a, &b]);

        let mut to_bob = alice.pay(bob.address(), amount(0, 70));
        to_bob.finalize(true).unwrap();
        let change = finalized(&alice, amount(0, 30));

        let args = assembler()
            .transfer(&tree, &Amounts::ZERO, &[&inputs[0]], &[&to_bob, &change])
            .await
            .unwrap();

        assert_eq!(args.root, tree.read().root());
        assert_eq!(args.in_nullifiers, vec![inputs[0].nullifier()]);
        assert_eq!(
            args.in_nullifiers[0],
            alice.nullifier_for(a.commitment().unwrap(), 0)
        );
        assert_eq!(
            args.out_commitments,
            vec![to_bob.commitment().unwrap(), change.commitment().unwrap()]
        );
        assert_eq!(args.encrypted_outputs.len(), 2);
    }

    #[test]
    fn transaction_input_carries_witness() {
        let alice = account(1);
        let outputs = (0..3)
            .map(|i| finalized(&alice, amount(0, 10 + i)))
            .collect::<Vec<_>>();
        let refs = outputs.iter().collect::<Vec<_>>();
        let (tree, inputs) = deposited(&alice, &refs);

        let change = finalized(&alice, amount(0, 12));
        let tree = tree.read();
        let input = Assembler::<EchoProver>::transaction_input(
            &*tree,
            &Amounts::ZERO,
            &[&inputs[2]],
            &[&change],
        )
        .unwrap();

        let witness = tree.witness(2).unwrap();
        assert_eq!(input.in_root, Signal(tree.root()));
        assert_eq!(input.in_path_indices, vec![Signal::from(2)]);
        assert_eq!(input.in_path_elements[0].len(), DEPTH);
        assert_eq!(input.in_path_elements[0][0], Signal(witness.siblings()[0]));
        assert_eq!(input.in_private_key, vec![Signal(alice.spending_key().to_element())]);
    }

    #[tokio::test]
    async fn transfer_rejects_unsupported_shape() {
        let alice = account(1);
        let a = finalized(&alice, amount(0, 100));
        let (tree, inputs) = deposited(&alice, &[&a]);

        let outputs = (0..3)
            .map(|_| finalized(&alice, Amounts::ZERO))
            .collect::<Vec<_>>();

        let error = assembler()
            .transfer(
                &tree,
                &amount(0, 100),
                &[&inputs[0]],
                &[&outputs[0], &outputs[1], &outputs[2]],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            Error::UnsupportedShape {
                inputs: 1,
                outputs: 3
            }
        ));
    }

    #[tokio::test]
    async fn transfer_must_balance() {
        let alice = account(1);
        let a = finalized(&alice, amount(0, 100));
        let (tree, inputs) = deposited(&alice, &[&a]);

        let out = finalized(&alice, amount(0, 90));

        let error = assembler()
            .transfer(&tree, &amount(0, 5), &[&inputs[0]], &[&out])
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Unbalanced { slot: 0, .. }));

        let args = assembler()
            .transfer(&tree, &amount(0, 10), &[&inputs[0]], &[&out])
            .await
            .unwrap();
        assert_eq!(args.withdraw_amount, amount(0, 10));
    }

    #[tokio::test]
    async fn transfer_rejects_notes_missing_from_tree() {
        let alice = account(1);
        let a = finalized(&alice, amount(0, 100));
        let (tree, _) = deposited(&alice, &[&a]);

        let stray = finalized(&alice, amount(0, 100));
        let stray = UtxoInput::from_output(&stray, 0, alice.spending_key()).unwrap();
        let out = finalized(&alice, amount(0, 100));

        let error = assembler()
            .transfer(&tree, &Amounts::ZERO, &[&stray], &[&out])
            .await
            .unwrap_err();

        assert!(matches!(error, Error::InputNotInTree { index: 0 }));
    }

    #[tokio::test]
    async fn transfer_rejects_double_spend_within_itself() {
        let alice = account(1);
        let a = finalized(&alice, amount(0, 50));
        let (tree, inputs) = deposited(&alice, &[&a]);

        let out = finalized(&alice, amount(0, 50));
        let change = finalized(&alice, amount(0, 50));

        let error = assembler()
            .transfer(&tree, &Amounts::ZERO, &[&inputs[0], &inputs[0]], &[&out, &change])
            .await
            .unwrap_err();

        assert!(matches!(error, Error::DuplicateInput(_)));
    }

    #[tokio::test]
    async fn prover_timeout() {
        let alice = account(1);
        let output = finalized(&alice, amount(0, 1));
        let dummy = notes::zero_output();

        let assembler = Assembler::new(SlowProver, Duration::from_millis(20));
        let error = assembler
            .deposit(&amount(0, 1), [&output, &dummy])
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            Error::Timeout {
                circuit: CircuitKind::Deposit,
                ..
            }
        ));
    }
}
