use std::{collections::HashSet, str::FromStr, sync::Arc};

use accumulator::SharedAccumulator;
use contracts::{Client, SecretKey, ZkErc20Contract};
use notes::{zero_output, Address, Amounts, Element, Token, TokenRegistry, UtxoInput, UtxoOutput};
use observer::{Observer, SharedAccount, Subscribers};
use parking_lot::Mutex;
use prover::{Assembler, DepositArgs, Prover, SnarkjsProver, TransactArgs};
use tracing::{info, instrument};

use crate::{Config, Error, Ledger, Result};

/// A pool client: keeps the local tree in sync and spends on behalf of tracked accounts
///
/// Every method takes `&self`, so one task can [`run`](Self::run) the observer while others
/// deposit and spend through a shared `Arc<Shield>`.
pub struct Shield<P, L, const DEPTH: usize = { notes::TREE_DEPTH }> {
    assembler: Assembler<P>,
    ledger: Arc<L>,
    observer: tokio::sync::Mutex<Observer<DEPTH>>,
    subscribers: Subscribers,
    tree: SharedAccumulator<DEPTH>,
    tokens: TokenRegistry,
    spent: Mutex<HashSet<Element>>,
}

/// A client for the contract and circuits named in `config`
pub fn connect(config: &Config) -> Result<Shield<SnarkjsProver, ZkErc20Contract>> {
    config.validate()?;

    let signer = config
        .signer_secret_key
        .as_deref()
        .ok_or_else(|| Error::InvalidConfig("signer_secret_key is required".to_owned()))?;
    let signer = SecretKey::from_str(signer.trim_start_matches("0x"))
        .map_err(|err| Error::InvalidConfig(format!("signer_secret_key: {err}")))?;

    let client = Client::new(&config.rpc_url, config.minimum_gas_price_gwei)?;
    let ledger = ZkErc20Contract::load(client, &config.contract_address, signer)?
        .with_poll_interval(config.poll_interval());

    let prover = SnarkjsProver::new(&config.circuit_build_dir);

    Ok(Shield::new(prover, ledger, config.prover_timeout()))
}

impl<P: Prover, L: Ledger, const DEPTH: usize> Shield<P, L, DEPTH> {
    /// A client with an empty tree and no tracked accounts
    pub fn new(prover: P, ledger: L, prover_timeout: std::time::Duration) -> Self {
        let observer = Observer::new();
        let subscribers = observer.subscribers();
        let tree = observer.tree();

        Self {
            assembler: Assembler::new(prover, prover_timeout),
            ledger: Arc::new(ledger),
            observer: tokio::sync::Mutex::new(observer),
            subscribers,
            tree,
            tokens: TokenRegistry::new(),
            spent: Mutex::new(HashSet::new()),
        }
    }

    /// The ledger this client talks to
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// The local commitment tree
    pub fn tree(&self) -> SharedAccumulator<DEPTH> {
        Arc::clone(&self.tree)
    }

    /// The local token slot map
    pub fn tokens(&self) -> &TokenRegistry {
        &self.tokens
    }

    /// Nullifiers this client has spent
    pub fn spent(&self) -> HashSet<Element> {
        self.spent.lock().clone()
    }

    /// Discover notes for `account`, including ones already in the tree
    ///
    /// Returns the number of notes found among those already inserted.
    #[instrument(err, skip(self, account))]
    pub async fn track(&self, account: SharedAccount) -> Result<usize> {
        self.subscribers.add(Arc::clone(&account));
        let found = observer::rescan(&account, &self.tree, self.ledger.as_ref()).await?;
        Ok(found)
    }

    /// Mirror the ledger's token slots
    #[instrument(err, skip(self))]
    pub async fn sync_tokens(&self) -> Result<usize> {
        let mut synced = 0;

        for slot in 0..notes::MAX_TOKENS {
            let token = self.ledger.token_at(slot).await.map_err(Error::ledger)?;
            let Some(token) = token else { break };

            self.tokens.register(token, slot)?;
            synced += 1;
        }

        Ok(synced)
    }

    /// Apply every ledger event not yet in the local tree
    ///
    /// Waits for [`run`](Self::run) to finish if it is active.
    pub async fn sync(&self) -> Result<()> {
        self.observer.lock().await.ready(self.ledger.as_ref()).await?;
        Ok(())
    }

    /// Follow the ledger until its event stream ends
    pub async fn run(&self) -> Result<()> {
        self.observer.lock().await.run(self.ledger.as_ref()).await?;
        Ok(())
    }

    /// Deposit `amount` of `token` into a new note for `recipient`
    ///
    /// The second deposit output is a dummy note of zero value.
    #[instrument(err, skip(self, recipient))]
    pub async fn deposit(
        &self,
        recipient: Address,
        token: Token,
        amount: Element,
    ) -> Result<DepositArgs> {
        let amounts = Amounts::single(self.tokens.slot_of(token)?, amount)?;

        let mut output = UtxoOutput::new(recipient, amounts);
        output.finalize(true)?;
        let dummy = zero_output();

        self.ledger
            .ensure_allowance(token, amount)
            .await
            .map_err(Error::ledger)?;

        let args = self.assembler.deposit(&amounts, [&output, &dummy]).await?;
        self.ledger.deposit(&args).await.map_err(Error::ledger)?;

        info!(commitment = %args.out_commitments[0], "deposited");

        Ok(args)
    }

    /// Pay `amount` of `token` from `from` to `to`, returning change to `from`
    #[instrument(err, skip(self, from, to))]
    pub async fn transfer(
        &self,
        from: &SharedAccount,
        to: Address,
        token: Token,
        amount: Element,
    ) -> Result<TransactArgs> {
        let payment = Amounts::single(self.tokens.slot_of(token)?, amount)?;
        self.spend(from, &[(to, payment)], Amounts::ZERO).await
    }

    /// Withdraw `amount` of `token` out of the pool from `from`'s notes
    #[instrument(err, skip(self, from))]
    pub async fn withdraw(
        &self,
        from: &SharedAccount,
        token: Token,
        amount: Element,
    ) -> Result<TransactArgs> {
        let withdraw = Amounts::single(self.tokens.slot_of(token)?, amount)?;
        self.spend(from, &[], withdraw).await
    }

    async fn spend(
        &self,
        from: &SharedAccount,
        payments: &[(Address, Amounts)],
        withdraw: Amounts,
    ) -> Result<TransactArgs> {
        let needed = Amounts::checked_sum(payments.iter().map(|(_, a)| a).chain([&withdraw]))
            .ok_or(Error::Overflow)?;

        let (inputs, change_address) = {
            let account = from.lock();
            let spent = self.spent.lock();
            let unspent = account.unspent(&spent).cloned().collect::<Vec<_>>();

            (select_inputs(&unspent, &needed)?, account.address())
        };

        let total = Amounts::checked_sum(inputs.iter().map(UtxoInput::amounts))
            .ok_or(Error::Overflow)?;
        let change = subtract(&total, &needed)?;

        let mut outputs = payments
            .iter()
            .map(|(address, amounts)| UtxoOutput::new(*address, *amounts))
            .collect::<Vec<_>>();
        if !change.is_zero() || outputs.is_empty() {
            outputs.push(UtxoOutput::new(change_address, change));
        }
        for output in &mut outputs {
            output.finalize(true)?;
        }
        while outputs.len() < inputs.len() {
            outputs.push(zero_output());
        }

        let input_refs = inputs.iter().collect::<Vec<_>>();
        let output_refs = outputs.iter().collect::<Vec<_>>();
        let args = self
            .assembler
            .transfer(&*self.tree, &withdraw, &input_refs, &output_refs)
            .await?;

        self.ledger.transact(&args).await.map_err(Error::ledger)?;
        self.spent.lock().extend(args.in_nullifiers.iter().copied());

        info!(
            inputs = inputs.len(),
            outputs = outputs.len(),
            "transacted"
        );

        Ok(args)
    }
}

/// One note that covers `needed`, or else the first pair that does
///
/// Fails with [`Error::TooManyInputs`] when the notes cover `needed` together but no one or two
/// of them do.
fn select_inputs(unspent: &[UtxoInput], needed: &Amounts) -> Result<Vec<UtxoInput>> {
    if let Some(single) = unspent.iter().find(|utxo| covers(utxo.amounts(), needed)) {
        return Ok(vec![single.clone()]);
    }

    for (i, first) in unspent.iter().enumerate() {
        for second in &unspent[i + 1..] {
            let pair = first.amounts().checked_add(second.amounts());
            if pair.is_some_and(|pair| covers(&pair, needed)) {
                return Ok(vec![first.clone(), second.clone()]);
            }
        }
    }

    let available = Amounts::checked_sum(unspent.iter().map(UtxoInput::amounts))
        .ok_or(Error::Overflow)?;
    if let Some(slot) = short_slot(&available, needed) {
        return Err(Error::InsufficientFunds { slot });
    }

    let best_pair = unspent
        .iter()
        .enumerate()
        .flat_map(move |(i, first)| {
            unspent[i + 1..]
                .iter()
                .filter_map(move |second| first.amounts().checked_add(second.amounts()))
        })
        .chain(unspent.iter().map(|utxo| *utxo.amounts()))
        .max_by_key(|amounts| {
            (0..notes::MAX_TOKENS)
                .filter(|&slot| amounts[slot] >= needed[slot])
                .count()
        })
        .unwrap_or(Amounts::ZERO);
    let slot = short_slot(&best_pair, needed).unwrap_or_default();

    Err(Error::TooManyInputs { slot })
}

fn short_slot(available: &Amounts, needed: &Amounts) -> Option<usize> {
    (0..notes::MAX_TOKENS).find(|&slot| available[slot] < needed[slot])
}

fn covers(available: &Amounts, needed: &Amounts) -> bool {
    available.iter().zip(needed.iter()).all(|(a, n)| a >= n)
}

fn subtract(total: &Amounts, needed: &Amounts) -> Result<Amounts> {
    let mut change = Amounts::ZERO;

    for slot in 0..notes::MAX_TOKENS {
        let left = total[slot]
            .checked_sub(needed[slot])
            .ok_or(Error::InsufficientFunds { slot })?;
        change.set(slot, left)?;
    }

    Ok(change)
}

#[cfg(test)]
mod tests {
    use notes::OwnedAccount;

    use super::*;

    fn notes_of(values: &[(usize, u64)]) -> Vec<UtxoInput> {
        let account = OwnedAccount::random();

        values
            .iter()
            .zip(0..)
            .map(|(&(slot, value), index)| {
                let amounts = Amounts::single(slot, Element::new(value)).unwrap();
                UtxoInput::new(account.spending_key(), amounts, Element::new(index + 1), index)
            })
            .collect()
    }

    #[test]
    fn selects_one_note_before_a_pair() {
        let unspent = notes_of(&[(0, 10), (0, 30), (0, 20)]);
        let needed = Amounts::single(0, Element::new(25)).unwrap();

        let inputs = select_inputs(&unspent, &needed).unwrap();

        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].amounts()[0], Element::new(30));
    }

    #[test]
    fn selects_a_pair_when_no_note_covers() {
        let unspent = notes_of(&[(0, 10), (0, 20)]);
        let needed = Amounts::single(0, Element::new(25)).unwrap();

        assert_eq!(select_inputs(&unspent, &needed).unwrap().len(), 2);
    }

    #[test]
    fn funds_spread_over_three_notes_are_too_many_inputs() {
        let unspent = notes_of(&[(2, 10), (2, 10), (2, 10)]);
        let needed = Amounts::single(2, Element::new(25)).unwrap();

        let err = select_inputs(&unspent, &needed).unwrap_err();

        assert!(matches!(err, Error::TooManyInputs { slot: 2 }), "{err}");
    }

    #[test]
    fn missing_funds_name_the_short_slot() {
        let unspent = notes_of(&[(0, 50), (3, 10)]);
        let mut needed = Amounts::single(0, Element::new(20)).unwrap();
        needed.set(3, Element::new(15)).unwrap();

        let err = select_inputs(&unspent, &needed).unwrap_err();

        assert!(matches!(err, Error::InsufficientFunds { slot: 3 }), "{err}");
    }
}
