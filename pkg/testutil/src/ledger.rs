use std::collections::{HashMap, HashSet};

use accumulator::Accumulator;
use async_trait::async_trait;
use futures::StreamExt;
use notes::{constants::MAX_TOKENS, Token};
use observer::{EventSource, EventStream, NoteEvent};
use parking_lot::Mutex;
use prover::{DepositArgs, TransactArgs};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use zk_primitives::Element;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("nullifier {0} already spent")]
    DoubleSpend(Element),

    #[error("unknown root {0}")]
    UnknownRoot(Element),

    #[error("empty proof")]
    EmptyProof,

    #[error("token {0:?} already registered")]
    TokenExists(Token),

    #[error("no free token slots")]
    TooManyTokens,

    #[error("no token registered at slot {0}")]
    UnknownTokenSlot(usize),

    #[error("allowance {allowance} for token {token:?} does not cover {amount}")]
    InsufficientAllowance {
        token: Token,
        allowance: Element,
        amount: Element,
    },

    #[error("accumulator error: {0}")]
    Accumulator(#[from] accumulator::Error),

    #[error("subscriber lagged by {0} events")]
    Lagged(u64),
}

struct State<const DEPTH: usize> {
    tree: Accumulator<DEPTH>,
    roots: HashSet<Element>,
    nullifiers: HashSet<Element>,
    tokens: Vec<Token>,
    allowances: HashMap<Token, Element>,
    events: Vec<NoteEvent>,
    reverse_delivery: bool,
}

impl<const DEPTH: usize> State<DEPTH> {
    fn ensure_room(&self, leaves: usize) -> Result<(), LedgerError> {
        let capacity = self.tree.capacity();
        if self.tree.num_leaves() + leaves as u64 > capacity {
            return Err(accumulator::Error::Full { capacity }.into());
        }
        Ok(())
    }

    /// The pool's allowance after pulling `args.deposit_amount` from the depositor
    fn pull(&self, args: &DepositArgs) -> Result<Vec<(Token, Element)>, LedgerError> {
        let mut remaining = Vec::new();

        for (slot, amount) in args.deposit_amount.iter().enumerate() {
            if amount.is_zero() {
                continue;
            }

            let token = *self
                .tokens
                .get(slot)
                .ok_or(LedgerError::UnknownTokenSlot(slot))?;
            let allowance = self.allowances.get(&token).copied().unwrap_or_default();
            let left = allowance
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientAllowance {
                    token,
                    allowance,
                    amount,
                })?;

            remaining.push((token, left));
        }

        Ok(remaining)
    }
}

/// An in-memory ledger with the pool contract's bookkeeping
///
/// Proofs are not verified (pair it with [`MockProver`](crate::MockProver) for that), but
/// roots, nullifiers and event indices behave like the contract's.
pub struct MockLedger<const DEPTH: usize> {
    state: Mutex<State<DEPTH>>,
    sender: broadcast::Sender<NoteEvent>,
}

impl<const DEPTH: usize> Default for MockLedger<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEPTH: usize> MockLedger<DEPTH> {
    pub fn new() -> Self {
        let tree = Accumulator::new();
        let (sender, _) = broadcast::channel(1024);

        Self {
            state: Mutex::new(State {
                roots: HashSet::from([tree.root()]),
                tree,
                nullifiers: HashSet::new(),
                tokens: Vec::new(),
                allowances: HashMap::new(),
                events: Vec::new(),
                reverse_delivery: false,
            }),
            sender,
        }
    }

    /// Broadcast each call's events in reverse index order, to exercise reordering
    pub fn reverse_delivery(&self, reverse: bool) {
        self.state.lock().reverse_delivery = reverse;
    }

    pub fn add_token(&self, token: Token) -> Result<usize, LedgerError> {
        let mut state = self.state.lock();

        if state.tokens.contains(&token) {
            return Err(LedgerError::TokenExists(token));
        }
        if state.tokens.len() == MAX_TOKENS {
            return Err(LedgerError::TooManyTokens);
        }

        state.tokens.push(token);
        Ok(state.tokens.len() - 1)
    }

    /// Let the pool pull up to `amount` of `token` from the depositor, like ERC20 `approve`
    pub fn approve(&self, token: Token, amount: Element) {
        self.state.lock().allowances.insert(token, amount);
    }

    /// How much of `token` the pool may still pull from the depositor
    pub fn allowance(&self, token: Token) -> Element {
        self.state
            .lock()
            .allowances
            .get(&token)
            .copied()
            .unwrap_or_default()
    }

    /// The token at `slot`, like the contract's `tokens(uint256)`
    pub fn token_at(&self, slot: usize) -> Option<Token> {
        self.state.lock().tokens.get(slot).copied()
    }

    pub fn root(&self) -> Element {
        self.state.lock().tree.root()
    }

    pub fn num_leaves(&self) -> u64 {
        self.state.lock().tree.num_leaves()
    }

    pub fn is_spent(&self, nullifier: Element) -> bool {
        self.state.lock().nullifiers.contains(&nullifier)
    }

    pub fn events(&self) -> Vec<NoteEvent> {
        self.state.lock().events.clone()
    }

    /// Pull the deposited tokens and append the deposit's commitments, returning their indices
    ///
    /// Every slot with a non-zero amount needs a registered token and enough allowance, and
    /// nothing changes if any of them falls short.
    pub fn deposit(&self, args: &DepositArgs) -> Result<Vec<u64>, LedgerError> {
        if args.proof.is_empty() {
            return Err(LedgerError::EmptyProof);
        }

        let mut state = self.state.lock();
        state.ensure_room(args.out_commitments.len())?;

        let remaining = state.pull(args)?;
        state.allowances.extend(remaining);

        let notes = args.out_commitments.iter().zip(&args.encrypted_outputs);
        self.append(&mut state, notes)
    }

    /// Spend the nullifiers and append the new commitments, returning their indices
    ///
    /// Fails without changing anything if the root was never a root of this ledger or any
    /// nullifier was spent before (including twice in the same call).
    pub fn transact(&self, args: &TransactArgs) -> Result<Vec<u64>, LedgerError> {
        if args.proof.is_empty() {
            return Err(LedgerError::EmptyProof);
        }

        let mut state = self.state.lock();

        if !state.roots.contains(&args.root) {
            return Err(LedgerError::UnknownRoot(args.root));
        }

        let mut seen = HashSet::new();
        for nullifier in &args.in_nullifiers {
            if state.nullifiers.contains(nullifier) || !seen.insert(*nullifier) {
                return Err(LedgerError::DoubleSpend(*nullifier));
            }
        }

        state.ensure_room(args.out_commitments.len())?;
        state.nullifiers.extend(seen);

        let notes = args.out_commitments.iter().zip(&args.encrypted_outputs);
        self.append(&mut state, notes)
    }

    fn append<'a>(
        &self,
        state: &mut State<DEPTH>,
        notes: impl Iterator<Item = (&'a Element, &'a Vec<u8>)>,
    ) -> Result<Vec<u64>, LedgerError> {
        let mut emitted = Vec::new();

        for (commitment, encrypted_data) in notes {
            let index = state.tree.insert(*commitment)?;
            state.roots.insert(state.tree.root());

            emitted.push(NoteEvent {
                index,
                commitment: *commitment,
                encrypted_data: encrypted_data.clone(),
            });
        }

        state.events.extend(emitted.iter().cloned());

        let indices = emitted.iter().map(|event| event.index).collect();

        if state.reverse_delivery {
            emitted.reverse();
        }
        for event in emitted {
            // no receivers is fine
            let _ = self.sender.send(event);
        }

        Ok(indices)
    }
}

#[async_trait]
impl<const DEPTH: usize> EventSource for MockLedger<DEPTH> {
    type Error = LedgerError;

    async fn history(&self) -> Result<Vec<NoteEvent>, LedgerError> {
        Ok(self.events())
    }

    async fn subscribe(&self) -> Result<EventStream<LedgerError>, LedgerError> {
        let stream = BroadcastStream::new(self.sender.subscribe()).map(|event| {
            event.map_err(|BroadcastStreamRecvError::Lagged(n)| LedgerError::Lagged(n))
        });

        Ok(stream.boxed())
    }
}
