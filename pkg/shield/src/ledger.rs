use async_trait::async_trait;
use contracts::ZkErc20Contract;
use notes::{Element, Token};
use observer::EventSource;
use prover::{DepositArgs, TransactArgs};
use testutil::{LedgerError, MockLedger};

/// The pool contract, as the client needs it
///
/// A call returns once the ledger has accepted it; the resulting note events arrive through
/// the [`EventSource`] half.
#[async_trait]
pub trait Ledger: EventSource {
    /// Make sure the pool may pull `amount` of `token` from the depositor
    async fn ensure_allowance(&self, token: Token, amount: Element) -> Result<(), Self::Error>;

    /// Submit a proven deposit
    async fn deposit(&self, args: &DepositArgs) -> Result<(), Self::Error>;

    /// Submit a proven transfer or withdrawal
    async fn transact(&self, args: &TransactArgs) -> Result<(), Self::Error>;

    /// The token registered at `slot`, if any
    async fn token_at(&self, slot: usize) -> Result<Option<Token>, Self::Error>;
}

#[async_trait]
impl Ledger for ZkErc20Contract {
    async fn ensure_allowance(&self, token: Token, amount: Element) -> Result<(), contracts::Error> {
        if let Some(tx) = self.approve_deposit(token, amount).await? {
            self.client().wait_for_confirm(tx, self.poll_interval()).await?;
        }
        Ok(())
    }

    async fn deposit(&self, args: &DepositArgs) -> Result<(), contracts::Error> {
        let tx = ZkErc20Contract::deposit(self, args).await?;
        self.client().wait_for_confirm(tx, self.poll_interval()).await?;
        Ok(())
    }

    async fn transact(&self, args: &TransactArgs) -> Result<(), contracts::Error> {
        let tx = ZkErc20Contract::transact(self, args).await?;
        self.client().wait_for_confirm(tx, self.poll_interval()).await?;
        Ok(())
    }

    async fn token_at(&self, slot: usize) -> Result<Option<Token>, contracts::Error> {
        ZkErc20Contract::token_at(self, slot).await
    }
}

#[async_trait]
impl<const DEPTH: usize> Ledger for MockLedger<DEPTH> {
    async fn ensure_allowance(&self, token: Token, amount: Element) -> Result<(), LedgerError> {
        if self.allowance(token) < amount {
            self.approve(token, Element::MAX);
        }
        Ok(())
    }

    async fn deposit(&self, args: &DepositArgs) -> Result<(), LedgerError> {
        MockLedger::deposit(self, args).map(drop)
    }

    async fn transact(&self, args: &TransactArgs) -> Result<(), LedgerError> {
        MockLedger::transact(self, args).map(drop)
    }

    async fn token_at(&self, slot: usize) -> Result<Option<Token>, LedgerError> {
        Ok(MockLedger::token_at(self, slot))
    }
}
