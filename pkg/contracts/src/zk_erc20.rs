use std::time::Duration;

use async_trait::async_trait;
use ethereum_types::U64;
use notes::Token as TokenAddress;
use observer::{EventSource, EventStream, NoteEvent};
use prover::{DepositArgs, TransactArgs};
use tracing::debug;
use web3::futures::StreamExt;
use web3::{
    contract::{tokens::Tokenize, Contract},
    signing::{Key, SecretKey, SecretKeyRef},
    transports::Http,
    types::{Address, BlockNumber, FilterBuilder, H256, U256},
};
use zk_primitives::Element;

use crate::{
    error::{Error, Result},
    event::{decode_note_event, note_topics},
    util::{convert_element_to_u256, deposit_token, transact_token},
    Client, Erc20Contract,
};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The shielded pool contract
#[derive(Clone, Debug)]
pub struct ZkErc20Contract {
    client: Client,
    contract: Contract<Http>,
    signer: SecretKey,
    signer_address: Address,
    address: Address,
    poll_interval: Duration,
    /// The ethereum block height used for all contract calls.
    /// If None, the latest block is used.
    block_height: Option<U64>,
}

impl ZkErc20Contract {
    pub fn new(client: Client, contract: Contract<Http>, signer: SecretKey) -> Self {
        let signer_address = Key::address(&SecretKeyRef::new(&signer));
        let address = contract.address();

        Self {
            client,
            contract,
            signer,
            signer_address,
            address,
            poll_interval: DEFAULT_POLL_INTERVAL,
            block_height: None,
        }
    }

    pub fn load(client: Client, pool_addr: &str, signer: SecretKey) -> Result<Self> {
        let contract_json = include_str!("../abi/ZkErc20.json");
        let contract = client.load_contract_from_str(pool_addr, contract_json)?;

        Ok(Self::new(client, contract, signer))
    }

    /// How often the live event filter is polled
    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..self
        }
    }

    pub fn at_height(self, height: Option<u64>) -> Self {
        Self {
            block_height: height.map(|x| x.into()),
            ..self
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn call(&self, func: &str, params: impl Tokenize + Clone) -> Result<H256> {
        self.client
            .call(
                &self.contract,
                func,
                params,
                &self.signer,
                self.signer_address,
            )
            .await
    }

    #[tracing::instrument(err, ret, skip(self, args))]
    pub async fn deposit(&self, args: &DepositArgs) -> Result<H256> {
        self.call("deposit", (deposit_token(args),)).await
    }

    #[tracing::instrument(err, ret, skip(self, args), fields(root = %args.root))]
    pub async fn transact(&self, args: &TransactArgs) -> Result<H256> {
        self.call("transact", (transact_token(args),)).await
    }

    #[tracing::instrument(err, ret, skip(self))]
    pub async fn add_token(&self, token: TokenAddress) -> Result<H256> {
        self.call("addToken", (token,)).await
    }

    /// The token registered at `slot`, if any
    #[tracing::instrument(err, ret, skip(self))]
    pub async fn token_at(&self, slot: usize) -> Result<Option<TokenAddress>> {
        let token = self
            .client
            .query::<Address, _, _, _>(
                &self.contract,
                "tokens",
                (U256::from(slot),),
                None,
                Default::default(),
                self.block_height.map(|x| x.into()),
            )
            .await;

        match token.map_err(|err| Error::from(err).into_rejection()) {
            Ok(token) if token.is_zero() => Ok(None),
            Ok(token) => Ok(Some(token)),
            // reading past the last registered slot reverts
            Err(Error::Rejected(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// The token contract at `token`, signing with the pool client's key
    pub fn token(&self, token: TokenAddress) -> Result<Erc20Contract> {
        Erc20Contract::load(self.client.clone(), token, self.signer.clone())
    }

    /// Make sure the pool may pull `amount` of `token` from the signer before a deposit
    ///
    /// Returns the approval transaction if one had to be sent.
    #[tracing::instrument(err, skip(self))]
    pub async fn approve_deposit(
        &self,
        token: TokenAddress,
        amount: Element,
    ) -> Result<Option<H256>> {
        self.token(token)?
            .ensure_allowance(self.address, convert_element_to_u256(amount))
            .await
    }

    /// Whether `nullifier` has been spent
    #[tracing::instrument(err, ret, skip(self))]
    pub async fn is_spent(&self, nullifier: Element) -> Result<bool> {
        let spent = self
            .client
            .query(
                &self.contract,
                "nullifiers",
                (convert_element_to_u256(nullifier),),
                None,
                Default::default(),
                self.block_height.map(|x| x.into()),
            )
            .await?;

        Ok(spent)
    }

    /// Whether the contract accepts proofs against `root`
    #[tracing::instrument(err, ret, skip(self))]
    pub async fn is_known_root(&self, root: Element) -> Result<bool> {
        let known = self
            .client
            .query(
                &self.contract,
                "isKnownRoot",
                (convert_element_to_u256(root),),
                None,
                Default::default(),
                self.block_height.map(|x| x.into()),
            )
            .await?;

        Ok(known)
    }

    fn note_filter(&self) -> FilterBuilder {
        FilterBuilder::default()
            .address(vec![self.contract.address()])
            .topics(Some(note_topics()), None, None, None)
    }
}

#[async_trait]
impl EventSource for ZkErc20Contract {
    type Error = Error;

    #[tracing::instrument(err, skip(self))]
    async fn history(&self) -> Result<Vec<NoteEvent>> {
        let to_block = match self.block_height {
            Some(height) => BlockNumber::Number(height),
            None => BlockNumber::Latest,
        };

        let filter = self
            .note_filter()
            .from_block(BlockNumber::Earliest)
            .to_block(to_block)
            .build();

        let logs = self.client.logs(filter).await?;
        debug!(logs = logs.len(), "fetched note history");

        logs.iter()
            .filter(|log| !log.is_removed())
            .map(decode_note_event)
            .collect()
    }

    async fn subscribe(&self) -> Result<EventStream<Error>> {
        let filter = self.note_filter().build();

        let sub = self
            .client
            .client()
            .eth_filter()
            .create_logs_filter(filter)
            .await?;

        Ok(sub
            .stream(self.poll_interval)
            .map(|log| decode_note_event(&log?))
            .boxed())
    }
}
