use std::{future::Future, time::Duration};

use crate::{Error, Result};
use ethereum_types::{Address, H256, U64};
use tokio::time::interval;
use web3::{
    contract::{tokens::Tokenize, Contract, Options},
    ethabi,
    signing::SecretKey,
    transports::Http,
    types::{Filter, Log, TransactionId, U256},
    Web3,
};

#[derive(Debug, Clone)]
pub struct Client {
    client: Web3<Http>,
    minimum_gas_price: Option<U256>,
}

impl Client {
    pub fn new(rpc: &str, minimum_gas_price_gwei: Option<u64>) -> Result<Client> {
        let client = Web3::new(Http::new(rpc)?);
        let minimum_gas_price = minimum_gas_price_gwei.map(|gwei| U256::from(gwei) * 1_000_000_000);

        Ok(Client {
            client,
            minimum_gas_price,
        })
    }

    /// Load a contract from a build artifact holding its `abi`
    pub fn load_contract_from_str(
        &self,
        address: &str,
        contract_json: &str,
    ) -> Result<Contract<Http>> {
        self.load_contract(address.trim_start_matches("0x").parse()?, contract_json)
    }

    /// Like [`load_contract_from_str`](Self::load_contract_from_str), for an already parsed address
    pub fn load_contract(&self, address: Address, contract_json: &str) -> Result<Contract<Http>> {
        let contract_json_value = serde_json::from_str::<serde_json::Value>(contract_json)?;
        let abi_value = contract_json_value.get("abi").ok_or(Error::MissingAbi)?;

        let contract_abi = serde_json::from_value::<ethabi::Contract>(abi_value.clone())?;

        Ok(Contract::new(self.client.eth(), address, contract_abi))
    }

    pub fn client(&self) -> &Web3<Http> {
        &self.client
    }

    pub async fn fast_gas_price(&self) -> Result<U256, web3::Error> {
        let gas_price: U256 =
            retry_on_network_failure(move || self.client.eth().gas_price()).await?;
        let fast_gas_price = gas_price * 2;

        match self.minimum_gas_price {
            Some(minimum_gas_price) if fast_gas_price < minimum_gas_price => Ok(minimum_gas_price),
            _ => Ok(fast_gas_price),
        }
    }

    #[tracing::instrument(err, ret, skip(self))]
    async fn pending_nonce(&self, address: Address) -> Result<U256, web3::Error> {
        retry_on_network_failure(move || {
            self.client
                .eth()
                .transaction_count(address, Some(web3::types::BlockNumber::Pending))
        })
        .await
    }

    pub(crate) async fn options(&self, address: Address) -> Result<Options, web3::Error> {
        let gas_price = self.fast_gas_price().await?;
        let nonce = self.pending_nonce(address).await?;

        Ok(Options {
            gas: Some(10_000_000.into()),
            gas_price: Some(gas_price),
            nonce: Some(nonce),
            ..Default::default()
        })
    }

    /// Send a signed call, estimating gas first
    ///
    /// A call that would revert fails at estimation with [`Error::Rejected`].
    pub async fn call(
        &self,
        contract: &Contract<Http>,
        func: &str,
        params: impl Tokenize + Clone,
        signer: &SecretKey,
        signer_address: Address,
    ) -> Result<H256> {
        let options = self.options(signer_address).await?;
        let gas = retry_on_network_failure(|| {
            contract.estimate_gas(func, params.clone(), signer_address, options.clone())
        })
        .await
        .map_err(|err| Error::from(err).into_rejection())?;

        let call_tx = retry_on_network_failure(move || {
            contract.signed_call(
                func,
                params,
                web3::contract::Options {
                    gas: Some(gas + gas / 2),
                    ..options
                },
                signer,
            )
        })
        .await
        .map_err(|err| Error::from(err).into_rejection())?;

        Ok(call_tx)
    }

    pub async fn query<R, A, B, P>(
        &self,
        contract: &Contract<Http>,
        func: &str,
        params: P,
        from: A,
        options: Options,
        block: B,
    ) -> Result<R, web3::contract::Error>
    where
        R: web3::contract::tokens::Detokenize,
        A: Into<Option<Address>> + Clone,
        B: Into<Option<web3::types::BlockId>> + Clone,
        P: Tokenize + Clone,
    {
        let result =
            retry_on_network_failure(move || contract.query(func, params, from, options, block))
                .await?;

        Ok(result)
    }

    /// Every log matching `filter`
    pub async fn logs(&self, filter: Filter) -> Result<Vec<Log>, web3::Error> {
        retry_on_network_failure(move || self.client.eth().logs(filter)).await
    }

    /// Poll until `txn_hash` is mined, returning its block number
    ///
    /// Gives up with [`Error::UnknownTransaction`] once the node has not known the transaction for
    /// 60 seconds. A mined transaction with a failed status is [`Error::Rejected`].
    #[tracing::instrument(err, skip(self))]
    pub async fn wait_for_confirm(&self, txn_hash: H256, interval_period: Duration) -> Result<U64> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(60);

        let mut interval = interval(interval_period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let receipt = retry_on_network_failure(move || {
                self.client.eth().transaction_receipt(txn_hash)
            })
            .await?;

            if let Some(receipt) = receipt {
                let Some(block_number) = receipt.block_number else {
                    continue;
                };

                if receipt.status == Some(U64::zero()) {
                    return Err(Error::Rejected(format!("transaction {txn_hash:?} reverted")));
                }

                return Ok(block_number);
            }

            let known = retry_on_network_failure(move || {
                self.client.eth().transaction(TransactionId::Hash(txn_hash))
            })
            .await?
            .is_some();

            if !known && tokio::time::Instant::now() > deadline {
                return Err(Error::UnknownTransaction(txn_hash));
            }
        }
    }
}

trait IsNetworkFailure {
    fn is_network_failure(&self) -> bool;
}

impl IsNetworkFailure for web3::error::Error {
    fn is_network_failure(&self) -> bool {
        matches!(self, web3::error::Error::Transport(_))
    }
}

impl IsNetworkFailure for web3::contract::Error {
    fn is_network_failure(&self) -> bool {
        matches!(
            self,
            web3::contract::Error::Api(web3::error::Error::Transport(_))
        )
    }
}

/// Retries 4 times for a maximum of 16s.
async fn retry_on_network_failure<T, E: IsNetworkFailure, Fut: Future<Output = Result<T, E>>>(
    f: impl FnOnce() -> Fut + Clone,
) -> Result<T, E> {
    const DELAYS: &[Duration] = &[
        Duration::from_secs(1),
        Duration::from_secs(5),
        Duration::from_secs(10),
    ];

    let mut attempts = DELAYS.iter();

    loop {
        let res = (f.clone())().await;

        match (res, attempts.next()) {
            (Err(err), Some(delay)) if err.is_network_failure() => {
                tracing::warn!(delay = ?delay, "network failure, retrying");
                tokio::time::sleep(*delay).await;
            }
            (res, _) => return res,
        }
    }
}
