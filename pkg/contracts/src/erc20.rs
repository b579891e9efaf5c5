use crate::error::Result;
use crate::Client;
use web3::{
    contract::{tokens::Tokenize, Contract},
    signing::{Key, SecretKey, SecretKeyRef},
    transports::Http,
    types::{Address, H256, U256},
};

/// An ERC20 token the pool pulls deposits from
#[derive(Clone, Debug)]
pub struct Erc20Contract {
    client: Client,
    contract: Contract<Http>,
    signer: SecretKey,
    signer_address: Address,
}

impl Erc20Contract {
    pub fn new(client: Client, contract: Contract<Http>, signer: SecretKey) -> Self {
        let signer_address = Key::address(&SecretKeyRef::new(&signer));

        Self {
            client,
            contract,
            signer,
            signer_address,
        }
    }

    pub fn load(client: Client, token: Address, signer: SecretKey) -> Result<Self> {
        let contract_json = include_str!("../abi/Erc20.json");
        let contract = client.load_contract(token, contract_json)?;

        Ok(Self::new(client, contract, signer))
    }

    pub fn address(&self) -> Address {
        self.contract.address()
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

    #[tracing::instrument(err, ret, skip(self))]
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        let allowance = self
            .client
            .query(
                &self.contract,
                "allowance",
                (owner, spender),
                None,
                Default::default(),
                None,
            )
            .await?;

        Ok(allowance)
    }

    /// Let `spender` move any amount of the signer's tokens
    #[tracing::instrument(err, ret, skip(self))]
    pub async fn approve_max(&self, spender: Address) -> Result<H256> {
        self.call("approve", (spender, U256::MAX)).await
    }

    /// Approve `spender` for everything if its allowance is below `amount`
    ///
    /// Returns the approval transaction, or `None` if the allowance already covers `amount`.
    #[tracing::instrument(err, skip(self))]
    pub async fn ensure_allowance(&self, spender: Address, amount: U256) -> Result<Option<H256>> {
        if self.allowance(self.signer_address, spender).await? >= amount {
            return Ok(None);
        }

        tracing::info!(token = ?self.address(), ?spender, "approving pool to spend token");
        self.approve_max(spender).await.map(Some)
    }
}
