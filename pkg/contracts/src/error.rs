use ethereum_types::H256;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown transaction: {0}")]
    UnknownTransaction(H256),

    #[error("ledger rejected the call: {0}")]
    Rejected(String),

    #[error("malformed note event: {0}")]
    MalformedEvent(String),

    #[error("contract json has no abi")]
    MissingAbi,

    #[error("web3 error")]
    Web3(#[from] web3::Error),

    #[error("web3 contract error")]
    Web3Contract(#[from] web3::contract::Error),

    #[error("abi error")]
    Abi(#[from] web3::ethabi::Error),

    #[error("note error")]
    Notes(#[from] notes::Error),

    #[error("serde_json error")]
    SerdeJson(#[from] serde_json::Error),

    #[error("from hex error")]
    FromHex(#[from] rustc_hex::FromHexError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// The node's message, if this is an RPC error caused by a revert
    pub fn revert_reason(&self) -> Option<&str> {
        let rpc = match self {
            Error::Web3(web3::Error::Rpc(rpc))
            | Error::Web3Contract(web3::contract::Error::Api(web3::Error::Rpc(rpc))) => rpc,
            _ => return None,
        };

        rpc.message
            .contains("revert")
            .then_some(rpc.message.as_str())
    }

    /// Turn revert errors into [`Error::Rejected`], leaving others untouched
    pub(crate) fn into_rejection(self) -> Self {
        if let Some(reason) = self.revert_reason().map(str::to_owned) {
            return Error::Rejected(reason);
        }

        self
    }
}
