/// Result alias for the shield client
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong in the client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration could not be read
    #[error("config error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Configuration was read but does not fit this build
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A global tracing subscriber was already installed
    #[error("tracing init error: {0}")]
    Tracing(#[from] tracing_subscriber::util::TryInitError),

    /// A note, key or token operation failed
    #[error("note error: {0}")]
    Notes(#[from] notes::Error),

    /// Proof assembly or proving failed
    #[error("prover error: {0}")]
    Prover(#[from] prover::Error),

    /// The observer stopped
    #[error("observer error: {0}")]
    Observer(#[from] observer::Error),

    /// The ledger contract client failed
    #[error("contract error: {0}")]
    Contracts(#[from] contracts::Error),

    /// The ledger rejected or failed a call
    #[error("ledger error: {0}")]
    Ledger(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Summing amounts left the field
    #[error("amounts overflow the field")]
    Overflow,

    /// The account's unspent notes cannot cover the request
    #[error("insufficient funds in slot {slot}")]
    InsufficientFunds {
        /// The first slot that could not be covered
        slot: usize,
    },

    /// The account holds enough, but spread over more notes than one transaction can spend
    #[error("funds in slot {slot} are spread over more than two notes")]
    TooManyInputs {
        /// A slot that no one or two notes cover
        slot: usize,
    },
}

impl From<figment::Error> for Error {
    fn from(error: figment::Error) -> Self {
        Self::Config(Box::new(error))
    }
}

impl Error {
    pub(crate) fn ledger<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::Ledger(Box::new(error))
    }
}
