use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("station {0}: insert on a full queue")]
    CapacityViolation(usize),
    #[error("station {0}: consume on an empty queue")]
    EmptyQueue(usize),
    #[error("station {0}: no idle server to engage")]
    ServerUnavailable(usize),
    #[error("stations must not be empty")]
    EmptyStations,
    #[error("station {0}: at least one server is required")]
    NoServers(usize),
    #[error("station {0}: service time must be > 0 (got {1})")]
    InvalidServiceTime(usize, f64),
    #[error("station {0}: malformed working slot [{1}, {2})")]
    InvalidWorkingSlot(usize, f64, f64),
    #[error("station {0}: bounded capacity must be >= 1")]
    InvalidCapacity(usize),
    #[error("station {0}: activation budget must be > 0 (got {1})")]
    InvalidActivationBudget(usize, f64),
    #[error("arrival rate must be > 0 (got {0})")]
    InvalidArrivalRate(f64),
    #[error("simulation horizon must be > 0 (got {0})")]
    InvalidHorizon(f64),
    #[error("invalid arrival profile: {0}")]
    InvalidProfile(String),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
