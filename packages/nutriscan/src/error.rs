use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Document {path} could not be read: {source}")]
    Document { path: String, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Service base url {url} is not a valid http(s) address")]
    InvalidBaseUrl { url: String },

    #[error("Invalid value {value} for configuration parameter {name}")]
    InvalidParameter { name: String, value: String },

    #[error("Missing field {name} from configuration file or environment")]
    MissingParameter { name: String },

    #[error("Service timeout must be greater than zero")]
    ZeroTimeout,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    FileOrEnvironment(#[from] config::ConfigError),
}

///
/// Every way a single submission can end without a result.
///
/// Transport failures, service rejections and unreadable bodies are classified
/// once, at the point the response is received.
///
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("Cannot connect to the analysis service at {endpoint}: {reason}")]
    NetworkUnavailable { endpoint: String, reason: String },

    #[error("{message}")]
    ServerRejected { status: u16, message: String },

    #[error("The analysis service returned an unreadable response: {reason}")]
    MalformedResponse { reason: String },

    #[error(transparent)]
    InvalidProfile(#[from] ProfileError),

    #[error("Submission was replaced by a newer request")]
    Superseded,

    #[error("Submission was cancelled before it completed")]
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Age must be a positive whole number of years")]
    InvalidAge,

    #[error("Height {value} cm must be a positive, finite number")]
    InvalidHeight { value: f64 },

    #[error("Weight {value} kg must be a positive, finite number")]
    InvalidWeight { value: f64 },

    #[error("Unknown {field} value {value}")]
    UnknownValue { field: &'static str, value: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Could not reach {endpoint}: {reason}")]
pub struct TransportError {
    pub endpoint: String,
    pub reason: String,
}

impl From<TransportError> for SubmissionError {
    fn from(e: TransportError) -> Self {
        SubmissionError::NetworkUnavailable {
            endpoint: e.endpoint,
            reason: e.reason,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.into())
    }
}

impl From<ProfileError> for Error {
    fn from(e: ProfileError) -> Self {
        Error::Submission(e.into())
    }
}

impl Error {
    ///
    /// Process exit code for the error, following sysexits conventions
    ///
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            Error::Config(_) => exitcode::CONFIG,
            Error::Document { .. } | Error::Io(_) => exitcode::IOERR,
            Error::Submission(err) => match err {
                SubmissionError::NetworkUnavailable { .. } => exitcode::UNAVAILABLE,
                SubmissionError::MalformedResponse { .. } => exitcode::PROTOCOL,
                SubmissionError::ServerRejected { .. } | SubmissionError::InvalidProfile(_) => {
                    exitcode::DATAERR
                }
                SubmissionError::Superseded | SubmissionError::Cancelled => exitcode::TEMPFAIL,
            },
        }
    }
}

impl SubmissionError {
    ///
    /// Short label used for metrics and structured logs
    ///
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::NetworkUnavailable { .. } => "network_unavailable",
            SubmissionError::ServerRejected { .. } => "server_rejected",
            SubmissionError::MalformedResponse { .. } => "malformed_response",
            SubmissionError::InvalidProfile(_) => "invalid_profile",
            SubmissionError::Superseded => "superseded",
            SubmissionError::Cancelled => "cancelled",
        }
    }
}
