//! Error types surfaced by the engine, the codec boundary and the remote client.

use crate::node::Node;
use thiserror::Error;

/// A statement could not be built from the supplied terms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    #[error("literal {0} cannot be the subject of a statement")]
    LiteralSubject(String),

    #[error("unsupported term: {0}")]
    UnsupportedTerm(String),
}

/// Asking for "the" value of a property found zero or several values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueLookupError {
    #[error("{subject} has no value for {predicate}")]
    Missing { subject: String, predicate: String },

    #[error("{subject} has {} values for {predicate}", values.len())]
    Ambiguous {
        subject: String,
        predicate: String,
        values: Vec<Node>,
    },
}

/// A local update that cannot be written as SPARQL Update text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateRenderError {
    #[error("blank node {0} in an update template is not matched by any condition pattern")]
    UnboundBlankNode(String),
}

/// Failure to turn bytes into a graph or a graph into bytes.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to parse {syntax} input: {message}")]
    Parse {
        syntax: &'static str,
        message: String,
    },

    #[error("invalid namespace for prefix '{prefix}': {message}")]
    Prefix { prefix: String, message: String },

    #[error(transparent)]
    Statement(#[from] StatementError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure reported by the SPARQL endpoint client.
///
/// `MalformedQuery` is raised before anything is sent over the wire and is the
/// only variant that says nothing about the state of the endpoint.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("invalid query: {message}")]
    MalformedQuery { query: String, message: String },

    #[error("invalid endpoint url '{url}': {message}")]
    InvalidEndpoint { url: String, message: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("endpoint {url} answered {status}: {body}")]
    Endpoint { url: String, status: u16, body: String },

    #[error("malformed result document: {0}")]
    Results(String),

    #[error(transparent)]
    Decode(#[from] CodecError),
}

impl RemoteError {
    pub fn is_malformed_query(&self) -> bool {
        matches!(self, RemoteError::MalformedQuery { .. })
    }
}
