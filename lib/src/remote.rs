//! Blocking client for a SPARQL 1.1 protocol endpoint.
//!
//! Query and update text is checked locally before anything goes on the
//! wire, so a malformed request is reported as such and never confused with
//! a network or endpoint failure.

use crate::codec::{self, Syntax};
use crate::config::EndpointConfig;
use crate::errors::RemoteError;
use crate::graph::{Graph, Pattern};
use crate::node::Node;
use crate::query;
use log::{debug, info, warn};
use oxigraph::model::{BlankNode, Literal, NamedNode};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use spargebra::{Query, Update};
use std::collections::BTreeMap;
use url::Url;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// One solution of a `SELECT` query: variable name (without `?`) to value.
/// Unbound variables are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(BTreeMap<String, Node>);

impl Bindings {
    pub fn get(&self, variable: &str) -> Option<&Node> {
        self.0.get(variable.trim_start_matches('?'))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Node)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (String, Node)>>(iter: T) -> Self {
        Bindings(iter.into_iter().collect())
    }
}

#[derive(Deserialize)]
struct ResultsDocument {
    results: ResultsBody,
}

#[derive(Deserialize)]
struct ResultsBody {
    bindings: Vec<BTreeMap<String, JsonTerm>>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum JsonTerm {
    Uri {
        value: String,
    },
    Bnode {
        value: String,
    },
    Literal {
        value: String,
        #[serde(rename = "xml:lang")]
        lang: Option<String>,
        datatype: Option<String>,
    },
    // SPARQL 1.0 servers
    TypedLiteral {
        value: String,
        datatype: String,
    },
}

impl JsonTerm {
    fn into_node(self) -> Result<Node, RemoteError> {
        let bad = |e: &dyn std::fmt::Display| RemoteError::Results(e.to_string());
        Ok(match self {
            JsonTerm::Uri { value } => Node::Iri(NamedNode::new(value).map_err(|e| bad(&e))?),
            JsonTerm::Bnode { value } => Node::Blank(BlankNode::new(value).map_err(|e| bad(&e))?),
            JsonTerm::Literal {
                value,
                lang: Some(lang),
                ..
            } => Node::Literal(
                Literal::new_language_tagged_literal(value, lang).map_err(|e| bad(&e))?,
            ),
            JsonTerm::Literal {
                value,
                lang: None,
                datatype: Some(datatype),
            }
            | JsonTerm::TypedLiteral { value, datatype } => Node::Literal(Literal::new_typed_literal(
                value,
                NamedNode::new(datatype).map_err(|e| bad(&e))?,
            )),
            JsonTerm::Literal {
                value,
                lang: None,
                datatype: None,
            } => Node::literal(value),
        })
    }
}

/// Parses a `application/sparql-results+json` document into solutions.
pub fn parse_select_results(bytes: &[u8]) -> Result<Vec<Bindings>, RemoteError> {
    let document: ResultsDocument =
        serde_json::from_slice(bytes).map_err(|e| RemoteError::Results(e.to_string()))?;
    document
        .results
        .bindings
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(var, term)| term.into_node().map(|node| (var, node)))
                .collect()
        })
        .collect()
}

fn malformed(query: &str, error: impl std::fmt::Display) -> RemoteError {
    RemoteError::MalformedQuery {
        query: query.to_string(),
        message: error.to_string(),
    }
}

/// Picks the syntax of a construct response from its `Content-Type`.
fn response_syntax(content_type: Option<&str>) -> Syntax {
    let media_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    media_type
        .and_then(|mt| Syntax::ALL.into_iter().find(|s| s.media_type() == mt))
        .unwrap_or(Syntax::NTriples)
}

pub struct SparqlClient {
    config: EndpointConfig,
    client: Client,
    query_url: Url,
    update_url: Url,
}

impl SparqlClient {
    pub fn new(config: EndpointConfig) -> Result<Self, RemoteError> {
        let query_url = config.query_url()?;
        let update_url = config.update_url()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| RemoteError::Transport {
                url: config.service_url.clone(),
                source,
            })?;
        Ok(SparqlClient {
            config,
            client,
            query_url,
            update_url,
        })
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Runs a `SELECT` query.
    pub fn select(&self, query: &str) -> Result<Vec<Bindings>, RemoteError> {
        match Query::parse(query, None).map_err(|e| malformed(query, e))? {
            Query::Select { .. } => {}
            _ => return Err(malformed(query, "expected a SELECT query")),
        }
        let response = self.send_query(query, SPARQL_RESULTS_JSON)?;
        let body = response.bytes().map_err(|source| RemoteError::Transport {
            url: self.query_url.to_string(),
            source,
        })?;
        let rows = parse_select_results(&body)?;
        debug!("SELECT returned {} rows", rows.len());
        Ok(rows)
    }

    /// Runs a `CONSTRUCT` query and decodes the returned statements.
    pub fn construct(&self, query: &str) -> Result<Graph, RemoteError> {
        match Query::parse(query, None).map_err(|e| malformed(query, e))? {
            Query::Construct { .. } => {}
            _ => return Err(malformed(query, "expected a CONSTRUCT query")),
        }
        let response = self.send_query(query, Syntax::NTriples.media_type())?;
        let syntax = response_syntax(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|h| h.to_str().ok()),
        );
        let body = response.bytes().map_err(|source| RemoteError::Transport {
            url: self.query_url.to_string(),
            source,
        })?;
        let graph = codec::decode(&body, syntax)?;
        debug!("CONSTRUCT returned {} statements", graph.len());
        Ok(graph)
    }

    /// Statements on the endpoint matching `pattern`.
    pub fn statements_for_pattern(&self, pattern: &Pattern) -> Result<Graph, RemoteError> {
        self.construct(&query::pattern_construct_query(pattern))
    }

    /// The neighbourhood of `root` up to `hops` edges away.
    pub fn construct_around(&self, root: &NamedNode, hops: usize) -> Result<Graph, RemoteError> {
        self.construct(&query::construct_query(root, hops))
    }

    /// Runs a SPARQL update.
    ///
    /// Returns `Ok(false)` without contacting the endpoint when the update text
    /// does not parse. Transport and endpoint failures are errors.
    pub fn update(&self, update: &str) -> Result<bool, RemoteError> {
        if let Err(e) = Update::parse(update, None) {
            warn!("invalid query: {}: {}", update, e);
            return Ok(false);
        }
        let url = self.update_url.to_string();
        let response = self
            .client
            .post(self.update_url.clone())
            .form(&[("update", update)])
            .send()
            .map_err(|source| RemoteError::Transport {
                url: url.clone(),
                source,
            })?;
        check_status(&url, response)?;
        info!("Update accepted by {}", url);
        Ok(true)
    }

    /// Posts a query, retrying transport failures up to `max_retries` times.
    fn send_query(&self, query: &str, accept: &str) -> Result<Response, RemoteError> {
        let url = self.query_url.to_string();
        let mut attempt = 0;
        loop {
            let sent = self
                .client
                .post(self.query_url.clone())
                .header(ACCEPT, accept)
                .form(&[("query", query)])
                .send();
            match sent {
                Ok(response) => return check_status(&url, response),
                Err(source) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "Request to {} failed ({}), retry {}/{}",
                        url, source, attempt, self.config.max_retries
                    );
                }
                Err(source) => return Err(RemoteError::Transport { url, source }),
            }
        }
    }
}

fn check_status(url: &str, response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(RemoteError::Endpoint {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = r#"{
      "head": {"vars": ["patient", "label", "born", "n"]},
      "results": {"bindings": [
        {
          "patient": {"type": "uri", "value": "http://mre.zcu.cz/id/p1"},
          "label": {"type": "literal", "value": "Pacient", "xml:lang": "cs"},
          "born": {"type": "literal", "value": "2009-04-12", "datatype": "http://www.w3.org/2001/XMLSchema#date"},
          "n": {"type": "bnode", "value": "b0"}
        },
        {
          "patient": {"type": "uri", "value": "http://mre.zcu.cz/id/p2"},
          "born": {"type": "typed-literal", "value": "1", "datatype": "http://www.w3.org/2001/XMLSchema#integer"}
        }
      ]}
    }"#;

    #[test]
    fn test_parse_select_results() {
        let rows = parse_select_results(RESULTS.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get("?patient"),
            Some(&Node::iri("http://mre.zcu.cz/id/p1").unwrap())
        );
        assert_eq!(
            rows[0].get("label"),
            Some(&Node::lang_literal("Pacient", "cs").unwrap())
        );
        assert_eq!(
            rows[0].get("born"),
            Some(&Node::typed_literal("2009-04-12", crate::consts::XSD_DATE))
        );
        assert!(rows[0].get("n").unwrap().is_blank());
        assert_eq!(rows[1].len(), 2);
        assert!(rows[1].get("label").is_none());
    }

    #[test]
    fn test_bad_results_document() {
        assert!(matches!(
            parse_select_results(b"{\"head\": {}}"),
            Err(RemoteError::Results(_))
        ));
        assert!(matches!(
            parse_select_results(br#"{"results": {"bindings": [{"x": {"type": "uri", "value": "no iri"}}]}}"#),
            Err(RemoteError::Results(_))
        ));
    }

    #[test]
    fn test_response_syntax() {
        assert_eq!(response_syntax(Some("text/turtle; charset=utf-8")), Syntax::Turtle);
        assert_eq!(response_syntax(Some("application/n-triples")), Syntax::NTriples);
        assert_eq!(response_syntax(None), Syntax::NTriples);
    }
}
