//! Decoding and encoding graphs in the textual RDF syntaxes.

use crate::errors::CodecError;
use crate::graph::Graph;
use crate::namespace::Namespaces;
use crate::node::Statement;
use log::{debug, info};
use oxigraph::io::{JsonLdProfileSet, RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::Triple;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    Turtle,
    NTriples,
    RdfXml,
    N3,
    JsonLd,
}

impl Syntax {
    pub const ALL: [Syntax; 5] = [
        Syntax::Turtle,
        Syntax::NTriples,
        Syntax::RdfXml,
        Syntax::N3,
        Syntax::JsonLd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Syntax::Turtle => "turtle",
            Syntax::NTriples => "ntriples",
            Syntax::RdfXml => "rdfxml",
            Syntax::N3 => "n3",
            Syntax::JsonLd => "jsonld",
        }
    }

    pub fn media_type(self) -> &'static str {
        self.format().media_type()
    }

    /// Guesses the syntax from a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ttl" => Some(Syntax::Turtle),
            "nt" => Some(Syntax::NTriples),
            "rdf" | "xml" | "owl" => Some(Syntax::RdfXml),
            "n3" => Some(Syntax::N3),
            "jsonld" | "json" => Some(Syntax::JsonLd),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn format(self) -> RdfFormat {
        match self {
            Syntax::Turtle => RdfFormat::Turtle,
            Syntax::NTriples => RdfFormat::NTriples,
            Syntax::RdfXml => RdfFormat::RdfXml,
            Syntax::N3 => RdfFormat::N3,
            Syntax::JsonLd => RdfFormat::JsonLd {
                profile: JsonLdProfileSet::default(),
            },
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Syntax {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(Syntax::Turtle),
            "ntriples" | "n-triples" | "nt" => Ok(Syntax::NTriples),
            "rdfxml" | "rdf/xml" | "xml" => Ok(Syntax::RdfXml),
            "n3" => Ok(Syntax::N3),
            "jsonld" | "json-ld" => Ok(Syntax::JsonLd),
            other => Err(anyhow::anyhow!(
                "Unsupported format '{}'. Use one of: turtle, ntriples, rdfxml, n3, jsonld",
                other
            )),
        }
    }
}

/// Parses a whole document. Nothing is returned unless every statement parses.
pub fn decode(bytes: &[u8], syntax: Syntax) -> Result<Graph, CodecError> {
    let parser = RdfParser::from_format(syntax.format()).for_slice(bytes);
    let mut statements = Vec::new();
    for quad in parser {
        let quad = quad.map_err(|e| CodecError::Parse {
            syntax: syntax.name(),
            message: e.to_string(),
        })?;
        let triple = Triple::new(quad.subject, quad.predicate, quad.object);
        statements.push(Statement::try_from(triple)?);
    }
    debug!("Decoded {} statements of {}", statements.len(), syntax);
    Ok(statements.into_iter().collect())
}

/// Writes `graph` in `syntax`, declaring every prefix of `namespaces` the
/// syntax can carry.
pub fn encode_to<W: Write>(
    graph: &Graph,
    namespaces: &Namespaces,
    syntax: Syntax,
    writer: W,
) -> Result<W, CodecError> {
    let mut serializer = RdfSerializer::from_format(syntax.format());
    for (prefix, namespace) in namespaces.iter() {
        serializer = serializer
            .with_prefix(prefix, namespace)
            .map_err(|e| CodecError::Prefix {
                prefix: prefix.to_string(),
                message: e.to_string(),
            })?;
    }
    let mut serializer = serializer.for_writer(writer);
    for statement in graph.iter() {
        serializer.serialize_triple(&statement.to_triple())?;
    }
    Ok(serializer.finish()?)
}

pub fn encode(graph: &Graph, namespaces: &Namespaces, syntax: Syntax) -> Result<Vec<u8>, CodecError> {
    encode_to(graph, namespaces, syntax, Vec::new())
}

/// Reads a graph from a file, guessing the syntax from the extension and
/// falling back to Turtle.
pub fn read_file(path: &Path) -> Result<Graph, CodecError> {
    let syntax = Syntax::from_path(path).unwrap_or(Syntax::Turtle);
    debug!("Reading file: {} as {}", path.display(), syntax);
    let bytes = std::fs::read(path)?;
    decode(&bytes, syntax)
}

pub fn write_file(
    graph: &Graph,
    namespaces: &Namespaces,
    path: &Path,
    syntax: Syntax,
) -> Result<(), CodecError> {
    info!(
        "Writing graph to file: {} with length {}",
        path.display(),
        graph.len()
    );
    let file = std::fs::File::create(path)?;
    let mut writer = encode_to(graph, namespaces, syntax, std::io::BufWriter::new(file))?;
    writer.flush()?;
    Ok(())
}
