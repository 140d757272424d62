//! In-memory RDF graph exploration.
//!
//! A [`Graph`] holds [`Statement`]s indexed by subject, predicate and object.
//! On top of pattern lookups it offers filtered selection, type discovery,
//! depth-bounded sub-graph extraction, cycle-safe traversal and guarded
//! updates. [`codec`] moves graphs in and out of the textual RDF syntaxes and
//! [`remote::SparqlClient`] talks to a SPARQL endpoint.

pub mod codec;
pub mod config;
pub mod construct;
pub mod consts;
pub mod dates;
pub mod describe;
pub mod discovery;
pub mod errors;
pub mod graph;
pub mod namespace;
pub mod node;
pub mod query;
pub mod remote;
pub mod selector;
pub mod traverse;
pub mod update;

pub use crate::codec::Syntax;
pub use crate::config::EndpointConfig;
pub use crate::describe::PropertyInfo;
pub use crate::discovery::TypeGroup;
pub use crate::errors::{
    CodecError, RemoteError, StatementError, UpdateRenderError, ValueLookupError,
};
pub use crate::graph::{Graph, Matches, Pattern};
pub use crate::namespace::Namespaces;
pub use crate::node::{Node, Statement};
pub use crate::remote::{Bindings, SparqlClient};
pub use crate::selector::StatementFilter;
pub use crate::traverse::{render_hierarchy, TraversalEntry};
pub use crate::update::GraphUpdate;

/// Initializes logging for the rdfexplore library.
///
/// If `RDFEXPLORE_LOG` is set, `RUST_LOG` is set to its value, so it takes
/// precedence over `RUST_LOG`. The logger itself (e.g. `env_logger::init()`)
/// must be initialized after this call for the level to take effect.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("RDFEXPLORE_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}
