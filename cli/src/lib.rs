use anyhow::{anyhow, Error, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::info;
use oxigraph::model::NamedNode;
use rdfexplore::codec::{self, Syntax};
use rdfexplore::consts::TYPE;
use rdfexplore::dates::resources_by_age;
use rdfexplore::query::construct_query;
use rdfexplore::selector::{LiteralLanguage, ObjectContains, ObjectExcludes, StatementFilter};
use rdfexplore::{
    render_hierarchy, EndpointConfig, Graph, Namespaces, Node, PropertyInfo, SparqlClient,
};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

const ENDPOINT_ENV: &str = "RDFEXPLORE_ENDPOINT";

#[derive(Debug, Parser)]
#[command(name = "rdfexplore")]
#[command(about = "Explore RDF graphs and talk to SPARQL endpoints")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
    /// Extra namespace prefixes as PREFIX=IRI, used to shorten and expand names
    #[clap(long = "prefix", short = 'p', global = true)]
    prefixes: Vec<String>,
    /// Write output to this file instead of stdout
    #[clap(long, short, global = true)]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum RemoteCommands {
    /// Run a SELECT query and print the solutions as JSON
    Select {
        /// Query text, or @FILE to read it from a file
        query: String,
    },
    /// Run a CONSTRUCT query and print the resulting graph
    Construct {
        /// Query text, or @FILE to read it from a file
        query: String,
        /// Serialization format: one of [turtle, ntriples, rdfxml, n3, jsonld] (default: turtle)
        #[clap(long, short = 't')]
        to: Option<String>,
    },
    /// Fetch the neighbourhood of a root resource
    ConstructRoot {
        /// IRI (or prefixed name) of the root resource
        root: String,
        /// Maximum number of edges away from the root
        #[clap(long, default_value = "2")]
        hops: usize,
        /// Only print the generated query
        #[clap(long, action, default_value = "false")]
        dry_run: bool,
        /// Serialization format: one of [turtle, ntriples, rdfxml, n3, jsonld] (default: turtle)
        #[clap(long, short = 't')]
        to: Option<String>,
    },
    /// Run a SPARQL update
    Update {
        /// Update text, or @FILE to read it from a file
        update: String,
    },
    /// Print the endpoint configuration, optionally saving it to a file
    Config {
        /// Save the configuration as JSON to this file
        #[clap(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints the version of the rdfexplore binary
    Version,
    /// Re-serialize a graph in another format
    Convert {
        /// Input file; the format is guessed from the extension
        input: PathBuf,
        /// Serialization format: one of [turtle, ntriples, rdfxml, n3, jsonld] (default: turtle)
        #[clap(long, short = 't')]
        to: Option<String>,
        /// Do not declare any namespace prefixes in the output
        #[clap(long, action, default_value = "false")]
        no_prefixes: bool,
    },
    /// List every type used in a graph with the resources carrying it
    Types {
        input: PathBuf,
        /// Classifying property (default: rdf:type)
        #[clap(long)]
        predicate: Option<String>,
        /// Output JSON instead of text
        #[clap(long, action, default_value = "false")]
        json: bool,
    },
    /// Print the statements matching a pattern
    Select {
        input: PathBuf,
        #[clap(long, short)]
        subject: Option<String>,
        #[clap(long = "predicate", short = 'P')]
        predicate: Option<String>,
        /// Object node: an IRI, a prefixed name, _:id or "literal"
        #[clap(long = "object", short = 'O')]
        object: Option<String>,
        /// Keep statements whose object contains this text (case-insensitive)
        #[clap(long)]
        contains: Option<String>,
        /// Drop statements whose object contains this text (case-insensitive)
        #[clap(long)]
        exclude_substring: Option<String>,
        /// Keep literal objects with this language tag
        #[clap(long)]
        language: Option<String>,
    },
    /// Print the data hanging off a resource as an indented hierarchy
    Traverse {
        input: PathBuf,
        /// IRI (or prefixed name) of the root resource
        root: String,
    },
    /// Extract the statements within a number of edges of a resource
    Construct {
        input: PathBuf,
        /// IRI (or prefixed name) of the root resource
        root: String,
        /// Maximum number of edges away from the root
        #[clap(long, default_value = "2")]
        hops: usize,
        /// Serialization format: one of [turtle, ntriples, rdfxml, n3, jsonld] (default: turtle)
        #[clap(long, short = 't')]
        to: Option<String>,
    },
    /// List resources of a type sorted by age, youngest first
    Ages {
        input: PathBuf,
        /// Property holding the ISO birth date
        #[clap(long)]
        birth_predicate: String,
        /// Only consider resources of this type
        #[clap(long = "type")]
        type_: Option<String>,
        /// Reference date as YYYY-MM-DD (default: today)
        #[clap(long)]
        today: Option<String>,
    },
    /// Print the labels, domain, range and types of a property
    Describe {
        /// Ontology file
        input: PathBuf,
        /// IRI (or prefixed name) of the property
        property: String,
        /// Only print labels in this language
        #[clap(long)]
        language: Option<String>,
        /// Output JSON instead of text
        #[clap(long, action, default_value = "false")]
        json: bool,
    },
    /// Talk to a SPARQL endpoint
    Remote {
        /// Endpoint dataset URL; falls back to the RDFEXPLORE_ENDPOINT environment variable
        #[clap(long, short)]
        endpoint: Option<String>,
        /// JSON endpoint configuration file
        #[clap(long)]
        config: Option<PathBuf>,
        #[command(subcommand)]
        command: RemoteCommands,
    },
}

pub fn run() -> Result<()> {
    rdfexplore::init_logging();
    let cmd = Cli::parse();
    execute(cmd)
}

pub fn run_from_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    rdfexplore::init_logging();
    let cmd = Cli::try_parse_from(args).map_err(Error::from)?;
    execute(cmd)
}

fn execute(cmd: Cli) -> Result<()> {
    // The RUST_LOG env var is set by `init_logging` if RDFEXPLORE_LOG is present.
    // CLI flags for verbosity take precedence. If nothing is set, we default to "warn".
    if cmd.debug {
        std::env::set_var("RUST_LOG", "debug");
    } else if cmd.verbose {
        std::env::set_var("RUST_LOG", "info");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    let _ = env_logger::try_init();

    let namespaces = build_namespaces(&cmd.prefixes)?;
    let output = cmd.output.as_deref();

    match cmd.command {
        Commands::Version => {
            emit(output, &format!("rdfexplore {}\n", env!("CARGO_PKG_VERSION")))?;
        }
        Commands::Convert {
            input,
            to,
            no_prefixes,
        } => {
            let graph = codec::read_file(&input)?;
            let syntax = parse_syntax(to.as_deref())?;
            let prefixes = if no_prefixes {
                Namespaces::empty()
            } else {
                namespaces
            };
            write_graph(&graph, &prefixes, syntax, output)?;
        }
        Commands::Types {
            input,
            predicate,
            json,
        } => {
            let graph = codec::read_file(&input)?;
            let predicate = match predicate {
                Some(p) => namespaces.expand(&p)?,
                None => TYPE.into_owned(),
            };
            let inventory = graph.type_inventory(&predicate);
            let text = if json {
                let value: Vec<serde_json::Value> = inventory
                    .iter()
                    .map(|group| {
                        serde_json::json!({
                            "type": group.type_node.lexical_form(),
                            "resources": group
                                .resources
                                .iter()
                                .map(|r| r.lexical_form())
                                .collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                serde_json::to_string_pretty(&value)? + "\n"
            } else {
                let mut text = String::new();
                for group in &inventory {
                    text.push_str(&format!(
                        "({}) {}\n",
                        group.resources.len(),
                        namespaces.display_name(&group.type_node)
                    ));
                    for resource in &group.resources {
                        text.push_str(&format!("++  {}\n", namespaces.display_name(resource)));
                    }
                }
                text
            };
            emit(output, &text)?;
        }
        Commands::Select {
            input,
            subject,
            predicate,
            object,
            contains,
            exclude_substring,
            language,
        } => {
            let graph = codec::read_file(&input)?;
            let subject = subject.map(|s| parse_node(&s, &namespaces)).transpose()?;
            let predicate = predicate.map(|p| namespaces.expand(&p)).transpose()?;
            let object = object.map(|o| parse_node(&o, &namespaces)).transpose()?;
            let filter = OptionalFilters {
                contains: contains.as_deref().map(ObjectContains::new),
                excludes: exclude_substring.as_deref().map(ObjectExcludes::new),
                language: language.as_deref().map(LiteralLanguage::new),
            };
            let mut text = String::new();
            for statement in graph.select(
                subject.as_ref(),
                predicate.as_ref(),
                object.as_ref(),
                filter,
            ) {
                text.push_str(&statement.to_string());
                text.push('\n');
            }
            emit(output, &text)?;
        }
        Commands::Traverse { input, root } => {
            let graph = codec::read_file(&input)?;
            let root = Node::Iri(namespaces.expand(&root)?);
            let entries = graph.traverse(&root);
            info!("Traversal from {} reached {} entries", root, entries.len());
            emit(output, &render_hierarchy(&entries, &namespaces))?;
        }
        Commands::Construct {
            input,
            root,
            hops,
            to,
        } => {
            let graph = codec::read_file(&input)?;
            let root = Node::Iri(namespaces.expand(&root)?);
            let subgraph = graph.extract_subgraph(&root, hops);
            info!("Extracted {} statements around {}", subgraph.len(), root);
            write_graph(&subgraph, &namespaces, parse_syntax(to.as_deref())?, output)?;
        }
        Commands::Ages {
            input,
            birth_predicate,
            type_,
            today,
        } => {
            let graph = codec::read_file(&input)?;
            let birth = namespaces.expand(&birth_predicate)?;
            let resources = match type_ {
                Some(t) => graph.resources_of_type(&TYPE.into_owned(), &Node::Iri(namespaces.expand(&t)?)),
                None => graph.resources_with_property(&birth),
            };
            let today = match today {
                Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .map_err(|e| anyhow!("Invalid date '{}': {}", d, e))?,
                None => Local::now().date_naive(),
            };
            let mut text = String::new();
            for (resource, age) in resources_by_age(&graph, &resources, &birth, today) {
                text.push_str(&format!("{:.2}\t{}\n", age, namespaces.display_name(&resource)));
            }
            emit(output, &text)?;
        }
        Commands::Describe {
            input,
            property,
            language,
            json,
        } => {
            let graph = codec::read_file(&input)?;
            let property = namespaces.expand(&property)?;
            let info = PropertyInfo::describe(&graph, &property);
            if info.is_empty() {
                return Err(anyhow!("Nothing is known about {}", property));
            }
            let text = match (json, language) {
                (true, _) => serde_json::to_string_pretty(&info.summary())? + "\n",
                (false, Some(lang)) => info
                    .labels_in(&lang)
                    .map(|l| format!("{}\n", l))
                    .collect(),
                (false, None) => info.render(&namespaces),
            };
            emit(output, &text)?;
        }
        Commands::Remote {
            endpoint,
            config,
            command,
        } => {
            let config = endpoint_config(endpoint, config.as_deref())?;
            handle_remote_command(command, config, &namespaces, output)?;
        }
    }

    Ok(())
}

fn handle_remote_command(
    command: RemoteCommands,
    config: EndpointConfig,
    namespaces: &Namespaces,
    output: Option<&Path>,
) -> Result<()> {
    if let RemoteCommands::Config { save } = &command {
        config.print();
        if let Some(path) = save {
            config.save_to_file(path)?;
            println!("Saved endpoint configuration to {}", path.display());
        }
        return Ok(());
    }
    if let RemoteCommands::ConstructRoot {
        root,
        hops,
        dry_run: true,
        ..
    } = &command
    {
        let root = namespaces.expand(root)?;
        return emit(output, &format!("{}\n", construct_query(&root, *hops)));
    }

    let client = SparqlClient::new(config)?;
    match command {
        RemoteCommands::Select { query } => {
            let rows = client.select(&read_text_arg(&query)?)?;
            let value: Vec<serde_json::Map<String, serde_json::Value>> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(var, node)| (var.to_string(), serde_json::Value::from(node.to_string())))
                        .collect()
                })
                .collect();
            emit(output, &(serde_json::to_string_pretty(&value)? + "\n"))?;
        }
        RemoteCommands::Construct { query, to } => {
            let graph = client.construct(&read_text_arg(&query)?)?;
            write_graph(&graph, namespaces, parse_syntax(to.as_deref())?, output)?;
        }
        RemoteCommands::ConstructRoot { root, hops, to, .. } => {
            let graph = client.construct_around(&namespaces.expand(&root)?, hops)?;
            write_graph(&graph, namespaces, parse_syntax(to.as_deref())?, output)?;
        }
        RemoteCommands::Update { update } => {
            let text = read_text_arg(&update)?;
            if !client.update(&text)? {
                return Err(anyhow!("Invalid update, nothing was sent: {}", text));
            }
            println!("Update applied.");
        }
        RemoteCommands::Config { .. } => {
            // handled above
        }
    }
    Ok(())
}

/// The object filters given on the command line; absent ones accept everything.
struct OptionalFilters {
    contains: Option<ObjectContains>,
    excludes: Option<ObjectExcludes>,
    language: Option<LiteralLanguage>,
}

impl StatementFilter for OptionalFilters {
    fn accept(&self, statement: &rdfexplore::Statement) -> bool {
        self.contains.as_ref().map_or(true, |f| f.accept(statement))
            && self.excludes.as_ref().map_or(true, |f| f.accept(statement))
            && self.language.as_ref().map_or(true, |f| f.accept(statement))
    }
}

fn build_namespaces(prefixes: &[String]) -> Result<Namespaces> {
    let mut namespaces = Namespaces::new();
    for binding in prefixes {
        let (prefix, iri) = binding
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid prefix '{}', expected PREFIX=IRI", binding))?;
        NamedNode::new(iri).map_err(|e| anyhow!("Invalid namespace IRI '{}': {}", iri, e))?;
        namespaces.add_prefix(prefix, iri);
    }
    Ok(namespaces)
}

/// `"text"` is a literal, `_:id` a blank node, anything else an IRI or prefixed name.
fn parse_node(text: &str, namespaces: &Namespaces) -> Result<Node> {
    if let Some(value) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        return Ok(Node::literal(value));
    }
    if let Some(id) = text.strip_prefix("_:") {
        return Node::blank(id);
    }
    Ok(Node::Iri(namespaces.expand(text)?))
}

fn parse_syntax(name: Option<&str>) -> Result<Syntax> {
    name.map_or(Ok(Syntax::Turtle), str::parse)
}

fn endpoint_config(endpoint: Option<String>, file: Option<&Path>) -> Result<EndpointConfig> {
    let mut config = match file {
        Some(path) => Some(EndpointConfig::from_file(path)?),
        None => None,
    };
    let endpoint = endpoint.or_else(|| std::env::var(ENDPOINT_ENV).ok());
    match (config.as_mut(), endpoint) {
        (Some(config), Some(url)) => config.service_url = url,
        (None, Some(url)) => config = Some(EndpointConfig::new(url)),
        (Some(_), None) => {}
        (None, None) => {
            return Err(anyhow!(
                "No endpoint given. Use --endpoint, --config or set {}.",
                ENDPOINT_ENV
            ))
        }
    }
    config.ok_or_else(|| anyhow!("No endpoint configuration"))
}

fn read_text_arg(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(arg.to_string()),
    }
}

fn write_graph(
    graph: &Graph,
    namespaces: &Namespaces,
    syntax: Syntax,
    output: Option<&Path>,
) -> Result<()> {
    match output {
        Some(path) => codec::write_file(graph, namespaces, path, syntax)?,
        None => {
            let stdout = std::io::stdout();
            let handle = stdout.lock();
            codec::encode_to(graph, namespaces, syntax, handle)?;
        }
    }
    Ok(())
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(text.as_bytes())?;
        }
    }
    Ok(())
}
