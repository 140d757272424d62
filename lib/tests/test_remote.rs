use oxigraph::model::NamedNode;
use rdfexplore::{EndpointConfig, Node, RemoteError, SparqlClient};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

struct Reply {
    status: &'static str,
    content_type: &'static str,
    body: String,
}

impl Reply {
    fn ok(content_type: &'static str, body: &str) -> Self {
        Reply {
            status: "200 OK",
            content_type,
            body: body.to_string(),
        }
    }
}

/// Reads one HTTP request (head and body) off the stream.
fn read_request(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut head = String::new();
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
        let end = line == "\r\n" || line.is_empty();
        head.push_str(&line);
        if end {
            break;
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).unwrap();
    head + &String::from_utf8(body).unwrap()
}

/// Serves one reply per connection, in order, and hands back the requests seen.
/// A `None` reply closes the connection without answering.
fn serve(replies: Vec<Option<Reply>>) -> (EndpointConfig, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for reply in replies {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_request(&mut stream));
            if let Some(reply) = reply {
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.status,
                    reply.content_type,
                    reply.body.len(),
                    reply.body
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        }
        requests
    });
    let mut config = EndpointConfig::new(format!("http://{}/ds", addr));
    config.timeout_secs = 5;
    config.max_retries = 0;
    (config, handle)
}

/// An endpoint nobody listens on.
fn closed_endpoint() -> EndpointConfig {
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let mut config = EndpointConfig::new(format!("http://127.0.0.1:{}/ds", port));
    config.timeout_secs = 5;
    config.max_retries = 0;
    config
}

const RESULTS: &str = r#"{"head": {"vars": ["patient", "therapy"]},
 "results": {"bindings": [
   {"patient": {"type": "uri", "value": "http://mre.zcu.cz/id/patient1"},
    "therapy": {"type": "uri", "value": "http://mre.zcu.cz/id/therapy1"}}
 ]}}"#;

const SELECT: &str = "PREFIX ibd: <http://mre.zcu.cz/ontology/ibd.owl#> \
                      SELECT ?patient ?therapy WHERE { ?patient ibd:hasTherapy ?therapy . }";

#[test]
fn test_select() {
    let (config, server) = serve(vec![Some(Reply::ok(
        "application/sparql-results+json",
        RESULTS,
    ))]);
    let client = SparqlClient::new(config).unwrap();
    let rows = client.select(SELECT).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("therapy"),
        Some(&Node::iri("http://mre.zcu.cz/id/therapy1").unwrap())
    );

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("POST /ds/query "));
    assert!(requests[0]
        .to_ascii_lowercase()
        .contains("accept: application/sparql-results+json"));
    assert!(requests[0].contains("query=PREFIX"));
}

#[test]
fn test_construct_around_root() {
    let body = "<http://mre.zcu.cz/id/patient1> <http://mre.zcu.cz/ontology/ibd.owl#hasInflammatoryBowelDisease> <http://mre.zcu.cz/id/ibd1> .\n\
                <http://mre.zcu.cz/id/ibd1> <http://mre.zcu.cz/ontology/ibd.owl#hasTherapy> <http://mre.zcu.cz/id/therapy1> .\n";
    let (config, server) = serve(vec![Some(Reply::ok("application/n-triples", body))]);
    let client = SparqlClient::new(config).unwrap();
    let root = NamedNode::new("http://mre.zcu.cz/id/patient1").unwrap();
    let graph = client.construct_around(&root, 2).unwrap();
    assert_eq!(graph.len(), 2);

    let requests = server.join().unwrap();
    assert!(requests[0].contains("query=CONSTRUCT"));
}

#[test]
fn test_update() {
    let (config, server) = serve(vec![Some(Reply::ok("text/plain", ""))]);
    let client = SparqlClient::new(config).unwrap();
    let applied = client
        .update(
            "PREFIX ibd: <http://mre.zcu.cz/ontology/ibd.owl#> \
             DELETE { ?ibd ibd:hasTherapy ?t } INSERT { ?p ibd:hasTherapy ?t } \
             WHERE { ?p ibd:hasInflammatoryBowelDisease ?ibd . ?ibd ibd:hasTherapy ?t }",
        )
        .unwrap();
    assert!(applied);
    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("POST /ds/update "));
    assert!(requests[0].contains("update=PREFIX"));
}

#[test]
fn test_malformed_text_is_not_a_transport_error() {
    // nothing listens here, so any request sent would fail
    let client = SparqlClient::new(closed_endpoint()).unwrap();

    assert_eq!(client.update("DELETE { ?s ?p }").unwrap(), false);

    let err = client.select("SELEC ?s WHERE { ?s ?p ?o }").unwrap_err();
    assert!(err.is_malformed_query());

    let err = client.select("ASK { ?s ?p ?o }").unwrap_err();
    assert!(err.is_malformed_query());

    let err = client.construct(SELECT).unwrap_err();
    assert!(err.is_malformed_query());
}

#[test]
fn test_transport_failure() {
    let client = SparqlClient::new(closed_endpoint()).unwrap();
    let err = client.select(SELECT).unwrap_err();
    assert!(matches!(err, RemoteError::Transport { .. }), "{:?}", err);
    assert!(!err.is_malformed_query());

    let err = client.update("CLEAR DEFAULT").unwrap_err();
    assert!(matches!(err, RemoteError::Transport { .. }));
}

#[test]
fn test_endpoint_error_status() {
    let (config, server) = serve(vec![Some(Reply {
        status: "500 Internal Server Error",
        content_type: "text/plain",
        body: "dataset offline".to_string(),
    })]);
    let client = SparqlClient::new(config).unwrap();
    match client.select(SELECT) {
        Err(RemoteError::Endpoint { status, body, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "dataset offline");
        }
        other => panic!("expected endpoint error, got {:?}", other),
    }
    server.join().unwrap();
}

#[test]
fn test_reads_are_retried() {
    let (mut config, server) = serve(vec![
        None,
        Some(Reply::ok("application/sparql-results+json", RESULTS)),
    ]);
    config.max_retries = 1;
    let client = SparqlClient::new(config).unwrap();
    assert_eq!(client.select(SELECT).unwrap().len(), 1);
    assert_eq!(server.join().unwrap().len(), 2);
}
