//! `httpdoer`: send one declaratively described request from the command line.
//!
//! ```text
//! httpdoer -X POST --json -d name=ada -H "X-Trace: 1" http://localhost:8080/users
//! ```
//!
//! Ctrl+C cancels the in-flight send; the failure is reported like any other
//! send error.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use httpdoer::config::{load_config, ClientConfig};
use httpdoer::format::content_type;
use httpdoer::observability::init_logging;
use httpdoer::transport::Engine;
use httpdoer::{CancelSource, CookieMode, HyperEngine, Request, Response, TransportClient};

#[derive(Parser)]
#[command(name = "httpdoer")]
#[command(about = "Send an HTTP request described by parameters", long_about = None)]
struct Cli {
    /// Target URL; a missing scheme defaults to http://
    url: String,

    /// Request method (unknown verbs are sent as-is)
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Query parameter as name=value (repeatable)
    #[arg(short, long = "query")]
    query: Vec<String>,

    /// Body field as name=value (repeatable)
    #[arg(short, long = "data")]
    data: Vec<String>,

    /// Raw body sent verbatim; overrides --data
    #[arg(long)]
    raw: Option<String>,

    /// Encode body fields as JSON instead of a form
    #[arg(long)]
    json: bool,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Do not read or update the cookie jar
    #[arg(long)]
    no_cookies: bool,

    /// Print status line and response headers
    #[arg(short, long)]
    include: bool,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network engine
    #[arg(long, value_enum, default_value_t = EngineKind::Reqwest)]
    engine: EngineKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineKind {
    Reqwest,
    Hyper,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    init_logging(&config.observability)?;

    tracing::info!(engine = ?cli.engine, "httpdoer starting");

    let response = match cli.engine {
        EngineKind::Reqwest => {
            let client = TransportClient::new(&config)?;
            run(&client, &cli).await?
        }
        EngineKind::Hyper => {
            let engine = HyperEngine::new(&config.transport);
            let client = TransportClient::with_engine(engine, config.request.clone());
            run(&client, &cli).await?
        }
    };

    if cli.include {
        println!(
            "{} {} {}",
            response.version(),
            response.status_code(),
            response.status_text()
        );
        for (name, value) in response.headers() {
            println!("{name}: {value}");
        }
        println!();
    }
    println!("{}", response.text());

    match response.into_result() {
        Ok(_) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

async fn run<E: Engine>(
    client: &TransportClient<E>,
    cli: &Cli,
) -> Result<Response, Box<dyn std::error::Error>> {
    let mut request = build_request(client, cli)?;

    let source = CancelSource::new();
    let cancel = source.token();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Ctrl+C received, cancelling request");
            source.cancel();
        }
    });

    let response = client.send(&mut request, &cancel).await;
    watcher.abort();
    Ok(response)
}

fn build_request<E: Engine>(
    client: &TransportClient<E>,
    cli: &Cli,
) -> Result<Request, Box<dyn std::error::Error>> {
    let mut request = client.request(&cli.url)?;
    request.set_http_method(&cli.method);

    if let Some(timeout_ms) = cli.timeout_ms {
        request.set_timeout(Duration::from_millis(timeout_ms));
    }
    if cli.no_cookies {
        request.set_cookie_mode(CookieMode::Disabled);
    }

    for header in &cli.headers {
        let (name, value) = split_pair(header, ':')?;
        request.headers_mut().set(name, value);
    }
    for pair in &cli.query {
        let (name, value) = split_pair(pair, '=')?;
        request.query_mut().set(name, value);
    }

    if cli.json {
        request.body_mut().set_content_type(content_type::JSON);
    }
    for pair in &cli.data {
        let (name, value) = split_pair(pair, '=')?;
        request.body_mut().set(name, value);
    }
    if let Some(raw) = &cli.raw {
        request.body_mut().set_raw(raw.clone().into_bytes());
    }

    Ok(request)
}

fn split_pair(text: &str, separator: char) -> Result<(String, String), String> {
    match text.split_once(separator) {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected 'name{separator}value', got '{text}'")),
    }
}
