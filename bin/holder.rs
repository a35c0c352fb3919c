//! Command-line search session
//!
//! Drives a [`Holder`] against a live endpoint from the terminal: runs the
//! initial load, optionally adds a free-text query, and prints what the
//! text renderer produced.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use holder::{
    AddInput, Holder, HolderConfig, HttpTransport, Method, NoopHistory, Operator, TextRenderer,
};

#[derive(Parser, Debug)]
#[command(name = "holder", version, about = "Run a search session from the command line")]
struct Args {
    /// Search endpoint
    #[arg(long, default_value = "http://localhost:9200/_search")]
    url: String,

    /// Free-text query to add after the initial load
    #[arg(long)]
    query: Option<String>,

    /// Page size
    #[arg(long, default_value_t = 10)]
    size: u64,

    /// Use POST with a JSON body instead of GET with a source parameter
    #[arg(long)]
    post: bool,

    /// Default boolean operator for free text (AND or OR)
    #[arg(long, default_value = "AND")]
    operator: String,

    /// Disable wildcard fuzzification of bare terms
    #[arg(long)]
    no_fuzzify: bool,

    /// Label for the result-count summary
    #[arg(long, default_value = "results")]
    what: String,

    /// Basic-auth username
    #[arg(long)]
    username: Option<String>,

    /// Basic-auth password
    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let operator = match args.operator.to_ascii_uppercase().as_str() {
        "OR" => Operator::Or,
        _ => Operator::And,
    };
    let mut config = HolderConfig::new(&args.url)
        .with_what(&args.what)
        .with_size(args.size)
        .with_operator(operator)
        .with_push_state(false);
    if args.post {
        config = config.with_method(Method::Post);
    }
    if args.no_fuzzify {
        config = config.with_fuzzify(None);
    }
    config = match (args.username, args.password) {
        (Some(user), Some(pass)) => config.with_basic_auth(user, pass),
        _ => config,
    };

    let mut session = Holder::new(
        config,
        Box::new(HttpTransport::new()),
        TextRenderer::default(),
        Box::new(NoopHistory),
    );

    session.load("").await.context("initial load failed")?;
    if let Some(query) = &args.query {
        session
            .add(AddInput::SearchBox(query))
            .await
            .context("query failed")?;
    }

    for line in session.renderer_mut().take_lines() {
        println!("{line}");
    }

    Ok(())
}
