//! Caching Proxy - forward HTTP cache in front of a single origin
//!
//! Usage: `caching-proxy run --port 3000 --origin http://example.com --ttl 60`

use caching_proxy::error::Result;
use caching_proxy::types::{ProxyConfig, DEFAULT_MAX_BODY_BYTES, DEFAULT_ORIGIN_TIMEOUT_SECS};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};
use url::Url;

#[derive(Parser, Debug)]
#[command(
    name = "caching-proxy",
    version,
    about = "A proxy server for caching",
    long_about = "Caching server that caches responses from other servers."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs the server
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Port on which the server will listen
    #[arg(short, long, env = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Origin server to cache responses from
    #[arg(short, long, env = "ORIGIN_URL", value_parser = parse_origin)]
    origin: Url,

    /// Cache items ttl in seconds
    #[arg(short, long, env = "CACHE_TTL_SECS", value_parser = clap::value_parser!(u64).range(1..))]
    ttl: u64,

    /// Timeout for a single origin request, in seconds
    #[arg(long, env = "ORIGIN_TIMEOUT_SECS", default_value_t = DEFAULT_ORIGIN_TIMEOUT_SECS)]
    origin_timeout: u64,

    /// Largest request body read when computing the cache key
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// Serve /health with cache statistics on this port
    #[arg(long, env = "STATS_PORT")]
    stats_port: Option<u16>,
}

impl From<RunArgs> for ProxyConfig {
    fn from(args: RunArgs) -> Self {
        ProxyConfig {
            port: args.port,
            origin: args.origin,
            ttl: Duration::from_secs(args.ttl),
            origin_timeout: Duration::from_secs(args.origin_timeout),
            max_body_bytes: args.max_body_bytes,
            stats_port: args.stats_port,
        }
    }
}

/// Accept only absolute http(s) URLs
fn parse_origin(s: &str) -> std::result::Result<Url, String> {
    let url = Url::parse(s).map_err(|e| format!("invalid origin URL: {}", e))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        "http" | "https" => Err("origin URL has no host".to_string()),
        other => Err(format!("unsupported origin scheme: {}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("caching_proxy=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    match cli.command {
        Command::Run(args) => {
            let config = ProxyConfig::from(args);
            info!("Starting caching proxy...");
            info!("Port: {}", config.port);
            info!("Origin: {}", config.origin);
            info!("Cache TTL: {} seconds", config.ttl.as_secs());

            caching_proxy::serve(config).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "caching-proxy",
            "run",
            "-p",
            "3000",
            "-o",
            "http://localhost:8080",
            "-t",
            "60",
        ])
        .unwrap();

        let Command::Run(args) = cli.command;
        let config = ProxyConfig::from(args);
        assert_eq!(config.port, 3000);
        assert_eq!(config.origin.as_str(), "http://localhost:8080/");
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.origin_timeout, Duration::from_secs(30));
        assert!(config.stats_port.is_none());
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let result = Cli::try_parse_from([
            "caching-proxy",
            "run",
            "--port",
            "3000",
            "--origin",
            "http://localhost:8080",
            "--ttl",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_origin() {
        assert!(parse_origin("https://example.com").is_ok());
        assert!(parse_origin("example.com").is_err());
        assert!(parse_origin("ftp://example.com").is_err());
        assert!(parse_origin("/relative/path").is_err());
    }
}
