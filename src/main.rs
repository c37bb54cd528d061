use anyhow::Result;
use clap::Parser;
use proxy_check::{
    logging::init_logging,
    proxy::checker::{DEFAULT_ECHO_URL, DEFAULT_TIMEOUT_SECS},
    runner::{self, RunConfig},
    CheckerConfig, VerifyMode,
};
use std::path::PathBuf;
use std::time::Duration;

/// Test a list of proxies for response and function
#[derive(Parser)]
#[command(name = "proxy-check")]
#[command(about = "Test list of proxies for response and function")]
struct Cli {
    /// Proxy file input, one host:port per line
    #[arg(short = 'i', long = "proxy-file", visible_alias = "proxy_file")]
    proxy_file: PathBuf,

    /// Output file for working proxies
    #[arg(
        short = 'o',
        long = "output-file",
        visible_alias = "output_file",
        default_value = runner::DEFAULT_OUTPUT_FILE
    )]
    output_file: PathBuf,

    /// Treat the list as SOCKS4/5 proxies
    #[arg(short, long)]
    socks: bool,

    /// Number of threads to run on
    #[arg(short, long)]
    threads: usize,

    /// Timeout in seconds for each connection attempt
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// IP-echo URL requested through HTTP proxies
    #[arg(long, default_value = DEFAULT_ECHO_URL)]
    echo_url: String,

    /// Only count HTTP proxies whose echoed IP matches the proxy host
    #[arg(long)]
    strict_ip: bool,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let mode = if cli.socks {
        VerifyMode::Socks
    } else {
        VerifyMode::Http
    };

    let checker = CheckerConfig::new()
        .with_mode(mode)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_echo_url(cli.echo_url)
        .with_require_ip_match(cli.strict_ip);

    let config = RunConfig::new(cli.proxy_file, cli.threads)
        .with_output_file(cli.output_file)
        .with_checker(checker);

    runner::run(&config).await?;

    Ok(())
}
