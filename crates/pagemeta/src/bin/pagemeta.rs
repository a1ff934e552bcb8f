// ABOUTME: CLI binary for the pagemeta extractor.
// ABOUTME: Extracts from URLs or an HTML file, or runs the HTTP service with --serve.

use std::fs;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use pagemeta::observability::{init_logging, LogConfig, LogFormat};
use pagemeta::{Client, ExtractionResult, OutputFormat, RuleConfig};

#[derive(Parser, Debug)]
#[command(name = "pagemeta")]
#[command(about = "Extract title, headings, images, links and metadata from web pages")]
struct Args {
    /// Output format: json (default) or markdown/md
    #[arg(short = 'f', long = "format", default_value = "json")]
    format: String,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Single-line JSON instead of pretty-printed
    #[arg(long = "compact")]
    compact: bool,

    /// HTML file to extract from (requires --url)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// Base URL for resolving references in --html mode
    #[arg(long = "url")]
    url: Option<String>,

    /// Rule preset: extended (default) or minimal
    #[arg(long = "preset", default_value = "extended")]
    preset: String,

    /// JSON file with rule overrides (applied instead of --preset)
    #[arg(long = "rules")]
    rules: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(long = "timeout", env = "PAGEMETA_TIMEOUT_SECS", default_value_t = 15)]
    timeout_secs: u64,

    /// Override the User-Agent header
    #[arg(long = "user-agent", env = "PAGEMETA_USER_AGENT")]
    user_agent: Option<String>,

    /// Run the HTTP service on this address instead of extracting
    #[arg(long = "serve", value_name = "ADDR")]
    serve: Option<SocketAddr>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Debug-level logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long = "log-json")]
    log_json: bool,

    /// URLs to extract (fetch mode)
    #[arg()]
    urls: Vec<String>,
}

fn load_rules(args: &Args) -> anyhow::Result<RuleConfig> {
    if let Some(path) = &args.rules {
        return RuleConfig::from_json_file(path);
    }
    RuleConfig::preset(&args.preset).ok_or_else(|| anyhow!("unknown preset: {}", args.preset))
}

fn build_client(args: &Args) -> anyhow::Result<Client> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .rules(load_rules(args)?);
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua);
    }
    Ok(builder.build())
}

/// Renders `results`. JSON is a bare object only when exactly one target was
/// requested, so the shape does not depend on which targets failed.
fn format_output(
    results: &[ExtractionResult],
    single_target: bool,
    format: OutputFormat,
    compact: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let out = match (results, single_target, compact) {
                ([single], true, true) => serde_json::to_string(single)?,
                ([single], true, false) => serde_json::to_string_pretty(single)?,
                (many, _, true) => serde_json::to_string(many)?,
                (many, _, false) => serde_json::to_string_pretty(many)?,
            };
            Ok(out)
        }
        OutputFormat::Markdown => Ok(results
            .iter()
            .map(ExtractionResult::format_markdown)
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")),
    }
}

fn validate_args(args: &Args) -> anyhow::Result<()> {
    if args.serve.is_some() {
        if args.html.is_some() || !args.urls.is_empty() {
            bail!("--serve cannot be combined with URLs or --html");
        }
        return Ok(());
    }
    if args.html.is_some() && args.url.is_none() {
        bail!("--url is required when using --html");
    }
    if args.html.is_none() && args.urls.is_empty() {
        bail!("at least one URL is required, or use --html with --url");
    }
    if args.html.is_some() && !args.urls.is_empty() {
        bail!("cannot use both --html and positional URLs");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_config = LogConfig {
        format: if args.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        default_filter: match (args.verbose, args.serve.is_some()) {
            (true, _) => "debug",
            (false, true) => "info",
            (false, false) => "warn",
        }
        .to_string(),
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("warning: logging disabled: {}", e);
    }

    if let Err(e) = validate_args(&args) {
        eprintln!("error: {}", e);
        return ExitCode::from(1);
    }

    let client = match build_client(&args) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(addr) = args.serve {
        return match pagemeta::server::serve(addr, client).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {:#}", e);
                ExitCode::from(1)
            }
        };
    }

    let start = Instant::now();
    let mut results: Vec<ExtractionResult> = Vec::new();
    let mut had_error = false;

    if let (Some(html_path), Some(url)) = (&args.html, &args.url) {
        match fs::read_to_string(html_path)
            .with_context(|| format!("error reading file {:?}", html_path))
        {
            Ok(html) => match client.extract_html(&html, url) {
                Ok(result) => results.push(result),
                Err(e) => {
                    eprintln!("error extracting HTML: {}", e);
                    had_error = true;
                }
            },
            Err(e) => {
                eprintln!("{:#}", e);
                had_error = true;
            }
        }
    } else {
        for url in &args.urls {
            match client.extract_url(url).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    eprintln!("error extracting {}: {}", url, e);
                    had_error = true;
                }
            }
        }
    }

    let elapsed = start.elapsed();

    if !results.is_empty() {
        let single_target = args.html.is_some() || args.urls.len() == 1;
        match format_output(
            &results,
            single_target,
            OutputFormat::from(args.format.as_str()),
            args.compact,
        ) {
            Ok(output_str) => {
                if let Some(output_path) = &args.output {
                    if let Err(e) = fs::write(output_path, &output_str) {
                        eprintln!("error writing to {:?}: {}", output_path, e);
                        had_error = true;
                    }
                } else {
                    println!("{}", output_str);
                }
            }
            Err(e) => {
                eprintln!("error formatting output: {}", e);
                had_error = true;
            }
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
