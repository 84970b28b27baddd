use anyhow::{bail, Context};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use suggestions::{logging, Autocomplete, RenderContext, SuggestionsConfig};
use tracing::{debug, info};

/// Interactive suggestions client.
///
/// Every line read from stdin becomes the new field value. Commands:
/// `:select N`, `:dismiss`, `:quit`.
#[derive(Parser, Debug)]
#[command(name = "suggestions", version)]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Service endpoint
    #[arg(long)]
    url: Option<String>,

    /// Lookup type sent with each request (e.g. NAME, ADDRESS)
    #[arg(long = "type")]
    kind: Option<String>,

    /// Body key carrying the query text
    #[arg(long)]
    param_name: Option<String>,

    /// Range spec such as "city-street"
    #[arg(long)]
    bounds: Option<String>,

    /// Extra header as NAME:VALUE, repeatable
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Stop querying extensions of roots that returned nothing
    #[arg(long)]
    prevent_bad_queries: bool,

    /// Debounce delay in milliseconds
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME:VALUE, got {raw:?}")),
    }
}

fn build_config(args: &Args) -> anyhow::Result<SuggestionsConfig> {
    let mut config = match &args.config {
        Some(path) => SuggestionsConfig::load_toml(path)?,
        None => SuggestionsConfig::default(),
    };

    let options = config.base_mut();
    if let Some(url) = &args.url {
        options.service_url = url.clone();
    }
    if let Some(kind) = &args.kind {
        options.kind = kind.clone();
    }
    if let Some(name) = &args.param_name {
        options.param_name = name.clone();
    }
    if args.bounds.is_some() {
        options.bounds = args.bounds.clone();
    }
    for (name, value) in &args.headers {
        options.headers.insert(name.clone(), value.clone());
    }
    if args.prevent_bad_queries {
        options.prevent_bad_queries = true;
    }
    if let Some(ms) = args.debounce_ms {
        options.defer_request_by_ms = ms;
    }

    if options.service_url.is_empty() {
        bail!("no service url: pass --url or set service_url in the config file");
    }
    Ok(config)
}

fn print_context(out: &mut impl Write, context: &RenderContext) -> io::Result<()> {
    if !context.visible {
        return writeln!(out, "  → (no suggestions)");
    }
    if let Some(hint) = &context.hint {
        writeln!(out, "  {hint}")?;
    }
    for (i, suggestion) in context.suggestions.iter().enumerate() {
        writeln!(out, "  {}. {}", i, suggestion.value)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = build_config(&args)?;
    info!(url = %config.base().service_url, "starting suggestions client");
    let mut session = Autocomplete::new(config).context("creating HTTP client")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let input = line.trim_end_matches(['\r', '\n']);

        match input.strip_prefix(':') {
            Some("quit") => break,
            Some("dismiss") => {
                session.dismiss()?;
                print_context(&mut out, session.context())?;
            }
            Some(cmd) if cmd.starts_with("select") => {
                let index = cmd["select".len()..].trim().parse::<usize>();
                match index {
                    Ok(index) => match session.select(index) {
                        Ok(chosen) => writeln!(out, "  ✓ {}", chosen.value)?,
                        Err(e) => writeln!(out, "  ✗ {e}")?,
                    },
                    Err(_) => writeln!(out, "  usage: :select N")?,
                }
            }
            Some(other) => writeln!(out, "  unknown command :{other}")?,
            None => {
                let mut completions = session.input(input)?;
                completions.extend(session.settle()?);
                debug!(?completions, "input processed");
                print_context(&mut out, session.context())?;
            }
        }
        out.flush()?;
    }

    session.dispose();
    Ok(())
}
