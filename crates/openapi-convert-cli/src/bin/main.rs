//! oas-convert - convert OpenAPI 3.0 documents to Swagger 2.0
//!
//! Reads a document from a file (or inline text with `--text`), converts it and writes the
//! result to stdout or `--output`. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};

use openapi_convert::{ConversionRequest, Converter, FormatId, KeyOrder, SpecSource, Syntax};

/// Convert API descriptions between OpenAPI 3.0 and Swagger 2.0
#[derive(Parser, Debug)]
#[command(name = "oas-convert")]
#[command(author = "Symbia Labs")]
#[command(version)]
#[command(about = "Convert OpenAPI 3.0 documents to Swagger 2.0")]
struct Args {
    /// Input document path (inline JSON/YAML text with `--text`)
    input: String,

    /// Treat INPUT as the document text instead of a path
    #[arg(long)]
    text: bool,

    /// Source format (default: openapi_3)
    #[arg(long, env = "OAS_CONVERT_FROM")]
    from: Option<FormatId>,

    /// Target format (default: swagger_2)
    #[arg(long, env = "OAS_CONVERT_TO")]
    to: Option<FormatId>,

    /// Output syntax: json or yaml
    #[arg(long)]
    syntax: Option<Syntax>,

    /// Key order: openapi, alpha or false
    #[arg(long)]
    order: Option<KeyOrder>,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fill in placeholder info.title / info.version when missing
    #[arg(long)]
    fill_missing: bool,

    /// Settings file (JSON or YAML); command line flags take precedence
    #[arg(long, env = "OAS_CONVERT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Settings file values overridden by explicit flags
    fn request(&self) -> Result<ConversionRequest, Box<dyn std::error::Error>> {
        let mut request = match &self.config {
            Some(path) => ConversionRequest::load(path)?,
            None => ConversionRequest::default(),
        };

        if let Some(from) = self.from {
            request.from = from;
        }
        if let Some(to) = self.to {
            request.to = to;
        }
        if let Some(syntax) = self.syntax {
            request.syntax = syntax;
        }
        if let Some(order) = self.order {
            request.order = order;
        }
        if self.fill_missing {
            request.fill_missing = true;
        }
        Ok(request)
    }

    fn source(&self) -> SpecSource {
        if self.text {
            SpecSource::Text(self.input.clone())
        } else {
            SpecSource::detect(&self.input)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let request = args.request()?;
    debug!("Conversion request: {:?}", request);

    let converter = Converter::new();
    let source = args.source();
    if let SpecSource::File(path) = &source {
        info!("Converting {} from {} to {}", path.display(), request.from, request.to);
    }

    let converted = converter.convert(source, &request)?;
    let text = converted.stringify(&request.stringify_options())?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", text.trim_end()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}
