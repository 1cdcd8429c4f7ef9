mod config;
mod display;
mod errors;
mod instrumentation;
mod llm;
mod material;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use config::{Config, LogFormat};
use display::ExportDocument;
use instrumentation::{RunLog, RunLogger};
use llm::GeminiClient;
use material::{prompt, GenerationOutcome, MaterialGenerator, MaterialKind, MaterialRequest};

#[derive(Parser)]
#[command(
    name = "lesson-forge",
    about = "Generate lesson plans, study guides, quizzes, or find example resources with Gemini"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print the built prompt and timing to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate material for a request
    Generate {
        #[command(flatten)]
        request: RequestArgs,

        /// Also write a PDF export into this directory
        #[arg(long)]
        save: Option<PathBuf>,

        /// With --save, write a Markdown copy next to the PDF
        #[arg(long, requires = "save")]
        markdown: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the prompt a request would send, without calling the API
    Prompt {
        #[command(flatten)]
        request: RequestArgs,
    },
    /// List the material kinds and their form hints
    Kinds,
}

#[derive(Args)]
struct RequestArgs {
    /// Type of material
    #[arg(short, long, value_enum)]
    kind: MaterialKind,

    /// Topic / subject
    #[arg(short, long)]
    topic: String,

    /// Target audience / grade level
    #[arg(short, long)]
    audience: String,

    /// Learning objective, or search keyword for find-resources (repeatable)
    #[arg(short, long = "objective")]
    objectives: Vec<String>,

    /// Additional details / specific focus
    #[arg(short, long)]
    details: Option<String>,
}

impl RequestArgs {
    fn into_request(self) -> MaterialRequest {
        let request = MaterialRequest::new(self.kind, &self.topic, &self.audience)
            .with_objectives(&self.objectives.join("\n"));
        match self.details {
            Some(details) => request.with_details(&details),
            None => request,
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    match cli.command {
        Commands::Generate {
            request,
            save,
            markdown,
            json,
        } => {
            let output = Output { save, markdown, json };
            generate(&config, request.into_request(), output, cli.verbose).await
        }
        Commands::Prompt { request } => {
            let request = request.into_request();
            request.validate()?;
            let built = prompt::build(&request);
            println!("{}", built.prompt);
            eprintln!("\n[grounding] {}", built.use_grounding);
            Ok(())
        }
        Commands::Kinds => {
            for kind in MaterialKind::ALL {
                let profile = kind.profile();
                println!("{}", profile.label);
                println!("  {}", profile.objectives_label);
                println!("  {}", profile.objectives_placeholder);
                println!("  {}", profile.objectives_help);
            }
            Ok(())
        }
    }
}

struct Output {
    save: Option<PathBuf>,
    markdown: bool,
    json: bool,
}

async fn generate(
    config: &Config,
    request: MaterialRequest,
    output: Output,
    verbose: bool,
) -> Result<()> {
    request.validate()?;

    let provider = GeminiClient::new(config.gemini_api_key.as_deref(), &config.gemini_base_url);
    let generator = MaterialGenerator::new(provider, config.model.clone());
    let logger = RunLogger::new(&config.run_log_dir)?;

    let built = prompt::build(&request);
    if verbose {
        eprintln!(
            "[prompt] {} chars, grounding={}\n{}\n",
            built.prompt.chars().count(),
            built.use_grounding,
            built.prompt
        );
    }

    let start = Instant::now();
    let result = generator.generate(&request).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let run_log = RunLog::new(
        &request,
        generator.model(),
        &built.prompt,
        result.as_ref().map_err(|e| e.to_string()),
        latency_ms,
    );
    if let Err(e) = logger.write(&run_log) {
        tracing::warn!(error = ?e, "failed to write run log");
    }
    if verbose {
        eprintln!("[run] {}", run_log.summary());
    }

    let outcome = result?;
    print_outcome(&request, &outcome, output.json)?;

    if let Some(dir) = output.save {
        let export = ExportDocument::new(request.kind, &request.topic, &outcome);
        let path = export
            .save(&dir)
            .context("Failed to export generated content")?;
        eprintln!("Saved {}", path.display());
        if output.markdown {
            let path = export
                .save_markdown(&dir)
                .context("Failed to export generated content")?;
            eprintln!("Saved {}", path.display());
        }
    }

    Ok(())
}

fn print_outcome(request: &MaterialRequest, outcome: &GenerationOutcome, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(outcome).context("Failed to serialize outcome")?;
        println!("{}", out);
        return Ok(());
    }

    println!(
        "\n{}\n",
        GenerationOutcome::display_title(request.kind, &request.topic)
    );
    println!("{}", outcome.text);

    if let Some(sources) = outcome.sources.as_ref().filter(|s| !s.is_empty()) {
        println!("\nSources:");
        for source in sources {
            println!("  - {} <{}>", source.title, source.uri);
        }
    }

    Ok(())
}
