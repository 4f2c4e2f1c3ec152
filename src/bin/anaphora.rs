//! Anaphora CLI — fact extraction and standalone pronoun resolution.
//!
//! Usage:
//!   anaphora extract --input segments.csv [--strategy rewrite|context|facts]
//!   anaphora resolve [--in input.txt] [--out output.txt]
//!
//! `resolve` with no input runs the built-in example passages and prints
//! each original next to its resolved form.

use anaphora::window::sentence::count_sentences;
use anaphora::{
    load_resume_set, load_segments, window, ContextInPrompt, EscalationStrategy,
    ExtractionPipeline, FactGrounded, FactSink, HttpOracle, Oracle, PipelineConfig,
    RewriteThenReextract, WindowConfig, WindowResolver,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "anaphora",
    version,
    about = "Resumable fact extraction with pronoun-resolution escalation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract facts from an ordered segment table
    Extract(ExtractOpts),
    /// Resolve pronouns in free text of any length
    Resolve(ResolveOpts),
}

#[derive(Args)]
struct ExtractOpts {
    /// Segment table: segment_id, conversation_id, text
    #[arg(long)]
    input: PathBuf,
    /// Accepted-fact ledger (also the resume source)
    #[arg(long, default_value = "facts.psv")]
    output: PathBuf,
    /// Quarantine ledger for malformed lines
    #[arg(long, default_value = "quarantine/bad_facts.psv")]
    quarantine: PathBuf,
    /// How to re-resolve segments whose facts carry pronouns
    #[arg(long, value_enum, default_value = "rewrite")]
    strategy: StrategyArg,
    /// Prior same-conversation items per escalation (k)
    #[arg(long, default_value_t = 2)]
    context_window: usize,
    /// Skip all segments below this id
    #[arg(long)]
    min_segment_id: Option<i64>,
    #[command(flatten)]
    oracle: OracleArgs,
}

#[derive(Args)]
struct ResolveOpts {
    /// Input text file (omit to run the built-in examples)
    #[arg(long = "in")]
    input: Option<PathBuf>,
    /// Output file (omit to print to stdout)
    #[arg(long = "out")]
    output: Option<PathBuf>,
    /// Window budget in characters
    #[arg(long, default_value_t = 4000)]
    max_chars: usize,
    /// Overlap sentences carried between windows
    #[arg(long, default_value_t = 2)]
    overlap_sents: usize,
    #[command(flatten)]
    oracle: OracleArgs,
}

#[derive(Args)]
struct OracleArgs {
    /// Chat-completions endpoint
    #[arg(long, default_value = "https://api.openai.com/v1/chat/completions")]
    oracle_url: String,
    /// Model identifier
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,
    /// Environment variable holding the API key
    #[arg(long, default_value = "ORACLE_API_KEY")]
    api_key_env: String,
    /// Whole-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Rewrite the segment with prior texts, then re-extract
    Rewrite,
    /// Extract in one call with prior texts inlined
    Context,
    /// Extract in one call grounded in facts accepted this run
    Facts,
}

impl StrategyArg {
    fn build(self) -> Arc<dyn EscalationStrategy> {
        match self {
            StrategyArg::Rewrite => Arc::new(RewriteThenReextract),
            StrategyArg::Context => Arc::new(ContextInPrompt),
            StrategyArg::Facts => Arc::new(FactGrounded),
        }
    }
}

fn build_oracle(args: &OracleArgs) -> Arc<dyn Oracle> {
    let mut oracle = HttpOracle::new(args.oracle_url.as_str(), args.model.as_str())
        .with_timeout_secs(args.timeout_secs);
    match std::env::var(&args.api_key_env) {
        Ok(key) if !key.is_empty() => oracle = oracle.with_api_key(key),
        _ => warn!(var = %args.api_key_env, "no API key in environment, calling unauthenticated"),
    }
    Arc::new(oracle)
}

async fn cmd_extract(opts: ExtractOpts) -> i32 {
    let segments = match load_segments(&opts.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mut resume = load_resume_set(&opts.output);
    let mut sink = match FactSink::open(&opts.output, &opts.quarantine) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: cannot open ledgers: {}", e);
            return 1;
        }
    };

    let pipeline = ExtractionPipeline::new(build_oracle(&opts.oracle), opts.strategy.build())
        .with_config(PipelineConfig {
            context_window: opts.context_window,
            min_segment_id: opts.min_segment_id,
        });

    match pipeline.run(&segments, &mut sink, &mut resume).await {
        Ok(summary) => {
            println!(
                "Processed {} segment(s) ({} skipped, {} filtered, {} escalated)",
                summary.processed, summary.skipped, summary.filtered, summary.escalated
            );
            println!(
                "Accepted {} fact(s) into {}",
                summary.accepted,
                opts.output.display()
            );
            println!(
                "Quarantined {} row(s) into {}",
                summary.quarantined,
                opts.quarantine.display()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: run aborted: {}", e);
            eprintln!("Re-run with the same --output to resume where it stopped.");
            1
        }
    }
}

async fn cmd_resolve(opts: ResolveOpts) -> i32 {
    let resolver = WindowResolver::new(build_oracle(&opts.oracle)).with_config(WindowConfig {
        max_chars: opts.max_chars,
        overlap: opts.overlap_sents,
    });

    if let Some(path) = opts.input {
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error: cannot read {}: {}", path.display(), e);
                return 1;
            }
        };
        let resolved = match resolver.resolve(&text).await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        match opts.output {
            Some(out) => {
                if let Err(e) = std::fs::write(&out, &resolved) {
                    eprintln!("Error: cannot write {}: {}", out.display(), e);
                    return 1;
                }
                println!("Saved: {}", out.display());
            }
            None => println!("{}", resolved),
        }
        return 0;
    }

    // no input: run the built-in examples, original next to resolved
    let bar = "─".repeat(80);
    for (i, example) in window::examples().iter().enumerate() {
        let resolved = match resolver.resolve(example).await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error on example {}: {}", i + 1, e);
                return 1;
            }
        };
        println!("\n{}", bar);
        println!(
            "Example {}  •  {} sentence(s)",
            i + 1,
            count_sentences(example)
        );
        println!("{}", bar);
        println!("Original:");
        println!("{}", example);
        println!("\nResolved:");
        println!("{}", resolved);
        println!("{}", bar);
    }
    0
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Extract(opts) => cmd_extract(opts).await,
        Commands::Resolve(opts) => cmd_resolve(opts).await,
    };
    std::process::exit(code);
}
