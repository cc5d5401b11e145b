use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use storyforge::{
    analyze_input, load_source_text, save_results, ConsoleDecisionSource, EngineConfig, LlmConfig,
    LlmReviewOracle, OpenAiClient, SegmentConfig, WorkflowEngine, SUPPORTED_GENRES,
};

#[derive(Parser)]
#[command(name = "storyforge")]
#[command(author, version, about = "Novel-to-production-script adaptation pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Adapt a novel chapter into a multi-track production script
    Process {
        /// Input text file
        #[arg(short, long)]
        input: PathBuf,

        /// Genre tag steering the prompt style
        #[arg(short, long, default_value = "xianxia/fantasy")]
        genre: String,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Print results without writing files
        #[arg(long)]
        no_save: bool,

        /// Maximum segment size in characters
        #[arg(long, default_value = "2000")]
        chunk_size: usize,

        /// Overlap preview size in characters
        #[arg(long, default_value = "200")]
        overlap: usize,

        /// Review passes before the director force-approves
        #[arg(long, default_value = "3")]
        max_revisions: u32,

        /// Pause after the first draft for an interactive review
        #[arg(long)]
        human_review: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report how an input would be segmented, without running the pipeline
    Analyze {
        /// Input text file
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum segment size in characters
        #[arg(long, default_value = "2000")]
        chunk_size: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            genre,
            output,
            no_save,
            chunk_size,
            overlap,
            max_revisions,
            human_review,
            verbose,
        } => {
            setup_logging(verbose);
            process(
                input,
                genre,
                output,
                no_save,
                chunk_size,
                overlap,
                max_revisions,
                human_review,
            )
            .await
        }
        Commands::Analyze { input, chunk_size } => {
            setup_logging(false);
            analyze(input, chunk_size)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn process(
    input: PathBuf,
    genre: String,
    output: PathBuf,
    no_save: bool,
    chunk_size: usize,
    overlap: usize,
    max_revisions: u32,
    human_review: bool,
) -> Result<()> {
    if !SUPPORTED_GENRES.contains(&genre.as_str()) {
        bail!(
            "unsupported genre {genre:?}; expected one of: {}",
            SUPPORTED_GENRES.join(", ")
        );
    }

    let novel_text = load_source_text(&input)?;
    let stats = analyze_input(&novel_text, chunk_size);
    info!(
        chars = stats.total_chars,
        estimated_segments = stats.estimated_segments,
        genre = %genre,
        "loaded input"
    );
    if stats.needs_split {
        info!("long-input mode: text will be split into ~{} segments", stats.estimated_segments);
    }
    if human_review {
        info!("human review enabled: the run pauses once after the first draft");
    }

    let llm_config = LlmConfig::from_env()?;
    info!(model = %llm_config.model, "LLM backend configured");
    let generator = Arc::new(OpenAiClient::new(llm_config));
    let oracle = Arc::new(LlmReviewOracle::new(generator.clone()));

    let engine = WorkflowEngine::new(
        generator,
        oracle,
        Arc::new(ConsoleDecisionSource),
        EngineConfig {
            max_revisions,
            human_review,
            segment: SegmentConfig {
                target_size: chunk_size,
                overlap,
            },
        },
    );

    let result = engine.run(&novel_text, &genre).await?;

    let cast = result
        .state
        .character_sheet
        .as_ref()
        .map(|s| s.cast_names().join(", "))
        .filter(|names| !names.is_empty())
        .unwrap_or_else(|| "(none)".to_string());
    println!("\n{}", "=".repeat(55));
    println!("  Workflow complete");
    println!("  Cast: {cast}");
    println!("  Scenes: {}", result.total_scenes);
    println!("  Review rounds: {}", result.total_iterations);
    println!("  Segments: {}", result.segment_count);
    println!("{}\n", "=".repeat(55));

    println!(
        "{}",
        result.state.final_script.as_deref().unwrap_or("(no output)")
    );

    if !no_save {
        let paths = save_results(&result.state, &output)?;
        println!("\nFinal script: {:?}", paths.script_path);
        println!("Raw data: {:?}", paths.data_path);
    }

    Ok(())
}

fn analyze(input: PathBuf, chunk_size: usize) -> Result<()> {
    let novel_text = load_source_text(&input)?;
    let stats = analyze_input(&novel_text, chunk_size);

    println!("Input Analysis");
    println!("==============");
    println!("Total characters: {}", stats.total_chars);
    println!("Segment target size: {chunk_size}");
    println!("Estimated segments: {}", stats.estimated_segments);
    println!(
        "Needs splitting: {}",
        if stats.needs_split { "yes" } else { "no" }
    );

    Ok(())
}
