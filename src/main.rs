use clap::Parser;
use grounded_summary::config::Config;
use grounded_summary::{Format, GroundingJob, GroundingPipeline};
use log::{error, info};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "grounded-summary", about = "Ground a comment summary in its source comments")]
struct Args {
    /// JSON file with `summary` and `comments`
    job: PathBuf,

    /// Output format: markdown or html
    #[arg(short, long, default_value = "markdown")]
    format: String,

    /// Write the rendered summary here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

async fn run(args: Args) -> grounded_summary::Result<()> {
    // Parse the format before spending any model calls
    let format: Format = args.format.parse()?;

    let config = Config::from_env()?;
    let model = config.build_model()?;
    info!("Using model {} at {}", config.model, config.base_url);

    let job: GroundingJob = serde_json::from_str(&fs::read_to_string(&args.job)?)?;
    info!(
        "Loaded {} comments from {}",
        job.comments.len(),
        args.job.display()
    );

    let pipeline = GroundingPipeline::new(Arc::new(model));
    let grounded = pipeline.run(&job.summary, &job.comments).await?;
    let rendered = grounded.document.render(format)?;

    match args.output {
        Some(path) => {
            fs::write(&path, rendered)?;
            info!("Wrote grounded summary to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Grounding failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
