use clap::{Parser, Subcommand, ValueEnum};
use cli::{load_settings, RunConfig};
use color_eyre::eyre::Result;
use slide_align::{
    decode, diff, encode_png, CapturedImages, DiffOptions, Position, Solver, SolverConfig,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Toml,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the canvases listed in a run configuration file
    Solve {
        /// Path to the TOML or JSON run configuration
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Locate gap and piece in three canvas captures and plan the drag
    Locate {
        /// Background without the gap
        #[arg(long)]
        reference: PathBuf,
        /// Background with the gap
        #[arg(long)]
        challenge: PathBuf,
        /// Transparent canvas with the piece
        #[arg(long)]
        piece: PathBuf,
        /// Slider handle centre, x
        #[arg(long, default_value_t = 0)]
        pointer_x: i32,
        /// Slider handle centre, y
        #[arg(long, default_value_t = 0)]
        pointer_y: i32,
        /// Solver settings file (TOML or JSON)
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Paint the differences between two captures into an image
    Diff {
        #[arg(long)]
        reference: PathBuf,
        #[arg(long)]
        challenge: PathBuf,
        /// Where to write the PNG
        #[arg(short, long)]
        output: PathBuf,
        /// Matching threshold in [0, 1]
        #[arg(long, default_value_t = 0.2)]
        threshold: f64,
        /// Count anti-aliased pixels as differences
        #[arg(long)]
        include_aa: bool,
    },
    /// Print the default solver settings
    DefaultConfig {
        #[arg(long, value_enum, default_value = "toml")]
        format: Format,
    },
    /// Print the JSON schema of the run configuration
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Solve { config } => {
            solve_run(config)?;
        }
        Commands::Locate {
            reference,
            challenge,
            piece,
            pointer_x,
            pointer_y,
            settings,
        } => {
            let solver_config = match settings {
                Some(path) => load_settings(path)?,
                None => SolverConfig::default(),
            };
            let images = CapturedImages {
                reference: std::fs::read(reference)?,
                challenge: std::fs::read(challenge)?,
                piece: std::fs::read(piece)?,
            };
            let solver = Solver::new(solver_config)?;
            let solution = solver.solve(&images, Position::new(*pointer_x, *pointer_y))?;
            println!("{}", serde_json::to_string_pretty(&solution)?);
        }
        Commands::Diff {
            reference,
            challenge,
            output,
            threshold,
            include_aa,
        } => {
            let options = DiffOptions {
                threshold: *threshold,
                include_aa: *include_aa,
                ..DiffOptions::default()
            };
            write_diff(reference, challenge, output, &options)?;
        }
        Commands::DefaultConfig { format } => {
            let config = SolverConfig::default();
            let text = match format {
                Format::Toml => toml::to_string_pretty(&config)?,
                Format::Json => serde_json::to_string_pretty(&config)?,
            };
            println!("{text}");
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(RunConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn solve_run(config_path: &Path) -> Result<()> {
    let run = RunConfig::from_file(config_path)?;
    info!("Run configuration: {:?}", config_path);

    let solver = Solver::new(run.solver.clone())?;
    let images = run.load_images()?;

    if let Some(diff_output) = &run.diff_output {
        let difference = solver.diff(&decode(&images.reference)?, &decode(&images.challenge)?)?;
        std::fs::write(diff_output, encode_png(&difference.image)?)?;
        info!("Diff image saved to {} ({} different pixels)", diff_output, difference.different_pixels);
    }

    let solution = solver.solve(&images, run.pointer)?;
    println!("{}", serde_json::to_string_pretty(&solution)?);
    Ok(())
}

fn write_diff(reference: &Path, challenge: &Path, output: &Path, options: &DiffOptions) -> Result<()> {
    let reference = decode(&std::fs::read(reference)?)?;
    let challenge = decode(&std::fs::read(challenge)?)?;

    let difference = diff(&reference, &challenge, options)?;
    std::fs::write(output, encode_png(&difference.image)?)?;

    info!("Diff image saved to {:?}", output);
    println!("{}", difference.different_pixels);
    Ok(())
}
