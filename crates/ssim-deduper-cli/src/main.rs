use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use ssim_deduper_core::{logging, Config, ImageDeduper, LogLevel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ssim-deduper")]
#[command(about = "Remove rotated or identical duplicate images and normalize file names")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove duplicate images in a directory, then rename the survivors
    Scan {
        /// Directory to scan recursively
        directory: PathBuf,

        /// Recognized image extensions (case-insensitive)
        #[arg(short, long, value_delimiter = ',')]
        extensions: Option<Vec<String>>,

        /// Run without making changes
        #[arg(long)]
        dry_run: bool,

        /// Keep the original file names of surviving images
        #[arg(long)]
        no_rename: bool,

        /// Number of threads used to compare images (0 = auto)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Directory for the rolling, compressed log file
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Show a progress bar while comparing
        #[arg(long)]
        progress: bool,

        /// Verbosity level
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "ssim-deduper.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    // Parse command line arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            directory,
            extensions,
            dry_run,
            no_rename,
            threads,
            log_dir,
            progress,
            verbose,
            config,
        } => {
            // Set up configuration
            let mut config = if let Some(config_path) = config {
                Config::from_file(&config_path)?
            } else {
                Config::default()
            };

            // Override config with command line arguments
            if let Some(extensions) = extensions {
                config.extensions = extensions;
            }
            if let Some(threads) = threads {
                config.threads = threads;
            }
            if log_dir.is_some() {
                config.log_dir = log_dir;
            }
            config.dry_run |= dry_run;
            config.rename_files &= !no_rename;
            config.show_progress |= progress;

            // Set log level based on verbosity
            config.log_level = match verbose {
                0 => config.log_level,
                1 => LogLevel::Debug,
                _ => LogLevel::Trace,
            };

            // Validate configuration
            config.validate()?;

            // Initialize logger: rolling file if configured, stderr otherwise
            if config.log_dir.is_some() {
                logging::init_logger(&config, !config.show_progress)?;
            } else {
                env_logger::Builder::new()
                    .filter_level(LevelFilter::from(config.log_level))
                    .parse_default_env()
                    .init();
            }

            let deduper = ImageDeduper::new(config);

            let summary = deduper.run(&directory)?;

            info!(
                "Done: {} images, {} duplicates removed, {} unreadable, {} delete failures",
                summary.discovered,
                summary.report.decisions.len(),
                summary.report.skipped().len(),
                summary.report.delete_failures.len()
            );
            if let Some(renamed) = &summary.renamed {
                info!(
                    "Renamed {} images ({} already named, {} failed)",
                    renamed.renamed.len(),
                    renamed.unchanged,
                    renamed.failed.len()
                );
            }

            Ok(())
        }

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}
