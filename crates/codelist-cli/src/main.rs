//! Codelist CLI
//!
//! Command-line interface for compiling code list sheets into FHIR
//! ValueSets and CodeSystems

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use codelist_core::init_tracing;
use std::io;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "codelist")]
#[command(about = "Compile code list sheets into FHIR ValueSets and CodeSystems")]
#[command(version = codelist_core::VERSION)]
#[command(
    long_about = "codelist turns tabular code lists (CSV/TSV) into FHIR terminology resources.\n\
Rows without a System define concepts in an inline CodeSystem; rows with a System\n\
enumerate codes from that external system in the ValueSet.\n\
\n\
Examples:\n  \
codelist build sheets/                  # Compile every sheet in a directory\n  \
codelist build status.csv -o out/       # Compile one sheet into out/\n  \
codelist build *.tsv --keep-going       # Skip sheets that fail\n  \
codelist config init --format toml      # Create .codelistrc.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.codelistrc.json/.codelistrc.toml/codelist.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile code list sheets into FHIR resources
    Build {
        /// Sheet files or directories
        #[arg(required = true, help = "Sheet files (.csv, .tsv, .txt) or directories")]
        inputs: Vec<PathBuf>,

        /// Output directory for generated resources
        #[arg(short, long, help = "Output directory (default: codelist-generated)")]
        output: Option<PathBuf>,

        /// Version stamped on generated resources
        #[arg(long, help = "Version for generated ValueSets and CodeSystems")]
        version: Option<String>,

        /// Canonical URL prefix
        #[arg(long, help = "Base URL (default: http://hl7.org/fhir)")]
        base_url: Option<String>,

        /// Publication status
        #[arg(long, help = "ValueSet status: draft, active, retired or unknown")]
        status: Option<String>,

        /// Continue past sheets that fail to compile
        #[arg(long, help = "Skip failing sheets instead of stopping")]
        keep_going: bool,

        /// Do not write audit mirrors
        #[arg(long, help = "Skip writing audit/<sheet>.tsv")]
        no_audit: bool,

        /// Clean output directory before building
        #[arg(long, help = "Clean output directory before building")]
        clean: bool,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    #[command(alias = "ver")]
    Version {
        /// Show detailed version information
        #[arg(long, help = "Show detailed version and build information")]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize a new configuration file
    Init {
        /// Configuration file format
        #[arg(long, default_value = "json", help = "Configuration file format")]
        format: ConfigFormat,

        /// Overwrite existing configuration file
        #[arg(long, help = "Overwrite existing configuration file")]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Output format
        #[arg(long, default_value = "json", help = "Output format")]
        format: ShowFormat,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(help = "Path to configuration file (default: search for .codelistrc)")]
        path: Option<PathBuf>,
    },

    /// Print the configuration JSON Schema
    Schema,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// TOML configuration format
    Toml,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ShowFormat {
    Json,
    Toml,
    Yaml,
}

fn main() {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return;
    }

    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "codelist=error",
        1 => "codelist=warn",
        2 => "codelist=info",
        3 => "codelist=debug",
        _ => "codelist=trace",
    };
    unsafe {
        std::env::set_var("RUST_LOG", log_level);
    }
    init_tracing();

    if let Err(e) = run_command(cli) {
        error!("codelist failed: {:#}", e);
        std::process::exit(1);
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config;

    match cli.command {
        Some(Commands::Build {
            inputs,
            output,
            version,
            base_url,
            status,
            keep_going,
            no_audit,
            clean,
        }) => commands::build::build_command(
            commands::build::BuildArgs {
                inputs,
                output,
                version,
                base_url,
                status,
                keep_going,
                no_audit,
                clean,
            },
            config_path.as_deref(),
        ),

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { format, force } => commands::config_init_command(format, force),
            ConfigAction::Show { format } => {
                commands::config_show_command(format, config_path.as_deref())
            }
            ConfigAction::Validate { path } => {
                commands::config_validate_command(path.or(config_path))
            }
            ConfigAction::Schema => commands::config_schema_command(),
        },

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("codelist {}", codelist_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
                if let Ok(profile) = std::env::var("PROFILE") {
                    println!("  Profile: {profile}");
                }
            } else {
                println!("{}", codelist_core::VERSION);
            }
            Ok(())
        }

        None => {
            // No subcommand provided, show help
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
