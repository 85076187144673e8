use anyhow::Result;
use clap::{Parser, Subcommand};

use contract_signup::{cpf, init_telemetry, AppConfig};

#[derive(Parser)]
#[command(name = "contract-signup")]
#[command(about = "Client registration with generated, signed adhesion contracts")]
#[command(long_about = "Registers clients, validates their CPF, renders an adhesion contract PDF, \
                       signs it with the configured signature provider and emails the client a copy. \
                       Runs the HTTP API when no subcommand is given.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API (default)
    Serve {
        /// Override the configured bind address
        #[arg(long, help = "Socket address to listen on, e.g. 127.0.0.1:8000")]
        bind: Option<String>,
    },
    /// Validate a CPF and print its formatted form
    CheckCpf {
        /// CPF with or without punctuation
        value: String,
    },
    /// Print the effective configuration as TOML (secrets redacted)
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    AppConfig::load_env_file()?;

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            let mut config = AppConfig::load()?;
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            init_telemetry(&config.observability)?;
            tokio::runtime::Runtime::new()?.block_on(async { contract_signup::run(config).await })
        }
        Commands::CheckCpf { value } => check_cpf_command(&value),
        Commands::Config => {
            let config = AppConfig::load()?;
            print!("{}", config.to_toml_redacted()?);
            Ok(())
        }
    }
}

fn check_cpf_command(value: &str) -> Result<()> {
    match cpf::validate(value) {
        Ok(cpf) => {
            println!("✅ CPF válido: {cpf}");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ CPF inválido: {e}");
            std::process::exit(1);
        }
    }
}
