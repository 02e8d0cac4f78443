mod cli;

use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{debug, error, info};
use satchel_core::{Error, LocalStorage, Result, StorageConfig};

use cli::{CliArgs, CliContext, Commands, backend_label};

fn build_storage(args: &CliArgs) -> Result<LocalStorage> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading storage configuration from {}", path.display());
            StorageConfig::load(path)?
        }
        None => StorageConfig::default(),
    };
    if let Some(dir) = &args.dir {
        config.directory = Some(dir.clone());
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    debug!("Effective storage configuration: {:?}", config);

    let backend = config.backend;
    let storage = LocalStorage::with_config(Arc::new(CliContext::from_args(args)), config)?;
    debug!("Requested backend: {}", backend_label(backend));
    Ok(storage)
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .map_err(|e| Error::Other(format!("Failed to read standard input: {}", e)))?;
    Ok(input)
}

fn io_error(e: io::Error) -> Error {
    Error::Other(format!("I/O error: {}", e))
}

fn run(args: &CliArgs) -> Result<ExitCode> {
    let storage = build_storage(args)?;

    match &args.command {
        Commands::Dir => match storage.directory() {
            Some(dir) => println!("{}", dir.display()),
            None => {
                eprintln!("Storage directory is unspecified");
                return Ok(ExitCode::FAILURE);
            }
        },
        Commands::Info => {
            let directory = storage
                .directory()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "<unspecified>".to_string());
            println!("application: {}", storage.context().application_id());
            println!("directory: {}", directory);
            println!("backend: {}", storage.backend_name());
            println!("format: {}", storage.format().extension());
            println!("storage limit: {}", storage.storage_limit());
        }
        Commands::Put { name, append } => {
            let input = read_stdin()?;
            let mut out = storage.open_output_file_append(name, *append)?;
            out.write_all(&input).and_then(|_| out.flush()).map_err(io_error)?;
            info!("Wrote {} bytes to '{}'", input.len(), name);
        }
        Commands::Cat { name } => {
            let mut contents = Vec::new();
            storage.open_input_file(name)?.read_to_end(&mut contents).map_err(io_error)?;
            io::stdout().write_all(&contents).map_err(io_error)?;
        }
        Commands::Rm { name } => {
            if storage.delete_file(name)? {
                println!("Deleted '{}'", name);
            } else {
                eprintln!("No entry named '{}'", name);
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Save { name, value } => {
            let text = match value {
                Some(text) => text.clone(),
                None => String::from_utf8(read_stdin()?)
                    .map_err(|e| Error::Other(format!("Standard input is not UTF-8: {}", e)))?,
            };
            let bean: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| Error::Other(format!("Invalid JSON value: {}", e)))?;
            storage.save(&bean, name)?;
            println!("Saved '{}'", name);
        }
        Commands::Load { name } => match storage.load::<serde_json::Value>(name)? {
            Some(bean) => {
                let text = serde_json::to_string_pretty(&bean)
                    .map_err(|e| Error::Other(format!("Failed to print value: {}", e)))?;
                println!("{}", text);
            }
            None => {
                eprintln!("No stored value for '{}'", name);
                return Ok(ExitCode::FAILURE);
            }
        },
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
