use std::path::PathBuf;

use clap::{Parser, Subcommand};
use satchel_core::kernel::constants::{APPLICATION_ID_KEY, APPLICATION_VENDOR_ID_KEY};
use satchel_core::{ApplicationContext, BackendKind, DataFormat, StaticContext};

/// Satchel: per-application, per-user local storage
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Application name, used as the id when --app-id is not given
    #[arg(long, default_value = "satchel", global = true)]
    pub app_name: String,

    /// Application id
    #[arg(long, global = true)]
    pub app_id: Option<String>,

    /// Application vendor id (only used by the Windows layout)
    #[arg(long, global = true)]
    pub vendor_id: Option<String>,

    /// Storage directory, overriding the platform default
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Format of stored documents (json, yaml, toml)
    #[arg(long, global = true)]
    pub format: Option<DataFormat>,

    /// Storage configuration file (.json, .yaml, .toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the storage directory
    Dir,
    /// Print the effective storage settings
    Info,
    /// Write standard input to a raw entry
    Put {
        name: String,
        /// Append instead of replacing the contents
        #[arg(long)]
        append: bool,
    },
    /// Print a raw entry
    Cat { name: String },
    /// Delete an entry
    Rm { name: String },
    /// Save a JSON value as a bean; reads standard input when no value is given
    Save { name: String, value: Option<String> },
    /// Load a bean and print it as JSON
    Load { name: String },
}

/// Application context assembled from command-line options
#[derive(Debug, Clone)]
pub struct CliContext {
    inner: StaticContext,
}

impl CliContext {
    pub fn from_args(args: &CliArgs) -> Self {
        let mut inner = StaticContext::new(args.app_name.clone());
        if let Some(id) = &args.app_id {
            inner = inner.with_resource(APPLICATION_ID_KEY, id.clone());
        }
        if let Some(vendor) = &args.vendor_id {
            inner = inner.with_resource(APPLICATION_VENDOR_ID_KEY, vendor.clone());
        }
        Self { inner }
    }
}

impl ApplicationContext for CliContext {
    fn resource(&self, key: &str) -> Option<String> {
        self.inner.resource(key)
    }

    fn application_name(&self) -> &str {
        self.inner.application_name()
    }
}

/// Backend name accepted on the command line and in config files
pub fn backend_label(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::Auto => "auto",
        BackendKind::Filesystem => "filesystem",
        BackendKind::Managed => "managed",
    }
}
