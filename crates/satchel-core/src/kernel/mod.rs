//! # Satchel Core Kernel
//!
//! The `kernel` module holds what every other part of `satchel-core` leans on:
//!
//! - **Error Handling**: the crate-wide [`Error`](error::Error) aggregating the
//!   typed subsystem errors, and the matching `Result` alias.
//! - **Application Context**: the [`ApplicationContext`](context::ApplicationContext)
//!   collaborator that supplies resource lookups such as the application and
//!   vendor identifiers.
//! - **Core Constants**: resource keys, defaults and environment variable names
//!   via the `constants` submodule.
pub mod constants;
pub mod context;
pub mod error;

pub use context::{ApplicationContext, StaticContext};
pub use error::{Error, Result};
