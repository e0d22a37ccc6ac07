pub mod config;
pub mod error;
pub mod install;
pub mod skills;

pub use config::Config;
pub use error::{Error, Result};
pub use install::{Installer, LinkState, RemovedLink, UninstallReport, resolve};
pub use skills::*;
