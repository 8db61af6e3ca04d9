pub mod chain_config;
#[cfg(feature = "cli")]
pub mod cli;

pub use chain_config::ChainFileConfig;
#[cfg(feature = "cli")]
pub use cli::CliConfig;
