//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (COUNTER_* environment overrides)
//!     → command-line flags (main.rs)
//!     → validation.rs (semantic checks)
//!     → InteractConfig (validated, immutable)
//!     → passed by reference into the flow
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated
//! - All fields have defaults to allow minimal configs
//! - The private key is wrapped so it cannot leak through Debug or Serialize

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    ContractConfig, InteractConfig, NetworkConfig, ObservabilityConfig, SecretString,
    SignerConfig, TransactionConfig,
};
