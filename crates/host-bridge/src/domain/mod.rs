//! Domain layer: correlation, sessions, identity, configuration, errors.

pub mod config;
pub mod error;
pub mod identity;
pub mod pending;
pub mod session;

pub use config::{BridgeConfig, ConfigError, SimulatorConfig, UploadConfig, DEFAULT_DIRECTORIES};
pub use error::{BridgeError, SimulatorError, UploadError};
pub use identity::LocalFile;
pub use pending::{CallbackCorrelator, CorrelatorStats};
pub use session::{ChunkPlan, ChunkSession};
