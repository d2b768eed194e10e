//! Command implementations for the cdcr CLI
//!
//! Each command has its own module/file.

pub mod config;
pub mod conll;
pub mod export;
pub mod iaa;
pub mod predict;
pub mod score;
pub mod validate;

// Re-export argument types for parser
pub use config::ConfigArgs;
pub use conll::ConllArgs;
pub use export::ExportArgs;
pub use iaa::IaaArgs;
pub use predict::PredictArgs;
pub use score::ScoreArgs;
pub use validate::ValidateArgs;
