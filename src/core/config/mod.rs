pub mod data;
pub mod io;
pub mod keys;
pub mod printing;

pub use data::{Config, ModelConfig};
pub use io::ConfigError;
