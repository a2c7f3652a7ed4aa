pub mod config;
pub mod env;
pub mod error;
pub mod validate;
pub mod workflow;

// Re-export commonly used types
pub use config::{Config, GhConfig, GhRequired, ImgurConfig, UploadTarget};
#[cfg(any(test, feature = "test-support"))]
pub use env::InMemoryEnv;
pub use env::{ReadEnv, SystemEnv};
pub use error::{CoreError, CoreResult, ValidationError};
pub use validate::{BoolLike, Field, NoEmpty, ProperBool, Validator, compose};
pub use workflow::{MessageType, format_message, print_message};
