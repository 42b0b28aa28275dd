//! Common utilities and shared types for hydromed.
//!
//! This crate provides foundational components used across all hydromed crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Tokens**: HS256 JWT issuing and validation via [`TokenService`]
//! - **Sessions**: Redis-backed session store via [`SessionStore`]
//! - **Storage**: Symptom image storage backends (local, S3-compatible)
//!
//! # Example
//!
//! ```no_run
//! use hydromed_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod session;
pub mod storage;
pub mod token;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use session::{SessionData, SessionStore};
pub use storage::{ImageStore, LocalImageStore, StoredImage, generate_image_key};
pub use token::{Claims, TokenService};
