//! # Herald Runtime
//!
//! Runtime orchestration for the Herald chat automation framework.
//!
//! This crate wraps the [`herald_core`] dispatch core with the pieces a
//! running agent needs: layered configuration (figment), tracing-based
//! logging, and the event loop that pumps adapter messages into the robot
//! with graceful shutdown.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald_runtime::Runtime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = Runtime::new(my_adapter)?;
//!
//!     runtime.robot_mut().respond("(?i)ping", Default::default(), |ctx| async move {
//!         ctx.response().reply(&["pong"]).await
//!     })?;
//!
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{HeraldConfig, LogFormat, LoggingConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use runtime::Runtime;
