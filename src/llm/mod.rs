//! Correction client.
//!
//! This module provides:
//! * [`Corrector`]: async trait implemented by all correction backends.
//! * [`OllamaCorrector`]: talks to a local Ollama server.
//! * [`CorrectionRequest`]: request shaping (instruction + target text).
//! * [`CorrectionResult`] / [`CorrectionMetadata`]: parsed response.
//! * [`CorrectionError`]: `ServiceUnavailable` / `MalformedResponse`.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use line_corrector::config::AppConfig;
//! use line_corrector::llm::{Corrector, OllamaCorrector};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let corrector = OllamaCorrector::from_config(&config.llm);
//!
//!     let result = corrector.correct("Their are three apple's.").await.unwrap();
//!     println!("{}", result.text);
//! }
//! ```

pub mod corrector;
pub mod prompt;
pub mod response;

pub use corrector::{CorrectionError, Corrector, OllamaCorrector};
pub use prompt::{CorrectionRequest, CORRECTION_INSTRUCTION};
pub use response::{parse_response, CorrectionMetadata, CorrectionResult};
