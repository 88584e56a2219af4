pub mod config;
pub mod hotkey;
pub mod inject;
pub mod llm;
pub mod workflow;
