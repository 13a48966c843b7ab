//! imgprompts Core Library
//!
//! This crate provides the storage and business logic behind the imgprompts
//! service: AI image-generation prompts, their tags, uploaded images and the
//! analysis stub. It has no HTTP dependency, so the server and the maintenance
//! CLI share it.
//!
//! # Architecture
//!
//! - `models`: Data structures (Prompt, Tag, pagination, settings)
//! - `db`: SQLite database layer with DAOs
//! - `services`: Upload storage, prompt analyzer, settings manager
//! - `utils`: Error handling and utilities
//!
//! # Example
//!
//! ```no_run
//! use imgprompts_core::{db::Database, models::CreatePrompt};
//!
//! let db = Database::open("./data/imgprompts.db".into()).unwrap();
//! db.init().unwrap();
//!
//! let prompt = db
//!     .create_prompt(&CreatePrompt {
//!         prompt_text: "a beautiful sunset over mountains".into(),
//!         tag_names: vec!["风景".into()],
//!         ..Default::default()
//!     })
//!     .unwrap();
//! println!("{}", prompt.id);
//! ```

pub mod db;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use db::{Database, DatabaseStats, IntegrityReport};
pub use models::{AppSettings, CreatePrompt, Prompt, PromptResponse, Tag, UpdatePrompt};
pub use services::{MockAnalyzer, PromptAnalyzer, SettingsManager, UploadStore};
pub use utils::{AppError, AppResult};
