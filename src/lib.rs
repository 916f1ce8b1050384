// Library surface for the binary, headless runs and integration tests.
pub mod app;
pub mod app_dirs;
pub mod audio;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod exercise;
pub mod logging;
pub mod runtime;
pub mod score;
pub mod session;
pub mod ui;
pub mod util;
pub mod vocabulary;

pub use error::{Result, SessionError, SourceError};
pub use session::{Phase, SessionMachine, SessionView};
pub use vocabulary::{VocabularyItem, VocabularySource};
