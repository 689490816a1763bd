pub mod config;
pub mod cycle;
pub mod decision;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod io;
pub mod paths;
pub mod patterns;
pub mod prompts;
pub mod request;
pub mod review;
pub mod status;
pub mod todos;
pub mod types;

pub use config::Config;
pub use decision::{Annotation, Decision};
pub use detector::{evaluate_auto, run_request, Detector};
pub use error::{Result, StagegateError};
pub use request::HookRequest;
