pub mod audio;
pub mod config;
pub mod download;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod split;
pub mod tools;

pub use config::{Config, Quality};
pub use error::{Result, YtsplitError};
pub use pipeline::{print_summary, run, PipelineConfig, PipelineResult};
pub use split::{SplitOutcome, SplitState, Splitter};
