pub mod runner;

pub use runner::{run_process, ProcessError, ProcessOutput, ProcessRequest, DEFAULT_STAGE_TIMEOUT};
