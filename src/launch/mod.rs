//! Invocation building and process supervision.

mod classpath;
mod command;
mod supervisor;

pub use classpath::{build_classpath, safe_path_str};
pub use command::{build_launch_spec, LaunchSpec};
pub use supervisor::{launch, ProcessHandle};
