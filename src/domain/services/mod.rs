//! Domain Services
//!
//! Pure logic with no I/O.

pub mod shell;
pub mod step_compiler;

pub use step_compiler::{validate_action_name, StepCompiler, StepError, ACTIONS_DIR, WORK_DIR};
