//! Domain entities

mod machine_status;
mod step;

pub use machine_status::MachineStatus;
pub use step::{CompiledStep, StagedUpload, REDACTED};
