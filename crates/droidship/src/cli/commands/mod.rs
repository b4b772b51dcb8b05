//! CLI commands

mod build;
mod completions;
mod doctor;
mod publish;
mod release;

pub use build::BuildCommand;
pub use completions::CompletionsCommand;
pub use doctor::DoctorCommand;
pub use publish::PublishCommand;
pub use release::ReleaseCommand;
