pub mod band;
pub mod enums;
pub mod guidance;
pub mod report;

pub use band::*;
pub use enums::*;
pub use guidance::*;
pub use report::*;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnum { field: String, value: String },
}
