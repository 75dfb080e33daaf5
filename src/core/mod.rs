// Core policy values
pub mod limits;
pub mod settings;

pub use limits::ExtractLimits;
pub use settings::Settings;
