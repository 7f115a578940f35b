//! Configuration
//!
//! XDG-compliant path resolution and persisted user settings.

pub mod paths;
pub mod settings;

pub use paths::HouseholdPaths;
pub use settings::Settings;
