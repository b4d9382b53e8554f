//! Configuration loading and management for the sick-leave engine.
//!
//! This module loads the cost-allocation policy from YAML files: policy
//! metadata, engine settings, and the dated band schedules that decide how
//! sick-leave days are split between the employer and the insurers.
//!
//! # Example
//!
//! ```no_run
//! use sick_leave_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/co_sick_leave").unwrap();
//! println!("Loaded policy: {}", config.policy().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BandSchedule, EngineSettings, FlatRule, GeneralIllnessRules, PayBand, PolicyConfig,
    PolicyMetadata,
};
