pub mod engine;

pub use engine::{LookupEngine, UsageCard};
