pub mod builder;
pub mod defaults;
pub mod runtime;
pub mod stats;
pub mod traits;
