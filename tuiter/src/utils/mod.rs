pub mod defaults;
pub mod logger;
