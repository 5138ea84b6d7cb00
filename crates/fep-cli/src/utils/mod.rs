pub mod export;
pub mod progress;
