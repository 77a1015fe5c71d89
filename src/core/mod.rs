pub mod bigram;
pub mod confusion;
pub mod context;
pub mod distance;
pub mod engine;
pub mod types;
