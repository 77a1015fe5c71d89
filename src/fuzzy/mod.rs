pub mod candidates;
pub mod phonetic;
