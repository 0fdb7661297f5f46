pub mod blocks;
pub mod inputs;
pub mod metadata;
pub mod reconstruct;
