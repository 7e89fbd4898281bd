pub mod buffer;
pub mod consumer;
pub mod producer;
pub mod registry;
