//! Logic Module - Business Logic & Engines
//!
//! - `model/` - example store, nearest-neighbour classifier, detection rule
//! - `capture/` - frame source and embedder collaborators
//! - `training` - capture-and-label rounds
//! - `analysis_loop` - polling inference loop
//! - `response/` - debounced sound + notification alerts
//! - `events` - observable detection flag

pub mod config;
pub mod events;
pub mod model;
pub mod capture;
pub mod training;
pub mod analysis_loop;
pub mod response;

#[cfg(test)]
pub(crate) mod testing;
