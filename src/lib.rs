//! PackMesher - block model mesh optimizer

pub mod core;
pub mod math;
pub mod model;
pub mod spatial;
pub mod optimize;
pub mod pack;
