//! Port traits at the external seams.

pub mod candle_port;
pub mod config_port;
