//! Data models for the application
//!
//! Split by feature area: the upload widget state and the hosting configuration.

mod hosting;
mod upload;

pub use hosting::*;
pub use upload::*;
