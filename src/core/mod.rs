//! Core application primitives (pipeline orchestration, input refresh, HTTP surface)

pub mod http;
pub mod observer;
pub mod pipeline;
pub mod refresh;

pub use http::*;
pub use observer::*;
pub use pipeline::*;
pub use refresh::*;
