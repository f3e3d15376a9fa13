// src/data/mod.rs
mod http;
mod model;
mod reader;

pub use http::HttpDataService;
pub use model::{Actor, ActorMovie, Movie, Role};
pub use reader::{DataError, DataReader};
