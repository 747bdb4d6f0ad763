mod error;
pub mod extract;
mod log;
pub mod midware;
pub mod routes;

pub use error::{ClientError, Error, Resource, WebResult};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
