pub mod errors;
pub mod functions;
pub mod models;
pub mod parser;
pub mod resolver;
pub mod services;

pub use errors::*;
pub use functions::*;
pub use models::*;
pub use services::*;
