mod server_error;
mod unprocessable_entity;

pub use server_error::*;
pub use unprocessable_entity::*;
