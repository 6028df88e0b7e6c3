pub mod response;

pub use response::{ActionInput, ViewResponse};
