pub mod module;
pub mod token;
