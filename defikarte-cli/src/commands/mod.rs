pub mod list;
pub mod submit;
