pub mod observability;
pub mod runtime;
pub mod text_processing;
