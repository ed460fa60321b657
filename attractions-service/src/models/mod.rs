pub mod attraction;
pub mod log_row;
pub mod schema;

pub use attraction::{Attraction, AttractionList};
pub use log_row::LogRow;
pub use schema::{FieldKind, FieldSpec, ResponseSchema, SchemaViolation};
