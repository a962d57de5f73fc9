pub mod binder;
pub mod layout;
pub mod table_value;

pub use binder::{bind, replay_outputs, BoundParameters, FieldMap};
pub use layout::layout;
pub use table_value::{build_schema, encode};
