pub mod cache;
pub mod decl;
pub mod record;
pub mod resolver;
pub mod stream;

pub use cache::{bindings_for, BindingCache};
pub use decl::{FieldDecl, TableDecl, TypeDecl};
pub use record::{
    unknown_field, Describe, FieldInput, FieldValue, NoParams, Record, RowSequence,
};
pub use resolver::{names_match, resolve, FieldBinding, TableType, TypeBindings, DEFAULT_SCHEMA};
pub use stream::{SinkKind, StreamSpec, StreamTarget, TextEncoding};
