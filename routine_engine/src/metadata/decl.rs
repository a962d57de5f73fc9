use crate::metadata::record::Describe;
use crate::metadata::stream::{StreamSpec, StreamTarget, TextEncoding};
use crate::protocol::{DbType, Direction};
use std::path::PathBuf;

/// Row-type identity declared for a table-valued field or element type.
#[derive(Debug, Clone, Default)]
pub struct TableDecl {
    pub(crate) schema: Option<String>,
    pub(crate) table_name: Option<String>,
    pub(crate) element: Option<fn() -> TypeDecl>,
}

/// Declared binding metadata of one host field.
///
/// Everything except the field identity is optional; the resolver fills
/// the defaults.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub(crate) field: &'static str,
    pub(crate) name: Option<String>,
    pub(crate) direction: Option<Direction>,
    pub(crate) db_type: Option<DbType>,
    pub(crate) type_name: Option<String>,
    pub(crate) size: Option<u32>,
    pub(crate) precision: Option<u8>,
    pub(crate) scale: Option<u8>,
    pub(crate) ordinal: Option<usize>,
    pub(crate) table: Option<TableDecl>,
    pub(crate) stream: Option<StreamSpec>,
    pub(crate) not_mapped: bool,
    pub(crate) optional_in_result: bool,
}

impl FieldDecl {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            name: None,
            direction: None,
            db_type: None,
            type_name: None,
            size: None,
            precision: None,
            scale: None,
            ordinal: None,
            table: None,
            stream: None,
            not_mapped: false,
            optional_in_result: false,
        }
    }

    /// Overrides the parameter / column name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn output(self) -> Self {
        self.direction(Direction::Output)
    }

    pub fn db_type(mut self, db_type: DbType) -> Self {
        self.db_type = Some(db_type);
        self
    }

    /// User-defined scalar type name.
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Marks the field table-valued with elements of type `T`.
    pub fn table_of<T: Describe>(mut self) -> Self {
        self.table.get_or_insert_with(TableDecl::default).element = Some(T::describe);
        self
    }

    /// Row-type name of a table-valued field.
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table.get_or_insert_with(TableDecl::default).table_name = Some(table_name.into());
        self
    }

    /// Owning schema of a table-valued field's row type.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.table.get_or_insert_with(TableDecl::default).schema = Some(schema.into());
        self
    }

    pub fn stream(mut self, spec: StreamSpec) -> Self {
        self.stream = Some(spec);
        self
    }

    /// Streams the column into a file under `location`, named by the value of
    /// `filename_field` when given.
    pub fn stream_to_file(
        self,
        location: impl Into<PathBuf>,
        filename_field: Option<&'static str>,
        buffered: bool,
        leave_open: bool,
    ) -> Self {
        let mut spec = StreamSpec::to_file(location)
            .buffered(buffered)
            .target(StreamTarget::OpenStream { leave_open });
        if let Some(field) = filename_field {
            spec = spec.filename_field(field);
        }
        self.stream(spec)
    }

    /// Streams the column into memory and delivers it as decoded text.
    pub fn stream_to_memory(self, encoding: Option<TextEncoding>, buffered: bool) -> Self {
        self.stream(
            StreamSpec::to_memory()
                .buffered(buffered)
                .target(StreamTarget::Text(encoding)),
        )
    }

    pub fn not_mapped(mut self) -> Self {
        self.not_mapped = true;
        self
    }

    /// A missing result column writes null instead of failing the row.
    pub fn optional_in_result(mut self) -> Self {
        self.optional_in_result = true;
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn is_table_valued(&self) -> bool {
        self.table.is_some() || matches!(self.db_type, Some(DbType::Structured))
    }
}

/// Declared binding metadata of a host type.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub(crate) type_name: &'static str,
    pub(crate) schema: Option<String>,
    pub(crate) table_name: Option<String>,
    pub(crate) fields: Vec<FieldDecl>,
}

impl TypeDecl {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            schema: None,
            table_name: None,
            fields: Vec::new(),
        }
    }

    /// Uses the unqualified Rust type name of `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self::new(short_type_name(std::any::type_name::<T>()))
    }

    /// Row-type schema used when this type is a table-valued element.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Row-type name used when this type is a table-valued element.
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
