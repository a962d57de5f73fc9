use crate::error::{Result, RoutineError};
use crate::metadata::decl::{FieldDecl, TypeDecl};
use crate::metadata::stream::{SinkKind, StreamSpec, StreamTarget};
use crate::protocol::{DbType, Direction};

pub const DEFAULT_SCHEMA: &str = "dbo";

/// Resolved row type of a table-valued field.
///
/// `schema` and `name` hold what the field or its declared element type
/// annotates; anything left unset is filled from the runtime element type,
/// then from `dbo` and the field identity.
#[derive(Debug, Clone)]
pub struct TableType {
    pub schema: Option<String>,
    pub name: Option<String>,
    pub field: &'static str,
    /// Element type declaration, when the field names one
    pub element: Option<fn() -> TypeDecl>,
}

impl PartialEq for TableType {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.name == other.name && self.field == other.field
    }
}

impl TableType {
    pub fn qualified_name(&self) -> String {
        self.qualified_name_for(None)
    }

    /// Qualified row type name, consulting the bindings of the element type
    /// actually held by the field before the defaults.
    pub fn qualified_name_for(&self, element: Option<&TypeBindings>) -> String {
        let schema = self
            .schema
            .as_deref()
            .or_else(|| element.and_then(|e| e.table_schema.as_deref()))
            .unwrap_or(DEFAULT_SCHEMA);
        let name = self
            .name
            .as_deref()
            .or_else(|| element.and_then(|e| e.table_name.as_deref()))
            .unwrap_or(self.field);
        format!("{}.{}", schema, name)
    }
}

/// Fully resolved binding of one host field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    pub field: &'static str,
    pub name: String,
    pub direction: Direction,
    pub db_type: Option<DbType>,
    pub user_type_name: Option<String>,
    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub ordinal: Option<usize>,
    pub table_type: Option<TableType>,
    pub stream: Option<StreamSpec>,
    pub optional_in_result: bool,
}

impl FieldBinding {
    pub fn is_table_valued(&self) -> bool {
        self.table_type.is_some()
    }

    pub fn is_output(&self) -> bool {
        self.direction.is_output()
    }

    /// Binding name compared the way the database compares parameter and
    /// column names.
    pub fn matches_name(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }
}

/// Case-insensitive name comparison ignoring a leading `@` on either side.
pub fn names_match(a: &str, b: &str) -> bool {
    let a = a.strip_prefix('@').unwrap_or(a);
    let b = b.strip_prefix('@').unwrap_or(b);
    a.eq_ignore_ascii_case(b)
}

/// Ordered bindings of one host type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeBindings {
    pub type_name: &'static str,
    /// Row-type schema declared on the type, used when it is a table element
    pub table_schema: Option<String>,
    pub table_name: Option<String>,
    fields: Vec<FieldBinding>,
}

impl TypeBindings {
    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    pub fn get(&self, index: usize) -> Option<&FieldBinding> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<(usize, &FieldBinding)> {
        self.fields.iter().enumerate().find(|(_, f)| f.matches_name(name))
    }

    pub fn find_by_ordinal(&self, ordinal: usize) -> Option<(usize, &FieldBinding)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.ordinal == Some(ordinal))
    }
}

/// Resolves a type declaration into its ordered bindings.
///
/// Missing optional metadata never fails; duplicate binding names, a
/// filename field the type does not declare and stream targets that do not
/// fit their sink do.
pub fn resolve(decl: &TypeDecl) -> Result<TypeBindings> {
    let mut fields: Vec<FieldBinding> = Vec::with_capacity(decl.fields.len());

    for field in decl.fields.iter().filter(|f| !f.not_mapped) {
        let binding = resolve_field(decl, field)?;
        if let Some(existing) = fields.iter().find(|f| f.matches_name(&binding.name)) {
            return Err(RoutineError::Configuration(format!(
                "{}: fields '{}' and '{}' both bind to '{}'",
                decl.type_name, existing.field, binding.field, binding.name
            )));
        }
        fields.push(binding);
    }

    log::trace!(
        "resolved bindings type={} fields={}",
        decl.type_name,
        fields.len()
    );

    Ok(TypeBindings {
        type_name: decl.type_name,
        table_schema: decl.schema.clone(),
        table_name: decl.table_name.clone(),
        fields,
    })
}

fn resolve_field(decl: &TypeDecl, field: &FieldDecl) -> Result<FieldBinding> {
    let table_type = if field.is_table_valued() {
        Some(resolve_table_type(field))
    } else {
        None
    };

    if let Some(spec) = &field.stream {
        if table_type.is_some() {
            return Err(RoutineError::Configuration(format!(
                "{}.{}: a table-valued field cannot be streamed",
                decl.type_name, field.field
            )));
        }
        validate_stream(decl, field.field, spec)?;
    }

    let db_type = if table_type.is_some() {
        Some(DbType::Structured)
    } else {
        field.db_type
    };

    Ok(FieldBinding {
        field: field.field,
        name: field.name.clone().unwrap_or_else(|| field.field.to_string()),
        direction: field.direction.unwrap_or_default(),
        db_type,
        user_type_name: field.type_name.clone(),
        size: field.size,
        precision: field.precision,
        scale: field.scale,
        ordinal: field.ordinal,
        table_type,
        stream: field.stream.clone(),
        optional_in_result: field.optional_in_result,
    })
}

fn resolve_table_type(field: &FieldDecl) -> TableType {
    let own = field.table.clone().unwrap_or_default();
    let element = own.element.map(|describe| describe());

    TableType {
        schema: own
            .schema
            .or_else(|| element.as_ref().and_then(|e| e.schema.clone())),
        name: own
            .table_name
            .or_else(|| element.as_ref().and_then(|e| e.table_name.clone())),
        field: field.field,
        element: own.element,
    }
}

fn validate_stream(decl: &TypeDecl, field: &str, spec: &StreamSpec) -> Result<()> {
    match &spec.sink {
        SinkKind::File {
            filename_field: Some(source),
            ..
        } => {
            if !decl.fields.iter().any(|f| f.field == *source) {
                return Err(RoutineError::Configuration(format!(
                    "{}.{}: filename field '{}' is not declared",
                    decl.type_name, field, source
                )));
            }
        }
        SinkKind::Memory => {
            if spec.target == (StreamTarget::OpenStream { leave_open: false }) {
                return Err(RoutineError::Configuration(format!(
                    "{}.{}: memory sinks are always handed over open",
                    decl.type_name, field
                )));
            }
        }
        SinkKind::File { .. } => {}
    }
    Ok(())
}
