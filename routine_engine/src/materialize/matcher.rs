use crate::engine::executor::ColumnInfo;
use crate::metadata::TypeBindings;

/// One cursor column and the binding it is read into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMatch {
    pub column: usize,
    pub column_name: String,
    pub binding: usize,
}

/// Column-to-field assignment for one result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadPlan {
    matches: Vec<ColumnMatch>,
    unmapped: Vec<String>,
}

impl ReadPlan {
    pub fn matches(&self) -> &[ColumnMatch] {
        &self.matches
    }

    /// Cursor columns no field was matched to.
    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Matches cursor columns against bindings.
///
/// A case-insensitive name match wins; a column without one falls back to
/// the field whose explicit ordinal equals the column index, unless that
/// field was already claimed by name. Anything else is ignored.
pub fn match_columns(columns: &[ColumnInfo], bindings: &TypeBindings) -> ReadPlan {
    let by_name: Vec<Option<usize>> = columns
        .iter()
        .map(|c| bindings.find_by_name(&c.name).map(|(idx, _)| idx))
        .collect();

    let mut plan = ReadPlan::default();
    for (column, info) in columns.iter().enumerate() {
        let binding = by_name[column].or_else(|| {
            bindings
                .find_by_ordinal(column)
                .map(|(idx, _)| idx)
                .filter(|idx| !by_name.contains(&Some(*idx)))
        });
        match binding {
            Some(binding) => plan.matches.push(ColumnMatch {
                column,
                column_name: info.name.clone(),
                binding,
            }),
            None => plan.unmapped.push(info.name.clone()),
        }
    }

    if !plan.unmapped.is_empty() {
        log::trace!(
            "unmapped columns type={} columns={:?}",
            bindings.type_name,
            plan.unmapped
        );
    }
    plan
}
