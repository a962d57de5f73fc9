use crate::engine::cancellation::CancellationToken;
use crate::engine::executor::ResultCursor;
use crate::error::Result;
use crate::materialize::{materialize_set, SinkOptions};
use crate::metadata::{Describe, Record};
use std::any::{Any, TypeId};
use std::fmt;

type MaterializeFn =
    fn(&mut dyn ResultCursor, &SinkOptions, &CancellationToken) -> Result<ResultSet>;

/// Declared element type of one expected result set.
#[derive(Clone, Copy)]
pub struct ResultType {
    type_id: TypeId,
    type_name: &'static str,
    materialize: MaterializeFn,
}

impl ResultType {
    pub fn of<T>() -> Self
    where
        T: Describe + Record + Default + Send + 'static,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            materialize: materialize_as::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn materialize(
        &self,
        cursor: &mut dyn ResultCursor,
        options: &SinkOptions,
        cancel: &CancellationToken,
    ) -> Result<ResultSet> {
        (self.materialize)(cursor, options, cancel)
    }
}

impl fmt::Debug for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResultType").field(&self.type_name).finish()
    }
}

impl PartialEq for ResultType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

fn materialize_as<T>(
    cursor: &mut dyn ResultCursor,
    options: &SinkOptions,
    cancel: &CancellationToken,
) -> Result<ResultSet>
where
    T: Describe + Record + Default + Send + 'static,
{
    materialize_set::<T>(cursor, options, cancel).map(ResultSet::new)
}

/// Rows of one result set, all of one element type.
pub struct ResultSet {
    type_id: TypeId,
    type_name: &'static str,
    len: usize,
    rows: Box<dyn Any + Send>,
}

impl ResultSet {
    pub fn new<T: Send + 'static>(rows: Vec<T>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            len: rows.len(),
            rows: Box::new(rows),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub fn rows<T: 'static>(&self) -> Option<&[T]> {
        self.rows.downcast_ref::<Vec<T>>().map(Vec::as_slice)
    }

    /// Returns the rows, or the set unchanged if `T` is not its element type.
    pub fn into_rows<T: 'static>(self) -> std::result::Result<Vec<T>, ResultSet> {
        if !self.is::<T>() {
            return Err(self);
        }
        let Self {
            type_id,
            type_name,
            len,
            rows,
        } = self;
        rows.downcast::<Vec<T>>().map(|b| *b).map_err(|rows| ResultSet {
            type_id,
            type_name,
            len,
            rows,
        })
    }
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("type", &self.type_name)
            .field("len", &self.len)
            .finish()
    }
}

/// Ordered result sets of one call.
#[derive(Debug, Default)]
pub struct ResultsCollection {
    sets: Vec<ResultSet>,
}

impl ResultsCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, set: ResultSet) {
        self.sets.push(set);
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ResultSet> {
        self.sets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultSet> {
        self.sets.iter()
    }

    /// Rows of the first non-empty set of element type `T`; empty when
    /// there is none.
    pub fn by_type<T: 'static>(&self) -> &[T] {
        self.sets
            .iter()
            .filter(|s| !s.is_empty())
            .find_map(|s| s.rows::<T>())
            .unwrap_or_default()
    }

    /// Removes and returns the rows `by_type` would return.
    pub fn take<T: 'static>(&mut self) -> Vec<T> {
        let Some(idx) = self.sets.iter().position(|s| !s.is_empty() && s.is::<T>()) else {
            return Vec::new();
        };
        let set = self.sets.remove(idx);
        set.into_rows::<T>().unwrap_or_default()
    }

    pub fn into_sets(self) -> Vec<ResultSet> {
        self.sets
    }
}

impl IntoIterator for ResultsCollection {
    type Item = ResultSet;
    type IntoIter = std::vec::IntoIter<ResultSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.into_iter()
    }
}
