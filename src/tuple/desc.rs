//! Tuple descriptors.

use std::fmt;

use crate::common::config::STRING_LEN;

use super::Tuple;

/// Column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// 32-bit signed integer.
    Int,
    /// Bounded string of at most [`STRING_LEN`] bytes.
    String,
}

impl Type {
    /// Encoded size of a value of this type in bytes.
    pub const fn size(&self) -> usize {
        match self {
            Type::Int => 4,
            // length prefix + fixed payload
            Type::String => 4 + STRING_LEN,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "INT"),
            Type::String => write!(f, "STRING"),
        }
    }
}

/// One column of a [`TupleDesc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TdItem {
    pub field_type: Type,
    pub field_name: Option<String>,
}

/// Schema of a table: an ordered list of typed, optionally named, columns.
///
/// Two descriptors are equal when their column types are equal; names don't
/// take part, so renaming a column doesn't change what fits on a page.
///
/// # Example
/// ```
/// use heapdb::tuple::{TupleDesc, Type};
///
/// let td = TupleDesc::with_names([(Type::Int, "id"), (Type::String, "name")]);
/// assert_eq!(td.num_fields(), 2);
/// assert_eq!(td.size(), 4 + 4 + 128);
/// assert_eq!(td.index_of("name"), Some(1));
/// ```
#[derive(Debug, Clone, Eq)]
pub struct TupleDesc {
    items: Vec<TdItem>,
}

impl TupleDesc {
    /// Create a descriptor with unnamed columns.
    ///
    /// # Panics
    /// Panics if `types` is empty.
    pub fn new(types: impl IntoIterator<Item = Type>) -> Self {
        Self::from_items(
            types
                .into_iter()
                .map(|field_type| TdItem {
                    field_type,
                    field_name: None,
                })
                .collect(),
        )
    }

    /// Create a descriptor with named columns.
    ///
    /// # Panics
    /// Panics if no columns are given.
    pub fn with_names<S: Into<String>>(fields: impl IntoIterator<Item = (Type, S)>) -> Self {
        Self::from_items(
            fields
                .into_iter()
                .map(|(field_type, name)| TdItem {
                    field_type,
                    field_name: Some(name.into()),
                })
                .collect(),
        )
    }

    fn from_items(items: Vec<TdItem>) -> Self {
        assert!(!items.is_empty(), "a tuple descriptor needs at least one field");
        Self { items }
    }

    /// Number of columns.
    #[inline]
    pub fn num_fields(&self) -> usize {
        self.items.len()
    }

    pub fn field_type(&self, i: usize) -> Option<Type> {
        self.items.get(i).map(|item| item.field_type)
    }

    pub fn field_name(&self, i: usize) -> Option<&str> {
        self.items.get(i).and_then(|item| item.field_name.as_deref())
    }

    /// Position of the first column called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.field_name.as_deref() == Some(name))
    }

    /// Encoded size of one tuple in bytes.
    pub fn size(&self) -> usize {
        self.items.iter().map(|item| item.field_type.size()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TdItem> {
        self.items.iter()
    }

    /// Whether `tuple` has exactly these column types, in order, with every
    /// value small enough to store.
    pub fn matches(&self, tuple: &Tuple) -> bool {
        tuple.fields().len() == self.items.len()
            && tuple
                .fields()
                .iter()
                .zip(&self.items)
                .all(|(field, item)| field.field_type() == item.field_type && field.fits())
    }
}

impl PartialEq for TupleDesc {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|(a, b)| a.field_type == b.field_type)
    }
}

impl fmt::Display for TupleDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match &item.field_name {
                Some(name) => write!(f, "{}({})", item.field_type, name)?,
                None => write!(f, "{}", item.field_type)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::Field;

    #[test]
    fn test_size() {
        assert_eq!(TupleDesc::new([Type::Int]).size(), 4);
        assert_eq!(TupleDesc::new([Type::Int, Type::Int, Type::Int]).size(), 12);
        assert_eq!(
            TupleDesc::new([Type::Int, Type::String]).size(),
            4 + 4 + STRING_LEN
        );
    }

    #[test]
    fn test_equality_ignores_names() {
        let named = TupleDesc::with_names([(Type::Int, "a"), (Type::Int, "b")]);
        let unnamed = TupleDesc::new([Type::Int, Type::Int]);
        assert_eq!(named, unnamed);
        assert_ne!(unnamed, TupleDesc::new([Type::Int]));
        assert_ne!(unnamed, TupleDesc::new([Type::Int, Type::String]));
    }

    #[test]
    fn test_lookup() {
        let td = TupleDesc::with_names([(Type::Int, "id"), (Type::String, "name")]);
        assert_eq!(td.field_type(1), Some(Type::String));
        assert_eq!(td.field_type(2), None);
        assert_eq!(td.field_name(0), Some("id"));
        assert_eq!(td.index_of("missing"), None);
        assert_eq!(TupleDesc::new([Type::Int]).field_name(0), None);
    }

    #[test]
    fn test_matches() {
        let td = TupleDesc::new([Type::Int, Type::String]);
        assert!(td.matches(&Tuple::new(vec![Field::Int(1), Field::Str("x".into())])));
        assert!(!td.matches(&Tuple::new(vec![Field::Int(1)])));
        assert!(!td.matches(&Tuple::new(vec![Field::Int(1), Field::Int(2)])));
    }

    #[test]
    fn test_matches_rejects_oversized_string() {
        let td = TupleDesc::new([Type::String]);
        let exact = Tuple::new(vec![Field::Str("x".repeat(STRING_LEN))]);
        let over = Tuple::new(vec![Field::Str("x".repeat(STRING_LEN + 1))]);
        assert!(td.matches(&exact));
        assert!(!td.matches(&over));
    }

    #[test]
    fn test_display() {
        let td = TupleDesc::with_names([(Type::Int, "id"), (Type::String, "name")]);
        assert_eq!(format!("{}", td), "INT(id), STRING(name)");
    }

    #[test]
    #[should_panic(expected = "at least one field")]
    fn test_empty_descriptor_panics() {
        TupleDesc::new([]);
    }
}
