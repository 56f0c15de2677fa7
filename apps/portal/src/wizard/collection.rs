use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollectionError {
    #[error("No {label} entry at position {index} (have {len})")]
    OutOfRange {
        label: &'static str,
        index: usize,
        len: usize,
    },

    #[error("At least {min} {label} entry is required")]
    AtMinimum { label: &'static str, min: usize },
}

/// Ordered list editor behind the experience, language and skill sections.
///
/// Removal shifts later entries down by one; relative order of the survivors
/// never changes. The list never shrinks below `min_len`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEditor<T> {
    label: &'static str,
    min_len: usize,
    items: Vec<T>,
}

impl<T: Default> CollectionEditor<T> {
    /// Starts with `min_len` blank entries.
    pub fn new(label: &'static str, min_len: usize) -> Self {
        Self::with_items(label, min_len, Vec::new())
    }

    /// Wraps existing entries, padding with blanks up to `min_len`.
    pub fn with_items(label: &'static str, min_len: usize, mut items: Vec<T>) -> Self {
        while items.len() < min_len {
            items.push(T::default());
        }
        Self {
            label,
            min_len,
            items,
        }
    }

    /// Appends a blank entry and returns its index.
    pub fn add(&mut self) -> usize {
        self.push(T::default())
    }
}

impl<T> CollectionEditor<T> {
    pub fn push(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Result<T, CollectionError> {
        self.check_index(index)?;
        if self.items.len() <= self.min_len {
            return Err(CollectionError::AtMinimum {
                label: self.label,
                min: self.min_len,
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, CollectionError> {
        self.check_index(index)?;
        Ok(&mut self.items[index])
    }

    pub fn can_remove(&self) -> bool {
        self.items.len() > self.min_len
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<(), CollectionError> {
        if index >= self.items.len() {
            return Err(CollectionError::OutOfRange {
                label: self.label,
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }
}

impl<T: Serialize> Serialize for CollectionEditor<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}
