use std::collections::btree_set::{BTreeSet, Iter};

/// Every product id observed by previous runs
///
/// The set only ever grows: ids stay in it even after the product disappears
/// from the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    ids: BTreeSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, pid: &str) -> bool {
        self.ids.contains(pid)
    }

    /// Records an id, returning true if it was not seen before
    pub fn insert(&mut self, pid: impl Into<String>) -> bool {
        self.ids.insert(pid.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in ascending order
    pub fn iter(&self) -> Iter<'_, String> {
        self.ids.iter()
    }

    /// True if every id in `other` is also in `self`
    pub fn is_superset(&self, other: &SeenSet) -> bool {
        self.ids.is_superset(&other.ids)
    }

    /// Union of both sets
    pub fn union(&self, other: &SeenSet) -> SeenSet {
        SeenSet {
            ids: self.ids.union(&other.ids).cloned().collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for SeenSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.ids.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a SeenSet {
    type Item = &'a String;
    type IntoIter = Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
