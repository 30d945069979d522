// Session state - the directory currently shown and the selected row
use crate::entry::ElementDescriptor;
use crate::error::NavError;

/// A directory as returned by the backend, in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryListing {
    pub directory_id: String,
    pub entries: Vec<ElementDescriptor>,
}

/// Invariant: `selected_index < entries.len()`, or `0` when there are no entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    directory_id: Option<String>,
    entries: Vec<ElementDescriptor>,
    selected_index: usize,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole session with `listing`, pre-selecting the entry
    /// named `restore_name` when it exists.
    pub fn apply_listing(&mut self, listing: DirectoryListing, restore_name: Option<&str>) {
        *self = SessionState {
            directory_id: Some(listing.directory_id),
            entries: listing.entries,
            selected_index: 0,
        };
        if let Some(index) = restore_name.and_then(|name| self.position_of(name)) {
            self.selected_index = index;
        }
    }

    /// Returns whether the selection changed.
    pub fn select(&mut self, index: usize) -> Result<bool, NavError> {
        if index >= self.entries.len() {
            return Err(NavError::OutOfRangeSelection {
                index,
                len: self.entries.len(),
            });
        }
        let changed = self.selected_index != index;
        self.selected_index = index;
        Ok(changed)
    }

    pub fn directory_id(&self) -> Option<&str> {
        self.directory_id.as_deref()
    }

    pub fn entries(&self) -> &[ElementDescriptor] {
        &self.entries
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected_entry(&self) -> Option<&ElementDescriptor> {
        self.entries.get(self.selected_index)
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}
