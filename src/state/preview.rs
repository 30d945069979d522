// Preview state - content of the selected entry, guarded against stale responses
use crate::entry::ElementDescriptor;
use crate::io::protocol::{ElementContent, ElementInfoRequest};

/// Identifies one lookup. Only the most recently issued token may commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewToken {
    pub directory_id: String,
    pub epoch: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing is selected; the empty file preview is already in place.
    Immediate,
    /// The caller must send this request and hand the answer to [`PreviewResolver::commit`].
    Lookup(PreviewToken, ElementInfoRequest),
}

#[derive(Debug, Default)]
pub struct PreviewResolver {
    content: ElementContent,
    epoch: u64,
    pending: Option<PreviewToken>,
}

impl PreviewResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start resolving the preview for `entry` in `directory_id`. Any lookup
    /// still in flight becomes stale.
    pub fn resolve(&mut self, directory_id: &str, entry: Option<&ElementDescriptor>) -> Resolution {
        self.epoch += 1;
        match entry {
            None => {
                self.pending = None;
                self.content = ElementContent::empty_file();
                Resolution::Immediate
            }
            Some(entry) => {
                let token = PreviewToken {
                    directory_id: directory_id.to_string(),
                    epoch: self.epoch,
                };
                self.pending = Some(token.clone());
                Resolution::Lookup(
                    token,
                    ElementInfoRequest {
                        current_dir: directory_id.to_string(),
                        element_name: entry.name.clone(),
                    },
                )
            }
        }
    }

    pub fn is_current(&self, token: &PreviewToken) -> bool {
        self.pending.as_ref() == Some(token)
    }

    /// Returns false (and changes nothing) when the token is stale.
    pub fn commit(&mut self, token: &PreviewToken, content: ElementContent) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.pending = None;
        self.content = content;
        true
    }

    /// Give up on the current lookup. The previous entry's content is
    /// dropped so it is never shown for the new selection.
    pub fn abandon(&mut self, token: &PreviewToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.pending = None;
        self.content = ElementContent::empty_file();
        true
    }

    pub fn content(&self) -> &ElementContent {
        &self.content
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
