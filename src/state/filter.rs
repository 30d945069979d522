// Prefix filtering of the current listing

/// Receives the text typed into the filter input.
pub type FilterHandler = Box<dyn FnMut(&str)>;

/// Holds the single handler that typed filter input is routed to.
///
/// Registering replaces the previous handler outright; there is no queue, so
/// only the latest handler ever sees input.
#[derive(Default)]
pub struct FilterSlot {
    handler: Option<FilterHandler>,
    generation: u64,
}

impl FilterSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: FilterHandler) {
        self.handler = Some(handler);
        self.generation += 1;
    }

    /// Returns false when no handler is registered.
    pub fn dispatch(&mut self, prefix: &str) -> bool {
        match self.handler.as_mut() {
            Some(handler) => {
                handler(prefix);
                true
            }
            None => false,
        }
    }

    /// Bumped on every registration.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_bound(&self) -> bool {
        self.handler.is_some()
    }
}

impl std::fmt::Debug for FilterSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterSlot")
            .field("bound", &self.is_bound())
            .field("generation", &self.generation)
            .finish()
    }
}

/// Indices of `names` starting with `prefix`. An empty prefix matches all.
pub fn prefix_matches<S: AsRef<str>>(names: &[S], prefix: &str, case_sensitive: bool) -> Vec<usize> {
    let folded = if case_sensitive {
        prefix.to_string()
    } else {
        prefix.to_lowercase()
    };
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            let name = name.as_ref();
            if case_sensitive {
                name.starts_with(&folded)
            } else {
                name.to_lowercase().starts_with(&folded)
            }
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Filter text and the rows it leaves visible.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub text: String,
    pub visible: Vec<usize>,
}

impl FilterState {
    /// No filter over `len` entries.
    pub fn unfiltered(len: usize) -> Self {
        Self {
            text: String::new(),
            visible: (0..len).collect(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.visible.contains(&index)
    }

    /// Step `delta` visible rows away from `current`.
    pub fn step(&self, current: usize, delta: i32, wrap: bool) -> Option<usize> {
        if self.visible.is_empty() {
            return None;
        }
        let len = self.visible.len() as i64;
        let Some(pos) = self.visible.iter().position(|&i| i == current) else {
            return self.visible.first().copied();
        };
        let target = pos as i64 + delta as i64;
        let target = if wrap {
            target.rem_euclid(len)
        } else {
            target.clamp(0, len - 1)
        };
        self.visible.get(target as usize).copied()
    }
}
