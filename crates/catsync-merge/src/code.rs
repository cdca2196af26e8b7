use catsync_types::CatalogEntry;

/// The legacy code of the source entry before and after the current edit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeChange {
    original: Option<String>,
    current: Option<String>,
}

fn normalized(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

impl CodeChange {
    pub fn new(original: Option<&str>, current: Option<&str>) -> Self {
        Self {
            original: normalized(original),
            current: normalized(current),
        }
    }

    /// No edit: the stored code is both the original and the current one.
    pub fn unchanged(entry: &CatalogEntry) -> Self {
        Self::new(entry.code(), entry.code())
    }

    /// The code the entry had before this edit.
    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    /// A code assigned during this edit that differs from the original.
    pub fn fresh(&self) -> Option<&str> {
        match (&self.current, &self.original) {
            (Some(c), Some(o)) if c == o => None,
            (Some(c), _) => Some(c),
            (None, _) => None,
        }
    }

    /// The edit emptied a code that was set.
    pub fn cleared(&self) -> bool {
        self.original.is_some() && self.current.is_none()
    }
}
