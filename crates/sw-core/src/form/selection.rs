//! Multi-select fields.
//!
//! Lists are never mutated in place: callers compute the add/remove first and
//! submit the whole replacement list, which the store then swaps wholesale.

use thiserror::Error;

/// Add or remove `item`, returning the replacement list. Order of existing
/// items is preserved and an item is never listed twice.
pub fn toggle<S: AsRef<str>>(current: &[S], item: &str, selected: bool) -> Vec<String> {
    let mut next: Vec<String> = current
        .iter()
        .map(|s| s.as_ref().to_string())
        .filter(|s| s != item)
        .collect();
    if selected {
        next.push(item.to_string());
    }
    next
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionViolation {
    #[error("select at least {min}")]
    TooFew { min: usize },
    #[error("select at most {max}")]
    TooMany { max: usize },
    #[error("\"{first}\" cannot be combined with \"{second}\"")]
    Exclusive { first: String, second: String },
    #[error("\"{0}\" is not an available option")]
    Unknown(String),
}

/// Cap, floor and pairwise-exclusion rules of one multi-select field.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRules {
    pub min: usize,
    pub max: usize,
    pub options: &'static [&'static str],
    pub exclusive_pairs: &'static [(&'static str, &'static str)],
}

impl SelectionRules {
    pub fn check<S: AsRef<str>>(&self, selected: &[S]) -> Result<(), SelectionViolation> {
        if selected.len() < self.min {
            return Err(SelectionViolation::TooFew { min: self.min });
        }
        if selected.len() > self.max {
            return Err(SelectionViolation::TooMany { max: self.max });
        }
        if let Some(unknown) = selected
            .iter()
            .map(AsRef::as_ref)
            .find(|item| !self.options.is_empty() && !self.options.contains(item))
        {
            return Err(SelectionViolation::Unknown(unknown.to_string()));
        }
        let has = |needle: &str| selected.iter().any(|s| s.as_ref() == needle);
        for (first, second) in self.exclusive_pairs {
            if has(first) && has(second) {
                return Err(SelectionViolation::Exclusive {
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
        Ok(())
    }
}
