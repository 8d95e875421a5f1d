//! Local filter views over the option lists held by the selection store.
//!
//! Filtering never touches the network and never mutates the stored lists:
//! a view is the ordered subset whose key equals the filter value, and the
//! empty filter value selects everything.

use crate::models::{AvailabilityOption, StudentOption};

/// Secondary attribute an option list can be filtered on.
pub trait FilterKey {
    fn filter_key(&self) -> &str;
}

impl FilterKey for StudentOption {
    fn filter_key(&self) -> &str {
        &self.klass
    }
}

impl FilterKey for AvailabilityOption {
    fn filter_key(&self) -> &str {
        &self.domain
    }
}

/// Options matching `filter`, in their original order.
pub fn filter_options<'a, T: FilterKey>(options: &'a [T], filter: &str) -> Vec<&'a T> {
    options
        .iter()
        .filter(|option| filter.is_empty() || option.filter_key() == filter)
        .collect()
}

/// Distinct keys in first-seen order, used as the filter choices.
pub fn distinct_keys<T: FilterKey>(options: &[T]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for option in options {
        let key = option.filter_key();
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}
