//! Helpers behind the per-column multi-select filter widget.

use std::collections::BTreeSet;

/// Upper bound on options rendered in one dropdown.
pub const MAX_VISIBLE_OPTIONS: usize = 100;

/// Options whose decimal text contains `query`; everything for an empty query.
pub fn narrow_options(options: &[i64], query: &str) -> Vec<i64> {
    if query.is_empty() {
        return options.to_vec();
    }
    options
        .iter()
        .copied()
        .filter(|v| v.to_string().contains(query))
        .collect()
}

/// A narrowed option list, truncated for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionList {
    /// All options matching the query.
    pub matches: Vec<i64>,
    /// How many leading entries of `matches` are rendered.
    pub shown: usize,
}

impl OptionList {
    pub fn new(options: &[i64], query: &str) -> Self {
        let matches = narrow_options(options, query);
        let shown = matches.len().min(MAX_VISIBLE_OPTIONS);
        Self { matches, shown }
    }

    pub fn visible(&self) -> &[i64] {
        &self.matches[..self.shown]
    }

    pub fn total(&self) -> usize {
        self.matches.len()
    }

    pub fn has_more(&self) -> bool {
        self.matches.len() > self.shown
    }
}

/// New selection with `value` flipped.
pub fn toggle_value(selected: &BTreeSet<i64>, value: i64) -> BTreeSet<i64> {
    let mut next = selected.clone();
    if !next.remove(&value) {
        next.insert(value);
    }
    next
}

/// "Select all" over the narrowed options, or clear when they are all selected.
///
/// Mirrors the dropdown button: the comparison is by count, so a selection of
/// the same size as the narrowed list reads as "all selected".
pub fn toggle_select_all(selected: &BTreeSet<i64>, narrowed: &[i64]) -> BTreeSet<i64> {
    if selected.len() == narrowed.len() {
        BTreeSet::new()
    } else {
        narrowed.iter().copied().collect()
    }
}

/// Button caption for a multi-select.
pub fn selection_label(selected: &BTreeSet<i64>, placeholder: &str) -> String {
    let mut iter = selected.iter();
    match (iter.next(), selected.len()) {
        (None, _) => placeholder.to_string(),
        (Some(v), 1) => v.to_string(),
        (_, n) => format!("{n} selected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(vals: &[i64]) -> BTreeSet<i64> {
        vals.iter().copied().collect()
    }

    #[test]
    fn narrowing_by_substring() {
        let opts = [1, 2, 3, 10, 20, 30, 100, 200];
        assert_eq!(narrow_options(&opts, "10"), vec![10, 100]);
        assert_eq!(narrow_options(&opts, ""), opts.to_vec());
        assert!(narrow_options(&opts, "7").is_empty());
    }

    #[test]
    fn option_list_truncates() {
        let opts: Vec<i64> = (0..250).collect();
        let list = OptionList::new(&opts, "");
        assert_eq!(list.visible().len(), MAX_VISIBLE_OPTIONS);
        assert_eq!(list.total(), 250);
        assert!(list.has_more());

        let list = OptionList::new(&opts, "24");
        assert_eq!(
            list.visible(),
            &[24, 124, 224, 240, 241, 242, 243, 244, 245, 246, 247, 248, 249]
        );
        assert!(!list.has_more());
    }

    #[test]
    fn toggling_adds_then_removes() {
        let s = toggle_value(&set(&[3]), 1);
        assert_eq!(s, set(&[1, 3]));
        assert_eq!(toggle_value(&s, 3), set(&[1]));
    }

    #[test]
    fn select_all_then_deselect() {
        let narrowed = [10, 100];
        let all = toggle_select_all(&set(&[]), &narrowed);
        assert_eq!(all, set(&[10, 100]));
        assert!(toggle_select_all(&all, &narrowed).is_empty());
        assert_eq!(toggle_select_all(&set(&[10]), &narrowed), set(&[10, 100]));
    }

    #[test]
    fn labels() {
        assert_eq!(selection_label(&set(&[]), "Select values"), "Select values");
        assert_eq!(selection_label(&set(&[7]), "Select values"), "7");
        assert_eq!(selection_label(&set(&[1, 2]), "Select values"), "2 selected");
    }
}
