//! Session-local selection of catalog options and the totals derived from it.
//!
//! A [`Selection`] only stores ids. Names and prices are always read from the
//! catalog passed in, so the total can never drift from the current catalog.
//! After the catalog changes, call [`Selection::reconcile`] to drop ids that
//! no longer exist.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::id::OptionId;
use super::option::AddonOption;
use super::price::Price;

/// Set of option ids chosen in the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: BTreeSet<OptionId>,
}

/// Line in the price summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedItem {
    pub name: String,
    pub price: Price,
}

/// Selected lines and their total, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub items: Vec<SelectedItem>,
    pub total: Price,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id` if it is not selected, otherwise deselect it.
    ///
    /// Returns `true` if the id is selected afterwards. The id is not
    /// checked against the catalog.
    pub fn toggle(&mut self, id: OptionId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &OptionId) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop ids that are not present in `catalog`.
    ///
    /// Returns `true` if anything was removed.
    pub fn reconcile(&mut self, catalog: &[AddonOption]) -> bool {
        let known: HashSet<&OptionId> = catalog.iter().map(|option| &option.id).collect();
        let before = self.ids.len();
        self.ids.retain(|id| known.contains(id));
        self.ids.len() != before
    }

    /// Selected options as summary lines, in catalog order.
    #[must_use]
    pub fn selected_items(&self, catalog: &[AddonOption]) -> Vec<SelectedItem> {
        catalog
            .iter()
            .filter(|option| self.ids.contains(&option.id))
            .map(|option| SelectedItem {
                name: option.name.clone(),
                price: option.price,
            })
            .collect()
    }

    /// Sum of the selected prices. Zero for an empty selection.
    #[must_use]
    pub fn total(&self, catalog: &[AddonOption]) -> Price {
        catalog
            .iter()
            .filter(|option| self.ids.contains(&option.id))
            .map(|option| option.price)
            .sum()
    }

    /// Summary lines together with their total.
    #[must_use]
    pub fn quote(&self, catalog: &[AddonOption]) -> Quote {
        let items = self.selected_items(catalog);
        let total = items.iter().map(|item| item.price).sum();
        Quote { items, total }
    }
}

impl FromIterator<OptionId> for Selection {
    fn from_iter<I: IntoIterator<Item = OptionId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;

    use super::*;

    fn option(id: &str, name: &str, cents: i64) -> AddonOption {
        let now = Utc::now();
        AddonOption {
            id: OptionId::new(id),
            name: name.to_owned(),
            description: String::new(),
            price: Price::from_cents(cents),
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog() -> Vec<AddonOption> {
        vec![
            option("a", "Capa Básica", 15000),
            option("b", "Laminação Fosca", 8000),
        ]
    }

    #[test]
    fn test_scenario_two_options() {
        let catalog = catalog();
        let mut selection = Selection::new();
        selection.toggle(OptionId::new("a"));
        selection.toggle(OptionId::new("b"));

        assert_eq!(selection.total(&catalog), Price::from_cents(23000));
        assert_eq!(
            selection.selected_items(&catalog),
            vec![
                SelectedItem {
                    name: "Capa Básica".to_owned(),
                    price: Price::from_cents(15000),
                },
                SelectedItem {
                    name: "Laminação Fosca".to_owned(),
                    price: Price::from_cents(8000),
                },
            ]
        );
    }

    #[test]
    fn test_toggle_parity() {
        let sequence = ["a", "b", "a", "c", "c", "c", "d", "b", "a"];
        let mut selection = Selection::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for id in sequence {
            selection.toggle(OptionId::new(id));
            *counts.entry(id).or_default() += 1;
        }

        let expected: Selection = counts
            .into_iter()
            .filter(|(_, n)| n % 2 == 1)
            .map(|(id, _)| OptionId::new(id))
            .collect();
        assert_eq!(selection, expected);
        assert!(selection.contains(&OptionId::new("a")));
        assert!(selection.contains(&OptionId::new("c")));
        assert!(selection.contains(&OptionId::new("d")));
        assert!(!selection.contains(&OptionId::new("b")));
    }

    #[test]
    fn test_total_ignores_unselected_price_changes() {
        let mut catalog = catalog();
        let selection: Selection = [OptionId::new("a")].into_iter().collect();
        let before = selection.total(&catalog);

        if let Some(unselected) = catalog.iter_mut().find(|o| o.id.as_str() == "b") {
            unselected.price = Price::from_cents(99_900);
        }

        assert_eq!(selection.total(&catalog), before);
    }

    #[test]
    fn test_empty_selection_totals_zero() {
        let selection = Selection::new();
        assert_eq!(selection.total(&catalog()), Price::ZERO);
        assert!(selection.selected_items(&catalog()).is_empty());
    }

    #[test]
    fn test_selected_items_follow_catalog_order() {
        let catalog = catalog();
        let mut selection = Selection::new();
        selection.toggle(OptionId::new("b"));
        selection.toggle(OptionId::new("a"));

        let names: Vec<_> = selection
            .selected_items(&catalog)
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, ["Capa Básica", "Laminação Fosca"]);
    }

    #[test]
    fn test_reconcile_drops_removed_options() {
        let mut catalog = catalog();
        let mut selection: Selection = [OptionId::new("a"), OptionId::new("b")]
            .into_iter()
            .collect();

        catalog.retain(|o| o.id.as_str() != "a");

        assert!(selection.reconcile(&catalog));
        assert!(!selection.contains(&OptionId::new("a")));
        assert_eq!(selection.len(), 1);
        assert!(!selection.reconcile(&catalog));
    }

    #[test]
    fn test_quote_total_matches_items() {
        let catalog = catalog();
        let selection: Selection = [OptionId::new("b")].into_iter().collect();
        let quote = selection.quote(&catalog);
        assert_eq!(quote.items.len(), 1);
        assert_eq!(quote.total, selection.total(&catalog));
    }

    #[test]
    fn test_serializes_as_id_list() {
        let selection: Selection = [OptionId::new("b"), OptionId::new("a")]
            .into_iter()
            .collect();
        assert_eq!(serde_json::to_string(&selection).unwrap(), "[\"a\",\"b\"]");
    }
}
