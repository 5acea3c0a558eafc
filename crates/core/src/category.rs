//! Keyword-driven categorization.
//!
//! A [`CategoryMap`] is an ordered list of categories, each with an ordered
//! list of keywords. Matching walks the map front to back and the first
//! keyword found inside a description wins, so the order of entries decides
//! precedence when keywords overlap.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Category assigned when no keyword matches.
pub const OTHER: &str = "Other";

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category name must not be empty")]
    EmptyCategory,
    #[error("Keyword must not be empty")]
    EmptyKeyword,
    #[error("Keyword '{keyword}' is already present in category '{category}'")]
    DuplicateKeyword { category: String, keyword: String },
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Keyword '{keyword}' not found in category '{category}'")]
    KeywordNotFound { category: String, keyword: String },
    #[error("Failed to persist category map: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    name: String,
    keywords: Vec<String>,
}

impl CategoryEntry {
    /// Stored (lower-case) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name as shown to users and stamped on transactions.
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    entries: Vec<CategoryEntry>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, category: &str) -> Option<&CategoryEntry> {
        let key = normalize_text(category);
        self.entries.iter().find(|e| e.name == key)
    }

    /// Adds `keyword` to `category`, creating the category at the end of the
    /// map if it does not exist yet.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<(), CategoryError> {
        let name = normalize_text(category);
        if name.is_empty() {
            return Err(CategoryError::EmptyCategory);
        }
        let keyword = normalize_text(keyword);
        if keyword.is_empty() {
            return Err(CategoryError::EmptyKeyword);
        }

        match self.position(&name) {
            Some(idx) => {
                let entry = &mut self.entries[idx];
                if entry.keywords.contains(&keyword) {
                    return Err(CategoryError::DuplicateKeyword {
                        category: name,
                        keyword,
                    });
                }
                entry.keywords.push(keyword);
            }
            None => self.entries.push(CategoryEntry {
                name,
                keywords: vec![keyword],
            }),
        }
        Ok(())
    }

    pub fn delete_category(&mut self, category: &str) -> Result<(), CategoryError> {
        let name = normalize_text(category);
        let idx = self
            .position(&name)
            .ok_or(CategoryError::CategoryNotFound(name))?;
        self.entries.remove(idx);
        Ok(())
    }

    /// Removes one keyword; removing the last keyword removes the category.
    pub fn delete_keyword(&mut self, category: &str, keyword: &str) -> Result<(), CategoryError> {
        let name = normalize_text(category);
        let keyword = normalize_text(keyword);
        let idx = self
            .position(&name)
            .ok_or_else(|| CategoryError::CategoryNotFound(name.clone()))?;

        let entry = &mut self.entries[idx];
        let kw_idx = entry
            .keywords
            .iter()
            .position(|k| *k == keyword)
            .ok_or(CategoryError::KeywordNotFound {
                category: name,
                keyword,
            })?;
        entry.keywords.remove(kw_idx);
        if entry.keywords.is_empty() {
            self.entries.remove(idx);
        }
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}

/// Lower-cases, trims and collapses whitespace runs to a single space.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First character upper-case, the rest lower-case.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Returns the display name of the first category with a keyword contained
/// in `description`, or [`OTHER`].
pub fn categorize(description: &str, categories: &CategoryMap) -> String {
    let text = normalize_text(description);
    categories
        .iter()
        .find(|entry| entry.keywords.iter().any(|kw| text.contains(kw.as_str())))
        .map(CategoryEntry::display_name)
        .unwrap_or_else(|| OTHER.to_string())
}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryMapVisitor;

        impl<'de> Visitor<'de> for CategoryMapVisitor {
            type Value = CategoryMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category names to keyword lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CategoryMap, A::Error> {
                let mut categories = CategoryMap::new();
                while let Some((name, keywords)) = access.next_entry::<String, Vec<String>>()? {
                    for keyword in keywords {
                        // Stored maps may predate normalization; blanks and
                        // duplicates are dropped rather than rejected.
                        let _ = categories.add_keyword(&name, &keyword);
                    }
                }
                Ok(categories)
            }
        }

        deserializer.deserialize_map(CategoryMapVisitor)
    }
}

// ── Persistence seam ──────────────────────────────────────────────────────────

/// Where a category map lives between sessions.
pub trait CategoryStore {
    /// Reads the stored map. A missing or unreadable store reads as empty.
    fn load(&self) -> CategoryMap;

    fn save(&self, categories: &CategoryMap) -> Result<(), CategoryError>;
}

/// Process-local store, one lock per instance.
#[derive(Debug, Default)]
pub struct MemoryCategoryStore {
    categories: Mutex<CategoryMap>,
}

impl MemoryCategoryStore {
    pub fn new(categories: CategoryMap) -> Self {
        Self {
            categories: Mutex::new(categories),
        }
    }
}

impl CategoryStore for MemoryCategoryStore {
    fn load(&self) -> CategoryMap {
        self.categories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, categories: &CategoryMap) -> Result<(), CategoryError> {
        *self.categories.lock().unwrap_or_else(PoisonError::into_inner) = categories.clone();
        Ok(())
    }
}

/// Loads, adds a keyword, saves. Returns the saved map.
pub fn add_keyword<S: CategoryStore + ?Sized>(
    store: &S,
    category: &str,
    keyword: &str,
) -> Result<CategoryMap, CategoryError> {
    edit(store, |map| map.add_keyword(category, keyword))
}

pub fn delete_category<S: CategoryStore + ?Sized>(
    store: &S,
    category: &str,
) -> Result<CategoryMap, CategoryError> {
    edit(store, |map| map.delete_category(category))
}

pub fn delete_keyword<S: CategoryStore + ?Sized>(
    store: &S,
    category: &str,
    keyword: &str,
) -> Result<CategoryMap, CategoryError> {
    edit(store, |map| map.delete_keyword(category, keyword))
}

fn edit<S, F>(store: &S, mutate: F) -> Result<CategoryMap, CategoryError>
where
    S: CategoryStore + ?Sized,
    F: FnOnce(&mut CategoryMap) -> Result<(), CategoryError>,
{
    let mut categories = store.load();
    mutate(&mut categories)?;
    store.save(&categories)?;
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn map(entries: &[(&str, &[&str])]) -> CategoryMap {
        let mut categories = CategoryMap::new();
        for (name, keywords) in entries {
            for kw in *keywords {
                categories.add_keyword(name, kw).unwrap();
            }
        }
        categories
    }

    // ── categorize ────────────────────────────────────────────────────────────

    #[test]
    fn categorize_matches_case_insensitively() {
        let categories = map(&[("groceries", &["tesco", "lidl"])]);
        assert_eq!(categorize("TESCO EXPRESS LONDON", &categories), "Groceries");
        assert_eq!(categorize("Unknown Merchant", &categories), "Other");
    }

    #[test]
    fn categorize_collapses_whitespace() {
        let categories = map(&[("eating out", &["pizza hut"])]);
        assert_eq!(categorize("  PIZZA   \t HUT  dublin ", &categories), "Eating out");
    }

    #[test]
    fn categorize_first_category_in_map_order_wins() {
        let categories = map(&[("transport", &["shell"]), ("fuel", &["shell"])]);
        assert_eq!(categorize("SHELL GARAGE", &categories), "Transport");

        let reversed = map(&[("fuel", &["shell"]), ("transport", &["shell"])]);
        assert_eq!(categorize("SHELL GARAGE", &reversed), "Fuel");
    }

    #[test]
    fn categorize_is_repeatable() {
        let categories = map(&[("bills", &["electric"])]);
        let first = categorize("Electric Ireland", &categories);
        let second = categorize("Electric Ireland", &categories);
        assert_eq!(first, second);
    }

    #[test]
    fn categorize_with_empty_map_is_other() {
        assert_eq!(categorize("anything", &CategoryMap::new()), OTHER);
    }

    #[test]
    fn capitalize_lowers_the_tail() {
        assert_eq!(capitalize("groceries"), "Groceries");
        assert_eq!(capitalize("EATING OUT"), "Eating out");
        assert_eq!(capitalize(""), "");
    }

    // ── mutations ─────────────────────────────────────────────────────────────

    #[test]
    fn add_keyword_normalizes_and_rejects_duplicates() {
        let mut categories = CategoryMap::new();
        categories.add_keyword(" Groceries ", " TESCO ").unwrap();
        assert_eq!(categories.get("groceries").unwrap().keywords(), ["tesco"]);

        let err = categories.add_keyword("GROCERIES", "tesco").unwrap_err();
        assert!(matches!(err, CategoryError::DuplicateKeyword { .. }));
        assert_eq!(categories.get("groceries").unwrap().keywords().len(), 1);
    }

    #[test]
    fn add_keyword_rejects_blank_input() {
        let mut categories = CategoryMap::new();
        assert!(matches!(
            categories.add_keyword("  ", "tesco"),
            Err(CategoryError::EmptyCategory)
        ));
        assert!(matches!(
            categories.add_keyword("groceries", " "),
            Err(CategoryError::EmptyKeyword)
        ));
        assert!(categories.is_empty());
    }

    #[test]
    fn delete_last_keyword_removes_category() {
        let mut categories = map(&[("fuel", &["shell", "esso"])]);
        categories.delete_keyword("fuel", "shell").unwrap();
        assert!(categories.get("fuel").is_some());
        categories.delete_keyword("Fuel", "ESSO").unwrap();
        assert!(categories.get("fuel").is_none());
        assert!(categories.is_empty());
    }

    #[test]
    fn deleting_missing_entries_reports_not_found() {
        let mut categories = map(&[("fuel", &["shell"])]);
        assert!(matches!(
            categories.delete_category("rent"),
            Err(CategoryError::CategoryNotFound(_))
        ));
        assert!(matches!(
            categories.delete_keyword("fuel", "esso"),
            Err(CategoryError::KeywordNotFound { .. })
        ));
        assert!(matches!(
            categories.delete_keyword("rent", "landlord"),
            Err(CategoryError::CategoryNotFound(_))
        ));
        assert_eq!(categories, map(&[("fuel", &["shell"])]));
    }

    #[test]
    fn delete_category_keeps_remaining_order() {
        let mut categories = map(&[("a", &["1"]), ("b", &["2"]), ("c", &["3"])]);
        categories.delete_category("b").unwrap();
        let names: Vec<_> = categories.iter().map(CategoryEntry::name).collect();
        assert_eq!(names, ["a", "c"]);
    }

    // ── serde ─────────────────────────────────────────────────────────────────

    #[test]
    fn json_preserves_document_order() {
        let json = r#"{"zoo": ["zebra"], "alpha": ["ant", "ANT", " "], "empty": []}"#;
        let categories: CategoryMap = serde_json::from_str(json).unwrap();
        let names: Vec<_> = categories.iter().map(CategoryEntry::name).collect();
        assert_eq!(names, ["zoo", "alpha"]);
        assert_eq!(categories.get("alpha").unwrap().keywords(), ["ant"]);

        let out = serde_json::to_string(&categories).unwrap();
        assert_eq!(out, r#"{"zoo":["zebra"],"alpha":["ant"]}"#);
    }

    // ── store-backed editing ──────────────────────────────────────────────────

    struct CountingStore {
        inner: MemoryCategoryStore,
        saves: Cell<usize>,
    }

    impl CategoryStore for CountingStore {
        fn load(&self) -> CategoryMap {
            self.inner.load()
        }

        fn save(&self, categories: &CategoryMap) -> Result<(), CategoryError> {
            self.saves.set(self.saves.get() + 1);
            self.inner.save(categories)
        }
    }

    #[test]
    fn store_edits_save_after_each_successful_mutation() {
        let store = CountingStore {
            inner: MemoryCategoryStore::default(),
            saves: Cell::new(0),
        };

        add_keyword(&store, "groceries", "tesco").unwrap();
        add_keyword(&store, "groceries", "lidl").unwrap();
        assert_eq!(store.saves.get(), 2);

        assert!(add_keyword(&store, "groceries", "tesco").is_err());
        assert!(delete_category(&store, "rent").is_err());
        assert_eq!(store.saves.get(), 2);

        let updated = delete_keyword(&store, "groceries", "tesco").unwrap();
        assert_eq!(updated.get("groceries").unwrap().keywords(), ["lidl"]);
        assert_eq!(store.load(), updated);
        assert_eq!(store.saves.get(), 3);
    }

    #[test]
    fn store_delete_category_persists() {
        let store = MemoryCategoryStore::new(map(&[("fuel", &["shell"])]));
        delete_category(&store, "FUEL").unwrap();
        assert!(store.load().is_empty());
    }
}
