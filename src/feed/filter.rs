use super::item::DisplayItem;

/// Label of the "all categories" tab.
pub const ALL_LABEL: &str = "Todas";

/// Filter presets shown before any item has loaded.
pub const DEFAULT_CATEGORY_PRESETS: [&str; 4] = ["Notícias", "Institucional", "Cursos", "Eventos"];

/// Which slice of the loaded items the list shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Items whose category equals this display name exactly.
    Category(String),
}

impl CategoryFilter {
    pub fn category(name: impl Into<String>) -> Self {
        Self::Category(name.into())
    }

    pub fn matches(&self, item: &DisplayItem) -> bool {
        match self {
            Self::All => true,
            Self::Category(name) => item.category == *name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_LABEL,
            Self::Category(name) => name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Ordered filter tabs.
///
/// Tab 0 is always [`CategoryFilter::All`], followed by the configured
/// presets and then any category seen in loaded items that is not a preset.
#[derive(Debug, Clone)]
pub struct FilterBar {
    tabs: Vec<CategoryFilter>,
}

impl Default for FilterBar {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY_PRESETS.iter().copied())
    }
}

impl FilterBar {
    pub fn new<I, S>(presets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut bar = Self {
            tabs: vec![CategoryFilter::All],
        };
        for preset in presets {
            bar.add(preset.into());
        }
        bar
    }

    pub fn tabs(&self) -> &[CategoryFilter] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn contains(&self, filter: &CategoryFilter) -> bool {
        self.tabs.contains(filter)
    }

    /// Add tabs for categories not already present, in first-seen order.
    pub fn observe<'a>(&mut self, items: impl IntoIterator<Item = &'a DisplayItem>) {
        for item in items {
            self.add(item.category.clone());
        }
    }

    /// Make sure `filter` has a tab, appending one if needed.
    pub fn ensure(&mut self, filter: &CategoryFilter) {
        if let CategoryFilter::Category(name) = filter {
            self.add(name.clone());
        }
    }

    /// Tab after `current`, wrapping. An unknown filter moves to the first tab.
    pub fn next(&self, current: &CategoryFilter) -> CategoryFilter {
        match self.position(current) {
            Some(idx) => self.tabs[(idx + 1) % self.tabs.len()].clone(),
            None => CategoryFilter::All,
        }
    }

    /// Tab before `current`, wrapping. An unknown filter moves to the first tab.
    pub fn previous(&self, current: &CategoryFilter) -> CategoryFilter {
        match self.position(current) {
            Some(idx) => self.tabs[(idx + self.tabs.len() - 1) % self.tabs.len()].clone(),
            None => CategoryFilter::All,
        }
    }

    pub fn position(&self, filter: &CategoryFilter) -> Option<usize> {
        self.tabs.iter().position(|t| t == filter)
    }

    fn add(&mut self, name: String) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let tab = CategoryFilter::Category(name.to_string());
        if !self.tabs.contains(&tab) {
            self.tabs.push(tab);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(category: &str) -> DisplayItem {
        DisplayItem {
            id: 0,
            title: String::new(),
            excerpt: String::new(),
            image_url: String::new(),
            published_at: String::new(),
            category: category.to_string(),
            category_id: None,
            detail_url: String::new(),
            link: None,
        }
    }

    #[test]
    fn test_default_tabs() {
        let labels: Vec<_> = FilterBar::default()
            .tabs()
            .iter()
            .map(|t| t.label().to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["Todas", "Notícias", "Institucional", "Cursos", "Eventos"]
        );
    }

    #[test]
    fn test_matches_exact_name_only() {
        let filter = CategoryFilter::category("Cursos");
        assert!(filter.matches(&item("Cursos")));
        assert!(!filter.matches(&item("cursos")));
        assert!(!filter.matches(&item("Cursos Livres")));
        assert!(CategoryFilter::All.matches(&item("anything")));
    }

    #[test]
    fn test_observe_appends_unknown_categories_once() {
        let mut bar = FilterBar::default();
        let loaded = [item("Geral"), item("Cursos"), item("Editais"), item("Geral")];
        bar.observe(loaded.iter());
        assert_eq!(bar.len(), 7);
        assert_eq!(bar.tabs()[5], CategoryFilter::category("Geral"));
        assert_eq!(bar.tabs()[6], CategoryFilter::category("Editais"));
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let bar = FilterBar::new(["A", "B"]);
        let a = CategoryFilter::category("A");
        let b = CategoryFilter::category("B");

        assert_eq!(bar.next(&CategoryFilter::All), a);
        assert_eq!(bar.next(&b), CategoryFilter::All);
        assert_eq!(bar.previous(&CategoryFilter::All), b);
        assert_eq!(bar.previous(&a), CategoryFilter::All);
        assert_eq!(bar.next(&CategoryFilter::category("zzz")), CategoryFilter::All);
    }

    #[test]
    fn test_ensure_adds_missing_tab() {
        let mut bar = FilterBar::new(["A"]);
        bar.ensure(&CategoryFilter::category("B"));
        bar.ensure(&CategoryFilter::category("A"));
        bar.ensure(&CategoryFilter::All);
        assert_eq!(bar.len(), 3);
        assert!(bar.contains(&CategoryFilter::category("B")));
    }

    #[test]
    fn test_blank_presets_ignored() {
        let bar = FilterBar::new(["", "  ", "Eventos", "Eventos"]);
        assert_eq!(bar.len(), 2);
    }
}
