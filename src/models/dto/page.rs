use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::common::DEFAULT_PAGE_SIZE;
use crate::common::errors::{WorkflowError, WorkflowResult};
use crate::models::TableEntry;
use crate::models::filter::Expression;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    #[default]
    Date,
    Size,
    Category,
    Uploader,
    Id,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl SortKey {
    pub fn compare<T: TableEntry>(&self, a: &T, b: &T) -> Ordering {
        match self {
            SortKey::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
            SortKey::Date => a.date().cmp(&b.date()),
            SortKey::Size => a.size().cmp(&b.size()),
            SortKey::Category => a
                .category()
                .to_lowercase()
                .cmp(&b.category().to_lowercase()),
            SortKey::Uploader => a
                .uploader()
                .to_lowercase()
                .cmp(&b.uploader().to_lowercase()),
            SortKey::Id => a.id().cmp(b.id()),
        }
    }
}

/// State of one table: search box, category dropdown, sorted column and pager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TableQuery {
    pub search: String,
    pub category: Option<String>,
    pub sort: SortKey,
    pub direction: SortDirection,
    /// Zero means the default page size
    pub page_size: usize,
    /// 1-based
    pub page: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: None,
            sort: SortKey::Date,
            direction: SortDirection::Desc,
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

impl TableQuery {
    /// Filter expression for the search box and category dropdown, if any.
    pub fn expression(&self) -> Option<Expression> {
        let mut parts = Vec::new();
        let search = self.search.trim();
        if !search.is_empty() {
            parts.push(Expression::Any(search.to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            parts.push(Expression::Category(category.to_string()));
        }
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Expression::And(parts)),
        }
    }

    /// Header click: the same column flips direction, a new column starts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort == key {
            self.direction = self.direction.flipped();
        } else {
            self.sort = key;
            self.direction = SortDirection::Asc;
        }
    }

    /// New search text or category resets the pager.
    pub fn set_search(&mut self, search: impl Into<String>, category: Option<String>) {
        self.search = search.into();
        self.category = category;
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Previous/next buttons; stays within `1..=total_pages`.
    pub fn change_page(&mut self, delta: isize, total_pages: usize) {
        let target = self.page.saturating_add_signed(delta);
        self.page = target.clamp(1, total_pages.max(1));
    }

    /// Page-number box.
    pub fn jump_to(&mut self, page: usize, total_pages: usize) -> WorkflowResult<()> {
        if page < 1 || page > total_pages {
            return Err(WorkflowError::Validation(format!(
                "Please enter a page number between 1 and {total_pages}"
            )));
        }
        self.page = page;
        Ok(())
    }

    fn effective_page_size(&self) -> usize {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    /// Filter, sort and slice `records`.
    ///
    /// Sorting is stable, so entries with equal keys keep their stored order.
    pub fn apply<'a, T: TableEntry + 'static>(&self, records: &'a [T]) -> Page<&'a T> {
        let mut matches: Vec<&T> = match self.expression() {
            Some(expression) => {
                let filter = expression.generate_filter::<T>();
                records.iter().filter(|record| filter(*record)).collect()
            }
            None => records.iter().collect(),
        };

        matches.sort_by(|a, b| {
            let ordering = self.sort.compare(*a, *b);
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        Page::slice(matches, self.page, self.effective_page_size())
    }
}

/// One page of a table plus what the pager needs.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cut page `page` (1-based) out of `matches`, clamping to the last page.
    pub fn slice(matches: Vec<T>, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total = matches.len();
        let total_pages = total.div_ceil(page_size);
        let page = page.clamp(1, total_pages.max(1));
        let start = (page - 1) * page_size;

        let items: Vec<T> = matches.into_iter().skip(start).take(page_size).collect();

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_has_zero_pages() {
        let page = Page::<u32>::slice(Vec::new(), 3, 10);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn page_beyond_end_clamps_to_last() {
        let page = Page::slice((1..=25).collect::<Vec<u32>>(), 9, 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert!(page.has_previous());
    }

    #[test]
    fn toggle_sort_flips_or_starts_ascending() {
        let mut query = TableQuery::default();
        query.toggle_sort(SortKey::Date);
        assert_eq!(query.direction, SortDirection::Asc);
        query.toggle_sort(SortKey::Date);
        assert_eq!(query.direction, SortDirection::Desc);
        query.toggle_sort(SortKey::Name);
        assert_eq!((query.sort, query.direction), (SortKey::Name, SortDirection::Asc));
    }

    #[test]
    fn pager_moves_within_bounds() {
        let mut query = TableQuery::default();
        query.change_page(-1, 4);
        assert_eq!(query.page, 1);
        query.change_page(10, 4);
        assert_eq!(query.page, 4);
        assert!(query.jump_to(5, 4).is_err());
        assert!(query.jump_to(0, 4).is_err());
        query.jump_to(2, 4).unwrap();
        assert_eq!(query.page, 2);
        query.set_search("cat", None);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn expression_combines_search_and_category() {
        let mut query = TableQuery::default();
        assert_eq!(query.expression(), None);
        query.set_search("  beach ", Some("nature".into()));
        assert_eq!(
            query.expression(),
            Some(Expression::And(vec![
                Expression::Any("beach".into()),
                Expression::Category("nature".into()),
            ]))
        );
        query.set_search("", Some(String::new()));
        assert_eq!(query.expression(), None);
    }
}
