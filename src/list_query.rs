//! Search, sort and pagination for the budget and expense lists.
//!
//! The list state lives in the URL query string, e.g.
//! `/expenses?search=milk&sort=amount&direction=desc&page=2`, so nothing is
//! persisted between requests.

use std::cmp::Ordering;

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::html::{BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE};

/// The order to sort a list in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// A value that list items are compared by.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue<'a> {
    /// Compared case-insensitively.
    Text(&'a str),
    Number(f64),
    Date(Date),
    DateTime(OffsetDateTime),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            (SortValue::DateTime(a), SortValue::DateTime(b)) => a.cmp(b),
            // A list only ever compares values produced by the same key.
            _ => Ordering::Equal,
        }
    }
}

/// An item that can be shown in a searchable, sortable list.
pub trait ListItem {
    /// The columns the list can be sorted by.
    type SortKey: Copy + PartialEq;

    /// The text of each field that a search matches against.
    fn search_fields(&self) -> Vec<String>;

    /// The value to compare when sorting by `key`.
    fn sort_value(&self, key: Self::SortKey) -> SortValue<'_>;
}

/// Which column a list is sorted by, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + PartialEq> SortState<K> {
    /// The sort that selecting `key` leads to.
    ///
    /// Selecting the current key again reverses the direction, and selecting
    /// any other key sorts by that key in ascending order.
    pub fn select(self, key: K) -> Self {
        if self.key == key {
            Self {
                key,
                direction: self.direction.reverse(),
            }
        } else {
            Self {
                key,
                direction: SortDirection::Ascending,
            }
        }
    }
}

/// The list parameters from a request's query string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(bound(deserialize = "K: Deserialize<'de>"))]
pub struct ListQuery<K> {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<K>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
}

impl<K> Default for ListQuery<K> {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
            direction: None,
            page: None,
        }
    }
}

impl<K: Copy + PartialEq + Serialize> ListQuery<K> {
    /// The sort requested, or `default` if the query does not name a key.
    pub fn sort_state(&self, default: SortState<K>) -> SortState<K> {
        match self.sort {
            Some(key) => SortState {
                key,
                direction: self.direction.unwrap_or_default(),
            },
            None => default,
        }
    }

    /// The URL for the list at `path` with this query.
    pub fn to_url(&self, path: &str) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if query.is_empty() => path.to_owned(),
            Ok(query) => format!("{path}?{query}"),
            Err(error) => {
                tracing::error!("Could not encode list query: {error}");
                path.to_owned()
            }
        }
    }

    /// The URL for the same search and sort on `page`.
    pub fn page_url(&self, path: &str, page: u64) -> String {
        Self {
            page: Some(page),
            search: self.search.clone(),
            ..*self
        }
        .to_url(path)
    }

    /// The URL for sorting the list by `key`, starting again from the first page.
    pub fn sort_url(&self, path: &str, current: SortState<K>, key: K) -> String {
        let next = current.select(key);

        Self {
            search: self.search.clone(),
            sort: Some(next.key),
            direction: Some(next.direction),
            page: None,
        }
        .to_url(path)
    }
}

/// One page of a filtered and sorted list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    /// The current page, starting from 1.
    pub page: u64,
    /// The number of pages, at least 1.
    pub page_count: u64,
    /// The number of items that matched the search, across all pages.
    pub total: usize,
    /// The 1-based position of the first item on the page, 0 if the page is empty.
    pub first_position: usize,
    /// The 1-based position of the last item on the page, 0 if the page is empty.
    pub last_position: usize,
}

/// Keep the items where any search field contains `search`, ignoring case.
///
/// An empty or whitespace-only search keeps every item.
pub fn filter_items<T: ListItem>(items: Vec<T>, search: &str) -> Vec<T> {
    let search = search.trim().to_lowercase();

    if search.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| {
            item.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&search))
        })
        .collect()
}

/// Sort `items` in place. The sort is stable.
pub fn sort_items<T: ListItem>(items: &mut [T], sort: SortState<T::SortKey>) {
    items.sort_by(|a, b| {
        let ordering = a.sort_value(sort.key).compare(&b.sort_value(sort.key));

        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Cut the contiguous slice for `page` out of `items`.
///
/// Pages start at 1, and a page past the end is clamped to the last page.
pub fn paginate<T>(items: Vec<T>, page: u64, page_size: u64) -> ListPage<T> {
    let total = items.len();
    let page_size = page_size.max(1);
    let page_count = (total as u64).div_ceil(page_size).max(1);
    let page = page.clamp(1, page_count);

    let start = ((page - 1) * page_size) as usize;
    let items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    let (first_position, last_position) = if items.is_empty() {
        (0, 0)
    } else {
        (start + 1, start + items.len())
    };

    ListPage {
        items,
        page,
        page_count,
        total,
        first_position,
        last_position,
    }
}

/// Filter, sort and paginate `items` according to `query`.
pub fn apply_list_query<T: ListItem>(
    items: Vec<T>,
    query: &ListQuery<T::SortKey>,
    default_sort: SortState<T::SortKey>,
    default_page: u64,
    page_size: u64,
) -> ListPage<T>
where
    T::SortKey: Serialize,
{
    let mut items = filter_items(items, &query.search);
    sort_items(&mut items, query.sort_state(default_sort));

    paginate(items, query.page.unwrap_or(default_page), page_size)
}

/// The arrow shown next to the column label that the list is sorted by.
pub fn sort_indicator<K: PartialEq>(sort: &SortState<K>, key: K) -> &'static str {
    match sort.direction {
        _ if sort.key != key => "",
        SortDirection::Ascending => " ▲",
        SortDirection::Descending => " ▼",
    }
}

/// A search box for the list at `path`.
///
/// Submitting the form keeps the current sort and starts again from the
/// first page.
pub fn search_form_view<K>(path: &str, query: &ListQuery<K>, placeholder: &str) -> Markup
where
    K: Copy + PartialEq + Serialize,
{
    let sort_fields = ListQuery {
        search: String::new(),
        sort: query.sort,
        direction: query.direction,
        page: None,
    };
    let hidden_fields: Vec<(String, String)> = serde_urlencoded::to_string(&sort_fields)
        .ok()
        .and_then(|encoded| serde_urlencoded::from_str(&encoded).ok())
        .unwrap_or_default();

    html! {
        form method="get" action=(path) role="search" class="flex w-full gap-2"
        {
            @for (name, value) in &hidden_fields {
                input type="hidden" name=(name) value=(value);
            }

            input
                type="search"
                name="search"
                aria-label="Search"
                placeholder=(placeholder)
                value=(query.search)
                class=(FORM_TEXT_INPUT_STYLE);

            button type="submit" class={ (BUTTON_PRIMARY_STYLE) " max-w-32" } { "Search" }
        }
    }
}

#[cfg(test)]
mod list_query_tests {
    use serde::{Deserialize, Serialize};

    use super::{
        ListItem, ListQuery, SortDirection, SortState, SortValue, apply_list_query, filter_items,
        paginate, search_form_view, sort_indicator, sort_items,
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        amount: f64,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Key {
        Name,
        Amount,
    }

    impl ListItem for Row {
        type SortKey = Key;

        fn search_fields(&self) -> Vec<String> {
            vec![self.name.to_owned(), self.amount.to_string()]
        }

        fn sort_value(&self, key: Key) -> SortValue<'_> {
            match key {
                Key::Name => SortValue::Text(self.name),
                Key::Amount => SortValue::Number(self.amount),
            }
        }
    }

    fn row(name: &'static str, amount: f64) -> Row {
        Row { name, amount }
    }

    fn rows() -> Vec<Row> {
        vec![
            row("rent", 1200.0),
            row("Groceries", 85.5),
            row("coffee", 4.0),
            row("Bus fare", 4.0),
            row("gym", 60.0),
        ]
    }

    fn sorted_by(key: Key, direction: SortDirection) -> SortState<Key> {
        SortState { key, direction }
    }

    fn names(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|row| row.name).collect()
    }

    #[test]
    fn search_by_exact_name_finds_item() {
        let got = filter_items(rows(), "Groceries");

        assert_eq!(names(&got), vec!["Groceries"]);
    }

    #[test]
    fn search_ignores_case_and_matches_substrings() {
        let got = filter_items(rows(), "GR");

        assert_eq!(names(&got), vec!["Groceries"]);
    }

    #[test]
    fn search_matches_stringified_numbers() {
        let got = filter_items(rows(), "85.5");

        assert_eq!(names(&got), vec!["Groceries"]);
    }

    #[test]
    fn search_excludes_items_with_no_matching_field() {
        assert!(filter_items(rows(), "holiday").is_empty());
    }

    #[test]
    fn blank_search_keeps_everything() {
        assert_eq!(filter_items(rows(), "  "), rows());
    }

    #[test]
    fn text_sort_ignores_case() {
        let mut rows = rows();

        sort_items(&mut rows, sorted_by(Key::Name, SortDirection::Ascending));

        assert_eq!(names(&rows), vec!["Bus fare", "coffee", "Groceries", "gym", "rent"]);
    }

    #[test]
    fn number_sort_is_stable() {
        let mut rows = rows();

        sort_items(&mut rows, sorted_by(Key::Amount, SortDirection::Ascending));

        assert_eq!(names(&rows), vec!["coffee", "Bus fare", "gym", "Groceries", "rent"]);
    }

    #[test]
    fn selecting_same_key_twice_reverses_order() {
        let ascending = sorted_by(Key::Name, SortDirection::Ascending);
        let descending = ascending.select(Key::Name);
        let mut ascending_rows = rows();
        let mut descending_rows = rows();

        sort_items(&mut ascending_rows, ascending);
        sort_items(&mut descending_rows, descending);

        assert_eq!(descending.direction, SortDirection::Descending);
        ascending_rows.reverse();
        assert_eq!(ascending_rows, descending_rows);
    }

    #[test]
    fn selecting_different_key_resets_to_ascending() {
        let current = sorted_by(Key::Name, SortDirection::Descending);

        let next = current.select(Key::Amount);

        assert_eq!(next, sorted_by(Key::Amount, SortDirection::Ascending));
    }

    #[test]
    fn pages_concatenate_to_full_list() {
        let page_size = 2;
        let first = paginate(rows(), 1, page_size);
        let mut concatenated = Vec::new();

        for page in 1..=first.page_count {
            concatenated.extend(paginate(rows(), page, page_size).items);
        }

        assert_eq!(first.page_count, 3);
        assert_eq!(concatenated, rows());
    }

    #[test]
    fn page_positions_are_one_based() {
        let page = paginate(rows(), 3, 2);

        assert_eq!(page.total, 5);
        assert_eq!(page.first_position, 5);
        assert_eq!(page.last_position, 5);
    }

    #[test]
    fn page_past_end_is_clamped() {
        let page = paginate(rows(), 99, 2);

        assert_eq!(page.page, 3);
        assert_eq!(names(&page.items), vec!["gym"]);
    }

    #[test]
    fn empty_list_has_one_empty_page() {
        let page = paginate(Vec::<Row>::new(), 1, 10);

        assert_eq!(page.page_count, 1);
        assert_eq!(page.first_position, 0);
        assert_eq!(page.last_position, 0);
    }

    #[test]
    fn query_parses_from_url() {
        let query: ListQuery<Key> =
            serde_urlencoded::from_str("search=gr&sort=amount&direction=desc&page=2").unwrap();

        assert_eq!(
            query,
            ListQuery {
                search: "gr".to_owned(),
                sort: Some(Key::Amount),
                direction: Some(SortDirection::Descending),
                page: Some(2),
            }
        );
    }

    #[test]
    fn sort_url_toggles_direction_and_resets_page() {
        let query: ListQuery<Key> = ListQuery {
            search: "g".to_owned(),
            sort: Some(Key::Name),
            direction: Some(SortDirection::Ascending),
            page: Some(3),
        };
        let current = query.sort_state(sorted_by(Key::Amount, SortDirection::Ascending));

        let url = query.sort_url("/budgets", current, Key::Name);

        assert_eq!(url, "/budgets?search=g&sort=name&direction=desc");
    }

    #[test]
    fn empty_query_url_is_just_the_path() {
        assert_eq!(ListQuery::<Key>::default().to_url("/budgets"), "/budgets");
    }

    #[test]
    fn apply_list_query_filters_sorts_and_paginates() {
        let query = ListQuery {
            search: "e".to_owned(),
            sort: Some(Key::Amount),
            direction: Some(SortDirection::Descending),
            page: Some(1),
        };

        let page = apply_list_query(
            rows(),
            &query,
            sorted_by(Key::Name, SortDirection::Ascending),
            1,
            2,
        );

        assert_eq!(names(&page.items), vec!["rent", "Groceries"]);
        assert_eq!(page.total, 4);
        assert_eq!(page.page_count, 2);
    }

    #[test]
    fn sort_indicator_marks_only_the_sorted_column() {
        let sort = sorted_by(Key::Amount, SortDirection::Descending);

        assert_eq!(sort_indicator(&sort, Key::Amount), " ▼");
        assert_eq!(sort_indicator(&sort, Key::Name), "");
    }

    #[test]
    fn search_form_keeps_sort_but_not_page() {
        let query = ListQuery {
            search: "milk".to_owned(),
            sort: Some(Key::Amount),
            direction: Some(SortDirection::Descending),
            page: Some(4),
        };

        let html = scraper::Html::parse_fragment(
            &search_form_view("/expenses", &query, "Search expenses").into_string(),
        );

        let hidden = scraper::Selector::parse("input[type=hidden]").unwrap();
        let hidden: Vec<(&str, &str)> = html
            .select(&hidden)
            .map(|input| {
                (
                    input.value().attr("name").unwrap_or_default(),
                    input.value().attr("value").unwrap_or_default(),
                )
            })
            .collect();
        assert_eq!(hidden, vec![("sort", "amount"), ("direction", "desc")]);

        let search = scraper::Selector::parse("input[type=search]").unwrap();
        let search = html.select(&search).next().unwrap();
        assert_eq!(search.value().attr("value"), Some("milk"));
    }
}
