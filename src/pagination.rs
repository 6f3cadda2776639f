//! Page links for the budget and expense lists.

use std::ops::RangeInclusive;

use maud::{Markup, html};

/// How lists are split into pages.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page shown when the query string does not name one.
    pub default_page: u64,
    /// The number of budgets or expenses to display per page.
    pub default_page_size: u64,
    /// The most page numbers to show at once under a list.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 12,
            max_pages: 5,
        }
    }
}

/// One element of the page links under a list.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    /// Stands in for the pages between the window and the first or last page.
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// The run of at most `max_pages` page numbers to show around `curr_page`.
fn page_window(curr_page: u64, page_count: u64, max_pages: u64) -> RangeInclusive<u64> {
    let max_pages = max_pages.max(1);

    if page_count <= max_pages {
        return 1..=page_count;
    }

    let start = curr_page
        .saturating_sub(max_pages / 2)
        .clamp(1, page_count - max_pages + 1);

    start..=start + max_pages - 1
}

/// Lay out the page links for `curr_page` of `page_count` pages.
///
/// Pages outside the window of `max_pages` are hidden behind an ellipsis, but
/// the first and last pages are always reachable.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let window = page_window(curr_page, page_count, max_pages);
    let (first, last) = (*window.start(), *window.end());
    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if first > 1 {
        indicators.push(PaginationIndicator::Page(1));
    }
    if first > 2 {
        indicators.push(PaginationIndicator::Ellipsis);
    }

    indicators.extend(window.map(|page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    }));

    if last + 1 < page_count {
        indicators.push(PaginationIndicator::Ellipsis);
    }
    if last < page_count {
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render the page links for a list.
///
/// `page_url` maps a page number to the URL of that page. Nothing is rendered
/// when there is only one page.
pub fn pagination_view(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
    page_url: impl Fn(u64) -> String,
) -> Markup {
    if page_count <= 1 {
        return html!();
    }

    let indicators = create_pagination_indicators(curr_page, page_count, max_pages);
    let page_link = |page: u64, label: String| {
        html! {
            a href=(page_url(page)) role="button" class="block px-3 py-2 rounded-sm text-blue-600 hover:underline" {
                (label)
            }
        }
    };

    html! {
        nav class="pagination flex justify-center" aria-label="Pagination" {
            ul class="flex flex-wrap items-center gap-x-1" {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::Page(page) => (page_link(page, page.to_string())),
                            PaginationIndicator::BackButton(page) => (page_link(page, "Back".to_owned())),
                            PaginationIndicator::NextButton(page) => (page_link(page, "Next".to_owned())),
                            PaginationIndicator::CurrPage(page) => {
                                span aria-current="page" class="block px-3 py-2 font-bold text-black dark:text-white" {
                                    (page)
                                }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="block px-3 py-2 text-gray-500" { "..." }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod pagination_view_tests {
    use scraper::{Html, Selector};

    use super::pagination_view;

    #[test]
    fn single_page_renders_nothing() {
        let markup = pagination_view(1, 1, 5, |page| format!("/budgets?page={page}"));

        assert!(markup.into_string().is_empty());
    }

    #[test]
    fn links_point_at_pages_and_current_page_is_not_a_link() {
        let markup = pagination_view(2, 3, 5, |page| format!("/budgets?page={page}"));
        let html = Html::parse_fragment(&markup.into_string());

        let hrefs: Vec<_> = html
            .select(&Selector::parse("a").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(
            hrefs,
            vec![
                "/budgets?page=1",
                "/budgets?page=1",
                "/budgets?page=3",
                "/budgets?page=3"
            ]
        );

        let current = html
            .select(&Selector::parse("span[aria-current=page]").unwrap())
            .next()
            .expect("No current page indicator");
        assert_eq!(current.text().collect::<String>(), "2");
    }
}
