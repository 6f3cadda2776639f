//! The navigation bar shown at the top of every page, or the bottom on small screens.

use maud::{Markup, html};

use crate::endpoints;

/// Where a link sits in the bottom bar on small screens.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Placement {
    /// Always visible.
    Bar,
    /// Inside the "More" pop-up.
    More,
}

#[derive(Debug)]
struct Link {
    url: &'static str,
    title: &'static str,
    placement: Placement,
    is_current: bool,
}

const LINKS: [(&str, &str, Placement); 5] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard", Placement::Bar),
    (endpoints::BUDGETS_VIEW, "Budgets", Placement::Bar),
    (endpoints::EXPENSES_VIEW, "Expenses", Placement::Bar),
    (endpoints::SETTINGS_VIEW, "Settings", Placement::More),
    (endpoints::LOG_OUT, "Log out", Placement::More),
];

const DESKTOP_LINK_STYLE: &str = "block py-2 px-3 lg:p-0 rounded-sm text-gray-900 \
    dark:text-white hover:bg-gray-100 dark:hover:bg-gray-700 lg:hover:bg-transparent \
    lg:hover:text-blue-700 lg:dark:hover:text-blue-500";
const DESKTOP_CURRENT_LINK_STYLE: &str = "block py-2 px-3 lg:p-0 rounded-sm text-white \
    bg-blue-700 lg:bg-transparent lg:text-blue-700 lg:dark:text-blue-500";

const BAR_ITEM_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    px-2.5 py-2 sm:px-4 text-xs sm:text-sm font-semibold leading-tight cursor-pointer";
const BAR_ITEM_IDLE_STYLE: &str = "text-gray-600 dark:text-gray-300 hover:bg-blue-50/70 \
    hover:text-blue-700 dark:hover:bg-blue-900/20 dark:hover:text-blue-200";
const BAR_ITEM_CURRENT_STYLE: &str =
    "bg-blue-50 text-blue-700 shadow-sm dark:bg-blue-900/30 dark:text-blue-200";

const MORE_ITEM_STYLE: &str = "block rounded-lg px-3 py-2";
const MORE_ITEM_IDLE_STYLE: &str = "text-gray-700 dark:text-gray-200 hover:bg-gray-100 \
    hover:text-blue-700 dark:hover:bg-gray-800/80 dark:hover:text-blue-200";

fn bar_item_class(is_current: bool) -> String {
    let state = if is_current {
        BAR_ITEM_CURRENT_STYLE
    } else {
        BAR_ITEM_IDLE_STYLE
    };

    format!("{BAR_ITEM_STYLE} {state}")
}

fn more_item_class(is_current: bool) -> String {
    let state = if is_current {
        BAR_ITEM_CURRENT_STYLE
    } else {
        MORE_ITEM_IDLE_STYLE
    };

    format!("{MORE_ITEM_STYLE} {state}")
}

/// Whether `endpoint` is the page at `section_url` or one of its sub-pages,
/// e.g. "/budgets/1/edit" is part of "/budgets".
fn is_section_of(endpoint: &str, section_url: &str) -> bool {
    match endpoint.strip_prefix(section_url) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub struct NavBar {
    links: Vec<Link>,
}

impl NavBar {
    /// The navigation bar for the page at `active_endpoint`.
    ///
    /// The link for the section containing `active_endpoint` is highlighted.
    /// "Log out" is never highlighted.
    pub fn new(active_endpoint: &str) -> Self {
        let links = LINKS
            .into_iter()
            .map(|(url, title, placement)| Link {
                url,
                title,
                placement,
                is_current: url != endpoints::LOG_OUT && is_section_of(active_endpoint, url),
            })
            .collect();

        Self { links }
    }

    fn links_in(&self, placement: Placement) -> impl Iterator<Item = &Link> {
        self.links
            .iter()
            .filter(move |link| link.placement == placement)
    }

    fn desktop_view(&self) -> Markup {
        html! {
            nav class="bg-white border-gray-200 dark:bg-gray-900" {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4" {
                    a href=(endpoints::ROOT) class="flex items-center space-x-3" {
                        img src="/static/favicon-128x128.png" alt="Budget Buddy Logo" class="h-8";
                        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white" {
                            "Budget Buddy"
                        }
                    }

                    div class="hidden w-full lg:block lg:w-auto" {
                        ul class="flex flex-col lg:flex-row lg:space-x-8 p-4 lg:p-0 mt-4 lg:mt-0 font-medium rounded border border-gray-100 lg:border-0 bg-gray-50 lg:bg-white dark:bg-gray-800 lg:dark:bg-gray-900 dark:border-gray-700" {
                            @for link in &self.links {
                                li {
                                    a
                                        href=(link.url)
                                        class=(if link.is_current { DESKTOP_CURRENT_LINK_STYLE } else { DESKTOP_LINK_STYLE })
                                    {
                                        (link.title)
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn mobile_view(&self) -> Markup {
        let more_is_current = self.links_in(Placement::More).any(|link| link.is_current);

        html! {
            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden" {
                div class="mx-auto max-w-screen-xl px-4 pb-4" {
                    div class="rounded-xl border border-gray-200 dark:border-gray-700 bg-white/95 dark:bg-gray-900/95 shadow-lg backdrop-blur" {
                        ul class="grid grid-cols-4 gap-2 px-4 py-3" aria-label="Primary" {
                            @for link in self.links_in(Placement::Bar) {
                                li class="min-w-0" {
                                    a
                                        href=(link.url)
                                        class=(bar_item_class(link.is_current))
                                        aria-current=[link.is_current.then_some("page")]
                                    {
                                        span class="truncate" { (link.title) }
                                    }
                                }
                            }

                            li class="min-w-0" {
                                details class="group relative" {
                                    summary
                                        class={ "list-none [&::-webkit-details-marker]:hidden " (bar_item_class(more_is_current)) }
                                        aria-current=[more_is_current.then_some("page")]
                                    {
                                        span class="truncate" { "More" }
                                    }

                                    div class="absolute bottom-full right-0 mb-3 w-40 p-2 rounded-xl border border-gray-200 dark:border-gray-700 bg-white/95 dark:bg-gray-900/95 shadow-xl backdrop-blur" {
                                        ul class="flex flex-col gap-1 text-sm font-medium" {
                                            @for link in self.links_in(Placement::More) {
                                                li {
                                                    a
                                                        href=(link.url)
                                                        class=(more_item_class(link.is_current))
                                                        aria-current=[link.is_current.then_some("page")]
                                                    {
                                                        (link.title)
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn into_html(self) -> Markup {
        html! {
            (self.desktop_view())
            (self.mobile_view())
        }
    }
}
