//! Shared page layout, Tailwind class names and small view helpers.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::endpoints;

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";
pub const FORM_RADIO_GROUP_STYLE: &str = "flex flex-col gap-2";
pub const FORM_RADIO_INPUT_STYLE: &str = "peer h-4 w-4 shrink-0 cursor-pointer \
    text-blue-600 border-gray-300 dark:border-gray-600 focus-visible:ring-2 \
    focus-visible:ring-blue-500 focus-visible:ring-offset-2 \
    focus-visible:ring-offset-white focus-visible:dark:ring-offset-gray-900";
pub const FORM_RADIO_LABEL_STYLE: &str = "flex-1 rounded border border-gray-300 \
    dark:border-gray-600 bg-white dark:bg-gray-700 px-3 py-2 text-sm font-medium \
    text-gray-700 dark:text-white cursor-pointer transition \
    hover:border-gray-400 hover:bg-gray-50 hover:text-gray-900 \
    hover:dark:border-gray-500 hover:dark:bg-gray-600 active:scale-[0.99] \
    peer-checked:border-blue-600 peer-checked:bg-blue-50 peer-checked:text-blue-700 \
    peer-checked:shadow-sm peer-checked:dark:border-blue-500 \
    peer-checked:dark:bg-blue-600/20 peer-checked:dark:text-blue-200";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Category badge style
pub const CATEGORY_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-blue-800 bg-blue-100 rounded-full \
    dark:bg-blue-900 dark:text-blue-300";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// Something to add to the `<head>` of a page as well as the common stylesheets and scripts.
pub enum HeadElement {
    /// A script loaded from a file path or URL.
    ScriptLink(String),
    /// An inline script.
    ScriptSource(PreEscaped<String>),
    /// An inline stylesheet.
    Style(PreEscaped<String>),
}

const HTMX_SCRIPT: &str = "/static/htmx-2.0.8-min.js";
const HTMX_RESPONSE_TARGETS_SCRIPT: &str = "/static/htmx-ext-response-targets-2.0.4.js";

const BASE_STYLES: &str = r#"
    #indicator.htmx-indicator,
    .htmx-indicator#indicator {
        display: none;
    }

    #indicator.htmx-request .htmx-indicator,
    #indicator.htmx-request.htmx-indicator {
        display: inline;
    }

    .echarts-tooltip {
        z-index: 30 !important;
    }
"#;

/// Wrap `content` in a full HTML page titled "`title` - Budget Buddy".
pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Budget Buddy" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link rel="icon" type="image/png" href="/static/favicon-128x128.png" sizes="128x128";
                link rel="stylesheet" href="/static/main.css";
                script src=(HTMX_SCRIPT) {}
                script src=(HTMX_RESPONSE_TARGETS_SCRIPT) {}
                style { (PreEscaped(BASE_STYLES)) }

                @for element in head_elements {
                    @match element {
                        HeadElement::ScriptLink(src) => script src=(src) {},
                        HeadElement::ScriptSource(source) => script { (source) },
                        HeadElement::Style(styles) => style { (styles) },
                    }
                }

                script src="/static/app.js" defer {}
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                // Alerts are swapped in here out-of-band.
                div
                    id="alert-container"
                    class="hidden fixed bottom-4 left-1/2 -translate-x-1/2 z-[9999] w-full max-w-md px-4"
                {}
            }
        }
    }
}

/// A full page for an HTTP error, e.g. a 404, with a link back to the dashboard.
pub fn error_view(title: &str, status_code: &str, description: &str, fix: &str) -> Markup {
    let content = html! {
        section class="bg-white dark:bg-gray-900" {
            div class="mx-auto max-w-screen-sm px-4 py-8 lg:py-16 text-center" {
                h1 class="mb-4 text-7xl lg:text-9xl font-extrabold tracking-tight text-blue-600 dark:text-blue-500" {
                    (status_code)
                }

                p class="mb-4 text-3xl md:text-4xl font-bold tracking-tight text-gray-900 dark:text-white" {
                    (description)
                }

                p class="mb-4 text-xl md:text-2xl tracking-tight text-gray-900 dark:text-white" {
                    (fix)
                }

                a
                    href=(endpoints::ROOT)
                    class="inline-flex my-4 px-5 py-2.5 rounded text-sm font-medium text-center text-white bg-blue-600 hover:bg-blue-800 dark:focus:ring-blue-900"
                {
                    "Back to the dashboard"
                }
            }
        }
    };

    base(title, &[], &content)
}

/// The card with the app name that holds the log-in and registration forms.
pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto" {
            div class="flex items-center mb-6 text-2xl font-semibold text-gray-900 dark:text-white" {
                img class="w-8 h-8 mr-2" src="/static/favicon-128x128.png" alt="logo";
                "Budget Buddy"
            }

            div class="w-full sm:max-w-md md:mt-0 rounded-lg shadow bg-white dark:bg-gray-800 dark:border dark:border-gray-700" {
                div class="p-6 sm:p-8 space-y-4 md:space-y-6" {
                    h1 class="text-xl md:text-2xl font-bold leading-tight tracking-tight text-gray-900 dark:text-white" {
                        (form_title)
                    }

                    (form)
                }
            }
        }
    }
}

/// A labelled input on the log-in or registration form.
#[derive(Debug, Default)]
pub struct AuthField<'a> {
    pub label: &'a str,
    /// Used as both the `name` and `id` of the input.
    pub name: &'a str,
    pub input_type: &'a str,
    pub placeholder: &'a str,
    pub value: &'a str,
    pub min_length: Option<u8>,
    pub max_length: Option<u8>,
    pub autofocus: bool,
    /// Shown in red under the input.
    pub error_message: Option<&'a str>,
}

pub fn auth_field(field: AuthField<'_>) -> Markup {
    html! {
        div {
            label for=(field.name) class=(FORM_LABEL_STYLE) { (field.label) }

            input
                type=(field.input_type)
                name=(field.name)
                id=(field.name)
                placeholder=(field.placeholder)
                value=(field.value)
                minlength=[field.min_length]
                maxlength=[field.max_length]
                autofocus[field.autofocus]
                required
                class=(FORM_TEXT_INPUT_STYLE);

            @if let Some(error_message) = field.error_message {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// The email input shared by the log-in and registration forms.
pub fn email_input(email: &str, error_message: Option<&str>) -> Markup {
    auth_field(AuthField {
        label: "Email",
        name: "email",
        input_type: "email",
        placeholder: "name@example.com",
        value: email,
        autofocus: true,
        error_message,
        ..Default::default()
    })
}

/// A password input named `password`, or `confirm_password` for the second
/// password on the registration form.
pub fn password_input(
    label: &str,
    name: &str,
    min_length: Option<u8>,
    error_message: Option<&str>,
) -> Markup {
    auth_field(AuthField {
        label,
        name,
        input_type: "password",
        placeholder: "••••••••",
        min_length,
        error_message,
        ..Default::default()
    })
}

/// A spinning circle shown inside submit buttons while HTMX requests are in flight.
pub fn loading_spinner() -> Markup {
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// Styles that show the user's currency symbol inside number inputs wrapped in
/// `.input-wrapper`.
pub fn currency_input_styles(symbol: &str) -> HeadElement {
    let symbol = symbol.trim().replace('\\', "\\\\").replace('\'', "\\'");
    let padding = 0.8 + 0.6 * symbol.chars().count() as f64;

    HeadElement::Style(PreEscaped(format!(
        r#"
        .input-wrapper {{
            position: relative;
            display: block;
        }}
        .input-wrapper input[type="number"] {{
            padding-left: {padding:.1}rem;
        }}
        .input-wrapper::before {{
            content: '{symbol}';
            position: absolute;
            left: 0.6rem;
            top: 50%;
            transform: translateY(-50%);
            pointer-events: none;
        }}
        "#
    )))
}

/// An inline link, e.g. inside a sentence.
pub fn link(url: &str, text: &str) -> Markup {
    html! {
        a href=(url) class=(LINK_STYLE) { (text) }
    }
}

/// An edit link and a delete button for a row in a list.
///
/// The delete button asks the user to confirm with `confirm_message`, and on
/// success HTMX applies `hx_swap` to the element matched by `hx_target`.
pub fn edit_delete_action_links(
    edit_url: &str,
    delete_url: &str,
    confirm_message: &str,
    hx_target: &str,
    hx_swap: &str,
) -> Markup {
    html! {
        a href=(edit_url) class=(LINK_STYLE) { "Edit" }

        button
            type="button"
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target=(hx_target)
            hx-target-error="#alert-container"
            hx-swap=(hx_swap)
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    }
}
