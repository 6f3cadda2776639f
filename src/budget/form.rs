use maud::{Markup, html};

use crate::{
    budget::Category,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner,
    },
    name::MAX_NAME_LENGTH,
};

/// Where a budget form is submitted to.
pub(super) enum BudgetFormAction<'a> {
    Create(&'a str),
    Update(&'a str),
}

/// The values to fill a budget form with.
#[derive(Default)]
pub(super) struct BudgetFormDefaults<'a> {
    pub name: Option<&'a str>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
}

pub(super) fn budget_form_view(
    action: BudgetFormAction<'_>,
    defaults: &BudgetFormDefaults<'_>,
    error_message: &str,
) -> Markup {
    let (hx_post, hx_put, submit_text) = match action {
        BudgetFormAction::Create(endpoint) => (Some(endpoint), None, "Create Budget"),
        BudgetFormAction::Update(endpoint) => (None, Some(endpoint), "Update Budget"),
    };
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="find button[type=submit]"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Budget Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Groceries"
                    value=[defaults.name]
                    maxlength=(MAX_NAME_LENGTH)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="amount"
                    class=(FORM_LABEL_STYLE)
                {
                    "Amount"
                }

                div class="input-wrapper w-full"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        value=[amount_str.as_deref()]
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Category" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for category in Category::ALL {
                        @let id = format!("category-{}", category.label().to_lowercase().replace(' ', "-"));

                        div class="flex items-center gap-3"
                        {
                            input
                                name="category"
                                id=(id)
                                type="radio"
                                value=(category.label())
                                checked[defaults.category == Some(category)]
                                required
                                class=(FORM_RADIO_INPUT_STYLE);

                            label
                                for=(id)
                                class=(FORM_RADIO_LABEL_STYLE)
                            {
                                span class="block" { (category.label()) }
                                span class="block text-xs font-normal text-gray-500 dark:text-gray-400"
                                {
                                    (category.description())
                                }
                            }
                        }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                (submit_text)
            }
        }
    }
}
