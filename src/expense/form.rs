use axum::response::{IntoResponse, Response};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetId, get_budgets},
    expense::ExpenseFormData,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner},
    name::MAX_NAME_LENGTH,
};

/// Where an expense form is submitted to.
pub(crate) enum ExpenseFormAction<'a> {
    Create(&'a str),
    Update(&'a str),
}

/// Which budget the expense is added to.
pub(crate) enum BudgetChoice<'a> {
    /// Let the user pick from their budgets.
    Select(&'a [Budget]),
    /// The form belongs to a single budget, e.g. on the budget's detail page.
    Fixed(BudgetId),
}

/// The values to fill an expense form with.
#[derive(Default)]
pub(crate) struct ExpenseFormDefaults<'a> {
    pub name: Option<&'a str>,
    pub amount: Option<f64>,
    pub date: Option<Date>,
    pub budget_id: Option<BudgetId>,
}

/// The form for creating or editing an expense.
///
/// The date defaults to `today` when `defaults` has no date.
pub(crate) fn expense_form_view(
    action: ExpenseFormAction<'_>,
    budget_choice: BudgetChoice<'_>,
    defaults: &ExpenseFormDefaults<'_>,
    today: Date,
    error_message: &str,
) -> Markup {
    let (hx_post, hx_put, submit_text) = match action {
        ExpenseFormAction::Create(endpoint) => (Some(endpoint), None, "Create Expense"),
        ExpenseFormAction::Update(endpoint) => (None, Some(endpoint), "Update Expense"),
    };
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));
    let date_str = defaults.date.unwrap_or(today).to_string();

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
                    "Expense Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Weekly shop"
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
                        min="0"
                        placeholder="0.00"
                        value=[amount_str.as_deref()]
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label
                    for="date"
                    class=(FORM_LABEL_STYLE)
                {
                    "Date"
                }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=(date_str)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @match budget_choice {
                BudgetChoice::Fixed(budget_id) => {
                    input type="hidden" name="budget_id" value=(budget_id);
                    input type="hidden" name="budget_fixed" value="true";
                }
                BudgetChoice::Select(budgets) => {
                    div
                    {
                        label
                            for="budget_id"
                            class=(FORM_LABEL_STYLE)
                        {
                            "Budget"
                        }

                        select
                            id="budget_id"
                            name="budget_id"
                            required
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            option value="" disabled selected[defaults.budget_id.is_none()]
                            {
                                "Select a budget"
                            }

                            @for budget in budgets {
                                option
                                    value=(budget.id)
                                    selected[defaults.budget_id == Some(budget.id)]
                                {
                                    (budget.name)
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

/// Render the submitted form again with `error` shown above the submit button.
pub(crate) fn invalid_expense_form_response(
    action: ExpenseFormAction<'_>,
    form_data: &ExpenseFormData,
    user_id: UserID,
    connection: &Connection,
    error: &Error,
) -> Response {
    let budgets = if form_data.budget_fixed {
        Vec::new()
    } else {
        match get_budgets(user_id, connection) {
            Ok(budgets) => budgets,
            Err(error) => {
                tracing::error!("Failed to retrieve budgets: {error}");
                return error.into_alert_response();
            }
        }
    };
    let budget_choice = if form_data.budget_fixed {
        BudgetChoice::Fixed(form_data.budget_id)
    } else {
        BudgetChoice::Select(&budgets)
    };
    let defaults = ExpenseFormDefaults {
        name: Some(&form_data.name),
        amount: Some(form_data.amount),
        date: Some(form_data.date),
        budget_id: Some(form_data.budget_id),
    };

    expense_form_view(
        action,
        budget_choice,
        &defaults,
        form_data.date,
        &format!("Error: {error}"),
    )
    .into_response()
}
