//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for budget data:
//! - **Spending Over Time**: Cumulative spend per budget, one line per budget
//! - **Budgets vs. Spending**: Each budget's amount next to what has been spent
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use std::collections::{BTreeSet, HashMap};

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::{Line, bar},
};
use maud::{Markup, PreEscaped, html};
use time::Date;

use crate::{
    budget::{Budget, BudgetId},
    currency::Currency,
    html::HeadElement,
    report::{BudgetSummary, SpendingPoint},
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id,
                // A closing tag inside a JSON string would end the script element.
                chart.options.replace("</", "<\\/")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// A line per budget showing how its spending has built up over time.
///
/// The x-axis has every date with at least one expense. A budget's line holds
/// its previous total on dates where it has no expenses. Budgets without any
/// expenses are left off the chart.
pub(super) fn spending_over_time_chart(
    budgets: &[Budget],
    points: &[SpendingPoint],
    currency: &Currency,
) -> Chart {
    let dates: Vec<Date> = points
        .iter()
        .map(|point| point.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let labels: Vec<String> = dates.iter().map(|date| date.to_string()).collect();

    let mut chart = Chart::new()
        .title(
            Title::new()
                .text("Spending over time")
                .subtext("Cumulative spend per budget")
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip(currency))
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        );

    for budget in budgets {
        if let Some(values) = cumulative_values(budget.id, &dates, points) {
            chart = chart.series(
                Line::new()
                    .name(budget.name.as_str())
                    .data(values),
            );
        }
    }

    chart
}

/// The running total of `budget_id` on each of `dates`, or `None` if the
/// budget has no points.
fn cumulative_values(
    budget_id: BudgetId,
    dates: &[Date],
    points: &[SpendingPoint],
) -> Option<Vec<f64>> {
    let by_date: HashMap<Date, f64> = points
        .iter()
        .filter(|point| point.budget_id == budget_id)
        .map(|point| (point.date, point.cumulative_spent))
        .collect();

    if by_date.is_empty() {
        return None;
    }

    let mut running_total = 0.0;
    let values = dates
        .iter()
        .map(|date| {
            if let Some(&cumulative_spent) = by_date.get(date) {
                running_total = cumulative_spent;
            }
            running_total
        })
        .collect();

    Some(values)
}

/// Bars comparing each budget's amount with what has been spent against it.
///
/// `summaries` must be in the same order as `budgets`.
pub(super) fn budgets_vs_spending_chart(
    budgets: &[Budget],
    summaries: &[BudgetSummary],
    currency: &Currency,
) -> Chart {
    let labels: Vec<String> = budgets.iter().map(|budget| budget.name.clone()).collect();
    let amounts: Vec<f64> = summaries.iter().map(|summary| summary.amount).collect();
    let spent: Vec<f64> = summaries.iter().map(|summary| summary.total_spent).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Budgets vs. spending")
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip(currency))
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        )
        .series(
            bar::Bar::new()
                .name("Budget")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(amounts),
        )
        .series(
            bar::Bar::new()
                .name("Spent")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(spent),
        )
}

#[inline]
fn currency_formatter(currency: &Currency) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat('en-US', {{
              style: 'currency',
              currency: '{}'
            }});
            return (number) ? currencyFormatter.format(number) : \"-\";",
            currency.code
        ),
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip(currency: &Currency) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(currency))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
