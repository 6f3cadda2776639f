use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|error| panic!("bad selector {css:?}: {error}"))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// The first `<form>` in `html`.
#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    let forms = selector("form");
    let Some(form) = html.select(&forms).next() else {
        panic!("want a form in the page, got none");
    };

    form
}

/// Check that `form` submits to `endpoint` via the HTMX attribute `attribute`,
/// e.g. `hx-post`.
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form.value().attr(attribute);

    assert_eq!(
        got,
        Some(endpoint),
        "want form with {attribute}=\"{endpoint}\", got {got:?}"
    );
}

/// The input named `name`, after checking that it has type `type_` and is required.
#[track_caller]
fn must_get_required_input<'a>(form: &ElementRef<'a>, name: &str, type_: &str) -> ElementRef<'a> {
    let inputs = selector(&format!("input[name=\"{name}\"]"));
    let Some(input) = form.select(&inputs).next() else {
        panic!("want an input named {name:?} in the form, got none");
    };

    let got_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(got_type, type_, "want input {name:?} to have type {type_:?}");
    assert!(
        input.value().attr("required").is_some(),
        "want input {name:?} to be required"
    );

    input
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    must_get_required_input(form, name, type_);
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = must_get_required_input(form, name, type_);
    let got_value = input.value().attr("value").unwrap_or_default();

    assert_eq!(got_value, value, "want input {name:?} to have value {value:?}");
}

/// Check that the first button in `form` submits it and is labelled `text`.
#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    let buttons = selector("button");
    let Some(button) = form.select(&buttons).next() else {
        panic!("want a submit button in the form, got none");
    };

    assert_eq!(button.value().attr("type"), Some("submit"));
    assert_eq!(text_of(button), text);
}

/// Check the text of the first paragraph in `form`, where validation errors
/// are shown.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let paragraphs = selector("p");
    let Some(paragraph) = form.select(&paragraphs).next() else {
        panic!("want an error message in the form, got none");
    };

    assert_eq!(text_of(paragraph), want_error_message);
}
