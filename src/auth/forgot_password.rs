use axum::{response::IntoResponse, response::Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{LINK_STYLE, base, log_in_register},
};

fn forgot_password_template() -> Markup {
    let instructions = html! {
        div class="space-y-4 text-gray-900 dark:text-white"
        {
            p class="text-justify"
            {
                "Passwords are reset by whoever runs this server. From the
                directory the server runs in, run the "
                code { "reset_password" }
                " program with the path to the database and the email address
                of your account:"
            }

            pre class="p-3 overflow-x-auto text-sm rounded bg-gray-100 dark:bg-gray-700"
            {
                "reset_password --db-path budget_buddy.db --email you@example.com"
            }

            p
            {
                "Remembered it? "
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Back to log in" }
            }
        }
    };

    base(
        "Forgot Password",
        &[],
        &log_in_register("Forgot your password?", &instructions),
    )
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_template().into_response()
}
