//! Server-rendered pages. Markup is kept deliberately plain; every dynamic
//! value goes through [`escape`].

use crate::database::User;

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{} | Matrix PMS</title></head>\n<body>\n{}\n</body></html>\n",
        escape(title),
        body
    )
}

/// Login form; `error` is rendered inline above the fields and `phone` is
/// echoed back so the user does not retype it.
pub fn login_page(error: Option<&str>, phone: &str, next: Option<&str>) -> String {
    let error_html = error
        .map(|message| format!("<p class=\"error\" role=\"alert\">{}</p>\n", escape(message)))
        .unwrap_or_default();
    let next_html = next
        .map(|next| format!("<input type=\"hidden\" name=\"next\" value=\"{}\">\n", escape(next)))
        .unwrap_or_default();

    let body = format!(
        "<h1>Sign in</h1>\n{}<form method=\"post\" action=\"/login\">\n{}\
<label>Phone number <input type=\"tel\" name=\"phone\" value=\"{}\" placeholder=\"07XXXXXXXX\"></label>\n\
<label>Password <input type=\"password\" name=\"password\"></label>\n\
<button type=\"submit\">Sign in</button>\n</form>",
        error_html,
        next_html,
        escape(phone)
    );
    layout("Login", &body)
}

pub fn dashboard_page(user: &User) -> String {
    let body = format!(
        "<h1>Dashboard</h1>\n<p>Signed in as <strong>{}</strong> ({})</p>\n\
<form method=\"post\" action=\"/logout\"><button type=\"submit\">Sign out</button></form>",
        escape(&user.name),
        escape(&user.phone)
    );
    layout("Dashboard", &body)
}
