use axum::{
    debug_handler,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use pulldown_cmark::{CowStr, Event, Parser, Tag};
use tower_sessions::Session;

use crate::{db::User, session, AppResult};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

#[debug_handler]
pub async fn default_avatar() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "image/svg+xml")],
        include_res!(bytes, "/avatar.svg"),
    )
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Percent-encodes a value for use inside a query string.
pub fn query_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Substitutes `{key}` placeholders in one pass, so inserted values are never
/// scanned for placeholders themselves. Values go in as given; escape first.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let value = tail.find('}').and_then(|end| {
            let key = &tail[..end];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders CommonMark, showing any raw HTML as text. Links and images to
/// anything but http, https, mailto or a relative URL point at `#` instead.
pub fn markdown(source: &str) -> String {
    let parser = Parser::new(source).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) if !is_safe_url(&dest_url) => {
            Event::Start(Tag::Link { link_type, dest_url: CowStr::Borrowed("#"), title, id })
        }
        Event::Start(Tag::Image { link_type, dest_url, title, id }) if !is_safe_url(&dest_url) => {
            Event::Start(Tag::Image { link_type, dest_url: CowStr::Borrowed("#"), title, id })
        }
        _ => event,
    });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

fn is_safe_url(url: &str) -> bool {
    // browsers drop whitespace and control characters inside a scheme
    let url: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match url.find([':', '/', '?', '#']) {
        Some(i) if url[i..].starts_with(':') => matches!(&url[..i], "http" | "https" | "mailto"),
        _ => true,
    }
}

/// "3 hours ago" style age of a millisecond timestamp.
pub fn time_since(created: i64) -> String {
    let seconds = (crate::db::now() - created).max(0) / 1000;

    let (amount, unit) = match seconds {
        0..60 => return "just now".to_owned(),
        60..3_600 => (seconds / 60, "minute"),
        3_600..86_400 => (seconds / 3_600, "hour"),
        86_400..604_800 => (seconds / 86_400, "day"),
        604_800..2_592_000 => (seconds / 604_800, "week"),
        2_592_000..31_536_000 => (seconds / 2_592_000, "month"),
        _ => (seconds / 31_536_000, "year"),
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

/// Wraps `content` in the site layout, consuming pending flashes.
pub async fn page(
    session: &Session,
    user: Option<&User>,
    title: &str,
    content: &str,
) -> AppResult<Response> {
    let flashes: String = session::take_flashes(session)
        .await?
        .iter()
        .map(|message| fill(include_res!(str, "/pages/flash.html"), &[("message", escape(message).as_str())]))
        .collect();

    let nav = match user {
        Some(user) => fill(
            include_res!(str, "/pages/nav_user.html"),
            &[
                ("id", user.id.as_str()),
                ("username", escape(&user.username).as_str()),
                ("avatar", escape(&user.avatar_url()).as_str()),
            ],
        ),
        None => include_res!(str, "/pages/nav_anonymous.html").to_owned(),
    };

    let body = fill(
        include_res!(str, "/pages/layout.html"),
        &[
            ("title", escape(title).as_str()),
            ("nav", nav.as_str()),
            ("flashes", flashes.as_str()),
            ("content", content),
        ],
    );
    Ok(Html(body).into_response())
}

pub fn sorry(what: &str) -> AppResult<Response> {
    Ok((
        StatusCode::NOT_FOUND,
        Html(fill(include_res!(str, "/pages/sorry.html"), &[("what", escape(what).as_str())])),
    )
        .into_response())
}

/// Plain refusal for a signed-in user acting on something that isn't theirs.
pub fn forbidden(message: &'static str) -> AppResult<Response> {
    Ok((StatusCode::FORBIDDEN, message).into_response())
}
