//! Response synthesis.
//!
//! Every successfully tokenized request is answered with a small HTML page
//! echoing what the server saw: target, query parameters, cookie, peer
//! address and, for POST, the body. A `bg` query parameter or cookie colours
//! the page and is remembered through `Set-Cookie`.

use std::fmt::Write as _;
use std::net::SocketAddr;
use std::time::SystemTime;

use crate::config::Limits;
use crate::http::date;
use crate::http::parser::{Field, ParseError};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// Name of the query parameter / cookie carrying the background colour.
pub const BACKGROUND_KEY: &str = "bg";

/// Connection metadata the page is rendered with.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub peer: SocketAddr,
    pub server_name: &'a str,
    pub now: SystemTime,
}

/// Background colour for the request; a present query parameter always wins
/// over a cookie, even when its value is empty.
///
/// A value containing control characters is never used, since it is echoed
/// into the `Set-Cookie` header.
pub fn background<'a>(req: &Request<'a>) -> Option<&'a str> {
    req.query_param(BACKGROUND_KEY)
        .or_else(|| req.cookie_value(BACKGROUND_KEY))
        .filter(|v| !v.bytes().any(|b| b.is_ascii_control()))
}

/// Builds the `200 OK` response for a tokenized request.
///
/// Fails with [`ParseError::TooLarge`] when the rendered page exceeds
/// `limits.page`.
pub fn render(req: &Request<'_>, ctx: &PageContext<'_>, limits: &Limits) -> Result<Response, ParseError> {
    let bg = background(req);
    let page = render_html(req, bg, ctx);

    if page.len() > limits.page {
        return Err(ParseError::TooLarge {
            field: Field::Page,
            len: page.len(),
            limit: limits.page,
        });
    }

    let body = if req.method == Method::HEAD {
        Vec::new()
    } else {
        page.into_bytes()
    };

    let mut builder = base_headers(StatusCode::Ok, ctx)
        .header("Content-Length", body.len().to_string());

    if let Some(bg) = bg {
        builder = builder.header("Set-Cookie", format!("{}={}", BACKGROUND_KEY, bg));
    }

    Ok(builder.body(body).build())
}

/// Builds the `400 Bad Request` answer for a malformed request.
///
/// The connection is always closed afterwards.
pub fn bad_request(err: &ParseError, ctx: &PageContext<'_>) -> Response {
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>400 Bad Request</title></head>\n\
         <body>\n<h1>400 Bad Request</h1>\n<p>{}</p>\n</body>\n</html>\n",
        escape(&err.to_string())
    );

    base_headers(StatusCode::BadRequest, ctx)
        .header("Content-Length", body.len().to_string())
        .header("Connection", "close")
        .body(body.into_bytes())
        .build()
}

fn base_headers(status: StatusCode, ctx: &PageContext<'_>) -> ResponseBuilder {
    ResponseBuilder::new(status)
        .header("Date", date::iso8601(ctx.now))
        .header("Server", ctx.server_name)
        .header("Content-Type", "text/html")
}

fn render_html(req: &Request<'_>, bg: Option<&str>, ctx: &PageContext<'_>) -> String {
    let mut html = String::with_capacity(512);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(ctx.server_name));
    html.push_str("</head>\n");

    match bg.filter(|bg| !bg.is_empty()) {
        Some(bg) => {
            let _ = writeln!(html, "<body style=\"background-color:{}\">", escape(bg));
        }
        None => html.push_str("<body>\n"),
    }

    let _ = writeln!(html, "<p>{}</p>", escape(req.target));

    if !req.query.is_empty() {
        html.push_str("<p>\n");
        for (key, value) in &req.query {
            if value.is_empty() {
                let _ = writeln!(html, "{}<br>", escape(key));
            } else {
                let _ = writeln!(html, "{}={}<br>", escape(key), escape(value));
            }
        }
        html.push_str("</p>\n");
    }

    if let Some(cookie) = req.cookie {
        let _ = writeln!(html, "<p>{}</p>", escape(cookie));
    }

    let _ = writeln!(html, "<p>{}:{}</p>", ctx.peer.ip(), ctx.peer.port());

    if req.method == Method::POST {
        if let Some(body) = req.body {
            let _ = writeln!(html, "<p>{}</p>", escape(&String::from_utf8_lossy(body)));
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }
}
