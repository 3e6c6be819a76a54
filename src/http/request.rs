use std::fmt;

use crate::http::persistence;

/// HTTP request methods.
///
/// Only the methods the page generator distinguishes get their own variant;
/// everything else is served like GET and reported as `OTHER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Submit data; the body is echoed back
    POST,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// Any other method token
    OTHER,
}

impl Method {
    /// Classifies a method token (case-sensitive).
    ///
    /// ```
    /// # use httpd::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::OTHER);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "HEAD" => Method::HEAD,
            _ => Method::OTHER,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::HEAD => "HEAD",
            Method::OTHER => "OTHER",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tokenized request.
///
/// Every field borrows from the receive buffer the request was parsed from,
/// so a `Request` never outlives the bytes of the message it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    /// Path plus optional raw query string, exactly as sent
    pub target: &'a str,
    /// Query parameters in order of appearance; duplicates are kept
    pub query: Vec<(&'a str, &'a str)>,
    /// Raw payload of the `Cookie` header
    pub cookie: Option<&'a str>,
    /// Bytes after the blank line; only present for non-empty POST bodies
    pub body: Option<&'a [u8]>,
    pub version: Option<&'a str>,
    /// Raw value of the `Connection` header
    pub connection: Option<&'a str>,
}

impl<'a> Request<'a> {
    /// First value of the query parameter `key`.
    pub fn query_param(&self, key: &str) -> Option<&'a str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Value of the cookie named `name` inside the `Cookie` header.
    ///
    /// The header is split on `;`, so both `bg=red` and `a=1; bg=red` work.
    pub fn cookie_value(&self, name: &str) -> Option<&'a str> {
        self.cookie?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Whether the connection should stay open after this request is answered.
    pub fn keep_alive(&self) -> bool {
        persistence::keep_alive(self.version, self.connection)
    }
}
