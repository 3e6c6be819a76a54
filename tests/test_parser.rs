use httpd::config::Limits;
use httpd::http::parser::{parse_http_request, parse_query, Field, ParseError};
use httpd::http::request::Method;

fn limits() -> Limits {
    Limits::default()
}

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.target, "/");
    assert_eq!(parsed.version, Some("HTTP/1.1"));
    assert!(parsed.query.is_empty());
    assert!(parsed.cookie.is_none());
    assert!(parsed.connection.is_none());
    assert!(parsed.body.is_none());
}

#[test]
fn test_parse_post_request_with_body() {
    let req = b"POST /x HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.target, "/x");
    assert_eq!(parsed.body, Some(&b"hello"[..]));
}

#[test]
fn test_parse_body_ignored_for_get() {
    let req = b"GET /x HTTP/1.1\r\n\r\nstray";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert!(parsed.body.is_none());
}

#[test]
fn test_parse_post_with_empty_body() {
    let req = b"POST /x HTTP/1.1\r\n\r\n";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert!(parsed.body.is_none());
}

#[test]
fn test_parse_query_parameters_in_order() {
    let req = b"GET /search?q=rust&page=2&q=again HTTP/1.1\r\n\r\n";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert_eq!(parsed.target, "/search?q=rust&page=2&q=again");
    assert_eq!(
        parsed.query,
        vec![("q", "rust"), ("page", "2"), ("q", "again")]
    );
    assert_eq!(parsed.query_param("q"), Some("rust"));
}

#[test]
fn test_parse_query_keeps_keys_without_value() {
    let req = b"GET /p?flag&bg=red&empty= HTTP/1.1\r\n\r\n";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert_eq!(parsed.query, vec![("flag", ""), ("bg", "red"), ("empty", "")]);
}

#[test]
fn test_parse_query_value_may_contain_equals() {
    assert_eq!(parse_query("expr=a=b"), vec![("expr", "a=b")]);
}

#[test]
fn test_parse_trailing_question_mark() {
    let req = b"GET /p? HTTP/1.1\r\n\r\n";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert_eq!(parsed.target, "/p?");
    assert!(parsed.query.is_empty());
}

#[test]
fn test_parse_cookie_header() {
    let req = b"GET / HTTP/1.1\r\nHost: a\r\nCookie: bg=blue\r\n\r\n";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert_eq!(parsed.cookie, Some("bg=blue"));
    assert_eq!(parsed.cookie_value("bg"), Some("blue"));
}

#[test]
fn test_parse_cookie_trims_trailing_control_characters() {
    let req = b"GET / HTTP/1.1\r\nCookie: bg=blue\x07\t\r\n\r\n";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert_eq!(parsed.cookie, Some("bg=blue"));
}

#[test]
fn test_parse_connection_header() {
    let req = b"GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\n";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert_eq!(parsed.version, Some("HTTP/1.0"));
    assert_eq!(parsed.connection, Some("keep-alive"));
    assert!(parsed.keep_alive());
}

#[test]
fn test_parse_request_line_without_version() {
    let req = b"GET /old\r\n\r\n";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert_eq!(parsed.target, "/old");
    assert_eq!(parsed.version, None);
    assert!(!parsed.keep_alive());
}

#[test]
fn test_parse_unknown_method_is_other() {
    let req = b"DELETE /x HTTP/1.1\r\n\r\n";
    let parsed = parse_http_request(req, &limits()).unwrap();

    assert_eq!(parsed.method, Method::OTHER);
}

#[test]
fn test_parse_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    let result = parse_http_request(req, &limits());

    assert_eq!(result, Err(ParseError::MissingHeaderTerminator));
}

#[test]
fn test_parse_missing_method_separator() {
    let req = b"GARBAGE\r\n\r\n";
    assert_eq!(
        parse_http_request(req, &limits()),
        Err(ParseError::MissingMethodSeparator)
    );

    let req = b" / HTTP/1.1\r\n\r\n";
    assert_eq!(
        parse_http_request(req, &limits()),
        Err(ParseError::MissingMethodSeparator)
    );
}

#[test]
fn test_parse_missing_target() {
    let req = b"GET  HTTP/1.1\r\n\r\n";
    assert_eq!(parse_http_request(req, &limits()), Err(ParseError::MissingTarget));
}

#[test]
fn test_parse_non_utf8_head() {
    let req = b"GET /\xff HTTP/1.1\r\n\r\n";
    assert_eq!(parse_http_request(req, &limits()), Err(ParseError::InvalidEncoding));
}

#[test]
fn test_parse_oversized_method() {
    let req = b"SUPERLONGMETHOD / HTTP/1.1\r\n\r\n";
    let err = parse_http_request(req, &limits()).unwrap_err();

    assert!(err.is_too_large());
    assert_eq!(
        err,
        ParseError::TooLarge { field: Field::Method, len: 15, limit: 8 }
    );
}

#[test]
fn test_parse_oversized_target() {
    let target = format!("/{}", "a".repeat(100));
    let req = format!("GET {} HTTP/1.1\r\n\r\n", target);
    let err = parse_http_request(req.as_bytes(), &limits()).unwrap_err();

    assert_eq!(
        err,
        ParseError::TooLarge { field: Field::Target, len: 101, limit: 100 }
    );
}

#[test]
fn test_parse_target_at_capacity_is_accepted() {
    let target = format!("/{}", "a".repeat(99));
    let req = format!("GET {} HTTP/1.1\r\n\r\n", target);

    assert!(parse_http_request(req.as_bytes(), &limits()).is_ok());
}

#[test]
fn test_parse_oversized_cookie_query_and_body() {
    let small = Limits {
        query: 4,
        cookie: 4,
        body: 4,
        ..Limits::default()
    };

    let err = parse_http_request(b"GET /?a=12345 HTTP/1.1\r\n\r\n", &small).unwrap_err();
    assert!(matches!(err, ParseError::TooLarge { field: Field::Query, .. }));

    let err = parse_http_request(b"GET / HTTP/1.1\r\nCookie: bg=red\r\n\r\n", &small).unwrap_err();
    assert!(matches!(err, ParseError::TooLarge { field: Field::Cookie, .. }));

    let err = parse_http_request(b"POST / HTTP/1.1\r\n\r\nhello", &small).unwrap_err();
    assert!(matches!(err, ParseError::TooLarge { field: Field::Body, .. }));
}

#[test]
fn test_parse_error_display() {
    assert_eq!(
        ParseError::MissingHeaderTerminator.to_string(),
        "missing blank line after headers"
    );
    assert_eq!(
        ParseError::TooLarge { field: Field::Body, len: 7, limit: 6 }.to_string(),
        "Body is 7 bytes, limit is 6"
    );
}

#[test]
fn test_parse_oversized_target_without_blank_line() {
    // A single read cut the request off mid-target
    let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(600));
    let err = parse_http_request(&raw.as_bytes()[..512], &limits()).unwrap_err();

    assert_eq!(
        err,
        ParseError::TooLarge { field: Field::Target, len: 508, limit: 100 }
    );
}

#[test]
fn test_parse_oversized_method_without_line_break() {
    let err = parse_http_request(b"VERYLONGMETHOD /", &limits()).unwrap_err();

    assert!(matches!(err, ParseError::TooLarge { field: Field::Method, .. }));
}

#[test]
fn test_parse_rejects_control_characters_in_target() {
    let req = b"GET /?bg=red\rX-Injected:1 HTTP/1.1\r\n\r\n";

    assert_eq!(
        parse_http_request(req, &limits()),
        Err(ParseError::ControlCharacter { field: Field::Target })
    );
}

#[test]
fn test_parse_rejects_control_characters_in_cookie() {
    let req = b"GET / HTTP/1.1\r\nCookie: bg=red\rSet-Cookie: admin=1\r\n\r\n";

    assert_eq!(
        parse_http_request(req, &limits()),
        Err(ParseError::ControlCharacter { field: Field::Cookie })
    );
}
