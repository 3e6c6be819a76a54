//! Keep-alive decision for a served request.

/// Decides whether a connection stays open after the response.
///
/// Rules, first match wins:
///
/// 1. protocol version `HTTP/1.1` (a trailing `\r` is tolerated)
/// 2. `Connection` header equal to `keep-alive`, ignoring case and surrounding whitespace
/// 3. otherwise close
pub fn keep_alive(version: Option<&str>, connection: Option<&str>) -> bool {
    if version.is_some_and(|v| v.trim_end_matches('\r') == "HTTP/1.1") {
        return true;
    }

    connection
        .map(|v| v.trim().eq_ignore_ascii_case("keep-alive"))
        .unwrap_or(false)
}
