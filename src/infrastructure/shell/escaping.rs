//! POSIX shell quoting
//!
//! Git is always spawned with an argument vector; these helpers render the
//! same invocation as a copy-pasteable command line for errors and logs.

/// Quote a single argument for a POSIX shell
///
/// Plain words (letters, digits and `-_./=:@+,%`) are returned unchanged.
/// Everything else is wrapped in single quotes with embedded quotes written
/// as `'\''`.
pub fn quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    let plain = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_./=:@+,%".contains(c));
    if plain {
        return arg.to_string();
    }

    format!("'{}'", arg.replace('\'', "'\\''"))
}

/// Render `program` and its arguments as one shell command line
pub fn quote_command<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut line = quote(program);
    for arg in args {
        line.push(' ');
        line.push_str(&quote(arg.as_ref()));
    }
    line
}
