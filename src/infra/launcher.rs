//! Usage: Launcher-supplied login token lookup in process invocation arguments.

/// Find `param` among the arguments.
///
/// Accepted forms: `-param=VALUE`, `--param=VALUE`, `param=VALUE`, and `-param VALUE`.
pub fn token_override<I, S>(args: I, param: &str) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let param = param.trim().trim_start_matches('-');
    if param.is_empty() {
        return None;
    }

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg = arg.as_ref().trim();
        let name = arg.trim_start_matches('-');
        if let Some((key, value)) = name.split_once('=') {
            if key.eq_ignore_ascii_case(param) {
                return non_empty(value);
            }
            continue;
        }
        if name.eq_ignore_ascii_case(param) && arg.starts_with('-') {
            return args.next().and_then(|value| non_empty(value.as_ref()));
        }
    }
    None
}

/// Like [`token_override`], for a full invocation whose first item is the program path.
pub fn token_override_from_invocation<I, S>(invocation: I, param: &str) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    token_override(invocation.into_iter().skip(1), param)
}

pub fn token_override_from_env(param: &str) -> Option<String> {
    token_override_from_invocation(std::env::args(), param)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim().trim_matches('"');
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
