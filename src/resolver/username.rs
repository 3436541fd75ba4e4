use log::debug;
use serde::Serialize;

/// A login name split into the base username and an optional provider hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedIdentity {
    pub username: String,
    pub provider_hint: Option<String>,
}

/// Splits a raw login name on `delimiter`.
///
/// With `@` or `@@` the provider is the last segment, so email-style names
/// such as `a@b@corp` keep their inner `@`. Any other delimiter puts the
/// provider first (`corp_alice`). The input is lower-cased first.
pub fn parse_username(raw: &str, delimiter: &str) -> ParsedIdentity {
    let lowered = raw.to_lowercase();
    if delimiter.is_empty() || !lowered.contains(delimiter) {
        return ParsedIdentity {
            username: lowered,
            provider_hint: None,
        };
    }

    let parts: Vec<&str> = lowered.split(delimiter).collect();
    let last = parts.len() - 1;
    let (username, provider) = if is_suffix_delimiter(delimiter) {
        (parts[..last].join(delimiter), parts[last])
    } else {
        (parts[1..].join(delimiter), parts[0])
    };

    debug!("Parsed username '{raw}' into user '{username}', provider '{provider}'");
    // An empty provider segment (`alice@`) counts as no hint.
    let provider_hint = if provider.is_empty() {
        None
    } else {
        Some(provider.to_string())
    };
    ParsedIdentity {
        username,
        provider_hint,
    }
}

/// Joins an identity back into a login name, the inverse of [`parse_username`].
pub fn join_username(identity: &ParsedIdentity, delimiter: &str) -> String {
    match identity.provider_hint {
        Some(ref provider) if is_suffix_delimiter(delimiter) => {
            format!("{}{delimiter}{provider}", identity.username)
        }
        Some(ref provider) => format!("{provider}{delimiter}{}", identity.username),
        None => identity.username.clone(),
    }
}

fn is_suffix_delimiter(delimiter: &str) -> bool {
    delimiter == "@" || delimiter == "@@"
}
