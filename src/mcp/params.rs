//! Picks the request params out of the trailing command-line tokens

use tracing::{debug, warn};

use crate::error::{ProbeError, Result};

/// A token is treated as params when it starts with `{`.
pub fn looks_like_params(token: &str) -> bool {
    token.starts_with('{')
}

/// Scan `tokens` in order and return the params to send.
///
/// Every params-shaped token must parse; the first one that doesn't aborts
/// the scan. When several parse, the last one wins. An empty object counts
/// as no params at all, so `'{"a":1}' '{}'` sends none.
pub fn select<S: AsRef<str>>(tokens: &[S]) -> Result<Option<serde_json::Value>> {
    let mut params: Option<serde_json::Value> = None;

    for token in tokens {
        let token = token.as_ref();
        if !looks_like_params(token) {
            debug!(token, "ignoring argument");
            continue;
        }

        let value = serde_json::from_str(token).map_err(|source| ProbeError::InvalidParams {
            text: token.to_string(),
            source,
        })?;

        if let Some(previous) = params.replace(value) {
            warn!(%previous, "more than one params argument, keeping the last");
        }
    }

    Ok(params.filter(|value| {
        let empty = value.as_object().is_some_and(|object| object.is_empty());
        if empty {
            debug!("empty params object, omitting params");
        }
        !empty
    }))
}
