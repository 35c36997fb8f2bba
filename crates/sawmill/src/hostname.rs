//! Host name detection

use std::env;
use tracing::debug;

/// Host name of the emitting process.
///
/// Tries, in order:
/// 1. `SAWMILL_HOSTNAME` environment variable
/// 2. `HOSTNAME` environment variable
/// 3. The system host name (unix only)
///
/// Resolves to an empty string when nothing is available.
#[must_use]
pub fn system_hostname() -> String {
    for var in ["SAWMILL_HOSTNAME", "HOSTNAME"] {
        if let Ok(hostname) = env::var(var) {
            if !hostname.is_empty() {
                return hostname;
            }
        }
    }

    #[cfg(unix)]
    match nix::unistd::gethostname() {
        Ok(hostname) => {
            if let Some(hostname) = hostname.to_str().filter(|h| !h.is_empty()) {
                return hostname.to_string();
            }
        }
        Err(e) => debug!(error = %e, "gethostname failed"),
    }

    debug!("Could not determine hostname, records carry an empty HostName");
    String::new()
}
