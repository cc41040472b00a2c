//! Local checks run before a new password is sent to the identity provider.

use async_trait::async_trait;
use log::{debug, warn};
use sha1::{Digest, Sha1};

use crate::api::{HttpRequest, HttpTransport};
use crate::error::{TransportError, ValidationError};

/// Leaked-password lookup.
#[async_trait(?Send)]
pub trait BreachChecker {
    /// How many times `secret` shows up in known breaches.
    async fn breach_count(&self, secret: &str) -> Result<u64, TransportError>;
}

/// Confirmation must match, then the secret must not be a known leak. A
/// checker outage does not block the change; the provider still applies its
/// own password policy.
pub async fn validate_new_password(
    new_secret: &str,
    confirmation: &str,
    checker: &dyn BreachChecker,
) -> Result<(), ValidationError> {
    if new_secret != confirmation {
        return Err(ValidationError::Mismatch);
    }

    match checker.breach_count(new_secret).await {
        Ok(0) => Ok(()),
        Ok(count) => Err(ValidationError::Breached { count }),
        Err(err) => {
            warn!("breach check unavailable, skipping: {err}");
            Ok(())
        }
    }
}

/* ---------------- Pwned Passwords (k-anonymity) ------------------------- */

const PREFIX_LEN: usize = 5;

/// Only the first five hex digits of the SHA-1 ever leave the browser.
pub struct PwnedPasswords<T> {
    base_url:  String,
    transport: T,
}

impl<T: HttpTransport> PwnedPasswords<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), transport }
    }
}

#[async_trait(?Send)]
impl<T: HttpTransport> BreachChecker for PwnedPasswords<T> {
    async fn breach_count(&self, secret: &str) -> Result<u64, TransportError> {
        let hash = sha1_hex(secret);
        let (prefix, suffix) = hash.split_at(PREFIX_LEN);

        let request = HttpRequest::get(&format!("{}/range/{prefix}", self.base_url))
            .header("Add-Padding", "true");
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(TransportError(format!("breach lookup answered HTTP {}", response.status)));
        }

        let count = count_for_suffix(&response.body, suffix);
        debug!("breach lookup done ({count} hit(s))");
        Ok(count)
    }
}

fn sha1_hex(secret: &str) -> String {
    Sha1::digest(secret.as_bytes())
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect()
}

/// Range bodies are `SUFFIX:COUNT` lines; padding entries carry a count of 0.
pub fn count_for_suffix(body: &str, suffix: &str) -> u64 {
    body.lines()
        .filter_map(|line| line.trim().split_once(':'))
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(suffix))
        .and_then(|(_, count)| count.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_is_upper_hex() {
        assert_eq!(sha1_hex("password"), "5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8");
    }

    #[test]
    fn suffix_lookup() {
        let body = "1E4C9B93F3F0682250B6CF8331B7EE68FD8:9545824\r\n\
                    0018A45C4D1DEF81644B54AB7F969B88D65:0\r\n\
                    00D4F6E8FA6EECAD2A3AA415EEC418D38EC:2";
        assert_eq!(count_for_suffix(body, "1e4c9b93f3f0682250b6cf8331b7ee68fd8"), 9_545_824);
        assert_eq!(count_for_suffix(body, "0018A45C4D1DEF81644B54AB7F969B88D65"), 0);
        assert_eq!(count_for_suffix(body, "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF"), 0);
        assert_eq!(count_for_suffix("", "ABC"), 0);
    }
}
