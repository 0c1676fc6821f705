//! Rate limiting stub. Always allows.
//!
//! TODO: back this with a real token bucket once request volume justifies it;
//! the call sites are already in place.

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
}

/// Check the caller against the limit for `_key`. Currently a no-op.
pub fn check(_key: &str) -> RateLimitDecision {
    RateLimitDecision::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_always_allows() {
        assert_eq!(check("beta:203.0.113.9"), RateLimitDecision::Allowed);
    }
}
