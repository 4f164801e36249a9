use crate::extract::RECORD_LINK;

/// Structural sanity check for relay payloads. Relays happily return HTTP 200
/// with captcha walls or empty shells, so the shape of the body is the only
/// success signal we trust.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    min_len: usize,
}

impl ContentValidator {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    /// `Err` carries the rejection reason.
    pub fn check(&self, payload: &str) -> Result<(), String> {
        // counted in chars, not bytes
        let len = payload.chars().take(self.min_len).count();
        if len < self.min_len {
            return Err(format!("payload too short: {len} < {} chars", self.min_len));
        }
        if !RECORD_LINK.is_match(payload) {
            return Err("no record links in payload".to_string());
        }
        Ok(())
    }
}
