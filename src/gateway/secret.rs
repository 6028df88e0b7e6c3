use sha2::{Digest, Sha256};

use crate::error::SecretFailure;

/// Environment keys the master secret is loaded from
pub const SECRET_ENV_KEYS: &[&str] = &["COMMAND_MASTER_PASSWORD", "ADMIN_TOOL_PASSWORD"];

pub const MASK: &str = "********";

/// Check a supplied secret against the configured master secret.
///
/// An absent (or empty) configured secret always fails with
/// `Unconfigured`, whatever was supplied. Both sides are hashed to
/// fixed-size digests and folded with XOR, so the comparison takes the
/// same time regardless of how long a matching prefix is, and the
/// secret's length is not observable either.
pub fn verify(configured: Option<&str>, supplied: Option<&str>) -> Result<(), SecretFailure> {
    let expected = match configured {
        Some(secret) if !secret.is_empty() => secret,
        _ => return Err(SecretFailure::Unconfigured),
    };

    let supplied = match supplied {
        Some(value) if !value.is_empty() => value,
        _ => return Err(SecretFailure::Invalid),
    };

    if digests_equal(expected.as_bytes(), supplied.as_bytes()) {
        Ok(())
    } else {
        Err(SecretFailure::Invalid)
    }
}

/// Value of an environment entry as it may be shown to a caller
pub fn redact_value(key: &str, value: &str, configured: Option<&str>) -> String {
    if SECRET_ENV_KEYS.contains(&key.trim()) && !value.is_empty() {
        return MASK.to_string();
    }
    redact(value, configured)
}

/// Mask secret-bearing `KEY=` lines and every occurrence of the
/// configured secret in file content shown to a caller.
pub fn redact(content: &str, configured: Option<&str>) -> String {
    let masked: String = content
        .split_inclusive('\n')
        .map(|line| match line.split_once('=') {
            Some((key, value)) if SECRET_ENV_KEYS.contains(&key.trim()) && !value.trim().is_empty() => {
                let ending = &value[value.trim_end_matches(['\r', '\n']).len()..];
                format!("{}={}{}", key, MASK, ending)
            }
            _ => line.to_string(),
        })
        .collect();

    match configured.filter(|secret| !secret.is_empty()) {
        Some(secret) => masked.replace(secret, MASK),
        None => masked,
    }
}

fn digests_equal(left: &[u8], right: &[u8]) -> bool {
    let left = Sha256::digest(left);
    let right = Sha256::digest(right);

    let mut diff = 0_u8;
    for (a, b) in left.iter().zip(right.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeds_only_on_exact_match() {
        assert_eq!(verify(Some("correct horse"), Some("correct horse")), Ok(()));
        assert_eq!(verify(Some("correct horse"), Some("correct hors")), Err(SecretFailure::Invalid));
        assert_eq!(verify(Some("correct horse"), Some("correct horse ")), Err(SecretFailure::Invalid));
        assert_eq!(verify(Some("correct horse"), Some("Correct horse")), Err(SecretFailure::Invalid));
    }

    #[test]
    fn missing_configuration_always_fails() {
        for supplied in [None, Some(""), Some("anything"), Some("correct horse")] {
            assert_eq!(verify(None, supplied), Err(SecretFailure::Unconfigured));
            assert_eq!(verify(Some(""), supplied), Err(SecretFailure::Unconfigured));
        }
    }

    #[test]
    fn missing_supplied_secret_is_invalid() {
        assert_eq!(verify(Some("correct horse"), None), Err(SecretFailure::Invalid));
        assert_eq!(verify(Some("correct horse"), Some("")), Err(SecretFailure::Invalid));
    }

    #[test]
    fn redacts_secret_lines_and_inline_occurrences() {
        let content = "APP_NAME=Demo\r\nCOMMAND_MASTER_PASSWORD=\"hunter22!\"\r\nADMIN_TOOL_PASSWORD=\nBACKUP_PW=hunter22!\n";
        assert_eq!(
            redact(content, Some("hunter22!")),
            "APP_NAME=Demo\r\nCOMMAND_MASTER_PASSWORD=********\r\nADMIN_TOOL_PASSWORD=\nBACKUP_PW=********\n"
        );
        assert_eq!(redact("plain: text", None), "plain: text");
    }

    #[test]
    fn redacts_entry_values() {
        assert_eq!(redact_value("ADMIN_TOOL_PASSWORD", "anything", None), MASK);
        assert_eq!(redact_value("ADMIN_TOOL_PASSWORD", "", None), "");
        assert_eq!(redact_value("DB_PASSWORD", "hunter22!", Some("hunter22!")), MASK);
        assert_eq!(redact_value("APP_NAME", "Demo", Some("hunter22!")), "Demo");
    }

    #[test]
    fn compares_bytes_not_normalized_text() {
        // "é" precomposed vs. decomposed
        assert_eq!(verify(Some("caf\u{e9}-secret"), Some("cafe\u{301}-secret")), Err(SecretFailure::Invalid));
    }
}
