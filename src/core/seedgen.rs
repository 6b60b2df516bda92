//! Demonstration identifiers and one-way digests of sensitive input.
//!
//! Codes produced here are *not* unique by construction; callers insert them
//! against a `UNIQUE` column and retry on conflict.

use crate::models::registration::RegistrationType;
use rand::Rng;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;
const PASSWORD_SCHEME: &str = "sha256";

/// `PID-NNNNN` for individuals, `TID-NNNN` for teams.
pub fn registration_code<R: Rng + ?Sized>(kind: RegistrationType, rng: &mut R) -> String {
    let number = match kind {
        RegistrationType::Individual => rng.gen_range(10_000..=99_999),
        RegistrationType::Team => rng.gen_range(1_000..=9_999),
    };
    format!("{}-{}", kind.code_prefix(), number)
}

/// Lowercase hex SHA-256 of `raw`. Deterministic: equal input, equal digest.
pub fn hash_sensitive(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Salted digest in the form `sha256$<salt>$<digest>`.
pub fn hash_password(raw: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill(&mut salt[..]);
    let salt_hex = hex::encode(salt);
    format!("{PASSWORD_SCHEME}${salt_hex}${}", salted_digest(&salt_hex, raw))
}

pub fn verify_password(raw: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(PASSWORD_SCHEME), Some(salt_hex), Some(digest)) => {
            salted_digest(salt_hex, raw) == digest
        }
        _ => false,
    }
}

fn salted_digest(salt_hex: &str, raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Twelve ASCII digits, the shape of an Aadhaar number.
pub fn is_valid_national_id(raw: &str) -> bool {
    raw.len() == 12 && raw.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn codes_have_expected_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let pid = registration_code(RegistrationType::Individual, &mut rng);
            assert!(pid.starts_with("PID-"));
            let n: u32 = pid[4..].parse().unwrap();
            assert!((10_000..=99_999).contains(&n));

            let tid = registration_code(RegistrationType::Team, &mut rng);
            assert!(tid.starts_with("TID-"));
            let n: u32 = tid[4..].parse().unwrap();
            assert!((1_000..=9_999).contains(&n));
        }
    }

    #[test]
    fn same_seed_same_code() {
        let a = registration_code(RegistrationType::Team, &mut StdRng::seed_from_u64(7));
        let b = registration_code(RegistrationType::Team, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn sensitive_hash_is_stable_and_hides_input() {
        let h1 = hash_sensitive("123456789012");
        let h2 = hash_sensitive("123456789012");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(!h1.contains("123456789012"));
        assert_ne!(h1, hash_sensitive("123456789013"));
    }

    #[test]
    fn password_round_trip() {
        let stored = hash_password("s3cret");
        assert!(stored.starts_with("sha256$"));
        assert!(verify_password("s3cret", &stored));
        assert!(!verify_password("wrong", &stored));
        assert_ne!(stored, hash_password("s3cret"), "salt must differ per call");
    }

    #[test]
    fn national_id_shape() {
        assert!(is_valid_national_id("123456789012"));
        assert!(!is_valid_national_id("12345678901"));
        assert!(!is_valid_national_id("12345678901a"));
    }
}
