//! Password hashing and bearer-token issuance.
//!
//! Kept behind `CredentialService` so the rest of the app never touches
//! digests or signing keys directly.

use crate::core::traits::CredentialService;
use chrono::{Duration, Utc};
use di::{inject, injectable};
use jsonwebtoken::{EncodingKey, Header};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::env;
use uuid::Uuid;

const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub struct LocalCredentialService {
    secret: String,
}

#[injectable(CredentialService)]
impl LocalCredentialService {
    #[inject]
    pub fn create() -> LocalCredentialService {
        dotenvy::dotenv().ok();
        let secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "development-secret".to_owned());

        LocalCredentialService { secret }
    }
}

fn digest_hex(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

impl CredentialService for LocalCredentialService {
    fn hash_password(&self, password: &str) -> String {
        let salt = Uuid::new_v4().simple().to_string();
        format!("{salt}${}", digest_hex(&salt, password))
    }

    fn verify_password(&self, password: &str, stored: &str) -> bool {
        match stored.split_once('$') {
            Some((salt, digest)) => digest_hex(salt, password) == digest,
            None => false,
        }
    }

    fn issue_token(&self, subject: &str) -> String {
        let claims = Claims {
            sub: subject.to_owned(),
            exp: (Utc::now() + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
        };

        // HS256 signing over an in-memory secret cannot fail.
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("token signing")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> LocalCredentialService {
        LocalCredentialService {
            secret: "test-secret".to_owned(),
        }
    }

    #[test]
    fn hash_round_trips() {
        let service = service();
        let stored = service.hash_password("hunter2");

        assert!(service.verify_password("hunter2", &stored));
        assert!(!service.verify_password("hunter3", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let service = service();
        assert_ne!(
            service.hash_password("hunter2"),
            service.hash_password("hunter2")
        );
    }

    #[test]
    fn rejects_malformed_stored_hash() {
        assert!(!service().verify_password("hunter2", "not-a-hash"));
    }

    #[test]
    fn tokens_are_well_formed() {
        let token = service().issue_token("CL-08051301");
        assert_eq!(token.split('.').count(), 3);
    }
}
