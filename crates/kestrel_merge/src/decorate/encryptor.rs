use base64::Engine;

use kestrel_common::datum::Datum;
use kestrel_common::error::{KestrelResult, MergeError};

/// Reversible column cipher used by the encrypt rule.
pub trait Encryptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn encrypt(&self, plain: &Datum) -> KestrelResult<Datum>;

    /// Returns the plaintext as text; callers convert it to the column type.
    fn decrypt(&self, cipher: &Datum) -> KestrelResult<Datum>;
}

/// Base64 over the textual form of the value. An encoding, not a secret:
/// meant for tests, demos and wiring checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Encryptor;

impl Encryptor for Base64Encryptor {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn encrypt(&self, plain: &Datum) -> KestrelResult<Datum> {
        if plain.is_null() {
            return Ok(Datum::Null);
        }
        let text = plain.to_string();
        Ok(Datum::Text(
            base64::engine::general_purpose::STANDARD.encode(text.as_bytes()),
        ))
    }

    fn decrypt(&self, cipher: &Datum) -> KestrelResult<Datum> {
        let text = match cipher {
            Datum::Null => return Ok(Datum::Null),
            Datum::Text(s) => s,
            other => {
                return Err(MergeError::Decrypt {
                    column: String::new(),
                    reason: format!("expected text cipher, got {:?}", other.data_type()),
                }
                .into())
            }
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(text.as_bytes())
            .map_err(|e| MergeError::Decrypt {
                column: String::new(),
                reason: format!("invalid base64: {}", e),
            })?;
        let plain = String::from_utf8(bytes).map_err(|e| MergeError::Decrypt {
            column: String::new(),
            reason: format!("plaintext is not UTF-8: {}", e),
        })?;
        Ok(Datum::Text(plain))
    }
}
