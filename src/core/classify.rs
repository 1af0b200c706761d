// src/core/classify.rs
//! Plaintext-or-ciphertext decisions from a stored value's shape alone
//!
//! The schema has no "is encrypted" flag, so every migration decision rests on
//! these rules. They are kept behind [`FieldClassifier`] so the orchestration
//! never depends on how a verdict was reached.
//!
//! Date of birth: a value whose date part (before any `T` or space) holds at
//! least two `-` is plaintext. Standard base64 never contains `-`, so a
//! ciphertext can never be mistaken for a date.
//!
//! Mobile phone: no structural pattern exists, so the value is trimmed,
//! base64-decoded and judged by size:
//! 1. decode fails → plaintext
//! 2. fewer than 16 decoded bytes → plaintext
//! 3. ≥16 bytes, more than 30 encoded chars and at least one `=` → encrypted
//! 4. otherwise → plaintext
//!
//! Rule 3 misses ciphertexts that need no padding or encode to 30 chars or
//! fewer (every single-block ciphertext is 24 chars). Those are re-encrypted
//! on a re-run. [`ProbingClassifier`] counts them as suspect and can, when
//! asked, confirm them against the key instead.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::consts::{BLOCK_LEN, NULL_DATE_PARTS, PHONE_CIPHERTEXT_MIN_ENCODED_LEN, ZERO_DATE_SENTINEL};
use crate::core::field::{date_part, decrypt_value, FieldKind};
use crate::core::key::KeyMaterial;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Needs encrypting
    Plaintext,
    /// Leave alone
    AlreadyEncrypted,
    /// Null, blank or a "no value" sentinel
    Skip,
}

/// Classify a stored value by shape alone
pub fn classify(raw: Option<&str>, kind: FieldKind) -> Verdict {
    match raw {
        None => Verdict::Skip,
        Some(value) if value.trim().is_empty() => Verdict::Skip,
        Some(value) => match kind {
            FieldKind::DateOfBirth => classify_date_of_birth(value),
            FieldKind::MobilePhone => classify_mobile_phone(value),
        },
    }
}

pub fn classify_date_of_birth(raw: &str) -> Verdict {
    let value = raw.trim();
    if value.is_empty() || is_null_date(value) {
        Verdict::Skip
    } else if has_date_shape(value) {
        Verdict::Plaintext
    } else {
        Verdict::AlreadyEncrypted
    }
}

/// Surrounding whitespace is ignored; a stored ciphertext with a stray
/// newline is still ciphertext.
pub fn classify_mobile_phone(raw: &str) -> Verdict {
    let value = raw.trim();
    if value.is_empty() {
        return Verdict::Skip;
    }
    let decoded = match STANDARD.decode(value) {
        Ok(bytes) => bytes,
        Err(_) => return Verdict::Plaintext,
    };
    if decoded.len() < BLOCK_LEN {
        return Verdict::Plaintext;
    }
    if value.len() > PHONE_CIPHERTEXT_MIN_ENCODED_LEN && value.contains('=') {
        Verdict::AlreadyEncrypted
    } else {
        Verdict::Plaintext
    }
}

fn is_null_date(value: &str) -> bool {
    value == ZERO_DATE_SENTINEL || NULL_DATE_PARTS.contains(&date_part(value))
}

fn has_date_shape(value: &str) -> bool {
    date_part(value).matches('-').count() >= 2
}

/// True when `raw` is well-formed ciphertext under `key`
pub fn decrypts_under(raw: &str, key: &KeyMaterial) -> bool {
    decrypt_value(raw.trim(), key).is_ok_and(|plain| {
        !plain.is_empty() && !plain.chars().any(char::is_control)
    })
}

/// A verdict plus whether it disagrees with a key probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    /// The shape rules and the key disagree; worth an operator's look
    pub suspect: bool,
}

impl Classification {
    pub fn certain(verdict: Verdict) -> Self {
        Self {
            verdict,
            suspect: false,
        }
    }

    pub fn suspect(verdict: Verdict) -> Self {
        Self {
            verdict,
            suspect: true,
        }
    }
}

/// The one seam between the migration loop and the classification heuristics
pub trait FieldClassifier {
    fn assess(&self, raw: Option<&str>, kind: FieldKind) -> Classification;
}

/// Shape rules only. Never marks anything suspect.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeClassifier;

impl FieldClassifier for ShapeClassifier {
    fn assess(&self, raw: Option<&str>, kind: FieldKind) -> Classification {
        Classification::certain(classify(raw, kind))
    }
}

/// Shape rules cross-checked by trial decryption.
///
/// Verdicts stay those of the shape rules unless `confirm_with_key` is set, in
/// which case a "plaintext" that decrypts under the key is left alone.
pub struct ProbingClassifier<'k> {
    key: &'k KeyMaterial,
    confirm_with_key: bool,
}

impl<'k> ProbingClassifier<'k> {
    pub fn new(key: &'k KeyMaterial) -> Self {
        Self {
            key,
            confirm_with_key: false,
        }
    }

    pub fn confirm_with_key(mut self, confirm: bool) -> Self {
        self.confirm_with_key = confirm;
        self
    }
}

impl FieldClassifier for ProbingClassifier<'_> {
    fn assess(&self, raw: Option<&str>, kind: FieldKind) -> Classification {
        let verdict = classify(raw, kind);
        let Some(value) = raw else {
            return Classification::certain(verdict);
        };
        match verdict {
            Verdict::Skip => Classification::certain(verdict),
            Verdict::Plaintext if decrypts_under(value, self.key) => {
                if self.confirm_with_key {
                    Classification::suspect(Verdict::AlreadyEncrypted)
                } else {
                    Classification::suspect(Verdict::Plaintext)
                }
            }
            Verdict::Plaintext => Classification::certain(verdict),
            Verdict::AlreadyEncrypted if decrypts_under(value, self.key) => {
                Classification::certain(verdict)
            }
            Verdict::AlreadyEncrypted => Classification::suspect(verdict),
        }
    }
}
