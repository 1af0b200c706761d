// src/core/field.rs
//! Field encryption — AES-256-CBC, PKCS#7, standard base64
//!
//! Output is byte-compatible with the server's PII encryption service:
//! no IV or header in the ciphertext, the IV comes from [`KeyMaterial`].

use std::fmt;

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;

use crate::consts::{BLOCK_LEN, CANONICAL_DATE_FORMAT};
use crate::core::key::KeyMaterial;
use crate::error::FieldError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Which PII column a value came from. Decides classification and canonical form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    DateOfBirth,
    MobilePhone,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::DateOfBirth => f.write_str("DateOfBirth"),
            FieldKind::MobilePhone => f.write_str("MobilePhone"),
        }
    }
}

/// How phone numbers are canonicalized before encryption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneFormat {
    /// Encrypt the stored string unchanged
    #[default]
    AsStored,
    /// Apply [`normalize_phone`] first
    DigitsOnly,
}

/// Encrypt a string exactly like the server's `Encrypt(string)`
pub fn encrypt_value(plaintext: &str, key: &KeyMaterial) -> String {
    let ciphertext = Aes256CbcEnc::new(key.key().into(), key.iv().into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    STANDARD.encode(ciphertext)
}

/// Inverse of [`encrypt_value`]. Fails on anything that is not ciphertext
/// under `key`.
pub fn decrypt_value(ciphertext: &str, key: &KeyMaterial) -> Result<String, FieldError> {
    let bytes = STANDARD.decode(ciphertext)?;
    if bytes.is_empty() || bytes.len() % BLOCK_LEN != 0 {
        return Err(FieldError::CiphertextLength(bytes.len()));
    }
    let plaintext = Aes256CbcDec::new(key.key().into(), key.iv().into())
        .decrypt_padded_vec_mut::<Pkcs7>(&bytes)
        .map_err(|_| FieldError::Padding)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Reformat a stored date or date-time as `YYYY-MM-DD`.
///
/// Any time-of-day part (after `T` or a space) is dropped. The server only
/// ever decrypts dates in this form.
pub fn normalize_date(raw: &str) -> Result<String, FieldError> {
    let date = NaiveDate::parse_from_str(date_part(raw.trim()), CANONICAL_DATE_FORMAT)
        .map_err(FieldError::InvalidDate)?;
    Ok(date.format(CANONICAL_DATE_FORMAT).to_string())
}

/// The portion of a stored date value before any `T` or space separator
pub(crate) fn date_part(raw: &str) -> &str {
    raw.split(['T', ' ']).next().unwrap_or(raw)
}

/// Keep a leading `+` and every ASCII digit; drop everything else.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut normalized = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        normalized.push('+');
    }
    normalized.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));
    normalized
}

/// Encrypts plaintext field values into their stored ciphertext form
pub struct FieldEncryptor<'k> {
    key: &'k KeyMaterial,
    phone_format: PhoneFormat,
}

impl<'k> FieldEncryptor<'k> {
    pub fn new(key: &'k KeyMaterial) -> Self {
        Self {
            key,
            phone_format: PhoneFormat::default(),
        }
    }

    pub fn with_phone_format(mut self, phone_format: PhoneFormat) -> Self {
        self.phone_format = phone_format;
        self
    }

    /// The exact string that gets encrypted for `raw`
    pub fn canonical(&self, raw: &str, kind: FieldKind) -> Result<String, FieldError> {
        let canonical = match kind {
            FieldKind::DateOfBirth => normalize_date(raw)?,
            FieldKind::MobilePhone => match self.phone_format {
                PhoneFormat::AsStored => raw.to_string(),
                PhoneFormat::DigitsOnly => normalize_phone(raw),
            },
        };
        if canonical.is_empty() {
            return Err(FieldError::Empty);
        }
        Ok(canonical)
    }

    pub fn encrypt(&self, raw: &str, kind: FieldKind) -> Result<String, FieldError> {
        let canonical = self.canonical(raw, kind)?;
        Ok(encrypt_value(&canonical, self.key))
    }
}
