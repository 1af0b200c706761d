// src/consts.rs
//! Shared constants — key derivation inputs, sentinels and defaults

/// Passphrase used when neither `PiiEncryption:Key` nor `Encryption:Key` is set.
///
/// Rows already encrypted by the server under this value must stay readable,
/// so it can never change.
pub const FALLBACK_PASSPHRASE: &str = "DefaultEncryptionKey32BytesLong!!";

/// Suffix appended to the passphrase before hashing it into the IV
pub const IV_SUFFIX: &str = "IV";

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

/// AES block / IV length in bytes
pub const BLOCK_LEN: usize = 16;

/// Zero-date the server writes for "no date of birth"
pub const ZERO_DATE_SENTINEL: &str = "0001-01-01T00:00:00.000000";

/// Date parts that mean "no value" regardless of the time component
pub const NULL_DATE_PARTS: &[&str] = &["0001-01-01", "0000-00-00"];

/// Canonical stored form of an encrypted date of birth
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Phone values with an encoded length at or below this are never ciphertext
// A 16-byte single-block ciphertext encodes to 24 chars and falls under it
pub const PHONE_CIPHERTEXT_MIN_ENCODED_LEN: usize = 30;

/// Default MySQL port when the connection string has none
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Hex characters shown for the key fingerprint
pub const FINGERPRINT_HEX_LEN: usize = 16;

/// Primary key column shared by every migrated table
pub const DEFAULT_ID_COLUMN: &str = "Id";

/// Tables carrying the date-of-birth column, in processing order
pub const DATE_OF_BIRTH_TABLES: &[&str] = &["UserRequests", "Users"];

/// Tables carrying the mobile-phone column, in processing order
pub const MOBILE_PHONE_TABLES: &[&str] = &["Users", "UserRequests"];

pub const DATE_OF_BIRTH_COLUMN: &str = "DateOfBirthEncrypted";
pub const MOBILE_PHONE_COLUMN: &str = "MobilePhoneEncrypted";
