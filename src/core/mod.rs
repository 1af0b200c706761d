// src/core/mod.rs
//! Key derivation, field classification and field encryption — no I/O, no database

pub mod classify;
pub mod field;
pub mod key;
pub mod util;

pub use classify::{
    classify, Classification, FieldClassifier, ProbingClassifier, ShapeClassifier, Verdict,
};
pub use field::{
    decrypt_value, encrypt_value, normalize_date, normalize_phone, FieldEncryptor, FieldKind,
    PhoneFormat,
};
pub use key::{derive, KeyMaterial};
