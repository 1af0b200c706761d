// tests/config_tests.rs
use std::fs;

use pii_migrate::aliases::Passphrase;
use pii_migrate::config::{parse_connection_string, PassphraseSource};
use pii_migrate::consts::FALLBACK_PASSPHRASE;
use pii_migrate::{ConfigError, ConnectionSettings, FieldKind, Settings, Target, TargetSet};

fn secret(passphrase: &Passphrase) -> String {
    passphrase.expose_secret().to_string()
}

fn settings(json: &str) -> Settings {
    Settings::from_json_str(json).expect("valid settings json")
}

#[test]
fn pii_key_wins_over_encryption_key() {
    let s = settings(
        r#"{
            "PiiEncryption": { "Key": "pii-passphrase" },
            "Encryption": { "Key": "general-passphrase" }
        }"#,
    );
    assert_eq!(s.passphrase_source(), PassphraseSource::PiiEncryption);
    assert_eq!(secret(&s.passphrase()), "pii-passphrase");
}

#[test]
fn encryption_key_used_when_pii_key_missing_or_empty() {
    for json in [
        r#"{ "Encryption": { "Key": "general-passphrase" } }"#,
        r#"{ "PiiEncryption": { "Key": "" }, "Encryption": { "Key": "general-passphrase" } }"#,
        r#"{ "PiiEncryption": { "Key": null }, "Encryption": { "Key": "general-passphrase" } }"#,
        r#"{ "PiiEncryption": {}, "Encryption": { "Key": "general-passphrase" } }"#,
    ] {
        let s = settings(json);
        assert_eq!(s.passphrase_source(), PassphraseSource::Encryption, "{json}");
        assert_eq!(secret(&s.passphrase()), "general-passphrase");
    }
}

#[test]
fn fallback_passphrase_when_no_key_configured() {
    for json in ["{}", r#"{ "PiiEncryption": { "Key": "" }, "Encryption": { "Key": "" } }"#] {
        let s = settings(json);
        assert_eq!(s.passphrase_source(), PassphraseSource::Fallback);
        assert_eq!(secret(&s.passphrase()), FALLBACK_PASSPHRASE);
    }
}

#[test]
fn whitespace_passphrase_is_used_verbatim() {
    let s = settings(r#"{ "PiiEncryption": { "Key": "  " } }"#);
    assert_eq!(s.passphrase_source(), PassphraseSource::PiiEncryption);
    assert_eq!(secret(&s.passphrase()), "  ");

    let s = settings(r#"{ "PiiEncryption": { "Key": "" }, "Encryption": { "Key": " padded " } }"#);
    assert_eq!(s.passphrase_source(), PassphraseSource::Encryption);
    assert_eq!(secret(&s.passphrase()), " padded ");
}

#[test]
fn unrelated_sections_are_ignored() {
    let s = settings(
        r#"{
            "Logging": { "LogLevel": { "Default": "Information" } },
            "AllowedHosts": "*",
            "Jwt": { "Issuer": "x" },
            "PiiEncryption": { "Key": "k", "Algorithm": "AES" }
        }"#,
    );
    assert_eq!(s.passphrase_source(), PassphraseSource::PiiEncryption);
}

#[test]
fn mysql_connection_string_preferred() {
    let s = settings(
        r#"{ "ConnectionStrings": {
            "MySQL": "Server=db1;Database=app;User=svc;Password=pw",
            "DefaultConnection": "Server=db2;Database=other;User=svc"
        } }"#,
    );
    assert_eq!(s.connection().unwrap().host, "db1");
}

#[test]
fn default_connection_used_as_fallback() {
    let s = settings(
        r#"{ "ConnectionStrings": {
            "MySQL": "",
            "DefaultConnection": "Server=db2;Database=other;User=svc"
        } }"#,
    );
    let conn = s.connection().unwrap();
    assert_eq!(conn.host, "db2");
    assert_eq!(conn.database, "other");
}

#[test]
fn missing_connection_string_is_a_config_error() {
    let s = settings(r#"{ "ConnectionStrings": {} }"#);
    assert!(matches!(s.connection(), Err(ConfigError::MissingConnectionString)));
    assert!(matches!(settings("{}").connection_string(), Err(ConfigError::MissingConnectionString)));
}

#[test]
fn parses_full_connection_string() {
    let conn = parse_connection_string(
        "Server=db.internal;Port=3307;Database=mentalhealth;User=svc_app;Password=p@ss=word;",
    )
    .unwrap();
    assert_eq!(
        conn,
        ConnectionSettings {
            host: "db.internal".into(),
            port: 3307,
            user: "svc_app".into(),
            password: "p@ss=word".into(),
            database: "mentalhealth".into(),
        }
    );
    assert_eq!(conn.display_target(), "db.internal:3307/mentalhealth");
}

#[test]
fn keys_are_case_insensitive_with_aliases() {
    let conn: ConnectionSettings = " HOST = localhost ; user id=root; PWD=secret; DATABASE=app"
        .parse()
        .unwrap();
    assert_eq!(conn.host, "localhost");
    assert_eq!(conn.user, "root");
    assert_eq!(conn.password, "secret");
    assert_eq!(conn.database, "app");

    let conn = parse_connection_string("server=h;uid=u;database=d").unwrap();
    assert_eq!(conn.user, "u");
    assert_eq!(conn.password, "");
}

#[test]
fn port_defaults_to_3306() {
    let conn = parse_connection_string("Server=h;User=u;Database=d").unwrap();
    assert_eq!(conn.port, 3306);
}

#[test]
fn invalid_port_is_rejected() {
    assert!(matches!(
        parse_connection_string("Server=h;Port=abc;User=u;Database=d"),
        Err(ConfigError::InvalidPort(p)) if p == "abc"
    ));
    assert!(matches!(
        parse_connection_string("Server=h;Port=70000;User=u;Database=d"),
        Err(ConfigError::InvalidPort(_))
    ));
}

#[test]
fn missing_required_fields_are_rejected() {
    assert!(matches!(
        parse_connection_string("User=u;Database=d"),
        Err(ConfigError::MissingField("server"))
    ));
    assert!(matches!(
        parse_connection_string("Server=h;Database=d"),
        Err(ConfigError::MissingField("user"))
    ));
    assert!(matches!(
        parse_connection_string("Server=h;User=u;Database="),
        Err(ConfigError::MissingField("database"))
    ));
}

#[test]
fn debug_output_never_shows_secrets() {
    let conn = parse_connection_string("Server=h;User=u;Password=hunter2;Database=d").unwrap();
    assert!(!format!("{conn:?}").contains("hunter2"));

    let s = settings(
        r#"{
            "PiiEncryption": { "Key": "top-secret-passphrase" },
            "ConnectionStrings": { "MySQL": "Server=h;User=u;Password=hunter2;Database=d" }
        }"#,
    );
    let debug = format!("{s:?}");
    assert!(!debug.contains("top-secret-passphrase"));
    assert!(!debug.contains("hunter2"));
}

#[test]
fn load_reads_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("appsettings.Production.json");
    fs::write(
        &path,
        r#"{ "Encryption": { "Key": "from-file" },
             "ConnectionStrings": { "DefaultConnection": "Server=h;User=u;Database=d" } }"#,
    )
    .unwrap();

    let s = Settings::load(&path).unwrap();
    assert_eq!(secret(&s.passphrase()), "from-file");
    assert_eq!(s.connection().unwrap().database, "d");
}

#[test]
fn load_reports_missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("nope.json");
    assert!(matches!(Settings::load(&missing), Err(ConfigError::Read { .. })));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ \"Encryption\": ").unwrap();
    let err = Settings::load(&broken).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn target_names_must_be_identifiers() {
    assert!(Target::new("Users", "Id", "DateOfBirthEncrypted", FieldKind::DateOfBirth).is_ok());
    for bad in ["Users; DROP TABLE Users", "1Users", "", "Users.Name", "`Users`"] {
        assert!(
            matches!(
                Target::new(bad, "Id", "MobilePhoneEncrypted", FieldKind::MobilePhone),
                Err(ConfigError::InvalidIdentifier(_))
            ),
            "{bad:?}"
        );
    }
    assert!(Target::new("Users", "Id", "Mobile Phone", FieldKind::MobilePhone).is_err());
}

#[test]
fn target_sets_cover_production_tables_in_order() {
    let names = |set: TargetSet| -> Vec<String> {
        set.targets().iter().map(ToString::to_string).collect()
    };
    assert_eq!(
        names(TargetSet::DateOfBirth),
        ["UserRequests.DateOfBirthEncrypted", "Users.DateOfBirthEncrypted"]
    );
    assert_eq!(
        names(TargetSet::MobilePhone),
        ["Users.MobilePhoneEncrypted", "UserRequests.MobilePhoneEncrypted"]
    );
    assert_eq!(names(TargetSet::default()).len(), 4);
    assert!(TargetSet::All
        .targets()
        .iter()
        .all(|t| t.id_column() == "Id"));
}
