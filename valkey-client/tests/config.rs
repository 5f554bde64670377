use valkey_client::{config::ValkeyConfig, error::ValkeyResult};

#[test]
fn test_config_creation() -> ValkeyResult<()> {
    let config = ValkeyConfig::new("localhost", 6379)?;

    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 6379);
    assert_eq!(config.password, None);
    assert_eq!(config.db, 0);
    Ok(())
}

#[test]
fn test_config_url() -> ValkeyResult<()> {
    let plain = ValkeyConfig::new("cache", 6380)?.with_db(2)?;
    assert_eq!(plain.url(), "redis://cache:6380/2");

    let secured = ValkeyConfig::new("cache", 6379)?.with_password("s3cret");
    assert_eq!(secured.url(), "redis://:s3cret@cache:6379/0");
    assert_eq!(secured.endpoint(), "cache:6379/0");
    Ok(())
}

#[test]
fn test_empty_password_is_none() -> ValkeyResult<()> {
    let config = ValkeyConfig::new("localhost", 6379)?.with_password("");
    assert_eq!(config.password, None);
    Ok(())
}

#[test]
fn test_config_validate() {
    assert!(ValkeyConfig::new("", 6379).is_err());
    assert!(ValkeyConfig::new("localhost", 6379).unwrap().with_db(-1).is_err());
}
