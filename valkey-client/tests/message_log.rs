use serde::{Deserialize, Serialize};
use testcontainers_modules::{
    testcontainers::runners::AsyncRunner as _,
    valkey::{VALKEY_PORT, Valkey},
};
use valkey_client::{MessageLog, config::ValkeyConfig};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Entry {
    username: String,
    text: String,
}

#[tokio::test]
async fn test_append_and_range() -> anyhow::Result<()> {
    let valkey = Valkey::default().start().await?;
    let host = valkey.get_host().await?;
    let port = valkey.get_host_port_ipv4(VALKEY_PORT).await?;

    let config = ValkeyConfig::new(host.to_string(), port)?;
    let log = MessageLog::connect(&config).await?;
    log.ping().await?;

    assert_eq!(log.append("chat:alice", b"first").await?, 1);
    assert_eq!(log.append("chat:alice", b"second").await?, 2);
    assert_eq!(log.append("chat:bob", b"other").await?, 1);

    let entries = log.range("chat:alice", 0, -1).await?;
    assert_eq!(entries, vec![b"first".to_vec(), b"second".to_vec()]);
    assert_eq!(log.range("chat:alice", -1, -1).await?, vec![b"second".to_vec()]);
    assert_eq!(log.len("chat:bob").await?, 1);
    assert_eq!(log.len("chat:nobody").await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_json_entries() -> anyhow::Result<()> {
    let valkey = Valkey::default().start().await?;
    let host = valkey.get_host().await?;
    let port = valkey.get_host_port_ipv4(VALKEY_PORT).await?;

    let log = MessageLog::connect(&ValkeyConfig::new(host.to_string(), port)?).await?;

    let entry = Entry {
        username: "alice".into(),
        text: "hi".into(),
    };
    log.append_json("chat:alice", &entry).await?;

    let stored = log.range_json::<Entry>("chat:alice", 0, -1).await?;
    assert_eq!(stored, vec![entry]);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_fails_per_command() -> anyhow::Result<()> {
    let config = ValkeyConfig::new("127.0.0.1", 1)?;
    let log = MessageLog::new(&config)?;

    assert!(log.append("chat:alice", b"lost").await.is_err());
    assert!(log.ping().await.is_err());
    Ok(())
}
