use crate::entity::EntityId;
use crate::events::AppEvent;
use crate::state::{RawState, StateStore};
use async_channel::Sender;
use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

pub const SOCKET_PATH: &str = "/tmp/powerhalo.sock";

/// One line of the ingest protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set(EntityId, RawState),
    Unset(EntityId),
}

#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{0}' expects an entity id")]
    MissingEntity(&'static str),
    #[error("'set' expects a value for {0}")]
    MissingValue(EntityId),
}

/// Splits off the first whitespace-delimited token; the rest keeps its inner spacing.
fn next_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    input.split_once(char::is_whitespace).unwrap_or((input, ""))
}

impl Command {
    /// `set <entity> <value>` or `unset <entity>`. The value is kept raw so a
    /// non-numeric state still reaches the store as a resolution gap.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let (verb, rest) = next_token(line);
        let (id, rest) = next_token(rest);
        let id = Some(id).filter(|id| !id.is_empty()).map(EntityId::new);

        match verb {
            "" => Err(ProtocolError::Empty),
            "set" => {
                let id = id.ok_or(ProtocolError::MissingEntity("set"))?;
                match rest.trim() {
                    "" => Err(ProtocolError::MissingValue(id)),
                    value => Ok(Self::Set(id, RawState::from(value))),
                }
            }
            "unset" => id
                .map(Self::Unset)
                .ok_or(ProtocolError::MissingEntity("unset")),
            other => Err(ProtocolError::Unknown(other.to_string())),
        }
    }

    pub fn apply(self, store: &StateStore) {
        match self {
            Self::Set(id, raw) => store.set(id, raw),
            Self::Unset(id) => {
                store.unset(&id);
            }
        }
    }
}

pub async fn run_server(socket_path: &Path, store: StateStore, tx: Sender<AppEvent>) {
    if std::fs::metadata(socket_path).is_ok() {
        let _ = std::fs::remove_file(socket_path);
    }

    let listener = match UnixListener::bind(socket_path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", socket_path.display(), e);
            return;
        }
    };
    log::info!("Listening for readings on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                let store = store.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match Command::parse(&line) {
                            Ok(command) => {
                                log::debug!("Received {:?}", command);
                                command.apply(&store);
                                if tx.send(AppEvent::StateChanged).await.is_err() {
                                    break;
                                }
                            }
                            Err(ProtocolError::Empty) => {}
                            Err(e) => log::warn!("Ignoring '{}': {}", line.trim(), e),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Reading, StateSource};

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("set sensor.grid 1234.5\n"),
            Ok(Command::Set(EntityId::new("sensor.grid"), RawState::from("1234.5")))
        );
        assert_eq!(
            Command::parse("  unset sensor.grid "),
            Ok(Command::Unset(EntityId::new("sensor.grid")))
        );
        assert_eq!(Command::parse("   "), Err(ProtocolError::Empty));
        assert_eq!(
            Command::parse("show"),
            Err(ProtocolError::Unknown("show".to_string()))
        );
        assert_eq!(Command::parse("set"), Err(ProtocolError::MissingEntity("set")));
        assert_eq!(
            Command::parse("set sensor.grid"),
            Err(ProtocolError::MissingValue(EntityId::new("sensor.grid")))
        );
        assert_eq!(Command::parse("unset"), Err(ProtocolError::MissingEntity("unset")));
    }

    #[test]
    fn test_parse_repeated_whitespace() {
        let cases = vec![
            ("set  sensor.a 5", Command::Set(EntityId::new("sensor.a"), RawState::from("5"))),
            ("set\tsensor.a \t 5 \n", Command::Set(EntityId::new("sensor.a"), RawState::from("5"))),
            (
                "set sensor.a   not available",
                Command::Set(EntityId::new("sensor.a"), RawState::from("not available")),
            ),
            ("unset   sensor.a", Command::Unset(EntityId::new("sensor.a"))),
        ];

        for (line, expected) in cases {
            assert_eq!(Command::parse(line), Ok(expected), "line: {line:?}");
        }
        assert_eq!(
            Command::parse("set  sensor.a   "),
            Err(ProtocolError::MissingValue(EntityId::new("sensor.a")))
        );
    }

    #[test]
    fn test_apply_commands() {
        let store = StateStore::default();
        let id = EntityId::new("sensor.solar");

        Command::parse("set sensor.solar 2100").unwrap().apply(&store);
        assert_eq!(store.snapshot().reading(&id), Reading::Value(2100.0));

        Command::parse("set sensor.solar unavailable").unwrap().apply(&store);
        assert_eq!(store.snapshot().reading(&id), Reading::Unresolved);

        Command::parse("unset sensor.solar").unwrap().apply(&store);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_server_applies_lines() {
        use tokio::io::AsyncWriteExt;
        use tokio::net::UnixStream;

        let socket_path =
            std::env::temp_dir().join(format!("powerhalo-test-{}.sock", std::process::id()));
        let store = StateStore::default();
        let (tx, rx) = async_channel::bounded(8);

        let server_path = socket_path.clone();
        let server_store = store.clone();
        tokio::spawn(async move { run_server(&server_path, server_store, tx).await });

        let mut stream = loop {
            match UnixStream::connect(&socket_path).await {
                Ok(s) => break s,
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        };
        stream.write_all(b"set sensor.home 482.7\nbogus\n").await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), AppEvent::StateChanged);
        assert_eq!(
            store.snapshot().reading(&EntityId::new("sensor.home")),
            Reading::Value(482.7)
        );
        let _ = std::fs::remove_file(&socket_path);
    }
}
