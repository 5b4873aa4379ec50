use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tapalavras_common::protocol::{
    deserialize_message, framed_transport, serialize_message, ClientEvent, ServerEvent,
};

const CHANNEL_CAPACITY: usize = 64;

/// Everything the event channel can deliver to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Connected,
    Disconnected,
    Server(ServerEvent),
}

/// Handle to the single live event channel.
///
/// Dropping it aborts the reader and writer tasks, so the socket is torn down
/// on every exit path of the owner.
#[derive(Debug)]
pub struct Connection {
    tx: mpsc::Sender<ClientEvent>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl Connection {
    /// Wrap an in-process channel with no socket behind it.
    pub fn from_sender(tx: mpsc::Sender<ClientEvent>) -> Self {
        Self {
            tx,
            reader: None,
            writer: None,
        }
    }

    pub fn is_live(&self) -> bool {
        if self.tx.is_closed() {
            return false;
        }
        self.reader.as_ref().map_or(true, |task| !task.is_finished())
    }

    pub fn emit(&self, event: ClientEvent) -> Result<(), mpsc::error::TrySendError<ClientEvent>> {
        self.tx.try_send(event)
    }

    pub fn close(mut self) {
        self.abort_tasks();
    }

    fn abort_tasks(&mut self) {
        if let Some(task) = self.reader.take() {
            task.abort();
        }
        if let Some(task) = self.writer.take() {
            task.abort();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

/// Connect to the server and return the connection plus the inbound event stream.
pub async fn connect(addr: &str) -> anyhow::Result<(Connection, mpsc::Receiver<Inbound>)> {
    let stream = TcpStream::connect(addr).await?;
    tracing::info!("Connected to {}", addr);
    let transport = framed_transport(stream);
    let (mut sink, mut stream) = transport.split();

    let (client_tx, mut client_rx) = mpsc::channel::<ClientEvent>(CHANNEL_CAPACITY);
    let (inbound_tx, inbound_rx) = mpsc::channel::<Inbound>(CHANNEL_CAPACITY);

    // Writer task: client_rx -> TCP sink
    let writer = tokio::spawn(async move {
        while let Some(event) = client_rx.recv().await {
            match serialize_message(&event) {
                Ok(bytes) => {
                    tracing::debug!("-> {}", event.name());
                    if sink.send(bytes).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize client event: {}", e);
                }
            }
        }
    });

    // Reader task: TCP stream -> inbound_tx
    let reader = tokio::spawn(async move {
        if inbound_tx.send(Inbound::Connected).await.is_err() {
            return;
        }
        loop {
            match stream.next().await {
                Some(Ok(frame)) => match deserialize_message::<ServerEvent>(&frame) {
                    Ok(event) => {
                        if inbound_tx.send(Inbound::Server(event)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse server event: {}", e);
                    }
                },
                Some(Err(e)) => {
                    tracing::warn!("Read error: {}", e);
                    break;
                }
                None => {
                    tracing::info!("Server closed the connection");
                    break;
                }
            }
        }
        let _ = inbound_tx.send(Inbound::Disconnected).await;
    });

    let connection = Connection {
        tx: client_tx,
        reader: Some(reader),
        writer: Some(writer),
    };
    Ok((connection, inbound_rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_connection_emits_until_receiver_drops() {
        let (tx, mut rx) = mpsc::channel(4);
        let conn = Connection::from_sender(tx);
        assert!(conn.is_live());

        conn.emit(ClientEvent::PassTurn {
            room_id: "ABC123".into(),
        })
        .unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::PassTurn {
                room_id: "ABC123".into()
            }
        );

        drop(rx);
        assert!(!conn.is_live());
        assert!(conn
            .emit(ClientEvent::PassTurn {
                room_id: "ABC123".into()
            })
            .is_err());
    }

    #[tokio::test]
    async fn test_connect_refused_is_an_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(connect(&addr.to_string()).await.is_err());
    }
}
