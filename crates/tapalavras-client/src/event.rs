use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tapalavras_client::network::Inbound;

const HOUSEKEEPING_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Tagged with the session that produced it; stale sessions are ignored.
    Network { session: u64, inbound: Inbound },
    Tick,
    Countdown,
}

pub async fn event_loop(event_tx: mpsc::Sender<AppEvent>) {
    let mut key_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(HOUSEKEEPING_INTERVAL);

    loop {
        let event = tokio::select! {
            Some(Ok(Event::Key(key))) = key_stream.next() => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                AppEvent::Key(key)
            }
            _ = tick_interval.tick() => {
                AppEvent::Tick
            }
        };

        if event_tx.send(event).await.is_err() {
            break;
        }
    }
}

/// Pump one session's inbound events into the app channel.
pub fn forward_network(
    mut inbound_rx: mpsc::Receiver<Inbound>,
    event_tx: mpsc::Sender<AppEvent>,
    session: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(inbound) = inbound_rx.recv().await {
            if event_tx
                .send(AppEvent::Network { session, inbound })
                .await
                .is_err()
            {
                break;
            }
        }
    })
}
