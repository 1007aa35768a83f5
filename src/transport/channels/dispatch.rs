//! Per-session ordering for inbound events.
//!
//! Each session gets its own worker task fed by a bounded queue, so events
//! from one user are handled strictly in arrival order while different
//! sessions run in parallel.

use crate::session::{Controller, SessionKey};
use crate::transport::channels::traits::InboundMessage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// How long a session worker waits for its next event before exiting.
pub const SESSION_WORKER_IDLE: Duration = Duration::from_secs(600);

const SESSION_QUEUE_CAPACITY: usize = 32;

pub struct SessionDispatcher {
    controller: Arc<Controller>,
    queues: HashMap<SessionKey, mpsc::Sender<InboundMessage>>,
    idle: Duration,
}

impl SessionDispatcher {
    pub fn new(controller: Arc<Controller>, idle: Duration) -> Self {
        Self {
            controller,
            queues: HashMap::new(),
            idle,
        }
    }

    /// Queue `msg` behind earlier events of the same session.
    ///
    /// Never waits on a worker: a session whose queue is full (its outbound
    /// call is stalled) loses the event instead of holding up everyone else.
    pub fn dispatch(&mut self, msg: InboundMessage) {
        self.queues.retain(|_, tx| !tx.is_closed());

        let key = msg.session.clone();
        let msg = match self.queues.get(&key) {
            Some(tx) => match tx.try_send(msg) {
                Ok(()) => return,
                Err(TrySendError::Full(dropped)) => {
                    tracing::warn!(
                        session = %dropped.session,
                        capacity = SESSION_QUEUE_CAPACITY,
                        "session queue full; dropping event"
                    );
                    return;
                }
                // Worker went idle between the check and the send.
                Err(TrySendError::Closed(returned)) => returned,
            },
            None => msg,
        };

        let tx = self.spawn_worker(&key);
        if let Err(error) = tx.try_send(msg) {
            tracing::error!(session = %key, %error, "fresh session worker refused event");
            return;
        }
        self.queues.insert(key, tx);
    }

    /// Number of session workers currently alive.
    pub fn active_workers(&self) -> usize {
        self.queues.values().filter(|tx| !tx.is_closed()).count()
    }

    fn spawn_worker(&self, key: &SessionKey) -> mpsc::Sender<InboundMessage> {
        let (tx, rx) = mpsc::channel(SESSION_QUEUE_CAPACITY);
        tracing::debug!(session = %key, "spawning session worker");
        tokio::spawn(run_session_worker(
            Arc::clone(&self.controller),
            rx,
            self.idle,
        ));
        tx
    }
}

async fn run_session_worker(
    controller: Arc<Controller>,
    mut rx: mpsc::Receiver<InboundMessage>,
    idle: Duration,
) {
    loop {
        match tokio::time::timeout(idle, rx.recv()).await {
            Ok(Some(msg)) => handle_logged(&controller, &msg).await,
            Ok(None) => return,
            Err(_) => break,
        }
    }

    // Idle: refuse new events, then finish whatever slipped in.
    rx.close();
    while let Some(msg) = rx.recv().await {
        handle_logged(&controller, &msg);
    }
}

async fn handle_logged(controller: &Controller, msg: &InboundMessage) {
    if let Err(error) = controller.handle(msg).await {
        tracing::error!(session = %msg.session, %error, "failed to handle inbound event");
    }
}
