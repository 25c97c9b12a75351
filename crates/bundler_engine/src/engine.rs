use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_error, engine_info};

use crate::agent::{BundleOptions, Clock};
use crate::cache::{FetchCache, MemoryCache};
use crate::fetch::{FetchSettings, ReqwestTransport, Transport};
use crate::provenance::ctime_now;
use crate::{Agent, BundleError, BundleOutput, Credentials, EngineEvent, JobId};

#[derive(Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub options: BundleOptions,
    pub clock: Clock,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            options: BundleOptions::default(),
            clock: Arc::new(ctime_now),
        }
    }
}

enum EngineCommand {
    Enqueue {
        job_id: JobId,
        url: String,
        credentials: Option<Credentials>,
    },
}

impl EngineCommand {
    fn job_id(&self) -> JobId {
        match self {
            EngineCommand::Enqueue { job_id, .. } => *job_id,
        }
    }
}

/// Runs conversions on a background tokio runtime.
///
/// Every job gets its own [`Agent`]; all jobs share one transport and the
/// process-wide fetch cache, and run concurrently with each other.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, BundleError> {
        let transport = ReqwestTransport::new(&config.fetch)
            .map_err(|err| BundleError::Client(err.to_string()))?;
        Self::with_parts(config, Arc::new(transport), MemoryCache::global())
    }

    /// Builds a handle over an explicit transport and cache.
    pub fn with_parts(
        config: EngineConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn FetchCache>,
    ) -> Result<Self, BundleError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let agent = Agent::new(transport.clone(), cache.clone(), config.options)
                    .with_clock(config.clock.clone());
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    // A job that panics still owes its caller a completion.
                    let job_id = command.job_id();
                    let job = tokio::spawn(handle_command(agent, command, event_tx.clone()));
                    if let Err(err) = job.await {
                        engine_error!("Job {} aborted: {}", job_id, err);
                        let _ = event_tx.send(EngineEvent::JobCompleted {
                            job_id,
                            result: Err(BundleError::JobAborted(err.to_string())),
                        });
                    }
                });
            }
            // The handle is gone; dropping the runtime cancels jobs still in flight.
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn enqueue(
        &self,
        job_id: JobId,
        url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Result<(), BundleError> {
        self.cmd_tx
            .send(EngineCommand::Enqueue {
                job_id,
                url: url.into(),
                credentials,
            })
            .map_err(|_| BundleError::WorkerGone)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event arrives.
    pub fn recv(&self) -> Result<EngineEvent, BundleError> {
        self.event_rx.recv().map_err(|_| BundleError::WorkerGone)
    }
}

async fn handle_command(
    mut agent: Agent,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Enqueue {
            job_id,
            url,
            credentials,
        } => {
            let _ = event_tx.send(EngineEvent::Started {
                job_id,
                url: url.clone(),
            });
            let result = agent
                .convert(&url, credentials.as_ref())
                .await
                .map(|html| BundleOutput {
                    source_url: url.clone(),
                    html,
                    errors: agent.into_errors(),
                });
            match &result {
                Ok(output) => engine_info!(
                    "Job {} finished: {} bytes, {} errors",
                    job_id,
                    output.html.len(),
                    output.errors.len()
                ),
                Err(err) => engine_error!("Job {} failed: {}", job_id, err),
            }
            let _ = event_tx.send(EngineEvent::JobCompleted { job_id, result });
        }
    }
}
