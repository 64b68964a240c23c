//! Classification Batcher
//!
//! Collects requests from many async callers and classifies them together so
//! deferred rows reach the classifier in one pass.

use crate::engine::RuleNet;
use crate::error::EngineError;
use crate::verdict::Verdict;
use feature_engine::FeatureVector;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Errors seen by batcher callers
#[derive(Debug, Error)]
pub enum BatcherError {
    #[error("Batcher stopped")]
    Closed,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

struct ClassifyRequest {
    vector: FeatureVector,
    respond: oneshot::Sender<Result<Verdict, EngineError>>,
}

/// Cloneable sender side of a [`ClassifyBatcher`]
#[derive(Clone)]
pub struct BatcherHandle {
    sender: mpsc::Sender<ClassifyRequest>,
}

impl BatcherHandle {
    /// Queue a vector and wait for its verdict
    pub async fn classify(&self, vector: FeatureVector) -> Result<Verdict, BatcherError> {
        let (respond, response) = oneshot::channel();
        self.sender
            .send(ClassifyRequest { vector, respond })
            .await
            .map_err(|_| BatcherError::Closed)?;
        let verdict = response.await.map_err(|_| BatcherError::Closed)??;
        Ok(verdict)
    }
}

/// Batching loop in front of a [`RuleNet`]
pub struct ClassifyBatcher {
    receiver: mpsc::Receiver<ClassifyRequest>,
    /// Batch size threshold
    batch_size: usize,
    /// Timeout for batch collection (ms)
    timeout_ms: u64,
}

impl ClassifyBatcher {
    /// Create a handle and batcher pair
    pub fn channel(batch_size: usize, timeout_ms: u64) -> (BatcherHandle, Self) {
        let batch_size = batch_size.max(1);
        info!(
            "Creating classify batcher: batch_size={}, timeout={}ms",
            batch_size, timeout_ms
        );
        let (sender, receiver) = mpsc::channel(batch_size * 2);
        (
            BatcherHandle { sender },
            Self {
                receiver,
                batch_size,
                timeout_ms,
            },
        )
    }

    /// Run until every handle is dropped
    pub async fn run(&mut self, engine: &RuleNet) {
        info!("Starting classify batcher");
        let timeout_duration = Duration::from_millis(self.timeout_ms);

        loop {
            let mut batch = Vec::with_capacity(self.batch_size);

            match self.receiver.recv().await {
                Some(request) => batch.push(request),
                None => {
                    debug!("Batcher channel closed");
                    break;
                }
            }

            while batch.len() < self.batch_size {
                match timeout(timeout_duration, self.receiver.recv()).await {
                    Ok(Some(request)) => batch.push(request),
                    Ok(None) => break,
                    Err(_) => break,
                }
            }

            debug!("Processing batch of {} requests", batch.len());
            self.process(engine, batch);
        }

        info!("Classify batcher stopped");
    }

    fn process(&self, engine: &RuleNet, batch: Vec<ClassifyRequest>) {
        let vectors: Vec<FeatureVector> = batch.iter().map(|r| r.vector.clone()).collect();

        match engine.classify_batch(&vectors) {
            Ok(verdicts) => {
                for (request, verdict) in batch.into_iter().zip(verdicts) {
                    // Caller may have given up waiting
                    let _ = request.respond.send(Ok(verdict));
                }
            }
            Err(e) => {
                // One bad row must not fail its neighbours
                warn!("Batch failed ({}), classifying rows individually", e);
                for request in batch {
                    let _ = request.respond.send(engine.classify(&request.vector));
                }
            }
        }
    }
}
