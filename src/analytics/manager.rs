//! 访问日志管理器
//!
//! - `emit` 只做一次 `try_send`，队列满时丢弃并告警，从不阻塞调用方
//! - 独立写线程消费队列并依次写入所有 sink
//! - `shutdown` 关闭队列并等待写线程把剩余事件刷完

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::{AccessEvent, AccessLogSink, JsonLinesSink, MemorySink, TracingSink};
use crate::config::AccessLogConfig;
use crate::errors::{Result, SnaplinkError};

pub struct AccessLog {
    sender: RwLock<Option<Sender<AccessEvent>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    dropped: AtomicU64,
}

impl AccessLog {
    /// Start a writer thread feeding `sinks` from a queue of `capacity` events
    pub fn start(sinks: Vec<Arc<dyn AccessLogSink>>, capacity: usize) -> Result<Self> {
        let (tx, rx) = bounded(capacity.max(1));
        let worker = std::thread::Builder::new()
            .name("access-log-writer".to_string())
            .spawn(move || run_writer(rx, sinks))
            .map_err(|e| {
                SnaplinkError::file_operation(format!("Failed to spawn access log writer: {}", e))
            })?;

        debug!("AccessLog: writer started (capacity {})", capacity);
        Ok(Self {
            sender: RwLock::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            dropped: AtomicU64::new(0),
        })
    }

    /// An access log that discards everything
    pub fn disabled() -> Self {
        Self {
            sender: RwLock::new(None),
            worker: Mutex::new(None),
            dropped: AtomicU64::new(0),
        }
    }

    /// Build sinks from configuration
    ///
    /// Returns the memory sink separately so the API can serve it.
    pub fn from_config(config: &AccessLogConfig) -> Result<(Self, Option<Arc<MemorySink>>)> {
        if !config.enabled {
            info!("Access log disabled");
            return Ok((Self::disabled(), None));
        }

        let mut sinks: Vec<Arc<dyn AccessLogSink>> = Vec::new();

        let memory = (config.memory_capacity > 0)
            .then(|| Arc::new(MemorySink::new(config.memory_capacity)));
        if let Some(ref memory) = memory {
            sinks.push(memory.clone());
        }

        if let Some(path) = config.file.as_deref().filter(|p| !p.is_empty()) {
            let sink = JsonLinesSink::open(path).map_err(|e| {
                SnaplinkError::file_operation(format!(
                    "Failed to open access log file {}: {}",
                    path, e
                ))
            })?;
            info!("Access log file: {}", path);
            sinks.push(Arc::new(sink));
        }

        if config.echo_tracing {
            sinks.push(Arc::new(TracingSink));
        }

        let log = Self::start(sinks, config.channel_capacity)?;
        Ok((log, memory))
    }

    /// Queue an event; never blocks
    pub fn emit(&self, event: AccessEvent) {
        let guard = self.sender.read();
        let Some(tx) = guard.as_ref() else {
            return;
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    "AccessLog: queue full, dropped {} event '{}' ({} dropped so far)",
                    event.kind, event.event, total
                );
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("AccessLog: writer is gone, event dropped");
            }
        }
    }

    /// Events discarded because the queue was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.sender.read().is_some()
    }

    /// Close the queue and wait for pending events to reach the sinks
    ///
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        // 先释放发送端，写线程读空队列后自然退出
        let tx = self.sender.write().take();
        drop(tx);

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                error!("AccessLog: writer thread panicked");
            } else {
                debug!("AccessLog: writer stopped");
            }
        }
    }
}

impl Drop for AccessLog {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_writer(rx: Receiver<AccessEvent>, sinks: Vec<Arc<dyn AccessLogSink>>) {
    for event in rx.iter() {
        for sink in &sinks {
            if let Err(e) = sink.append(&event) {
                warn!("AccessLog: sink append failed: {}", e);
            }
        }
        if rx.is_empty() {
            flush_all(&sinks);
        }
    }
    flush_all(&sinks);
}

fn flush_all(sinks: &[Arc<dyn AccessLogSink>]) {
    for sink in sinks {
        if let Err(e) = sink.flush() {
            warn!("AccessLog: sink flush failed: {}", e);
        }
    }
}
