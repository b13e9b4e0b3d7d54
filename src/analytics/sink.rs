use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;
use tracing::info;

use super::AccessEvent;

/// 访问日志 Sink（只追加）
///
/// Called from the writer thread only, never under a store lock.
pub trait AccessLogSink: Send + Sync {
    fn append(&self, event: &AccessEvent) -> anyhow::Result<()>;

    /// Flush buffered output; called when the queue drains and on shutdown
    fn flush(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// 以 JSON Lines 格式追加写入文件
pub struct JsonLinesSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl AccessLogSink for JsonLinesSink {
    fn append(&self, event: &AccessEvent) -> anyhow::Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, event)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

/// 内存环形缓冲，保留最近 `capacity` 条事件
pub struct MemorySink {
    entries: Mutex<VecDeque<AccessEvent>>,
    capacity: usize,
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Oldest first
    pub fn entries(&self) -> Vec<AccessEvent> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl AccessLogSink for MemorySink {
    fn append(&self, event: &AccessEvent) -> anyhow::Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(event.clone());
        Ok(())
    }
}

/// 通过 tracing 输出访问事件（target = "access_log"）
pub struct TracingSink;

impl AccessLogSink for TracingSink {
    fn append(&self, event: &AccessEvent) -> anyhow::Result<()> {
        info!(
            target: "access_log",
            kind = event.kind.as_ref(),
            event = %event.event,
            payload = %event.payload,
            "{}",
            event.ts.to_rfc3339()
        );
        Ok(())
    }
}
