//! 同梱のリスナー

use crate::{DebuggerListener, Result, StackFrame};
use kanshi_target::Location;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

/// 受け取ったイベントを数える
#[derive(Debug, Default)]
pub struct EventCountListener {
    count: AtomicUsize,
}

impl EventCountListener {
    pub const NAME: &'static str = "Event Counter";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    fn bump(&self) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl DebuggerListener for EventCountListener {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_start(&self) -> Result<()> {
        self.bump()
    }

    fn on_stop(&self) -> Result<()> {
        self.bump()
    }

    fn on_step(&self, _location: &Location) -> Result<()> {
        self.bump()
    }

    fn on_breakpoint(&self, _location: &Location) -> Result<()> {
        self.bump()
    }

    fn on_exception(&self, _message: &str, _frames: &[StackFrame]) -> Result<()> {
        self.bump()
    }

    fn on_other(&self, _description: &str) -> Result<()> {
        self.bump()
    }
}

/// 起動から終了までの実行時間を測る
#[derive(Debug, Default)]
pub struct TimingListener {
    started: Mutex<Option<Instant>>,
    last_run: Mutex<Option<Duration>>,
}

impl TimingListener {
    pub const NAME: &'static str = "Timing Listener";

    pub fn new() -> Self {
        Self::default()
    }

    /// 直近のセッションの実行時間
    pub fn last_run(&self) -> Option<Duration> {
        *self.last_run.lock()
    }
}

impl DebuggerListener for TimingListener {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_start(&self) -> Result<()> {
        *self.started.lock() = Some(Instant::now());
        Ok(())
    }

    fn on_stop(&self) -> Result<()> {
        if let Some(started) = self.started.lock().take() {
            let elapsed = started.elapsed();
            info!("total running time: {:?}", elapsed);
            *self.last_run.lock() = Some(elapsed);
        }
        Ok(())
    }
}

/// すべてのイベントをログに出す
#[derive(Debug, Default)]
pub struct TracingListener;

impl TracingListener {
    pub const NAME: &'static str = "Tracing Listener";
}

impl DebuggerListener for TracingListener {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_start(&self) -> Result<()> {
        info!("target started");
        Ok(())
    }

    fn on_stop(&self) -> Result<()> {
        info!("target stopped");
        Ok(())
    }

    fn on_step(&self, location: &Location) -> Result<()> {
        info!("step completed at {}", location);
        Ok(())
    }

    fn on_breakpoint(&self, location: &Location) -> Result<()> {
        info!("breakpoint hit at {}", location);
        Ok(())
    }

    fn on_exception(&self, message: &str, frames: &[StackFrame]) -> Result<()> {
        info!("exception: {}", message);
        for frame in frames {
            info!("    at {} ({})", frame.display_name(), frame.unit_path());
        }
        Ok(())
    }

    fn on_other(&self, description: &str) -> Result<()> {
        info!("event: {}", description);
        Ok(())
    }
}
