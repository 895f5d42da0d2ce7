//! 統合テスト用の共通ヘルパー

#![allow(dead_code)]

use kanshi_core::{DebugEvent, Debugger, DebuggerListener, Location, Result, StackFrame};
use kanshi_target::{MockRuntime, RawEvent, ThreadId};
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

pub const MAIN: ThreadId = ThreadId(1);

const TIMEOUT: Duration = Duration::from_secs(5);
const SYNC: &str = "sync";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 受け取ったイベントをチャネルへ流すリスナー
pub struct Recorder {
    name: String,
    tx: Mutex<Sender<DebugEvent>>,
}

impl Recorder {
    pub fn new(name: &str) -> (Arc<Self>, Receiver<DebugEvent>) {
        let (tx, rx) = mpsc::channel();
        let recorder = Arc::new(Self {
            name: name.to_string(),
            tx: Mutex::new(tx),
        });
        (recorder, rx)
    }

    fn send(&self, event: DebugEvent) -> Result<()> {
        // 受信側が先に終わっていても構わない
        let _ = self.tx.lock().send(event);
        Ok(())
    }
}

impl DebuggerListener for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_start(&self) -> Result<()> {
        self.send(DebugEvent::Start)
    }

    fn on_stop(&self) -> Result<()> {
        self.send(DebugEvent::Stop)
    }

    fn on_step(&self, location: &Location) -> Result<()> {
        self.send(DebugEvent::Step(location.clone()))
    }

    fn on_breakpoint(&self, location: &Location) -> Result<()> {
        self.send(DebugEvent::BreakpointHit(location.clone()))
    }

    fn on_exception(&self, message: &str, frames: &[StackFrame]) -> Result<()> {
        self.send(DebugEvent::Exception {
            message: message.to_string(),
            frames: frames.to_vec(),
        })
    }

    fn on_other(&self, description: &str) -> Result<()> {
        self.send(DebugEvent::Other(description.to_string()))
    }
}

/// モックとデバッガを用意し、記録用リスナーを登録する
pub fn session() -> (Arc<MockRuntime>, Debugger, Receiver<DebugEvent>) {
    init_tracing();
    let mock = Arc::new(MockRuntime::new());
    let debugger = Debugger::new(mock.clone());
    let (recorder, rx) = Recorder::new("recorder");
    debugger.add_listener(recorder);
    (mock, debugger, rx)
}

pub fn next_event(rx: &Receiver<DebugEvent>) -> DebugEvent {
    rx.recv_timeout(TIMEOUT).expect("timed out waiting for event")
}

/// それまでに積んだイベントがすべて処理されるまで待ち、途中で届いたイベントを返す
pub fn sync(mock: &MockRuntime, rx: &Receiver<DebugEvent>) -> Vec<DebugEvent> {
    mock.push(RawEvent::Other {
        description: SYNC.to_string(),
    });
    let mut seen = Vec::new();
    loop {
        match next_event(rx) {
            DebugEvent::Other(d) if d == SYNC => return seen,
            event => seen.push(event),
        }
    }
}

/// 起動してメインスレッドの開始イベントまで進める
pub fn start(mock: &MockRuntime, debugger: &Debugger, rx: &Receiver<DebugEvent>) {
    debugger.launch().expect("launch");
    mock.push(RawEvent::VmStart { thread: MAIN });
    assert_eq!(next_event(rx), DebugEvent::Start);
}
