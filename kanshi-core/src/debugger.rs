//! デバッガセッション
//!
//! ブレークポイントの解決状態、ステップ状態、リスナー、現在のスレッドは
//! すべて1つのセッションが所有し、1つのロックで守る。
//! 外部からの操作（停止・再開・ステップ・ブレークポイント操作）と
//! イベント処理スレッドは同じロックを取ってからターゲットの状態に触れる。

use crate::call_stack::CallStackModel;
use crate::dispatch;
use crate::stepping::{StepState, SteppingController};
use crate::variables::VariablesModel;
use crate::{
    Breakpoint, BreakpointResolver, DebuggerError, DebuggerListener, ListenerRegistry, Result,
    SessionConfig,
};
use kanshi_target::{StepDirection, SuspendPolicy, TargetRuntime, ThreadId, ThreadStatus};
use kanshi_view::Presenter;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// ロックで守られるセッションの可変状態
pub(crate) struct SessionState {
    pub(crate) launched: bool,
    /// イベントストリームが生きているか
    pub(crate) connected: bool,
    /// このセッションで Stop を配信済みか
    pub(crate) stop_emitted: bool,
    pub(crate) current_thread: Option<ThreadId>,
    pub(crate) resolver: BreakpointResolver,
    pub(crate) stepping: SteppingController,
    pub(crate) listeners: ListenerRegistry,
}

/// セッションとイベント処理スレッドが共有する部分
pub(crate) struct Shared {
    pub(crate) target: Arc<dyn TargetRuntime>,
    pub(crate) config: SessionConfig,
    pub(crate) presenter: Presenter,
    pub(crate) state: Mutex<SessionState>,
    event_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    /// 問い合わせ可能なスレッド（停止中で終了していない現在のスレッド）
    pub(crate) fn inspectable_thread(&self, state: &SessionState) -> Option<ThreadId> {
        if !state.connected {
            return None;
        }
        let thread = state.current_thread?;
        match self.target.thread_status(thread) {
            Ok(ThreadStatus::Suspended) => Some(thread),
            Ok(_) => None,
            Err(err) => {
                debug!("failed to read status of thread {}: {}", thread, err);
                None
            }
        }
    }
}

/// デバッガ
///
/// 複製しても同じセッションを指す。
#[derive(Clone)]
pub struct Debugger {
    shared: Arc<Shared>,
}

/// リスナーなどから循環参照を作らずにセッションを参照するためのハンドル
#[derive(Clone)]
pub struct WeakDebugger {
    shared: Weak<Shared>,
}

impl WeakDebugger {
    pub fn upgrade(&self) -> Option<Debugger> {
        self.shared.upgrade().map(|shared| Debugger { shared })
    }
}

impl Debugger {
    /// 既定の設定で新しいデバッガを作成する
    pub fn new(target: Arc<dyn TargetRuntime>) -> Self {
        Self::with_config(target, SessionConfig::default())
    }

    pub fn with_config(target: Arc<dyn TargetRuntime>, config: SessionConfig) -> Self {
        let presenter = config.presenter();
        Self::with_presenter(target, config, presenter)
    }

    /// 独自のフォーマッタや命名規則を使うデバッガを作成する
    pub fn with_presenter(
        target: Arc<dyn TargetRuntime>,
        config: SessionConfig,
        presenter: Presenter,
    ) -> Self {
        let state = SessionState {
            launched: false,
            connected: false,
            stop_emitted: false,
            current_thread: None,
            resolver: BreakpointResolver::new(),
            stepping: SteppingController::new(config.step_exclusions.clone()),
            listeners: ListenerRegistry::new(),
        };
        Self {
            shared: Arc::new(Shared {
                target,
                config,
                presenter,
                state: Mutex::new(state),
                event_thread: Mutex::new(None),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakDebugger {
        WeakDebugger {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// セッションを開始する
    ///
    /// ロード通知と例外通知を購読してから、イベント処理スレッドを起動する。
    pub fn launch(&self) -> Result<()> {
        let target = self.shared.target.as_ref();
        {
            let mut state = self.shared.state.lock();
            if state.launched {
                return Err(DebuggerError::AlreadyLaunched.into());
            }
            let exclusions = &self.shared.config.step_exclusions;
            target.create_unit_load_request(exclusions, SuspendPolicy::All)?;
            target.create_exception_request(exclusions, SuspendPolicy::EventThread)?;
            state.launched = true;
            state.connected = true;
            state.stop_emitted = false;
        }

        let shared = self.shared.clone();
        let handle = std::thread::Builder::new()
            .name(self.shared.config.event_thread_name.clone())
            .spawn(move || dispatch::run(shared))?;
        *self.shared.event_thread.lock() = Some(handle);
        info!("debugger session launched");
        Ok(())
    }

    /// イベント処理スレッドの終了を待つ
    pub fn join(&self) {
        let handle = self.shared.event_thread.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("event thread panicked");
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.state.lock().connected
    }

    pub fn current_thread(&self) -> Option<ThreadId> {
        self.shared.state.lock().current_thread
    }

    /// ブレークポイントを追加する（同じ位置のものは置き換える）
    pub fn add_breakpoint(&self, breakpoint: Breakpoint) {
        let mut state = self.shared.state.lock();
        state.resolver.add(breakpoint, self.shared.target.as_ref());
    }

    /// ブレークポイントを削除する。存在しなければ `None`
    pub fn remove_breakpoint(&self, breakpoint: &Breakpoint) -> Option<Breakpoint> {
        let mut state = self.shared.state.lock();
        state.resolver.remove(breakpoint, self.shared.target.as_ref())
    }

    pub fn breakpoints(&self) -> Vec<Breakpoint> {
        self.shared.state.lock().resolver.list()
    }

    pub fn clear_breakpoints(&self) {
        let mut state = self.shared.state.lock();
        state.resolver.clear(self.shared.target.as_ref());
    }

    /// ブレークポイントの解決状態を参照する
    pub fn with_resolver<R>(&self, f: impl FnOnce(&BreakpointResolver) -> R) -> R {
        f(&self.shared.state.lock().resolver)
    }

    /// ステップイン。ステップできない状態なら `false`
    pub fn step_into(&self) -> Result<bool> {
        self.step(StepDirection::Into)
    }

    pub fn step_over(&self) -> Result<bool> {
        self.step(StepDirection::Over)
    }

    pub fn step_out(&self) -> Result<bool> {
        self.step(StepDirection::Out)
    }

    fn step(&self, direction: StepDirection) -> Result<bool> {
        let mut state = self.shared.state.lock();
        let Some(thread) = self.shared.inspectable_thread(&state) else {
            debug!("step {} ignored, no suspended thread", direction);
            return Ok(false);
        };
        state
            .stepping
            .step(thread, direction, self.shared.target.as_ref())?;
        Ok(true)
    }

    pub fn step_state(&self, thread: ThreadId) -> StepState {
        self.shared.state.lock().stepping.state(thread)
    }

    /// 逆実行に対応しているか（常に `false`）
    pub fn supports_replay(&self) -> bool {
        false
    }

    /// 逆方向のステップイン（何もしない）
    pub fn step_back_into(&self) {
        debug!("step back into is not supported");
    }

    /// 逆方向のステップオーバー（何もしない）
    pub fn step_back_over(&self) {
        debug!("step back over is not supported");
    }

    /// 指定行まで逆実行（何もしない）
    pub fn run_back_to_line(&self, unit: &str, line: u32) {
        debug!("run back to {}:{} is not supported", unit, line);
    }

    /// 逆方向への再生（何もしない）
    pub fn backward(&self) {
        debug!("backward replay is not supported");
    }

    /// 順方向への再生（再開と同じ）
    pub fn forward(&self) -> Result<()> {
        self.resume()
    }

    /// 指定行まで実行する
    ///
    /// 1回だけ発火するブレークポイントを設置して再開する。
    /// その行にすでにブレークポイントがあればそれをそのまま使う。
    /// その行に到達する前に終了したり別のブレークポイントで止まることもある。
    pub fn run_forward_to_line(&self, unit: &str, line: u32) -> Result<()> {
        let mut state = self.shared.state.lock();
        let target = self.shared.target.as_ref();
        let breakpoint = Breakpoint::new(unit, line).with_hit_count(1);
        if state.resolver.state_of(&breakpoint).is_some() {
            debug!("breakpoint already set at {}, resuming", breakpoint);
        } else {
            state.resolver.add(breakpoint, target);
        }
        target.resume()?;
        Ok(())
    }

    /// ターゲットを停止する
    pub fn pause(&self) -> Result<()> {
        let _state = self.shared.state.lock();
        self.shared.target.suspend()?;
        Ok(())
    }

    /// ターゲットを再開する
    pub fn resume(&self) -> Result<()> {
        let _state = self.shared.state.lock();
        self.shared.target.resume()?;
        Ok(())
    }

    /// セッションを終了する
    ///
    /// ブレークポイントとステップの状態を破棄し、ターゲットを停止してから終了させる。
    /// イベント処理スレッドはストリームの終端を受けて自然に終わる。
    pub fn stop(&self) {
        let mut state = self.shared.state.lock();
        state.resolver.reset();
        state.stepping.reset();
        state.current_thread = None;

        let target = self.shared.target.as_ref();
        if let Err(err) = target.suspend() {
            debug!("failed to suspend target before exit: {}", err);
        }
        if let Err(err) = target.exit(0) {
            warn!("failed to terminate target: {}", err);
        }
        info!("debugger session stopped");
    }

    /// リスナーを登録する（同じ名前のものは置き換えて返す）
    pub fn add_listener(
        &self,
        listener: Arc<dyn DebuggerListener>,
    ) -> Option<Arc<dyn DebuggerListener>> {
        self.shared.state.lock().listeners.add(listener)
    }

    pub fn remove_listener(&self, name: &str) -> Option<Arc<dyn DebuggerListener>> {
        self.shared.state.lock().listeners.remove(name)
    }

    pub fn clear_listeners(&self) {
        self.shared.state.lock().listeners.clear();
    }

    /// 登録されているリスナー（登録順）
    pub fn listeners(&self) -> Vec<Arc<dyn DebuggerListener>> {
        self.shared.state.lock().listeners.snapshot()
    }

    pub fn variables(&self) -> VariablesModel {
        VariablesModel::new(self.shared.clone())
    }

    pub fn call_stack(&self) -> CallStackModel {
        CallStackModel::new(self.shared.clone())
    }
}
