//! イベントの変換と配信
//!
//! 専用スレッドでターゲットのイベントストリームを読み続け、
//! 生イベントを [`DebugEvent`] に変換してリスナーへ配る。
//! 変換はセッションのロックの下で行い、リスナーの呼び出しはロックを外してから行う。

use crate::call_stack;
use crate::debugger::Shared;
use crate::DebugEvent;
use kanshi_target::{ObjectId, RawEvent, TargetError, TargetRuntime, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// イベント処理ループ
///
/// ストリームが終わったら、まだ配信していなければ Stop を1回だけ配信して終了する。
pub(crate) fn run(shared: Arc<Shared>) {
    loop {
        let events = match shared.target.next_events() {
            Ok(events) => events,
            Err(TargetError::Disconnected) => {
                info!("target disconnected");
                break;
            }
            Err(err) => {
                warn!("event stream failed: {}", err);
                break;
            }
        };

        for raw in events {
            debug!("raw event: {}", raw);
            if let Some(event) = translate(&shared, raw) {
                deliver(&shared, &event);
            }
        }
    }

    let emit_stop = {
        let mut state = shared.state.lock();
        state.connected = false;
        !std::mem::replace(&mut state.stop_emitted, true)
    };
    if emit_stop {
        deliver(&shared, &DebugEvent::Stop);
    }
}

/// 生イベントを変換する。リスナーに見せないものは `None`
///
/// 現在のスレッドの更新はここで済ませ、リスナーが呼ばれる前に反映させる。
fn translate(shared: &Shared, raw: RawEvent) -> Option<DebugEvent> {
    let target = shared.target.as_ref();
    let mut state = shared.state.lock();

    match raw {
        RawEvent::VmStart { thread } => {
            state.current_thread = Some(thread);
            Some(DebugEvent::Start)
        }
        RawEvent::VmDeath => {
            if std::mem::replace(&mut state.stop_emitted, true) {
                None
            } else {
                Some(DebugEvent::Stop)
            }
        }
        RawEvent::UnitPrepared { unit } => {
            state.resolver.on_unit_load(unit, target);
            None
        }
        RawEvent::FieldModified { field, .. } => {
            debug!("field {} modified, resuming", field);
            resume(target);
            None
        }
        RawEvent::Step {
            thread,
            request,
            location,
        } => {
            state.current_thread = Some(thread);
            state.stepping.complete(thread, request, target);
            Some(DebugEvent::Step(location))
        }
        RawEvent::Breakpoint {
            thread, location, ..
        } => {
            state.current_thread = Some(thread);
            Some(DebugEvent::BreakpointHit(location))
        }
        RawEvent::Exception { thread: None, type_name, .. } => {
            debug!("exception {} has no owning thread, resuming", type_name);
            resume(target);
            None
        }
        RawEvent::Exception {
            thread: Some(thread),
            exception,
            type_name,
            ..
        } => {
            state.current_thread = Some(thread);
            let message = exception_message(shared, exception, &type_name);
            let frames = call_stack::snapshot(target, &shared.presenter, thread);
            Some(DebugEvent::Exception { message, frames })
        }
        RawEvent::Other { description } => Some(DebugEvent::Other(description)),
    }
}

fn resume(target: &dyn TargetRuntime) {
    if let Err(err) = target.resume() {
        warn!("failed to resume target: {}", err);
    }
}

/// 例外オブジェクトのメッセージ（読めなければ型名）
fn exception_message(shared: &Shared, exception: ObjectId, type_name: &str) -> String {
    let field = &shared.config.exception_message_field;
    match shared.target.field_value(exception, field) {
        Ok(Value::Text(message)) => message,
        Ok(Value::Null) | Err(_) => type_name.to_string(),
        Ok(other) => other.to_string(),
    }
}

/// 登録順にリスナーへ配信する
///
/// 1つのリスナーの失敗（エラーやパニック）は記録して読み飛ばし、残りへの配信を続ける。
fn deliver(shared: &Shared, event: &DebugEvent) {
    let listeners = shared.state.lock().listeners.snapshot();
    for listener in listeners {
        let result = panic::catch_unwind(AssertUnwindSafe(|| event.notify(listener.as_ref())));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(
                "listener '{}' failed on {}: {:#}",
                listener.name(),
                event,
                err
            ),
            Err(_) => warn!("listener '{}' panicked on {}", listener.name(), event),
        }
    }
}
