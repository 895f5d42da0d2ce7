//! ステップ実行の制御

use crate::Result;
use kanshi_target::{
    RequestId, StepDirection, StepRequest, SuspendPolicy, TargetRuntime, ThreadId,
};
use std::collections::HashMap;
use tracing::debug;

/// スレッドごとのステップ状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Idle,
    Pending(StepDirection),
}

#[derive(Debug, Clone, Copy)]
struct PendingStep {
    direction: StepDirection,
    request: RequestId,
}

/// ステップ実行の制御器
///
/// 1スレッドにつき有効なステップリクエストは高々1つ。
pub struct SteppingController {
    pending: HashMap<ThreadId, PendingStep>,
    /// ステップで入り込まないコード単位のパターン
    exclusions: Vec<String>,
}

impl SteppingController {
    /// 新しい制御器を作成する
    pub fn new(exclusions: Vec<String>) -> Self {
        Self {
            pending: HashMap::new(),
            exclusions,
        }
    }

    /// ステップを要求し、ターゲットを再開する
    ///
    /// 同じスレッドの保留中のリクエストは先に取り消す。
    pub fn step(
        &mut self,
        thread: ThreadId,
        direction: StepDirection,
        target: &dyn TargetRuntime,
    ) -> Result<RequestId> {
        self.cancel(thread, target);

        let request = target.create_step_request(StepRequest {
            thread,
            direction,
            exclusions: self.exclusions.clone(),
            suspend: SuspendPolicy::EventThread,
            hit_count: Some(1),
        })?;
        self.pending.insert(thread, PendingStep { direction, request });
        debug!("step {} requested for thread {} as {}", direction, thread, request);

        target.resume()?;
        Ok(request)
    }

    /// 保留中のステップを取り消す
    pub fn cancel(&mut self, thread: ThreadId, target: &dyn TargetRuntime) -> bool {
        let Some(pending) = self.pending.remove(&thread) else {
            return false;
        };
        if let Err(err) = target.delete_request(pending.request) {
            debug!("failed to delete step request {}: {}", pending.request, err);
        }
        true
    }

    /// ステップ完了を処理し、スレッドを待機状態に戻す
    ///
    /// 完了したのが保留中のリクエストならその方向を返す。
    pub fn complete(
        &mut self,
        thread: ThreadId,
        request: RequestId,
        target: &dyn TargetRuntime,
    ) -> Option<StepDirection> {
        match self.pending.get(&thread) {
            Some(pending) if pending.request == request => {
                let direction = pending.direction;
                self.cancel(thread, target);
                Some(direction)
            }
            _ => None,
        }
    }

    pub fn state(&self, thread: ThreadId) -> StepState {
        self.pending
            .get(&thread)
            .map_or(StepState::Idle, |p| StepState::Pending(p.direction))
    }

    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    /// セッション終了時に保留中の状態を破棄する
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}
