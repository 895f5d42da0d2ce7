//! ターゲット操作のエラー

use crate::{ObjectId, RequestId, ThreadId};
use thiserror::Error;

/// ターゲットランタイムに対する操作で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// ターゲットとの接続が切れた（イベントストリームの終端を含む）
    #[error("target runtime is disconnected")]
    Disconnected,
    /// 行番号などのデバッグ情報が存在しない
    #[error("no line information for {0}")]
    AbsentInformation(String),
    /// スレッドが要求された状態にない（実行中・終了済みなど）
    #[error("thread {0} is not in a compatible state")]
    IncompatibleThreadState(ThreadId),
    /// 既に回収されたか存在しないオブジェクト
    #[error("invalid object {0}")]
    InvalidObject(ObjectId),
    /// 削除済みまたは未知のイベントリクエスト
    #[error("invalid request {0}")]
    InvalidRequest(RequestId),
    /// ロードされていないコード単位
    #[error("unknown code unit '{0}'")]
    UnknownUnit(String),
    #[error("no such field '{0}'")]
    NoSuchField(String),
    #[error("no such method '{0}'")]
    NoSuchMethod(String),
    /// リモート呼び出しがターゲット側で例外を投げた
    #[error("invocation of '{method}' failed: {reason}")]
    Invocation { method: String, reason: String },
    #[error("{0}")]
    Other(String),
}

impl TargetError {
    /// 接続断を表すエラーか判定する
    pub fn is_disconnected(&self) -> bool {
        matches!(self, TargetError::Disconnected)
    }
}
