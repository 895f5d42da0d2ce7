//! ターゲットランタイムへのゲートウェイ

use crate::{
    EventSet, FieldInfo, FrameInfo, LineRequest, LocalVariableInfo, Location, ObjectId,
    RequestId, Result, StepRequest, SuspendPolicy, ThreadId, ThreadStatus, UnitHandle, Value,
};

/// デバッグ対象ランタイムの操作インターフェース
///
/// 停止・再開、イベントストリーム、リクエストの設置と削除、
/// 生きている値への反射的アクセスを提供する。
/// 呼び出しにタイムアウトはなく、ターゲットが応答しなければ呼び出し側もブロックする。
pub trait TargetRuntime: Send + Sync {
    /// ターゲット全体を停止する
    ///
    /// 冪等だが参照カウントはしない。停止ごとに対応する再開が必要。
    fn suspend(&self) -> Result<()>;

    /// ターゲット全体を再開する
    fn resume(&self) -> Result<()>;

    /// ターゲットを終了させる
    fn exit(&self, code: i32) -> Result<()>;

    /// 次のイベントのまとまりが届くまでブロックする
    ///
    /// ストリームが終わると `TargetError::Disconnected` を返す。
    fn next_events(&self) -> Result<EventSet>;

    /// 指定行の実行可能位置（先頭が最も適切な位置）
    fn locations_of_line(&self, unit: &UnitHandle, line: u32) -> Result<Vec<Location>>;

    fn create_line_request(&self, request: LineRequest) -> Result<RequestId>;

    fn create_step_request(&self, request: StepRequest) -> Result<RequestId>;

    /// コード単位のロード通知を購読する（除外パターン付き）
    fn create_unit_load_request(
        &self,
        exclusions: &[String],
        suspend: SuspendPolicy,
    ) -> Result<RequestId>;

    /// 例外通知を購読する（除外パターン付き）
    fn create_exception_request(
        &self,
        exclusions: &[String],
        suspend: SuspendPolicy,
    ) -> Result<RequestId>;

    fn delete_request(&self, request: RequestId) -> Result<()>;

    fn thread_status(&self, thread: ThreadId) -> Result<ThreadStatus>;

    /// スレッドのフレーム一覧（0が最も内側）
    fn frames(&self, thread: ThreadId) -> Result<Vec<FrameInfo>>;

    /// フレームのレシーバ（静的メソッドなら `None`）
    fn this_object(&self, thread: ThreadId, frame: usize) -> Result<Option<ObjectId>>;

    /// フレーム内で見えるローカル変数（宣言順）
    fn visible_variables(&self, thread: ThreadId, frame: usize) -> Result<Vec<LocalVariableInfo>>;

    fn local_value(&self, thread: ThreadId, frame: usize, name: &str) -> Result<Value>;

    /// オブジェクトのランタイム型名
    fn type_name(&self, object: ObjectId) -> Result<String>;

    fn fields(&self, object: ObjectId) -> Result<Vec<FieldInfo>>;

    fn field_value(&self, object: ObjectId, field: &str) -> Result<Value>;

    /// 停止中のスレッド上でメソッドをリモート呼び出しする
    fn invoke(
        &self,
        object: ObjectId,
        thread: ThreadId,
        method: &str,
        args: &[Value],
    ) -> Result<Value>;
}
