//! 決定的なインメモリのテスト用ランタイム
//!
//! 実際のVMを使わずにコアのロジックを検証するための実装。
//! コード単位・スレッド・オブジェクトを定義し、イベントをキューに積んで
//! ディスパッチャへ届ける。設置されたリクエストは記録され、
//! ヒットカウントによる失効もシミュレートする。

use crate::{
    EventSet, FieldInfo, FrameInfo, LineRequest, LocalVariableInfo, Location, ObjectId,
    RawEvent, RequestId, Result, StepRequest, SuspendPolicy, TargetError, TargetRuntime, ThreadId,
    ThreadStatus, UnitHandle, UnitName, Value,
};
use parking_lot::{Condvar, Mutex};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

/// モックオブジェクトのメソッド実装
pub type MockMethod = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// モックのスタックフレーム
#[derive(Debug, Clone)]
pub struct MockFrame {
    info: FrameInfo,
    this: Option<ObjectId>,
    locals: Vec<(LocalVariableInfo, Result<Value>)>,
}

impl MockFrame {
    pub fn new(method: &str, unit: &str, line: u32) -> Self {
        Self {
            info: FrameInfo::new(method, unit, line),
            this: None,
            locals: Vec::new(),
        }
    }

    pub fn with_this(mut self, object: ObjectId) -> Self {
        self.this = Some(object);
        self
    }

    pub fn with_local(mut self, name: &str, type_name: &str, value: Value) -> Self {
        self.locals
            .push((LocalVariableInfo::new(name, type_name), Ok(value)));
        self
    }

    /// 読み出しに失敗するローカル変数を追加する
    pub fn with_unreadable_local(mut self, name: &str, type_name: &str, error: TargetError) -> Self {
        self.locals
            .push((LocalVariableInfo::new(name, type_name), Err(error)));
        self
    }
}

/// モックのオブジェクト
#[derive(Clone)]
pub struct MockObject {
    type_name: String,
    fields: Vec<(FieldInfo, Value)>,
    methods: HashMap<String, MockMethod>,
}

impl MockObject {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            fields: Vec::new(),
            methods: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, type_name: &str, value: Value) -> Self {
        self.fields.push((FieldInfo::new(name, type_name), value));
        self
    }

    pub fn with_method<F>(mut self, name: &str, method: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.to_string(), Arc::new(method));
        self
    }
}

#[derive(Debug, Clone)]
struct MockUnit {
    handle: UnitHandle,
    /// 行番号 → メソッド名
    lines: BTreeMap<u32, String>,
    stripped: bool,
}

#[derive(Debug, Clone)]
struct MockThread {
    status: ThreadStatus,
    frames: Vec<MockFrame>,
}

#[derive(Debug, Clone)]
enum RequestKind {
    Line(LineRequest),
    Step(StepRequest),
    UnitLoad(Vec<String>),
    Exception(Vec<String>),
}

#[derive(Debug, Clone)]
struct MockRequest {
    kind: RequestKind,
    hits: u32,
    expired: bool,
}

impl MockRequest {
    /// 到達を1回数え、発火するかどうかを返す
    fn hit(&mut self, hit_count: Option<u32>) -> bool {
        if self.expired {
            return false;
        }
        self.hits += 1;
        match hit_count {
            None => true,
            Some(n) if self.hits == n => {
                self.expired = true;
                true
            }
            Some(_) => false,
        }
    }
}

#[derive(Default)]
struct MockState {
    units: HashMap<UnitName, MockUnit>,
    threads: BTreeMap<ThreadId, MockThread>,
    objects: HashMap<ObjectId, MockObject>,
    requests: BTreeMap<RequestId, MockRequest>,
    next_request: u64,
    next_unit: u64,
    queue: VecDeque<EventSet>,
    closed: bool,
    suspend_calls: usize,
    resume_calls: usize,
    exit_code: Option<i32>,
}

impl MockState {
    fn set_all(&mut self, status: ThreadStatus) {
        for thread in self.threads.values_mut() {
            if thread.status != ThreadStatus::Zombie {
                thread.status = status;
            }
        }
    }

    fn add_request(&mut self, kind: RequestKind) -> RequestId {
        self.next_request += 1;
        let id = RequestId(self.next_request);
        self.requests.insert(
            id,
            MockRequest {
                kind,
                hits: 0,
                expired: false,
            },
        );
        id
    }

    fn suspended_thread(&self, thread: ThreadId) -> Result<&MockThread> {
        let t = self
            .threads
            .get(&thread)
            .ok_or(TargetError::IncompatibleThreadState(thread))?;
        if t.status != ThreadStatus::Suspended {
            return Err(TargetError::IncompatibleThreadState(thread));
        }
        Ok(t)
    }

    fn frame(&self, thread: ThreadId, frame: usize) -> Result<&MockFrame> {
        self.suspended_thread(thread)?
            .frames
            .get(frame)
            .ok_or_else(|| TargetError::Other(format!("thread {} has no frame {}", thread, frame)))
    }

    fn object(&self, object: ObjectId) -> Result<&MockObject> {
        self.objects
            .get(&object)
            .ok_or(TargetError::InvalidObject(object))
    }

    fn watches(&self, filter: impl Fn(&RequestKind) -> Option<&Vec<String>>, name: &str) -> bool {
        self.requests.values().any(|req| match filter(&req.kind) {
            Some(exclusions) => !exclusions
                .iter()
                .any(|p| crate::matches_class_filter(p, name)),
            None => false,
        })
    }
}

/// 決定的なインメモリのターゲットランタイム
pub struct MockRuntime {
    state: Mutex<MockState>,
    ready: Condvar,
}

impl MockRuntime {
    /// 空のランタイムを作成する
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            ready: Condvar::new(),
        }
    }

    /// 行テーブル付きのコード単位を定義する（`(行, メソッド名)` の組）
    pub fn define_unit(&self, name: &str, lines: &[(u32, &str)]) -> UnitHandle {
        self.insert_unit(name, lines, false)
    }

    /// 行情報を持たないコード単位を定義する
    pub fn define_stripped_unit(&self, name: &str) -> UnitHandle {
        self.insert_unit(name, &[], true)
    }

    fn insert_unit(&self, name: &str, lines: &[(u32, &str)], stripped: bool) -> UnitHandle {
        let mut state = self.state.lock();
        state.next_unit += 1;
        let handle = UnitHandle::new(state.next_unit, name);
        let unit = MockUnit {
            handle: handle.clone(),
            lines: lines
                .iter()
                .map(|(line, method)| (*line, method.to_string()))
                .collect(),
            stripped,
        };
        state.units.insert(handle.name.clone(), unit);
        handle
    }

    /// コード単位のロードを通知する
    ///
    /// ロード通知の購読があり、除外パターンに一致しない場合だけイベントを積む。
    pub fn load_unit(&self, handle: &UnitHandle) -> bool {
        let watched = {
            let state = self.state.lock();
            state.watches(
                |kind| match kind {
                    RequestKind::UnitLoad(exclusions) => Some(exclusions),
                    _ => None,
                },
                handle.name.dot_name(),
            )
        };
        if watched {
            self.push(RawEvent::UnitPrepared {
                unit: handle.clone(),
            });
        }
        watched
    }

    pub fn add_thread(&self, thread: ThreadId, frames: Vec<MockFrame>) {
        self.state.lock().threads.insert(
            thread,
            MockThread {
                status: ThreadStatus::Running,
                frames,
            },
        );
    }

    pub fn set_frames(&self, thread: ThreadId, frames: Vec<MockFrame>) {
        if let Some(t) = self.state.lock().threads.get_mut(&thread) {
            t.frames = frames;
        }
    }

    pub fn set_thread_status(&self, thread: ThreadId, status: ThreadStatus) {
        if let Some(t) = self.state.lock().threads.get_mut(&thread) {
            t.status = status;
        }
    }

    pub fn insert_object(&self, id: ObjectId, object: MockObject) {
        self.state.lock().objects.insert(id, object);
    }

    /// イベントを1つだけ含むまとまりを積む
    pub fn push(&self, event: RawEvent) {
        self.push_events(vec![event]);
    }

    pub fn push_events(&self, events: EventSet) {
        let mut state = self.state.lock();
        if state.closed {
            tracing::debug!("mock runtime is closed, dropping {} events", events.len());
            return;
        }
        state.queue.push_back(events);
        self.ready.notify_all();
    }

    /// イベントストリームを閉じる（以降 `next_events` は切断を返す）
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.ready.notify_all();
    }

    /// スレッドが指定行に到達したことをシミュレートする
    ///
    /// 一致する行リクエストのヒットカウントを評価し、発火したものについて
    /// ブレークポイントイベントを積む。
    pub fn hit_line(&self, unit: &str, line: u32, thread: ThreadId) -> bool {
        let unit = UnitName::new(unit);
        let events: EventSet = {
            let mut state = self.state.lock();
            state
                .requests
                .iter_mut()
                .filter_map(|(id, req)| {
                    let location = match &req.kind {
                        RequestKind::Line(r) if r.location.unit == unit && r.location.line == line => {
                            r.location.clone()
                        }
                        _ => return None,
                    };
                    let hit_count = match &req.kind {
                        RequestKind::Line(r) => r.hit_count,
                        _ => None,
                    };
                    req.hit(hit_count).then(|| RawEvent::Breakpoint {
                        thread,
                        request: *id,
                        location,
                    })
                })
                .collect()
        };
        if events.is_empty() {
            return false;
        }
        self.push_events(events);
        true
    }

    /// スレッドのステップが完了したことをシミュレートする
    pub fn complete_step(&self, thread: ThreadId, location: Location) -> bool {
        let event = {
            let mut state = self.state.lock();
            state.requests.iter_mut().find_map(|(id, req)| {
                let hit_count = match &req.kind {
                    RequestKind::Step(r) if r.thread == thread => r.hit_count,
                    _ => return None,
                };
                req.hit(hit_count).then(|| RawEvent::Step {
                    thread,
                    request: *id,
                    location: location.clone(),
                })
            })
        };
        match event {
            Some(event) => {
                self.push(event);
                true
            }
            None => false,
        }
    }

    /// 例外の送出をシミュレートする（例外の購読がある場合だけ積む）
    pub fn throw(&self, thread: Option<ThreadId>, exception: ObjectId, type_name: &str) -> bool {
        let watched = self.state.lock().watches(
            |kind| match kind {
                RequestKind::Exception(exclusions) => Some(exclusions),
                _ => None,
            },
            type_name,
        );
        if watched {
            self.push(RawEvent::Exception {
                thread,
                exception,
                type_name: type_name.to_string(),
                location: None,
            });
        }
        watched
    }

    pub fn suspend_count(&self) -> usize {
        self.state.lock().suspend_calls
    }

    pub fn resume_count(&self) -> usize {
        self.state.lock().resume_calls
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.state.lock().exit_code
    }

    /// 有効な（削除も失効もしていない）行リクエスト
    pub fn live_line_requests(&self) -> Vec<LineRequest> {
        self.state
            .lock()
            .requests
            .values()
            .filter(|req| !req.expired)
            .filter_map(|req| match &req.kind {
                RequestKind::Line(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// 有効なステップリクエスト
    pub fn live_step_requests(&self, thread: ThreadId) -> Vec<StepRequest> {
        self.state
            .lock()
            .requests
            .values()
            .filter(|req| !req.expired)
            .filter_map(|req| match &req.kind {
                RequestKind::Step(r) if r.thread == thread => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// 設置されているリクエストの総数（失効したものを含む）
    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetRuntime for MockRuntime {
    fn suspend(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.exit_code.is_some() {
            return Err(TargetError::Disconnected);
        }
        state.suspend_calls += 1;
        state.set_all(ThreadStatus::Suspended);
        Ok(())
    }

    fn resume(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.exit_code.is_some() {
            return Err(TargetError::Disconnected);
        }
        state.resume_calls += 1;
        state.set_all(ThreadStatus::Running);
        Ok(())
    }

    fn exit(&self, code: i32) -> Result<()> {
        let mut state = self.state.lock();
        if state.exit_code.is_some() {
            return Err(TargetError::Disconnected);
        }
        state.exit_code = Some(code);
        state.set_all(ThreadStatus::Zombie);
        state.queue.push_back(vec![RawEvent::VmDeath]);
        state.closed = true;
        self.ready.notify_all();
        Ok(())
    }

    fn next_events(&self) -> Result<EventSet> {
        let mut state = self.state.lock();
        loop {
            if let Some(events) = state.queue.pop_front() {
                let stops = events
                    .iter()
                    .any(|e| !matches!(e, RawEvent::VmDeath | RawEvent::Other { .. }));
                if stops {
                    state.set_all(ThreadStatus::Suspended);
                }
                return Ok(events);
            }
            if state.closed {
                return Err(TargetError::Disconnected);
            }
            self.ready.wait(&mut state);
        }
    }

    fn locations_of_line(&self, unit: &UnitHandle, line: u32) -> Result<Vec<Location>> {
        let state = self.state.lock();
        let mock = state
            .units
            .get(&unit.name)
            .ok_or_else(|| TargetError::UnknownUnit(unit.name.to_string()))?;
        if mock.stripped {
            return Err(TargetError::AbsentInformation(mock.handle.name.to_string()));
        }
        Ok(mock
            .lines
            .get(&line)
            .map(|method| vec![Location::new(mock.handle.name.clone(), method.clone(), line)])
            .unwrap_or_default())
    }

    fn create_line_request(&self, request: LineRequest) -> Result<RequestId> {
        Ok(self.state.lock().add_request(RequestKind::Line(request)))
    }

    fn create_step_request(&self, request: StepRequest) -> Result<RequestId> {
        let mut state = self.state.lock();
        // 同じスレッドに有効なステップリクエストは1つまで
        let duplicate = state.requests.values().any(|req| {
            !req.expired && matches!(&req.kind, RequestKind::Step(r) if r.thread == request.thread)
        });
        if duplicate {
            return Err(TargetError::Other(format!(
                "thread {} already has a pending step request",
                request.thread
            )));
        }
        Ok(state.add_request(RequestKind::Step(request)))
    }

    fn create_unit_load_request(
        &self,
        exclusions: &[String],
        _suspend: SuspendPolicy,
    ) -> Result<RequestId> {
        Ok(self
            .state
            .lock()
            .add_request(RequestKind::UnitLoad(exclusions.to_vec())))
    }

    fn create_exception_request(
        &self,
        exclusions: &[String],
        _suspend: SuspendPolicy,
    ) -> Result<RequestId> {
        Ok(self
            .state
            .lock()
            .add_request(RequestKind::Exception(exclusions.to_vec())))
    }

    fn delete_request(&self, request: RequestId) -> Result<()> {
        self.state
            .lock()
            .requests
            .remove(&request)
            .map(|_| ())
            .ok_or(TargetError::InvalidRequest(request))
    }

    fn thread_status(&self, thread: ThreadId) -> Result<ThreadStatus> {
        self.state
            .lock()
            .threads
            .get(&thread)
            .map(|t| t.status)
            .ok_or(TargetError::IncompatibleThreadState(thread))
    }

    fn frames(&self, thread: ThreadId) -> Result<Vec<FrameInfo>> {
        let state = self.state.lock();
        Ok(state
            .suspended_thread(thread)?
            .frames
            .iter()
            .map(|f| f.info.clone())
            .collect())
    }

    fn this_object(&self, thread: ThreadId, frame: usize) -> Result<Option<ObjectId>> {
        Ok(self.state.lock().frame(thread, frame)?.this)
    }

    fn visible_variables(&self, thread: ThreadId, frame: usize) -> Result<Vec<LocalVariableInfo>> {
        let state = self.state.lock();
        Ok(state
            .frame(thread, frame)?
            .locals
            .iter()
            .map(|(info, _)| info.clone())
            .collect())
    }

    fn local_value(&self, thread: ThreadId, frame: usize, name: &str) -> Result<Value> {
        let state = self.state.lock();
        state
            .frame(thread, frame)?
            .locals
            .iter()
            .find(|(info, _)| info.name == name)
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| Err(TargetError::Other(format!("no local '{}'", name))))
    }

    fn type_name(&self, object: ObjectId) -> Result<String> {
        Ok(self.state.lock().object(object)?.type_name.clone())
    }

    fn fields(&self, object: ObjectId) -> Result<Vec<FieldInfo>> {
        let state = self.state.lock();
        Ok(state
            .object(object)?
            .fields
            .iter()
            .map(|(info, _)| info.clone())
            .collect())
    }

    fn field_value(&self, object: ObjectId, field: &str) -> Result<Value> {
        let state = self.state.lock();
        state
            .object(object)?
            .fields
            .iter()
            .find(|(info, _)| info.name == field)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| TargetError::NoSuchField(field.to_string()))
    }

    fn invoke(
        &self,
        object: ObjectId,
        thread: ThreadId,
        method: &str,
        args: &[Value],
    ) -> Result<Value> {
        let method_fn = {
            let state = self.state.lock();
            state.suspended_thread(thread)?;
            state
                .object(object)?
                .methods
                .get(method)
                .cloned()
                .ok_or_else(|| TargetError::NoSuchMethod(method.to_string()))?
        };
        // メソッド本体がモックを再度参照できるようにロックの外で呼ぶ
        method_fn(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_thread() -> ThreadId {
        ThreadId(1)
    }

    #[test]
    fn test_count_filtered_request_fires_once() {
        let mock = MockRuntime::new();
        let unit = mock.define_unit("quorum.Main", &[(5, "Main")]);
        let location = mock.locations_of_line(&unit, 5).unwrap().remove(0);
        mock.create_line_request(LineRequest {
            location,
            hit_count: Some(1),
            suspend: SuspendPolicy::EventThread,
        })
        .unwrap();

        assert!(mock.hit_line("quorum.Main", 5, main_thread()));
        assert!(!mock.hit_line("quorum.Main", 5, main_thread()));
        assert!(mock.live_line_requests().is_empty());
    }

    #[test]
    fn test_stripped_unit_has_no_line_information() {
        let mock = MockRuntime::new();
        let unit = mock.define_stripped_unit("quorum.Lib");
        assert!(matches!(
            mock.locations_of_line(&unit, 3),
            Err(TargetError::AbsentInformation(_))
        ));
    }

    #[test]
    fn test_event_delivery_suspends_threads() {
        let mock = MockRuntime::new();
        mock.add_thread(main_thread(), vec![MockFrame::new("Main", "quorum.Main", 1)]);
        mock.push(RawEvent::VmStart {
            thread: main_thread(),
        });

        assert_eq!(mock.thread_status(main_thread()).unwrap(), ThreadStatus::Running);
        let events = mock.next_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(mock.thread_status(main_thread()).unwrap(), ThreadStatus::Suspended);

        mock.resume().unwrap();
        assert_eq!(mock.thread_status(main_thread()).unwrap(), ThreadStatus::Running);
    }

    #[test]
    fn test_closed_stream_reports_disconnect() {
        let mock = MockRuntime::new();
        mock.push(RawEvent::Other {
            description: "x".into(),
        });
        mock.close();
        assert!(mock.next_events().is_ok());
        assert_eq!(mock.next_events(), Err(TargetError::Disconnected));
    }

    #[test]
    fn test_exit_queues_death_and_closes() {
        let mock = MockRuntime::new();
        mock.exit(0).unwrap();
        assert_eq!(mock.exit_code(), Some(0));
        assert_eq!(mock.next_events().unwrap(), vec![RawEvent::VmDeath]);
        assert!(mock.next_events().unwrap_err().is_disconnected());
    }

    #[test]
    fn test_unit_load_respects_exclusions() {
        let mock = MockRuntime::new();
        let lib = mock.define_unit("java.util.List", &[]);
        let user = mock.define_unit("quorum.Main", &[]);
        assert!(!mock.load_unit(&user));

        mock.create_unit_load_request(&["java.*".to_string()], SuspendPolicy::All)
            .unwrap();
        assert!(!mock.load_unit(&lib));
        assert!(mock.load_unit(&user));
    }

    #[test]
    fn test_invoke_requires_suspended_thread() {
        let mock = MockRuntime::new();
        mock.add_thread(main_thread(), Vec::new());
        mock.insert_object(
            ObjectId(10),
            MockObject::new("quorum.Thing").with_method("GetSize", |_| Ok(Value::Int(3))),
        );

        assert_eq!(
            mock.invoke(ObjectId(10), main_thread(), "GetSize", &[]),
            Err(TargetError::IncompatibleThreadState(main_thread()))
        );
        mock.suspend().unwrap();
        assert_eq!(
            mock.invoke(ObjectId(10), main_thread(), "GetSize", &[]),
            Ok(Value::Int(3))
        );
    }
}
