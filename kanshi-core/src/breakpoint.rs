//! ブレークポイント管理
//!
//! ブレークポイントはまだロードされていないコード単位を参照できる。
//! 所有するコード単位がロードされるまでは未解決として保持し、
//! ロード通知を受けた時点でターゲットにリクエストを設置する。

use crate::parse::parse_breakpoint;
use crate::DebuggerError;
use kanshi_target::{
    LineRequest, RequestId, SuspendPolicy, TargetError, TargetRuntime, UnitHandle, UnitName,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// 行ブレークポイント
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Breakpoint {
    pub unit: UnitName,
    pub line: u32,
    /// n回目の到達でだけ停止する（`None` は毎回）
    pub hit_count: Option<u32>,
}

impl Breakpoint {
    pub fn new(unit: impl Into<UnitName>, line: u32) -> Self {
        Self {
            unit: unit.into(),
            line,
            hit_count: None,
        }
    }

    pub fn with_hit_count(mut self, count: u32) -> Self {
        self.hit_count = Some(count);
        self
    }

    /// システム内で一意なキー（`line:qualified/Name`）
    pub fn static_key(&self) -> String {
        format!("{}:{}", self.line, self.unit.qualified_name())
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit, self.line)
    }
}

impl FromStr for Breakpoint {
    type Err = DebuggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_breakpoint(s)
    }
}

/// ブレークポイントの解決状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointState {
    /// コード単位のロード待ち
    Unresolved,
    /// ロード済み。実行可能な位置がなければ `active` は false のまま
    Resolved { active: bool },
}

#[derive(Debug, Clone)]
struct ResolvedBreakpoint {
    breakpoint: Breakpoint,
    request: Option<RequestId>,
}

/// ブレークポイントの解決器
///
/// 各ブレークポイントは未解決・解決済みのどちらか一方にだけ属する。
pub struct BreakpointResolver {
    unresolved: HashMap<UnitName, BTreeMap<u32, Breakpoint>>,
    resolved: HashMap<UnitName, BTreeMap<u32, ResolvedBreakpoint>>,
    /// ロード済みコード単位（ロード通知でのみ増える）
    loaded: HashMap<UnitName, UnitHandle>,
}

impl BreakpointResolver {
    /// 新しい解決器を作成する
    pub fn new() -> Self {
        Self {
            unresolved: HashMap::new(),
            resolved: HashMap::new(),
            loaded: HashMap::new(),
        }
    }

    /// ブレークポイントを追加する
    ///
    /// コード単位がロード済みならその場で有効化し、そうでなければ未解決として保持する。
    /// 同じ位置のブレークポイントは置き換える。
    pub fn add(&mut self, breakpoint: Breakpoint, target: &dyn TargetRuntime) {
        let Some(handle) = self.loaded.get(&breakpoint.unit).cloned() else {
            debug!("deferring breakpoint {} until its unit loads", breakpoint);
            self.unresolved
                .entry(breakpoint.unit.clone())
                .or_default()
                .insert(breakpoint.line, breakpoint);
            return;
        };

        let previous = self
            .resolved
            .get_mut(&breakpoint.unit)
            .and_then(|lines| lines.remove(&breakpoint.line));
        if let Some(previous) = previous {
            Self::deactivate(&previous, target);
        }

        let request = Self::activate(&breakpoint, &handle, target);
        self.resolved
            .entry(breakpoint.unit.clone())
            .or_default()
            .insert(
                breakpoint.line,
                ResolvedBreakpoint {
                    breakpoint,
                    request,
                },
            );
    }

    /// ブレークポイントを削除する
    ///
    /// 解決済みならターゲットのリクエストを先に削除する。存在しなければ `None`。
    pub fn remove(
        &mut self,
        breakpoint: &Breakpoint,
        target: &dyn TargetRuntime,
    ) -> Option<Breakpoint> {
        if let Some(resolved) = take(&mut self.resolved, &breakpoint.unit, breakpoint.line) {
            Self::deactivate(&resolved, target);
            return Some(resolved.breakpoint);
        }
        take(&mut self.unresolved, &breakpoint.unit, breakpoint.line)
    }

    /// コード単位のロード通知を処理する
    ///
    /// 保留中のブレークポイントをすべて解決済みに移して有効化する。
    /// ロードから設置までの間にターゲットが進まないよう、処理中は停止させておく。
    pub fn on_unit_load(&mut self, unit: UnitHandle, target: &dyn TargetRuntime) {
        if let Err(err) = target.suspend() {
            warn!("failed to suspend target while loading {}: {}", unit.name, err);
        }

        self.loaded.insert(unit.name.clone(), unit.clone());
        if let Some(pending) = self.unresolved.remove(&unit.name) {
            debug!("resolving {} breakpoints in {}", pending.len(), unit.name);
            let lines = self.resolved.entry(unit.name.clone()).or_default();
            for (line, breakpoint) in pending {
                let request = Self::activate(&breakpoint, &unit, target);
                lines.insert(
                    line,
                    ResolvedBreakpoint {
                        breakpoint,
                        request,
                    },
                );
            }
        }

        if let Err(err) = target.resume() {
            warn!("failed to resume target after loading {}: {}", unit.name, err);
        }
    }

    /// ブレークポイントの行を実行可能な位置に解決し、リクエストを設置する
    ///
    /// 実行可能な位置がない行は受け付けるが、リクエストは設置しない。
    fn activate(
        breakpoint: &Breakpoint,
        unit: &UnitHandle,
        target: &dyn TargetRuntime,
    ) -> Option<RequestId> {
        let location = match target.locations_of_line(unit, breakpoint.line) {
            Ok(locations) => locations.into_iter().next(),
            Err(TargetError::AbsentInformation(_)) => None,
            Err(err) => {
                warn!("failed to resolve breakpoint {}: {}", breakpoint, err);
                return None;
            }
        };
        let Some(location) = location else {
            info!("no executable code at {}, breakpoint stays inactive", breakpoint);
            return None;
        };

        let request = LineRequest {
            location,
            hit_count: breakpoint.hit_count,
            suspend: SuspendPolicy::All,
        };
        match target.create_line_request(request) {
            Ok(id) => {
                debug!("breakpoint {} installed as request {}", breakpoint, id);
                Some(id)
            }
            Err(err) => {
                warn!("failed to install breakpoint {}: {}", breakpoint, err);
                None
            }
        }
    }

    fn deactivate(resolved: &ResolvedBreakpoint, target: &dyn TargetRuntime) {
        let Some(request) = resolved.request else {
            return;
        };
        if let Err(err) = target.delete_request(request) {
            debug!("failed to delete request {}: {}", request, err);
        }
    }

    /// 全てのブレークポイントを取得する（コード単位・行の順）
    pub fn list(&self) -> Vec<Breakpoint> {
        let mut all: Vec<Breakpoint> = self
            .unresolved
            .values()
            .flat_map(|lines| lines.values().cloned())
            .chain(
                self.resolved
                    .values()
                    .flat_map(|lines| lines.values().map(|r| r.breakpoint.clone())),
            )
            .collect();
        all.sort_by(|a, b| (&a.unit, a.line).cmp(&(&b.unit, b.line)));
        all
    }

    /// 全てのブレークポイントを削除する（ロード済みコード単位の記録は残す）
    pub fn clear(&mut self, target: &dyn TargetRuntime) {
        for resolved in self.resolved.values().flat_map(|lines| lines.values()) {
            Self::deactivate(resolved, target);
        }
        self.resolved.clear();
        self.unresolved.clear();
    }

    /// セッション終了時にすべての状態を破棄する
    pub fn reset(&mut self) {
        self.resolved.clear();
        self.unresolved.clear();
        self.loaded.clear();
    }

    /// ブレークポイントの解決状態を取得する
    pub fn state_of(&self, breakpoint: &Breakpoint) -> Option<BreakpointState> {
        if let Some(resolved) = self
            .resolved
            .get(&breakpoint.unit)
            .and_then(|lines| lines.get(&breakpoint.line))
        {
            return Some(BreakpointState::Resolved {
                active: resolved.request.is_some(),
            });
        }
        self.unresolved
            .get(&breakpoint.unit)
            .and_then(|lines| lines.get(&breakpoint.line))
            .map(|_| BreakpointState::Unresolved)
    }

    pub fn is_loaded(&self, unit: &UnitName) -> bool {
        self.loaded.contains_key(unit)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.values().map(BTreeMap::len).sum()
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved.values().map(BTreeMap::len).sum()
    }
}

impl Default for BreakpointResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// 単位ごとの表から1件取り出し、空になった単位は表からも消す
fn take<T>(map: &mut HashMap<UnitName, BTreeMap<u32, T>>, unit: &UnitName, line: u32) -> Option<T> {
    let lines = map.get_mut(unit)?;
    let value = lines.remove(&line)?;
    if lines.is_empty() {
        map.remove(unit);
    }
    Some(value)
}
