//! Kanshi ターゲットランタイム制御
//!
//! このクレートは、デバッグ対象のランタイム（VM）とやり取りするための契約を定義します。
//! 実際の接続（起動・アタッチ・トランスポート）は外部の実装が担当し、
//! コア側は [`TargetRuntime`] トレイトだけを通してターゲットを操作します。

pub mod error;
pub mod event;
pub mod location;
pub mod mock;
pub mod request;
pub mod runtime;
pub mod thread;
pub mod value;

pub use error::TargetError;
pub use event::{EventSet, RawEvent};
pub use location::{Location, UnitHandle, UnitName};
pub use mock::MockRuntime;
pub use request::{
    matches_class_filter, LineRequest, RequestId, StepDirection, StepRequest, SuspendPolicy,
};
pub use runtime::TargetRuntime;
pub use thread::{FrameInfo, ThreadId, ThreadStatus};
pub use value::{FieldInfo, LocalVariableInfo, ObjectId, Value};

/// ターゲット制御の結果型
pub type Result<T> = std::result::Result<T, TargetError>;
