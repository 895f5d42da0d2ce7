//! Kanshi 変数表示
//!
//! ターゲットの生きた値を表示用の変数ツリーへ変換します。
//! 型ごとの表示方法（フォーマッタ）と名前の付け方（命名規則）は
//! どちらも差し替え可能で、ツリーを辿る側のコードには手を入れずに拡張できます。

pub mod builtin;
pub mod filter;
pub mod naming;
pub mod presenter;
pub mod value_formatter;
pub mod variable;

pub use filter::{MarkerFilter, VisibilityFilter};
pub use naming::{FriendlyNaming, NamingConvention, RawNaming};
pub use presenter::Presenter;
pub use value_formatter::{FormatContext, Formatter, FormatterRegistry};
pub use variable::{Variable, VariableColumn};

/// 変数表示の結果型
pub type Result<T> = anyhow::Result<T>;
