//! 組み込みフォーマッタ

mod containers;
mod system;

pub use containers::{
    BucketFormatter, DelegatingFormatter, EntryFormatter, IndexedFormatter, IterableFormatter,
};
pub use system::ProbeFormatter;

use crate::Formatter;
use std::sync::Arc;

/// 既定で登録するフォーマッタ
pub fn defaults() -> Vec<Arc<dyn Formatter>> {
    let list: Arc<dyn Formatter> = Arc::new(IterableFormatter::new(
        "quorum.Libraries.Containers.List",
        "Libraries.Containers.List",
    ));
    vec![
        Arc::new(IndexedFormatter::new(
            "quorum.Libraries.Containers.Array",
            "Libraries.Containers.Array",
        )),
        list.clone(),
        Arc::new(DelegatingFormatter::new(
            "quorum.Libraries.Containers.Stack",
            "Libraries.Containers.Stack",
            "list",
            list,
        )),
        Arc::new(BucketFormatter::new(
            "quorum.Libraries.Containers.HashTable",
            "Libraries.Containers.HashTable",
        )),
        Arc::new(EntryFormatter::new(
            "quorum.Libraries.Containers.Support.HashNode",
            "Libraries.Containers.Support.HashNode",
        )),
        Arc::new(ProbeFormatter::date_time()),
        Arc::new(ProbeFormatter::file()),
    ]
}
