//! Payload traits.
//!
//! The core never looks inside a payload. It stores `Arc<dyn DebugInfoBase>`
//! and hands the same reference back to readers, on any thread.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::DebugInfoKind;

/// Object-safe payload bound. Implemented for every `Send + Sync + Debug`
/// type with a `'static` lifetime.
pub trait DebugInfoBase: Any + Send + Sync + fmt::Debug {
    #[doc(hidden)]
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Concrete type name, used by diagnostics and type-mismatch errors.
    fn type_name(&self) -> &'static str;
}

impl<T> DebugInfoBase for T
where
    T: Any + Send + Sync + fmt::Debug,
{
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A payload type bound to a single kind.
///
/// ```
/// use lineage_runtime::{DebugInfo, DebugInfoKind};
///
/// #[derive(Debug)]
/// struct ModelId(String);
///
/// impl DebugInfo for ModelId {
///     const KIND: DebugInfoKind = DebugInfoKind::ProducerInfo;
/// }
/// ```
pub trait DebugInfo: DebugInfoBase + Sized {
    const KIND: DebugInfoKind;
}

pub(crate) fn payload_type_name(info: &Arc<dyn DebugInfoBase>) -> &'static str {
    <dyn DebugInfoBase as DebugInfoBase>::type_name(&**info)
}

pub(crate) fn downcast_payload<T: DebugInfo>(
    info: &Arc<dyn DebugInfoBase>,
) -> Option<Arc<T>> {
    <dyn DebugInfoBase as DebugInfoBase>::into_any_arc(Arc::clone(info))
        .downcast::<T>()
        .ok()
}
