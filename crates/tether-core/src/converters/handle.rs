//! Handle fallback converter
//!
//! Any managed object without a value conversion crosses as a handle. The
//! object stays in the runtime; the heap keeps it alive until a reclamation
//! cycle finds the foreign side no longer holds the handle.

use super::HANDLE_PRIORITY;
use crate::context::MarshalContext;
use crate::heap::HandleHeap;
use crate::register_converter;
use crate::registry::ConstructResult;
use std::sync::Arc;
use tether_sdk::types::{NATIVE_HANDLE, OBJECT};
use tether_sdk::{ConvertError, ConvertResult, ManagedRef, NativeValue, TypeConverter, TypeMapping, TypeRef};

/// `native.handle` ↔ `Object`
pub struct HandleConverter {
    heap: Arc<HandleHeap>,
    to_managed: TypeMapping,
    to_native: TypeMapping,
}

impl HandleConverter {
    /// Create a converter backed by `heap`
    pub fn new(heap: Arc<HandleHeap>) -> Self {
        Self {
            heap,
            to_managed: TypeMapping::to_managed(&NATIVE_HANDLE, &OBJECT),
            to_native: TypeMapping::to_native(&OBJECT, &NATIVE_HANDLE),
        }
    }

    /// Constructor used by discovery
    pub fn construct(ctx: &MarshalContext) -> ConstructResult {
        Ok(Arc::new(Self::new(Arc::clone(ctx.heap()))))
    }
}

impl TypeConverter for HandleConverter {
    fn name(&self) -> &'static str {
        "handle"
    }

    fn priority(&self) -> i32 {
        HANDLE_PRIORITY
    }

    fn to_managed_mapping(&self) -> &TypeMapping {
        &self.to_managed
    }

    fn to_native_mapping(&self) -> &TypeMapping {
        &self.to_native
    }

    fn to_managed(&self, value: &NativeValue, _target: &TypeRef) -> ConvertResult<ManagedRef> {
        match value {
            NativeValue::Handle(handle) => Ok(self.heap.get_object(*handle)?),
            other => Err(ConvertError::mismatch(NATIVE_HANDLE.name(), other.type_name())),
        }
    }

    fn to_native(&self, object: &ManagedRef) -> ConvertResult<NativeValue> {
        Ok(NativeValue::Handle(self.heap.get_handle(object)))
    }
}

register_converter!(HandleConverter, with_context = HandleConverter::construct);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_round_trip() {
        let heap = Arc::new(HandleHeap::with_seed(500));
        let converter = HandleConverter::new(Arc::clone(&heap));
        let object = ManagedRef::new(vec![1u8, 2, 3]);

        let native = converter.to_native(&object).unwrap();
        assert_eq!(native, NativeValue::Handle(500));

        let back = converter.to_managed(&native, &TypeRef::of(&OBJECT)).unwrap();
        assert!(back.ptr_eq(&object));
    }

    #[test]
    fn test_stale_handle() {
        let heap = Arc::new(HandleHeap::with_seed(500));
        let converter = HandleConverter::new(heap);

        let err = converter
            .to_managed(&NativeValue::Handle(42), &TypeRef::of(&OBJECT))
            .unwrap_err();
        assert_eq!(err, ConvertError::UnknownHandle(42));
    }

    #[test]
    fn test_rejects_non_handle() {
        let converter = HandleConverter::new(Arc::new(HandleHeap::with_seed(1)));
        let err = converter
            .to_managed(&NativeValue::Number(1.0), &TypeRef::of(&OBJECT))
            .unwrap_err();
        assert!(matches!(err, ConvertError::TypeMismatch { .. }));
    }

    #[test]
    fn test_construct_shares_context_heap() {
        let heap = Arc::new(HandleHeap::with_seed(9));
        let ctx = MarshalContext::new(Arc::clone(&heap));
        let converter = HandleConverter::construct(&ctx).unwrap();

        let object = ManagedRef::new(());
        converter.to_native(&object).unwrap();
        assert_eq!(heap.len(), 1);
    }
}
