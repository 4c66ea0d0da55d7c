//! Built-in converters
//!
//! | Native          | Managed   | Rust type    | Priority |
//! |-----------------|-----------|--------------|----------|
//! | `native.number` | `Double`  | `f64`        | 10       |
//! | `native.int`    | `Integer` | `i32`        | 10       |
//! | `native.bool`   | `Boolean` | `bool`       | 10       |
//! | `native.string` | `String`  | `String`     | 10       |
//! | `native.number` | `Long`    | `i64`        | 5        |
//! | `native.handle` | `Object`  | any          | -100     |
//!
//! The handle converter is the fallback for every managed type without a
//! value conversion: the object stays in the runtime and the caller receives
//! a handle from the heap.

mod handle;
mod primitives;

pub use handle::HandleConverter;
pub use primitives::{BooleanConverter, IntegerConverter, LongConverter, NumberConverter, StringConverter};

/// Priority of the built-in value converters
pub const VALUE_PRIORITY: i32 = 10;

/// Priority of the handle fallback
pub const HANDLE_PRIORITY: i32 = -100;
