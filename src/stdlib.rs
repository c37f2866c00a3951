use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{BasicError, BasicResult};
use crate::value::{NativeFunction, Value};

/// Native functions installed into the global environment at interpreter
/// construction. The language surface is deliberately small: `clock` only.
pub fn standard_library() -> Vec<NativeFunction> {
    vec![NativeFunction {
        arity: 0,
        func: native_clock,
        name: "clock".to_string(),
    }]
}

// current wall-clock time in seconds since the Unix epoch
fn native_clock(_args: &[Value]) -> BasicResult<Value> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| BasicError::new("System clock is set before the Unix epoch."))?;
    Ok(Value::from(elapsed.as_secs_f64()))
}
