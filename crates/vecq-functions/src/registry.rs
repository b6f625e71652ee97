//! Name → function lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::aggregate::{Avg, Count, Max, Min, Sum};
use crate::error::{FunctionError, Result};
use crate::expression::Expression;
use crate::function::ScalarFunction;
use crate::scalar::{
    Add, AnyMatch, ArrayConstructor, Concat, Divide, Equals, Filter, GreaterThan,
    GreaterThanOrEqual, JsonValue, Length, LessThan, LessThanOrEqual, Lower, Map, Multiply,
    Negate, NotEquals, ObjectConstructor, Subtract, Trim, Upper,
};

/// Functions keyed by lower-case name. Registering a name twice replaces the
/// earlier function.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn ScalarFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in function.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [Arc<dyn ScalarFunction>; 27] = [
            Arc::new(Add),
            Arc::new(Subtract),
            Arc::new(Multiply),
            Arc::new(Divide),
            Arc::new(Negate),
            Arc::new(Equals),
            Arc::new(NotEquals),
            Arc::new(LessThan),
            Arc::new(LessThanOrEqual),
            Arc::new(GreaterThan),
            Arc::new(GreaterThanOrEqual),
            Arc::new(Concat),
            Arc::new(Lower),
            Arc::new(Upper),
            Arc::new(Length),
            Arc::new(Trim),
            Arc::new(JsonValue),
            Arc::new(ObjectConstructor),
            Arc::new(ArrayConstructor),
            Arc::new(Map),
            Arc::new(Filter),
            Arc::new(AnyMatch),
            Arc::new(Sum),
            Arc::new(Avg),
            Arc::new(Min),
            Arc::new(Max),
            Arc::new(Count),
        ];
        for function in builtins {
            registry.register(function);
        }
        registry
    }

    pub fn register(&mut self, function: Arc<dyn ScalarFunction>) {
        self.functions
            .insert(function.name().to_ascii_lowercase(), function);
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ScalarFunction>> {
        self.functions.get(&name.to_ascii_lowercase()).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Call expression for `name`, or an `Argument` error for an unknown name.
    pub fn call(&self, name: &str, arguments: Vec<Expression>) -> Result<Expression> {
        let function = self
            .get(name)
            .ok_or_else(|| FunctionError::Argument(format!("unknown function '{name}'")))?;
        Ok(Expression::call(function, arguments))
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
