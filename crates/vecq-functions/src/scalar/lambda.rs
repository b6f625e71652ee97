//! Higher-order functions over arrays: `map`, `filter` and `any_match`.
//!
//! The lambda body is evaluated once per input row against a tuple whose first
//! column is the bound parameter (the row's array) and whose remaining columns
//! are the outer input columns broadcast as literals of the array's length.

use std::iter;

use vecq_core::prelude::*;

use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;
use crate::function::{expect_arity, ScalarFunction};

struct LambdaCall<'a> {
    array: &'a Expression,
    parameter: &'a str,
    body: &'a Expression,
}

impl<'a> LambdaCall<'a> {
    fn parse(function: &str, arguments: &'a [Expression]) -> Result<Self> {
        expect_arity(function, arguments, 2)?;
        match &arguments[1] {
            Expression::Lambda { parameter, body } => Ok(Self {
                array: &arguments[0],
                parameter,
                body,
            }),
            other => Err(FunctionError::Argument(format!(
                "{function} expects a lambda as its second argument, got {other}"
            ))),
        }
    }

    fn element_type(&self, function: &str, schema: &Schema) -> Result<ResolvedType> {
        match self.array.ty(schema)? {
            ResolvedType::Array(element) => Ok(*element),
            ResolvedType::Any => Ok(ResolvedType::Any),
            other => Err(FunctionError::Type(format!(
                "{function} expects an array, got {other}"
            ))),
        }
    }

    fn inner_schema(&self, schema: &Schema, element: ResolvedType) -> Schema {
        iter::once(Column::new(self.parameter, element))
            .chain(schema.iter().cloned())
            .collect()
    }

    fn body_type(&self, function: &str, schema: &Schema) -> Result<ResolvedType> {
        let element = self.element_type(function, schema)?;
        self.body.ty(&self.inner_schema(schema, element))
    }

    fn predicate(&self, function: &str, schema: &Schema) -> Result<()> {
        match self.body_type(function, schema)? {
            ResolvedType::Boolean | ResolvedType::Any => Ok(()),
            other => Err(FunctionError::Type(format!(
                "{function} expects a boolean lambda, got {other}"
            ))),
        }
    }

    /// Evaluate the body for every non-null array; `finish` turns the array
    /// and the body's values into the row result.
    fn eval<F>(
        &self,
        function: &str,
        ctx: &ExecutionContext,
        input: &TupleVector,
        output: &ResolvedType,
        mut finish: F,
    ) -> Result<ValueVector>
    where
        F: FnMut(&ValueVector, &ValueVector) -> Result<Value>,
    {
        let schema = input.schema();
        let inner_schema = self.inner_schema(schema, self.element_type(function, schema)?);
        let arrays = self.array.eval(input, ctx)?;
        let mut builder = ctx.factory().builder(output);
        for row in 0..input.row_count() {
            let array = match arrays.get_any(row) {
                Value::Null => {
                    builder.put_null();
                    continue;
                }
                Value::Array(array) => array,
                other => {
                    return Err(FunctionError::Type(format!(
                        "{function} expects arrays, got {other}"
                    )))
                }
            };
            let mut columns = Vec::with_capacity(inner_schema.len());
            columns.push(array.clone());
            for column in input.columns() {
                columns.push(ValueVector::literal(
                    column.get_any(row),
                    column.ty().clone(),
                    array.size(),
                )?);
            }
            let inner = TupleVector::of(inner_schema.clone(), columns)?;
            let body = self.body.eval(&inner, ctx)?;
            builder.put_any(finish(&array, &body)?)?;
        }
        Ok(builder.build()?)
    }
}

/// `map(array, x -> expr)`: the body's values as a new array.
#[derive(Debug, Default, Clone, Copy)]
pub struct Map;

impl ScalarFunction for Map {
    fn name(&self) -> &'static str {
        "map"
    }

    fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        let call = LambdaCall::parse("map", arguments)?;
        Ok(ResolvedType::array(call.body_type("map", schema)?))
    }

    fn eval_scalar(
        &self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        _catalog_alias: Option<&str>,
        arguments: &[Expression],
    ) -> Result<ValueVector> {
        let output = self.return_type(input.schema(), arguments)?;
        let call = LambdaCall::parse("map", arguments)?;
        call.eval("map", ctx, input, &output, |_, body| {
            Ok(Value::Array(body.clone()))
        })
    }
}

/// `filter(array, x -> predicate)`: the elements whose predicate is true.
#[derive(Debug, Default, Clone, Copy)]
pub struct Filter;

impl ScalarFunction for Filter {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        let call = LambdaCall::parse("filter", arguments)?;
        call.predicate("filter", schema)?;
        Ok(ResolvedType::array(call.element_type("filter", schema)?))
    }

    fn eval_scalar(
        &self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        _catalog_alias: Option<&str>,
        arguments: &[Expression],
    ) -> Result<ValueVector> {
        let output = self.return_type(input.schema(), arguments)?;
        let call = LambdaCall::parse("filter", arguments)?;
        let factory = ctx.factory();
        call.eval("filter", ctx, input, &output, |array, body| {
            let keep: Vec<usize> = (0..body.size())
                .filter(|&r| !body.is_null(r) && body.get_any(r) == Value::Boolean(true))
                .collect();
            Ok(Value::Array(factory.take(array, &keep)?))
        })
    }
}

/// `any_match(array, x -> predicate)`: true if any element matches, null if
/// none matches but some predicate was null, false otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyMatch;

impl ScalarFunction for AnyMatch {
    fn name(&self) -> &'static str {
        "any_match"
    }

    fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        LambdaCall::parse("any_match", arguments)?.predicate("any_match", schema)?;
        Ok(ResolvedType::Boolean)
    }

    fn eval_scalar(
        &self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        _catalog_alias: Option<&str>,
        arguments: &[Expression],
    ) -> Result<ValueVector> {
        let output = self.return_type(input.schema(), arguments)?;
        let call = LambdaCall::parse("any_match", arguments)?;
        call.eval("any_match", ctx, input, &output, |_, body| {
            let mut saw_null = false;
            for r in 0..body.size() {
                match body.get_any(r) {
                    Value::Boolean(true) => return Ok(Value::Boolean(true)),
                    Value::Null => saw_null = true,
                    _ => {}
                }
            }
            Ok(if saw_null {
                Value::Null
            } else {
                Value::Boolean(false)
            })
        })
    }
}
