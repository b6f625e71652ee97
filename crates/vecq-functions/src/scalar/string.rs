use vecq_core::prelude::*;

use super::{eval_arguments, map_rows};
use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;
use crate::function::{expect_arity, ScalarFunction};

fn require_string(function: &str, schema: &Schema, argument: &Expression) -> Result<()> {
    match argument.ty(schema)? {
        ResolvedType::String | ResolvedType::Any => Ok(()),
        other => Err(FunctionError::Type(format!(
            "{function} expects a string argument, got {other}"
        ))),
    }
}

fn as_text<'a>(function: &str, value: &'a Value) -> Result<Option<&'a str>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(FunctionError::Type(format!(
            "{function} expects strings, got {other}"
        ))),
    }
}

/// Concatenation of every argument's text; null arguments are skipped and
/// non-string values are rendered through `Display`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Concat;

impl ScalarFunction for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn return_type(&self, _schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        if arguments.is_empty() {
            return Err(FunctionError::Argument(
                "concat expects at least 1 argument".into(),
            ));
        }
        Ok(ResolvedType::String)
    }

    fn eval_scalar(
        &self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        _catalog_alias: Option<&str>,
        arguments: &[Expression],
    ) -> Result<ValueVector> {
        self.return_type(input.schema(), arguments)?;
        let vectors = eval_arguments(ctx, input, arguments)?;
        map_rows(ctx, input.row_count(), &vectors, &ResolvedType::String, |values| {
            let mut out = String::new();
            for value in values.iter().filter(|v| !v.is_null()) {
                match value {
                    Value::String(s) => out.push_str(s),
                    other => out.push_str(&other.to_string()),
                }
            }
            Ok(Value::from(out))
        })
    }
}

macro_rules! string_function {
    ($(#[$doc:meta])* $name:ident, $fn_name:literal, $output:expr, $map:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl ScalarFunction for $name {
            fn name(&self) -> &'static str {
                $fn_name
            }

            fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
                expect_arity($fn_name, arguments, 1)?;
                require_string($fn_name, schema, &arguments[0])?;
                Ok($output)
            }

            fn eval_scalar(
                &self,
                ctx: &ExecutionContext,
                input: &TupleVector,
                _catalog_alias: Option<&str>,
                arguments: &[Expression],
            ) -> Result<ValueVector> {
                let output = self.return_type(input.schema(), arguments)?;
                let vectors = eval_arguments(ctx, input, arguments)?;
                let map: fn(&str) -> Value = $map;
                map_rows(ctx, input.row_count(), &vectors, &output, |values| {
                    Ok(as_text($fn_name, &values[0])?.map_or(Value::Null, map))
                })
            }
        }
    };
}

string_function!(Lower, "lower", ResolvedType::String, |s| Value::from(s.to_lowercase()));
string_function!(Upper, "upper", ResolvedType::String, |s| Value::from(s.to_uppercase()));
string_function!(Trim, "trim", ResolvedType::String, |s| Value::from(s.trim()));
string_function!(
    /// Length in characters, not bytes.
    Length,
    "length",
    ResolvedType::Int,
    |s| Value::Int(i32::try_from(s.chars().count()).unwrap_or(i32::MAX))
);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn words() -> TupleVector {
        TupleVector::of(
            Schema::of([("w", ResolvedType::String)]),
            vec![ValueVector::from_values(
                ResolvedType::String,
                vec![Value::from("  Héllo "), Value::Null],
            )
            .expect("strings")],
        )
        .expect("tuple")
    }

    #[test]
    fn length_counts_characters() {
        let ctx = ExecutionContext::default();
        let trimmed = Expression::call(Arc::new(Trim), vec![Expression::column("w")]);
        let expr = Expression::call(Arc::new(Length), vec![trimmed]);
        let out = expr.eval(&words(), &ctx).expect("length");
        assert_eq!(out.get_int(0), 5);
        assert!(out.is_null(1));
    }

    #[test]
    fn concat_skips_nulls() {
        let ctx = ExecutionContext::default();
        let expr = Expression::call(
            Arc::new(Concat),
            vec![
                Expression::literal("<"),
                Expression::column("w"),
                Expression::literal(Value::Int(7)),
            ],
        );
        let out = expr.eval(&words(), &ctx).expect("concat");
        assert_eq!(&*out.get_string(0), "<  Héllo 7");
        assert_eq!(&*out.get_string(1), "<7");
    }
}
