//! Centralized numeric promotion shared by arithmetic and aggregate functions.
//!
//! Widening order is Int < Long < Float < Double < Decimal. Every binary
//! operation first lifts both operands to the wider rank, so a single Decimal
//! operand makes the result exact. Int and Long arithmetic is checked; overflow
//! is an `Arithmetic` error, never a wrap or a silent promotion.

use std::cmp::Ordering;
use std::fmt;

use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::{ToPrimitive, Zero};
use vecq_core::prelude::*;
use vecq_core::value::decimal_from_float;

use crate::error::{FunctionError, Result};

/// Extra fractional digits used when dividing a decimal sum by a count.
pub const DECIMAL_AVG_EXTRA_SCALE: i64 = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(BigDecimal),
}

#[derive(Debug, Clone, Copy)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }
}

impl Numeric {
    /// Numeric view of a boxed value; `None` for null and non-numeric values.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(Numeric::Int(*v)),
            Value::Long(v) => Some(Numeric::Long(*v)),
            Value::Float(v) => Some(Numeric::Float(*v)),
            Value::Double(v) => Some(Numeric::Double(*v)),
            Value::Decimal(d) => Some(Numeric::Decimal(d.clone())),
            _ => None,
        }
    }

    /// Like `from_value`, but a non-null non-numeric value is a `Type` error.
    pub fn require(function: &str, value: &Value) -> Result<Option<Self>> {
        if value.is_null() {
            return Ok(None);
        }
        Self::from_value(value).map(Some).ok_or_else(|| {
            FunctionError::Type(format!("{function} expects numeric values, got {value}"))
        })
    }

    pub fn rank(&self) -> u8 {
        match self {
            Numeric::Int(_) => 0,
            Numeric::Long(_) => 1,
            Numeric::Float(_) => 2,
            Numeric::Double(_) => 3,
            Numeric::Decimal(_) => 4,
        }
    }

    pub fn result_type(&self) -> ResolvedType {
        match self {
            Numeric::Int(_) => ResolvedType::Int,
            Numeric::Long(_) => ResolvedType::Long,
            Numeric::Float(_) => ResolvedType::Float,
            Numeric::Double(_) => ResolvedType::Double,
            Numeric::Decimal(_) => ResolvedType::Decimal,
        }
    }

    /// Lift to `rank` (never narrows).
    fn widen(self, rank: u8) -> Result<Numeric> {
        if rank <= self.rank() {
            return Ok(self);
        }
        Ok(match rank {
            1 => Numeric::Long(self.as_i64()),
            2 => Numeric::Float(self.as_f64() as f32),
            3 => Numeric::Double(self.as_f64()),
            _ => Numeric::Decimal(self.as_decimal()?),
        })
    }

    fn as_i64(&self) -> i64 {
        match self {
            Numeric::Int(v) => i64::from(*v),
            Numeric::Long(v) => *v,
            Numeric::Float(v) => *v as i64,
            Numeric::Double(v) => *v as i64,
            Numeric::Decimal(d) => d.to_i64().unwrap_or_default(),
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Numeric::Int(v) => f64::from(*v),
            Numeric::Long(v) => *v as f64,
            Numeric::Float(v) => f64::from(*v),
            Numeric::Double(v) => *v,
            Numeric::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }

    fn as_decimal(&self) -> Result<BigDecimal> {
        match self {
            Numeric::Int(v) => Ok(BigDecimal::from(*v)),
            Numeric::Long(v) => Ok(BigDecimal::from(*v)),
            Numeric::Float(v) => float_to_decimal(f64::from(*v)),
            Numeric::Double(v) => float_to_decimal(*v),
            Numeric::Decimal(d) => Ok(d.clone()),
        }
    }

    /// Lift both operands to their common rank.
    pub fn promote(a: Numeric, b: Numeric) -> Result<(Numeric, Numeric)> {
        let rank = a.rank().max(b.rank());
        Ok((a.widen(rank)?, b.widen(rank)?))
    }

    pub fn apply(self, op: BinaryOp, other: Numeric) -> Result<Numeric> {
        let overflow = |a: &dyn fmt::Display, b: &dyn fmt::Display| {
            FunctionError::Arithmetic(format!("overflow in {a} {} {b}", op.symbol()))
        };
        let by_zero = || FunctionError::Arithmetic("division by zero".into());
        match Numeric::promote(self, other)? {
            (Numeric::Int(a), Numeric::Int(b)) => {
                let out = match op {
                    BinaryOp::Add => a.checked_add(b),
                    BinaryOp::Subtract => a.checked_sub(b),
                    BinaryOp::Multiply => a.checked_mul(b),
                    BinaryOp::Divide if b == 0 => return Err(by_zero()),
                    BinaryOp::Divide => a.checked_div(b),
                };
                out.map(Numeric::Int).ok_or_else(|| overflow(&a, &b))
            }
            (Numeric::Long(a), Numeric::Long(b)) => {
                let out = match op {
                    BinaryOp::Add => a.checked_add(b),
                    BinaryOp::Subtract => a.checked_sub(b),
                    BinaryOp::Multiply => a.checked_mul(b),
                    BinaryOp::Divide if b == 0 => return Err(by_zero()),
                    BinaryOp::Divide => a.checked_div(b),
                };
                out.map(Numeric::Long).ok_or_else(|| overflow(&a, &b))
            }
            (Numeric::Float(a), Numeric::Float(b)) => Ok(Numeric::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
            })),
            (Numeric::Double(a), Numeric::Double(b)) => Ok(Numeric::Double(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
            })),
            (Numeric::Decimal(a), Numeric::Decimal(b)) => Ok(Numeric::Decimal(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide if b.is_zero() => return Err(by_zero()),
                BinaryOp::Divide => a / b,
            })),
            (a, b) => Err(FunctionError::Type(format!(
                "cannot combine {a} and {b} after promotion"
            ))),
        }
    }

    pub fn checked_add(self, other: Numeric) -> Result<Numeric> {
        self.apply(BinaryOp::Add, other)
    }

    pub fn checked_neg(self) -> Result<Numeric> {
        match self {
            Numeric::Int(v) => v
                .checked_neg()
                .map(Numeric::Int)
                .ok_or_else(|| FunctionError::Arithmetic(format!("overflow in -({v})"))),
            Numeric::Long(v) => v
                .checked_neg()
                .map(Numeric::Long)
                .ok_or_else(|| FunctionError::Arithmetic(format!("overflow in -({v})"))),
            Numeric::Float(v) => Ok(Numeric::Float(-v)),
            Numeric::Double(v) => Ok(Numeric::Double(-v)),
            Numeric::Decimal(d) => Ok(Numeric::Decimal(-d)),
        }
    }

    /// `self × n`, as the sum of `n` copies of `self`; overflow is an error.
    pub fn checked_mul_count(self, n: usize) -> Result<Numeric> {
        let overflow = |v: &dyn fmt::Display| {
            FunctionError::Arithmetic(format!("overflow summing {v} over {n} rows"))
        };
        match self {
            Numeric::Int(v) => i32::try_from(n)
                .ok()
                .and_then(|n| v.checked_mul(n))
                .map(Numeric::Int)
                .ok_or_else(|| overflow(&v)),
            Numeric::Long(v) => i64::try_from(n)
                .ok()
                .and_then(|n| v.checked_mul(n))
                .map(Numeric::Long)
                .ok_or_else(|| overflow(&v)),
            Numeric::Float(v) => Ok(Numeric::Float(v * n as f32)),
            Numeric::Double(v) => Ok(Numeric::Double(v * n as f64)),
            Numeric::Decimal(d) => Ok(Numeric::Decimal(d * BigDecimal::from(n as u64))),
        }
    }

    /// Average of a sum over `count` values, in the sum's representation.
    ///
    /// Integer sums use integer division. Decimal sums are divided with
    /// `DECIMAL_AVG_EXTRA_SCALE` extra fractional digits and rounded half-up
    /// back to the sum's scale.
    pub fn average(self, count: u64) -> Result<Numeric> {
        if count == 0 {
            return Err(FunctionError::Arithmetic("average of zero values".into()));
        }
        match self {
            Numeric::Int(v) => Ok(Numeric::Int((i64::from(v) / count as i64) as i32)),
            Numeric::Long(v) => Ok(Numeric::Long(v / count as i64)),
            Numeric::Float(v) => Ok(Numeric::Float(v / count as f32)),
            Numeric::Double(v) => Ok(Numeric::Double(v / count as f64)),
            Numeric::Decimal(d) => {
                let scale = d.as_bigint_and_exponent().1.max(0);
                let quotient = (d / BigDecimal::from(count))
                    .with_scale_round(scale + DECIMAL_AVG_EXTRA_SCALE, RoundingMode::HalfUp);
                Ok(Numeric::Decimal(
                    quotient.with_scale_round(scale, RoundingMode::HalfUp),
                ))
            }
        }
    }

    pub fn compare(&self, other: &Numeric) -> Ordering {
        self.clone().into_value().compare(&other.clone().into_value())
    }

    pub fn into_value(self) -> Value {
        match self {
            Numeric::Int(v) => Value::Int(v),
            Numeric::Long(v) => Value::Long(v),
            Numeric::Float(v) => Value::Float(v),
            Numeric::Double(v) => Value::Double(v),
            Numeric::Decimal(d) => Value::Decimal(d),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(v) => write!(f, "{v}"),
            Numeric::Long(v) => write!(f, "{v}"),
            Numeric::Float(v) => write!(f, "{v}"),
            Numeric::Double(v) => write!(f, "{v}"),
            Numeric::Decimal(d) => write!(f, "{d}"),
        }
    }
}

fn float_to_decimal(v: f64) -> Result<BigDecimal> {
    decimal_from_float(v)
        .ok_or_else(|| FunctionError::Arithmetic(format!("{v} has no decimal representation")))
}

/// Static result type of a numeric binary operation, `Any` for `Any` operands.
pub fn binary_type(function: &str, a: &ResolvedType, b: &ResolvedType) -> Result<ResolvedType> {
    if *a == ResolvedType::Any || *b == ResolvedType::Any {
        return Ok(ResolvedType::Any);
    }
    ResolvedType::widen(a, b).ok_or_else(|| {
        FunctionError::Type(format!("{function} expects numeric arguments, got {a} and {b}"))
    })
}

/// Running sum and non-null count for one group.
#[derive(Debug, Clone, Default)]
pub struct SumState {
    pub sum: Option<Numeric>,
    pub count: u64,
}

impl SumState {
    pub fn add(&mut self, function: &str, value: &Value) -> Result<()> {
        self.add_repeated(function, value, 1)
    }

    /// Add `n` copies of `value` without iterating.
    pub fn add_repeated(&mut self, function: &str, value: &Value, n: usize) -> Result<()> {
        let Some(numeric) = Numeric::require(function, value)? else {
            return Ok(());
        };
        if n == 0 {
            return Ok(());
        }
        let addend = if n == 1 {
            numeric
        } else {
            numeric.checked_mul_count(n)?
        };
        self.sum = Some(match self.sum.take() {
            Some(sum) => sum.checked_add(addend)?,
            None => addend,
        });
        self.count += n as u64;
        Ok(())
    }

    /// Fold `rows` of `vector`. A literal vector contributes `value × rows`.
    pub fn add_rows(
        &mut self,
        function: &str,
        vector: &ValueVector,
        rows: impl ExactSizeIterator<Item = usize>,
    ) -> Result<()> {
        if let Some(value) = vector.literal_value() {
            return self.add_repeated(function, value, rows.len());
        }
        for row in rows {
            if !vector.is_null(row) {
                self.add(function, &vector.get_any(row))?;
            }
        }
        Ok(())
    }

    pub fn sum_value(&self) -> Value {
        self.sum.clone().map_or(Value::Null, Numeric::into_value)
    }

    pub fn average_value(&self) -> Result<Value> {
        match &self.sum {
            Some(sum) if self.count > 0 => Ok(sum.clone().average(self.count)?.into_value()),
            _ => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecq_core::value::parse_decimal;

    #[test]
    fn decimal_takes_precedence() {
        let d = Numeric::Decimal(parse_decimal("0.1").unwrap());
        let out = Numeric::Double(0.2).checked_add(d).unwrap();
        assert_eq!(out, Numeric::Decimal(parse_decimal("0.3").unwrap()));
    }

    #[test]
    fn int_overflow_is_an_error() {
        let err = Numeric::Int(i32::MAX).checked_add(Numeric::Int(1)).unwrap_err();
        assert!(matches!(err, FunctionError::Arithmetic(_)));
        assert_eq!(
            Numeric::Int(i32::MAX).checked_add(Numeric::Long(1)).unwrap(),
            Numeric::Long(i64::from(i32::MAX) + 1)
        );
    }

    #[test]
    fn repeated_long_overflows_without_iterating() {
        let err = Numeric::Long(i64::MAX)
            .checked_mul_count(i32::MAX as usize)
            .unwrap_err();
        assert!(matches!(err, FunctionError::Arithmetic(_)));
    }

    #[test]
    fn decimal_average_rounds_half_up_to_sum_scale() {
        let sum = parse_decimal("1900.10").unwrap();
        let avg = Numeric::Decimal(sum).average(3).unwrap();
        assert_eq!(avg, Numeric::Decimal(parse_decimal("633.37").unwrap()));
    }

    #[test]
    fn integer_average_truncates() {
        assert_eq!(Numeric::Int(7).average(2).unwrap(), Numeric::Int(3));
    }

    #[test]
    fn division_by_zero() {
        assert!(Numeric::Long(1)
            .apply(BinaryOp::Divide, Numeric::Int(0))
            .is_err());
        assert_eq!(
            Numeric::Double(1.0).apply(BinaryOp::Divide, Numeric::Int(0)).unwrap(),
            Numeric::Double(f64::INFINITY)
        );
    }
}
