//! Builder selection by declared type, and row-subset helpers built on it.

use vecq_core::prelude::*;
use vecq_mem::BufferAllocator;

use crate::builder::{
    BooleanVectorBuilder, DecimalVectorBuilder, DoubleVectorBuilder, FloatVectorBuilder,
    IntVectorBuilder, LongVectorBuilder, ObjectVectorBuilder, ValueVectorBuilder,
};
use crate::filter::RowFilter;
use crate::mutable::MutableValueVector;
use crate::tuple_builder::TupleVectorBuilder;

/// Creates builders that draw their storage from one allocator.
#[derive(Debug, Clone, Default)]
pub struct VectorFactory {
    allocator: BufferAllocator,
}

impl VectorFactory {
    pub fn new(allocator: BufferAllocator) -> Self {
        Self { allocator }
    }

    pub fn allocator(&self) -> &BufferAllocator {
        &self.allocator
    }

    /// Typed builder for `ty`; every non-primitive type gets the object builder.
    pub fn builder(&self, ty: &ResolvedType) -> Box<dyn ValueVectorBuilder> {
        let alloc = &self.allocator;
        match ty.storage() {
            StorageKind::Boolean => Box::new(BooleanVectorBuilder::new(alloc)),
            StorageKind::Int => Box::new(IntVectorBuilder::new(alloc)),
            StorageKind::Long => Box::new(LongVectorBuilder::new(alloc)),
            StorageKind::Float => Box::new(FloatVectorBuilder::new(alloc)),
            StorageKind::Double => Box::new(DoubleVectorBuilder::new(alloc)),
            StorageKind::Decimal => Box::new(DecimalVectorBuilder::new(alloc)),
            StorageKind::Object => Box::new(ObjectVectorBuilder::with_type(alloc, ty.clone())),
        }
    }

    pub fn mutable(&self, ty: ResolvedType) -> MutableValueVector {
        MutableValueVector::new(&self.allocator, ty)
    }

    pub fn tuple_builder(&self) -> TupleVectorBuilder {
        TupleVectorBuilder::new(&self.allocator)
    }

    /// The given rows of `vector`, in order. Literal inputs stay literal.
    pub fn take(&self, vector: &ValueVector, rows: &[usize]) -> Result<ValueVector> {
        if let Some(value) = vector.literal_value() {
            return ValueVector::literal(value.clone(), vector.ty().clone(), rows.len());
        }
        let mut builder = self.builder(vector.ty());
        for &row in rows {
            builder.copy_row(vector, row)?;
        }
        builder.build()
    }

    pub fn take_tuple(&self, tuple: &TupleVector, rows: &[usize]) -> Result<TupleVector> {
        if tuple.column_count() == 0 {
            return Ok(TupleVector::with_row_count(tuple.schema().clone(), rows.len()));
        }
        let columns = tuple
            .columns()
            .iter()
            .map(|column| self.take(column, rows))
            .collect::<Result<Vec<_>>>()?;
        TupleVector::of(tuple.schema().clone(), columns)
    }

    pub fn filter_tuple(&self, tuple: &TupleVector, filter: RowFilter<'_>) -> Result<TupleVector> {
        filter.check_size(tuple.row_count())?;
        self.take_tuple(tuple, &filter.selected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_matches_storage() {
        let factory = VectorFactory::default();
        assert_eq!(factory.builder(&ResolvedType::Float).ty(), &ResolvedType::Float);
        let nested = ResolvedType::array(ResolvedType::Int);
        assert_eq!(factory.builder(&nested).ty(), &nested);
    }

    #[test]
    fn take_keeps_literals_literal() {
        let factory = VectorFactory::default();
        let lit = ValueVector::literal_string("x", 10);
        let taken = factory.take(&lit, &[1, 5, 9]).unwrap();
        assert!(taken.is_literal());
        assert_eq!(taken.size(), 3);
    }

    #[test]
    fn filter_tuple_selects_masked_rows() {
        let factory = VectorFactory::default();
        let values = ValueVector::from_values(
            ResolvedType::Int,
            vec![Value::Int(1), Value::Int(2), Value::Null, Value::Int(4)],
        )
        .unwrap();
        let tuple = TupleVector::of(Schema::of([("n", ResolvedType::Int)]), vec![values]).unwrap();
        let bits = BitSet::from_bools(&[true, false, true, true]);
        let out = factory.filter_tuple(&tuple, RowFilter::Bits(&bits)).unwrap();
        assert_eq!(out.row_count(), 3);
        let col = out.column(0).unwrap();
        assert_eq!(col.get_int(0), 1);
        assert!(col.is_null(1));
        assert_eq!(col.get_int(2), 4);
    }
}
