//! Live mirror of inspected scalars, vectors and matrices.
//!
//! Slots are addressed by ids assigned before the program runs. Every
//! operation tolerates bad ids and coordinates: a debugger UI may issue
//! stale requests at any time, so those are logged and ignored instead of
//! failing the run.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

/// The content of one inspected cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Inspected {
    /// Never written since the slot was declared or reset.
    #[default]
    NullValue,
    /// Written, but with no value.
    Empty,
    Value(Value),
}

impl Inspected {
    pub fn is_null_value(&self) -> bool {
        matches!(self, Inspected::NullValue)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Inspected::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for Inspected {
    fn from(v: Value) -> Self {
        Inspected::Value(v)
    }
}

impl From<Option<Value>> for Inspected {
    fn from(v: Option<Value>) -> Self {
        v.map_or(Inspected::Empty, Inspected::Value)
    }
}

#[derive(Debug, Clone)]
struct VectorSlot {
    cells: Vec<Inspected>,
    last_mutated: Option<usize>,
}

impl VectorSlot {
    fn new(len: usize) -> Self {
        Self {
            cells: vec![Inspected::NullValue; len],
            last_mutated: None,
        }
    }

    fn reset(&mut self) {
        self.cells.fill(Inspected::NullValue);
        self.last_mutated = None;
    }

    fn set(&mut self, index: usize, value: Inspected) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) => {
                *cell = value;
                self.last_mutated = Some(index);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
struct MatrixSlot {
    rows: Vec<Option<Vec<Inspected>>>,
    columns: usize,
    last_mutated: Option<(usize, usize)>,
}

impl MatrixSlot {
    fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: vec![None; rows],
            columns,
            last_mutated: None,
        }
    }

    fn reset(&mut self) {
        for row in self.rows.iter_mut().flatten() {
            row.fill(Inspected::NullValue);
        }
        self.last_mutated = None;
    }

    fn set(&mut self, row: usize, column: usize, value: Inspected) -> bool {
        if column >= self.columns {
            return false;
        }
        let columns = self.columns;
        match self.rows.get_mut(row) {
            Some(slot) => {
                let cells = slot.get_or_insert_with(|| vec![Inspected::NullValue; columns]);
                cells[column] = value;
                self.last_mutated = Some((row, column));
                true
            }
            None => false,
        }
    }

    fn get(&self, row: usize, column: usize) -> Option<Inspected> {
        if row >= self.rows.len() || column >= self.columns {
            return None;
        }
        Some(
            self.rows[row]
                .as_ref()
                .map(|cells| cells[column].clone())
                .unwrap_or_default(),
        )
    }
}

#[derive(Debug, Default)]
struct Slots {
    scalars: Vec<Option<Inspected>>,
    vectors: Vec<Option<VectorSlot>>,
    matrices: Vec<Option<MatrixSlot>>,
}

/// Id-indexed inspection registries shared by the worker and the debugger.
#[derive(Debug, Default)]
pub struct InspectionSnapshot {
    slots: RwLock<Slots>,
}

impl InspectionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the three registries, discarding every declared slot.
    pub fn configure(&self, scalars: usize, vectors: usize, matrices: usize) {
        let mut slots = self.write();
        slots.scalars = vec![None; scalars];
        slots.vectors = vec![None; vectors];
        slots.matrices = vec![None; matrices];
    }

    pub fn capacity(&self) -> (usize, usize, usize) {
        let slots = self.read();
        (slots.scalars.len(), slots.vectors.len(), slots.matrices.len())
    }

    /// Zero every declared slot, keeping the slots themselves.
    pub fn reset(&self) {
        let mut slots = self.write();
        for scalar in slots.scalars.iter_mut().flatten() {
            *scalar = Inspected::NullValue;
        }
        for vector in slots.vectors.iter_mut().flatten() {
            vector.reset();
        }
        for matrix in slots.matrices.iter_mut().flatten() {
            matrix.reset();
        }
    }

    pub fn declare_scalar(&self, id: usize) {
        match self.write().scalars.get_mut(id) {
            Some(slot) => *slot = Some(Inspected::NullValue),
            None => warn!(id, "Invalid inspected scalar id"),
        }
    }

    pub fn declare_vector(&self, id: usize, len: usize) {
        match self.write().vectors.get_mut(id) {
            Some(slot) => *slot = Some(VectorSlot::new(len)),
            None => warn!(id, "Invalid inspected vector id"),
        }
    }

    pub fn declare_matrix(&self, id: usize, rows: usize, columns: usize) {
        match self.write().matrices.get_mut(id) {
            Some(slot) => *slot = Some(MatrixSlot::new(rows, columns)),
            None => warn!(id, "Invalid inspected matrix id"),
        }
    }

    pub fn write_scalar(&self, id: usize, value: impl Into<Inspected>) {
        match self.write().scalars.get_mut(id) {
            Some(slot) => *slot = Some(value.into()),
            None => warn!(id, "Invalid inspected scalar id"),
        }
    }

    pub fn write_vector(&self, id: usize, index: usize, value: impl Into<Inspected>) {
        let mut slots = self.write();
        match slots.vectors.get_mut(id) {
            Some(Some(vector)) => {
                if !vector.set(index, value.into()) {
                    warn!(id, index, "Ignoring out-of-range inspected vector write");
                }
            }
            Some(None) => warn!(id, "Inspected vector was never declared"),
            None => warn!(id, "Invalid inspected vector id"),
        }
    }

    pub fn write_matrix(&self, id: usize, row: usize, column: usize, value: impl Into<Inspected>) {
        let mut slots = self.write();
        match slots.matrices.get_mut(id) {
            Some(Some(matrix)) => {
                if !matrix.set(row, column, value.into()) {
                    warn!(id, row, column, "Ignoring out-of-range inspected matrix write");
                }
            }
            Some(None) => warn!(id, "Inspected matrix was never declared"),
            None => warn!(id, "Invalid inspected matrix id"),
        }
    }

    pub fn scalar(&self, id: usize) -> Inspected {
        match self.read().scalars.get(id) {
            Some(slot) => slot.clone().unwrap_or_default(),
            None => {
                warn!(id, "Invalid inspected scalar id");
                Inspected::NullValue
            }
        }
    }

    pub fn vector_value(&self, id: usize, index: usize) -> Inspected {
        let slots = self.read();
        match slots.vectors.get(id) {
            Some(Some(vector)) => match vector.cells.get(index) {
                Some(cell) => cell.clone(),
                None => {
                    warn!(id, index, "Invalid index reading inspected vector");
                    Inspected::NullValue
                }
            },
            Some(None) => Inspected::NullValue,
            None => {
                warn!(id, "Invalid inspected vector id");
                Inspected::NullValue
            }
        }
    }

    /// Value at the most recently written index of vector `id`.
    pub fn vector_last_value(&self, id: usize) -> Inspected {
        match self.last_vector_index(id) {
            Some(index) => self.vector_value(id, index),
            None => Inspected::NullValue,
        }
    }

    pub fn last_vector_index(&self, id: usize) -> Option<usize> {
        self.read()
            .vectors
            .get(id)
            .and_then(Option::as_ref)
            .and_then(|vector| vector.last_mutated)
    }

    pub fn vector_len(&self, id: usize) -> usize {
        self.read()
            .vectors
            .get(id)
            .and_then(Option::as_ref)
            .map_or(0, |vector| vector.cells.len())
    }

    pub fn matrix_value(&self, id: usize, row: usize, column: usize) -> Inspected {
        let slots = self.read();
        match slots.matrices.get(id) {
            Some(Some(matrix)) => matrix.get(row, column).unwrap_or_else(|| {
                warn!(id, row, column, "Invalid position reading inspected matrix");
                Inspected::NullValue
            }),
            Some(None) => Inspected::NullValue,
            None => {
                warn!(id, "Invalid inspected matrix id");
                Inspected::NullValue
            }
        }
    }

    /// Value at the most recently written cell of matrix `id`.
    pub fn matrix_last_value(&self, id: usize) -> Inspected {
        match self.last_matrix_position(id) {
            Some((row, column)) => self.matrix_value(id, row, column),
            None => Inspected::NullValue,
        }
    }

    pub fn last_matrix_position(&self, id: usize) -> Option<(usize, usize)> {
        self.read()
            .matrices
            .get(id)
            .and_then(Option::as_ref)
            .and_then(|matrix| matrix.last_mutated)
    }

    /// `(rows, columns)` of matrix `id`, or `(0, 0)` when undeclared.
    pub fn matrix_shape(&self, id: usize) -> (usize, usize) {
        self.read()
            .matrices
            .get(id)
            .and_then(Option::as_ref)
            .map_or((0, 0), |matrix| (matrix.rows.len(), matrix.columns))
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> InspectionSnapshot {
        let snapshot = InspectionSnapshot::new();
        snapshot.configure(2, 2, 2);
        snapshot
    }

    #[test]
    fn test_configure_sets_capacity() {
        let snap = InspectionSnapshot::new();
        assert_eq!(snap.capacity(), (0, 0, 0));
        snap.configure(3, 1, 2);
        assert_eq!(snap.capacity(), (3, 1, 2));
    }

    #[test]
    fn test_vector_last_mutated() {
        let snap = snapshot();
        snap.declare_vector(0, 4);
        snap.write_vector(0, 3, Value::Integer(9));
        assert_eq!(snap.last_vector_index(0), Some(3));

        snap.write_vector(0, 4, Value::Integer(1));
        assert_eq!(snap.last_vector_index(0), Some(3));
        assert_eq!(snap.vector_last_value(0), Inspected::Value(Value::Integer(9)));
    }

    #[test]
    fn test_unwritten_scalar_distinct_from_empty() {
        let snap = snapshot();
        snap.declare_scalar(0);
        snap.declare_scalar(1);
        snap.write_scalar(1, None::<Value>);

        assert_eq!(snap.scalar(0), Inspected::NullValue);
        assert_eq!(snap.scalar(1), Inspected::Empty);
        assert_ne!(snap.scalar(0), snap.scalar(1));
    }

    #[test]
    fn test_invalid_ids_are_ignored() {
        let snap = snapshot();
        snap.declare_scalar(5);
        snap.declare_vector(9, 3);
        snap.write_vector(9, 0, Value::Integer(1));
        snap.write_matrix(7, 0, 0, Value::Integer(1));

        assert!(snap.scalar(5).is_null_value());
        assert!(snap.vector_value(9, 0).is_null_value());
        assert_eq!(snap.last_vector_index(9), None);
        assert_eq!(snap.matrix_shape(7), (0, 0));
    }

    #[test]
    fn test_redeclare_replaces_slot() {
        let snap = snapshot();
        snap.declare_vector(1, 2);
        snap.write_vector(1, 1, Value::Boolean(true));
        snap.declare_vector(1, 6);
        assert_eq!(snap.vector_len(1), 6);
        assert_eq!(snap.last_vector_index(1), None);
        assert!(snap.vector_value(1, 1).is_null_value());
    }

    #[test]
    fn test_matrix_rows_allocated_lazily() {
        let snap = snapshot();
        snap.declare_matrix(0, 3, 2);
        snap.write_matrix(0, 2, 1, Value::Real(1.5));
        assert_eq!(snap.last_matrix_position(0), Some((2, 1)));
        assert_eq!(snap.matrix_value(0, 2, 1), Inspected::Value(Value::Real(1.5)));
        // row 0 never touched
        assert!(snap.matrix_value(0, 0, 0).is_null_value());

        snap.write_matrix(0, 3, 0, Value::Real(0.0));
        snap.write_matrix(0, 0, 2, Value::Real(0.0));
        assert_eq!(snap.last_matrix_position(0), Some((2, 1)));
        assert_eq!(snap.matrix_last_value(0), Inspected::Value(Value::Real(1.5)));
    }

    #[test]
    fn test_reset_keeps_slot_identity() {
        let snap = snapshot();
        snap.declare_scalar(0);
        snap.declare_vector(0, 3);
        snap.declare_matrix(1, 2, 2);
        snap.write_scalar(0, Value::Text("hi".into()));
        snap.write_vector(0, 2, Value::Integer(5));
        snap.write_matrix(1, 1, 1, Value::Character('z'));

        snap.reset();

        assert!(snap.scalar(0).is_null_value());
        assert_eq!(snap.vector_len(0), 3);
        assert_eq!(snap.last_vector_index(0), None);
        assert!(snap.vector_value(0, 2).is_null_value());
        assert_eq!(snap.matrix_shape(1), (2, 2));
        assert_eq!(snap.last_matrix_position(1), None);
        assert!(snap.matrix_value(1, 1, 1).is_null_value());
    }
}
