use std::sync::Arc;

use gconst_types::Name;
use thiserror::Error;

use crate::plan::FieldPlan;
use crate::value::{Record, Value};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("target must be a record, got {found}")]
    NotARecord { found: &'static str },
    #[error("plan was built for '{expected}' but target is '{found}'")]
    TypeMismatch { expected: Name, found: Name },
}

/// Fills empty fields of a target from a fixed donor.
pub trait Merger: Send + Sync {
    fn merge(&self, target: &mut Value) -> Result<(), ApplyError>;
}

/// Clears fields of a subject that equal a fixed reference.
pub trait Reducer: Send + Sync {
    fn reduce(&self, subject: &mut Value) -> Result<(), ApplyError>;
}

impl FieldPlan {
    /// Checks the precondition shared by both executors: the target is a
    /// record of the type the plan was built from.
    pub(crate) fn target_record<'v>(&self, target: &'v mut Value) -> Result<&'v mut Record, ApplyError> {
        let found = target.kind();
        let record = target
            .as_record_mut()
            .ok_or(ApplyError::NotARecord { found })?;
        if record.type_name != self.type_name {
            return Err(ApplyError::TypeMismatch {
                expected: self.type_name.clone(),
                found: record.type_name.clone(),
            });
        }
        Ok(record)
    }
}

impl Merger for FieldPlan {
    fn merge(&self, target: &mut Value) -> Result<(), ApplyError> {
        self.merge_into(target)
    }
}

impl Reducer for FieldPlan {
    fn reduce(&self, subject: &mut Value) -> Result<(), ApplyError> {
        self.reduce_from(subject)
    }
}

impl<T: Merger + ?Sized> Merger for Arc<T> {
    fn merge(&self, target: &mut Value) -> Result<(), ApplyError> {
        (**self).merge(target)
    }
}

impl<T: Reducer + ?Sized> Reducer for Arc<T> {
    fn reduce(&self, subject: &mut Value) -> Result<(), ApplyError> {
        (**self).reduce(subject)
    }
}

impl<T: Merger + ?Sized> Merger for Box<T> {
    fn merge(&self, target: &mut Value) -> Result<(), ApplyError> {
        (**self).merge(target)
    }
}

impl<T: Reducer + ?Sized> Reducer for Box<T> {
    fn reduce(&self, subject: &mut Value) -> Result<(), ApplyError> {
        (**self).reduce(subject)
    }
}
