//! In-memory capability implementations.
//!
//! Small, complete implementations of every capability trait, for embedding
//! the kernel without a storage engine and for tests:
//! - [`MemoryReferences`]: a single row of named columns, writable
//! - [`MemoryVariables`]: declared procedural variables
//! - [`MemoryGroup`]: a GROUP BY group of rows
//! - [`AllowAll`] / [`ExecuteGrants`]: authorizers

use std::cell::RefCell;

use rustc_hash::FxHashSet;
use tess_ir::ObjectName;
use tess_value::{SqlType, Value};

use crate::errors::{incompatible_assignment, read_only_reference, row_out_of_range, EvalResult};
use crate::{Authorizer, EvalEnv, GroupResolver, ReferenceResolver, Variable, VariableResolver};

/// A declared column: name, type and current value.
#[derive(Clone, Debug, PartialEq)]
struct Column {
    name: ObjectName,
    column_type: SqlType,
    value: Value,
}

/// One row of named values.
///
/// Every column is writable through `ReferenceAssign`; values are cast to the
/// column type on assignment.
#[derive(Clone, Debug, Default)]
pub struct MemoryReferences {
    columns: RefCell<Vec<Column>>,
}

impl MemoryReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column typed after its value.
    #[must_use]
    pub fn with(self, name: impl Into<ObjectName>, value: impl Into<Value>) -> Self {
        let value = value.into();
        let column_type = value.sql_type();
        self.with_typed(name, column_type, value)
    }

    /// Add a column with an explicit type.
    #[must_use]
    pub fn with_typed(
        self,
        name: impl Into<ObjectName>,
        column_type: SqlType,
        value: impl Into<Value>,
    ) -> Self {
        self.columns.borrow_mut().push(Column {
            name: name.into(),
            column_type,
            value: value.into(),
        });
        self
    }

    /// Current value of `name`, matched exactly.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.resolve_reference(&ObjectName::parse(name), false)
    }

    fn position(&self, name: &ObjectName, ignore_case: bool) -> Option<usize> {
        self.columns
            .borrow()
            .iter()
            .position(|column| column.name.matches(name, ignore_case))
    }
}

impl ReferenceResolver for MemoryReferences {
    fn resolve_type(&self, name: &ObjectName, ignore_case: bool) -> Option<SqlType> {
        let index = self.position(name, ignore_case)?;
        Some(self.columns.borrow()[index].column_type.clone())
    }

    fn resolve_reference(&self, name: &ObjectName, ignore_case: bool) -> Option<Value> {
        let index = self.position(name, ignore_case)?;
        Some(self.columns.borrow()[index].value.clone())
    }

    fn assign_reference(
        &self,
        name: &ObjectName,
        value: Value,
        ignore_case: bool,
    ) -> EvalResult<Value> {
        let index = self
            .position(name, ignore_case)
            .ok_or_else(|| read_only_reference(name))?;
        let mut columns = self.columns.borrow_mut();
        let column = &mut columns[index];
        if !value.is_assignable_to(&column.column_type) {
            return Err(incompatible_assignment(
                &column.name.full_name(),
                &column.column_type,
                value.sql_type(),
            ));
        }
        column.value = value.cast_to(&column.column_type)?;
        Ok(column.value.clone())
    }
}

/// A declared procedural variable held in memory.
#[derive(Debug)]
pub struct MemoryVariable {
    name: String,
    var_type: SqlType,
    value: RefCell<Value>,
}

impl MemoryVariable {
    pub fn new(name: impl Into<String>, var_type: SqlType, value: impl Into<Value>) -> Self {
        MemoryVariable {
            name: name.into(),
            var_type,
            value: RefCell::new(value.into()),
        }
    }

    /// Current value, without going through an environment.
    pub fn get(&self) -> Value {
        self.value.borrow().clone()
    }
}

impl Variable for MemoryVariable {
    fn name(&self) -> &str {
        &self.name
    }

    fn var_type(&self) -> SqlType {
        self.var_type.clone()
    }

    fn evaluate(&self, _env: &EvalEnv<'_>) -> EvalResult<Value> {
        Ok(self.get())
    }

    /// Values are cast to the declared type before they are stored.
    fn set_value(&self, value: Value, _env: &EvalEnv<'_>) -> EvalResult<Value> {
        if !value.is_assignable_to(&self.var_type) {
            return Err(incompatible_assignment(
                &format!(":{}", self.name),
                &self.var_type,
                value.sql_type(),
            ));
        }
        let stored = value.cast_to(&self.var_type)?;
        *self.value.borrow_mut() = stored.clone();
        Ok(stored)
    }
}

/// A set of declared variables.
#[derive(Debug, Default)]
pub struct MemoryVariables {
    variables: Vec<MemoryVariable>,
}

impl MemoryVariables {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn declare(
        mut self,
        name: impl Into<String>,
        var_type: SqlType,
        value: impl Into<Value>,
    ) -> Self {
        self.variables
            .push(MemoryVariable::new(name, var_type, value));
        self
    }

    /// Declared variable `name`, matched exactly.
    pub fn get(&self, name: &str) -> Option<&MemoryVariable> {
        self.variables.iter().find(|var| var.name == name)
    }
}

impl VariableResolver for MemoryVariables {
    fn resolve_variable(&self, name: &str, ignore_case: bool) -> Option<&dyn Variable> {
        self.variables
            .iter()
            .find(|var| {
                if ignore_case {
                    var.name.eq_ignore_ascii_case(name)
                } else {
                    var.name == name
                }
            })
            .map(|var| var as &dyn Variable)
    }
}

/// A GROUP BY group: column names plus rows of values in group order.
#[derive(Clone, Debug, Default)]
pub struct MemoryGroup {
    columns: Vec<ObjectName>,
    rows: Vec<Vec<Value>>,
}

impl MemoryGroup {
    pub fn new(columns: impl IntoIterator<Item = impl Into<ObjectName>>) -> Self {
        MemoryGroup {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// A one-column group with one row per value.
    pub fn column(
        name: impl Into<ObjectName>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        MemoryGroup {
            columns: vec![name.into()],
            rows: values.into_iter().map(|value| vec![value.into()]).collect(),
        }
    }

    /// Append a row. Missing trailing values read as `NULL`.
    #[must_use]
    pub fn row(mut self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.rows.push(values.into_iter().map(Into::into).collect());
        self
    }

    fn column_index(&self, name: &ObjectName, ignore_case: bool) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.matches(name, ignore_case))
    }

    fn value(&self, row: usize, column: usize) -> Value {
        self.rows
            .get(row)
            .and_then(|values| values.get(column))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

/// One row of a [`MemoryGroup`], as a read-only reference resolver.
struct GroupRow<'g> {
    group: &'g MemoryGroup,
    row: usize,
}

impl ReferenceResolver for GroupRow<'_> {
    fn resolve_type(&self, name: &ObjectName, ignore_case: bool) -> Option<SqlType> {
        self.resolve_reference(name, ignore_case)
            .map(|value| value.sql_type())
    }

    fn resolve_reference(&self, name: &ObjectName, ignore_case: bool) -> Option<Value> {
        let column = self.group.column_index(name, ignore_case)?;
        Some(self.group.value(self.row, column))
    }
}

impl GroupResolver for MemoryGroup {
    fn size(&self) -> usize {
        self.rows.len()
    }

    fn row_resolver(&self, row: usize) -> EvalResult<Box<dyn ReferenceResolver + '_>> {
        if row >= self.rows.len() {
            return Err(row_out_of_range(row, self.rows.len()));
        }
        Ok(Box::new(GroupRow { group: self, row }))
    }

    fn resolve_reference(&self, name: &ObjectName, row: usize, ignore_case: bool) -> Option<Value> {
        if row >= self.rows.len() {
            return None;
        }
        let column = self.column_index(name, ignore_case)?;
        Some(self.value(row, column))
    }
}

/// Grants execute privilege on every method.
#[derive(Copy, Clone, Debug, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn can_execute(&self, _method: &ObjectName) -> bool {
        true
    }
}

/// Grants execute privilege on an explicit set of methods.
///
/// Grants match the full method name, ignoring case.
#[derive(Clone, Debug, Default)]
pub struct ExecuteGrants {
    granted: FxHashSet<String>,
}

impl ExecuteGrants {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn grant(mut self, method: impl Into<ObjectName>) -> Self {
        self.granted
            .insert(method.into().full_name().to_ascii_lowercase());
        self
    }
}

impl Authorizer for ExecuteGrants {
    fn can_execute(&self, method: &ObjectName) -> bool {
        self.granted
            .contains(&method.full_name().to_ascii_lowercase())
    }
}
