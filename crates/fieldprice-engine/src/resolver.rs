//! Cross-field dependency resolution.
//!
//! An edge `A -> B` exists when A's formula mentions `field{B}` as a whole
//! identifier. The graph is rebuilt lazily from the snapshot and walked
//! depth-first with an explicit recursion stack; nodes whose subtree has been
//! fully walked are memoized for the lifetime of the resolver.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use fieldprice_core::constant::EventConstant;
use fieldprice_core::field::CustomField;
use fieldprice_core::variable::{parse_field_reference, FormulaVariable, VariableMap};
use fieldprice_core::{ConstantId, FieldId};
use fieldprice_formula::{Expr, FormulaCache};
use tracing::debug;

use crate::catalog::local_variables;
use crate::constants::global_variables;
use crate::error::ResolveError;
use crate::export::exported_variable;

type Result<T> = std::result::Result<T, ResolveError>;

/// Read-only view over the fields and constants of one event.
///
/// The memo uses interior mutability, so a resolver is not `Sync`. Build one
/// per request; the formula cache may be shared between them.
#[derive(Debug)]
pub struct DependencyResolver {
    fields: BTreeMap<FieldId, CustomField>,
    constants: Vec<EventConstant>,
    cache: Arc<FormulaCache>,
    /// Transitive dependencies (post-order) of every fully walked field.
    walked: RefCell<HashMap<FieldId, Rc<Vec<FieldId>>>>,
}

impl DependencyResolver {
    /// Creates a resolver with its own formula cache.
    pub fn new(fields: impl IntoIterator<Item = CustomField>, constants: Vec<EventConstant>) -> Self {
        Self::with_cache(fields, constants, Arc::new(FormulaCache::new()))
    }

    /// Creates a resolver that compiles formulas through `cache`.
    pub fn with_cache(
        fields: impl IntoIterator<Item = CustomField>,
        constants: Vec<EventConstant>,
        cache: Arc<FormulaCache>,
    ) -> Self {
        Self {
            fields: fields.into_iter().map(|f| (f.id, f)).collect(),
            constants,
            cache,
            walked: RefCell::new(HashMap::new()),
        }
    }

    /// Returns a fresh resolver over the same snapshot with the formula of
    /// `field` replaced by `candidate`. A blank candidate removes the formula.
    pub fn with_formula(&self, field: FieldId, candidate: &str) -> Result<Self> {
        let mut fields = self.fields.clone();
        let target = fields.get_mut(&field).ok_or(ResolveError::UnknownField(field))?;
        target.formula = Some(candidate.to_string());
        Ok(Self {
            fields,
            constants: self.constants.clone(),
            cache: Arc::clone(&self.cache),
            walked: RefCell::new(HashMap::new()),
        })
    }

    pub fn cache(&self) -> &Arc<FormulaCache> {
        &self.cache
    }

    /// Looks up a field, failing with [`ResolveError::UnknownField`].
    pub fn field(&self, id: FieldId) -> Result<&CustomField> {
        self.fields.get(&id).ok_or(ResolveError::UnknownField(id))
    }

    /// All fields in id order.
    pub fn fields(&self) -> impl Iterator<Item = &CustomField> {
        self.fields.values()
    }

    pub fn constants(&self) -> &[EventConstant] {
        &self.constants
    }

    pub fn constant(&self, id: ConstantId) -> Option<&EventConstant> {
        self.constants.iter().find(|c| c.id == id)
    }

    /// Compiled formula of `field`, or `None` if it has none.
    pub fn formula(&self, field: &CustomField) -> Result<Option<Arc<Expr>>> {
        let Some(text) = field.formula() else {
            return Ok(None);
        };
        self.cache
            .compile(text)
            .map(Some)
            .map_err(|source| ResolveError::Formula {
                field: field.id,
                source,
            })
    }

    /// Variables every formula of the event can see: the event constants and
    /// the exports of all formula-bearing fields except `field` itself.
    pub fn imported_variables_for(&self, field: FieldId) -> VariableMap {
        let mut vars = global_variables(&self.constants);
        for other in self.fields.values().filter(|f| f.id != field) {
            if let Some(var) = exported_variable(other) {
                vars.insert(var.name.clone(), var);
            }
        }
        vars
    }

    /// Local, global and imported variables usable in `field`'s formula.
    ///
    /// Does not check the graph for cycles.
    pub fn usable_variables_for(&self, field: FieldId) -> Result<VariableMap> {
        let mut vars = local_variables(self.field(field)?)?;
        vars.extend(self.imported_variables_for(field));
        Ok(vars)
    }

    /// The usable variables that `field`'s formula actually mentions, in
    /// order of first occurrence.
    pub fn used_variables(&self, field: FieldId) -> Result<Vec<FormulaVariable>> {
        let target = self.field(field)?;
        let Some(expr) = self.formula(target)? else {
            return Ok(Vec::new());
        };
        let usable = self.usable_variables_for(field)?;
        Ok(expr
            .variables()
            .into_iter()
            .filter_map(|name| usable.get(name).cloned())
            .collect())
    }

    /// Field ids mentioned as `field{id}` in `field`'s formula, in order of
    /// first occurrence. The ids are not checked for existence.
    pub fn direct_references(&self, field: FieldId) -> Result<Vec<FieldId>> {
        let target = self.field(field)?;
        let Some(expr) = self.formula(target)? else {
            return Ok(Vec::new());
        };
        Ok(expr
            .variables()
            .into_iter()
            .filter_map(parse_field_reference)
            .collect())
    }

    /// The fields `field`'s formula references directly.
    ///
    /// The whole graph reachable from `field` is walked first, so this fails
    /// on any cycle below it.
    pub fn dependencies_for(&self, field: FieldId) -> Result<Vec<&CustomField>> {
        self.walk(field, &mut Vec::new())?;
        self.direct_references(field)?
            .into_iter()
            .map(|id| self.field(id))
            .collect()
    }

    /// Every field `field` needs, dependencies before dependents, without
    /// `field` itself.
    pub fn transitive_dependencies_for(&self, field: FieldId) -> Result<Vec<FieldId>> {
        let deps = self.walk(field, &mut Vec::new())?;
        Ok(deps.as_ref().clone())
    }

    /// Topological order of all formula-bearing fields.
    pub fn evaluation_order(&self) -> Result<Vec<FieldId>> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        for field in self.fields.values().filter(|f| f.has_formula()) {
            let deps = self.walk(field.id, &mut Vec::new())?;
            for &id in deps.iter().chain(std::iter::once(&field.id)) {
                if seen.insert(id) && self.fields.get(&id).is_some_and(CustomField::has_formula) {
                    order.push(id);
                }
            }
        }
        debug!(fields = order.len(), "computed evaluation order");
        Ok(order)
    }

    /// Fields whose formula references `field` directly, in id order.
    pub fn all_depending_on(&self, field: FieldId) -> Result<Vec<&CustomField>> {
        let mut dependents = Vec::new();
        for candidate in self.fields.values().filter(|f| f.has_formula()) {
            if self.direct_references(candidate.id)?.contains(&field) {
                dependents.push(candidate);
            }
        }
        Ok(dependents)
    }

    fn walk(&self, field: FieldId, stack: &mut Vec<FieldId>) -> Result<Rc<Vec<FieldId>>> {
        if let Some(done) = self.walked.borrow().get(&field) {
            return Ok(Rc::clone(done));
        }

        stack.push(field);
        let mut deps: Vec<FieldId> = Vec::new();
        for next in self.direct_references(field)? {
            if !self.fields.contains_key(&next) {
                return Err(ResolveError::DanglingReference {
                    field,
                    referenced: next,
                });
            }
            if stack.contains(&next) {
                debug!(field, referenced = next, "dependency cycle");
                return Err(ResolveError::CircularDependency { a: next, b: field });
            }
            let below = self.walk(next, stack)?;
            for &id in below.iter().chain(std::iter::once(&next)) {
                if !deps.contains(&id) {
                    deps.push(id);
                }
            }
        }
        stack.pop();

        let deps = Rc::new(deps);
        self.walked.borrow_mut().insert(field, Rc::clone(&deps));
        Ok(deps)
    }
}
