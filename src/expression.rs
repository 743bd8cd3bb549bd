// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::nodes::{ExternalParameter, Node, TypeError};
use crate::ops;
use crate::plugins::PluginRegistry;
use crate::tolerance::{ComparisonTolerance, ToleranceKey, ToleranceKind};
use crate::types::{SupportedTypes, ValueType};
use crate::value::Value;
use crate::vm::{ExprVm, Program, ProgramBuilder, VmError};

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;
use thiserror::Error;

/// Why an evaluation fell back to the source text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("expression was not recognized")]
    Unrecognized,

    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("argument `{name}` cannot be used as {supported:?}: {value}")]
    Argument {
        name: String,
        supported: SupportedTypes,
        value: Value,
    },

    #[error("no value for parameter `{0}`")]
    MissingData(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Vm(#[from] VmError),
}

/// Named lookup of parameter values.
pub trait DataFinder {
    fn find(&self, name: &str) -> Option<Value>;
}

impl<S: BuildHasher> DataFinder for HashMap<String, Value, S> {
    fn find(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl DataFinder for BTreeMap<String, Value> {
    fn find(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Adapts a closure into a [`DataFinder`].
pub struct FinderFn<F>(pub F);

impl<F: Fn(&str) -> Option<Value>> DataFinder for FinderFn<F> {
    fn find(&self, name: &str) -> Option<Value> {
        (self.0)(name)
    }
}

#[derive(Debug)]
struct Body {
    root: Node,
    params: Vec<ExternalParameter>,
    /// Precomputed value of a fully constant expression.
    constant: Option<Value>,
}

/// Argument types and honored tolerance a program was lowered for.
type LoweringKey = (Vec<ValueType>, Option<ToleranceKey>);

/// The result of compiling an expression.
///
/// Evaluation never fails: whatever goes wrong, the source text is returned
/// instead. Use [`CompiledExpression::try_evaluate`] to see the reason.
#[derive(Debug)]
pub struct CompiledExpression {
    source: String,
    body: Option<Body>,
    plugins: Arc<PluginRegistry>,
    lowered: Mutex<HashMap<LoweringKey, Arc<Program>>>,
}

impl CompiledExpression {
    pub(crate) fn new(
        source: &str,
        root: Node,
        params: Vec<ExternalParameter>,
        plugins: Arc<PluginRegistry>,
    ) -> Self {
        let constant = match &root {
            Node::Constant { value, .. } if params.is_empty() => Some(value.clone()),
            _ => None,
        };
        Self {
            source: source.to_string(),
            body: Some(Body {
                root,
                params,
                constant,
            }),
            plugins,
            lowered: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn unrecognized(source: &str, plugins: Arc<PluginRegistry>) -> Self {
        Self {
            source: source.to_string(),
            body: None,
            plugins,
            lowered: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_recognized(&self) -> bool {
        self.body.is_some()
    }

    pub fn is_constant(&self) -> bool {
        self.body.as_ref().is_some_and(|b| b.constant.is_some())
    }

    /// Whether a tolerance can change the result.
    pub fn is_tolerant(&self) -> bool {
        self.body.as_ref().is_some_and(|b| b.root.is_tolerant())
    }

    /// Whether the expression is a bare parameter, so evaluating it may
    /// just hand back the argument.
    pub fn possible_pass_through(&self) -> bool {
        self.body
            .as_ref()
            .is_some_and(|b| matches!(b.root, Node::Parameter { .. }))
    }

    pub fn parameters(&self) -> &[ExternalParameter] {
        match &self.body {
            Some(body) => &body.params,
            None => &[],
        }
    }

    /// Parameter names in argument order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters().iter().map(|p| p.name.as_str()).collect()
    }

    /// Result type when the arguments have their preferred types.
    pub fn returns(&self) -> ValueType {
        match &self.body {
            Some(body) => body.root.returns(&body.params),
            None => ValueType::String,
        }
    }

    pub fn evaluate(&self, args: &[Value]) -> Value {
        self.evaluate_or_source(args, None)
    }

    pub fn evaluate_with_tolerance(&self, args: &[Value], tolerance: &ComparisonTolerance) -> Value {
        self.evaluate_or_source(args, Some(tolerance))
    }

    pub fn evaluate_with_finder(&self, finder: &dyn DataFinder) -> Value {
        self.evaluate_with_finder_and_tolerance(finder, None)
    }

    pub fn evaluate_with_finder_and_tolerance(
        &self,
        finder: &dyn DataFinder,
        tolerance: Option<&ComparisonTolerance>,
    ) -> Value {
        match self.collect(finder) {
            Ok(args) => self.evaluate_or_source(&args, tolerance),
            Err(err) => self.degrade(&err),
        }
    }

    fn collect(&self, finder: &dyn DataFinder) -> Result<Vec<Value>, EvaluationError> {
        self.parameters()
            .iter()
            .map(|p| {
                finder
                    .find(&p.name)
                    .ok_or_else(|| EvaluationError::MissingData(p.name.clone()))
            })
            .collect()
    }

    fn evaluate_or_source(&self, args: &[Value], tolerance: Option<&ComparisonTolerance>) -> Value {
        match self.try_evaluate(args, tolerance) {
            Ok(value) => value,
            Err(err) => self.degrade(&err),
        }
    }

    fn degrade(&self, err: &EvaluationError) -> Value {
        if !matches!(err, EvaluationError::Unrecognized) {
            warn!("`{}` evaluates to its source text: {err}", self.source);
        }
        Value::from(self.source.as_str())
    }

    /// Evaluate against positional arguments, reporting failures instead of
    /// returning the source text.
    pub fn try_evaluate(
        &self,
        args: &[Value],
        tolerance: Option<&ComparisonTolerance>,
    ) -> Result<Value, EvaluationError> {
        let body = self.body.as_ref().ok_or(EvaluationError::Unrecognized)?;
        if args.len() != body.params.len() {
            return Err(EvaluationError::ArgumentCount {
                expected: body.params.len(),
                actual: args.len(),
            });
        }
        if let Some(value) = &body.constant {
            return Ok(value.clone());
        }

        let args = body
            .params
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                ops::coerce(arg, param.supported, &self.plugins).ok_or_else(|| {
                    EvaluationError::Argument {
                        name: param.name.clone(),
                        supported: param.supported,
                        value: arg.clone(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tolerance = tolerance.filter(|_| body.root.is_tolerant());
        let kind = tolerance.and_then(ComparisonTolerance::honored);
        let types: Vec<ValueType> = args.iter().map(Value::value_type).collect();

        let program = if body.root.requires_preserved_expression() {
            Arc::new(self.lower(body, &types, kind)?)
        } else {
            let key = (types, tolerance.and_then(ComparisonTolerance::key));
            let mut lowered = self.lowered.lock();
            if let Some(program) = lowered.get(&key).cloned() {
                program
            } else {
                let program = Arc::new(self.lower(body, &key.0, kind)?);
                lowered.insert(key, program.clone());
                program
            }
        };

        Ok(ExprVm::new(&program, &self.plugins).execute(&args)?)
    }

    /// Lower the tree for arguments of the given types.
    fn lower(
        &self,
        body: &Body,
        types: &[ValueType],
        tolerance: Option<ToleranceKind>,
    ) -> Result<Program, EvaluationError> {
        let mut root = body.root.clone();
        let mut params = body.params.clone();
        for (param, t) in params.iter_mut().zip(types) {
            param.supported = SupportedTypes::of(*t);
        }

        root.refresh(&params)?;
        let target = root.costs(&params).preferred().ok_or_else(|| {
            TypeError::NotLogicallyValid(format!("no result type for {types:?}"))
        })?;
        root.determine_strongly(target, &mut params)?;

        let mut builder = ProgramBuilder::new();
        let result = root.lower(target, &params, &mut builder)?;
        let program = builder.finish(result, tolerance);
        debug!("lowered `{}` for {types:?} as {target}:\n{program}", self.source);
        Ok(program)
    }
}
