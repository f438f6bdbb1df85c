//! Deferred, memoized aggregation requests.
//!
//! A [`Request`] binds one source to an ordered list of aggregates and runs
//! nothing until a result is read. The first read executes the underlying
//! [`Plan`] (one traversal of the source), caches the [`Outcome`], and every
//! later read is served from that cache.
//!
//! The `Out` parameter is the tuple of output types, in registration order.
//! It grows with every [`add`](Request::add), so results come back typed.

use std::any::Any;
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::core::{DynFactory, Error, Result, SinkFactory};
use crate::driver::{DriverConfig, FanOut, Traversal};
use crate::outputs::{Append, Outputs};
use crate::plan::{Outcome, Plan};

/// A source plus pending aggregates whose results are computed on first read.
///
/// A request moves from unmaterialized to materialized exactly once, on the
/// first result access; the source is traversed at most once no matter how
/// many times results are read. If that traversal fails, the failure is what
/// every later read returns.
///
/// Requests are persistent when the source is `Clone`: cloning an
/// unmaterialized request copies its aggregate list, so one base request can
/// be branched with different [`add`](Request::add) calls and each branch
/// traverses and answers on its own. Cloning a materialized request yields a
/// request whose every read fails with [`Error::ContractViolation`].
///
/// `Request` is not `Sync`: materialization needs exclusive access to the
/// pending plan. A materialized [`Outcome`] can be moved out with
/// [`into_outcome`](Request::into_outcome) and shared across threads.
///
/// # Examples
///
/// ```rust
/// use passweld::prelude::*;
///
/// let request = Request::new(vec![2, 2, 1], HasDuplicates::new())
///     .add(Min::new())?;
///
/// assert_eq!(request.results()?, (&true, &1));
/// assert_eq!(request.get::<i32>(1)?, &1);
/// assert_eq!(request.into_results()?, (true, 1));
/// # Ok::<(), passweld::Error>(())
/// ```
pub struct Request<S: IntoIterator, Out> {
    pending: RefCell<Option<Plan<S>>>,
    outcome: OnceCell<Result<Outcome>>,
    len: usize,
    _out: PhantomData<fn() -> Out>,
}

impl<S: IntoIterator> Request<S, ()> {
    /// Create a request with no aggregates yet
    pub fn empty(source: S) -> Self {
        Self::from_plan(Plan::new(source))
    }
}

impl<S: IntoIterator, O> Request<S, (O,)> {
    /// Create a request computing one aggregate over `source`
    pub fn new<F>(source: S, factory: F) -> Self
    where
        F: SinkFactory<S::Item, Output = O> + DynFactory<S::Item> + 'static,
    {
        Self::from_plan(Plan::new(source).with(factory))
    }
}

impl<S: IntoIterator, Out> Request<S, Out> {
    fn from_plan(plan: Plan<S>) -> Self {
        Self {
            len: plan.len(),
            pending: RefCell::new(Some(plan)),
            outcome: OnceCell::new(),
            _out: PhantomData,
        }
    }

    /// Append an aggregate; its result comes last in the tuple.
    ///
    /// Fails with [`Error::ContractViolation`] if results were already read.
    pub fn add<F>(self, factory: F) -> Result<Request<S, <Out as Append<F::Output>>::Output>>
    where
        F: SinkFactory<S::Item> + DynFactory<S::Item> + 'static,
        Out: Append<F::Output>,
    {
        let mut plan = self
            .pending
            .into_inner()
            .ok_or_else(|| Error::contract("cannot add an aggregate to a materialized request"))?;
        plan.push(factory);
        Ok(Request::from_plan(plan))
    }

    /// Replace the driver configuration.
    ///
    /// Configuration only applies to a pending traversal; once materialized
    /// the call is ignored and logged at `debug`.
    pub fn config(self, config: DriverConfig) -> Self {
        self.map_plan("config", |plan| plan.config(config))
    }

    /// Set the fan-out strategy; ignored once materialized
    pub fn fan_out(self, fan_out: FanOut) -> Self {
        self.map_plan("fan_out", |plan| plan.fan_out(fan_out))
    }

    /// Set the label used in logs and metrics; ignored once materialized
    pub fn label<L: Into<String>>(self, label: L) -> Self {
        self.map_plan("label", |plan| plan.label(label))
    }

    fn map_plan(mut self, setting: &'static str, f: impl FnOnce(Plan<S>) -> Plan<S>) -> Self {
        let slot = self.pending.get_mut();
        match slot.take() {
            Some(plan) => *slot = Some(f(plan)),
            None => debug!(setting, "request already materialized, ignoring setting"),
        }
        self
    }

    /// Number of registered aggregates
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no aggregate is registered
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether results have been computed (or failed to compute)
    pub fn is_materialized(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// Borrow the outcome, materializing on first call.
    pub fn outcome(&self) -> Result<&Outcome> {
        self.outcome
            .get_or_init(|| self.materialize())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Report of the traversal, materializing on first call.
    pub fn traversal(&self) -> Result<Traversal> {
        self.outcome().map(Outcome::traversal)
    }

    /// Borrow the result of the aggregate registered at `index`.
    ///
    /// Only that aggregate's failure is reported; the others are unaffected.
    pub fn get<O: Any>(&self, index: usize) -> Result<&O> {
        self.outcome()?.get(index)
    }

    /// Borrow every result, in registration order.
    pub fn results(&self) -> Result<Out::Refs<'_>>
    where
        Out: Outputs,
    {
        Out::refs(self.outcome()?)
    }

    /// Consume the request and return every result, in registration order.
    pub fn into_results(self) -> Result<Out>
    where
        Out: Outputs,
    {
        Out::take(self.into_outcome()?)
    }

    /// Consume the request and return its outcome.
    pub fn into_outcome(self) -> Result<Outcome> {
        self.outcome()?;
        match self.outcome.into_inner() {
            Some(outcome) => outcome,
            None => Err(Error::contract("request outcome missing after materialization")),
        }
    }

    fn materialize(&self) -> Result<Outcome> {
        let plan = self
            .pending
            .borrow_mut()
            .take()
            .ok_or_else(|| Error::contract("request has no pending plan"))?;
        debug!(aggregates = plan.len(), "materializing request");
        plan.execute()
    }
}

impl<S, Out> Clone for Request<S, Out>
where
    S: IntoIterator + Clone,
{
    fn clone(&self) -> Self {
        if let Some(plan) = self.pending.borrow().as_ref() {
            return Self::from_plan(plan.clone());
        }
        Self {
            pending: RefCell::new(None),
            outcome: OnceCell::from(Err(Error::contract(
                "request was cloned after materialization",
            ))),
            len: self.len,
            _out: PhantomData,
        }
    }
}

impl<S: IntoIterator, Out> fmt::Debug for Request<S, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("aggregates", &self.len)
            .field("materialized", &self.is_materialized())
            .finish()
    }
}

/// Extension trait for starting a request from any source.
pub trait AggregateExt: IntoIterator + Sized {
    /// Start a request computing `factory` over this source
    fn aggregate<F>(self, factory: F) -> Request<Self, (F::Output,)>
    where
        F: SinkFactory<Self::Item> + DynFactory<Self::Item> + 'static,
    {
        Request::new(self, factory)
    }

    /// Start a request with no aggregates yet
    fn into_request(self) -> Request<Self, ()> {
        Request::empty(self)
    }
}

impl<S: IntoIterator> AggregateExt for S {}
