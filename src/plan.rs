//! Untyped aggregation plans and their outcomes.
//!
//! A [`Plan`] binds a source to an ordered, append-only list of type-erased
//! sink factories. It has no upper bound on the number of aggregates; the
//! typed [`Request`](crate::request::Request) is a thin layer over it.
//! Executing a plan runs the driver once and yields an [`Outcome`], where each
//! aggregate's result sits in the slot matching its registration position.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::core::{AnyOutput, DynFactory, DynSink, Error, Result};
use crate::driver::{self, DriverConfig, FanOut, Traversal};

/// A source plus the aggregates to compute over it in one pass.
///
/// # Examples
///
/// ```rust
/// use passweld::plan::Plan;
/// use passweld::sinks::{Count, HasDuplicates, Max};
///
/// let outcome = Plan::new(vec![4, 9, 4])
///     .with(HasDuplicates::<i32>::new())
///     .with(Max::<i32>::new())
///     .with(Count::<i32>::new())
///     .execute()?;
/// assert_eq!(outcome.get::<bool>(0)?, &true);
/// assert_eq!(outcome.get::<i32>(1)?, &9);
/// assert_eq!(outcome.get::<usize>(2)?, &3);
/// # Ok::<(), passweld::Error>(())
/// ```
pub struct Plan<S: IntoIterator> {
    source: S,
    factories: Vec<Arc<dyn DynFactory<S::Item>>>,
    config: DriverConfig,
}

impl<S: IntoIterator> Plan<S> {
    /// Create a plan with no aggregates
    pub fn new(source: S) -> Self {
        Self {
            source,
            factories: Vec::new(),
            config: DriverConfig::default(),
        }
    }

    /// Replace the driver configuration
    pub fn config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the fan-out strategy
    pub fn fan_out(mut self, fan_out: FanOut) -> Self {
        self.config.fan_out = fan_out;
        self
    }

    /// Set the label used in logs and metrics
    pub fn label<L: Into<String>>(mut self, label: L) -> Self {
        self.config.label = Some(label.into());
        self
    }

    /// Append an aggregate, returning its position in the outcome.
    pub fn push<F>(&mut self, factory: F) -> usize
    where
        F: DynFactory<S::Item> + 'static,
    {
        self.factories.push(Arc::new(factory));
        self.factories.len() - 1
    }

    /// Append an aggregate, builder style
    pub fn with<F>(mut self, factory: F) -> Self
    where
        F: DynFactory<S::Item> + 'static,
    {
        self.push(factory);
        self
    }

    /// Number of registered aggregates
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no aggregate is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// The driver configuration this plan will run with
    pub fn driver_config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run the single traversal and collect every aggregate's result.
    ///
    /// A sink error aborts the pass and is returned here; no partial outcome
    /// is produced. An aggregate that has no value for the elements it saw
    /// (for example a minimum over nothing) fails only its own slot.
    pub fn execute(self) -> Result<Outcome> {
        let Plan {
            source,
            factories,
            config,
        } = self;

        let mut sinks: Vec<Box<dyn DynSink<S::Item>>> =
            factories.iter().map(|factory| factory.create()).collect();
        let traversal = driver::drive(source, &mut sinks, &config)?;

        let slots = sinks
            .into_iter()
            .zip(&factories)
            .map(|(sink, factory)| Slot {
                output_type: factory.output_type(),
                state: match sink.finish_boxed() {
                    Ok(value) => SlotState::Ready(value),
                    Err(e) => SlotState::Failed(e),
                },
            })
            .collect::<Vec<_>>();

        debug!(
            aggregates = slots.len(),
            failed = slots.iter().filter(|slot| slot.error().is_some()).count(),
            "plan executed"
        );
        Ok(Outcome { slots, traversal })
    }
}

impl<S> Clone for Plan<S>
where
    S: IntoIterator + Clone,
{
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            factories: self.factories.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: IntoIterator> fmt::Debug for Plan<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outputs: Vec<_> = self.factories.iter().map(|f| f.output_type()).collect();
        f.debug_struct("Plan")
            .field("outputs", &outputs)
            .field("config", &self.config)
            .finish()
    }
}

struct Slot {
    output_type: &'static str,
    state: SlotState,
}

enum SlotState {
    Ready(AnyOutput),
    Failed(Error),
    Taken,
}

impl Slot {
    fn error(&self) -> Option<&Error> {
        match &self.state {
            SlotState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// The results of one executed plan, in registration order.
///
/// Slots are independent: a slot whose aggregate failed (typically with
/// [`Error::EmptySequence`]) does not affect reading the others.
pub struct Outcome {
    slots: Vec<Slot>,
    traversal: Traversal,
}

impl Outcome {
    /// Number of result slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no result slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Report of the traversal that produced these results
    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// The error of slot `index`, if its aggregate failed
    pub fn error(&self, index: usize) -> Option<&Error> {
        self.slots.get(index).and_then(Slot::error)
    }

    /// Borrow the result at `index` as an `O`.
    pub fn get<O: Any>(&self, index: usize) -> Result<&O> {
        let slot = self.slot(index)?;
        match &slot.state {
            SlotState::Ready(value) => value
                .downcast_ref::<O>()
                .ok_or_else(|| type_mismatch::<O>(index, slot.output_type)),
            SlotState::Failed(e) => Err(e.clone()),
            SlotState::Taken => Err(taken(index)),
        }
    }

    /// Move the result at `index` out as an `O`.
    ///
    /// The slot is left empty; reading it again is a contract violation.
    pub fn take<O: Any>(&mut self, index: usize) -> Result<O> {
        let slot = self.slot_mut(index)?;
        match std::mem::replace(&mut slot.state, SlotState::Taken) {
            SlotState::Ready(value) => match value.downcast::<O>() {
                Ok(value) => Ok(*value),
                Err(value) => {
                    slot.state = SlotState::Ready(value);
                    Err(type_mismatch::<O>(index, slot.output_type))
                }
            },
            SlotState::Failed(e) => {
                slot.state = SlotState::Failed(e.clone());
                Err(e)
            }
            SlotState::Taken => Err(taken(index)),
        }
    }

    fn slot(&self, index: usize) -> Result<&Slot> {
        let len = self.slots.len();
        self.slots.get(index).ok_or_else(|| out_of_range(index, len))
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Slot> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for slot in &self.slots {
            match &slot.state {
                SlotState::Ready(_) => list.entry(&format_args!("{}", slot.output_type)),
                SlotState::Failed(e) => list.entry(&format_args!("{} ({})", slot.output_type, e)),
                SlotState::Taken => list.entry(&format_args!("{} (taken)", slot.output_type)),
            };
        }
        list.finish()
    }
}

fn out_of_range(index: usize, len: usize) -> Error {
    Error::contract(format!(
        "result index {} out of range for {} aggregates",
        index, len
    ))
}

fn type_mismatch<O>(index: usize, actual: &str) -> Error {
    Error::contract(format!(
        "result {} is a {}, not a {}",
        index,
        actual,
        type_name::<O>()
    ))
}

fn taken(index: usize) -> Error {
    Error::contract(format!("result {} was already taken", index))
}
