//! The enumeration driver.
//!
//! [`drive`] pulls each element from the source exactly once and hands it to
//! every attached sink, in registration order, before pulling the next one.
//! Traversal continues while at least one sink answers [`Demand::More`] and
//! stops without advancing the cursor again once none does.

use tracing::{debug, trace};

use crate::core::{Demand, DynSink, Result};

/// How the driver treats sinks that have reported [`Demand::Satisfied`].
///
/// Both strategies produce the same results for sinks that keep their answer
/// once satisfied; they differ only in how many calls a satisfied sink sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FanOut {
    /// Keep feeding every sink until traversal ends
    #[default]
    Broadcast,
    /// Drop a sink from the fan-out list once it is satisfied
    Prune,
}

/// Configuration for a driver run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverConfig {
    /// Treatment of satisfied sinks
    pub fan_out: FanOut,
    /// Name attached to the run's tracing span and metrics
    pub label: Option<String>,
}

impl DriverConfig {
    /// Set the fan-out strategy
    pub fn fan_out(mut self, fan_out: FanOut) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Set the label used in logs and metrics
    pub fn label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// What a single driver run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Traversal {
    /// Number of sinks attached to the run
    pub sinks: usize,
    /// Number of elements pulled from the source
    pub pulled: usize,
    /// True when the run ended because no sink needed more input, rather
    /// than because the source ran out
    pub stopped_early: bool,
}

/// A type-erased sink as the driver sees it.
pub type BoxedSink<'a, T> = Box<dyn DynSink<T> + 'a>;

/// Drive one forward pass over `source`, fanning every element out to `sinks`.
///
/// With no sinks the source is never iterated. The cursor obtained from
/// `source` lives only for this call and is dropped on every exit path,
/// including when a sink fails. A sink error aborts the pass and is returned
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use passweld::core::SinkFactory;
/// use passweld::driver::{drive, BoxedSink, DriverConfig};
/// use passweld::sinks::{HasDuplicates, Min};
///
/// let mut sinks: Vec<BoxedSink<'_, i32>> = vec![
///     Box::new(HasDuplicates::<i32>::new().sink()),
///     Box::new(Min::<i32>::new().sink()),
/// ];
/// let traversal = drive(vec![2, 2, 1], &mut sinks, &DriverConfig::default())?;
/// assert_eq!(traversal.pulled, 3);
/// # Ok::<(), passweld::Error>(())
/// ```
pub fn drive<I>(
    source: I,
    sinks: &mut [BoxedSink<'_, I::Item>],
    config: &DriverConfig,
) -> Result<Traversal>
where
    I: IntoIterator,
{
    let mut traversal = Traversal {
        sinks: sinks.len(),
        ..Traversal::default()
    };
    if sinks.is_empty() {
        debug!("no sinks attached, skipping traversal");
        return Ok(traversal);
    }

    let span = tracing::debug_span!(
        "drive",
        label = config.label.as_deref(),
        sinks = sinks.len()
    );
    let _enter = span.enter();

    match run(source, sinks, config.fan_out, &mut traversal) {
        Ok(()) => {
            debug!(
                pulled = traversal.pulled,
                stopped_early = traversal.stopped_early,
                "traversal finished"
            );
            #[cfg(feature = "metrics")]
            crate::metrics::record_traversal(config.label.as_deref(), &traversal);
            Ok(traversal)
        }
        Err(e) => {
            debug!(pulled = traversal.pulled, error = %e, "sink failed, traversal aborted");
            #[cfg(feature = "metrics")]
            crate::metrics::record_failure(config.label.as_deref());
            Err(e)
        }
    }
}

fn run<I>(
    source: I,
    sinks: &mut [BoxedSink<'_, I::Item>],
    fan_out: FanOut,
    traversal: &mut Traversal,
) -> Result<()>
where
    I: IntoIterator,
{
    let mut cursor = source.into_iter();

    let Some(first) = cursor.next() else {
        trace!("source is empty");
        return Ok(());
    };
    traversal.pulled = 1;

    // Indices of sinks still wanting input; only maintained when pruning.
    let mut live = Vec::new();
    let mut demand = Demand::Satisfied;
    for (index, sink) in sinks.iter_mut().enumerate() {
        let answer = sink.feed_first(&first)?;
        if fan_out == FanOut::Prune && answer.needs_more() {
            live.push(index);
        }
        demand |= answer;
    }

    while demand.needs_more() {
        let Some(item) = cursor.next() else {
            trace!(pulled = traversal.pulled, "source exhausted");
            return Ok(());
        };
        traversal.pulled += 1;
        demand = match fan_out {
            FanOut::Broadcast => feed_all(sinks, &item)?,
            FanOut::Prune => feed_live(sinks, &mut live, &item)?,
        };
    }

    trace!(pulled = traversal.pulled, "all sinks satisfied, stopping early");
    traversal.stopped_early = true;
    Ok(())
}

/// Feed every sink, satisfied or not, and OR their answers.
fn feed_all<T>(sinks: &mut [BoxedSink<'_, T>], item: &T) -> Result<Demand> {
    let mut demand = Demand::Satisfied;
    for sink in sinks.iter_mut() {
        demand |= sink.feed_next(item)?;
    }
    Ok(demand)
}

/// Feed only the sinks in `live`, dropping those that become satisfied.
fn feed_live<T>(
    sinks: &mut [BoxedSink<'_, T>],
    live: &mut Vec<usize>,
    item: &T,
) -> Result<Demand> {
    let mut kept = 0;
    for position in 0..live.len() {
        let index = live[position];
        if sinks[index].feed_next(item)?.needs_more() {
            live[kept] = index;
            kept += 1;
        }
    }
    live.truncate(kept);
    Ok(Demand::from(!live.is_empty()))
}
