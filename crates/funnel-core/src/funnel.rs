//! `Funnel` — coalesces inputs into one batch call per lane and merges the
//! results back in submission order.

use std::any::type_name;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::batch::{Batch, Converter, Lane, LaneSlot, Records};
use crate::error::{BoxError, FunnelError};

/// Lane registered by [`Funnel::new`] for elements added without conversion.
const PASSTHROUGH_LANE: usize = 0;

/// Dispatches a sequence of inputs through arbitrary batch conversions while
/// keeping first-in-first-out order.
///
/// Each [`through`](Self::through) call opens a lane with its own batch
/// converter. Inputs fed into any lane, or [`add`](Self::add)ed directly,
/// take a global index at the moment they are accepted. [`run`](Self::run)
/// then calls every non-empty lane's converter exactly once, in registration
/// order, and places each result at its input's index.
///
/// A funnel is single-use and single-threaded: `run` consumes it, and the
/// interior `Rc`/`RefCell` bookkeeping makes it neither `Send` nor `Sync`.
///
/// `T: Debug` is required so that a misbehaving converter can be reported
/// together with the results it produced.
pub struct Funnel<'a, T> {
    next_index: Cell<usize>,
    lanes: RefCell<Vec<Box<dyn Lane<T> + 'a>>>,
    passthrough: Records<'a, T, T>,
}

impl<'a, T> Funnel<'a, T> {
    /// Number of elements accepted so far, across all lanes.
    pub fn len(&self) -> usize {
        self.next_index.get()
    }

    /// Whether nothing has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of registered lanes, including the pass-through lane.
    pub fn lane_count(&self) -> usize {
        self.lanes.borrow().len()
    }

    /// Hands out the next global index. Indices are never reused.
    pub(crate) fn claim_index(&self) -> usize {
        let index = self.next_index.get();
        self.next_index.set(index + 1);
        index
    }
}

impl<'a, T: fmt::Debug + 'a> Funnel<'a, T> {
    /// Creates an empty funnel with the pass-through identity lane as lane 0.
    pub fn new() -> Self {
        let funnel = Self {
            next_index: Cell::new(0),
            lanes: RefCell::new(Vec::new()),
            passthrough: Rc::default(),
        };
        let identity: Converter<'a, T, T> = Box::new(identity::<T>);
        let lane = funnel.register("identity", identity, Rc::clone(&funnel.passthrough));
        debug_assert_eq!(lane, PASSTHROUGH_LANE);
        funnel
    }

    /// Opens a lane whose inputs will be converted together through
    /// `converter` when [`run`](Self::run) is called.
    ///
    /// `converter` receives the lane's inputs in the order they were accepted
    /// and must return exactly one output per input, in the same order. It
    /// is not called at all if the lane receives no input. At most one result
    /// past the input count is read, so an endless result still fails `run`
    /// with [`FunnelError::SizeMismatch`].
    pub fn through<F, C, I>(&self, converter: C) -> Batch<'_, 'a, F, T>
    where
        F: fmt::Debug + 'a,
        C: FnOnce(&[F]) -> I + 'a,
        I: IntoIterator,
        I::Item: Into<T>,
    {
        let convert: Converter<'a, F, T> =
            Box::new(move |inputs: &mut Vec<F>| -> Result<Vec<T>, BoxError> {
                let limit = result_limit(inputs);
                Ok(converter(inputs.as_slice())
                    .into_iter()
                    .take(limit)
                    .map(Into::into)
                    .collect())
            });
        self.open(type_name::<C>(), convert)
    }

    /// Like [`through`](Self::through), for converters that can fail.
    ///
    /// An error from `converter` aborts [`run`](Self::run) with
    /// [`FunnelError::Conversion`]. The conversion is not retried.
    pub fn try_through<F, C, I, E>(&self, converter: C) -> Batch<'_, 'a, F, T>
    where
        F: fmt::Debug + 'a,
        C: FnOnce(&[F]) -> Result<I, E> + 'a,
        I: IntoIterator,
        I::Item: Into<T>,
        E: Into<BoxError>,
    {
        let convert: Converter<'a, F, T> =
            Box::new(move |inputs: &mut Vec<F>| -> Result<Vec<T>, BoxError> {
                let limit = result_limit(inputs);
                let converted = converter(inputs.as_slice()).map_err(Into::into)?;
                Ok(converted
                    .into_iter()
                    .take(limit)
                    .map(Into::into)
                    .collect())
            });
        self.open(type_name::<C>(), convert)
    }

    /// Adds `element` to the funnel as is.
    pub fn add(&self, element: T) {
        self.passthrough().accept(element);
    }

    /// Runs all batch conversions and returns the conversion results together
    /// with the elements [`add`](Self::add)ed as is, in encounter order.
    ///
    /// Stops at the first lane whose converter fails or returns the wrong
    /// number of results; no later lane is converted.
    pub fn run(self) -> Result<Vec<T>, FunnelError> {
        let size = self.next_index.get();
        let lanes = self.lanes.into_inner();
        debug!("Funnel: running {} lanes over {} elements", lanes.len(), size);

        let mut output: Vec<Option<T>> = std::iter::repeat_with(|| None).take(size).collect();
        for (lane, slot) in lanes.into_iter().enumerate() {
            slot.convert_into(lane, &mut output)?;
        }

        output
            .into_iter()
            .enumerate()
            .map(|(index, value)| value.ok_or(FunnelError::MissingOutput { index }))
            .collect()
    }

    fn open<F>(&self, name: &'static str, converter: Converter<'a, F, T>) -> Batch<'_, 'a, F, T>
    where
        F: fmt::Debug + 'a,
    {
        let records: Records<'a, F, T> = Rc::default();
        let lane = self.register(name, converter, Rc::clone(&records));
        Batch::new(self, lane, records)
    }

    fn register<F>(
        &self,
        name: &'static str,
        converter: Converter<'a, F, T>,
        records: Records<'a, F, T>,
    ) -> usize
    where
        F: fmt::Debug + 'a,
    {
        let mut lanes = self.lanes.borrow_mut();
        let lane = lanes.len();
        lanes.push(Box::new(LaneSlot::new(name, converter, records)));
        debug!("Funnel: registered lane {} ({})", lane, name);
        lane
    }

    fn passthrough(&self) -> Batch<'_, 'a, T, T> {
        Batch::new(self, PASSTHROUGH_LANE, Rc::clone(&self.passthrough))
    }
}

impl<'a, T: fmt::Debug + 'a> Default for Funnel<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Funnel<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Funnel")
            .field("len", &self.len())
            .field("lanes", &self.lane_count())
            .finish()
    }
}

/// Enough results to prove a converter returned too many, never more.
fn result_limit<F>(inputs: &[F]) -> usize {
    inputs.len().saturating_add(1)
}

fn identity<T>(inputs: &mut Vec<T>) -> Result<Vec<T>, BoxError> {
    Ok(std::mem::take(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_funnel_has_only_the_passthrough_lane() {
        let funnel: Funnel<u32> = Funnel::new();
        assert_eq!(funnel.lane_count(), 1);
        assert!(funnel.is_empty());
        assert_eq!(funnel.run().unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn indices_are_shared_across_lanes() {
        let funnel: Funnel<u32> = Funnel::new();
        let evens = funnel.through(|xs: &[u32]| xs.to_vec());
        let odds = funnel.through(|xs: &[u32]| xs.to_vec());

        evens.accept(0);
        odds.accept(1);
        funnel.add(2);
        odds.accept(3);

        assert_eq!(funnel.len(), 4);
        assert_eq!((evens.len(), odds.len()), (1, 2));
        assert_eq!((evens.lane(), odds.lane()), (1, 2));
        assert_eq!(funnel.lane_count(), 3);
        assert_eq!(funnel.run().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn add_is_identity() {
        let funnel: Funnel<String> = Funnel::new();
        funnel.add("x".to_string());
        funnel.add("y".to_string());
        assert_eq!(funnel.run().unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn converter_sees_accept_order() {
        let seen = RefCell::new(Vec::new());
        let funnel: Funnel<i64> = Funnel::new();
        let lane = funnel.through(|xs: &[i64]| {
            seen.borrow_mut().extend_from_slice(xs);
            xs.iter().map(|x| x * 100).collect::<Vec<_>>()
        });
        funnel.add(-1);
        lane.accept(3);
        lane.accept(1);
        lane.accept(2);

        assert_eq!(funnel.run().unwrap(), vec![-1, 300, 100, 200]);
        assert_eq!(*seen.borrow(), vec![3, 1, 2]);
    }

    #[test]
    fn failing_converter_stops_run() {
        let later_called = Cell::new(false);
        let funnel: Funnel<u8> = Funnel::new();
        let broken = funnel.try_through(|_: &[u8]| Err::<Vec<u8>, _>("backend down"));
        let later = funnel.through(|xs: &[u8]| {
            later_called.set(true);
            xs.to_vec()
        });
        broken.accept(1);
        later.accept(2);

        let err = funnel.run().unwrap_err();
        assert!(matches!(err, FunnelError::Conversion { lane: 1, .. }));
        assert!(err.to_string().contains("backend down"));
        assert!(!later_called.get());
    }

    #[test]
    fn debug_shows_counts() {
        let funnel: Funnel<u8> = Funnel::new();
        funnel.add(1);
        assert_eq!(format!("{funnel:?}"), "Funnel { len: 1, lanes: 1 }");
    }
}
