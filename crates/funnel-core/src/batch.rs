//! Lanes: the per-converter collectors behind a [`Funnel`](crate::Funnel).
//!
//! A lane is split in two halves sharing one record list. The [`Batch`]
//! handle is what callers feed; the type-erased [`Lane`] half is owned by the
//! funnel and is what `run` drives. Erasing the input type `F` at that seam is
//! what lets one funnel hold lanes over different input types.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::error::{BoxError, FunnelError};
use crate::funnel::Funnel;
use crate::indexed::{self, Indexed, PostConversion};

/// Records shared between a [`Batch`] handle and its lane.
pub(crate) type Records<'a, F, T> = Rc<RefCell<Vec<Indexed<'a, F, T>>>>;

/// Normalised batch conversion. Receives the lane's inputs in accept order
/// and may drain them; returns one result per input.
pub(crate) type Converter<'a, F, T> =
    Box<dyn FnOnce(&mut Vec<F>) -> Result<Vec<T>, BoxError> + 'a>;

/// Produces a lane's results into the shared output, each at its global index.
pub(crate) trait Lane<T> {
    fn convert_into(
        self: Box<Self>,
        lane: usize,
        output: &mut [Option<T>],
    ) -> Result<(), FunnelError>;
}

pub(crate) struct LaneSlot<'a, F, T> {
    name: &'static str,
    converter: Converter<'a, F, T>,
    records: Records<'a, F, T>,
}

impl<'a, F, T> LaneSlot<'a, F, T> {
    pub(crate) fn new(
        name: &'static str,
        converter: Converter<'a, F, T>,
        records: Records<'a, F, T>,
    ) -> Self {
        Self {
            name,
            converter,
            records,
        }
    }
}

impl<'a, F: fmt::Debug, T: fmt::Debug> Lane<T> for LaneSlot<'a, F, T> {
    fn convert_into(
        self: Box<Self>,
        lane: usize,
        output: &mut [Option<T>],
    ) -> Result<(), FunnelError> {
        let LaneSlot {
            name,
            converter,
            records,
        } = *self;

        let records = records.take();
        if records.is_empty() {
            // Never call a converter with nothing to convert.
            trace!("Funnel: lane {} ({}) is empty, skipping", lane, name);
            return Ok(());
        }

        let (mut inputs, placements) = indexed::split(records);
        let expected = inputs.len();
        debug!("Funnel: converting {} inputs through lane {} ({})", expected, lane, name);

        let results = converter(&mut inputs).map_err(|source| {
            warn!("Funnel: lane {} ({}) converter failed: {}", lane, name, source);
            FunnelError::Conversion {
                lane,
                converter: name,
                source,
            }
        })?;

        if results.len() != expected {
            warn!(
                "Funnel: lane {} ({}) returned {} results for {} inputs",
                lane,
                name,
                results.len(),
                expected
            );
            return Err(FunnelError::SizeMismatch {
                lane,
                converter: name,
                expected,
                actual: results.len(),
                inputs: format!("{inputs:?}"),
                results: format!("{results:?}"),
            });
        }

        for (placement, result) in placements.into_iter().zip(results) {
            let index = placement.index;
            output[index] = Some(placement.finish(result));
        }
        Ok(())
    }
}

/// Handle for feeding inputs into one lane of a [`Funnel`].
///
/// Obtained from [`Funnel::through`]. Every accepted input takes the next
/// global index of the funnel at the moment it is accepted, which is the
/// position its converted value will occupy in [`Funnel::run`]'s output.
///
/// The handle borrows the funnel, so it must be out of use before `run`
/// consumes the funnel.
pub struct Batch<'f, 'a, F, T> {
    funnel: &'f Funnel<'a, T>,
    lane: usize,
    records: Records<'a, F, T>,
}

impl<'f, 'a, F, T> Batch<'f, 'a, F, T> {
    pub(crate) fn new(
        funnel: &'f Funnel<'a, T>,
        lane: usize,
        records: Records<'a, F, T>,
    ) -> Self {
        Self {
            funnel,
            lane,
            records,
        }
    }

    /// Adds `input` to be converted with the rest of this lane.
    pub fn accept(&self, input: F) {
        self.push(input, None);
    }

    /// Adds `input` to be converted with the rest of this lane.
    ///
    /// `post` is applied to this input's conversion result once the batch
    /// conversion completes, and its return value is what lands in the output.
    pub fn accept_with<P>(&self, input: F, post: P)
    where
        P: FnOnce(T) -> T + 'a,
    {
        let post: PostConversion<'a, T> = Box::new(post);
        self.push(input, Some(post));
    }

    fn push(&self, input: F, post: Option<PostConversion<'a, T>>) {
        let index = self.funnel.claim_index();
        trace!("Funnel: lane {} accepted input at index {}", self.lane, index);
        self.records
            .borrow_mut()
            .push(Indexed::new(index, input, post));
    }

    /// Position of this lane in registration order. Lane 0 is the funnel's
    /// own pass-through lane.
    pub fn lane(&self) -> usize {
        self.lane
    }

    /// Number of inputs accepted into this lane so far.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Whether nothing has been accepted into this lane yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<F, T> fmt::Debug for Batch<'_, '_, F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("lane", &self.lane)
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn doubling(inputs: &mut Vec<i32>) -> Result<Vec<i32>, BoxError> {
        Ok(inputs.iter().map(|v| v * 2).collect())
    }

    #[test]
    fn empty_lane_never_calls_converter() {
        let called = Cell::new(false);
        let converter: Converter<'_, i32, i32> =
            Box::new(|inputs: &mut Vec<i32>| -> Result<Vec<i32>, BoxError> {
                called.set(true);
                Ok(std::mem::take(inputs))
            });
        let slot = Box::new(LaneSlot::new("probe", converter, Rc::default()));
        let mut output: Vec<Option<i32>> = Vec::new();

        slot.convert_into(3, &mut output).unwrap();
        assert!(!called.get());
    }

    #[test]
    fn results_land_at_recorded_indices() {
        let records: Records<'_, i32, i32> = Rc::default();
        let increment: PostConversion<'_, i32> = Box::new(|v: i32| v + 1);
        records.borrow_mut().push(Indexed::new(2, 10, None));
        records.borrow_mut().push(Indexed::new(0, 20, Some(increment)));
        let converter: Converter<'_, i32, i32> = Box::new(doubling);
        let slot = Box::new(LaneSlot::new("doubling", converter, records));
        let mut output: Vec<Option<i32>> = vec![None, None, None];

        slot.convert_into(1, &mut output).unwrap();
        assert_eq!(output, vec![Some(41), None, Some(20)]);
    }

    #[test]
    fn size_mismatch_reports_inputs_and_results() {
        let records: Records<'_, i32, i32> = Rc::default();
        records.borrow_mut().push(Indexed::new(0, 1, None));
        records.borrow_mut().push(Indexed::new(1, 2, None));
        let converter: Converter<'_, i32, i32> =
            Box::new(|_: &mut Vec<i32>| -> Result<Vec<i32>, BoxError> { Ok(vec![7]) });
        let slot = Box::new(LaneSlot::new("short", converter, records));
        let mut output: Vec<Option<i32>> = vec![None, None];

        match slot.convert_into(4, &mut output) {
            Err(FunnelError::SizeMismatch {
                lane,
                converter,
                expected,
                actual,
                inputs,
                results,
            }) => {
                assert_eq!(lane, 4);
                assert_eq!(converter, "short");
                assert_eq!((expected, actual), (2, 1));
                assert_eq!(inputs, "[1, 2]");
                assert_eq!(results, "[7]");
            }
            other => panic!("expected SizeMismatch, got {other:?}"),
        }
        assert_eq!(output, vec![None, None]);
    }
}
