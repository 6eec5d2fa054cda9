//! The per-input record a lane keeps until conversion.

/// Transform applied to a single conversion result before it is placed.
pub(crate) type PostConversion<'a, T> = Box<dyn FnOnce(T) -> T + 'a>;

/// An accepted input tagged with its global output position.
pub(crate) struct Indexed<'a, F, T> {
    pub(crate) index: usize,
    pub(crate) value: F,
    /// `None` is the identity post-conversion.
    pub(crate) post: Option<PostConversion<'a, T>>,
}

impl<'a, F, T> Indexed<'a, F, T> {
    pub(crate) fn new(index: usize, value: F, post: Option<PostConversion<'a, T>>) -> Self {
        Self { index, value, post }
    }
}

/// Where a converted value goes, and what happens to it on the way.
pub(crate) struct Placement<'a, T> {
    pub(crate) index: usize,
    post: Option<PostConversion<'a, T>>,
}

impl<'a, T> Placement<'a, T> {
    pub(crate) fn finish(self, converted: T) -> T {
        match self.post {
            Some(post) => post(converted),
            None => converted,
        }
    }
}

/// Split records into the converter's input list and the matching placements,
/// both in accept order.
pub(crate) fn split<'a, F, T>(records: Vec<Indexed<'a, F, T>>) -> (Vec<F>, Vec<Placement<'a, T>>) {
    let mut inputs = Vec::with_capacity(records.len());
    let mut placements = Vec::with_capacity(records.len());
    for Indexed { index, value, post } in records {
        inputs.push(value);
        placements.push(Placement { index, post });
    }
    (inputs, placements)
}
