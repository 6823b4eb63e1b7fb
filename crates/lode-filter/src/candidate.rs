use lode::{DepView, ModuleId, Value};

/// A module under evaluation: its id, a view of the graph's dependency
/// lists, and its exports when it has initialized.
///
/// Filters borrow the candidate for the duration of one evaluation and
/// never mutate anything through it.
#[derive(Clone, Copy)]
pub struct Candidate<'a> {
    pub id: ModuleId,
    pub view: &'a dyn DepView,
    pub exports: Option<&'a Value>,
}

impl<'a> Candidate<'a> {
    pub fn new(id: ModuleId, view: &'a dyn DepView, exports: Option<&'a Value>) -> Self {
        Self { id, view, exports }
    }

    /// A candidate with dependency data only (module not yet initialized).
    pub fn structural(id: ModuleId, view: &'a dyn DepView) -> Self {
        Self {
            id,
            view,
            exports: None,
        }
    }
}
