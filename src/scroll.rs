//! Keeps the vertical offsets of the source and target panes equal.
//!
//! A [`ScrollCoupling`] is bound to one pair of panes for one piece of
//! content. Panes report their scroll events through
//! [`ScrollCoupling::on_scrolled`]; the coupling writes the offset into the
//! other pane. Writes made by the coupling itself are not propagated back.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::debug;

/// A view with an absolute vertical scroll offset. Implementations clamp
/// the offset to their own scrollable range.
pub trait ScrollPane {
    fn scroll_offset(&self) -> f32;
    fn set_scroll_offset(&mut self, offset: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneSide {
    Source,
    Target,
}

impl PaneSide {
    pub fn opposite(self) -> Self {
        match self {
            PaneSide::Source => PaneSide::Target,
            PaneSide::Target => PaneSide::Source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// The other pane was moved to this offset.
    Propagated(f32),
    /// The other pane already sat at the offset; nothing was written.
    Unchanged,
    /// The event was raised by the coupling's own write.
    Suppressed,
    /// The offset was not a finite number.
    Ignored,
    /// The coupling was released or a pane no longer exists.
    Detached,
}

pub struct ScrollCoupling<P: ScrollPane> {
    source: Weak<RefCell<P>>,
    target: Weak<RefCell<P>>,
    content_id: u64,
    propagating: Cell<bool>,
}

impl<P: ScrollPane> ScrollCoupling<P> {
    pub fn bind(source: &Rc<RefCell<P>>, target: &Rc<RefCell<P>>, content_id: u64) -> Self {
        debug!(content_id, "binding scroll coupling");
        Self {
            source: Rc::downgrade(source),
            target: Rc::downgrade(target),
            content_id,
            propagating: Cell::new(false),
        }
    }

    pub fn content_id(&self) -> u64 {
        self.content_id
    }

    pub fn is_bound_to(&self, source: &Rc<RefCell<P>>, target: &Rc<RefCell<P>>) -> bool {
        self.source.ptr_eq(&Rc::downgrade(source)) && self.target.ptr_eq(&Rc::downgrade(target))
    }

    /// Handles a scroll event from `side`, which now sits at `offset`.
    pub fn on_scrolled(&self, side: PaneSide, offset: f32) -> SyncOutcome {
        if self.propagating.get() {
            return SyncOutcome::Suppressed;
        }
        if !offset.is_finite() {
            return SyncOutcome::Ignored;
        }
        let Some(other_pane) = self.pane(side.opposite()).upgrade() else {
            return SyncOutcome::Detached;
        };
        if self.pane(side).strong_count() == 0 {
            return SyncOutcome::Detached;
        }
        let Ok(mut other) = other_pane.try_borrow_mut() else {
            return SyncOutcome::Suppressed;
        };
        if other.scroll_offset() == offset {
            return SyncOutcome::Unchanged;
        }

        self.propagating.set(true);
        other.set_scroll_offset(offset);
        self.propagating.set(false);
        SyncOutcome::Propagated(offset)
    }

    /// Drops both pane references. Later events report `Detached`.
    pub fn release(&mut self) {
        debug!(content_id = self.content_id, "releasing scroll coupling");
        self.source = Weak::new();
        self.target = Weak::new();
    }

    pub fn is_released(&self) -> bool {
        self.source.strong_count() == 0 && self.target.strong_count() == 0
    }

    fn pane(&self, side: PaneSide) -> &Weak<RefCell<P>> {
        match side {
            PaneSide::Source => &self.source,
            PaneSide::Target => &self.target,
        }
    }
}

/// Owns the current coupling and replaces it whenever the displayed content
/// changes.
pub struct ScrollSynchronizer<P: ScrollPane> {
    coupling: Option<ScrollCoupling<P>>,
}

impl<P: ScrollPane> Default for ScrollSynchronizer<P> {
    fn default() -> Self {
        Self { coupling: None }
    }
}

impl<P: ScrollPane> ScrollSynchronizer<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Couples `source` and `target` for `content_id`. Returns `false` when
    /// the existing coupling already covers the same panes and content.
    pub fn bind(
        &mut self,
        source: &Rc<RefCell<P>>,
        target: &Rc<RefCell<P>>,
        content_id: u64,
    ) -> bool {
        if let Some(coupling) = &self.coupling
            && coupling.content_id() == content_id
            && coupling.is_bound_to(source, target)
        {
            return false;
        }
        self.release();
        self.coupling = Some(ScrollCoupling::bind(source, target, content_id));
        true
    }

    pub fn on_scrolled(&self, side: PaneSide, offset: f32) -> SyncOutcome {
        match &self.coupling {
            Some(coupling) => coupling.on_scrolled(side, offset),
            None => SyncOutcome::Detached,
        }
    }

    pub fn content_id(&self) -> Option<u64> {
        self.coupling.as_ref().map(ScrollCoupling::content_id)
    }

    pub fn release(&mut self) {
        if let Some(mut coupling) = self.coupling.take() {
            coupling.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Listener = Box<dyn Fn(f32)>;

    /// Pane that counts writes and reports every change like a UI widget.
    #[derive(Default)]
    struct RecordingPane {
        offset: f32,
        writes: usize,
        listener: Option<Listener>,
    }

    impl ScrollPane for RecordingPane {
        fn scroll_offset(&self) -> f32 {
            self.offset
        }

        fn set_scroll_offset(&mut self, offset: f32) {
            self.offset = offset;
            self.writes += 1;
            if let Some(listener) = &self.listener {
                listener(offset);
            }
        }
    }

    fn wired_pair() -> (
        Rc<RefCell<RecordingPane>>,
        Rc<RefCell<RecordingPane>>,
        Rc<RefCell<ScrollSynchronizer<RecordingPane>>>,
    ) {
        let a = Rc::new(RefCell::new(RecordingPane::default()));
        let b = Rc::new(RefCell::new(RecordingPane::default()));
        let sync = Rc::new(RefCell::new(ScrollSynchronizer::new()));
        sync.borrow_mut().bind(&a, &b, 1);

        let for_a = Rc::clone(&sync);
        a.borrow_mut().listener = Some(Box::new(move |offset| {
            for_a.borrow().on_scrolled(PaneSide::Source, offset);
        }));
        let for_b = Rc::clone(&sync);
        b.borrow_mut().listener = Some(Box::new(move |offset| {
            for_b.borrow().on_scrolled(PaneSide::Target, offset);
        }));
        (a, b, sync)
    }

    #[test]
    fn propagates_without_echo() {
        let (a, b, _sync) = wired_pair();
        a.borrow_mut().set_scroll_offset(120.0);

        assert_eq!(b.borrow().offset, 120.0);
        assert_eq!(b.borrow().writes, 1);
        assert_eq!(a.borrow().offset, 120.0);
        assert_eq!(a.borrow().writes, 1);
    }

    #[test]
    fn propagates_in_both_directions() {
        let (a, b, _sync) = wired_pair();
        b.borrow_mut().set_scroll_offset(40.0);
        assert_eq!(a.borrow().offset, 40.0);
        a.borrow_mut().set_scroll_offset(10.0);
        assert_eq!(b.borrow().offset, 10.0);
        assert_eq!(a.borrow().writes, 2);
        assert_eq!(b.borrow().writes, 2);
    }

    #[test]
    fn equal_offset_is_not_rewritten() {
        let a = Rc::new(RefCell::new(RecordingPane::default()));
        let b = Rc::new(RefCell::new(RecordingPane::default()));
        let coupling = ScrollCoupling::bind(&a, &b, 1);
        assert_eq!(coupling.on_scrolled(PaneSide::Source, 0.0), SyncOutcome::Unchanged);
        assert_eq!(b.borrow().writes, 0);
    }

    #[test]
    fn non_finite_offsets_are_ignored() {
        let a = Rc::new(RefCell::new(RecordingPane::default()));
        let b = Rc::new(RefCell::new(RecordingPane::default()));
        let coupling = ScrollCoupling::bind(&a, &b, 1);
        assert_eq!(coupling.on_scrolled(PaneSide::Source, f32::NAN), SyncOutcome::Ignored);
        assert_eq!(b.borrow().writes, 0);
    }

    #[test]
    fn released_coupling_does_nothing() {
        let a = Rc::new(RefCell::new(RecordingPane::default()));
        let b = Rc::new(RefCell::new(RecordingPane::default()));
        let mut coupling = ScrollCoupling::bind(&a, &b, 1);
        coupling.release();
        assert!(coupling.is_released());
        assert_eq!(coupling.on_scrolled(PaneSide::Source, 5.0), SyncOutcome::Detached);
        assert_eq!(b.borrow().writes, 0);
    }

    #[test]
    fn dropped_pane_detaches() {
        let a = Rc::new(RefCell::new(RecordingPane::default()));
        let b = Rc::new(RefCell::new(RecordingPane::default()));
        let coupling = ScrollCoupling::bind(&a, &b, 1);
        drop(b);
        assert_eq!(coupling.on_scrolled(PaneSide::Source, 5.0), SyncOutcome::Detached);
    }

    #[test]
    fn rebinds_when_content_changes() {
        let a = Rc::new(RefCell::new(RecordingPane::default()));
        let b = Rc::new(RefCell::new(RecordingPane::default()));
        let mut sync = ScrollSynchronizer::new();
        assert_eq!(sync.on_scrolled(PaneSide::Source, 1.0), SyncOutcome::Detached);

        assert!(sync.bind(&a, &b, 1));
        assert!(!sync.bind(&a, &b, 1));

        let fresh_a = Rc::new(RefCell::new(RecordingPane::default()));
        let fresh_b = Rc::new(RefCell::new(RecordingPane::default()));
        assert!(sync.bind(&fresh_a, &fresh_b, 2));
        assert_eq!(sync.content_id(), Some(2));

        assert_eq!(sync.on_scrolled(PaneSide::Source, 30.0), SyncOutcome::Propagated(30.0));
        assert_eq!(fresh_b.borrow().offset, 30.0);
        assert_eq!(b.borrow().writes, 0);

        sync.release();
        assert_eq!(sync.content_id(), None);
    }
}
