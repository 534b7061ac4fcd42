//! # Page Breaks
//!
//! The cursor and the rules for moving it to a new page.
//!
//! Every atomic element (a table row, a header row with its title, a
//! consultation card) asks [`PageFlow::ensure_space`] for its height before
//! drawing. If it would cross the body bottom, the flow starts a new page,
//! has the [`PageDecorator`] draw that page's fixed regions, and resets the
//! cursor to the continuation offset. Elements are never split.
//!
//! An element taller than an entire page body cannot be helped by breaking.
//! It gets at most one break (so it starts at the top of a page) and is then
//! placed anyway with a warning, or rejected in strict mode.

use super::{Cursor, PageGeometry};
use crate::decorate::PageDecorator;
use crate::error::{RenderError, RenderWarning};
use crate::surface::DrawingSurface;

/// What to do with an element of a given height at the current cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakDecision {
    /// It fits; draw it here.
    Place,
    /// Start a new page, then draw it at the top.
    MoveToNextPage,
    /// It is taller than a whole page body.
    Oversized {
        /// Whether a break still gets it a fresh page first.
        break_first: bool,
    },
}

/// Decide how to place an element `height` tall.
///
/// `page_body` is the height available on a continuation page; `at_top` is
/// whether nothing has been placed since the current page started.
pub fn decide_break(cursor: &Cursor, height: f64, page_body: f64, at_top: bool) -> BreakDecision {
    if !cursor.will_overflow(height) {
        return BreakDecision::Place;
    }
    if height > page_body + 1e-9 {
        return BreakDecision::Oversized { break_first: !at_top };
    }
    BreakDecision::MoveToNextPage
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakState {
    OnPage,
    /// A new page is being started and decorated.
    Breaking,
}

/// Owns the cursor for one render pass and starts pages as content needs
/// them.
pub struct PageFlow<'a> {
    surface: &'a mut dyn DrawingSurface,
    decorator: &'a dyn PageDecorator,
    geometry: PageGeometry,
    cursor: Cursor,
    state: BreakState,
    at_top: bool,
    strict: bool,
    warnings: Vec<RenderWarning>,
}

impl<'a> PageFlow<'a> {
    pub fn new(
        surface: &'a mut dyn DrawingSurface,
        decorator: &'a dyn PageDecorator,
        geometry: PageGeometry,
    ) -> Self {
        let cursor = Cursor {
            x: geometry.left(),
            y: 0.0,
            page: 0,
            body_bottom: geometry.body_bottom(),
        };
        Self {
            surface,
            decorator,
            geometry,
            cursor,
            state: BreakState::OnPage,
            at_top: true,
            strict: false,
            warnings: Vec::new(),
        }
    }

    /// Reject oversized elements instead of placing them with a warning.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Start the first page; content begins at the decorator's content top.
    pub fn begin(&mut self) {
        self.start_page(self.decorator.content_top());
    }

    /// Start a new page; content resumes at the continuation top.
    pub fn page_break(&mut self) {
        self.start_page(self.decorator.continuation_top());
    }

    fn start_page(&mut self, top: f64) {
        self.state = BreakState::Breaking;
        self.surface.new_page();
        let page = self.surface.page_number();
        self.decorator.decorate(&mut *self.surface, page);
        self.cursor = Cursor {
            x: self.geometry.left(),
            y: top,
            page,
            body_bottom: self.geometry.body_bottom(),
        };
        self.at_top = true;
        self.state = BreakState::OnPage;
        log::debug!("page {} started, content at y={:.1}", page, top);
    }

    /// Make room for an atomic element. Returns whether a page break
    /// happened.
    pub fn ensure_space(&mut self, height: f64, element: &str) -> Result<bool, RenderError> {
        if self.cursor.page == 0 {
            self.begin();
        }
        let page_body = self.page_body();

        match decide_break(&self.cursor, height, page_body, self.at_top) {
            BreakDecision::Place => Ok(false),
            BreakDecision::MoveToNextPage => {
                self.page_break();
                Ok(true)
            }
            BreakDecision::Oversized { break_first } => {
                if self.strict {
                    return Err(RenderError::LayoutOverflow {
                        element: element.to_string(),
                        height,
                        available: page_body,
                        page: self.cursor.page,
                    });
                }
                if break_first {
                    self.page_break();
                }
                log::warn!(
                    "{} is {:.1}mm tall, more than a {:.1}mm page body; placing it on page {}",
                    element,
                    height,
                    page_body,
                    self.cursor.page
                );
                self.warnings.push(RenderWarning::Overflow {
                    element: element.to_string(),
                    height,
                    available: page_body,
                    page: self.cursor.page,
                });
                Ok(break_first)
            }
        }
    }

    /// Move down by `dy`. Negative moves are ignored.
    pub fn advance(&mut self, dy: f64) {
        if dy > 0.0 {
            self.cursor.y += dy;
            self.at_top = false;
        }
    }

    /// Move down to `y`, never up.
    pub fn skip_to(&mut self, y: f64) {
        self.advance(y - self.cursor.y);
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn y(&self) -> f64 {
        self.cursor.y
    }

    pub fn page(&self) -> usize {
        self.cursor.page
    }

    pub fn state(&self) -> BreakState {
        self.state
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn surface(&mut self) -> &mut dyn DrawingSurface {
        &mut *self.surface
    }

    pub fn warn(&mut self, warning: RenderWarning) {
        self.warnings.push(warning);
    }

    /// Height available for content on a continuation page.
    pub fn page_body(&self) -> f64 {
        self.geometry.body_bottom() - self.decorator.continuation_top()
    }

    /// Pages started and warnings collected during the pass.
    pub fn finish(self) -> (usize, Vec<RenderWarning>) {
        (self.cursor.page, self.warnings)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::surface::recording::{Op, RecordingSurface};
    use crate::surface::Cell;

    /// Draws a "header" cell on each page; content starts at 45, resumes at 60.
    pub(crate) struct Banner;

    impl PageDecorator for Banner {
        fn decorate(&self, surface: &mut dyn DrawingSurface, page: usize) {
            surface.text_cell(&Cell::new(10.0, 10.0, 190.0, 10.0), &format!("banner {page}"));
        }

        fn content_top(&self) -> f64 {
            45.0
        }

        fn continuation_top(&self) -> f64 {
            60.0
        }
    }

    fn cursor(y: f64) -> Cursor {
        Cursor {
            x: 10.0,
            y,
            page: 1,
            body_bottom: 267.0,
        }
    }

    #[test]
    fn fits_is_placed() {
        assert_eq!(decide_break(&cursor(100.0), 50.0, 207.0, false), BreakDecision::Place);
        assert_eq!(decide_break(&cursor(217.0), 50.0, 207.0, false), BreakDecision::Place);
    }

    #[test]
    fn overflow_moves_to_next_page() {
        assert_eq!(
            decide_break(&cursor(220.0), 50.0, 207.0, false),
            BreakDecision::MoveToNextPage
        );
    }

    #[test]
    fn oversized_breaks_once_unless_at_top() {
        assert_eq!(
            decide_break(&cursor(100.0), 300.0, 207.0, false),
            BreakDecision::Oversized { break_first: true }
        );
        assert_eq!(
            decide_break(&cursor(60.0), 300.0, 207.0, true),
            BreakDecision::Oversized { break_first: false }
        );
    }

    #[test]
    fn first_page_and_continuation_offsets() {
        let mut surface = RecordingSurface::a4();
        let mut flow = PageFlow::new(&mut surface, &Banner, PageGeometry::default());
        flow.begin();
        assert_eq!((flow.page(), flow.y()), (1, 45.0));

        flow.advance(200.0);
        assert!(flow.ensure_space(30.0, "row").unwrap());
        assert_eq!((flow.page(), flow.y()), (2, 60.0));
        assert_eq!(flow.state(), BreakState::OnPage);
        assert_eq!(flow.page_body(), 267.0 - 60.0);
        drop(flow);

        assert!(surface.contains_text("banner 1"));
        assert_eq!(surface.find_text("banner 2")[0].0, 2);
    }

    #[test]
    fn ensure_space_starts_first_page_lazily() {
        let mut surface = RecordingSurface::a4();
        let mut flow = PageFlow::new(&mut surface, &Banner, PageGeometry::default());
        assert!(!flow.ensure_space(10.0, "row").unwrap());
        assert_eq!(flow.page(), 1);
    }

    #[test]
    fn cursor_never_moves_up() {
        let mut surface = RecordingSurface::a4();
        let mut flow = PageFlow::new(&mut surface, &Banner, PageGeometry::default());
        flow.begin();
        flow.skip_to(100.0);
        flow.skip_to(80.0);
        flow.advance(-5.0);
        assert_eq!(flow.y(), 100.0);
    }

    #[test]
    fn oversized_element_warns_and_is_placed() {
        let mut surface = RecordingSurface::a4();
        let mut flow = PageFlow::new(&mut surface, &Banner, PageGeometry::default());
        flow.begin();
        flow.advance(20.0);
        assert!(flow.ensure_space(400.0, "card 1").unwrap());
        assert_eq!(flow.page(), 2);
        flow.advance(400.0);
        // Not at the top any more; the next element breaks normally.
        assert!(flow.ensure_space(10.0, "card 2").unwrap());
        let (pages, warnings) = flow.finish();
        assert_eq!(pages, 3);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(&warnings[0], RenderWarning::Overflow { element, page: 2, .. } if element == "card 1"));
    }

    #[test]
    fn oversized_at_top_does_not_break_again() {
        let mut surface = RecordingSurface::a4();
        let mut flow = PageFlow::new(&mut surface, &Banner, PageGeometry::default());
        flow.begin();
        assert!(!flow.ensure_space(400.0, "card").unwrap());
        assert_eq!(flow.page(), 1);
        drop(flow);
        assert_eq!(surface.ops().iter().filter(|r| r.op == Op::NewPage).count(), 1);
    }

    #[test]
    fn strict_mode_rejects_oversized() {
        let mut surface = RecordingSurface::a4();
        let mut flow = PageFlow::new(&mut surface, &Banner, PageGeometry::default()).strict(true);
        flow.begin();
        let err = flow.ensure_space(400.0, "card 7").unwrap_err();
        assert!(matches!(err, RenderError::LayoutOverflow { page: 1, .. }));
    }
}
