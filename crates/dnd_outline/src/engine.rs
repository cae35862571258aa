use std::time::{Duration, Instant};

use gpui::{Bounds, Pixels, Point, px};
use gpui_checklist_core::{ContainerId, DragSource, NodeId};

/// Tuning knobs for a drag session. The defaults match the feel of the
/// desktop editor this widget was built for.
#[derive(Debug, Clone, Copy)]
pub struct OutlineDragConfig {
    /// Distance the pointer must travel from the press point before the
    /// session becomes a drag instead of a click.
    pub threshold: Pixels,
    /// Height of the bands at the list's top and bottom edges that keep the
    /// list scrolling while the pointer hovers inside them.
    pub scroll_margin: Pixels,
    /// Scroll distance applied per auto-scroll tick.
    pub scroll_speed: Pixels,
    /// Cadence of auto-scroll ticks.
    pub scroll_tick: Duration,
    /// How long clicks stay swallowed after a drag session ends.
    pub suppress_cooldown: Duration,
}

impl Default for OutlineDragConfig {
    fn default() -> Self {
        Self {
            threshold: px(6.),
            scroll_margin: px(40.),
            scroll_speed: px(8.),
            scroll_tick: Duration::from_millis(40),
            suppress_cooldown: Duration::from_millis(300),
        }
    }
}

/// Rough class of the device behind a pointer press. Drag sessions are a
/// desktop affordance; touch presses are left to the platform's scroll
/// gesture and never arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerClass {
    Mouse,
    Pen,
    Touch,
}

/// What kind of row a press landed on. Expanded sections refuse to arm so
/// their children stay reachable while the pointer is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Item,
    Section { collapsed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Item,
    SectionHeader,
}

/// One visible row, in top-to-bottom order: which node it shows and where
/// that node currently lives in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowTarget {
    pub node: NodeId,
    pub kind: RowKind,
    pub container: ContainerId,
    pub index: usize,
}

/// The insertion slot the pointer currently designates, plus where to paint
/// the marker line for it (in viewport coordinates of the list).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTarget {
    pub container: ContainerId,
    pub index: usize,
    pub line_y: Pixels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// State of the one drag session the widget may hold at a time. `Armed` is
/// the window between a press and the movement threshold; `Active` is a
/// live drag with a ghost on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    Idle,
    Armed {
        source: DragSource,
        origin: Point<Pixels>,
    },
    Active {
        source: DragSource,
        origin: Point<Pixels>,
        pointer: Point<Pixels>,
        target: Option<ResolvedTarget>,
    },
}

/// What the caller should do after routing a pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMove {
    /// No session is live.
    Ignored,
    /// Still armed; the press may yet turn out to be a click.
    BelowThreshold,
    /// The threshold was crossed on this move; drag visuals start now.
    Started,
    /// An active drag followed the pointer.
    Tracking,
}

/// What the caller should do after routing a pointer release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRelease {
    Ignored,
    /// The press never crossed the threshold. Let it land as a plain click.
    Click,
    /// An active drag ended over `target` (or over nothing).
    Drop {
        source: DragSource,
        target: Option<ResolvedTarget>,
    },
}

#[derive(Debug, Default, Clone, Copy)]
struct AutoScroll {
    direction: Option<ScrollDirection>,
    last_tick: Option<Instant>,
}

/// The pointer half of drag-and-drop, kept apart from the view so the
/// transitions can be driven directly in tests. The widget feeds it raw
/// press/move/release events and paints whatever phase it lands in.
#[derive(Debug)]
pub struct DragSession {
    config: OutlineDragConfig,
    phase: DragPhase,
    epoch: u64,
    scroll: AutoScroll,
    suppress_until: Option<Instant>,
}

impl DragSession {
    pub fn new(config: OutlineDragConfig) -> Self {
        Self {
            config,
            phase: DragPhase::Idle,
            epoch: 0,
            scroll: AutoScroll::default(),
            suppress_until: None,
        }
    }

    pub fn config(&self) -> &OutlineDragConfig {
        &self.config
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, DragPhase::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, DragPhase::Active { .. })
    }

    /// Identity of the current session. Deferred work captures this and
    /// bails when it no longer matches, so a stale timer can never touch a
    /// later session.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn active_source(&self) -> Option<&DragSource> {
        match &self.phase {
            DragPhase::Active { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn pointer(&self) -> Option<Point<Pixels>> {
        match &self.phase {
            DragPhase::Active { pointer, .. } => Some(*pointer),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&ResolvedTarget> {
        match &self.phase {
            DragPhase::Active { target, .. } => target.as_ref(),
            _ => None,
        }
    }

    /// Arm a session on a press over a drag handle. Refuses while another
    /// session is live, for touch pointers, and for expanded sections.
    pub fn arm(
        &mut self,
        class: PointerClass,
        handle: HandleKind,
        source: DragSource,
        origin: Point<Pixels>,
    ) -> bool {
        if !self.is_idle() {
            return false;
        }
        if class == PointerClass::Touch {
            return false;
        }
        if let HandleKind::Section { collapsed: false } = handle {
            return false;
        }
        self.epoch = self.epoch.wrapping_add(1);
        self.phase = DragPhase::Armed { source, origin };
        true
    }

    /// Route a pointer move through the session.
    pub fn pointer_moved(&mut self, position: Point<Pixels>) -> DragMove {
        match &mut self.phase {
            DragPhase::Idle => DragMove::Ignored,
            DragPhase::Armed { source, origin } => {
                if pointer_distance(position, *origin) < f32::from(self.config.threshold) {
                    return DragMove::BelowThreshold;
                }
                self.phase = DragPhase::Active {
                    source: *source,
                    origin: *origin,
                    pointer: position,
                    target: None,
                };
                DragMove::Started
            }
            DragPhase::Active { pointer, .. } => {
                *pointer = position;
                DragMove::Tracking
            }
        }
    }

    /// Replace the resolved target. Returns true when it changed, so the
    /// caller only repaints on real movement between slots.
    pub fn set_target(&mut self, new_target: Option<ResolvedTarget>) -> bool {
        if let DragPhase::Active { target, .. } = &mut self.phase
            && *target != new_target
        {
            *target = new_target;
            return true;
        }
        false
    }

    /// Route the pointer release. Ends the session either way; an active
    /// drag additionally starts the click cooldown.
    pub fn release(&mut self, now: Instant) -> DragRelease {
        self.scroll = AutoScroll::default();
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => DragRelease::Ignored,
            DragPhase::Armed { .. } => DragRelease::Click,
            DragPhase::Active { source, target, .. } => {
                self.begin_cooldown(now);
                DragRelease::Drop { source, target }
            }
        }
    }

    /// Tear the session down without dropping anywhere. Safe to call in any
    /// phase; returns whether a session was live.
    pub fn cancel(&mut self, now: Instant) -> bool {
        self.scroll = AutoScroll::default();
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => false,
            DragPhase::Armed { .. } => true,
            DragPhase::Active { .. } => {
                self.begin_cooldown(now);
                true
            }
        }
    }

    /// Whether a click arriving now belongs to a drag and must not toggle
    /// anything.
    pub fn should_suppress_click(&self, now: Instant) -> bool {
        if self.is_active() {
            return true;
        }
        self.suppress_until.is_some_and(|until| now < until)
    }

    /// Point the auto-scroll at a new direction (or stop it). Changing
    /// direction restarts the cadence.
    pub fn update_scroll(&mut self, direction: Option<ScrollDirection>) {
        if self.scroll.direction != direction {
            self.scroll = AutoScroll {
                direction,
                last_tick: None,
            };
        }
    }

    /// Returns the scroll delta to apply if a tick is due. The first call
    /// after a direction change only starts the clock.
    pub fn scroll_tick(&mut self, now: Instant) -> Option<Pixels> {
        if !self.is_active() {
            return None;
        }
        let direction = self.scroll.direction?;
        let Some(last) = self.scroll.last_tick else {
            self.scroll.last_tick = Some(now);
            return None;
        };
        if now.duration_since(last) < self.config.scroll_tick {
            return None;
        }
        self.scroll.last_tick = Some(now);
        Some(match direction {
            ScrollDirection::Up => -self.config.scroll_speed,
            ScrollDirection::Down => self.config.scroll_speed,
        })
    }

    fn begin_cooldown(&mut self, now: Instant) {
        self.suppress_until = Some(now + self.config.suppress_cooldown);
    }
}

fn pointer_distance(a: Point<Pixels>, b: Point<Pixels>) -> f32 {
    let dx: f32 = (a.x - b.x).into();
    let dy: f32 = (a.y - b.y).into();
    dx.hypot(dy)
}

/// Map a pointer position to the insertion slot it designates.
///
/// `rows` is the visible rows in paint order, `scroll_y` the list's scroll
/// offset (zero or negative). Item rows split at their vertical midpoint
/// into the gap above and the gap below; a section header designates the
/// first slot of that section; space past the last row appends to the root.
/// A pointer outside the list designates nothing and hides the marker.
pub fn resolve_target(
    rows: &[RowTarget],
    root_len: usize,
    position: Point<Pixels>,
    list_bounds: Bounds<Pixels>,
    row_height: Pixels,
    scroll_y: Pixels,
) -> Option<ResolvedTarget> {
    if !list_bounds.contains(&position) {
        return None;
    }
    let y_in_list = position.y - list_bounds.top() - scroll_y;
    let row_ix = (y_in_list / row_height).floor().max(0.) as usize;
    let Some(row) = rows.get(row_ix) else {
        return Some(ResolvedTarget {
            container: ContainerId::Root,
            index: root_len,
            line_y: row_height * rows.len() + scroll_y,
        });
    };
    match row.kind {
        RowKind::SectionHeader => Some(ResolvedTarget {
            container: ContainerId::Items(row.node),
            index: 0,
            line_y: row_height * (row_ix + 1) + scroll_y,
        }),
        RowKind::Item => {
            let offset = y_in_list - row_height * row_ix;
            let before = offset < row_height / 2.;
            let gap_row = if before { row_ix } else { row_ix + 1 };
            Some(ResolvedTarget {
                container: row.container,
                index: if before { row.index } else { row.index + 1 },
                line_y: row_height * gap_row + scroll_y,
            })
        }
    }
}

/// Which way the list should auto-scroll for a pointer at `position`. The
/// bands extend past the list edges so a pointer dragged slightly outside
/// keeps scrolling.
pub fn scroll_direction(
    position: Point<Pixels>,
    list_bounds: Bounds<Pixels>,
    margin: Pixels,
) -> Option<ScrollDirection> {
    if position.y < list_bounds.top() + margin {
        Some(ScrollDirection::Up)
    } else if position.y > list_bounds.bottom() - margin {
        Some(ScrollDirection::Down)
    } else {
        None
    }
}
