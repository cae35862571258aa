use std::{ops::Range, rc::Rc, time::Instant};

use gpui::{
    App, AppContext as _, Bounds, ClickEvent, Context, Element, ElementId, Entity, EventEmitter,
    FocusHandle, Focusable, GlobalElementId, InspectorElementId, InteractiveElement as _,
    IntoElement, KeyDownEvent, LayoutId, ListSizingBehavior, MouseButton, MouseDownEvent,
    MouseMoveEvent, MouseUpEvent, ParentElement as _, Pixels, Point, Render, RenderOnce,
    ScrollStrategy, SharedString,
    StatefulInteractiveElement as _, Style, StyleRefinement, Styled, Timer,
    UniformListScrollHandle, Window, div, prelude::FluentBuilder as _, px, relative, uniform_list,
};
use gpui_component::list::ListItem;
use gpui_component::scroll::{Scrollbar, ScrollbarState};
use gpui_component::{ActiveTheme as _, StyledExt as _};
use gpui_checklist_core::{
    ChecklistDoc, ContainerId, DragSource, DropOutcome, Node, NodeId, SectionFilter, apply_drop,
};

use crate::engine::{
    DragMove, DragRelease, DragSession, HandleKind, OutlineDragConfig, PointerClass, ResolvedTarget,
    RowKind, RowTarget, resolve_target, scroll_direction,
};

const CONTEXT: &str = "DndOutline";

/// Create a [`DndOutline`].
pub fn dnd_outline<R>(state: &Entity<DndOutlineState>, render_item: R) -> DndOutline
where
    R: Fn(usize, &OutlineEntry, OutlineRowState, &mut Window, &mut App) -> ListItem + 'static,
{
    DndOutline::new(state, render_item)
}

/// One visible row of the flattened document. Rows under a collapsed
/// section, and items a section filter hides, get no entry; `index` still
/// names the node's true position inside its container.
#[derive(Debug, Clone)]
pub struct OutlineEntry {
    node: NodeId,
    kind: RowKind,
    container: ContainerId,
    index: usize,
    depth: usize,
    label: SharedString,
    checked: bool,
    collapsed: bool,
    filter: Option<SectionFilter>,
    bg_color: Option<SharedString>,
}

impl OutlineEntry {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_section(&self) -> bool {
        self.kind == RowKind::SectionHeader
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn label(&self) -> &SharedString {
        &self.label
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn filter(&self) -> Option<SectionFilter> {
        self.filter
    }

    pub fn bg_color(&self) -> Option<&SharedString> {
        self.bg_color.as_ref()
    }
}

/// Row flags passed to the item renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutlineRowState {
    pub selected: bool,
    pub dragging: bool,
}

/// A completed move, reported after the document was updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineReorder {
    pub node: NodeId,
    pub from: (ContainerId, usize),
    pub to: (ContainerId, usize),
}

/// Emitted by [`DndOutlineState`]. `Changed` follows every edit to the
/// document, reorders included; subscribers hang persistence off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineEvent {
    Changed,
    Reordered(OutlineReorder),
}

/// State for a drag-reorderable checklist outline.
pub struct DndOutlineState {
    focus_handle: FocusHandle,
    doc: ChecklistDoc,
    entries: Vec<OutlineEntry>,
    rows: Vec<RowTarget>,
    session: DragSession,
    scroll_handle: UniformListScrollHandle,
    scrollbar_state: ScrollbarState,
    viewport_bounds: Bounds<Pixels>,
    indent_width: Pixels,
    drag_handle_width: Option<Pixels>,
    selected_ix: Option<usize>,
    render_item:
        Rc<dyn Fn(usize, &OutlineEntry, OutlineRowState, &mut Window, &mut App) -> ListItem>,
}

impl DndOutlineState {
    pub fn new(cx: &mut App) -> Self {
        Self {
            focus_handle: cx.focus_handle(),
            doc: ChecklistDoc::new(""),
            entries: Vec::new(),
            rows: Vec::new(),
            session: DragSession::new(OutlineDragConfig::default()),
            scroll_handle: UniformListScrollHandle::default(),
            scrollbar_state: ScrollbarState::default(),
            viewport_bounds: Bounds::default(),
            indent_width: px(16.),
            drag_handle_width: None,
            selected_ix: None,
            render_item: Rc::new(|_, _, _, _, _| ListItem::new("dnd-outline-empty")),
        }
    }

    pub fn doc(mut self, doc: ChecklistDoc) -> Self {
        self.doc = doc;
        self.rebuild_entries();
        self
    }

    pub fn indent_width(mut self, width: Pixels) -> Self {
        self.indent_width = width;
        self
    }

    pub fn drag_config(mut self, config: OutlineDragConfig) -> Self {
        self.session = DragSession::new(config);
        self
    }

    /// Restrict drag starts to a handle band of the given width at each
    /// row's indented left edge, where its checkbox or chevron sits.
    pub fn drag_handle_width(mut self, width: Pixels) -> Self {
        self.drag_handle_width = Some(width);
        self
    }

    /// Allow dragging from anywhere on the row. This is the default.
    pub fn drag_on_row(mut self) -> Self {
        self.drag_handle_width = None;
        self
    }

    pub fn doc_ref(&self) -> &ChecklistDoc {
        &self.doc
    }

    pub fn entries_ref(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_ix
    }

    pub fn set_selected_index(&mut self, ix: Option<usize>, cx: &mut Context<Self>) {
        self.selected_ix = ix;
        cx.notify();
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_active()
    }

    /// Replace the whole document, dropping any live drag session.
    pub fn set_doc(&mut self, doc: ChecklistDoc, cx: &mut Context<Self>) {
        self.doc = doc;
        self.session.cancel(Instant::now());
        self.selected_ix = None;
        self.rebuild_entries();
        cx.notify();
    }

    pub fn expand_all(&mut self, cx: &mut Context<Self>) {
        self.doc.set_all_collapsed(false);
        self.after_doc_change(cx);
    }

    pub fn collapse_all(&mut self, cx: &mut Context<Self>) {
        self.doc.set_all_collapsed(true);
        self.after_doc_change(cx);
    }

    pub fn clear_filters(&mut self, cx: &mut Context<Self>) {
        if self.doc.clear_all_filters() {
            self.after_doc_change(cx);
        }
    }

    /// Advance the selected section's filter to its next state. Does nothing
    /// when the selection is not a section header.
    pub fn cycle_filter_on_selected(&mut self, cx: &mut Context<Self>) {
        let Some(entry) = self.selected_ix.and_then(|ix| self.entries.get(ix)) else {
            return;
        };
        if entry.kind != RowKind::SectionHeader {
            return;
        }
        let node = entry.node;
        if self.doc.cycle_filter(node) {
            self.after_doc_change(cx);
        }
    }

    /// Abort any live drag without moving anything.
    pub fn cancel_drag(&mut self, cx: &mut Context<Self>) {
        if self.session.cancel(Instant::now()) {
            cx.notify();
        }
    }

    fn rebuild_entries(&mut self) {
        self.entries = build_entries(&self.doc);
        self.rows = self
            .entries
            .iter()
            .map(|entry| RowTarget {
                node: entry.node,
                kind: entry.kind,
                container: entry.container,
                index: entry.index,
            })
            .collect();
    }

    fn after_doc_change(&mut self, cx: &mut Context<Self>) {
        self.rebuild_entries();
        self.selected_ix = match self.selected_ix {
            Some(ix) if !self.entries.is_empty() => Some(ix.min(self.entries.len() - 1)),
            _ => None,
        };
        cx.emit(OutlineEvent::Changed);
        cx.notify();
    }

    fn scroll_metrics(&self) -> (Pixels, Pixels) {
        let state = self.scroll_handle.0.borrow();
        let scroll_y = state.base_handle.offset().y;
        let row_height = state
            .last_item_size
            .map(|s| s.item.height)
            .unwrap_or(px(28.));
        (scroll_y, row_height)
    }

    fn on_row_pointer_down(
        &mut self,
        ix: usize,
        event: &MouseDownEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let Some(entry) = self.entries.get(ix) else {
            return;
        };
        if let Some(width) = self.drag_handle_width
            && !within_handle_band(
                event.position.x,
                self.viewport_bounds.origin.x,
                self.indent_width,
                entry.depth,
                width,
            )
        {
            return;
        }
        let handle = match entry.kind {
            RowKind::Item => HandleKind::Item,
            RowKind::SectionHeader => HandleKind::Section {
                collapsed: entry.collapsed,
            },
        };
        let source = DragSource {
            node: entry.node,
            container: entry.container,
            index: entry.index,
        };
        if self
            .session
            .arm(PointerClass::Mouse, handle, source, event.position)
        {
            cx.notify();
        }
    }

    fn on_pointer_move(
        &mut self,
        event: &MouseMoveEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.session.is_idle() {
            return;
        }
        if event.pressed_button != Some(MouseButton::Left) {
            // The release happened where we could not see it.
            if self.session.cancel(Instant::now()) {
                cx.notify();
            }
            return;
        }
        match self.session.pointer_moved(event.position) {
            DragMove::Ignored | DragMove::BelowThreshold => {}
            DragMove::Started => {
                if let Some(node) = self.session.active_source().map(|s| s.node) {
                    self.selected_ix = self.entries.iter().position(|e| e.node == node);
                }
                self.refresh_target(event.position);
                self.spawn_auto_scroll_ticks(window, cx);
                cx.notify();
            }
            DragMove::Tracking => {
                self.refresh_target(event.position);
                cx.notify();
            }
        }
    }

    fn refresh_target(&mut self, position: Point<Pixels>) -> bool {
        let (scroll_y, row_height) = self.scroll_metrics();
        let target = resolve_target(
            &self.rows,
            self.doc.items.len(),
            position,
            self.viewport_bounds,
            row_height,
            scroll_y,
        );
        let changed = self.session.set_target(target);
        self.session.update_scroll(scroll_direction(
            position,
            self.viewport_bounds,
            self.session.config().scroll_margin,
        ));
        changed
    }

    fn finish_drag(&mut self, _window: &mut Window, cx: &mut Context<Self>) {
        match self.session.release(Instant::now()) {
            DragRelease::Ignored => {}
            DragRelease::Click => {}
            DragRelease::Drop { source, target } => {
                let Some(target) = target else {
                    cx.notify();
                    return;
                };
                match apply_drop(&mut self.doc, &source, target.container, target.index) {
                    DropOutcome::Moved { from, to } => {
                        cx.emit(OutlineEvent::Reordered(OutlineReorder {
                            node: source.node,
                            from,
                            to,
                        }));
                        self.after_doc_change(cx);
                    }
                    _ => cx.notify(),
                }
            }
        }
    }

    fn spawn_auto_scroll_ticks(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let epoch = self.session.epoch();
        let tick = self.session.config().scroll_tick;
        let this = cx.entity();
        cx.spawn_in(window, async move |_, window| {
            loop {
                Timer::after(tick).await;
                let live = window
                    .update(|_, cx| {
                        this.update(cx, |state, cx| {
                            if state.session.epoch() != epoch || !state.session.is_active() {
                                return false;
                            }
                            state.auto_scroll_tick(cx);
                            true
                        })
                    })
                    .unwrap_or(false);
                if !live {
                    break;
                }
            }
        })
        .detach();
    }

    fn auto_scroll_tick(&mut self, cx: &mut Context<Self>) {
        let Some(delta) = self.session.scroll_tick(Instant::now()) else {
            return;
        };
        let base = self.scroll_handle.0.borrow().base_handle.clone();
        let mut offset = base.offset();
        offset.y -= delta;
        base.set_offset(offset);
        // The pointer has not moved, but the rows under it have.
        if let Some(pointer) = self.session.pointer() {
            self.refresh_target(pointer);
        }
        cx.notify();
    }

    fn on_row_click(
        &mut self,
        ix: usize,
        _event: &ClickEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.session.should_suppress_click(Instant::now()) {
            return;
        }
        self.activate_row(ix, cx);
    }

    fn activate_row(&mut self, ix: usize, cx: &mut Context<Self>) {
        let Some(entry) = self.entries.get(ix) else {
            return;
        };
        self.selected_ix = Some(ix);
        let node = entry.node;
        let changed = match entry.kind {
            RowKind::Item => self.doc.toggle_checked(node),
            RowKind::SectionHeader => self.doc.toggle_collapsed(node),
        };
        if changed {
            self.after_doc_change(cx);
        } else {
            cx.notify();
        }
    }

    fn on_key_down(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) -> bool {
        if !self.session.is_idle() {
            if event.keystroke.key.as_str() == "escape" {
                self.cancel_drag(cx);
                return true;
            }
            return false;
        }
        if self.entries.is_empty() {
            return false;
        }
        let selected_ix = self.selected_ix.unwrap_or(0).min(self.entries.len() - 1);

        let select = |this: &mut Self, ix: usize, cx: &mut Context<Self>| {
            this.selected_ix = Some(ix);
            this.scroll_handle.scroll_to_item(ix, ScrollStrategy::Center);
            cx.notify();
        };

        match event.keystroke.key.as_str() {
            "up" => {
                select(self, selected_ix.saturating_sub(1), cx);
                true
            }
            "down" => {
                select(self, (selected_ix + 1).min(self.entries.len() - 1), cx);
                true
            }
            "enter" | "space" => {
                self.activate_row(selected_ix, cx);
                true
            }
            "escape" => {
                if self.selected_ix.take().is_some() {
                    cx.notify();
                }
                true
            }
            _ => false,
        }
    }

    fn marker_indent(&self, container: ContainerId) -> Pixels {
        self.indent_width * container_depth(&self.entries, container)
    }
}

impl EventEmitter<OutlineEvent> for DndOutlineState {}

impl Focusable for DndOutlineState {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for DndOutlineState {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let render_item = Rc::clone(&self.render_item);
        let dragged = self.session.active_source().map(|s| s.node);

        let line = self.session.target().map(|target| {
            let theme = cx.theme();
            div()
                .absolute()
                .left(self.marker_indent(target.container))
                .right_0()
                .top(target.line_y)
                .h(px(2.))
                .bg(theme.drag_border)
        });

        let ghost = self.session.pointer().and_then(|pointer| {
            let node = self.session.active_source()?.node;
            let label = self
                .doc
                .find(node)
                .map(|n| SharedString::from(n.label().to_string()))?;
            let origin = self.viewport_bounds.origin;
            let theme = cx.theme();
            Some(
                div()
                    .absolute()
                    .left(pointer.x - origin.x + px(8.))
                    .top(pointer.y - origin.y + px(8.))
                    .px(px(10.))
                    .py(px(6.))
                    .rounded(px(8.))
                    .bg(theme.popover)
                    .border_1()
                    .border_color(theme.border)
                    .shadow_md()
                    .text_color(theme.popover_foreground)
                    .text_sm()
                    .opacity(0.7)
                    .child(label),
            )
        });

        let state_entity = cx.entity();
        div()
            .id("dnd-outline-state")
            .size_full()
            .relative()
            .child(
                uniform_list("rows", self.entries.len(), {
                    cx.processor(move |state, visible_range: Range<usize>, window, cx| {
                        let mut items = Vec::with_capacity(visible_range.len());
                        for ix in visible_range {
                            let entry = &state.entries[ix];
                            let row_state = OutlineRowState {
                                selected: Some(ix) == state.selected_ix,
                                dragging: dragged == Some(entry.node),
                            };
                            let item = (render_item)(ix, entry, row_state, window, cx);
                            let row = div()
                                .id(ix)
                                .child(item)
                                .on_mouse_down(
                                    MouseButton::Left,
                                    cx.listener(move |this, event: &MouseDownEvent, window, cx| {
                                        this.on_row_pointer_down(ix, event, window, cx);
                                    }),
                                )
                                .on_click(cx.listener(
                                    move |this, event: &ClickEvent, window, cx| {
                                        this.on_row_click(ix, event, window, cx);
                                    },
                                ));
                            items.push(row);
                        }
                        items
                    })
                })
                .flex_grow()
                .size_full()
                .track_scroll(self.scroll_handle.clone())
                .with_sizing_behavior(ListSizingBehavior::Auto)
                .into_any_element(),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .size_full()
                    .child(DragOverlayElement::new(&state_entity)),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .right_0()
                    .bottom_0()
                    .w(px(12.))
                    .child(Scrollbar::uniform_scroll(
                        &self.scrollbar_state,
                        &self.scroll_handle,
                    )),
            )
            .when_some(line, |this, line| this.child(line))
            .when_some(ghost, |this, ghost| this.child(ghost))
    }
}

/// Invisible overlay that tracks the list's bounds and, while a session is
/// live, watches pointer moves and the release at the window level so a drag
/// keeps working after the pointer leaves the row it started on.
struct DragOverlayElement {
    state: Entity<DndOutlineState>,
}

impl DragOverlayElement {
    fn new(state: &Entity<DndOutlineState>) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

impl IntoElement for DragOverlayElement {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

impl Element for DragOverlayElement {
    type RequestLayoutState = ();
    type PrepaintState = ();

    fn id(&self) -> Option<ElementId> {
        None
    }

    fn source_location(&self) -> Option<&'static std::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        window: &mut Window,
        cx: &mut App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let mut style = Style::default();
        style.size.width = relative(1.).into();
        style.size.height = relative(1.).into();
        (window.request_layout(style, [], cx), ())
    }

    fn prepaint(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        _window: &mut Window,
        cx: &mut App,
    ) -> Self::PrepaintState {
        self.state.update(cx, |state, _| {
            state.viewport_bounds = bounds;
        });
    }

    fn paint(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        _bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        _prepaint: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) {
        if self.state.read(cx).session.is_idle() {
            return;
        }

        window.on_mouse_event({
            let state = self.state.clone();
            move |event: &MouseMoveEvent, _, window, cx| {
                state.update(cx, |this, cx| this.on_pointer_move(event, window, cx));
            }
        });

        window.on_mouse_event({
            let state = self.state.clone();
            move |event: &MouseUpEvent, _, window, cx| {
                if event.button != MouseButton::Left {
                    return;
                }
                state.update(cx, |this, cx| this.finish_drag(window, cx));
            }
        });
    }
}

/// A drag-reorderable checklist outline element.
#[derive(IntoElement)]
pub struct DndOutline {
    id: ElementId,
    state: Entity<DndOutlineState>,
    style: StyleRefinement,
    render_item:
        Rc<dyn Fn(usize, &OutlineEntry, OutlineRowState, &mut Window, &mut App) -> ListItem>,
}

impl DndOutline {
    pub fn new<R>(state: &Entity<DndOutlineState>, render_item: R) -> Self
    where
        R: Fn(usize, &OutlineEntry, OutlineRowState, &mut Window, &mut App) -> ListItem + 'static,
    {
        Self {
            id: ElementId::Name(format!("dnd-outline-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(move |ix, entry, row_state, window, cx| {
                render_item(ix, entry, row_state, window, cx)
            }),
        }
    }
}

impl Styled for DndOutline {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for DndOutline {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        let state_entity = self.state.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .on_key_down(move |event, window, cx| {
                let handled = state_entity.update(cx, |state, cx| state.on_key_down(event, cx));
                if handled {
                    window.prevent_default();
                    cx.stop_propagation();
                }
            })
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}

fn build_entries(doc: &ChecklistDoc) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    collect_entries(&doc.items, ContainerId::Root, 0, None, &mut entries);
    entries
}

fn collect_entries(
    nodes: &[Node],
    container: ContainerId,
    depth: usize,
    filter: Option<SectionFilter>,
    entries: &mut Vec<OutlineEntry>,
) {
    for (index, node) in nodes.iter().enumerate() {
        if filter.is_some_and(|f| f.hides(node)) {
            continue;
        }
        match node {
            Node::Item(item) => entries.push(OutlineEntry {
                node: item.id,
                kind: RowKind::Item,
                container,
                index,
                depth,
                label: SharedString::from(item.text.clone()),
                checked: item.checked,
                collapsed: false,
                filter: None,
                bg_color: None,
            }),
            Node::Section(section) => {
                entries.push(OutlineEntry {
                    node: section.id,
                    kind: RowKind::SectionHeader,
                    container,
                    index,
                    depth,
                    label: SharedString::from(section.title.clone()),
                    checked: false,
                    collapsed: section.collapsed,
                    filter: section.filter,
                    bg_color: section.bg_color.clone().map(SharedString::from),
                });
                if !section.collapsed {
                    collect_entries(
                        &section.items,
                        ContainerId::Items(section.id),
                        depth + 1,
                        section.filter,
                        entries,
                    );
                }
            }
        }
    }
}

fn container_depth(entries: &[OutlineEntry], container: ContainerId) -> usize {
    match container {
        ContainerId::Root => 0,
        ContainerId::Items(section) => entries
            .iter()
            .find(|entry| entry.node == section)
            .map(|entry| entry.depth + 1)
            .unwrap_or(0),
    }
}

/// Whether a pointer x falls inside the drag-handle band of a row at the
/// given depth. The band starts at the row's indented left edge.
fn within_handle_band(
    x: Pixels,
    viewport_left: Pixels,
    indent_width: Pixels,
    depth: usize,
    width: Pixels,
) -> bool {
    let left = viewport_left + indent_width * depth;
    x >= left && x <= left + width
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui_checklist_core::{ItemNode, SectionNode};

    fn sample() -> ChecklistDoc {
        let mut doc = ChecklistDoc::new("Groceries");
        doc.items.push(Node::item("Milk"));
        doc.items.push(
            SectionNode::new("Produce")
                .child(Node::item("Apples"))
                .child(Node::item("Bananas"))
                .into(),
        );
        doc.items.push(Node::item("Bread"));
        doc
    }

    fn labels(entries: &[OutlineEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_ref()).collect()
    }

    #[test]
    fn entries_flatten_the_visible_rows_in_order() {
        let doc = sample();
        let entries = build_entries(&doc);
        assert_eq!(
            labels(&entries),
            ["Milk", "Produce", "Apples", "Bananas", "Bread"]
        );

        let produce = doc.items[1].id();
        assert_eq!(entries[0].container, ContainerId::Root);
        assert_eq!(entries[0].index, 0);
        assert_eq!(entries[0].depth, 0);
        assert_eq!(entries[0].kind, RowKind::Item);

        assert_eq!(entries[1].kind, RowKind::SectionHeader);
        assert_eq!(entries[1].node, produce);
        assert_eq!(entries[1].index, 1);

        assert_eq!(entries[2].container, ContainerId::Items(produce));
        assert_eq!(entries[2].index, 0);
        assert_eq!(entries[2].depth, 1);

        assert_eq!(entries[4].container, ContainerId::Root);
        assert_eq!(entries[4].index, 2);
    }

    #[test]
    fn collapsed_sections_keep_their_rows_out_of_the_flat_list() {
        let mut doc = ChecklistDoc::new("Groceries");
        doc.items.push(
            SectionNode::new("Pantry")
                .collapsed(true)
                .child(Node::item("Rice"))
                .child(Node::item("Beans"))
                .into(),
        );
        doc.items.push(Node::item("Milk"));

        let entries = build_entries(&doc);
        assert_eq!(labels(&entries), ["Pantry", "Milk"]);
        assert!(entries[0].collapsed);
        // The sibling after the section keeps its true container position.
        assert_eq!(entries[1].index, 1);
    }

    #[test]
    fn section_filters_hide_items_but_keep_true_indices() {
        let mut doc = ChecklistDoc::new("Groceries");
        doc.items.push(
            SectionNode::new("Produce")
                .filter(SectionFilter::Checked)
                .child(Node::item("Apples"))
                .child(ItemNode::new("Bananas").checked(true).into())
                .child(Node::item("Cherries"))
                .child(ItemNode::new("Dates").checked(true).into())
                .into(),
        );

        // The checked filter keeps only the checked rows visible.
        let entries = build_entries(&doc);
        assert_eq!(labels(&entries), ["Produce", "Bananas", "Dates"]);
        assert_eq!(entries[1].index, 1);
        assert_eq!(entries[2].index, 3);
    }

    #[test]
    fn a_filter_never_hides_nested_sections() {
        let mut doc = ChecklistDoc::new("Groceries");
        doc.items.push(
            SectionNode::new("Produce")
                .filter(SectionFilter::Unchecked)
                .child(ItemNode::new("Apples").checked(true).into())
                .child(
                    SectionNode::new("Herbs")
                        .child(Node::item("Basil"))
                        .into(),
                )
                .into(),
        );

        let entries = build_entries(&doc);
        // "Apples" is checked, so the unchecked filter hides it; the
        // sub-section and its own unfiltered items stay visible.
        assert_eq!(labels(&entries), ["Produce", "Herbs", "Basil"]);
        assert_eq!(entries[2].depth, 2);
    }

    #[test]
    fn handle_band_follows_row_indentation() {
        // Depth scales the band start by the indent width.
        assert!(within_handle_band(px(4.), px(0.), px(16.), 0, px(40.)));
        assert!(!within_handle_band(px(4.), px(0.), px(16.), 2, px(40.)));
        assert!(within_handle_band(px(36.), px(0.), px(16.), 2, px(40.)));
        assert!(within_handle_band(px(72.), px(0.), px(16.), 2, px(40.)));
        assert!(!within_handle_band(px(73.), px(0.), px(16.), 2, px(40.)));
        // The viewport origin shifts the whole band.
        assert!(!within_handle_band(px(36.), px(200.), px(16.), 2, px(40.)));
    }

    #[test]
    fn container_depth_follows_the_section_header() {
        let mut doc = ChecklistDoc::new("Groceries");
        doc.items.push(
            SectionNode::new("Outer")
                .child(SectionNode::new("Inner").child(Node::item("Leaf")).into())
                .into(),
        );
        let outer = doc.items[0].id();
        let inner = doc.items[0].as_section().map(|s| s.items[0].id());

        let entries = build_entries(&doc);
        assert_eq!(container_depth(&entries, ContainerId::Root), 0);
        assert_eq!(container_depth(&entries, ContainerId::Items(outer)), 1);
        if let Some(inner) = inner {
            assert_eq!(container_depth(&entries, ContainerId::Items(inner)), 2);
        }
        assert_eq!(
            container_depth(&entries, ContainerId::Items(NodeId::next())),
            0
        );
    }
}
