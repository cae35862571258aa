use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use anyhow::Result;
use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::ActiveTheme as _;
use gpui_component::WindowExt as _;
use gpui_component::button::{Button, ButtonVariants as _};
use gpui_component::checkbox::Checkbox;
use gpui_component::list::ListItem;
use gpui_component::notification::Notification;
use gpui_component::{Icon, IconName, Sizable as _, h_flex, v_flex};
use gpui_checklist_core::{
    ChecklistDoc, ContainerId, Contrast, ItemNode, Node, SectionFilter, SectionNode,
    contrast_color, parse_hex_color,
};
use gpui_dnd_outline::{
    DndOutlineState, OutlineEntry, OutlineEvent, OutlineReorder, OutlineRowState, dnd_outline,
};

const SAVE_DEBOUNCE_MS: u64 = 2000;

pub struct ChecklistExample {
    outline: Entity<DndOutlineState>,
    file_path: PathBuf,
    save_seq: u64,
    dirty: bool,
    autosave: bool,
    last_reorder: Option<String>,
}

impl ChecklistExample {
    pub fn view(window: &mut Window, cx: &mut App) -> Entity<Self> {
        cx.new(|cx| Self::new(window, cx))
    }

    fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let file_path = storage_path();
        let (doc, autosave) = match load_doc(&file_path) {
            Ok(Some(doc)) => (doc, true),
            Ok(None) => (demo_doc(), true),
            Err(err) => {
                // Show the demo, but never autosave over a file we could
                // not read.
                eprintln!("failed to load {}: {err:#}", file_path.display());
                (demo_doc(), false)
            }
        };
        let outline = cx.new(|cx| {
            DndOutlineState::new(cx)
                .doc(doc)
                .drag_handle_width(px(40.))
        });

        cx.subscribe(&outline, |this, _, event: &OutlineEvent, cx| {
            if let OutlineEvent::Reordered(reorder) = event {
                let description = describe_reorder(this.outline.read(cx).doc_ref(), reorder);
                this.last_reorder = Some(description);
            }
            this.dirty = true;
            this.schedule_save(cx);
            cx.notify();
        })
        .detach();

        window.focus(&outline.focus_handle(cx));

        Self {
            outline,
            file_path,
            save_seq: 0,
            dirty: false,
            autosave,
            last_reorder: None,
        }
    }

    fn schedule_save(&mut self, cx: &mut Context<Self>) {
        // A failed load leaves autosave off; only an explicit Save may
        // overwrite the file we could not read.
        if !self.autosave {
            return;
        }
        self.save_seq = self.save_seq.wrapping_add(1);
        let save_seq = self.save_seq;
        let this = cx.entity();

        cx.spawn(async move |_, cx| {
            Timer::after(Duration::from_millis(SAVE_DEBOUNCE_MS)).await;

            let payload = this
                .update(cx, |this, cx| {
                    if this.save_seq != save_seq {
                        return None;
                    }
                    let json = serde_json::to_string_pretty(this.outline.read(cx).doc_ref()).ok()?;
                    Some((this.file_path.clone(), json))
                })
                .ok()
                .flatten();
            let Some((path, json)) = payload else {
                return;
            };

            match std::fs::write(&path, &json) {
                Ok(()) => {
                    this.update(cx, |this, cx| {
                        if this.save_seq == save_seq {
                            this.dirty = false;
                            cx.notify();
                        }
                    })
                    .ok();
                }
                Err(err) => {
                    eprintln!("failed to save {}: {err}", path.display());
                }
            }
        })
        .detach();
    }

    fn save_now(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        // Step past any pending debounced save so it does not double-write.
        self.save_seq = self.save_seq.wrapping_add(1);
        let json = serde_json::to_string_pretty(self.outline.read(cx).doc_ref())
            .unwrap_or_else(|_| "{}".to_string());
        let path = self.file_path.clone();
        let this = cx.entity();

        cx.spawn_in(window, async move |_, window| {
            match std::fs::write(&path, json) {
                Ok(()) => {
                    let message = format!("Saved to {}", path.display());
                    window
                        .update(|window, cx| {
                            this.update(cx, |this, cx| {
                                this.dirty = false;
                                this.autosave = true;
                                cx.notify();
                            });
                            window.push_notification(Notification::new().message(message), cx);
                        })
                        .ok();
                }
                Err(err) => {
                    let message = format!("Failed to save: {err}");
                    window
                        .update(|window, cx| {
                            window.push_notification(Notification::new().message(message), cx);
                        })
                        .ok();
                }
            }
        })
        .detach();
    }
}

impl Render for ChecklistExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let muted = theme.muted_foreground;
        let border = theme.border;
        let background = theme.background;

        let doc_dump = format_doc(self.outline.read(cx).doc_ref());
        let dragging = self.outline.read(cx).is_dragging();

        let mut status = format!(
            "{} · {}",
            self.file_path.display(),
            if dragging {
                "dragging"
            } else if !self.autosave {
                "load failed, autosave off"
            } else if self.dirty {
                "unsaved changes"
            } else {
                "saved"
            }
        );
        if let Some(last) = &self.last_reorder {
            status.push_str(" · ");
            status.push_str(last);
        }

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .child("Checklist"),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(muted)
                            .child("Tip: drag a row by its checkbox or chevron to reorder (upper half = above, lower half = below). Drop onto a section header to file the row at its top. Collapse a section to move it whole; expanded sections stay put. Click toggles items and folds sections; Escape cancels a drag."),
                    )
                    .child(div().text_sm().text_color(muted).child(status)),
            )
            .child(
                h_flex()
                    .gap_x_2()
                    .child(
                        Button::new("expand-all")
                            .ghost()
                            .label("Expand All")
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.outline.update(cx, |outline, cx| outline.expand_all(cx));
                            })),
                    )
                    .child(
                        Button::new("collapse-all")
                            .ghost()
                            .label("Collapse All")
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.outline.update(cx, |outline, cx| outline.collapse_all(cx));
                            })),
                    )
                    .child(
                        Button::new("cycle-filter")
                            .ghost()
                            .label("Cycle Filter")
                            .tooltip("Advance the selected section's filter: show all, checked only, unchecked only")
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.outline
                                    .update(cx, |outline, cx| outline.cycle_filter_on_selected(cx));
                            })),
                    )
                    .child(
                        Button::new("clear-filters")
                            .ghost()
                            .label("Clear Filters")
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.outline.update(cx, |outline, cx| outline.clear_filters(cx));
                            })),
                    )
                    .child(
                        Button::new("save")
                            .ghost()
                            .label("Save")
                            .tooltip("Write the list to disk now")
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.save_now(window, cx);
                            })),
                    ),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .child(
                        v_flex()
                            .w(px(420.))
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Outline"),
                            )
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(border)
                                    .bg(background)
                                    .child(dnd_outline(
                                        &self.outline,
                                        move |ix, entry, row_state, _window, cx| {
                                            render_outline_row(ix, entry, row_state, cx)
                                        },
                                    )),
                            ),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Debug (document)"),
                            )
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(border)
                                    .bg(background)
                                    .p(px(12.))
                                    .child(render_doc_dump(doc_dump)),
                            ),
                    ),
            )
    }
}

fn render_outline_row(
    ix: usize,
    entry: &OutlineEntry,
    row_state: OutlineRowState,
    cx: &mut App,
) -> ListItem {
    let theme = cx.theme();
    let indent = px(16.) * entry.depth();

    let content = if entry.is_section() {
        let tint = entry.bg_color().and_then(|hex| {
            let (r, g, b) = parse_hex_color(hex)?;
            let bg: Hsla = Rgba {
                r: r as f32 / 255.,
                g: g as f32 / 255.,
                b: b as f32 / 255.,
                a: 1.,
            }
            .into();
            let fg = match contrast_color(hex) {
                Contrast::Dark => black(),
                Contrast::Light => white(),
            };
            Some((bg, fg))
        });
        let (bg, fg) = tint.unwrap_or((theme.accent.alpha(0.4), theme.foreground));

        h_flex()
            .gap_x_2()
            .items_center()
            .px(px(8.))
            .py(px(2.))
            .rounded(px(6.))
            .bg(bg)
            .text_color(fg)
            .child(
                Icon::new(if entry.collapsed() {
                    IconName::ChevronRight
                } else {
                    IconName::ChevronDown
                })
                .small(),
            )
            .child(
                div()
                    .font_weight(FontWeight::MEDIUM)
                    .child(entry.label().clone()),
            )
            .when_some(entry.filter(), |this, filter| {
                this.child(div().text_xs().child(match filter {
                    SectionFilter::Checked => "checked only",
                    SectionFilter::Unchecked => "unchecked only",
                }))
            })
    } else {
        h_flex()
            .gap_x_2()
            .items_center()
            .child(Checkbox::new(("row-check", ix)).checked(entry.checked()))
            .child(
                div()
                    .when(entry.checked(), |this| {
                        this.line_through().text_color(theme.muted_foreground)
                    })
                    .child(entry.label().clone()),
            )
    };

    ListItem::new(ix)
        .pl(px(10.) + indent)
        .selected(row_state.selected)
        .when(row_state.dragging, |this| this.opacity(0.4))
        .child(content)
}

fn render_doc_dump(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_sm().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn format_doc(doc: &ChecklistDoc) -> String {
    fn walk(nodes: &[Node], depth: usize, out: &mut String) {
        for node in nodes {
            out.push_str(&"  ".repeat(depth));
            match node {
                Node::Item(item) => {
                    out.push_str(if item.checked { "[x] " } else { "[ ] " });
                    out.push_str(&item.text);
                }
                Node::Section(section) => {
                    out.push_str(if section.collapsed { "+ " } else { "- " });
                    out.push_str(&section.title);
                    match section.filter {
                        Some(SectionFilter::Checked) => out.push_str(" (checked only)"),
                        Some(SectionFilter::Unchecked) => out.push_str(" (unchecked only)"),
                        None => {}
                    }
                }
            }
            out.push('\n');
            if let Node::Section(section) = node {
                walk(&section.items, depth + 1, out);
            }
        }
    }

    let mut out = String::new();
    out.push_str(&doc.name);
    out.push('\n');
    walk(&doc.items, 1, &mut out);
    out
}

fn describe_reorder(doc: &ChecklistDoc, reorder: &OutlineReorder) -> String {
    let what = doc
        .find(reorder.node)
        .map(|node| node.label().to_string())
        .unwrap_or_else(|| "?".to_string());
    let to = container_name(doc, reorder.to.0);
    format!("moved {what:?} to {to}[{}]", reorder.to.1)
}

fn container_name(doc: &ChecklistDoc, container: ContainerId) -> String {
    match container {
        ContainerId::Root => "root".to_string(),
        ContainerId::Items(section) => doc
            .find(section)
            .map(|node| node.label().to_string())
            .unwrap_or_else(|| "?".to_string()),
    }
}

fn storage_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("checklist.json"))
}

/// A missing file is `Ok(None)`; a file that exists but cannot be read or
/// parsed is an error, so callers can keep their hands off it.
fn load_doc(path: &Path) -> Result<Option<ChecklistDoc>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    let doc =
        serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(doc))
}

fn demo_doc() -> ChecklistDoc {
    let mut doc = ChecklistDoc::new("Groceries");
    doc.items.push(Node::item("Milk"));
    doc.items.push(ItemNode::new("Bread").checked(true).into());
    doc.items.push(
        SectionNode::new("Produce")
            .bg_color("#a8e6a1")
            .child(Node::item("Apples"))
            .child(ItemNode::new("Bananas").checked(true).into())
            .child(
                SectionNode::new("Herbs")
                    .child(Node::item("Basil"))
                    .child(Node::item("Mint"))
                    .into(),
            )
            .into(),
    );
    doc.items.push(
        SectionNode::new("Pantry")
            .collapsed(true)
            .child(Node::item("Rice"))
            .child(Node::item("Olive oil"))
            .into(),
    );
    doc.items.push(Node::item("Coffee"));
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_distinguishes_missing_from_unreadable() {
        let dir = tempfile::TempDir::new().unwrap();

        let missing = dir.path().join("absent.json");
        assert!(matches!(load_doc(&missing), Ok(None)));

        // A present-but-broken file is an error, not a silent fallback.
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(load_doc(&broken).is_err());

        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"{"name": "L", "items": []}"#).unwrap();
        let doc = load_doc(&good).unwrap().unwrap();
        assert_eq!(doc.name, "L");
    }
}
