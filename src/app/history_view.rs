use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, Label, ListBox, Orientation, PolicyType, ScrolledWindow,
    SearchEntry, SelectionMode,
};

use crate::history::{EntryKind, HistoryRow, SharedHistory};

const ROW_SPACING: i32 = 6;
const PREVIEW_MAX_WIDTH_CHARS: i32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RowAction {
    Copy(usize),
    TogglePin(usize),
    Delete(usize),
    ClearUnpinned,
}

type RowActionHandler = Rc<dyn Fn(RowAction)>;

/// Searchable list of history rows with per-row pin/copy/delete buttons.
pub(super) struct HistoryView {
    root: GtkBox,
    search_entry: SearchEntry,
    list: ListBox,
    history: SharedHistory,
    on_action: RowActionHandler,
    rendered_revision: Cell<Option<u64>>,
    expanded: RefCell<HashSet<String>>,
    weak_self: RefCell<Weak<HistoryView>>,
}

impl HistoryView {
    pub(super) fn new(history: SharedHistory, on_action: impl Fn(RowAction) + 'static) -> Rc<Self> {
        let root = GtkBox::new(Orientation::Vertical, ROW_SPACING);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let search_entry = SearchEntry::new();
        search_entry.set_placeholder_text(Some("Search clipboard history"));
        root.append(&search_entry);

        let list = ListBox::new();
        list.set_selection_mode(SelectionMode::None);
        list.add_css_class("boxed-list");
        let placeholder = Label::new(Some("No clipboard items"));
        placeholder.add_css_class("dim-label");
        placeholder.set_margin_top(24);
        list.set_placeholder(Some(&placeholder));

        let scroller = ScrolledWindow::new();
        scroller.set_policy(PolicyType::Never, PolicyType::Automatic);
        scroller.set_vexpand(true);
        scroller.set_child(Some(&list));
        root.append(&scroller);

        let clear_button = Button::with_label("Clear All");
        clear_button.set_tooltip_text(Some("Remove every entry that is not pinned"));
        clear_button.set_halign(Align::End);
        root.append(&clear_button);

        let view = Rc::new(Self {
            root,
            search_entry,
            list,
            history,
            on_action: Rc::new(on_action),
            rendered_revision: Cell::new(None),
            expanded: RefCell::new(HashSet::new()),
            weak_self: RefCell::new(Weak::new()),
        });
        *view.weak_self.borrow_mut() = Rc::downgrade(&view);

        {
            let on_action = view.on_action.clone();
            clear_button.connect_clicked(move |_| on_action(RowAction::ClearUnpinned));
        }
        {
            let weak = Rc::downgrade(&view);
            view.search_entry.connect_search_changed(move |_| {
                if let Some(view) = weak.upgrade() {
                    view.render();
                }
            });
        }

        view.render();
        view
    }

    pub(super) fn root(&self) -> &GtkBox {
        &self.root
    }

    pub(super) fn search_entry(&self) -> &SearchEntry {
        &self.search_entry
    }

    /// Re-renders only when the history changed since the last render.
    pub(super) fn refresh_if_changed(&self) {
        if self.rendered_revision.get() != Some(self.history.revision()) {
            self.render();
        }
    }

    pub(super) fn render(&self) {
        let snapshot = self.history.snapshot();
        let query = self.search_entry.text();

        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        for row in snapshot.filter(query.as_str()) {
            self.list.append(&self.build_row(&row));
        }
        self.rendered_revision.set(Some(snapshot.revision()));
        tracing::debug!(
            revision = snapshot.revision(),
            entries = snapshot.entries().len(),
            query = query.as_str(),
            "rendered clipboard history"
        );
    }

    fn build_row(&self, row: &HistoryRow<'_>) -> GtkBox {
        let position = row.position;
        let content = row.entry.content().to_string();
        let (preview, truncated) = row.entry.preview();
        let expanded = self.expanded.borrow().contains(&content);

        let container = GtkBox::new(Orientation::Horizontal, ROW_SPACING);
        container.set_margin_top(4);
        container.set_margin_bottom(4);
        container.set_margin_start(6);
        container.set_margin_end(6);
        if row.pinned {
            container.add_css_class("noteboard-pinned");
        }

        let text_column = GtkBox::new(Orientation::Vertical, 2);
        text_column.set_hexpand(true);

        let content_label = Label::new(Some(if expanded {
            content.as_str()
        } else {
            preview.as_str()
        }));
        content_label.set_halign(Align::Start);
        content_label.set_xalign(0.0);
        content_label.set_wrap(true);
        content_label.set_wrap_mode(gtk4::pango::WrapMode::WordChar);
        content_label.set_max_width_chars(PREVIEW_MAX_WIDTH_CHARS);
        if row.entry.kind() == EntryKind::Status {
            content_label.add_css_class("dim-label");
        }
        text_column.append(&content_label);

        let meta_row = GtkBox::new(Orientation::Horizontal, ROW_SPACING);
        let time_label = Label::new(Some(&row.entry.time_label()));
        time_label.add_css_class("caption");
        time_label.add_css_class("dim-label");
        meta_row.append(&time_label);
        if row.pinned {
            let pinned_label = Label::new(Some("Pinned"));
            pinned_label.add_css_class("caption");
            meta_row.append(&pinned_label);
        }
        if truncated {
            let expand_button = Button::with_label(if expanded { "Show less" } else { "Show more" });
            expand_button.add_css_class("flat");
            expand_button.add_css_class("caption");
            let weak = self.weak_self.borrow().clone();
            let content = content.clone();
            expand_button.connect_clicked(move |_| {
                let Some(view) = weak.upgrade() else {
                    return;
                };
                {
                    let mut expanded = view.expanded.borrow_mut();
                    if !expanded.remove(&content) {
                        expanded.insert(content.clone());
                    }
                }
                view.render();
            });
            meta_row.append(&expand_button);
        }
        text_column.append(&meta_row);
        container.append(&text_column);

        let pin_button = icon_button(
            if row.pinned {
                "view-pin-symbolic"
            } else {
                "pin-symbolic"
            },
            if row.pinned { "Unpin" } else { "Pin" },
        );
        let copy_button = icon_button("edit-copy-symbolic", "Copy to clipboard");
        let delete_button = icon_button("user-trash-symbolic", "Delete");
        for (button, action) in [
            (&pin_button, RowAction::TogglePin(position)),
            (&copy_button, RowAction::Copy(position)),
            (&delete_button, RowAction::Delete(position)),
        ] {
            let on_action = self.on_action.clone();
            button.connect_clicked(move |_| on_action(action));
            container.append(button);
        }

        container
    }
}

fn icon_button(icon_name: &str, tooltip: &str) -> Button {
    let button = Button::from_icon_name(icon_name);
    button.add_css_class("flat");
    button.set_valign(Align::Center);
    button.set_tooltip_text(Some(tooltip));
    button
}
