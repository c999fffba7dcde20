//! Menu binding
//!
//! Keeps one UI-selectable item synchronized, bidirectionally, with one port
//! without feedback loops. The toolkit side is abstracted behind [`MenuItem`]:
//! the four capabilities this crate needs are show/hide, a boolean selected
//! state, a change-notification subscription, and a scoped suppression
//! mechanism for that subscription.
//!
//! Model-originated changes (`reflect_active`) mutate the item inside a
//! handler block so the resulting toolkit notification does not re-enter
//! activation for a change that already came from the model. User-originated
//! changes flow the other way: the registered handler pushes a [`Selection`]
//! onto a queue the reconciler drains within the same turn.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::server::DeviceKey;

/// Toolkit-side selectable item, e.g. a check menu item in a tray menu.
///
/// Implementations must emit the activation notification on selected-state
/// changes only while not blocked, and must tolerate nested block/unblock
/// pairs (a counter, not a flag).
pub trait MenuItem {
    fn show(&mut self);
    fn hide(&mut self);
    fn set_selected(&mut self, selected: bool);
    fn is_selected(&self) -> bool;
    /// Register the activation handler. At most one registration per item;
    /// a second registration is a programming error.
    fn connect_activated(&mut self, handler: Box<dyn FnMut()>);
    fn block_activated(&mut self);
    fn unblock_activated(&mut self);
}

/// Creates menu items during menu (re)construction. Implemented by the
/// embedding application on top of its toolkit.
pub trait MenuItemSource {
    /// Create a selectable item labelled `title`. The item starts hidden and
    /// unselected; the binding reflects real state right after creation.
    fn create_item(&mut self, title: &str) -> Box<dyn MenuItem>;
}

/// A user selection, pushed by item handlers and drained by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub device: DeviceKey,
    /// `None` when the device's placeholder entry was selected.
    pub port: Option<String>,
}

/// Single-threaded queue carrying selections from item handlers to the
/// reconciler. Clones share the same queue.
#[derive(Clone, Default)]
pub struct SelectionQueue {
    inner: Rc<RefCell<VecDeque<Selection>>>,
}

impl SelectionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, selection: Selection) {
        self.inner.borrow_mut().push_back(selection);
    }

    /// Take all queued selections, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Selection> {
        self.inner.borrow_mut().drain(..).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }
}

impl fmt::Debug for SelectionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionQueue")
            .field("len", &self.len())
            .finish()
    }
}

/// RAII guard: the item's activation handler stays blocked until drop.
///
/// Release is guaranteed even if the guarded mutation panics, so a failure
/// mid-reflect cannot leave the handler permanently disabled.
struct HandlerBlock<'a> {
    item: &'a mut dyn MenuItem,
}

impl<'a> HandlerBlock<'a> {
    fn new(item: &'a mut dyn MenuItem) -> Self {
        item.block_activated();
        Self { item }
    }

    fn set_selected(&mut self, selected: bool) {
        self.item.set_selected(selected);
    }
}

impl Drop for HandlerBlock<'_> {
    fn drop(&mut self) {
        self.item.unblock_activated();
    }
}

/// The association between one port and one UI item.
///
/// Ownership of the boxed item makes the one-item-per-port direction
/// structural; the one-port-per-item direction is enforced by
/// `Port::attach_binding`, which rejects a second attachment.
pub struct MenuBinding {
    item: Box<dyn MenuItem>,
}

impl MenuBinding {
    /// Associate an item with a port's selection action. `on_select` runs on
    /// every user-initiated activation of the item.
    #[must_use]
    pub fn bind(mut item: Box<dyn MenuItem>, on_select: Box<dyn FnMut()>) -> Self {
        item.connect_activated(on_select);
        Self { item }
    }

    /// Reflect a model-side activity change into the item.
    ///
    /// Selecting happens under a handler block so the toolkit's change
    /// notification does not re-enter activation. Deactivation leaves the
    /// item untouched; the next activation elsewhere flips the UI.
    pub fn reflect_active(&mut self, value: bool) {
        if value {
            let mut block = HandlerBlock::new(self.item.as_mut());
            block.set_selected(true);
        }
    }

    /// Reflect effective availability into the item. Visibility changes do
    /// not raise activation notifications, so no suppression is needed.
    pub fn reflect_availability(&mut self, value: bool) {
        if value {
            self.item.show();
        } else {
            self.item.hide();
        }
    }

    #[must_use]
    pub fn item(&self) -> &dyn MenuItem {
        self.item.as_ref()
    }
}

impl fmt::Debug for MenuBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuBinding")
            .field("selected", &self.item.is_selected())
            .finish_non_exhaustive()
    }
}
