//! Shared test doubles: a menu item that records toolkit calls, an audio
//! server that records activation requests, and discovery payload builders.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::menu::{MenuItem, MenuItemSource};
use crate::server::{
    ActivationRequest, AudioServer, DeviceInfo, DeviceKey, DeviceKind, Direction, PortInfo,
};

// ============================================================================
// Menu item double
// ============================================================================

#[derive(Default)]
struct ItemState {
    visible: bool,
    selected: bool,
    blocked: u32,
    show_calls: u32,
    hide_calls: u32,
    handler: Option<Box<dyn FnMut()>>,
}

/// Menu item double handed to bindings. Behaves like a toolkit check item:
/// selected-state changes emit the activation notification unless blocked.
pub(crate) struct TestItem {
    state: Rc<RefCell<ItemState>>,
}

/// Observer half of a [`TestItem`], kept by tests after the item is boxed.
pub(crate) struct TestItemHandle {
    state: Rc<RefCell<ItemState>>,
}

impl TestItem {
    pub fn new() -> (Self, TestItemHandle) {
        let state = Rc::new(RefCell::new(ItemState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            TestItemHandle { state },
        )
    }
}

/// Fire the activation handler unless blocked. The handler is taken out of
/// the cell for the duration of the call so a re-entrant emission cannot
/// double-borrow.
fn emit_activated(state: &Rc<RefCell<ItemState>>) {
    let handler = {
        let mut s = state.borrow_mut();
        if s.blocked > 0 {
            return;
        }
        s.handler.take()
    };
    if let Some(mut handler) = handler {
        handler();
        state.borrow_mut().handler = Some(handler);
    }
}

impl MenuItem for TestItem {
    fn show(&mut self) {
        let mut s = self.state.borrow_mut();
        s.visible = true;
        s.show_calls += 1;
    }

    fn hide(&mut self) {
        let mut s = self.state.borrow_mut();
        s.visible = false;
        s.hide_calls += 1;
    }

    fn set_selected(&mut self, selected: bool) {
        let changed = {
            let mut s = self.state.borrow_mut();
            let changed = s.selected != selected;
            s.selected = selected;
            changed
        };
        if changed {
            emit_activated(&self.state);
        }
    }

    fn is_selected(&self) -> bool {
        self.state.borrow().selected
    }

    fn connect_activated(&mut self, handler: Box<dyn FnMut()>) {
        let mut s = self.state.borrow_mut();
        assert!(
            s.handler.is_none(),
            "BUG: activation handler already connected"
        );
        s.handler = Some(handler);
    }

    fn block_activated(&mut self) {
        self.state.borrow_mut().blocked += 1;
    }

    fn unblock_activated(&mut self) {
        let mut s = self.state.borrow_mut();
        assert!(s.blocked > 0, "BUG: unblock without matching block");
        s.blocked -= 1;
    }
}

impl TestItemHandle {
    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn is_selected(&self) -> bool {
        self.state.borrow().selected
    }

    pub fn show_calls(&self) -> u32 {
        self.state.borrow().show_calls
    }

    pub fn hide_calls(&self) -> u32 {
        self.state.borrow().hide_calls
    }

    pub fn block_depth(&self) -> u32 {
        self.state.borrow().blocked
    }

    /// Simulate a user click: the item becomes selected and the activation
    /// notification fires.
    pub fn click(&self) {
        self.state.borrow_mut().selected = true;
        emit_activated(&self.state);
    }
}

/// Item factory recording every created item with its title.
pub(crate) struct TestItemSource {
    created: CreatedItems,
}

pub(crate) type CreatedItems = Rc<RefCell<Vec<(String, TestItemHandle)>>>;

impl TestItemSource {
    pub fn new() -> (Self, CreatedItems) {
        let created: CreatedItems = Rc::default();
        (
            Self {
                created: Rc::clone(&created),
            },
            created,
        )
    }
}

impl MenuItemSource for TestItemSource {
    fn create_item(&mut self, title: &str) -> Box<dyn MenuItem> {
        let (item, handle) = TestItem::new();
        self.created.borrow_mut().push((title.to_string(), handle));
        Box::new(item)
    }
}

// ============================================================================
// Audio server double
// ============================================================================

/// Server double recording outbound activation requests.
pub(crate) struct TestServer {
    requests: Rc<RefCell<Vec<ActivationRequest>>>,
    fail: bool,
}

impl TestServer {
    pub fn new() -> (Self, Rc<RefCell<Vec<ActivationRequest>>>) {
        let requests = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                requests: Rc::clone(&requests),
                fail: false,
            },
            requests,
        )
    }

    pub fn failing() -> (Self, Rc<RefCell<Vec<ActivationRequest>>>) {
        let (mut server, requests) = Self::new();
        server.fail = true;
        (server, requests)
    }
}

impl AudioServer for TestServer {
    fn activate_port(&mut self, request: &ActivationRequest) -> Result<()> {
        if self.fail {
            return Err(Error::Server("injected failure".to_string()));
        }
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }
}

// ============================================================================
// Discovery payload builders
// ============================================================================

/// Derive a human label from an internal port name: the last dash segment,
/// capitalized (`analog-output-speaker` -> `Speaker`).
fn describe(name: &str) -> String {
    let last = name.rsplit('-').next().unwrap_or(name);
    let mut chars = last.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub(crate) fn make_port_info(name: &str, direction: Direction) -> PortInfo {
    PortInfo {
        name: name.to_string(),
        description: Some(describe(name)),
        priority: 0,
        available: true,
        visible: true,
        direction,
        profiles: Vec::new(),
        preferred_profile: None,
    }
}

pub(crate) fn make_device_info(
    kind: DeviceKind,
    index: u32,
    name: &str,
    description: &str,
    ports: Vec<PortInfo>,
) -> DeviceInfo {
    DeviceInfo {
        key: DeviceKey::new(kind, index),
        name: name.to_string(),
        description: description.to_string(),
        ports,
        active_port: None,
    }
}
