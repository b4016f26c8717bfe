//! Input subscriptions.
//!
//! The terminal delivers one stream of key and mouse events. Games do not
//! read it directly: each live game holds `Subscription`s taken from the
//! `InputHub` and drains its own mailbox at the start of every update.
//! Releasing (or dropping) a subscription detaches it, so a torn-down game
//! can never see input meant for its successor.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crossterm::event::KeyEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Keyboard,
    Pointer,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Pointer position in logical surface pixels.
    Pointer { x: f32, y: f32 },
}

impl InputEvent {
    pub fn channel(&self) -> Channel {
        match self {
            InputEvent::Key(_) => Channel::Keyboard,
            InputEvent::Pointer { .. } => Channel::Pointer,
        }
    }
}

type Mailbox = Rc<RefCell<VecDeque<InputEvent>>>;

struct Listener {
    id: u64,
    channel: Channel,
    mailbox: Mailbox,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Listener>,
}

#[derive(Clone, Default)]
pub struct InputHub {
    inner: Rc<RefCell<Registry>>,
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, channel: Channel) -> Subscription {
        let mut reg = self.inner.borrow_mut();
        reg.next_id += 1;
        let id = reg.next_id;
        let mailbox: Mailbox = Rc::default();
        reg.listeners.push(Listener { id, channel, mailbox: Rc::clone(&mailbox) });
        log::trace!("input subscription {id} ({channel:?}) acquired");
        Subscription {
            id,
            mailbox,
            hub: Rc::downgrade(&self.inner),
            released: false,
        }
    }

    /// Deliver `event` to every live subscription on its channel. Returns
    /// how many listeners received it.
    pub fn publish(&self, event: InputEvent) -> usize {
        let reg = self.inner.borrow();
        let mut delivered = 0;
        for listener in reg.listeners.iter().filter(|l| l.channel == event.channel()) {
            listener.mailbox.borrow_mut().push_back(event);
            delivered += 1;
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

pub struct Subscription {
    id: u64,
    mailbox: Mailbox,
    hub: Weak<RefCell<Registry>>,
    released: bool,
}

impl Subscription {
    /// Take every pending event, oldest first.
    pub fn drain(&self) -> Vec<InputEvent> {
        self.mailbox.borrow_mut().drain(..).collect()
    }

    pub fn is_active(&self) -> bool {
        !self.released
    }

    pub fn release(&mut self) {
        if !self.is_active() {
            return;
        }
        self.released = true;
        self.mailbox.borrow_mut().clear();
        if let Some(hub) = self.hub.upgrade() {
            hub.borrow_mut().listeners.retain(|l| l.id != self.id);
            log::trace!("input subscription {} released", self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
