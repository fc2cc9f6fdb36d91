use std::sync::mpsc;

use tokio::sync::mpsc::UnboundedSender;

use crate::event::RealtimeEvent;

pub trait Dispatcher {
    fn dispatch(&self, event: RealtimeEvent);
}

impl Dispatcher for mpsc::Sender<RealtimeEvent> {
    fn dispatch(&self, event: RealtimeEvent) {
        let _ = self.send(event);
    }
}

impl Dispatcher for UnboundedSender<RealtimeEvent> {
    fn dispatch(&self, event: RealtimeEvent) {
        let _ = self.send(event);
    }
}
