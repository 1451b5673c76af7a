mod common;

mod notifications;
mod observer_lifecycle;
