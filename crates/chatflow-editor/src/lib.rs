//! Chatflow Editor
//!
//! The state machine behind a flow canvas. A front end forwards user gestures
//! (drop a node, draw a connection, type a message, press save) to a
//! [`FlowEditor`], which applies the connection and validation rules, keeps
//! the draft auto-saved and reports outcomes through an [`EditorNotifier`].

mod editor;
mod error;
mod events;

pub use editor::FlowEditor;
pub use error::EditorError;
pub use events::{ChannelNotifier, EditorEvent, EditorNotifier, NoopNotifier};
