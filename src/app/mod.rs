pub mod background;
pub mod buffer;
pub mod input;
pub mod messages;
pub mod runtime;
pub mod view;

pub use messages::BackgroundMessage;
pub use runtime::run_editor;
