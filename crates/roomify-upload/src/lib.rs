//! Roomify upload widget
//!
//! A headless drag-and-drop image upload widget: content-type gating, data URL
//! encoding, a timer-driven simulated progress indicator and a completion
//! callback. Rendering is left to the host; [`UploadWidget::render`] describes
//! what to show.

pub mod encoder;
pub mod session;
pub mod validator;
pub mod view;
pub mod widget;

// Re-export commonly used types
pub use encoder::{encode_data_url, parse_data_url, Base64Encoder, EncodeError, FileEncoder};
pub use session::{AuthContext, SessionProvider};
pub use validator::{content_type_for_filename, media_type, ContentTypeValidator};
pub use view::UploadView;
pub use widget::{CompletionCallback, UploadWidget};
