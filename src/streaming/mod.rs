//! Preview stream types and combinators.

mod cancel;
mod types;

pub use cancel::{CancelHandle, make_cancellable_stream, new_cancel_handle};
pub use types::{PreviewStream, PreviewStreamHandle, take_until_terminal};
