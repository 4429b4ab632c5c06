// File intake: validates an uploaded resume and turns it into a transportable payload.
// The payload is the only form of the document the requesters ever see.

pub mod encoder;

pub use encoder::{FilePayload, PayloadBuilder, UploadError};
