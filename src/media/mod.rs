pub mod object_url;
pub mod playback;
pub mod upload;

pub use object_url::{HandleId, ObjectUrlManager, PlayableHandle};
pub use playback::{MediaCommand, PlayAttempt, PlaybackController, PlaybackPhase, PlaybackState};
pub use upload::UploadedFile;
