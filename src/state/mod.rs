//! Session state that is not part of the annotation data itself.

mod dialog;
mod notification;
mod save_sync;
mod save_worker;
mod storage;
mod typing_buffer;

pub use dialog::Dialog;
pub use notification::{Notification, NotificationCenter};
pub use save_sync::{SAVE_FAILED_MESSAGE, SaveCompletion, SaveJob, SaveResult, SaveSync};
pub use save_worker::{SaveWorker, run_job};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, sanitize_path};
pub use typing_buffer::TypingBuffer;
