//! Global constants for the labelgrid engine

use std::time::Duration;

/// Maximum number of snapshots kept on each history stack
pub const UNDO_HISTORY_SIZE: usize = 50;

/// Idle time after which the typed acronym buffer is discarded
pub const TYPING_BUFFER_TIMEOUT: Duration = Duration::from_secs(1);

/// How long a transient error banner stays visible
pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(5);

/// Display name written for items without a mark
pub const NO_LABEL_NAME: &str = "No label";

/// Required column holding the image file name
pub const FILENAME_COLUMN: &str = "filename";

/// Column the label name is written to
pub const LABEL_COLUMN: &str = "label";

/// Column the free-text comment is written to
pub const COMMENT_COLUMN: &str = "comment";

/// Default number of grid columns
pub const DEFAULT_IMAGES_PER_ROW: usize = 14;

/// Gap between grid cells in pixels
pub const GRID_GAP: f32 = 4.0;

/// Maximum length of a label display name
pub const MAX_LABEL_NAME_LEN: usize = 20;

/// Maximum length of the image and metadata paths
pub const MAX_PATH_LEN: usize = 50;

/// Maximum length of the gallery title
pub const MAX_TITLE_LEN: usize = 30;

/// Grid rows used until a viewport size is known
pub const DEFAULT_GRID_ROWS: usize = 4;
