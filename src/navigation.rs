//! Navigation over the filtered, paginated item grid.
//!
//! All positions are relative to the filtered view: `current_page` is
//! 1-based, `current_index` is the slot within the page.

use std::collections::BTreeMap;

use crate::constants::{DEFAULT_GRID_ROWS, DEFAULT_IMAGES_PER_ROW, GRID_GAP, NO_LABEL_NAME};
use crate::model::Mark;

/// Which items are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    /// Items without a label
    Unmarked,
    /// Items with the given label number
    Label(usize),
}

impl Filter {
    /// Whether an item with this mark is visible.
    pub fn matches(&self, mark: Option<&Mark>) -> bool {
        match self {
            Filter::All => true,
            Filter::Unmarked => mark.is_none_or(|m| m.number == 0 || m.name == NO_LABEL_NAME),
            Filter::Label(number) => mark.is_some_and(|m| m.number == *number),
        }
    }

    /// Parse a filter name: `all`, `unmarked` (or `0`), or a label number.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Filter::All),
            "unmarked" | "0" => Some(Filter::Unmarked),
            other => other.parse().ok().map(Filter::Label),
        }
    }
}

/// Original indices of the items visible under `filter`, in item order.
pub fn filtered_view(
    item_count: usize,
    marks: &BTreeMap<usize, Mark>,
    filter: Filter,
) -> Vec<usize> {
    (0..item_count)
        .filter(|index| filter.matches(marks.get(index)))
        .collect()
}

/// Size of the visible grid in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub columns: usize,
    pub rows: usize,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGES_PER_ROW, DEFAULT_GRID_ROWS)
    }
}

impl GridGeometry {
    /// A grid of at least one column and one row.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    /// Fit square cells into a viewport.
    ///
    /// The cell width fills the width with `columns` cells separated by
    /// `gap`; rows are as many as fit in the height.
    pub fn from_viewport(width: f32, height: f32, columns: usize, gap: f32) -> Self {
        let columns = columns.max(1);
        let cell = (width - gap * (columns - 1) as f32) / columns as f32;
        let rows = if cell > 0.0 && height > 0.0 && height.is_finite() {
            ((height + gap) / (cell + gap)).floor() as usize
        } else {
            1
        };
        Self::new(columns, rows)
    }

    /// Like [`GridGeometry::from_viewport`] with the standard gap.
    pub fn fit(width: f32, height: f32, columns: usize) -> Self {
        Self::from_viewport(width, height, columns, GRID_GAP)
    }

    /// Number of cells per page, saturating for absurd grids.
    pub fn items_per_page(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }
}

/// Movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Filter, page and in-page position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    filter: Filter,
    current_page: usize,
    current_index: usize,
    geometry: GridGeometry,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(GridGeometry::default())
    }
}

impl Navigator {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            filter: Filter::All,
            current_page: 1,
            current_index: 0,
            geometry,
        }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Current page, 1-based.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Position within the current page.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn items_per_page(&self) -> usize {
        self.geometry.items_per_page()
    }

    /// Change the filter; the view goes back to the first item.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.reset();
    }

    /// Change the grid size, keeping the current item in view if possible.
    pub fn set_geometry(&mut self, geometry: GridGeometry, filtered_len: usize) {
        let global = self.global_position();
        self.geometry = geometry;
        let per_page = self.items_per_page();
        self.current_page = global / per_page + 1;
        self.current_index = global % per_page;
        self.clamp(filtered_len);
    }

    /// Back to page 1, first slot.
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.current_index = 0;
    }

    /// Number of pages for a filtered view of `filtered_len` items (at least 1).
    pub fn total_pages(&self, filtered_len: usize) -> usize {
        filtered_len.div_ceil(self.items_per_page()).max(1)
    }

    /// Number of items on the current page.
    pub fn items_on_page(&self, filtered_len: usize) -> usize {
        let start = (self.current_page - 1).saturating_mul(self.items_per_page());
        filtered_len.saturating_sub(start).min(self.items_per_page())
    }

    /// Position of the current item in the filtered view.
    pub fn global_position(&self) -> usize {
        (self.current_page - 1)
            .saturating_mul(self.items_per_page())
            .saturating_add(self.current_index)
    }

    /// Original index of the current item, if the view is not empty.
    pub fn current_item(&self, view: &[usize]) -> Option<usize> {
        view.get(self.global_position()).copied()
    }

    /// Pull page and position back inside the filtered view.
    pub fn clamp(&mut self, filtered_len: usize) {
        self.current_page = self.current_page.clamp(1, self.total_pages(filtered_len));
        let on_page = self.items_on_page(filtered_len);
        self.current_index = self.current_index.min(on_page.saturating_sub(1));
    }

    /// Move the selection. Returns whether the position changed.
    ///
    /// With `by_page`, Left/Right jump a whole page (clamped); Up/Down
    /// ignore it.
    pub fn navigate(&mut self, direction: Direction, by_page: bool, filtered_len: usize) -> bool {
        let before = (self.current_page, self.current_index);
        let per_page = self.items_per_page();
        let total_pages = self.total_pages(filtered_len);
        let on_page = self.items_on_page(filtered_len);
        let columns = self.geometry.columns;

        match (direction, by_page) {
            (Direction::Left, true) => {
                if self.current_page > 1 {
                    self.current_page -= 1;
                    self.current_index = 0;
                }
            }
            (Direction::Right, true) => {
                if self.current_page < total_pages {
                    self.current_page += 1;
                    self.current_index = 0;
                }
            }
            (Direction::Right, false) => {
                if self.current_index + 1 < per_page {
                    if self.global_position() + 1 < filtered_len {
                        self.current_index += 1;
                    }
                } else if self.current_page < total_pages {
                    self.current_page += 1;
                    self.current_index = 0;
                }
            }
            (Direction::Left, false) => {
                if self.current_index > 0 {
                    self.current_index -= 1;
                } else if self.current_page > 1 {
                    self.current_page -= 1;
                    self.current_index = 0;
                }
            }
            (Direction::Up, _) => {
                if self.current_index >= columns {
                    self.current_index -= columns;
                }
            }
            (Direction::Down, _) => {
                if self.current_index.saturating_add(columns) < on_page {
                    self.current_index += columns;
                }
            }
        }

        let moved = (self.current_page, self.current_index) != before;
        if moved {
            log::debug!(
                "Navigate {:?}: page {} slot {}",
                direction,
                self.current_page,
                self.current_index
            );
        }
        moved
    }
}
