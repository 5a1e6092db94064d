//! Builder-wide constants
//!
//! Single source of truth for the magic numbers the stores and the
//! synchronization layer share.

/// Layout grid geometry
pub mod grid {
    /// Pixel size of one cell used to map drop points onto the grid
    pub const CELL_SIZE: f64 = 100.0;
    /// Number of columns on the layout grid
    pub const COLS: u32 = 12;
    /// Row height the grid surface renders with
    pub const ROW_HEIGHT: u32 = 60;
    /// Nominal canvas width in pixels
    pub const WIDTH: u32 = 1200;
    /// Narrowest an element may be
    pub const MIN_W: u32 = 1;
    /// Widest an element may be
    pub const MAX_W: u32 = COLS;
}

/// Shape given to elements whose type the registry does not know
pub mod fallback {
    pub const W: u32 = 6;
    pub const H: u32 = 2;
}

/// Form document defaults
pub mod form {
    pub const DEFAULT_NAME: &str = "New Form";
    pub const SUCCESS_MESSAGE: &str = "Form submitted successfully!";
    pub const ERROR_MESSAGE: &str = "Error submitting form. Please try again.";
}

/// Workflow skeleton and node defaults
pub mod workflow {
    pub const START_ID: &str = "start-1";
    pub const END_ID: &str = "end-1";
    pub const START_ANCHOR: (f64, f64) = (250.0, 50.0);
    pub const END_ANCHOR: (f64, f64) = (250.0, 400.0);
    pub const START_LABEL: &str = "Start";
    pub const START_LEVEL: &str = "Level 1";
    pub const END_LABEL: &str = "End";
    pub const END_LEVEL: &str = "Level 4";
    /// Level given to nodes dropped from the palette
    pub const DEFAULT_LEVEL: &str = "Level 2";
    pub const MIN_PARALLEL_BRANCHES: usize = 2;
    pub const MAX_PARALLEL_BRANCHES: usize = 5;
    pub const DEFAULT_PARALLEL_BRANCHES: usize = 2;
    /// Port name used by kinds with a single output
    pub const NEXT_PORT: &str = "next";
    /// Port segment used in edge ids when no source port is given
    pub const ANONYMOUS_PORT: &str = "out";
    pub const EDGE_LABEL: &str = "Next";
}

/// Undo history
pub mod history {
    pub const MAX_SNAPSHOTS: usize = 100;
    pub const COMPRESSION_LEVEL: i32 = 3;
}

/// Graph canvas viewport
pub mod viewport {
    pub const MIN_ZOOM: f64 = 0.1;
    pub const MAX_ZOOM: f64 = 4.0;
}
