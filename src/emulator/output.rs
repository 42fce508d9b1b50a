use std::fmt;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// The 64x32 monochrome display. Cells are either set or clear.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    cells: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl Framebuffer {
    pub fn new() -> Framebuffer {
        Framebuffer {
            cells: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// Whether the cell at column `x`, row `y` is set.
    /// Coordinates outside the screen read as clear.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.cells[y * SCREEN_WIDTH + x]
    }

    /// XOR a set sprite bit into the cell at (`x`, `y`), wrapping around
    /// the screen edges. Returns true if the cell went from set to clear.
    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        let cell = &mut self.cells[(y % SCREEN_HEIGHT) * SCREEN_WIDTH + x % SCREEN_WIDTH];
        *cell = !*cell;
        !*cell
    }

    pub fn clear(&mut self) {
        self.cells = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(SCREEN_WIDTH)
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// One 32-bit value per cell in row-major order, ready for a
    /// streaming texture upload.
    pub fn to_packed(&self, on: u32, off: u32) -> Vec<u32> {
        self.cells
            .iter()
            .map(|&set| if set { on } else { off })
            .collect()
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &cell in row {
                write!(f, "{}", if cell { "#" } else { " " })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Framebuffer")?;
        fmt::Display::fmt(self, f)
    }
}

/// Represents a surface the framebuffer can be presented on.
pub trait EmulatorOutput {
    fn refresh(&mut self, frame: &Framebuffer);
}

/// An output that only counts how often it was refreshed.
#[derive(Debug, Default)]
pub struct DummyOutput {
    refreshes: usize,
}

impl DummyOutput {
    pub fn new() -> DummyOutput {
        DummyOutput::default()
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl EmulatorOutput for DummyOutput {
    fn refresh(&mut self, _: &Framebuffer) {
        self.refreshes += 1;
    }
}
