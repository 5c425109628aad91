use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;
use tracing::trace;

use crate::rule_set::RuleSet;
use crate::rule_set::B3S23;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("Grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("({x}, {y}) lies outside of the {width}x{height} grid")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },
}

/// A single slot of the [`Grid`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    alive: bool,

    /// Live cells around this one. Only non-zero while a generation is being computed.
    neighbors: u8,
}

impl Cell {
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn neighbor_count(&self) -> u8 {
        self.neighbors
    }
}

/// A cell whose alive state flipped, and the state it flipped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Change {
    pub x: usize,
    pub y: usize,
    pub alive: bool,
}

/// Fixed size Life universe. The edges do not wrap: cells past the border simply don't exist.
#[derive(Clone)]
pub struct Grid {
    width: usize,
    height: usize,

    /// Row-major, `cells[y * width + x]`
    cells: Vec<Cell>,

    rules: RuleSet,

    /// Completed generations since construction or the last [`Grid::clear`]
    generation: u64,
}

impl Grid {
    /// Create an empty grid running Conway's rules
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        Self::with_rules(width, height, B3S23)
    }

    pub fn with_rules(width: usize, height: usize, rules: RuleSet) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }

        Ok(Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
            rules,
            generation: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All cells, row by row.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.contains(x, y).then(|| self.cells[self.xy_from(x, y)])
    }

    /// Out of range cells are dead.
    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_some_and(|c| c.alive)
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.alive).count()
    }

    /// Flip the cell at `(x, y)`, returning its new state.
    pub fn toggle(&mut self, x: usize, y: usize) -> Result<bool, GridError> {
        let i = self.checked_index(x, y)?;
        let cell = &mut self.cells[i];

        cell.alive = !cell.alive;

        Ok(cell.alive)
    }

    /// Force the cell at `(x, y)` into the given state. Returns the change if there was one.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) -> Result<Option<Change>, GridError> {
        let i = self.checked_index(x, y)?;
        let cell = &mut self.cells[i];

        if cell.alive == alive {
            return Ok(None);
        }

        cell.alive = alive;

        Ok(Some(Change { x, y, alive }))
    }

    /// Compute the next generation in place and return every cell that flipped, in row-major
    /// order.
    pub fn advance(&mut self) -> Vec<Change> {
        // The two sweeps must not be fused: the transition of one cell would otherwise see
        // counts that are still being built for its neighbors.
        self.count_neighbors();
        let changes = self.apply_rules();

        self.generation += 1;
        trace!(
            generation = self.generation,
            changed = changes.len(),
            "advanced grid"
        );

        changes
    }

    /// Kill every cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
        self.generation = 0;
    }

    /// For every live cell, bump the count of each neighbor that exists.
    fn count_neighbors(&mut self) {
        let (w, h) = (self.width, self.height);

        for y in 0..h {
            for x in 0..w {
                if !self.cells[y * w + x].alive {
                    continue;
                }

                for (nx, ny) in moore_neighborhood(x, y, w, h) {
                    self.cells[ny * w + nx].neighbors += 1;
                }
            }
        }
    }

    /// Decide every cell from its count, then reset the count to zero.
    fn apply_rules(&mut self) -> Vec<Change> {
        let w = self.width;
        let rules = self.rules;
        let mut changes = Vec::new();

        for (i, cell) in self.cells.iter_mut().enumerate() {
            let alive = rules.next_state(cell.alive, cell.neighbors);

            if alive != cell.alive {
                changes.push(Change {
                    x: i % w,
                    y: i / w,
                    alive,
                });
            }

            cell.alive = alive;
            cell.neighbors = 0;
        }

        changes
    }

    fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    fn checked_index(&self, x: usize, y: usize) -> Result<usize, GridError> {
        if !self.contains(x, y) {
            return Err(GridError::OutOfBounds {
                x: x as i64,
                y: y as i64,
                width: self.width,
                height: self.height,
            });
        }

        Ok(self.xy_from(x, y))
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

/// The cells around `(x, y)` that lie inside a `w`x`h` grid. Corners get 3, edges 5, the rest 8.
pub fn moore_neighborhood(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let span = |c: usize, len: usize| -> RangeInclusive<usize> {
        // empty when there is nothing to index
        if len == 0 {
            return 1..=0;
        }

        c.saturating_sub(1)..=(c + 1).min(len - 1)
    };

    let xs = span(x, w);
    let ys = span(y, h);

    ys.flat_map(move |ny| xs.clone().map(move |nx| (nx, ny)))
        .filter(move |&p| p != (x, y))
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.chunks(self.width).enumerate() {
            if y > 0 {
                writeln!(f)?;
            }

            for cell in row {
                f.write_str(if cell.alive { "#" } else { "." })?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Grid {}x{} ({}, generation {})",
            self.width, self.height, self.rules, self.generation
        )?;
        write!(f, "{self}")
    }
}
