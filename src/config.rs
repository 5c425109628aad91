use crossterm::style::Color;
use thiserror::Error;

use crate::grid::GridError;
use crate::rule_set::RuleSet;

pub const DEFAULT_CELL_SIZE: usize = 1;
pub const DEFAULT_FPS: u32 = 10;

/// Light steel blue
pub const DEFAULT_FILL: Color = Color::Rgb {
    r: 0x87,
    g: 0xAF,
    b: 0xC7,
};

/// Dark slate
pub const DEFAULT_BORDER: Color = Color::Rgb {
    r: 0x25,
    g: 0x38,
    b: 0x3C,
};

pub const DEFAULT_BORDER_SIZE: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Cell size must be at least 1")]
    CellSize,

    #[error("Frame rate must be at least 1 fps")]
    FrameRate,

    #[error("Unknown color \"{0}\", expected a name like dark_blue or a hex value like #87AFC7")]
    Color(String),

    #[error("Surface cannot hold a single cell: {0}")]
    Grid(#[from] GridError),
}

/// Size of whatever the grid is drawn on, in pixels (or terminal cells).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

/// How a live cell looks: a square in the border color with an inset square in the fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fill: Color,
    pub border: Color,

    /// Width of the border on each side
    pub border_size: u16,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            fill: DEFAULT_FILL,
            border: DEFAULT_BORDER,
            border_size: DEFAULT_BORDER_SIZE,
        }
    }
}

/// Parse `#RRGGBB` (the `#` is optional) or one of crossterm's color names.
pub fn parse_color(s: &str) -> Result<Color, ConfigError> {
    let s = s.trim();
    let hex = s.strip_prefix('#').unwrap_or(s);

    if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

        if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
            return Ok(Color::Rgb { r, g, b });
        }
    }

    Color::try_from(s).map_err(|_| ConfigError::Color(s.to_string()))
}

/// Options for a single game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Side length of a cell on the surface
    pub cell_size: usize,

    /// Generations per second while running
    pub fps: u32,

    pub rules: RuleSet,

    pub style: CellStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            fps: DEFAULT_FPS,
            rules: RuleSet::default(),
            style: CellStyle::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::CellSize);
        }

        if self.fps == 0 {
            return Err(ConfigError::FrameRate);
        }

        Ok(())
    }

    /// Number of whole cells that fit on `surface`, as `(width, height)`.
    pub fn grid_size(&self, surface: Surface) -> Result<(usize, usize), ConfigError> {
        self.validate()?;

        let width = surface.width as usize / self.cell_size;
        let height = surface.height as usize / self.cell_size;

        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height }.into());
        }

        Ok((width, height))
    }
}
