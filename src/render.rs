use std::io;
use std::io::Write;

use crossterm::cursor;
use crossterm::queue;
use crossterm::style;
use crossterm::style::Color;
use crossterm::terminal;

use crate::config::CellStyle;
use crate::grid::Change;
use crate::grid::Grid;

/// Something that can show grid cells. Grid coordinates go in, the renderer decides where they
/// land on its surface.
pub trait Renderer {
    fn draw_cell(&mut self, x: usize, y: usize) -> io::Result<()>;

    fn clear_cell(&mut self, x: usize, y: usize) -> io::Result<()>;

    /// Wipe the whole surface
    fn clear_all(&mut self) -> io::Result<()>;

    /// Push anything buffered to the screen
    fn present(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Draw or clear a single cell, depending on where it ended up.
    fn render(&mut self, change: Change) -> io::Result<()> {
        if change.alive {
            self.draw_cell(change.x, change.y)
        } else {
            self.clear_cell(change.x, change.y)
        }
    }

    /// Paint every live cell of `grid` onto a blank surface.
    fn render_all(&mut self, grid: &Grid) -> io::Result<()> {
        self.clear_all()?;

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.is_alive(x, y) {
                    self.draw_cell(x, y)?;
                }
            }
        }

        Ok(())
    }
}

const FILL: char = '█';

/// Draws cells on a terminal. Each cell covers a `cell_size`x`cell_size` block of characters:
/// a square in the border color around a smaller one in the fill color. Cells too small to show
/// both are filled solid.
///
/// Output is queued; call [`Renderer::present`] to flush it.
pub struct TermRenderer<W: Write> {
    out: W,
    cell_size: u16,
    style: CellStyle,
}

impl<W: Write> TermRenderer<W> {
    pub fn new(out: W, cell_size: u16, style: CellStyle) -> Self {
        Self {
            out,
            cell_size: cell_size.max(1),
            style,
        }
    }

    /// Write `text` on terminal row `row`, replacing whatever was there.
    pub fn status(&mut self, row: u16, text: &str) -> io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(0, row),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(text)
        )
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Top left terminal position of grid cell `(x, y)`.
    fn origin(&self, x: usize, y: usize) -> (u16, u16) {
        // a grid sized from the terminal always fits in u16 coordinates
        (x as u16 * self.cell_size, y as u16 * self.cell_size)
    }

    fn has_border(&self) -> bool {
        self.cell_size > self.style.border_size.saturating_mul(2)
    }

    /// Print `n` copies of `c` in `color`.
    fn run(&mut self, color: Color, c: char, n: u16) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }

        let s: String = std::iter::repeat_n(c, n as usize).collect();
        queue!(self.out, style::SetForegroundColor(color), style::Print(s))
    }
}

impl<W: Write> Renderer for TermRenderer<W> {
    fn draw_cell(&mut self, x: usize, y: usize) -> io::Result<()> {
        let (col, top) = self.origin(x, y);
        let s = self.cell_size;
        let CellStyle {
            fill,
            border,
            border_size: b,
        } = self.style;

        for dy in 0..s {
            queue!(self.out, cursor::MoveTo(col, top + dy))?;

            if !self.has_border() {
                self.run(fill, FILL, s)?;
            } else if dy < b || dy >= s - b {
                self.run(border, FILL, s)?;
            } else {
                self.run(border, FILL, b)?;
                self.run(fill, FILL, s - 2 * b)?;
                self.run(border, FILL, b)?;
            }
        }

        queue!(self.out, style::ResetColor)
    }

    fn clear_cell(&mut self, x: usize, y: usize) -> io::Result<()> {
        let (col, top) = self.origin(x, y);
        let blank: String = std::iter::repeat_n(' ', self.cell_size as usize).collect();

        queue!(self.out, style::ResetColor)?;

        for dy in 0..self.cell_size {
            queue!(
                self.out,
                cursor::MoveTo(col, top + dy),
                style::Print(&blank)
            )?;
        }

        Ok(())
    }

    fn clear_all(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            style::ResetColor,
            terminal::Clear(terminal::ClearType::All)
        )
    }

    fn present(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
