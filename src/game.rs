use std::io;
use std::time::Duration;
use std::time::Instant;

use tracing::debug;
use tracing::trace;

use crate::config::Config;
use crate::config::ConfigError;
use crate::config::Surface;
use crate::grid::Grid;
use crate::grid::GridError;
use crate::render::Renderer;
use crate::ticker::Ticker;

/// Map a point on the surface to the grid cell under it.
///
/// Points left of or above the surface, and points past the last whole cell, are out of bounds.
pub fn point_to_cell(
    px: i64,
    py: i64,
    cell_size: usize,
    width: usize,
    height: usize,
) -> Result<(usize, usize), GridError> {
    let size = cell_size.max(1) as i64;
    let (x, y) = (px.div_euclid(size), py.div_euclid(size));

    let fits = |c: i64, len: usize| c >= 0 && (c as u64) < len as u64;

    if !fits(x, width) || !fits(y, height) {
        return Err(GridError::OutOfBounds {
            x,
            y,
            width,
            height,
        });
    }

    Ok((x as usize, y as usize))
}

/// One play session: the grid, how it maps onto the surface, and whether it is running.
///
/// Every tick advances this session's own grid; nothing is shared between sessions.
pub struct Game {
    grid: Grid,
    cell_size: usize,

    /// Rate of the last `run`
    fps: u32,

    /// `Some` while running
    ticker: Option<Ticker>,
}

impl Game {
    /// Build a stopped game with an empty grid sized to fit `surface`.
    pub fn new(config: &Config, surface: Surface) -> Result<Self, ConfigError> {
        let (width, height) = config.grid_size(surface)?;
        let grid = Grid::with_rules(width, height, config.rules)?;

        debug!(width, height, rules = %config.rules, "created game");

        Ok(Self {
            grid,
            cell_size: config.cell_size,
            fps: config.fps,
            ticker: None,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn cell_size(&self) -> usize {
        self.cell_size
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn point_to_cell(&self, px: i64, py: i64) -> Result<(usize, usize), GridError> {
        point_to_cell(
            px,
            py,
            self.cell_size,
            self.grid.width(),
            self.grid.height(),
        )
    }

    /// Toggle the cell under `(px, py)` and draw or clear it. Points outside the grid are ignored
    /// and yield `None`.
    pub fn click<R: Renderer>(
        &mut self,
        px: i64,
        py: i64,
        renderer: &mut R,
    ) -> io::Result<Option<bool>> {
        let toggled = self
            .point_to_cell(px, py)
            .and_then(|(x, y)| Ok((x, y, self.grid.toggle(x, y)?)));

        let (x, y, alive) = match toggled {
            Ok(t) => t,
            Err(e) => {
                trace!(px, py, "ignoring click: {e}");
                return Ok(None);
            }
        };

        if alive {
            renderer.draw_cell(x, y)?;
        } else {
            renderer.clear_cell(x, y)?;
        }

        Ok(Some(alive))
    }

    /// Start advancing `fps` times per second. Does nothing when already running.
    pub fn run(&mut self, fps: u32, now: Instant) -> Result<(), ConfigError> {
        if self.ticker.is_some() {
            return Ok(());
        }

        let ticker = Ticker::new(fps, now)?;
        debug!(fps, period = ?ticker.period(), "started");

        self.fps = fps;
        self.ticker = Some(ticker);

        Ok(())
    }

    /// Stop advancing. Does nothing when already stopped.
    pub fn stop(&mut self) {
        if self.ticker.take().is_some() {
            debug!(generation = self.grid.generation(), "stopped");
        }
    }

    /// Restart at a new rate. The grid is left alone.
    pub fn set_rate(&mut self, fps: u32, now: Instant) -> Result<(), ConfigError> {
        self.stop();
        self.run(fps, now)
    }

    /// How long until the next generation is due, `None` when stopped.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.ticker.as_ref().map(|t| t.remaining(now))
    }

    /// Advance once if a tick is due. Returns whether a generation was computed.
    pub fn update<R: Renderer>(&mut self, now: Instant, renderer: &mut R) -> io::Result<bool> {
        let due = self.ticker.as_mut().is_some_and(|t| t.poll(now));

        if due {
            self.step(renderer)?;
        }

        Ok(due)
    }

    /// Advance one generation and render the cells that changed. Returns how many did.
    pub fn step<R: Renderer>(&mut self, renderer: &mut R) -> io::Result<usize> {
        let changes = self.grid.advance();

        for &change in &changes {
            renderer.render(change)?;
        }

        Ok(changes.len())
    }

    /// Kill every cell and wipe the surface. Running state is kept.
    pub fn clear<R: Renderer>(&mut self, renderer: &mut R) -> io::Result<()> {
        self.grid.clear();
        renderer.clear_all()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        drawn: Vec<(usize, usize)>,
        cleared: Vec<(usize, usize)>,
        wiped: usize,
    }

    impl Renderer for Recorder {
        fn draw_cell(&mut self, x: usize, y: usize) -> io::Result<()> {
            self.drawn.push((x, y));
            Ok(())
        }

        fn clear_cell(&mut self, x: usize, y: usize) -> io::Result<()> {
            self.cleared.push((x, y));
            Ok(())
        }

        fn clear_all(&mut self) -> io::Result<()> {
            self.wiped += 1;
            Ok(())
        }
    }

    fn game() -> Game {
        let config = Config {
            cell_size: 10,
            fps: 10,
            ..Config::default()
        };

        Game::new(
            &config,
            Surface {
                width: 100,
                height: 80,
            },
        )
        .unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn point_mapping() {
        assert_eq!(point_to_cell(0, 0, 10, 10, 8), Ok((0, 0)));
        assert_eq!(point_to_cell(19, 79, 10, 10, 8), Ok((1, 7)));
        assert!(point_to_cell(-1, 5, 10, 10, 8).is_err());
        assert!(point_to_cell(5, -3, 10, 10, 8).is_err());
        assert!(point_to_cell(100, 0, 10, 10, 8).is_err());
        assert!(point_to_cell(0, 80, 10, 10, 8).is_err());
    }

    #[test]
    fn grid_is_sized_from_surface() {
        let game = game();

        assert_eq!((game.grid().width(), game.grid().height()), (10, 8));
        assert!(!game.is_running());
    }

    #[test]
    fn click_toggles_and_renders() {
        let mut game = game();
        let mut r = Recorder::default();

        assert_eq!(game.click(35, 12, &mut r).unwrap(), Some(true));
        assert!(game.grid().is_alive(3, 1));
        assert_eq!(game.click(31, 19, &mut r).unwrap(), Some(false));

        assert_eq!(r.drawn, vec![(3, 1)]);
        assert_eq!(r.cleared, vec![(3, 1)]);
    }

    #[test]
    fn click_outside_is_ignored() {
        let mut game = game();
        let mut r = Recorder::default();

        assert_eq!(game.click(-4, 10, &mut r).unwrap(), None);
        assert_eq!(game.click(10, 85, &mut r).unwrap(), None);
        assert_eq!(game.click(100, 0, &mut r).unwrap(), None);

        assert_eq!(game.grid().population(), 0);
        assert!(r.drawn.is_empty() && r.cleared.is_empty());
    }

    #[test]
    fn click_on_partial_cell_is_ignored() {
        let config = Config {
            cell_size: 10,
            ..Config::default()
        };
        let mut game = Game::new(
            &config,
            Surface {
                width: 25,
                height: 25,
            },
        )
        .unwrap();
        let mut r = Recorder::default();

        // the strip past the last whole cell belongs to no cell
        assert_eq!(game.click(22, 5, &mut r).unwrap(), None);
        assert_eq!(game.click(5, 24, &mut r).unwrap(), None);
        assert_eq!(game.click(19, 19, &mut r).unwrap(), Some(true));
        assert_eq!(r.drawn, vec![(1, 1)]);
    }

    #[test]
    fn run_is_idempotent() {
        let t0 = Instant::now();
        let mut game = game();

        game.run(10, t0).unwrap();
        game.run(2, t0 + ms(50)).unwrap();

        assert!(game.is_running());
        assert_eq!(game.fps(), 10);
        assert_eq!(game.time_until_tick(t0 + ms(50)), Some(ms(50)));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut game = game();

        game.stop();
        game.run(5, Instant::now()).unwrap();
        game.stop();
        game.stop();

        assert!(!game.is_running());
        assert_eq!(game.time_until_tick(Instant::now()), None);
    }

    #[test]
    fn run_rejects_zero_fps() {
        let mut game = game();

        assert_eq!(game.run(0, Instant::now()), Err(ConfigError::FrameRate));
        assert!(!game.is_running());
    }

    #[test]
    fn set_rate_restarts_and_keeps_grid() {
        let t0 = Instant::now();
        let mut game = game();
        game.grid_mut().set(4, 4, true).unwrap();

        game.run(10, t0).unwrap();
        game.set_rate(2, t0 + ms(30)).unwrap();

        assert!(game.is_running());
        assert_eq!(game.fps(), 2);
        assert_eq!(game.time_until_tick(t0 + ms(30)), Some(ms(500)));
        assert!(game.grid().is_alive(4, 4));
    }

    #[test]
    fn update_forwards_diff() {
        let t0 = Instant::now();
        let mut game = game();
        let mut r = Recorder::default();

        for x in 1..=3 {
            game.grid_mut().set(x, 2, true).unwrap();
        }

        game.run(10, t0).unwrap();

        assert!(!game.update(t0 + ms(50), &mut r).unwrap());
        assert!(r.drawn.is_empty());

        assert!(game.update(t0 + ms(100), &mut r).unwrap());
        assert_eq!(r.drawn, vec![(2, 1), (2, 3)]);
        assert_eq!(r.cleared, vec![(1, 2), (3, 2)]);
        assert_eq!(game.grid().generation(), 1);
    }

    #[test]
    fn update_does_nothing_when_stopped() {
        let mut game = game();
        let mut r = Recorder::default();
        game.grid_mut().set(0, 0, true).unwrap();

        assert!(!game.update(Instant::now() + ms(10_000), &mut r).unwrap());
        assert!(game.grid().is_alive(0, 0));
    }

    #[test]
    fn clear_wipes_grid_and_surface() {
        let mut game = game();
        let mut r = Recorder::default();
        game.click(5, 5, &mut r).unwrap();

        game.clear(&mut r).unwrap();

        assert_eq!(game.grid().population(), 0);
        assert_eq!(r.wiped, 1);
    }
}
