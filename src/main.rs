use std::fs::File;
use std::io;
use std::io::Stdout;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::cursor;
use crossterm::event;
use crossterm::execute;
use crossterm::style::Color;
use crossterm::terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lifegrid::config::parse_color;
use lifegrid::config::CellStyle;
use lifegrid::config::Config;
use lifegrid::config::Surface;
use lifegrid::events::Event;
use lifegrid::game::Game;
use lifegrid::render::Renderer;
use lifegrid::render::TermRenderer;
use lifegrid::rule_set::RuleSet;

/// How long to wait for input while stopped
const IDLE_POLL: Duration = Duration::from_millis(250);

const MAX_FPS: u32 = 60;

/// Conway's Game of Life in the terminal. Click cells to toggle them.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Side length of a cell, in terminal characters
    #[arg(long, default_value_t = lifegrid::config::DEFAULT_CELL_SIZE)]
    cell_size: usize,

    /// Generations per second while running
    #[arg(
        long,
        default_value_t = lifegrid::config::DEFAULT_FPS,
        value_parser = clap::value_parser!(u32).range(1..=MAX_FPS as i64)
    )]
    fps: u32,

    /// Rule string, e.g. b3/s23 or B36/S23
    #[arg(long, default_value = "b3/s23")]
    rule: RuleSet,

    /// Inner color of a live cell, a name or #RRGGBB
    #[arg(long, default_value = "#87AFC7", value_parser = parse_color)]
    fill: Color,

    /// Border color of a live cell, a name or #RRGGBB
    #[arg(long, default_value = "#25383C", value_parser = parse_color)]
    border: Color,

    /// Border width in characters. Cells no wider than twice this are drawn solid.
    #[arg(long, default_value_t = lifegrid::config::DEFAULT_BORDER_SIZE)]
    border_size: u16,

    /// Write logs here. Filter with RUST_LOG.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let config = Config {
        cell_size: args.cell_size,
        fps: args.fps,
        rules: args.rule,
        style: CellStyle {
            fill: args.fill,
            border: args.border,
            border_size: args.border_size,
        },
    };
    config.validate()?;

    let (cols, rows) = terminal::size().context("Failed to read terminal size")?;

    // the last row is the status line
    let status_row = rows.saturating_sub(1);
    let surface = Surface {
        width: cols as u32,
        height: status_row as u32,
    };

    let mut game = Game::new(&config, surface).context("Terminal too small")?;
    info!(
        width = game.grid().width(),
        height = game.grid().height(),
        "starting"
    );

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        event::EnableMouseCapture,
        cursor::Hide
    )?;

    let mut renderer = TermRenderer::new(io::stdout(), config.cell_size as u16, config.style);
    let status = StatusLine {
        row: status_row,
        width: cols,
    };
    let res = event_loop(&mut game, &mut renderer, config.fps, status);

    execute!(
        stdout,
        cursor::Show,
        event::DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )?;
    terminal::disable_raw_mode()?;

    info!(generation = game.grid().generation(), "exiting");

    res
}

fn event_loop(
    game: &mut Game,
    renderer: &mut TermRenderer<Stdout>,
    mut fps: u32,
    status: StatusLine,
) -> anyhow::Result<()> {
    renderer.render_all(game.grid())?;
    draw_status(game, renderer, fps, status)?;
    renderer.present()?;

    loop {
        let timeout = game
            .time_until_tick(Instant::now())
            .unwrap_or(IDLE_POLL);

        let event = if event::poll(timeout)? {
            lifegrid::io::convert_event(event::read()?)
        } else {
            None
        };

        if let Flow::Exit = pump(game, renderer, event, &mut fps, Instant::now())? {
            break;
        }

        draw_status(game, renderer, fps, status)?;
        renderer.present()?;
    }

    Ok(())
}

enum Flow {
    Continue,
    Exit,
}

/// Handle one input (if any), then advance if a tick is due. Input never holds back a tick.
fn pump<R: Renderer>(
    game: &mut Game,
    renderer: &mut R,
    event: Option<Event>,
    fps: &mut u32,
    now: Instant,
) -> anyhow::Result<Flow> {
    match event {
        None => {}
        Some(Event::Exit) => return Ok(Flow::Exit),
        Some(Event::Click { column, row }) => {
            game.click(column as i64, row as i64, renderer)?;
        }
        Some(Event::Run) => game.run(*fps, now)?,
        Some(Event::Stop) => game.stop(),
        Some(Event::ToggleRun) if game.is_running() => game.stop(),
        Some(Event::ToggleRun) => game.run(*fps, now)?,
        Some(Event::Step) => {
            game.step(renderer)?;
        }
        Some(Event::Clear) => game.clear(renderer)?,
        Some(Event::Faster) => {
            *fps = (*fps + 1).min(MAX_FPS);
            change_rate(game, *fps, now)?;
        }
        Some(Event::Slower) => {
            *fps = fps.saturating_sub(1).max(1);
            change_rate(game, *fps, now)?;
        }
    }

    game.update(now, renderer)?;

    Ok(Flow::Continue)
}

/// A stopped game just remembers the new rate for the next run.
fn change_rate(game: &mut Game, fps: u32, now: Instant) -> anyhow::Result<()> {
    if game.is_running() {
        game.set_rate(fps, now)?;
    }

    Ok(())
}

/// Where the status text goes: the bottom row of the terminal.
#[derive(Clone, Copy)]
struct StatusLine {
    row: u16,
    width: u16,
}

fn draw_status(
    game: &Game,
    renderer: &mut TermRenderer<Stdout>,
    fps: u32,
    status: StatusLine,
) -> io::Result<()> {
    let grid = game.grid();
    let state = if game.is_running() { "running" } else { "stopped" };

    let text = format!(
        "gen {} | pop {} | {fps} fps | {} | {state} | space run/stop, n step, c clear, +/- speed, q quit",
        grid.generation(),
        grid.population(),
        grid.rules(),
    );

    let text: String = text.chars().take(status.width as usize).collect();

    renderer.status(status.row, &text)
}

/// Logs go to a file so they don't fight with the UI. No file, no logging.
fn init_tracing(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    use clap::CommandFactory;

    #[derive(Default)]
    struct Counter {
        drawn: usize,
        cleared: usize,
    }

    impl Renderer for Counter {
        fn draw_cell(&mut self, _x: usize, _y: usize) -> io::Result<()> {
            self.drawn += 1;
            Ok(())
        }

        fn clear_cell(&mut self, _x: usize, _y: usize) -> io::Result<()> {
            self.cleared += 1;
            Ok(())
        }

        fn clear_all(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn running_game(t0: Instant) -> Game {
        let surface = Surface {
            width: 8,
            height: 8,
        };
        let mut game = Game::new(&Config::default(), surface).unwrap();
        game.grid_mut().set(3, 3, true).unwrap();
        game.run(10, t0).unwrap();
        game
    }

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn fps_above_cap_is_rejected() {
        assert!(Args::try_parse_from(["lifegrid", "--fps", "120"]).is_err());
        assert!(Args::try_parse_from(["lifegrid", "--fps", "0"]).is_err());

        let args = Args::try_parse_from(["lifegrid", "--fps", "60"]).unwrap();
        assert_eq!(args.fps, 60);
    }

    #[test]
    fn style_flags() {
        let args = Args::try_parse_from([
            "lifegrid",
            "--fill",
            "red",
            "--border",
            "#010203",
            "--border-size",
            "2",
        ])
        .unwrap();

        assert_eq!(args.fill, Color::Red);
        assert_eq!(args.border, Color::Rgb { r: 1, g: 2, b: 3 });
        assert_eq!(args.border_size, 2);

        assert!(Args::try_parse_from(["lifegrid", "--fill", "nope"]).is_err());
    }

    #[test]
    fn unmapped_input_does_not_delay_tick() {
        let t0 = Instant::now();
        let mut game = running_game(t0);
        let mut r = Counter::default();
        let mut fps = 10;

        pump(&mut game, &mut r, None, &mut fps, t0 + Duration::from_millis(100)).unwrap();

        assert_eq!(game.grid().generation(), 1);
        assert_eq!(r.cleared, 1);
    }

    #[test]
    fn handled_input_does_not_delay_tick() {
        let t0 = Instant::now();
        let mut game = running_game(t0);
        let mut r = Counter::default();
        let mut fps = 10;

        // click a far away cell right when a tick is due
        let click = Some(Event::Click { column: 7, row: 0 });
        pump(&mut game, &mut r, click, &mut fps, t0 + Duration::from_millis(100)).unwrap();

        assert_eq!(game.grid().generation(), 1);
        assert_eq!(r.drawn, 1);

        // both lone cells died on the tick
        assert_eq!(game.grid().population(), 0);
        assert_eq!(r.cleared, 2);
    }

    #[test]
    fn exit_stops_the_loop() {
        let t0 = Instant::now();
        let mut game = running_game(t0);
        let mut fps = 10;

        let flow = pump(
            &mut game,
            &mut Counter::default(),
            Some(Event::Exit),
            &mut fps,
            t0,
        )
        .unwrap();

        assert!(matches!(flow, Flow::Exit));
    }
}
