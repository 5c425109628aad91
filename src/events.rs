/// Everything a user can ask of a running game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Toggle whatever cell is under this terminal position
    Click { column: u16, row: u16 },

    Run,
    Stop,

    /// Run if stopped, stop if running
    ToggleRun,

    /// Advance a single generation by hand
    Step,

    Clear,

    Faster,
    Slower,

    /// Exit the application
    Exit,
}
