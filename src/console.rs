//! Console collaborator and the shared screen.
//!
//! The reporter redraws its frame in place, and log lines have to land on the
//! same terminal without tearing that frame apart. Both go through one
//! [`Screen`] behind a mutex. A log line moves the cursor to the top of the
//! last frame, takes that row, and the next frame is drawn underneath it.
//! Log history scrolls up above the live frame.

use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    queue,
    terminal::{self, Clear, ClearType},
};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

const FALLBACK_WIDTH: u16 = 80;

/// What the reporter needs from a terminal.
pub trait Console: Send {
    fn terminal_width(&self) -> u16;
    /// False for pipes/files: no cursor movement, plain snapshots only.
    fn is_interactive(&self) -> bool;
    fn write_line(&mut self, text: &str) -> io::Result<()>;
    fn clear_line(&mut self) -> io::Result<()>;
    fn cursor_up(&mut self, n: u16) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Console over any writer, using crossterm escape sequences.
pub struct Terminal<W: Write + Send> {
    out: W,
    interactive: bool,
}

impl Terminal<io::Stdout> {
    /// Stdout, interactive when it is a TTY and `force_plain` is off.
    pub fn stdout(force_plain: bool) -> Self {
        let interactive = !force_plain && atty::is(atty::Stream::Stdout);
        Self::new(io::stdout(), interactive)
    }
}

impl<W: Write + Send> Terminal<W> {
    pub fn new(out: W, interactive: bool) -> Self {
        Self { out, interactive }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Console for Terminal<W> {
    fn terminal_width(&self) -> u16 {
        if !self.interactive {
            return FALLBACK_WIDTH;
        }
        match terminal::size() {
            Ok((cols, _)) if cols > 0 => cols,
            _ => FALLBACK_WIDTH,
        }
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    fn clear_line(&mut self) -> io::Result<()> {
        if self.interactive {
            queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        }
        Ok(())
    }

    fn cursor_up(&mut self, n: u16) -> io::Result<()> {
        // MoveUp(0) still moves one row on some terminals.
        if self.interactive && n > 0 {
            queue!(self.out, MoveUp(n))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Console plus the height of the frame currently on it.
pub struct Screen {
    console: Box<dyn Console>,
    drawn: u16,
}

pub type SharedScreen = Arc<Mutex<Screen>>;

impl Screen {
    pub fn new(console: Box<dyn Console>) -> Self {
        Self { console, drawn: 0 }
    }

    pub fn shared(console: Box<dyn Console>) -> SharedScreen {
        Arc::new(Mutex::new(Self::new(console)))
    }

    /// Lock a shared screen, tolerating poisoning (a torn frame is cosmetic).
    pub fn lock(screen: &SharedScreen) -> MutexGuard<'_, Screen> {
        screen.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn width(&self) -> u16 {
        self.console.terminal_width()
    }

    pub fn is_interactive(&self) -> bool {
        self.console.is_interactive()
    }

    /// Replace the previous frame with `lines`.
    pub fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        self.console.cursor_up(self.drawn)?;
        for line in lines {
            self.console.clear_line()?;
            self.console.write_line(line)?;
        }
        self.drawn = if self.console.is_interactive() {
            u16::try_from(lines.len()).unwrap_or(u16::MAX)
        } else {
            0
        };
        self.console.flush()
    }

    /// Print text that must persist (log lines, plain snapshots).
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.console.cursor_up(self.drawn)?;
        self.drawn = 0;
        for line in text.lines() {
            self.console.clear_line()?;
            self.console.write_line(line)?;
        }
        self.console.flush()
    }

    /// Leave the last frame on screen; later output goes below it.
    pub fn release(&mut self) {
        self.drawn = 0;
    }
}

/// `io::Write` adapter so tracing's fmt layer prints through the screen.
#[derive(Clone)]
pub struct ScreenWriter(SharedScreen);

impl ScreenWriter {
    pub fn new(screen: SharedScreen) -> Self {
        Self(screen)
    }
}

impl Write for ScreenWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        Screen::lock(&self.0).print(text.trim_end_matches('\n'))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Screen::lock(&self.0).console.flush()
    }
}
