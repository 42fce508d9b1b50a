use chip8_vm::emulator::output::{EmulatorOutput, Framebuffer, SCREEN_HEIGHT, SCREEN_WIDTH};

use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use std::io::{stdout, Stdout, Write};

/// Draws the screen in the terminal, two columns per pixel, inside a border.
pub struct CrosstermOutput {
    stdout: Stdout,
    cells: Framebuffer,
}

impl CrosstermOutput {
    pub fn new() -> crossterm::Result<CrosstermOutput> {
        let mut stdout = stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;

        let bottom = SCREEN_HEIGHT as u16 + 1;
        let right = 2 * SCREEN_WIDTH as u16 + 1;
        for y in 0..=bottom {
            for x in 0..=right {
                let c = match (x, y) {
                    (0, 0) => '┏',
                    (x, 0) if x == right => '┓',
                    (0, y) if y == bottom => '┗',
                    (x, y) if x == right && y == bottom => '┛',
                    (_, y) if y == 0 || y == bottom => '━',
                    (x, _) if x == 0 || x == right => '┃',
                    _ => continue,
                };
                queue!(stdout, cursor::MoveTo(x, y), Print(c))?;
            }
        }
        stdout.flush()?;

        Ok(CrosstermOutput {
            stdout,
            cells: Framebuffer::new(),
        })
    }

    /// Redraw the cells that differ from what is on the terminal.
    fn draw(&mut self, frame: &Framebuffer) -> crossterm::Result<()> {
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                let state = frame.get(x, y);
                if state != self.cells.get(x, y) {
                    queue!(
                        self.stdout,
                        cursor::MoveTo(2 * x as u16 + 1, y as u16 + 1),
                        Print(if state { "██" } else { "  " })
                    )?;
                }
            }
        }
        self.stdout.flush()?;
        self.cells = frame.clone();
        Ok(())
    }
}

impl Drop for CrosstermOutput {
    fn drop(&mut self) {
        let restored = execute!(self.stdout, LeaveAlternateScreen, cursor::Show)
            .and_then(|_| terminal::disable_raw_mode());
        if let Err(error) = restored {
            log::warn!("Could not restore the terminal: {}", error);
        }
    }
}

impl EmulatorOutput for CrosstermOutput {
    fn refresh(&mut self, frame: &Framebuffer) {
        if let Err(error) = self.draw(frame) {
            log::warn!("Could not draw to the terminal: {}", error);
        }
    }
}
