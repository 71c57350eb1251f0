//! Boot-time configuration terminal on the serial line.

use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::config::MAX_COMMAND_LEN;
use crate::traits::SerialPort;

const BANNER: &str = "RoomStation configuration terminal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
}

impl Command {
    pub const ALL: [Command; 2] = [Command::Help, Command::Quit];

    pub fn keyword(self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Help => "list available commands",
            Command::Quit => "leave the terminal",
        }
    }

    /// Case-sensitive substring match, `help` winning over `quit`.
    pub fn parse(line: &str) -> Option<Command> {
        Command::ALL
            .into_iter()
            .find(|command| line.contains(command.keyword()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// A known command was handled; leave the terminal.
    Exit,
    /// The line was not understood.
    Continue,
}

pub type CommandLine = String<MAX_COMMAND_LEN>;

/// Collects printable ASCII up to a line terminator. Characters past
/// `MAX_COMMAND_LEN` are dropped.
#[derive(Debug, Default)]
pub struct LineReader {
    line: CommandLine,
    dropped: usize,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns the finished line on `\r` or `\n`.
    pub fn push(&mut self, byte: u8) -> Option<CommandLine> {
        match byte {
            b'\r' | b'\n' => {
                if self.dropped > 0 {
                    log::warn!("command line truncated, {} byte(s) dropped", self.dropped);
                }
                self.dropped = 0;
                Some(core::mem::take(&mut self.line))
            }
            b' '..=b'~' => {
                if self.line.push(char::from(byte)).is_err() {
                    self.dropped += 1;
                }
                None
            }
            _ => None,
        }
    }
}

enum GateState {
    AwaitingLine(LineReader),
    Done(CommandLine),
}

/// Print the banner, wait for one line and act on it.
///
/// Blocks until a line terminator arrives; there is no timeout.
pub fn run(serial: &mut dyn SerialPort, delay: &mut dyn DelayNs, poll_ms: u32) -> GateOutcome {
    let _ = serial.write_line(BANNER);
    let _ = serial.write_line("Type 'help' for a list of commands.");
    let _ = serial.write_str("> ");

    let mut state = GateState::AwaitingLine(LineReader::new());
    loop {
        state = match state {
            GateState::AwaitingLine(mut reader) => match serial.read_byte() {
                Some(byte) => match reader.push(byte) {
                    Some(line) => GateState::Done(line),
                    None => GateState::AwaitingLine(reader),
                },
                None => {
                    delay.delay_ms(poll_ms);
                    GateState::AwaitingLine(reader)
                }
            },
            GateState::Done(line) => return execute(serial, &line),
        };
    }
}

fn execute(serial: &mut dyn SerialPort, line: &str) -> GateOutcome {
    let _ = serial.write_line("");
    match Command::parse(line) {
        Some(Command::Help) => {
            let _ = serial.write_line("Commands:");
            for command in Command::ALL {
                let mut entry: String<48> = String::new();
                let _ = core::fmt::write(
                    &mut entry,
                    format_args!("  {} - {}", command.keyword(), command.description()),
                );
                let _ = serial.write_line(&entry);
            }
            GateOutcome::Exit
        }
        Some(Command::Quit) => {
            let _ = serial.write_line("Bye.");
            GateOutcome::Exit
        }
        None => {
            log::info!("terminal: unknown command {:?}", line);
            let _ = serial.write_line("Unknown command.");
            GateOutcome::Continue
        }
    }
}
