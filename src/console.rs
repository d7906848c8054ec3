//! Line-oriented console loop.
//!
//! Prints the welcome line, then reads one line per turn until a quit phrase
//! or end of input. Every line the bot says is prefixed with a bullet.

use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::error::Result;
use crate::session::Session;

/// Prefix for lines spoken by the bot.
pub const BULLET: &str = "• ";

/// Prompt shown before reading user input.
pub const PROMPT: &str = "> ";

/// Drives `session` over `input` and `output` until it ends.
///
/// `delay` is slept before each reply. End of input is treated like a quit
/// phrase: the farewell is printed and the loop returns.
///
/// # Errors
///
/// Returns [`crate::ElizaScriptError::Console`] if reading or writing fails.
pub fn run<R, W>(session: &mut Session, mut input: R, mut output: W, delay: Duration) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    say(&mut output, session.greeting())?;

    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            info!(turns = session.turns(), "input closed");
            writeln!(output)?;
            say(&mut output, session.farewell())?;
            return Ok(());
        }

        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let turn = session.turn(line.trim_end_matches(['\r', '\n']));
        say(&mut output, turn.text())?;
        if turn.is_farewell() {
            info!(turns = session.turns(), "session ended");
            return Ok(());
        }
    }
}

fn say<W: Write>(output: &mut W, text: &str) -> Result<()> {
    writeln!(output, "{BULLET}{text}")?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::Responder;
    use crate::script::Script;
    use crate::substitution::SubstitutionTable;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::sync::Arc;

    const SCRIPT: &str = "\
Welcome.
>>
Farewell.
>>
computer
Do computers worry you?
>>
bye
>>
Go on.
>>
";

    fn session() -> Session {
        let script = Script::parse("inline", SCRIPT).unwrap();
        let responder =
            Responder::new(script, SubstitutionTable::new(), SubstitutionTable::new()).unwrap();
        Session::with_seed(Arc::new(responder), 0)
    }

    fn transcript(input: &str) -> String {
        let mut s = session();
        let mut out = Vec::new();
        run(&mut s, Cursor::new(input), &mut out, Duration::ZERO).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_full_conversation() {
        let got = transcript("I like my Computer\r\nhmm\nbye\nnever read\n");
        assert_eq!(
            got,
            "• Welcome.\n> • Do computers worry you?\n> • Go on.\n> • Farewell.\n"
        );
    }

    #[test]
    fn test_end_of_input_says_farewell() {
        let got = transcript("computer\n");
        assert_eq!(got, "• Welcome.\n> • Do computers worry you?\n> \n• Farewell.\n");
    }

    #[test]
    fn test_quit_must_be_exact() {
        let got = transcript("bye now\nbye\n");
        assert_eq!(got, "• Welcome.\n> • Go on.\n> • Farewell.\n");
    }
}
