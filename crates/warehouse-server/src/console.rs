//! Local console: `GEN` queries read line by line, answers printed.

use std::io::{self, Write};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

type ConsoleInput = Box<dyn AsyncBufRead + Unpin + Send>;
type ConsoleOutput = Box<dyn Write + Send>;

/// Line-oriented console input paired with the writer that receives replies.
pub struct ConsoleSource {
    lines: Lines<ConsoleInput>,
    output: ConsoleOutput,
}

impl std::fmt::Debug for ConsoleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSource").finish_non_exhaustive()
    }
}

impl ConsoleSource {
    /// Console bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }

    pub fn new<R, W>(input: R, output: W) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: Write + Send + 'static,
    {
        let input: ConsoleInput = Box::new(input);
        Self {
            lines: input.lines(),
            output: Box::new(output),
        }
    }

    /// Next complete input line, or `None` at end of input.
    pub fn poll_line(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<Option<String>>> {
        Pin::new(&mut self.lines).poll_next_line(cx)
    }

    /// Write one reply line.
    pub fn print(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)?;
        self.output.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::poll_fn;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_lines_then_eof() {
        let input: &'static [u8] = b"GEN VODKA\nGEN CHAMPAGNE\n";
        let mut console = ConsoleSource::new(input, io::sink());

        let first = poll_fn(|cx| console.poll_line(cx)).await.unwrap();
        assert_eq!(first.as_deref(), Some("GEN VODKA"));
        let second = poll_fn(|cx| console.poll_line(cx)).await.unwrap();
        assert_eq!(second.as_deref(), Some("GEN CHAMPAGNE"));
        let end = poll_fn(|cx| console.poll_line(cx)).await.unwrap();
        assert_eq!(end, None);
    }

    #[test]
    fn test_print_appends_newline() {
        let captured = Captured::default();
        let input: &'static [u8] = b"";
        let mut console = ConsoleSource::new(input, captured.clone());

        console.print("You can make 1 VODKA(s)").unwrap();
        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text, "You can make 1 VODKA(s)\n");
    }
}
