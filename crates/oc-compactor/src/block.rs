//! Error/failure block accumulation shared by the build and test scanners.
//!
//! A block opens on a start line and grows while continuation lines arrive.
//! Blank lines are tolerated until two in a row follow a block of more than
//! three lines; any other line closes the block without joining it.

use crate::text::is_blank;

const CLOSE_BLANK_RUN: usize = 2;
const CLOSE_MIN_LINES: usize = 3;

#[derive(Debug, Default)]
pub struct BlockAccumulator {
    current: Option<Vec<String>>,
    blank_run: usize,
    blocks: Vec<Vec<String>>,
}

impl BlockAccumulator {
    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Flush any open block and start a new one seeded with `line`.
    pub fn open(&mut self, line: &str) {
        self.flush();
        self.current = Some(vec![line.to_string()]);
        self.blank_run = 0;
    }

    /// Feed a line to the open block. Returns `false` when no block is open or
    /// the line closed it without being consumed.
    pub fn extend(&mut self, line: &str, is_continuation: impl Fn(&str) -> bool) -> bool {
        let Some(current) = self.current.as_mut() else {
            return false;
        };
        if is_blank(line) {
            self.blank_run += 1;
            if self.blank_run >= CLOSE_BLANK_RUN && current.len() > CLOSE_MIN_LINES {
                self.flush();
            } else {
                current.push(line.to_string());
            }
            return true;
        }
        if is_continuation(line) {
            current.push(line.to_string());
            self.blank_run = 0;
            return true;
        }
        self.flush();
        false
    }

    fn flush(&mut self) {
        if let Some(mut block) = self.current.take() {
            while block.last().is_some_and(|l| is_blank(l)) {
                block.pop();
            }
            if !block.is_empty() {
                self.blocks.push(block);
            }
        }
        self.blank_run = 0;
    }

    /// End of stream: flush the open block and hand back every block.
    pub fn finish(mut self) -> Vec<Vec<String>> {
        self.flush();
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len() + usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
