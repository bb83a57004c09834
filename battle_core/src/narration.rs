//! Narration sink
//!
//! The engine composes every line itself; a narrator only prints lines and
//! blocks until the player acknowledges them.

/// Output collaborator
pub trait Narrator {
    fn write_line(&mut self, line: &str);

    /// Pause until the reader is ready, then clear
    fn wait_for_acknowledgment(&mut self);
}

/// Narrator that keeps every line in memory
#[derive(Debug, Clone, Default)]
pub struct BufferNarrator {
    lines: Vec<String>,
    acknowledgments: usize,
}

impl BufferNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// How many pauses were requested
    pub fn acknowledgments(&self) -> usize {
        self.acknowledgments
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.acknowledgments = 0;
    }
}

impl Narrator for BufferNarrator {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn wait_for_acknowledgment(&mut self) {
        self.acknowledgments += 1;
    }
}

/// Narrator that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn write_line(&mut self, _line: &str) {}

    fn wait_for_acknowledgment(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_records_lines_and_pauses() {
        let mut narrator = BufferNarrator::new();
        narrator.write_line("Goblin attacks Hero!");
        narrator.wait_for_acknowledgment();
        assert!(narrator.contains("attacks"));
        assert_eq!(narrator.acknowledgments(), 1);
        narrator.clear();
        assert!(narrator.lines().is_empty());
    }
}
