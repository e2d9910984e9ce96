//! Command tag generator.

/// Sequential tag source for one connection: `A0000`, `A0001`, ...
#[derive(Debug, Clone)]
pub struct TagGenerator {
    counter: u32,
    prefix: char,
}

impl TagGenerator {
    /// Creates a new tag generator with the given prefix.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self { counter: 0, prefix }
    }

    /// Generates the next tag. Wraps around after `u32::MAX`.
    pub fn next_tag(&mut self) -> String {
        let n = self.counter;
        self.counter = self.counter.wrapping_add(1);
        format!("{}{n:04}", self.prefix)
    }

    /// Number of tags issued so far.
    #[must_use]
    pub const fn issued(&self) -> u32 {
        self.counter
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('A')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_zero_padded() {
        let mut tags = TagGenerator::default();
        assert_eq!(tags.next_tag(), "A0000");
        assert_eq!(tags.next_tag(), "A0001");
        assert_eq!(tags.issued(), 2);
    }

    #[test]
    fn custom_prefix_and_width() {
        let mut tags = TagGenerator::new('M');
        for _ in 0..10_000 {
            let _ = tags.next_tag();
        }
        assert_eq!(tags.next_tag(), "M10000");
    }

    #[test]
    fn wraps_instead_of_panicking() {
        let mut tags = TagGenerator {
            counter: u32::MAX,
            prefix: 'A',
        };
        assert_eq!(tags.next_tag(), format!("A{}", u32::MAX));
        assert_eq!(tags.next_tag(), "A0000");
    }
}
