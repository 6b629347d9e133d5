/// Contiguous inclusive range [start, end] of integers owned by one rank
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    pub start: u64,
    pub end: u64,
}

impl Partition {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "empty partition [{start}, {end}]");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn contains(&self, value: u64) -> bool {
        self.start <= value && value <= self.end
    }

    /// Segment index of an absolute value inside this partition
    pub fn global_to_local(&self, value: u64) -> usize {
        debug_assert!(self.contains(value));
        (value - self.start) as usize
    }

    /// Absolute value of a segment index
    pub fn local_to_global(&self, index: usize) -> u64 {
        self.start + index as u64
    }
}
