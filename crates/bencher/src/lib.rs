/// A benchmark input: a named form whose file parts carry `payload_len` bytes each.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    files: usize,
    payload_len: usize,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, files: usize, payload_len: usize) -> Self {
        Self { name, group, files, payload_len }
    }

    pub fn small(name: &'static str, files: usize) -> Self {
        Self::new(name, TestGroup::Small, files, 256)
    }

    pub fn normal(name: &'static str, files: usize) -> Self {
        Self::new(name, TestGroup::Normal, files, 64 * 1024)
    }

    pub fn large(name: &'static str, files: usize) -> Self {
        Self::new(name, TestGroup::Large, files, 4 * 1024 * 1024)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn files(&self) -> usize {
        self.files
    }

    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    /// Deterministic binary content for one file part
    pub fn payload(&self) -> Vec<u8> {
        (0..self.payload_len).map(|i| (i * 31 % 251) as u8).collect()
    }

    pub fn total_bytes(&self) -> u64 {
        (self.files * self.payload_len) as u64
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}
