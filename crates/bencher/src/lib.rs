#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup) -> Self {
        Self { name, group }
    }

    pub fn small(name: &'static str) -> Self {
        Self::new(name, TestGroup::Small)
    }

    pub fn normal(name: &'static str) -> Self {
        Self::new(name, TestGroup::Normal)
    }

    pub fn large(name: &'static str) -> Self {
        Self::new(name, TestGroup::Large)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    /// Number of plugins in the chain under test.
    pub fn depth(&self) -> usize {
        self.group.depth()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}

impl TestGroup {
    pub fn depth(self) -> usize {
        match self {
            TestGroup::Small => 1,
            TestGroup::Normal => 8,
            TestGroup::Large => 32,
        }
    }
}
