/// Generational handle: `(index, generation)`.
///
/// A slot index may be reused after its occupant is released; the generation
/// distinguishes the new occupant from stale handles to the old one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;

    #[test]
    fn accessors_and_display() {
        let h = Handle::new(3, 7);
        assert_eq!(h.index(), 3);
        assert_eq!(h.generation(), 7);
        assert_eq!(h.to_string(), "3v7");
    }
}
