/// The options provided to the [`Element`](super::Element) constraint.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElementOptions {
    /// The index value which refers to the first element of the list. The default is `0`.
    pub index_offset: i32,
    /// How positions holding the same value are visited during propagation.
    pub duplicate_handling: DuplicateHandling,
}

/// The approach used for positions of the list which hold the same value. Both approaches remove
/// exactly the same values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum DuplicateHandling {
    /// Visit every position of the index on its own.
    PerIndex,
    /// Group the positions holding the same value into a block, and visit every block once. A
    /// block with a supported value only needs a single position which is still possible.
    #[default]
    Blocks,
}
