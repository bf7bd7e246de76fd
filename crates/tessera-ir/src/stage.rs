/// How far type derivation has progressed when a node is built.
///
/// At the `Syntactic` stage operands are untyped and aggregate/iteration nodes skip
/// deriving dtype, shape and homogeneity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Syntactic,
    Semantic,
}

impl Stage {
    pub fn is_semantic(self) -> bool {
        self == Stage::Semantic
    }
}
