/// Bounds applied while parsing.
///
/// `max_depth` caps both the parser's nesting (groups, lists, call arguments,
/// prefix operators) and the height of every node it builds, so a tree that
/// parses can also be evaluated and dropped without exhausting the stack.
///
/// Values above [`ParseLimits::MAX_DEPTH_CEILING`] are treated as the
/// ceiling: each nesting level costs several parser frames, and deeper
/// budgets overflow a 2 MiB thread stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_depth: usize,
    pub max_input_bytes: usize,
}

impl ParseLimits {
    pub const DEFAULT_MAX_DEPTH: usize = 128;
    pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024;
    /// Deepest nesting the parser will attempt, whatever `max_depth` says.
    pub const MAX_DEPTH_CEILING: usize = 128;

    /// `max_depth` clamped to [`Self::MAX_DEPTH_CEILING`].
    pub fn effective_depth(&self) -> usize {
        self.max_depth.min(Self::MAX_DEPTH_CEILING)
    }
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_input_bytes: Self::DEFAULT_MAX_INPUT_BYTES,
        }
    }
}
