mod assemble;
mod core;
mod count;
mod direction;
mod materialize;
mod scan;


pub use self::core::{PARALLEL_THRESHOLD, SplitConfig, max_tokens_for, rsplit, split, tokenize};
pub use self::count::{cap_tokens, count_whitespace_runs};
pub use self::direction::{
    Direction, Forward, Reverse, SplitDirection, WhitespaceRuns, is_whitespace,
};
