pub mod encoder;
pub mod matcher;
pub mod tokens;

pub use encoder::Lz77Encoder;
pub use matcher::{Match, MatchFinder};
pub use tokens::Lz77Token;
