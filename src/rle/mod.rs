pub mod block;
pub mod encoder;

pub use block::RleBlock;
pub use encoder::RleEncoder;
