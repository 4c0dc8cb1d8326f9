pub mod features;
pub mod score;
pub mod signals;
pub mod state;

pub use features::*;
pub use score::*;
pub use signals::*;
pub use state::*;
