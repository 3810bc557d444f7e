mod conversation;
mod fitness;
mod knowledge;

pub use conversation::*;
pub use fitness::*;
pub use knowledge::*;
