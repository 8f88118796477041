mod assets;
mod retry;
mod riot;
mod telemetry;

pub use assets::*;
pub use retry::*;
pub use riot::*;
pub use telemetry::*;
