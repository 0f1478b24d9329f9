mod compose;
mod counts;
mod intent;
mod model;
mod payload;
mod resolve;
mod session;
mod store;

pub use crate::compose::*;
pub use crate::counts::*;
pub use crate::intent::*;
pub use crate::model::*;
pub use crate::payload::*;
pub use crate::resolve::*;
pub use crate::session::*;
pub use crate::store::*;
