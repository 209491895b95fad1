#![deny(clippy::all)]

mod json_ext;
mod sync;

pub use json_ext::ValueExt;
pub use sync::mutex_lock_or_recover;
