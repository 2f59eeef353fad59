mod handler;
mod model;

pub use handler::{proxy_literal, proxy_target, status};
pub use model::{FORWARDED_HEADERS, reconstruct};
