mod as_value;
mod declaration;
mod deserialize;
mod dialect;
mod error;
mod executor;
mod registry;
mod row;
mod serialize;
mod shape;
mod snapshot;
mod statement;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use declaration::*;
pub use deserialize::*;
pub use dialect::*;
pub use error::*;
pub use executor::*;
pub use registry::*;
pub use row::*;
pub use serialize::*;
pub use shape::*;
pub use snapshot::*;
pub use statement::*;
pub use util::*;
pub use value::*;
pub use writer::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
