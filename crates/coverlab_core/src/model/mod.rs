mod schema;
mod space;
mod value;

pub use schema::*;
pub use space::*;
pub use value::*;
