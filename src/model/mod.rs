pub mod conversion;
pub mod function;
pub mod node;
pub mod param;
pub mod route;

pub use conversion::*;
pub use function::*;
pub use node::*;
pub use param::*;
pub use route::*;
