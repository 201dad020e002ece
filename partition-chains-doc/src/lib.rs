//! Maximal chains of set partitions and short walks between them.

#[doc(inline)]
pub use chain::{self, *};
#[doc(inline)]
pub use chain_path::{self, *};
#[doc(inline)]
pub use partition::{self, *};
#[doc(inline)]
pub use random_chain::{self, *};
