#[cfg(feature = "core")]
#[doc(inline)]
pub use metagen_core as core;

#[cfg(feature = "tabix")]
#[doc(inline)]
pub use metagen_tabix as tabix;

#[cfg(feature = "lists")]
#[doc(inline)]
pub use metagen_lists as lists;

#[cfg(feature = "multigenome")]
#[doc(inline)]
pub use metagen_multigenome as multigenome;
