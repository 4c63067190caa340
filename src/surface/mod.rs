pub(crate) mod commit;
pub(crate) mod display;
pub(crate) mod manager;
pub(crate) mod memory;
#[cfg(feature = "x11")]
pub(crate) mod x11;
