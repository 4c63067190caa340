pub(crate) mod composite;
pub(crate) mod geometry;
pub(crate) mod gradient;
pub(crate) mod target;
pub(crate) mod wallpaper;
