pub(crate) mod apply;
pub(crate) mod renderer;
