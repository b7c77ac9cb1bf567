pub(crate) mod deck;
pub(crate) mod decode;
pub(crate) mod registry;
pub(crate) mod scratch;
pub(crate) mod svg;
