//! Where text and pictures go on a slide.

pub(crate) mod fonts;
pub(crate) mod images;
pub(crate) mod zones;
